//! Per-group normalization for normality and homoscedasticity tests.

use crate::error::{Result, TestError};
use crate::shape::frame::{Column, Frame};

/// Caller data in any of the accepted shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    /// A single sequence of values.
    Vector(Vec<f64>),
    /// Positional groups, named `"0"`, `"1"`, ...
    Groups(Vec<Vec<f64>>),
    /// Named groups in iteration order.
    Named(Vec<(String, Vec<f64>)>),
    /// Wide table (no [`Columns`]) or long table (with [`Columns`]).
    Table(Frame),
}

/// Long-format column selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columns<'a> {
    /// Column whose distinct values define the groups.
    pub group: &'a str,
    /// Numeric column holding the observations.
    pub dv: &'a str,
}

impl<'a> Columns<'a> {
    /// Selects `group` and `dv` columns.
    pub fn new(group: &'a str, dv: &'a str) -> Self {
        Self { group, dv }
    }
}

/// Ordered named groups, each with missing values already removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleSet {
    groups: Vec<(String, Vec<f64>)>,
}

impl SampleSet {
    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// `true` when there are no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// `(name, values)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.groups.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Values of the named group.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.groups
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Group value slices in order.
    pub fn slices(&self) -> Vec<&[f64]> {
        self.groups.iter().map(|(_, v)| v.as_slice()).collect()
    }
}

impl Dataset {
    /// Named groups from any iterator of pairs (a `Vec`, a `BTreeMap`, ...).
    pub fn named<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Vec<f64>>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Named(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Normalizes into per-group vectors, dropping missing values group by group.
    ///
    /// `columns` is only meaningful for [`Dataset::Table`]; passing it for any
    /// other shape is a shape error.
    pub fn samples(&self, columns: Option<Columns<'_>>) -> Result<SampleSet> {
        let groups: Vec<(String, Vec<f64>)> = match (self, columns) {
            (Self::Table(frame), Some(cols)) => long_groups(frame, cols)?,
            (Self::Table(frame), None) => frame
                .numeric_columns()
                .map(|(name, v)| (name.to_string(), v.to_vec()))
                .collect(),
            (_, Some(_)) => {
                return Err(TestError::shape(
                    "group/dv columns require a long-format table",
                ))
            }
            (Self::Vector(v), None) => vec![("0".to_string(), v.clone())],
            (Self::Groups(gs), None) => gs
                .iter()
                .enumerate()
                .map(|(i, g)| (i.to_string(), g.clone()))
                .collect(),
            (Self::Named(gs), None) => gs.clone(),
        };

        if groups.is_empty() {
            return Err(TestError::shape("no group or numeric column could be resolved"));
        }

        Ok(SampleSet {
            groups: groups
                .into_iter()
                .map(|(name, v)| (name, v.into_iter().filter(|x| !x.is_nan()).collect()))
                .collect(),
        })
    }
}

fn long_groups(frame: &Frame, cols: Columns<'_>) -> Result<Vec<(String, Vec<f64>)>> {
    let keys: &Column = frame.column(cols.group)?;
    let values = frame.numeric(cols.dv)?;
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        let key = keys.key(i);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, g)) => g.push(v),
            None => groups.push((key, vec![v])),
        }
    }
    Ok(groups)
}

impl From<Vec<f64>> for Dataset {
    fn from(v: Vec<f64>) -> Self {
        Self::Vector(v)
    }
}

impl From<&[f64]> for Dataset {
    fn from(v: &[f64]) -> Self {
        Self::Vector(v.to_vec())
    }
}

impl From<Vec<Vec<f64>>> for Dataset {
    fn from(v: Vec<Vec<f64>>) -> Self {
        Self::Groups(v)
    }
}

impl From<Frame> for Dataset {
    fn from(f: Frame) -> Self {
        Self::Table(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn positional_and_named_agree() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![4.0, 6.0, 8.0];
        let pos = Dataset::from(vec![a.clone(), b.clone()]).samples(None).unwrap();
        let named = Dataset::named([("x", a), ("y", b)]).samples(None).unwrap();
        assert_eq!(pos.slices(), named.slices());
        assert_eq!(named.get("y").unwrap(), &[4.0, 6.0, 8.0]);
    }

    #[test]
    fn btreemap_iterates_sorted() {
        let mut m = BTreeMap::new();
        m.insert("b".to_string(), vec![1.0]);
        m.insert("a".to_string(), vec![2.0]);
        let s = Dataset::named(m).samples(None).unwrap();
        let names: Vec<&str> = s.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn long_table_splits_in_appearance_order() {
        let f = Frame::new()
            .with_labels("g", ["b", "a", "b", "a", "b"])
            .unwrap()
            .with_numeric("v", vec![1.0, 2.0, f64::NAN, 4.0, 5.0])
            .unwrap();
        let s = Dataset::from(f).samples(Some(Columns::new("g", "v"))).unwrap();
        let names: Vec<&str> = s.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(s.get("b").unwrap(), &[1.0, 5.0]);
    }

    #[test]
    fn wide_table_drops_missing_per_column() {
        let f = Frame::new()
            .with_labels("id", ["1", "2", "3"])
            .unwrap()
            .with_numeric("x", vec![1.0, f64::NAN, 3.0])
            .unwrap()
            .with_numeric("y", vec![4.0, 5.0, 6.0])
            .unwrap();
        let s = Dataset::from(f).samples(None).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.get("x").unwrap(), &[1.0, 3.0]);
        assert_eq!(s.get("y").unwrap().len(), 3);
    }

    #[test]
    fn shape_errors() {
        let v = Dataset::from(vec![1.0, 2.0]);
        let err = v.samples(Some(Columns::new("g", "v"))).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Shape);

        let labels_only = Frame::new().with_labels("g", ["a"]).unwrap();
        assert!(Dataset::from(labels_only).samples(None).is_err());

        assert!(Dataset::Groups(vec![]).samples(None).is_err());
    }
}
