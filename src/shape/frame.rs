//! A minimal labeled table: column selection, pivot and melt.
//!
//! Missing numeric values are stored as `f64::NAN`.

use crate::error::{Result, TestError};

/// One column of a [`Frame`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Column {
    /// Real values, NaN marks a missing cell.
    Numeric(Vec<f64>),
    /// Categorical labels (subject ids, condition names, ...).
    Labels(Vec<String>),
}

impl Column {
    /// Number of cells.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Labels(v) => v.len(),
        }
    }

    /// `true` when the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cell `i` rendered as a grouping key.
    pub fn key(&self, i: usize) -> String {
        match self {
            Self::Numeric(v) => v[i].to_string(),
            Self::Labels(v) => v[i].clone(),
        }
    }
}

/// Column-oriented table with named columns of equal length.
///
/// # Examples
///
/// ```
/// use u_assumptions::Frame;
///
/// let long = Frame::new()
///     .with_labels("subject", ["s1", "s1", "s2", "s2"]).unwrap()
///     .with_labels("time", ["pre", "post", "pre", "post"]).unwrap()
///     .with_numeric("score", vec![1.0, 2.0, 3.0, 5.0]).unwrap();
///
/// let wide = long.pivot("subject", "time", "score").unwrap();
/// assert_eq!(wide.numeric("post").unwrap(), &[2.0, 5.0]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Frame {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a numeric column.
    pub fn with_numeric(self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.push(name.into(), Column::Numeric(values))
    }

    /// Appends a label column.
    pub fn with_labels<S: Into<String>>(
        self,
        name: impl Into<String>,
        labels: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let labels = labels.into_iter().map(Into::into).collect();
        self.push(name.into(), Column::Labels(labels))
    }

    fn push(mut self, name: String, column: Column) -> Result<Self> {
        if self.names.contains(&name) {
            return Err(TestError::shape(format!("duplicate column {name:?}")));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(TestError::shape(format!(
                    "column {name:?} has {} rows, expected {}",
                    column.len(),
                    first.len()
                )));
            }
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(self)
    }

    /// Number of rows (0 for a table without columns).
    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| TestError::shape(format!("no column named {name:?}")))
    }

    /// Numeric column by name.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        match self.column(name)? {
            Column::Numeric(v) => Ok(v),
            Column::Labels(_) => Err(TestError::shape(format!("column {name:?} is not numeric"))),
        }
    }

    /// Label column by name.
    pub fn labels(&self, name: &str) -> Result<&[String]> {
        match self.column(name)? {
            Column::Labels(v) => Ok(v),
            Column::Numeric(_) => Err(TestError::shape(format!("column {name:?} holds numbers"))),
        }
    }

    /// Numeric columns in column order.
    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .zip(&self.columns)
            .filter_map(|(name, col)| match col {
                Column::Numeric(v) => Some((name.as_str(), v.as_slice())),
                Column::Labels(_) => None,
            })
    }

    /// Long → wide. One row per distinct `index` key, one numeric column per
    /// distinct `columns` key, both in first-appearance order.
    ///
    /// Duplicate cells are averaged (missing values skipped); cells without
    /// any value become NaN. The index is kept as a label column named `index`,
    /// so a `columns` level spelled like `index` is a shape error.
    pub fn pivot(&self, index: &str, columns: &str, values: &str) -> Result<Frame> {
        let cells = PivotCells::build(self, index, &[columns], values)?;
        if let Some(level) = cells.levels[0].iter().find(|l| l.as_str() == index) {
            return Err(TestError::shape(format!(
                "pivot level {level:?} collides with index column {index:?}"
            )));
        }
        let mut wide = Frame::new().with_labels(index, cells.rows.clone())?;
        for (j, level) in cells.levels[0].iter().enumerate() {
            let col = (0..cells.rows.len()).map(|i| cells.value(i, j)).collect();
            wide = wide.with_numeric(level.clone(), col)?;
        }
        Ok(wide)
    }

    /// Wide → long. Every numeric column other than `id` becomes rows of
    /// (`id`, `var_name` = column name, `value_name` = cell), column by column.
    pub fn melt(&self, id: &str, var_name: &str, value_name: &str) -> Result<Frame> {
        let id_col = self.column(id)?;
        let n = self.n_rows();
        let mut ids = Vec::new();
        let mut vars = Vec::new();
        let mut values = Vec::new();
        for (name, col) in self.numeric_columns() {
            if name == id {
                continue;
            }
            for (i, &v) in col.iter().enumerate() {
                ids.push(id_col.key(i));
                vars.push(name.to_string());
                values.push(v);
            }
        }
        if values.is_empty() && n > 0 {
            return Err(TestError::shape("no numeric columns to melt"));
        }
        Frame::new()
            .with_labels(id, ids)?
            .with_labels(var_name, vars)?
            .with_numeric(value_name, values)
    }
}

/// Mean-aggregated cells of a pivot over one or more column factors.
///
/// Column `j` of the flattened cell grid enumerates the factor levels with the
/// first factor varying slowest.
#[derive(Debug)]
pub(crate) struct PivotCells {
    pub(crate) rows: Vec<String>,
    pub(crate) levels: Vec<Vec<String>>,
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl PivotCells {
    pub(crate) fn build(frame: &Frame, index: &str, factors: &[&str], values: &str) -> Result<Self> {
        let index_col = frame.column(index)?;
        let value_col = frame.numeric(values)?;
        let factor_cols = factors
            .iter()
            .map(|f| frame.column(f))
            .collect::<Result<Vec<_>>>()?;

        let mut rows: Vec<String> = Vec::new();
        let mut levels: Vec<Vec<String>> = vec![Vec::new(); factors.len()];
        let mut keys = Vec::with_capacity(frame.n_rows());
        for i in 0..frame.n_rows() {
            let r = index_of(&mut rows, index_col.key(i));
            let ls: Vec<usize> = factor_cols
                .iter()
                .zip(levels.iter_mut())
                .map(|(col, lv)| index_of(lv, col.key(i)))
                .collect();
            keys.push((r, ls));
        }

        let width: usize = levels.iter().map(Vec::len).product();
        let mut sums = vec![0.0; rows.len() * width];
        let mut counts = vec![0; rows.len() * width];
        for ((r, ls), &v) in keys.iter().zip(value_col) {
            if v.is_nan() {
                continue;
            }
            let j = ls
                .iter()
                .zip(&levels)
                .fold(0, |acc, (&l, lv)| acc * lv.len() + l);
            sums[r * width + j] += v;
            counts[r * width + j] += 1;
        }

        Ok(Self {
            rows,
            levels,
            sums,
            counts,
        })
    }

    pub(crate) fn width(&self) -> usize {
        self.levels.iter().map(Vec::len).product()
    }

    pub(crate) fn value(&self, row: usize, col: usize) -> f64 {
        let idx = row * self.width() + col;
        match self.counts[idx] {
            0 => f64::NAN,
            c => self.sums[idx] / c as f64,
        }
    }
}

fn index_of(keys: &mut Vec<String>, key: String) -> usize {
    match keys.iter().position(|k| *k == key) {
        Some(i) => i,
        None => {
            keys.push(key);
            keys.len() - 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long() -> Frame {
        Frame::new()
            .with_labels("subject", ["a", "a", "a", "b", "b", "b"])
            .unwrap()
            .with_labels("time", ["t1", "t2", "t3", "t1", "t2", "t3"])
            .unwrap()
            .with_numeric("score", vec![1.0, 2.0, 3.0, 4.0, f64::NAN, 6.0])
            .unwrap()
    }

    #[test]
    fn rejects_ragged_and_duplicate_columns() {
        let f = Frame::new().with_numeric("x", vec![1.0, 2.0]).unwrap();
        assert!(f.clone().with_numeric("y", vec![1.0]).is_err());
        assert!(f.with_numeric("x", vec![3.0, 4.0]).is_err());
    }

    #[test]
    fn column_lookup_errors() {
        let f = long();
        assert!(f.column("missing").is_err());
        assert!(f.numeric("subject").is_err());
        assert!(f.labels("score").is_err());
        assert_eq!(f.numeric_columns().count(), 1);
    }

    #[test]
    fn pivot_keeps_appearance_order_and_missing() {
        let wide = long().pivot("subject", "time", "score").unwrap();
        let names: Vec<&str> = wide.column_names().collect();
        assert_eq!(names, ["subject", "t1", "t2", "t3"]);
        assert_eq!(wide.labels("subject").unwrap(), ["a", "b"]);
        assert_eq!(wide.numeric("t1").unwrap(), &[1.0, 4.0]);
        assert!(wide.numeric("t2").unwrap()[1].is_nan());
    }

    #[test]
    fn pivot_averages_duplicates() {
        let f = Frame::new()
            .with_labels("s", ["a", "a", "a"])
            .unwrap()
            .with_labels("c", ["x", "x", "y"])
            .unwrap()
            .with_numeric("v", vec![1.0, 3.0, 5.0])
            .unwrap();
        let wide = f.pivot("s", "c", "v").unwrap();
        assert_eq!(wide.numeric("x").unwrap(), &[2.0]);
        assert_eq!(wide.numeric("y").unwrap(), &[5.0]);
    }

    #[test]
    fn pivot_level_named_like_index() {
        let f = Frame::new()
            .with_labels("id", ["a", "a", "b", "b"])
            .unwrap()
            .with_labels("cond", ["id", "x", "id", "x"])
            .unwrap()
            .with_numeric("v", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        let err = f.pivot("id", "cond", "v").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Shape);
        assert!(err.to_string().contains("collides with index column"), "{err}");
    }

    #[test]
    fn melt_orders_column_by_column() {
        let wide = long().pivot("subject", "time", "score").unwrap();
        let back = wide.melt("subject", "time", "score").unwrap();
        assert_eq!(back.n_rows(), 6);
        assert_eq!(back.labels("time").unwrap()[..2], ["t1", "t1"]);
        assert_eq!(back.labels("subject").unwrap()[..2], ["a", "b"]);
    }

    #[test]
    fn numeric_keys_group_like_labels() {
        let f = Frame::new()
            .with_numeric("s", vec![1.0, 1.0, 2.0, 2.0])
            .unwrap()
            .with_labels("c", ["x", "y", "x", "y"])
            .unwrap()
            .with_numeric("v", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        let wide = f.pivot("s", "c", "v").unwrap();
        assert_eq!(wide.labels("s").unwrap(), ["1", "2"]);
        assert_eq!(wide.numeric("y").unwrap(), &[2.0, 4.0]);
    }
}
