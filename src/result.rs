//! Row-shaped results for batched tests.
//!
//! A row holds either the statistics of one group or the reason that group
//! could not be tested, so one degenerate group never hides the others.

use crate::error::TestError;

/// Test statistic and its p-value, as produced by a single routine.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Statistic {
    /// Test statistic (W, K², JB, F, T, ...).
    pub statistic: f64,
    /// Upper-tail p-value.
    pub p_value: f64,
}

/// Outcome of one test on one labeled group (or group set).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TestRow<T> {
    /// Group or method label.
    pub label: String,
    /// Statistics, or the numerical reason the test could not run.
    pub outcome: Result<T, TestError>,
}

impl<T> TestRow<T> {
    pub(crate) fn new(label: impl Into<String>, outcome: Result<T, TestError>) -> Self {
        Self {
            label: label.into(),
            outcome,
        }
    }

    /// Successful statistics, if any.
    pub fn stat(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&TestError> {
        self.outcome.as_ref().err()
    }
}

/// One row per group, in group order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TestTable<T> {
    /// Rows in input order.
    pub rows: Vec<TestRow<T>>,
}

impl<T> TestTable<T> {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row with the given label.
    pub fn get(&self, label: &str) -> Option<&TestRow<T>> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Iterates rows in order.
    pub fn iter(&self) -> std::slice::Iter<'_, TestRow<T>> {
        self.rows.iter()
    }

    /// Rows whose test could not be computed.
    pub fn failures(&self) -> impl Iterator<Item = &TestRow<T>> {
        self.rows.iter().filter(|r| r.outcome.is_err())
    }
}

impl<'a, T> IntoIterator for &'a TestTable<T> {
    type Item = &'a TestRow<T>;
    type IntoIter = std::slice::Iter<'a, TestRow<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors() {
        let table = TestTable {
            rows: vec![
                TestRow::new("a", Ok(1.0)),
                TestRow::new("b", Err(TestError::insufficient("n = 1"))),
            ],
        };
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("a").and_then(TestRow::stat), Some(&1.0));
        assert!(table.get("b").unwrap().error().is_some());
        assert_eq!(table.failures().count(), 1);
        assert!(table.get("c").is_none());
    }
}
