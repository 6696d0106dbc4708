//! Subjects × conditions matrices for sphericity and epsilon.
//!
//! Unlike [`Dataset::samples`](crate::Dataset::samples), which drops missing
//! values per group, every constructor here applies listwise deletion: a
//! subject with any missing condition is removed entirely.

use nalgebra::DMatrix;

use crate::error::{Result, TestError};
use crate::shape::frame::{Frame, PivotCells};

/// Within-subject layout of a [`RepeatedMeasures`] matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Design {
    /// A single within-subject factor.
    OneWay {
        /// Condition labels, one per column.
        levels: Vec<String>,
    },
    /// Two crossed within-subject factors. Columns enumerate the cells with
    /// factor A varying slowest.
    TwoWay {
        /// Levels of factor A.
        a_levels: Vec<String>,
        /// Levels of factor B.
        b_levels: Vec<String>,
    },
}

impl Design {
    /// Number of matrix columns.
    pub fn n_conditions(&self) -> usize {
        match self {
            Self::OneWay { levels } => levels.len(),
            Self::TwoWay { a_levels, b_levels } => a_levels.len() * b_levels.len(),
        }
    }

    /// Dimension of the contrast space the corrections work in:
    /// k − 1 for one-way designs, (ka − 1)(kb − 1) for the interaction.
    pub fn contrast_dof(&self) -> usize {
        match self {
            Self::OneWay { levels } => levels.len() - 1,
            Self::TwoWay { a_levels, b_levels } => (a_levels.len() - 1) * (b_levels.len() - 1),
        }
    }

    /// Whether Mauchly / JNS tests are available. Interaction designs only
    /// get (approximate) epsilon corrections.
    pub fn supports_sphericity_test(&self) -> bool {
        matches!(self, Self::OneWay { .. })
    }
}

/// Complete-case repeated-measures matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatedMeasures {
    data: DMatrix<f64>,
    design: Design,
    subjects: Vec<String>,
    dropped: usize,
}

impl RepeatedMeasures {
    /// One-way matrix from subject rows; conditions are named by position.
    pub fn one_way(rows: Vec<Vec<f64>>) -> Result<Self> {
        let k = row_width(&rows)?;
        let levels = (0..k).map(|j| j.to_string()).collect();
        let subjects = (0..rows.len()).map(|i| i.to_string()).collect();
        Self::build(rows, subjects, Design::OneWay { levels })
    }

    /// Two-way matrix with `ka × kb` columns, factor A varying slowest.
    pub fn two_way(rows: Vec<Vec<f64>>, ka: usize, kb: usize) -> Result<Self> {
        let k = row_width(&rows)?;
        if k != ka * kb {
            return Err(TestError::shape(format!(
                "rows have {k} columns, expected {ka} × {kb}"
            )));
        }
        let design = Design::TwoWay {
            a_levels: (0..ka).map(|j| j.to_string()).collect(),
            b_levels: (0..kb).map(|j| j.to_string()).collect(),
        };
        let subjects = (0..rows.len()).map(|i| i.to_string()).collect();
        Self::build(rows, subjects, design)
    }

    /// One-way matrix from a wide table; every numeric column is a condition.
    pub fn from_wide(frame: &Frame) -> Result<Self> {
        let cols: Vec<(&str, &[f64])> = frame.numeric_columns().collect();
        let levels = cols.iter().map(|(n, _)| n.to_string()).collect();
        let rows = (0..frame.n_rows())
            .map(|i| cols.iter().map(|(_, v)| v[i]).collect())
            .collect();
        let subjects = (0..frame.n_rows()).map(|i| i.to_string()).collect();
        Self::build(rows, subjects, Design::OneWay { levels })
    }

    /// Pivots a long table on `subject` against one or two `within` factors.
    ///
    /// Observations that share a subject and cell (because another factor is
    /// not listed in `within`) are averaged.
    pub fn from_long(frame: &Frame, dv: &str, subject: &str, within: &[&str]) -> Result<Self> {
        if within.is_empty() || within.len() > 2 {
            return Err(TestError::shape(format!(
                "expected one or two within factors, got {}",
                within.len()
            )));
        }
        let cells = PivotCells::build(frame, subject, within, dv)?;
        let width = cells.width();
        let rows = (0..cells.rows.len())
            .map(|i| (0..width).map(|j| cells.value(i, j)).collect())
            .collect();
        let design = match cells.levels.as_slice() {
            [levels] => Design::OneWay {
                levels: levels.clone(),
            },
            [a, b] => Design::TwoWay {
                a_levels: a.clone(),
                b_levels: b.clone(),
            },
            _ => return Err(TestError::shape("expected one or two within factors")),
        };
        Self::build(rows, cells.rows.clone(), design)
    }

    fn build(rows: Vec<Vec<f64>>, subjects: Vec<String>, design: Design) -> Result<Self> {
        match &design {
            Design::OneWay { levels } if levels.len() < 2 => {
                return Err(TestError::shape("at least 2 conditions are required"))
            }
            Design::TwoWay { a_levels, b_levels } if a_levels.len() < 2 || b_levels.len() < 2 => {
                return Err(TestError::shape("each within factor needs at least 2 levels"))
            }
            _ => {}
        }
        let k = design.n_conditions();
        let total = rows.len();

        let (kept, kept_subjects): (Vec<Vec<f64>>, Vec<String>) = rows
            .into_iter()
            .zip(subjects)
            .filter(|(row, _)| row.iter().all(|v| !v.is_nan()))
            .unzip();
        if kept.iter().flatten().any(|v| v.is_infinite()) {
            return Err(TestError::Domain("infinite value in repeated measures".into()));
        }

        let dropped = total - kept.len();
        if dropped > 0 {
            tracing::debug!(dropped, kept = kept.len(), "listwise deletion of incomplete subjects");
        }

        let n = kept.len();
        let data = DMatrix::from_fn(n, k, |i, j| kept[i][j]);
        Ok(Self {
            data,
            design,
            subjects: kept_subjects,
            dropped,
        })
    }

    /// Complete subjects (rows).
    pub fn n_subjects(&self) -> usize {
        self.data.nrows()
    }

    /// Conditions (columns).
    pub fn n_conditions(&self) -> usize {
        self.data.ncols()
    }

    /// Layout of the columns.
    pub fn design(&self) -> &Design {
        &self.design
    }

    /// The complete-case matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.data
    }

    /// Labels of the retained subjects.
    pub fn subjects(&self) -> &[String] {
        &self.subjects
    }

    /// Subjects removed by listwise deletion.
    pub fn dropped_rows(&self) -> usize {
        self.dropped
    }
}

fn row_width(rows: &[Vec<f64>]) -> Result<usize> {
    let k = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != k) {
        return Err(TestError::shape("rows have different lengths"));
    }
    Ok(k)
}
