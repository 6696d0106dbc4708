//! Error taxonomy shared by every test in the crate.
//!
//! Shape and configuration errors abort a whole call. Numerical failures of a
//! single group inside a batched call are stored in that group's
//! [`TestRow`](crate::TestRow) instead.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TestError>;

/// Everything that can go wrong while normalizing input or computing a test.
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TestError {
    /// The input could not be interpreted as a supported shape.
    #[error("shape error: {0}")]
    Shape(String),

    /// Too few observations (or no spread) for the chosen statistic.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Fewer than two groups where at least two are required.
    #[error("at least 2 groups are required, got {got}")]
    InsufficientGroups {
        /// Number of groups that were resolved.
        got: usize,
    },

    /// A value lies outside the mathematical domain of a statistic.
    #[error("domain error: {0}")]
    Domain(String),

    /// The requested computation is not available for this design.
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Unknown reference distribution name.
    #[error("unsupported distribution: {0:?}")]
    UnsupportedDistribution(String),

    /// Significance level or algorithm selector is invalid.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A reference distribution could not be built or produced a non-finite value.
    #[error("numerical failure: {0}")]
    Numerical(String),
}

/// Fieldless discriminant of [`TestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`TestError::Shape`].
    Shape,
    /// See [`TestError::InsufficientData`].
    InsufficientData,
    /// See [`TestError::InsufficientGroups`].
    InsufficientGroups,
    /// See [`TestError::Domain`].
    Domain,
    /// See [`TestError::NotSupported`].
    NotSupported,
    /// See [`TestError::UnsupportedDistribution`].
    UnsupportedDistribution,
    /// See [`TestError::InvalidParameter`].
    InvalidParameter,
    /// See [`TestError::Numerical`].
    Numerical,
}

impl TestError {
    /// Kind of the error, for matching without destructuring.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Shape(_) => ErrorKind::Shape,
            Self::InsufficientData(_) => ErrorKind::InsufficientData,
            Self::InsufficientGroups { .. } => ErrorKind::InsufficientGroups,
            Self::Domain(_) => ErrorKind::Domain,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::UnsupportedDistribution(_) => ErrorKind::UnsupportedDistribution,
            Self::InvalidParameter(_) => ErrorKind::InvalidParameter,
            Self::Numerical(_) => ErrorKind::Numerical,
        }
    }

    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    pub(crate) fn insufficient(msg: impl Into<String>) -> Self {
        Self::InsufficientData(msg.into())
    }

    pub(crate) fn numerical(err: impl std::fmt::Display) -> Self {
        Self::Numerical(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct() {
        let errors = [
            TestError::shape("x"),
            TestError::insufficient("x"),
            TestError::InsufficientGroups { got: 1 },
            TestError::Domain("x".into()),
            TestError::NotSupported("x".into()),
            TestError::UnsupportedDistribution("x".into()),
            TestError::InvalidParameter("x".into()),
            TestError::numerical("x"),
        ];
        for (i, a) in errors.iter().enumerate() {
            for b in &errors[i + 1..] {
                assert_ne!(a.kind(), b.kind());
            }
        }
    }

    #[test]
    fn display_mentions_counts() {
        let e = TestError::InsufficientGroups { got: 1 };
        assert_eq!(e.to_string(), "at least 2 groups are required, got 1");
    }
}
