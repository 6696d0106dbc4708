//! # u-assumptions
//!
//! Assumption checks that precede parametric tests: normality, equality of
//! variances, sphericity of repeated measures, and Anderson-Darling goodness
//! of fit.
//!
//! Every operation accepts raw `f64` data in several shapes (a vector, groups,
//! named groups, or a wide or long table) and normalizes it once before
//! testing.
//!
//! ## Modules
//!
//! - [`shape`] — Input normalization (groups, tables, repeated-measures matrices)
//! - [`normality`] — Shapiro-Wilk, D'Agostino-Pearson, Jarque-Bera, geometric z-score
//! - [`homoscedasticity`] — Levene (Brown-Forsythe) and Bartlett tests
//! - [`sphericity`] — Mauchly and JNS tests, Greenhouse-Geisser / Huynh-Feldt / lower-bound epsilon
//! - [`anderson`] — One-sample and k-sample Anderson-Darling tests
//! - [`result`] — Per-group result rows
//! - [`config`] — Default significance level and reporting precision
//! - [`error`] — Error taxonomy
//!
//! ## Example
//!
//! ```
//! use u_assumptions::{epsilon, sphericity, Correction, RepeatedMeasures, SphericityMethod};
//!
//! let rm = RepeatedMeasures::one_way(vec![
//!     vec![4.0, 6.0, 9.0],
//!     vec![3.0, 5.5, 7.0],
//!     vec![5.0, 6.5, 10.0],
//!     vec![4.5, 7.5, 8.0],
//!     vec![2.0, 4.0, 7.5],
//! ])
//! .unwrap();
//! let gg = epsilon(&rm, Correction::GreenhouseGeisser).unwrap();
//! assert!((0.5..=1.0).contains(&gg));
//! let r = sphericity(&rm, SphericityMethod::Mauchly, 0.05).unwrap();
//! assert_eq!(r.dof, Some(2));
//! ```

pub mod anderson;
pub mod config;
pub mod error;
pub mod homoscedasticity;
mod moments;
pub mod normality;
pub mod result;
pub mod shape;
pub mod sphericity;

pub use anderson::{anderson, AndersonOutcome, Distribution, GoodnessOfFit, KSampleResult};
pub use error::{ErrorKind, Result, TestError};
pub use homoscedasticity::{homoscedasticity, VarianceMethod, VarianceStat};
pub use normality::{gzscore, normality, NormalityMethod, NormalityStat};
pub use result::{Statistic, TestRow, TestTable};
pub use shape::{Column, Columns, Dataset, Design, Frame, RepeatedMeasures, SampleSet};
pub use sphericity::{epsilon, sphericity, Correction, SphericityMethod, SphericityResult};
