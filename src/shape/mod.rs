//! Input normalization.
//!
//! Every test reads its data through this module, so the accepted shapes are
//! decided in one place.
//!
//! # Per-group samples
//!
//! - [`Dataset`] — a vector, positional groups, named groups, or a table
//! - [`Columns`] — group and value columns of a long-format table
//! - [`SampleSet`] — ordered named groups with missing values removed
//!
//! # Repeated measures
//!
//! - [`RepeatedMeasures`] — complete-case subjects × conditions matrix
//! - [`Design`] — one-way or two-way within-subject layout
//!
//! # Tables
//!
//! - [`Frame`] — named columns with [`Frame::pivot`] and [`Frame::melt`]
//!
//! Missing values are `f64::NAN`.

mod dataset;
pub(crate) mod frame;
mod repeated;

pub use dataset::{Columns, Dataset, SampleSet};
pub use frame::{Column, Frame};
pub use repeated::{Design, RepeatedMeasures};
