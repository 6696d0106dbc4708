//! Orthonormal contrasts and the covariance of contrast scores.

use nalgebra::DMatrix;

use crate::error::{Result, TestError};
use crate::shape::{Design, RepeatedMeasures};

/// Normalized Helmert contrasts: a `k × (k − 1)` matrix with orthonormal
/// columns, each orthogonal to the constant vector.
pub(crate) fn helmert(k: usize) -> DMatrix<f64> {
    DMatrix::from_fn(k, k.saturating_sub(1), |i, j| {
        let norm = (((j + 1) * (j + 2)) as f64).sqrt();
        if i <= j {
            1.0 / norm
        } else if i == j + 1 {
            -((j + 1) as f64) / norm
        } else {
            0.0
        }
    })
}

/// Contrast basis for a design. Two-way designs use the interaction
/// contrasts `C_A ⊗ C_B`, which match the A-major column order.
pub(crate) fn contrasts(design: &Design) -> DMatrix<f64> {
    match design {
        Design::OneWay { levels } => helmert(levels.len()),
        Design::TwoWay { a_levels, b_levels } => {
            helmert(a_levels.len()).kronecker(&helmert(b_levels.len()))
        }
    }
}

/// Sample covariance (n − 1 denominator) of the columns of `x`.
pub(crate) fn covariance(x: &DMatrix<f64>) -> DMatrix<f64> {
    let n = x.nrows();
    let mut centered = x.clone();
    for mut col in centered.column_iter_mut() {
        let mean = col.mean();
        col.add_scalar_mut(-mean);
    }
    centered.transpose() * &centered / (n as f64 - 1.0)
}

/// `Cᵀ S C`: covariance of the orthonormal contrast scores.
pub(crate) fn contrast_covariance(rm: &RepeatedMeasures) -> Result<DMatrix<f64>> {
    let n = rm.n_subjects();
    if n < 2 {
        return Err(TestError::insufficient(format!(
            "at least 2 complete subjects are required, got {n}"
        )));
    }
    let scores = rm.matrix() * contrasts(rm.design());
    Ok(covariance(&scores))
}
