//! Significance level, reporting precision, and comparison tolerance.
//!
//! Every threshold or rounding applied to a derived statistic lives here so
//! callers and tests share one definition.

use crate::error::{Result, TestError};

/// Significance level used when the caller has no preference.
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Decimals kept when reporting Mauchly / JNS W and chi-square values.
pub const REPORT_DECIMALS: u32 = 3;

/// Decimals kept for Anderson-Darling critical values.
pub const CRITICAL_DECIMALS: u32 = 3;

/// Absolute tolerance for comparing derived statistics against references.
pub const EPSILON_TOLERANCE: f64 = 1e-7;

/// Validates a significance level: must be finite and strictly inside (0, 1).
pub fn check_alpha(alpha: f64) -> Result<f64> {
    if alpha.is_finite() && alpha > 0.0 && alpha < 1.0 {
        Ok(alpha)
    } else {
        Err(TestError::InvalidParameter(format!(
            "alpha must lie in (0, 1), got {alpha}"
        )))
    }
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

/// `|a - b| <= EPSILON_TOLERANCE`.
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= EPSILON_TOLERANCE
}
