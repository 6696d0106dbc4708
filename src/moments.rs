//! Descriptive moments and reference-distribution tails shared by the tests.

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal};
use statrs::statistics::{Data, Median, Statistics};

use crate::error::{Result, TestError};

/// Arithmetic mean. NaN for an empty slice.
pub(crate) fn mean(data: &[f64]) -> f64 {
    data.iter().mean()
}

/// Sample variance (n − 1 denominator). NaN for fewer than 2 values.
pub(crate) fn variance(data: &[f64]) -> f64 {
    data.iter().variance()
}

pub(crate) fn median(data: &[f64]) -> f64 {
    Data::new(data.to_vec()).median()
}

/// Central moments m2, m3, m4 with the n denominator.
pub(crate) fn central_moments(data: &[f64]) -> (f64, f64, f64) {
    let n = data.len() as f64;
    let m = mean(data);
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for &x in data {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Biased sample skewness g1 = m3 / m2^1.5.
pub(crate) fn skewness(data: &[f64]) -> f64 {
    let (m2, m3, _) = central_moments(data);
    m3 / m2.powf(1.5)
}

/// Biased Pearson kurtosis b2 = m4 / m2² (3 for a normal distribution).
pub(crate) fn kurtosis(data: &[f64]) -> f64 {
    let (m2, _, m4) = central_moments(data);
    m4 / (m2 * m2)
}

/// Upper tail of χ²(df).
pub(crate) fn chi2_sf(x: f64, df: f64) -> Result<f64> {
    let dist = ChiSquared::new(df).map_err(TestError::numerical)?;
    Ok(dist.sf(x))
}

/// Upper tail of F(d1, d2).
pub(crate) fn f_sf(x: f64, d1: f64, d2: f64) -> Result<f64> {
    let dist = FisherSnedecor::new(d1, d2).map_err(TestError::numerical)?;
    Ok(dist.sf(x))
}

pub(crate) fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0).map_err(TestError::numerical)
}

pub(crate) fn all_finite(data: &[f64]) -> bool {
    data.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_moments() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&data) - 5.0).abs() < 1e-12);
        assert!((variance(&data) - 32.0 / 7.0).abs() < 1e-12);
        assert!((median(&data) - 4.5).abs() < 1e-12);
        let (m2, _, _) = central_moments(&data);
        assert!((m2 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn symmetric_data_has_zero_skew() {
        let data = [-2.0, -1.0, 0.0, 1.0, 2.0];
        assert!(skewness(&data).abs() < 1e-12);
        // m2 = 2, m4 = 34/5
        assert!((kurtosis(&data) - 1.7).abs() < 1e-12);
    }

    #[test]
    fn chi2_two_df_is_exponential() {
        let p = chi2_sf(2.0, 2.0).unwrap();
        assert!((p - (-1.0f64).exp()).abs() < 1e-10, "p = {p}");
        assert!(chi2_sf(1.0, 0.0).is_err());
    }
}
