//! Greenhouse-Geisser, Huynh-Feldt and lower-bound corrections.

use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;

use crate::error::{Result, TestError};
use crate::shape::RepeatedMeasures;
use crate::sphericity::contrast::contrast_covariance;

/// Epsilon correction variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Correction {
    /// Greenhouse-Geisser (1959).
    #[default]
    GreenhouseGeisser,
    /// Huynh-Feldt (1976), a less conservative bias correction of GG.
    HuynhFeldt,
    /// Lower bound 1 / (k − 1), data independent.
    LowerBound,
}

impl FromStr for Correction {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gg" | "greenhouse-geisser" => Ok(Self::GreenhouseGeisser),
            "hf" | "huynh-feldt" => Ok(Self::HuynhFeldt),
            "lb" | "lower-bound" => Ok(Self::LowerBound),
            other => Err(TestError::InvalidParameter(format!(
                "unknown epsilon correction {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::GreenhouseGeisser => "gg",
            Self::HuynhFeldt => "hf",
            Self::LowerBound => "lb",
        })
    }
}

/// Epsilon correction factor for a repeated-measures matrix.
///
/// With `d` contrasts (k − 1 for one-way designs, (ka − 1)(kb − 1) for the
/// two-way interaction) and `S` the covariance of orthonormal contrast scores:
///
/// - lower bound: `1 / d`
/// - Greenhouse-Geisser: `tr(S)² / (d · tr(S²))`, within `[1/d, 1]`
/// - Huynh-Feldt: `(n·d·ε_gg − 2) / (d·(n − 1 − d·ε_gg))`, within `[ε_gg, 1]`
///
/// All three are exactly 1 when `d == 1`.
///
/// The interaction epsilon of a two-way design is an approximation; other
/// packages may report a somewhat different value.
///
/// # Errors
///
/// [`TestError::InsufficientData`] when fewer than 2 complete subjects remain
/// or the contrast scores have no spread.
///
/// # Examples
///
/// ```
/// use u_assumptions::{epsilon, Correction, RepeatedMeasures};
///
/// let rm = RepeatedMeasures::one_way(vec![
///     vec![4.0, 5.0, 7.0],
///     vec![3.0, 6.0, 6.0],
///     vec![5.0, 5.5, 9.0],
///     vec![6.0, 8.0, 8.5],
///     vec![2.0, 4.0, 7.5],
/// ]).unwrap();
/// let lb = epsilon(&rm, Correction::LowerBound).unwrap();
/// let gg = epsilon(&rm, Correction::GreenhouseGeisser).unwrap();
/// let hf = epsilon(&rm, Correction::HuynhFeldt).unwrap();
/// assert_eq!(lb, 0.5);
/// assert!(lb <= gg && gg <= hf && hf <= 1.0);
/// ```
pub fn epsilon(rm: &RepeatedMeasures, correction: Correction) -> Result<f64> {
    let d = rm.design().contrast_dof();
    if d == 1 {
        return Ok(1.0);
    }
    if correction == Correction::LowerBound {
        return Ok(1.0 / d as f64);
    }

    let s = contrast_covariance(rm)?;
    let gg = greenhouse_geisser(&s, d)?;
    match correction {
        Correction::HuynhFeldt => Ok(huynh_feldt(gg, rm.n_subjects(), d)),
        _ => Ok(gg),
    }
}

pub(crate) fn greenhouse_geisser(s: &DMatrix<f64>, d: usize) -> Result<f64> {
    let tr = s.trace();
    let tr_sq: f64 = s.iter().map(|v| v * v).sum();
    if tr_sq <= 0.0 || !tr_sq.is_finite() || !tr.is_finite() {
        return Err(TestError::insufficient(
            "contrast scores have no spread across subjects",
        ));
    }
    let df = d as f64;
    Ok((tr * tr / (df * tr_sq)).clamp(1.0 / df, 1.0))
}

fn huynh_feldt(gg: f64, n: usize, d: usize) -> f64 {
    let (nf, df) = (n as f64, d as f64);
    let num = nf * df * gg - 2.0;
    let den = df * (nf - 1.0 - df * gg);
    if den <= 0.0 {
        return 1.0;
    }
    (num / den).clamp(gg, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        for c in [
            Correction::GreenhouseGeisser,
            Correction::HuynhFeldt,
            Correction::LowerBound,
        ] {
            assert_eq!(c.to_string().parse::<Correction>(), Ok(c));
        }
        assert_eq!("GG".parse::<Correction>(), Ok(Correction::GreenhouseGeisser));
        assert!("xx".parse::<Correction>().is_err());
    }

    #[test]
    fn huynh_feldt_never_below_gg() {
        for n in 3..30 {
            for d in 2..5 {
                for gg in [1.0 / d as f64, 0.6, 0.8, 1.0] {
                    let hf = huynh_feldt(gg.max(1.0 / d as f64), n, d);
                    assert!(hf >= gg.max(1.0 / d as f64) - 1e-12);
                    assert!(hf <= 1.0);
                }
            }
        }
    }

    #[test]
    fn gg_rejects_zero_spread() {
        let s = DMatrix::zeros(2, 2);
        assert!(greenhouse_geisser(&s, 2).is_err());
    }
}
