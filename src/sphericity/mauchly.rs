//! Mauchly and John-Nagao-Sugiura sphericity tests.

use std::fmt;
use std::str::FromStr;

use crate::config::{check_alpha, round_to, REPORT_DECIMALS};
use crate::error::{Result, TestError};
use crate::moments::chi2_sf;
use crate::shape::RepeatedMeasures;
use crate::sphericity::contrast::contrast_covariance;
use crate::sphericity::epsilon::greenhouse_geisser;

// Smallest eigenvalue of the contrast covariance, relative to the largest,
// below which the covariance is treated as rank deficient.
const SINGULAR_RATIO: f64 = 1e-12;

/// Sphericity test statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SphericityMethod {
    /// Mauchly's W with the chi-square approximation of Anderson (1958).
    #[default]
    Mauchly,
    /// John, Nagao and Sugiura's test based on the Greenhouse-Geisser epsilon.
    Jns,
}

impl FromStr for SphericityMethod {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mauchly" => Ok(Self::Mauchly),
            "jns" => Ok(Self::Jns),
            other => Err(TestError::InvalidParameter(format!(
                "unknown sphericity method {other:?}"
            ))),
        }
    }
}

impl fmt::Display for SphericityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mauchly => "mauchly",
            Self::Jns => "jns",
        })
    }
}

/// Outcome of a sphericity test.
///
/// `w` and `chi2` are rounded to [`REPORT_DECIMALS`]; `p_value` is not.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SphericityResult {
    /// `true` when sphericity can be assumed (`p > alpha`).
    pub spher: bool,
    /// W statistic. `None` when the test was not run (two conditions).
    pub w: Option<f64>,
    /// Chi-square statistic.
    pub chi2: Option<f64>,
    /// Degrees of freedom of the chi-square approximation.
    pub dof: Option<usize>,
    /// p-value.
    pub p_value: Option<f64>,
}

impl SphericityResult {
    /// `(spher, W, chi2, dof, p)`.
    pub fn into_tuple(self) -> (bool, Option<f64>, Option<f64>, Option<usize>, Option<f64>) {
        (self.spher, self.w, self.chi2, self.dof, self.p_value)
    }

    fn trivial() -> Self {
        Self {
            spher: true,
            w: None,
            chi2: None,
            dof: Some(1),
            p_value: Some(1.0),
        }
    }
}

/// Tests the sphericity of a one-way repeated-measures matrix.
///
/// With two conditions sphericity always holds and no statistic is computed.
///
/// # Algorithm
///
/// With `d = k − 1`, `λ` the eigenvalues of the contrast-score covariance and
/// dof = d(d + 1)/2 − 1:
///
/// - Mauchly: W = Πλ / (Σλ / d)^d, f = 1 − (2d² + d + 2) / (6d(n − 1)),
///   χ² = −(n − 1) f ln W, p = P(χ²_dof) + ω₂ (P(χ²_dof+4) − P(χ²_dof)).
/// - JNS: W = d · ε_GG, χ² = n d² (W − 1/d) / 2, p = P(χ²_dof).
///
/// # Errors
///
/// - [`TestError::NotSupported`] for two-way designs
///   (see [`Design::supports_sphericity_test`](crate::Design::supports_sphericity_test)).
/// - [`TestError::InsufficientData`] with fewer than k + 1 complete subjects,
///   or when the contrast covariance is singular (a condition that is an exact
///   linear function of the others). Neither W nor ε_GG is meaningful then.
/// - [`TestError::InvalidParameter`] for alpha outside (0, 1).
///
/// # References
///
/// - Mauchly (1940). "Significance test for sphericity of a normal
///   n-variate distribution". Annals of Mathematical Statistics, 11, 204–209.
/// - John (1972); Nagao (1973); Sugiura (1972).
pub fn sphericity(
    rm: &RepeatedMeasures,
    method: SphericityMethod,
    alpha: f64,
) -> Result<SphericityResult> {
    let alpha = check_alpha(alpha)?;
    if !rm.design().supports_sphericity_test() {
        return Err(TestError::NotSupported(
            "sphericity tests for two-way interaction designs".into(),
        ));
    }

    let k = rm.n_conditions();
    let d = k - 1;
    if d == 1 {
        return Ok(SphericityResult::trivial());
    }

    let n = rm.n_subjects();
    if n < k + 1 {
        return Err(TestError::insufficient(format!(
            "sphericity with {k} conditions needs at least {} complete subjects, got {n}",
            k + 1
        )));
    }

    let dof = (d * (d + 1) / 2).saturating_sub(1).max(1);
    let s = contrast_covariance(rm)?;

    let eig: Vec<f64> = s.clone().symmetric_eigen().eigenvalues.iter().copied().collect();
    let (lo, hi) = eig
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &l| (lo.min(l), hi.max(l)));
    if hi <= 0.0 {
        return Err(TestError::insufficient(
            "contrast scores have no spread across subjects",
        ));
    }
    if lo <= SINGULAR_RATIO * hi {
        return Err(TestError::insufficient(
            "singular covariance of contrast scores",
        ));
    }

    let (w, chi2, p) = match method {
        SphericityMethod::Mauchly => {
            let df = d as f64;
            let total: f64 = eig.iter().sum();
            let w = eig.iter().product::<f64>() / (total / df).powi(d as i32);
            let (chi2, p) = mauchly_chi2(w, n, d, dof)?;
            (w, chi2, p)
        }
        SphericityMethod::Jns => {
            let df = d as f64;
            let w = greenhouse_geisser(&s, d)? * df;
            let chi2 = 0.5 * n as f64 * df * df * (w - 1.0 / df);
            let p = chi2_sf(chi2.max(0.0), dof as f64)?;
            (w, chi2, p)
        }
    };

    Ok(SphericityResult {
        spher: p > alpha,
        w: Some(round_to(w, REPORT_DECIMALS)),
        chi2: Some(round_to(chi2, REPORT_DECIMALS)),
        dof: Some(dof),
        p_value: Some(p),
    })
}

fn mauchly_chi2(w: f64, n: usize, d: usize, dof: usize) -> Result<(f64, f64)> {
    if w <= 0.0 {
        return Ok((f64::INFINITY, 0.0));
    }
    let (nm1, df) = ((n - 1) as f64, d as f64);
    let f = 1.0 - (2.0 * df * df + df + 2.0) / (6.0 * df * nm1);
    let w2 = (df + 2.0) * (df - 1.0) * (df - 2.0) * (2.0 * df.powi(3) + 6.0 * df * df + 3.0 * df + 2.0)
        / (288.0 * (nm1 * df * f).powi(2));
    let chi2 = (-nm1 * f * w.ln()).max(0.0);
    let p1 = chi2_sf(chi2, dof as f64)?;
    let p2 = chi2_sf(chi2, (dof + 4) as f64)?;
    Ok((chi2, (p1 + w2 * (p2 - p1)).clamp(0.0, 1.0)))
}
