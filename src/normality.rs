//! Univariate normality tests.
//!
//! [`normality`] dispatches one of three classical tests over every group of a
//! [`Dataset`] and reports one row per group. A group that is too small or has
//! no spread yields a failed row; the remaining groups are still tested.
//!
//! # Examples
//!
//! ```
//! use u_assumptions::{normality, Dataset, NormalityMethod};
//!
//! let data = Dataset::named([
//!     ("a", vec![-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5]),
//!     ("b", vec![1.0, 1.0]),
//! ]);
//! let table = normality(&data, None, NormalityMethod::Shapiro, 0.05).unwrap();
//! assert!(table.get("a").unwrap().stat().unwrap().normal);
//! assert!(table.get("b").unwrap().error().is_some());
//! ```

use std::fmt;
use std::str::FromStr;

use statrs::distribution::{ContinuousCDF, Normal};

use crate::config::check_alpha;
use crate::error::{Result, TestError};
use crate::moments::{self, chi2_sf, standard_normal};
use crate::result::{Statistic, TestRow, TestTable};
use crate::shape::{Columns, Dataset};

/// Normality test selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum NormalityMethod {
    /// Shapiro-Wilk W (Royston AS R94).
    #[default]
    Shapiro,
    /// D'Agostino-Pearson omnibus K².
    NormalTest,
    /// Jarque-Bera.
    JarqueBera,
}

impl NormalityMethod {
    /// Runs the selected test on one sample.
    pub fn test(self, data: &[f64]) -> Result<Statistic> {
        match self {
            Self::Shapiro => shapiro_wilk(data),
            Self::NormalTest => normaltest(data),
            Self::JarqueBera => jarque_bera(data),
        }
    }
}

impl FromStr for NormalityMethod {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "shapiro" => Ok(Self::Shapiro),
            "normaltest" => Ok(Self::NormalTest),
            "jarque_bera" => Ok(Self::JarqueBera),
            other => Err(TestError::InvalidParameter(format!(
                "unknown normality method {other:?}"
            ))),
        }
    }
}

impl fmt::Display for NormalityMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Shapiro => "shapiro",
            Self::NormalTest => "normaltest",
            Self::JarqueBera => "jarque_bera",
        })
    }
}

/// One successful normality row.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct NormalityStat {
    /// Test statistic.
    pub statistic: f64,
    /// p-value.
    pub p_value: f64,
    /// `p_value > alpha`.
    pub normal: bool,
}

/// Tests every group of `data` for normality.
///
/// `columns` selects the group and value columns of a long-format table; a
/// wide table is tested column by column and a single vector yields one row
/// labeled `"0"`. Missing values are dropped group by group.
///
/// # Errors
///
/// Shape errors and an invalid `alpha` abort the call. Per-group failures are
/// stored in the corresponding [`TestRow`].
pub fn normality(
    data: &Dataset,
    columns: Option<Columns<'_>>,
    method: NormalityMethod,
    alpha: f64,
) -> Result<TestTable<NormalityStat>> {
    let alpha = check_alpha(alpha)?;
    let samples = data.samples(columns)?;

    let rows = samples
        .iter()
        .map(|(name, values)| {
            let outcome = method.test(values).map(|s| NormalityStat {
                statistic: s.statistic,
                p_value: s.p_value,
                normal: s.p_value > alpha,
            });
            if let Err(e) = &outcome {
                tracing::warn!(group = name, %method, error = %e, "normality test skipped for group");
            }
            TestRow::new(name, outcome)
        })
        .collect();

    Ok(TestTable { rows })
}

/// Geometric z-score: the standard z-score of `ln(x)`, using the sample
/// standard deviation of the logs.
///
/// # Errors
///
/// - [`TestError::Domain`] if any value is ≤ 0 or not finite.
/// - [`TestError::InsufficientData`] for fewer than 2 values or identical values.
///
/// # Examples
///
/// ```
/// use u_assumptions::gzscore;
///
/// let z = gzscore(&[1.0, 10.0, 100.0]).unwrap();
/// assert!((z[0] + 1.0).abs() < 1e-12);
/// assert!(z[1].abs() < 1e-12);
/// assert!(gzscore(&[1.0, 0.0]).is_err());
/// ```
pub fn gzscore(x: &[f64]) -> Result<Vec<f64>> {
    if let Some(bad) = x.iter().find(|&&v| !(v.is_finite() && v > 0.0)) {
        return Err(TestError::Domain(format!(
            "gzscore requires strictly positive finite values, got {bad}"
        )));
    }
    if x.len() < 2 {
        return Err(TestError::insufficient("gzscore needs at least 2 values"));
    }
    let logs: Vec<f64> = x.iter().map(|v| v.ln()).collect();
    let mean = moments::mean(&logs);
    let sd = moments::variance(&logs).sqrt();
    if sd < 1e-300 {
        return Err(TestError::insufficient("all values are identical"));
    }
    Ok(logs.iter().map(|l| (l - mean) / sd).collect())
}

fn check_sample(data: &[f64], min: usize, name: &str) -> Result<()> {
    if data.len() < min {
        return Err(TestError::insufficient(format!(
            "{name} needs at least {min} values, got {}",
            data.len()
        )));
    }
    if !moments::all_finite(data) {
        return Err(TestError::Domain(format!("{name} requires finite values")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Jarque-Bera
// ---------------------------------------------------------------------------

/// Jarque-Bera normality test: H₀: data is normally distributed.
///
/// # Algorithm
///
/// JB = (n/6) · [S² + (K²/4)]
///
/// where S = biased skewness, K = biased excess kurtosis. JB ~ χ²(2) under H₀.
///
/// # References
///
/// Jarque & Bera (1987). "A test for normality of observations and
/// regression residuals". International Statistical Review, 55(2), 163–172.
pub fn jarque_bera(data: &[f64]) -> Result<Statistic> {
    check_sample(data, 3, "Jarque-Bera")?;
    let (m2, _, _) = moments::central_moments(data);
    if m2 < 1e-300 {
        return Err(TestError::insufficient("zero variance"));
    }

    let s = moments::skewness(data);
    let k = moments::kurtosis(data) - 3.0;
    let nf = data.len() as f64;
    let jb = (nf / 6.0) * (s * s + k * k / 4.0);

    Ok(Statistic {
        statistic: jb,
        p_value: chi2_sf(jb, 2.0)?,
    })
}

// ---------------------------------------------------------------------------
// D'Agostino-Pearson
// ---------------------------------------------------------------------------

/// D'Agostino-Pearson omnibus test: K² = Z(√b₁)² + Z(b₂)² ~ χ²(2).
///
/// Combines the skewness test (D'Agostino 1970) and the kurtosis test
/// (Anscombe & Glynn 1983). Requires at least 8 observations.
///
/// # References
///
/// D'Agostino & Pearson (1973). "Tests for departure from normality".
/// Biometrika, 60(3), 613–622.
pub fn normaltest(data: &[f64]) -> Result<Statistic> {
    check_sample(data, 8, "D'Agostino-Pearson")?;
    let (m2, _, _) = moments::central_moments(data);
    if m2 < 1e-300 {
        return Err(TestError::insufficient("zero variance"));
    }

    let zs = skew_z(data);
    let zk = kurtosis_z(data);
    let k2 = zs * zs + zk * zk;
    if !k2.is_finite() {
        return Err(TestError::numerical("non-finite K² statistic"));
    }

    Ok(Statistic {
        statistic: k2,
        p_value: chi2_sf(k2, 2.0)?,
    })
}

fn skew_z(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    let b2 = moments::skewness(data);
    let y = b2 * ((n + 1.0) * (n + 3.0) / (6.0 * (n - 2.0))).sqrt();
    let beta2 = 3.0 * (n * n + 27.0 * n - 70.0) * (n + 1.0) * (n + 3.0)
        / ((n - 2.0) * (n + 5.0) * (n + 7.0) * (n + 9.0));
    let w2 = -1.0 + (2.0 * (beta2 - 1.0)).sqrt();
    let delta = 1.0 / (0.5 * w2.ln()).sqrt();
    let alpha = (2.0 / (w2 - 1.0)).sqrt();
    delta * (y / alpha).asinh()
}

fn kurtosis_z(data: &[f64]) -> f64 {
    let n = data.len() as f64;
    let b2 = moments::kurtosis(data);
    let e = 3.0 * (n - 1.0) / (n + 1.0);
    let var_b2 =
        24.0 * n * (n - 2.0) * (n - 3.0) / ((n + 1.0) * (n + 1.0) * (n + 3.0) * (n + 5.0));
    let x = (b2 - e) / var_b2.sqrt();
    let sqrt_beta1 = 6.0 * (n * n - 5.0 * n + 2.0) / ((n + 7.0) * (n + 9.0))
        * (6.0 * (n + 3.0) * (n + 5.0) / (n * (n - 2.0) * (n - 3.0))).sqrt();
    let a = 6.0 + 8.0 / sqrt_beta1 * (2.0 / sqrt_beta1 + (1.0 + 4.0 / (sqrt_beta1 * sqrt_beta1)).sqrt());
    let term1 = 1.0 - 2.0 / (9.0 * a);
    let denom = 1.0 + x * (2.0 / (a - 4.0)).sqrt();
    if denom == 0.0 {
        return f64::NAN;
    }
    let term2 = denom.signum() * ((1.0 - 2.0 / a) / denom.abs()).cbrt();
    (term1 - term2) / (2.0 / (9.0 * a)).sqrt()
}

// ---------------------------------------------------------------------------
// Shapiro-Wilk
// ---------------------------------------------------------------------------

/// Shapiro-Wilk normality test: H₀: data is normally distributed.
///
/// The most powerful general normality test for small to moderate samples.
///
/// # Algorithm
///
/// Uses the Royston (1992, 1995) algorithm (AS R94):
/// 1. Compute coefficients from normal order statistics (Blom approximation)
/// 2. Calculate W = (Σ aᵢ x₍ᵢ₎)² / Σ (xᵢ - x̄)²
/// 3. Transform W to z-score via log-normal approximation
/// 4. Compute p-value from standard normal distribution
///
/// # Supported range
///
/// n = 3..5000.
///
/// # References
///
/// - Shapiro & Wilk (1965). "An analysis of variance test for normality".
///   Biometrika, 52(3–4), 591–611.
/// - Royston (1992). "Approximating the Shapiro-Wilk W-test for
///   non-normality". Statistics and Computing, 2, 117–119.
/// - Royston (1995). "Remark AS R94: A remark on Algorithm AS 181".
///   Applied Statistics, 44(4), 547–551.
///
/// # Examples
///
/// ```
/// use u_assumptions::normality::shapiro_wilk;
///
/// let data = [-1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
/// let r = shapiro_wilk(&data).unwrap();
/// assert!(r.statistic > 0.9);
/// assert!(r.p_value > 0.05);
/// ```
pub fn shapiro_wilk(data: &[f64]) -> Result<Statistic> {
    let n = data.len();
    if n > 5000 {
        return Err(TestError::InsufficientData(format!(
            "Shapiro-Wilk supports at most 5000 values, got {n}"
        )));
    }
    check_sample(data, 3, "Shapiro-Wilk")?;

    let mut x: Vec<f64> = data.to_vec();
    x.sort_by(f64::total_cmp);

    if x[n - 1] - x[0] < 1e-300 {
        return Err(TestError::insufficient("all values are identical"));
    }

    if n == 3 {
        return Ok(shapiro_wilk_n3(&x));
    }

    let normal = standard_normal()?;
    let nn2 = n / 2;
    let a = sw_coefficients(&normal, n, nn2)?;
    let w = sw_statistic(&x, &a, n, nn2);
    if !(0.0..=1.0 + 1e-10).contains(&w) {
        return Err(TestError::numerical(format!("W statistic out of range: {w}")));
    }
    let w = w.min(1.0);

    Ok(Statistic {
        statistic: w,
        p_value: sw_p_value(&normal, w, n).clamp(0.0, 1.0),
    })
}

// n = 3: a = [√½, 0, −√½], exact p-value
fn shapiro_wilk_n3(x: &[f64]) -> Statistic {
    let a1 = std::f64::consts::FRAC_1_SQRT_2;
    let mean = (x[0] + x[1] + x[2]) / 3.0;
    let ss = x.iter().map(|&v| (v - mean).powi(2)).sum::<f64>();

    let numerator = a1 * (x[2] - x[0]);
    let w = ((numerator * numerator) / ss).clamp(0.75, 1.0);
    let p = 1.0 - (6.0 / std::f64::consts::PI) * w.sqrt().acos();

    Statistic {
        statistic: w,
        p_value: p.clamp(0.0, 1.0),
    }
}

// Royston polynomial coefficients (AS R94)
const SW_C1: [f64; 6] = [0.0, 0.221157, -0.147981, -2.07119, 4.434685, -2.706056];
const SW_C2: [f64; 6] = [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];
const SW_C3: [f64; 4] = [0.544, -0.39978, 0.025054, -6.714e-4];
const SW_C4: [f64; 4] = [1.3822, -0.77857, 0.062767, -0.0020322];
const SW_C5: [f64; 4] = [-1.5861, -0.31082, -0.083751, 0.0038915];
const SW_C6: [f64; 3] = [-0.4803, -0.082676, 0.0030302];
const SW_G: [f64; 2] = [-2.273, 0.459];

// c[0] + c[1]*x + c[2]*x^2 + ... (Horner)
fn sw_poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

fn sw_coefficients(normal: &Normal, n: usize, nn2: usize) -> Result<Vec<f64>> {
    // Blom's approximation of expected normal order statistics
    let m: Vec<f64> = (0..nn2)
        .map(|i| normal.inverse_cdf((i as f64 + 1.0 - 0.375) / (n as f64 + 0.25)))
        .collect();
    let summ2 = 2.0 * m.iter().map(|mi| mi * mi).sum::<f64>();
    let ssumm2 = summ2.sqrt();
    let rsn = 1.0 / (n as f64).sqrt();

    let a1 = sw_poly(&SW_C1, rsn) - m[0] / ssumm2;
    // n = 4, 5 correct only a[0]; larger samples also correct a[1]
    let corrected = if n <= 5 { 1 } else { 2 };
    let mut a = vec![0.0; nn2];
    a[0] = a1;
    let (fac_sq, one_minus) = if corrected == 1 {
        (summ2 - 2.0 * m[0] * m[0], 1.0 - 2.0 * a1 * a1)
    } else {
        let a2 = -m[1] / ssumm2 + sw_poly(&SW_C2, rsn);
        a[1] = a2;
        (
            summ2 - 2.0 * m[0] * m[0] - 2.0 * m[1] * m[1],
            1.0 - 2.0 * a1 * a1 - 2.0 * a2 * a2,
        )
    };
    if fac_sq <= 0.0 || one_minus <= 0.0 {
        return Err(TestError::numerical("degenerate Shapiro-Wilk coefficients"));
    }
    let fac = (fac_sq / one_minus).sqrt();
    for i in corrected..nn2 {
        a[i] = -m[i] / fac;
    }
    Ok(a)
}

fn sw_statistic(x: &[f64], a: &[f64], n: usize, nn2: usize) -> f64 {
    let sa: f64 = (0..nn2).map(|i| a[i] * (x[n - 1 - i] - x[i])).sum();
    let mean = x.iter().sum::<f64>() / n as f64;
    let ss: f64 = x.iter().map(|&v| (v - mean).powi(2)).sum();
    (sa * sa) / ss
}

fn sw_p_value(normal: &Normal, w: f64, n: usize) -> f64 {
    let nf = n as f64;
    let w1 = 1.0 - w;
    if w1 <= 0.0 {
        return 1.0;
    }
    let y = w1.ln();

    let (z, valid) = if n <= 11 {
        // small samples: gamma + log transformation
        let gamma = sw_poly(&SW_G, nf);
        if y >= gamma {
            return 0.0;
        }
        let y2 = -(gamma - y).ln();
        let m = sw_poly(&SW_C3, nf);
        let s = sw_poly(&SW_C4, nf).exp();
        ((y2 - m) / s, s >= 1e-300)
    } else {
        let xx = nf.ln();
        let m = sw_poly(&SW_C5, xx);
        let s = sw_poly(&SW_C6, xx).exp();
        ((y - m) / s, s >= 1e-300)
    };
    if !valid {
        return 0.0;
    }
    normal.sf(z)
}
