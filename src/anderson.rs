//! Anderson-Darling goodness of fit.
//!
//! [`anderson`] runs the one-sample test against a fitted reference
//! distribution, or the k-sample test of Scholz & Stephens when a second
//! sample is supplied.
//!
//! # References
//!
//! - Anderson & Darling (1952). "Asymptotic theory of certain goodness of
//!   fit criteria based on stochastic processes". Annals of Mathematical
//!   Statistics, 23(2), 193–212.
//! - Stephens (1974). "EDF statistics for goodness of fit and some
//!   comparisons". JASA, 69, 730–737.
//! - Stephens (1977). "Goodness of fit for the extreme value distribution".
//!   Biometrika, 64, 583–588.
//! - Stephens (1979). "Tests of fit for the logistic distribution based on
//!   the empirical distribution function". Biometrika, 66, 591–595.
//! - Scholz & Stephens (1987). "K-sample Anderson-Darling tests". JASA,
//!   82(399), 918–924.

use std::fmt;
use std::str::FromStr;

use nalgebra::{DMatrix, DVector};
use statrs::distribution::ContinuousCDF;

use crate::config::{round_to, CRITICAL_DECIMALS};
use crate::error::{Result, TestError};
use crate::moments::{self, standard_normal};

/// Reference distribution of the one-sample test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Distribution {
    /// Normal, location and scale from the sample mean and sd.
    #[default]
    Normal,
    /// Exponential, scale from the sample mean.
    Exponential,
    /// Logistic, maximum-likelihood location and scale.
    Logistic,
    /// Right-skewed Gumbel (maxima), maximum likelihood.
    GumbelR,
    /// Left-skewed Gumbel (minima), maximum likelihood.
    GumbelL,
}

impl FromStr for Distribution {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "norm" => Ok(Self::Normal),
            "expon" => Ok(Self::Exponential),
            "logistic" => Ok(Self::Logistic),
            "gumbel_r" => Ok(Self::GumbelR),
            "gumbel_l" | "gumbel" | "extreme1" => Ok(Self::GumbelL),
            other => Err(TestError::UnsupportedDistribution(other.to_string())),
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "norm",
            Self::Exponential => "expon",
            Self::Logistic => "logistic",
            Self::GumbelR => "gumbel_r",
            Self::GumbelL => "gumbel_l",
        })
    }
}

/// One-sample result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GoodnessOfFit {
    /// Reference distribution.
    pub distribution: Distribution,
    /// A² statistic.
    pub statistic: f64,
    /// Critical values, rounded to [`CRITICAL_DECIMALS`].
    pub critical_values: Vec<f64>,
    /// Significance levels (percent) matching `critical_values`.
    pub significance_levels: Vec<f64>,
    /// `true` if the statistic lies below at least one critical value.
    pub from_dist: bool,
    /// Significance level whose critical value is closest to the statistic.
    pub sig_level: f64,
}

/// k-sample result.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct KSampleResult {
    /// Normalized k-sample statistic.
    pub statistic: f64,
    /// Critical values for [`KSAMPLE_SIGNIFICANCE`].
    pub critical_values: Vec<f64>,
    /// Approximate p-value, limited to [0.001, 0.25].
    pub p_value: f64,
}

/// Outcome of [`anderson`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AndersonOutcome {
    /// Fit of one sample to a reference distribution.
    OneSample(GoodnessOfFit),
    /// Whether two samples come from the same distribution.
    TwoSample(KSampleResult),
}

/// Anderson-Darling test.
///
/// Without `y`, tests whether `x` follows `dist` (`"norm"`, `"expon"`,
/// `"logistic"`, `"gumbel_r"`, `"gumbel_l"`; `"gumbel"` and `"extreme1"` are
/// aliases of `"gumbel_l"`). With `y`, tests whether both samples come from a
/// common distribution and `dist` is ignored.
///
/// # Errors
///
/// - [`TestError::UnsupportedDistribution`] for an unknown `dist`.
/// - [`TestError::InsufficientData`] for too few values or no spread.
/// - [`TestError::Domain`] for non-finite values, or negative values with `"expon"`.
///
/// # Examples
///
/// ```
/// use u_assumptions::{anderson, AndersonOutcome};
///
/// let x = [-1.5, -1.0, -0.6, -0.2, 0.0, 0.2, 0.6, 1.0, 1.5];
/// match anderson(&x, None, "norm").unwrap() {
///     AndersonOutcome::OneSample(fit) => assert!(fit.from_dist),
///     AndersonOutcome::TwoSample(_) => unreachable!(),
/// }
/// ```
pub fn anderson(x: &[f64], y: Option<&[f64]>, dist: &str) -> Result<AndersonOutcome> {
    match y {
        Some(y) => anderson_ksamp(&[x, y]).map(AndersonOutcome::TwoSample),
        None => {
            let dist: Distribution = dist.parse()?;
            anderson_one_sample(x, dist).map(AndersonOutcome::OneSample)
        }
    }
}

// ---------------------------------------------------------------------------
// One sample
// ---------------------------------------------------------------------------

const SIG_FIVE: [f64; 5] = [15.0, 10.0, 5.0, 2.5, 1.0];
const SIG_GUMBEL: [f64; 5] = [25.0, 10.0, 5.0, 2.5, 1.0];
const SIG_LOGISTIC: [f64; 6] = [25.0, 10.0, 5.0, 2.5, 1.0, 0.5];

const A_NORM: [f64; 5] = [0.576, 0.656, 0.787, 0.918, 1.092];
const A_EXPON: [f64; 5] = [0.922, 1.078, 1.341, 1.606, 1.957];
const A_LOGISTIC: [f64; 6] = [0.426, 0.563, 0.660, 0.769, 0.906, 1.010];
const A_GUMBEL: [f64; 5] = [0.474, 0.637, 0.757, 0.877, 1.038];

/// One-sample Anderson-Darling test with parameters estimated from `x`.
///
/// # Algorithm
///
/// With w₍ᵢ₎ the standardized order statistics under the fitted distribution F:
///
/// A² = −n − Σᵢ (2i−1)/n · [ln F(w₍ᵢ₎) + ln(1 − F(w₍ₙ₊₁₋ᵢ₎))]
///
/// Critical values follow Stephens' tables, adjusted for n.
pub fn anderson_one_sample(x: &[f64], dist: Distribution) -> Result<GoodnessOfFit> {
    let n = x.len();
    if n < 2 {
        return Err(TestError::InsufficientData(format!(
            "Anderson-Darling needs at least 2 values, got {n}"
        )));
    }
    if !moments::all_finite(x) {
        return Err(TestError::Domain("Anderson-Darling requires finite values".into()));
    }

    let mut y = x.to_vec();
    y.sort_by(f64::total_cmp);
    if y[n - 1] - y[0] < 1e-300 {
        return Err(TestError::insufficient("all values are identical"));
    }

    let nf = n as f64;
    let (log_cdf, log_sf, table, sig): (Vec<f64>, Vec<f64>, Vec<f64>, &[f64]) = match dist {
        Distribution::Normal => {
            let mean = moments::mean(&y);
            let sd = moments::variance(&y).sqrt();
            let normal = standard_normal()?;
            let w: Vec<f64> = y.iter().map(|v| (v - mean) / sd).collect();
            (
                w.iter().map(|&z| normal.cdf(z).ln()).collect(),
                w.iter().map(|&z| normal.sf(z).ln()).collect(),
                scale(&A_NORM, 1.0 + 4.0 / nf - 25.0 / (nf * nf)),
                &SIG_FIVE[..],
            )
        }
        Distribution::Exponential => {
            if y[0] < 0.0 {
                return Err(TestError::Domain(
                    "exponential fit requires non-negative values".into(),
                ));
            }
            let mean = moments::mean(&y);
            let w: Vec<f64> = y.iter().map(|v| v / mean).collect();
            (
                w.iter().map(|&z| (-(-z).exp_m1()).ln()).collect(),
                w.iter().map(|&z| -z).collect(),
                scale(&A_EXPON, 1.0 + 0.6 / nf),
                &SIG_FIVE[..],
            )
        }
        Distribution::Logistic => {
            let (loc, s) = fit_logistic(&y)?;
            let w: Vec<f64> = y.iter().map(|v| (v - loc) / s).collect();
            (
                w.iter().map(|&z| -softplus(-z)).collect(),
                w.iter().map(|&z| -softplus(z)).collect(),
                scale(&A_LOGISTIC, 1.0 + 0.25 / nf),
                &SIG_LOGISTIC[..],
            )
        }
        Distribution::GumbelR => {
            let (loc, s) = fit_gumbel_r(&y)?;
            let w: Vec<f64> = y.iter().map(|v| (v - loc) / s).collect();
            (
                w.iter().map(|&z| -(-z).exp()).collect(),
                w.iter().map(|&z| (-(-(-z).exp()).exp_m1()).ln()).collect(),
                scale(&A_GUMBEL, 1.0 + 0.2 / nf.sqrt()),
                &SIG_GUMBEL[..],
            )
        }
        Distribution::GumbelL => {
            let mirrored: Vec<f64> = y.iter().rev().map(|v| -v).collect();
            let (loc_r, s) = fit_gumbel_r(&mirrored)?;
            let loc = -loc_r;
            let w: Vec<f64> = y.iter().map(|v| (v - loc) / s).collect();
            (
                w.iter().map(|&z| (-(-z.exp()).exp_m1()).ln()).collect(),
                w.iter().map(|&z| -z.exp()).collect(),
                scale(&A_GUMBEL, 1.0 + 0.2 / nf.sqrt()),
                &SIG_GUMBEL[..],
            )
        }
    };

    let s: f64 = (0..n)
        .map(|i| (2 * i + 1) as f64 / nf * (log_cdf[i] + log_sf[n - 1 - i]))
        .sum();
    let a2 = -nf - s;
    if a2.is_nan() {
        return Err(TestError::numerical("non-finite A² statistic"));
    }

    let critical_values: Vec<f64> = table.iter().map(|c| round_to(*c, CRITICAL_DECIMALS)).collect();
    let from_dist = critical_values.iter().any(|&c| a2 < c);
    let closest = critical_values
        .iter()
        .enumerate()
        .min_by(|a, b| (a2 - a.1).abs().total_cmp(&(a2 - b.1).abs()))
        .map_or(0, |(i, _)| i);

    Ok(GoodnessOfFit {
        distribution: dist,
        statistic: a2,
        sig_level: sig[closest],
        critical_values,
        significance_levels: sig.to_vec(),
        from_dist,
    })
}

fn scale(table: &[f64], divisor: f64) -> Vec<f64> {
    table.iter().map(|a| a / divisor).collect()
}

// ln(1 + eᶻ) without overflow
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

const FIT_MAX_ITER: usize = 200;

/// Maximum-likelihood logistic fit by Newton iteration on the score equations
///
/// Σ 1/(1 + eᵗ) = n/2,  Σ t·tanh(t/2) = n,  t = (x − loc)/s,
///
/// started from the sample mean and sd.
fn fit_logistic(x: &[f64]) -> Result<(f64, f64)> {
    let nf = x.len() as f64;
    let mut loc = moments::mean(x);
    let mut s = moments::variance(x).sqrt();

    for _ in 0..FIT_MAX_ITER {
        let (mut f1, mut f2) = (-0.5 * nf, nf);
        let (mut j11, mut j12, mut j21, mut j22) = (0.0, 0.0, 0.0, 0.0);
        for &v in x {
            let t = (v - loc) / s;
            let lower = 1.0 / (1.0 + t.exp());
            let density = lower * (1.0 - lower);
            let th = (0.5 * t).tanh();
            let dg = th + 0.5 * t * (1.0 - th * th);
            f1 += lower;
            f2 -= t * th;
            j11 += density / s;
            j12 += density * t / s;
            j21 += dg / s;
            j22 += dg * t / s;
        }
        let det = j11 * j22 - j12 * j21;
        if det == 0.0 || !det.is_finite() {
            return Err(TestError::numerical("singular Jacobian in logistic fit"));
        }
        let d_loc = -(f1 * j22 - f2 * j12) / det;
        let mut d_s = -(j11 * f2 - j21 * f1) / det;
        while s + d_s <= 0.0 {
            d_s *= 0.5;
        }
        loc += d_loc;
        s += d_s;
        if d_loc.abs() <= 1e-12 * (1.0 + loc.abs()) && d_s.abs() <= 1e-12 * s {
            return Ok((loc, s));
        }
    }
    tracing::debug!(loc, scale = s, "logistic fit stopped at iteration limit");
    Ok((loc, s))
}

/// Maximum-likelihood fit of the right-skewed Gumbel distribution.
///
/// The scale solves b = x̄ − Σ xᵢe^(−xᵢ/b) / Σ e^(−xᵢ/b), which is monotone in
/// b and is found by bisection; loc = −b ln(mean(e^(−x/b))).
fn fit_gumbel_r(x: &[f64]) -> Result<(f64, f64)> {
    let mean = moments::mean(x);
    let u: Vec<f64> = x.iter().map(|v| v - mean).collect();
    let u_min = u.iter().copied().fold(f64::INFINITY, f64::min);
    let u_max = u.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if u_max - u_min < 1e-300 {
        return Err(TestError::insufficient("all values are identical"));
    }

    // h(b) = b + Σ uᵢwᵢ / Σ wᵢ, wᵢ = e^(−(uᵢ − u_min)/b)
    let h = |b: f64| {
        let (mut num, mut den) = (0.0, 0.0);
        for &ui in &u {
            let w = (-(ui - u_min) / b).exp();
            num += ui * w;
            den += w;
        }
        b + num / den
    };

    let (mut lo, mut hi) = (1e-12 * (u_max - u_min), u_max - u_min);
    let mut converged = false;
    for _ in 0..FIT_MAX_ITER {
        let mid = 0.5 * (lo + hi);
        if h(mid) > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
        if hi - lo <= 1e-14 * hi {
            converged = true;
            break;
        }
    }
    if !converged {
        tracing::debug!(lo, hi, "Gumbel scale bisection stopped at iteration limit");
    }
    let b = 0.5 * (lo + hi);

    let mean_w = u.iter().map(|ui| (-(ui - u_min) / b).exp()).sum::<f64>() / u.len() as f64;
    let loc = mean + u_min - b * mean_w.ln();
    if !loc.is_finite() || !b.is_finite() {
        return Err(TestError::numerical("non-finite Gumbel parameters"));
    }
    Ok((loc, b))
}

// ---------------------------------------------------------------------------
// k samples
// ---------------------------------------------------------------------------

/// Significance levels of the k-sample critical values.
pub const KSAMPLE_SIGNIFICANCE: [f64; 7] = [0.25, 0.1, 0.05, 0.025, 0.01, 0.005, 0.001];

const KS_B0: [f64; 7] = [0.675, 1.281, 1.645, 1.96, 2.326, 2.573, 3.085];
const KS_B1: [f64; 7] = [-0.245, 0.25, 0.678, 1.149, 1.822, 2.364, 3.615];
const KS_B2: [f64; 7] = [-0.105, -0.305, -0.362, -0.391, -0.396, -0.345, -0.154];

/// k-sample Anderson-Darling test: H₀: all samples share one distribution.
///
/// # Algorithm
///
/// 1. Compute A²akN over the distinct pooled values, using mid-ranks for ties
/// 2. Standardize: T = (A²akN − (k − 1)) / σ_N
/// 3. Critical values t_m(α) = b₀ + b₁/√m + b₂/m with m = k − 1
/// 4. p-value from a quadratic fit of ln(α) on the critical values
///
/// # References
///
/// Scholz & Stephens (1987). "K-sample Anderson-Darling tests". JASA,
/// 82(399), 918–924.
pub fn anderson_ksamp(samples: &[&[f64]]) -> Result<KSampleResult> {
    let k = samples.len();
    if k < 2 {
        return Err(TestError::InsufficientGroups { got: k });
    }
    if samples.iter().any(|s| s.is_empty()) {
        return Err(TestError::insufficient("every sample needs at least 1 value"));
    }
    if samples.iter().any(|s| !moments::all_finite(s)) {
        return Err(TestError::Domain("k-sample test requires finite values".into()));
    }

    let mut z: Vec<f64> = samples.iter().flat_map(|s| s.iter().copied()).collect();
    z.sort_by(f64::total_cmp);
    let n_total = z.len();
    if n_total < 4 {
        return Err(TestError::InsufficientData(format!(
            "k-sample test needs at least 4 pooled values, got {n_total}"
        )));
    }
    let mut z_star = z.clone();
    z_star.dedup();
    if z_star.len() < 2 {
        return Err(TestError::insufficient("pooled sample has a single distinct value"));
    }

    let a2akn = midrank_statistic(samples, &z, &z_star);

    let nf = n_total as f64;
    let kf = k as f64;
    let big_h: f64 = samples.iter().map(|s| 1.0 / s.len() as f64).sum();
    // hs[j] = Σ_{i=N-1-j}^{N-1} 1/i: cumulative sum of 1/(N-1), 1/(N-2), …, 1/2
    let hs: Vec<f64> = (2..n_total)
        .rev()
        .scan(0.0, |acc, i| {
            *acc += 1.0 / i as f64;
            Some(*acc)
        })
        .collect();
    let h = hs.last().copied().unwrap_or(0.0) + 1.0;
    let g: f64 = hs.iter().enumerate().map(|(j, v)| v / (j + 2) as f64).sum();

    let a = (4.0 * g - 6.0) * (kf - 1.0) + (10.0 - 6.0 * g) * big_h;
    let b = (2.0 * g - 4.0) * kf * kf + 8.0 * h * kf + (2.0 * g - 14.0 * h - 4.0) * big_h - 8.0 * h
        + 4.0 * g
        - 6.0;
    let c = (6.0 * h + 2.0 * g - 2.0) * kf * kf + (4.0 * h - 4.0 * g + 6.0) * kf
        + (2.0 * h - 6.0) * big_h
        + 4.0 * h;
    let d = (2.0 * h + 6.0) * kf * kf - 4.0 * h * kf;
    let sigma_sq = (a * nf.powi(3) + b * nf * nf + c * nf + d) / ((nf - 1.0) * (nf - 2.0) * (nf - 3.0));
    if sigma_sq <= 0.0 || !sigma_sq.is_finite() {
        return Err(TestError::numerical("non-positive variance of the k-sample statistic"));
    }

    let m = kf - 1.0;
    let statistic = (a2akn - m) / sigma_sq.sqrt();

    let critical_values: Vec<f64> = (0..7)
        .map(|i| KS_B0[i] + KS_B1[i] / m.sqrt() + KS_B2[i] / m)
        .collect();
    let p_value = ksamp_p_value(statistic, &critical_values)?;

    Ok(KSampleResult {
        statistic,
        critical_values,
        p_value,
    })
}

fn midrank_statistic(samples: &[&[f64]], z: &[f64], z_star: &[f64]) -> f64 {
    let nf = z.len() as f64;
    let ties = z.len() != z_star.len();

    // lj: multiplicity of each distinct value, bj: its mid-rank position
    let (lj, bj): (Vec<f64>, Vec<f64>) = z_star
        .iter()
        .map(|&v| {
            let left = z.partition_point(|&x| x < v);
            let l = if ties {
                (z.partition_point(|&x| x <= v) - left) as f64
            } else {
                1.0
            };
            (l, left as f64 + l / 2.0)
        })
        .unzip();

    let mut total = 0.0;
    for sample in samples {
        let mut s = sample.to_vec();
        s.sort_by(f64::total_cmp);
        let ni = s.len() as f64;
        let inner: f64 = z_star
            .iter()
            .enumerate()
            .map(|(j, &v)| {
                let right = s.partition_point(|&x| x <= v);
                let left = s.partition_point(|&x| x < v);
                let mij = right as f64 - (right - left) as f64 / 2.0;
                lj[j] / nf * (nf * mij - bj[j] * ni).powi(2)
                    / (bj[j] * (nf - bj[j]) - nf * lj[j] / 4.0)
            })
            .sum();
        total += inner / ni;
    }
    total * (nf - 1.0) / nf
}

fn ksamp_p_value(statistic: f64, critical: &[f64]) -> Result<f64> {
    let lo = critical.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = critical.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if statistic < lo {
        tracing::warn!(statistic, "p-value capped: true value larger than 0.25");
        return Ok(0.25);
    }
    if statistic > hi {
        tracing::warn!(statistic, "p-value floored: true value smaller than 0.001");
        return Ok(0.001);
    }

    // least-squares quadratic ln(sig) ≈ c₂t² + c₁t + c₀
    let x = DMatrix::from_fn(critical.len(), 3, |i, j| critical[i].powi(2 - j as i32));
    let y = DVector::from_iterator(critical.len(), KSAMPLE_SIGNIFICANCE.iter().map(|s| s.ln()));
    let coef = x
        .svd(true, true)
        .solve(&y, 1e-12)
        .map_err(TestError::numerical)?;
    Ok((coef[0] * statistic * statistic + coef[1] * statistic + coef[2]).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{approx_eq, DEFAULT_ALPHA};
    use crate::ErrorKind;

    fn one(outcome: AndersonOutcome) -> GoodnessOfFit {
        match outcome {
            AndersonOutcome::OneSample(r) => r,
            AndersonOutcome::TwoSample(_) => panic!("expected one-sample outcome"),
        }
    }

    fn quantiles<F: Fn(f64) -> f64>(n: usize, q: F) -> Vec<f64> {
        (1..=n).map(|i| q((i as f64 - 0.5) / n as f64)).collect()
    }

    #[test]
    fn normal_quantiles_fit_normal() {
        let normal = standard_normal().unwrap();
        let x = quantiles(50, |p| 3.0 + 2.0 * normal.inverse_cdf(p));
        let r = one(anderson(&x, None, "norm").unwrap());
        assert!(r.from_dist);
        assert!(r.statistic < 0.3, "A² = {}", r.statistic);
        assert_eq!(r.significance_levels, SIG_FIVE);
        assert_eq!(r.sig_level, 15.0);
    }

    #[test]
    fn normal_critical_values_adjusted() {
        let x: Vec<f64> = (0..10).map(|i| (i * i) as f64).collect();
        let r = anderson_one_sample(&x, Distribution::Normal).unwrap();
        // 0.576 / (1 + 0.4 − 0.25) = 0.50087
        assert_eq!(r.critical_values[0], 0.501);
        assert_eq!(r.critical_values.len(), 5);
    }

    #[test]
    fn exponential_quantiles() {
        let x = quantiles(40, |p| -(1.0 - p).ln() * 5.0);
        let r = one(anderson(&x, None, "expon").unwrap());
        assert!(r.from_dist, "A² = {}", r.statistic);
        assert_eq!(r.critical_values[0], round_to(0.922 / 1.015, 3));
        let err = anderson(&[-1.0, 2.0, 3.0], None, "expon").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn skewed_data_rejects_normal() {
        let x = quantiles(60, |p| -(1.0 - p).ln());
        let r = anderson_one_sample(&x, Distribution::Normal).unwrap();
        assert!(!r.from_dist, "A² = {}", r.statistic);
        assert_eq!(r.sig_level, 1.0);
    }

    #[test]
    fn logistic_fit_recovers_parameters() {
        let x = quantiles(80, |p| 2.0 + 0.5 * (p / (1.0 - p)).ln());
        let (loc, s) = fit_logistic(&x).unwrap();
        assert!(approx_eq(loc, 2.0), "loc = {loc}");
        assert!((s - 0.5).abs() < 0.05, "scale = {s}");
        let r = anderson_one_sample(&x, Distribution::Logistic).unwrap();
        assert!(r.from_dist);
        assert_eq!(r.significance_levels.len(), 6);
    }

    #[test]
    fn gumbel_fits() {
        let right = quantiles(60, |p| 1.0 - 2.0 * (-p.ln()).ln());
        let (loc, s) = fit_gumbel_r(&right).unwrap();
        assert!((loc - 1.0).abs() < 0.2, "loc = {loc}");
        assert!((s - 2.0).abs() < 0.2, "scale = {s}");
        let r = one(anderson(&right, None, "gumbel_r").unwrap());
        assert!(r.from_dist, "A² = {}", r.statistic);

        let left: Vec<f64> = right.iter().map(|v| -v).collect();
        for name in ["gumbel_l", "gumbel", "extreme1"] {
            let r = one(anderson(&left, None, name).unwrap());
            assert_eq!(r.distribution, Distribution::GumbelL);
            assert!(r.from_dist, "A² = {}", r.statistic);
        }
    }

    #[test]
    fn unknown_distribution() {
        let err = anderson(&[1.0, 2.0, 3.0], None, "weibull").unwrap_err();
        assert_eq!(err, TestError::UnsupportedDistribution("weibull".into()));
    }

    #[test]
    fn one_sample_edge_cases() {
        assert!(anderson_one_sample(&[1.0], Distribution::Normal).is_err());
        assert!(anderson_one_sample(&[2.0, 2.0, 2.0], Distribution::Logistic).is_err());
        assert_eq!(
            anderson_one_sample(&[1.0, f64::NAN], Distribution::Normal)
                .unwrap_err()
                .kind(),
            ErrorKind::Domain
        );
    }

    #[test]
    fn two_sample_ignores_dist() {
        let x: Vec<f64> = (0..30).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = (0..30).map(|i| i as f64 * 0.5 + 0.25).collect();
        match anderson(&x, Some(y.as_slice()), "not-a-distribution").unwrap() {
            AndersonOutcome::TwoSample(r) => {
                assert!(r.statistic < 0.0, "T = {}", r.statistic);
                assert_eq!(r.p_value, 0.25);
                assert_eq!(r.critical_values.len(), 7);
            }
            AndersonOutcome::OneSample(_) => panic!("expected two-sample outcome"),
        }
    }

    #[test]
    fn two_sample_separated() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let y: Vec<f64> = (0..20).map(|i| f64::from(i) + 15.0).collect();
        let r = anderson_ksamp(&[&x, &y]).unwrap();
        assert_eq!(r.p_value, 0.001);
    }

    #[test]
    fn two_sample_critical_values() {
        let r = anderson_ksamp(&[&[1.0, 2.0, 3.0], &[1.5, 2.5, 3.5]]).unwrap();
        let expected: Vec<f64> = (0..7).map(|i| KS_B0[i] + KS_B1[i] + KS_B2[i]).collect();
        assert_eq!(r.critical_values, expected);
    }

    #[test]
    fn two_sample_p_within_table() {
        let crit: Vec<f64> = (0..7).map(|i| KS_B0[i] + KS_B1[i] + KS_B2[i]).collect();
        let p = ksamp_p_value(crit[2], &crit).unwrap();
        assert!((p - DEFAULT_ALPHA).abs() < 0.01, "p = {p}");
        let p_mid = ksamp_p_value(0.5 * (crit[0] + crit[1]), &crit).unwrap();
        assert!(p_mid < 0.25 && p_mid > 0.1, "p = {p_mid}");
    }

    #[test]
    fn two_sample_ties_handled() {
        let x = [1.0, 1.0, 2.0, 2.0, 3.0, 3.0];
        let y = [1.0, 2.0, 2.0, 3.0, 3.0, 3.0];
        let r = anderson_ksamp(&[&x, &y]).unwrap();
        assert!(r.statistic.is_finite());
        assert!((0.001..=0.25).contains(&r.p_value));
    }

    #[test]
    fn two_sample_errors() {
        assert_eq!(
            anderson_ksamp(&[&[1.0, 2.0], &[3.0]]).unwrap_err().kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(
            anderson_ksamp(&[&[1.0, 1.0], &[1.0, 1.0]]).unwrap_err().kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(
            anderson_ksamp(&[&[1.0, 2.0, 3.0]]).unwrap_err().kind(),
            ErrorKind::InsufficientGroups
        );
        assert!(anderson_ksamp(&[&[1.0, 2.0, 3.0], &[]]).is_err());
    }
}
