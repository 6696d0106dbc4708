//! Equality of variances across groups.
//!
//! # Examples
//!
//! ```
//! use u_assumptions::{homoscedasticity, Dataset, VarianceMethod};
//!
//! let data = Dataset::named([
//!     ("tight", vec![4.9, 5.0, 5.0, 5.1, 5.0]),
//!     ("wide", vec![0.0, 3.0, 5.0, 7.0, 10.0]),
//! ]);
//! let row = homoscedasticity(&data, None, VarianceMethod::Levene, 0.05).unwrap();
//! assert_eq!(row.label, "levene");
//! assert!(!row.stat().unwrap().equal_var);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::config::check_alpha;
use crate::error::{Result, TestError};
use crate::moments::{self, chi2_sf, f_sf};
use crate::result::{Statistic, TestRow};
use crate::shape::{Columns, Dataset};

/// Variance-equality test selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum VarianceMethod {
    /// Levene's test centered on group medians (Brown-Forsythe).
    #[default]
    Levene,
    /// Bartlett's test. Assumes normal groups.
    Bartlett,
}

impl VarianceMethod {
    /// Runs the selected test on the given groups.
    pub fn test(self, groups: &[&[f64]]) -> Result<Statistic> {
        match self {
            Self::Levene => levene(groups),
            Self::Bartlett => bartlett(groups),
        }
    }
}

impl FromStr for VarianceMethod {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "levene" => Ok(Self::Levene),
            "bartlett" => Ok(Self::Bartlett),
            other => Err(TestError::InvalidParameter(format!(
                "unknown variance test {other:?}"
            ))),
        }
    }
}

impl fmt::Display for VarianceMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Levene => "levene",
            Self::Bartlett => "bartlett",
        })
    }
}

/// Result of a variance-equality test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VarianceStat {
    /// W (Levene) or T (Bartlett).
    pub statistic: f64,
    /// p-value.
    pub p_value: f64,
    /// `p_value > alpha`.
    pub equal_var: bool,
}

/// Tests whether all groups of `data` share one variance.
///
/// Accepts the same shapes as [`normality`](crate::normality). The returned
/// row is labeled with the method name.
///
/// # Errors
///
/// [`TestError::InsufficientGroups`] when fewer than 2 groups are resolved;
/// shape errors and an invalid `alpha` also abort. A numerical failure (a
/// group with fewer than 2 values, no spread) is stored in the row.
pub fn homoscedasticity(
    data: &Dataset,
    columns: Option<Columns<'_>>,
    method: VarianceMethod,
    alpha: f64,
) -> Result<TestRow<VarianceStat>> {
    let alpha = check_alpha(alpha)?;
    let samples = data.samples(columns)?;
    if samples.len() < 2 {
        return Err(TestError::InsufficientGroups { got: samples.len() });
    }

    let outcome = method.test(&samples.slices()).map(|s| VarianceStat {
        statistic: s.statistic,
        p_value: s.p_value,
        equal_var: s.p_value > alpha,
    });
    Ok(TestRow::new(method.to_string(), outcome))
}

fn check_groups(groups: &[&[f64]]) -> Result<()> {
    if groups.len() < 2 {
        return Err(TestError::InsufficientGroups { got: groups.len() });
    }
    for (i, g) in groups.iter().enumerate() {
        if g.len() < 2 {
            return Err(TestError::InsufficientData(format!(
                "group {i} has {} observation(s), at least 2 are required",
                g.len()
            )));
        }
        if !moments::all_finite(g) {
            return Err(TestError::Domain(format!("group {i} contains non-finite values")));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Levene (Brown-Forsythe)
// ---------------------------------------------------------------------------

/// Levene test for equality of variances: H₀: all groups have equal variance.
///
/// Robust to non-normality. Uses the **median** variant (Brown-Forsythe).
///
/// # Algorithm
///
/// 1. Compute zᵢⱼ = |xᵢⱼ - median(groupᵢ)|
/// 2. W = ((N-k)/(k-1)) · Σ nᵢ(z̄ᵢ - z̄)² / ΣΣ(zᵢⱼ - z̄ᵢ)²
/// 3. W ~ F(k-1, N-k) under H₀
///
/// # References
///
/// - Levene (1960). "Robust tests for equality of variances". In
///   Olkin (Ed.), Contributions to Probability and Statistics.
/// - Brown & Forsythe (1974). "Robust tests for the equality of variances".
///   JASA, 69(346), 364–367.
pub fn levene(groups: &[&[f64]]) -> Result<Statistic> {
    check_groups(groups)?;

    let z_groups: Vec<Vec<f64>> = groups
        .iter()
        .map(|g| {
            let median = moments::median(g);
            g.iter().map(|&x| (x - median).abs()).collect()
        })
        .collect();

    let k = z_groups.len();
    let n_total: usize = z_groups.iter().map(Vec::len).sum();
    let grand = z_groups.iter().flatten().sum::<f64>() / n_total as f64;

    let mut between = 0.0;
    let mut within = 0.0;
    for z in &z_groups {
        let m = moments::mean(z);
        between += z.len() as f64 * (m - grand).powi(2);
        within += z.iter().map(|&v| (v - m).powi(2)).sum::<f64>();
    }
    if within <= 0.0 {
        return Err(TestError::insufficient(
            "absolute deviations have no spread within groups",
        ));
    }

    let (df1, df2) = ((k - 1) as f64, (n_total - k) as f64);
    let w = (df2 / df1) * between / within;
    Ok(Statistic {
        statistic: w,
        p_value: f_sf(w, df1, df2)?,
    })
}

// ---------------------------------------------------------------------------
// Bartlett
// ---------------------------------------------------------------------------

/// Bartlett test for equality of variances: H₀: all groups have equal variance.
///
/// Assumes data are from **normal** distributions. For non-normal data, prefer
/// [`levene`].
///
/// # Algorithm
///
/// 1. Compute pooled variance: s²ₚ = Σ(nᵢ-1)s²ᵢ / (N-k)
/// 2. Numerator: (N-k) ln(s²ₚ) - Σ(nᵢ-1) ln(s²ᵢ)
/// 3. Correction factor: C = 1 + [1/(3(k-1))] × [Σ 1/(nᵢ-1) - 1/(N-k)]
/// 4. Statistic: T = numerator / C ~ χ²(k-1)
///
/// # References
///
/// - Bartlett (1937). "Properties of sufficiency and statistical tests".
///   Proceedings of the Royal Society A, 160(901), 268–282.
///
/// # Examples
///
/// ```
/// use u_assumptions::homoscedasticity::bartlett;
///
/// let g1 = [2.0, 3.0, 4.0, 5.0, 6.0]; // variance 2.5
/// let g2 = [10.0, 20.0, 30.0, 40.0, 50.0]; // variance 250
/// let r = bartlett(&[&g1, &g2]).unwrap();
/// assert!(r.p_value < 0.01);
/// ```
pub fn bartlett(groups: &[&[f64]]) -> Result<Statistic> {
    check_groups(groups)?;

    let k = groups.len();
    let sizes: Vec<f64> = groups.iter().map(|g| g.len() as f64).collect();
    let vars: Vec<f64> = groups.iter().map(|g| moments::variance(g)).collect();
    if let Some(i) = vars.iter().position(|&v| v <= 0.0) {
        return Err(TestError::InsufficientData(format!(
            "group {i} has zero variance"
        )));
    }

    let nk = sizes.iter().sum::<f64>() - k as f64;
    let s2_pooled = sizes
        .iter()
        .zip(&vars)
        .map(|(&n, &v)| (n - 1.0) * v)
        .sum::<f64>()
        / nk;

    let num = nk * s2_pooled.ln()
        - sizes
            .iter()
            .zip(&vars)
            .map(|(&n, &v)| (n - 1.0) * v.ln())
            .sum::<f64>();

    let sum_recip: f64 = sizes.iter().map(|&n| 1.0 / (n - 1.0)).sum();
    let c = 1.0 + (sum_recip - 1.0 / nk) / (3.0 * (k as f64 - 1.0));

    let statistic = num / c;
    Ok(Statistic {
        statistic,
        p_value: chi2_sf(statistic, (k - 1) as f64)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{approx_eq, DEFAULT_ALPHA};
    use crate::shape::Frame;
    use crate::ErrorKind;

    const A: [f64; 6] = [8.8, 9.1, 9.4, 9.0, 8.7, 9.3];
    const B: [f64; 6] = [7.0, 11.5, 6.2, 12.8, 9.9, 8.4];
    const C: [f64; 6] = [9.6, 10.1, 9.9, 10.4, 9.7, 10.2];

    #[test]
    fn levene_equal_variances() {
        let g1 = [1.0, 2.0, 3.0, 4.0, 5.0];
        let g2 = [11.0, 12.0, 13.0, 14.0, 15.0];
        let r = levene(&[&g1, &g2]).unwrap();
        assert!(approx_eq(r.statistic, 0.0));
        assert!(approx_eq(r.p_value, 1.0));
    }

    #[test]
    fn levene_hand_computed() {
        // z = [1, 0, 1] and [2, 0, 2]; z̄ = 2/3, 4/3, grand 1
        // between = 3·(1/9) + 3·(1/9) = 2/3, within = 2/3 + 8/3 = 10/3
        let r = levene(&[&[1.0, 2.0, 3.0], &[0.0, 2.0, 4.0]]).unwrap();
        assert!(approx_eq(r.statistic, 0.8), "W = {}", r.statistic);
    }

    #[test]
    fn bartlett_detects_spread() {
        let r = bartlett(&[&A, &B, &C]).unwrap();
        assert!(r.p_value < 0.01, "p = {}", r.p_value);
        let l = levene(&[&A, &B, &C]).unwrap();
        assert!(l.statistic > 0.0);
    }

    #[test]
    fn bartlett_identical_spread() {
        let g1 = [1.0, 2.0, 3.0, 4.0];
        let g2 = [5.0, 6.0, 7.0, 8.0];
        let r = bartlett(&[&g1, &g2]).unwrap();
        assert!(approx_eq(r.statistic, 0.0));
    }

    #[test]
    fn routine_errors() {
        assert_eq!(
            levene(&[&A]).unwrap_err(),
            TestError::InsufficientGroups { got: 1 }
        );
        assert_eq!(
            levene(&[&A, &[1.0]]).unwrap_err().kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(
            bartlett(&[&A, &[2.0, 2.0, 2.0]]).unwrap_err().kind(),
            ErrorKind::InsufficientData
        );
        assert_eq!(
            bartlett(&[&A, &[2.0, f64::INFINITY]]).unwrap_err().kind(),
            ErrorKind::Domain
        );
    }

    #[test]
    fn mapping_and_positional_inputs_agree() {
        let positional = Dataset::Groups(vec![A.to_vec(), B.to_vec(), C.to_vec()]);
        let named = Dataset::named([("a", A.to_vec()), ("b", B.to_vec()), ("c", C.to_vec())]);
        for method in [VarianceMethod::Levene, VarianceMethod::Bartlett] {
            let p = homoscedasticity(&positional, None, method, DEFAULT_ALPHA).unwrap();
            let n = homoscedasticity(&named, None, method, DEFAULT_ALPHA).unwrap();
            assert_eq!(p, n);
            assert_eq!(p.label, method.to_string());
        }
    }

    #[test]
    fn long_table_groups() {
        let labels: Vec<&str> = ["a"; 6].into_iter().chain(["b"; 6]).collect();
        let values: Vec<f64> = A.iter().chain(&B).copied().collect();
        let frame = Frame::new()
            .with_labels("group", labels)
            .unwrap()
            .with_numeric("y", values)
            .unwrap();
        let long = homoscedasticity(
            &Dataset::from(frame),
            Some(Columns::new("group", "y")),
            VarianceMethod::Bartlett,
            0.05,
        )
        .unwrap();
        let direct = bartlett(&[&A, &B]).unwrap();
        assert_eq!(long.stat().unwrap().statistic, direct.statistic);
        assert!(!long.stat().unwrap().equal_var);
    }

    #[test]
    fn single_group_aborts() {
        let data = Dataset::from(A.to_vec());
        let err = homoscedasticity(&data, None, VarianceMethod::Levene, DEFAULT_ALPHA).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InsufficientGroups);
    }

    #[test]
    fn degenerate_group_is_a_failed_row() {
        let data = Dataset::Groups(vec![A.to_vec(), vec![f64::NAN, 3.0]]);
        let row = homoscedasticity(&data, None, VarianceMethod::Levene, DEFAULT_ALPHA).unwrap();
        assert_eq!(row.error().unwrap().kind(), ErrorKind::InsufficientData);
    }

    #[test]
    fn method_parsing() {
        assert_eq!("Bartlett".parse::<VarianceMethod>(), Ok(VarianceMethod::Bartlett));
        assert_eq!(VarianceMethod::default(), VarianceMethod::Levene);
        assert!("fligner".parse::<VarianceMethod>().is_err());
    }
}
