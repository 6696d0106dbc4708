//! Sphericity of repeated-measures designs and epsilon corrections.
//!
//! Both work on the covariance of orthonormal contrast scores, so the result
//! does not depend on the order of the condition columns.
//!
//! # Operations
//!
//! - [`epsilon`] — Greenhouse-Geisser, Huynh-Feldt and lower-bound corrections
//!   (one-way designs and two-way interactions)
//! - [`sphericity`] — Mauchly or JNS test (one-way designs only)
//!
//! # References
//!
//! - Greenhouse & Geisser (1959). "On methods in the analysis of profile
//!   data". Psychometrika, 24, 95–112.
//! - Huynh & Feldt (1976). "Estimation of the Box correction for degrees of
//!   freedom from sample data in randomized block and split-plot designs".
//!   Journal of Educational Statistics, 1(1), 69–82.

mod contrast;
mod epsilon;
mod mauchly;

pub use epsilon::{epsilon, Correction};
pub use mauchly::{sphericity, SphericityMethod, SphericityResult};


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::shape::RepeatedMeasures;
    use proptest::prelude::*;

    fn matrix(k_range: std::ops::Range<usize>) -> BoxedStrategy<Vec<Vec<f64>>> {
        (k_range, 6usize..25)
            .prop_flat_map(|(k, n)| {
                proptest::collection::vec(proptest::collection::vec(-100.0_f64..100.0, k..=k), n..=n)
            })
            .boxed()
    }

    proptest! {
        #[test]
        fn epsilon_ordering(rows in matrix(3..7)) {
            let k = rows[0].len();
            let rm = RepeatedMeasures::one_way(rows).unwrap();
            let lb = epsilon(&rm, Correction::LowerBound).unwrap();
            prop_assert_eq!(lb, 1.0 / (k - 1) as f64);
            if let (Ok(gg), Ok(hf)) = (
                epsilon(&rm, Correction::GreenhouseGeisser),
                epsilon(&rm, Correction::HuynhFeldt),
            ) {
                prop_assert!(lb <= gg, "lb {} > gg {}", lb, gg);
                prop_assert!(gg <= hf, "gg {} > hf {}", gg, hf);
                prop_assert!(hf <= 1.0, "hf {} > 1", hf);
            }
        }

        #[test]
        fn mauchly_w_bounded(rows in matrix(3..6)) {
            let rm = RepeatedMeasures::one_way(rows).unwrap();
            if let Ok(r) = sphericity(&rm, SphericityMethod::Mauchly, 0.05) {
                let w = r.w.unwrap();
                prop_assert!((0.0..=1.0).contains(&w), "W = {}", w);
                let p = r.p_value.unwrap();
                prop_assert!((0.0..=1.0).contains(&p), "p = {}", p);
            }
        }

        #[test]
        fn two_condition_epsilons_coincide(rows in matrix(2..3)) {
            let rm = RepeatedMeasures::one_way(rows).unwrap();
            prop_assert_eq!(epsilon(&rm, Correction::LowerBound).unwrap(), 1.0);
            prop_assert_eq!(epsilon(&rm, Correction::GreenhouseGeisser).unwrap(), 1.0);
            prop_assert_eq!(epsilon(&rm, Correction::HuynhFeldt).unwrap(), 1.0);
        }
    }
}
