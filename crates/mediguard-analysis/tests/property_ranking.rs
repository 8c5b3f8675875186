//! Property-based checks for the contributing-factor ranking.

use mediguard_analysis::deviation::{
    percent_deviation, rank_factors, ContributingFactor, MAX_CONTRIBUTING_FACTORS, TIE_THRESHOLD,
};
use proptest::prelude::*;

fn factors() -> impl Strategy<Value = Vec<ContributingFactor>> {
    prop::collection::vec((0.0f64..500.0, 0.01f64..500.0), 0..30).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .filter_map(|(i, (value, average))| {
                // Snap some values onto a coarse grid so near-ties actually occur
                let value = if i % 3 == 0 { (value * 100.0).round() / 100.0 } else { value };
                ContributingFactor::evaluate(&format!("B{i}"), Some(value), Some(average))
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_ranked_pairs_are_ordered(input in factors()) {
        let ranked = rank_factors(input.clone());
        prop_assert!(ranked.len() <= MAX_CONTRIBUTING_FACTORS);
        prop_assert_eq!(ranked.len(), input.len().min(MAX_CONTRIBUTING_FACTORS));

        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            let close = (a.patient_value - b.patient_value).abs() <= TIE_THRESHOLD;
            prop_assert!(
                a.patient_value > b.patient_value || (close && a.deviation >= b.deviation),
                "bad pair: {:?} then {:?}", a, b
            );
        }
    }

    #[test]
    fn prop_deviation_matches_formula(value in 0.0f64..1e4, average in 1e-3f64..1e4) {
        let f = ContributingFactor::evaluate("X", Some(value), Some(average)).unwrap();
        prop_assert!(f.deviation >= 0.0);
        let expected = (value - average).abs() / average * 100.0;
        prop_assert!((f.deviation - expected).abs() <= 1e-9 * expected.max(1.0));
        prop_assert_eq!(f.deviation, percent_deviation(value, average));
    }

    #[test]
    fn prop_ranking_is_deterministic(input in factors()) {
        prop_assert_eq!(rank_factors(input.clone()), rank_factors(input));
    }
}
