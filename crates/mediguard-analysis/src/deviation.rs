//! Contributing-factor computation and ranking.
//!
//! deviation = |patient − average| / average × 100

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Patient values closer than this are ranked by deviation instead.
pub const TIE_THRESHOLD: f64 = 0.01;

/// Ranked list length.
pub const MAX_CONTRIBUTING_FACTORS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributingFactor {
    pub biomarker: String,
    pub patient_value: f64,
    pub disease_average: f64,
    /// Percentage deviation from the disease average, always ≥ 0.
    pub deviation: f64,
    pub status: Direction,
}

/// Admission filter for the ranking.
///
/// A biomarker is ranked only when the patient value is present and finite
/// and the disease average is present, finite and strictly positive. Anything
/// else is dropped silently, so the ranked list can be shorter than the
/// registry.
pub fn is_rankable(patient_value: Option<f64>, disease_average: Option<f64>) -> bool {
    let value_ok = patient_value.is_some_and(f64::is_finite);
    let average_ok = disease_average.is_some_and(|a| a.is_finite() && a > 0.0);
    value_ok && average_ok
}

pub fn percent_deviation(patient_value: f64, disease_average: f64) -> f64 {
    (patient_value - disease_average).abs() / disease_average * 100.0
}

impl ContributingFactor {
    /// Build a factor if [`is_rankable`] admits the pair.
    pub fn evaluate(
        biomarker: &str,
        patient_value: Option<f64>,
        disease_average: Option<f64>,
    ) -> Option<Self> {
        if !is_rankable(patient_value, disease_average) {
            return None;
        }
        let (value, average) = (patient_value?, disease_average?);
        Some(Self {
            biomarker: biomarker.to_string(),
            patient_value: value,
            disease_average: average,
            deviation: percent_deviation(value, average),
            status: if value > average { Direction::Above } else { Direction::Below },
        })
    }
}

/// Ranking comparator: patient value descending, but values within
/// [`TIE_THRESHOLD`] of each other are ordered by deviation descending.
///
/// Not transitive (a≈b, b≈c does not imply a≈c), so it must not be handed
/// to `sort_by`.
pub fn factor_order(a: &ContributingFactor, b: &ContributingFactor) -> Ordering {
    let diff = b.patient_value - a.patient_value;
    if diff.abs() > TIE_THRESHOLD {
        diff.total_cmp(&0.0)
    } else {
        (b.deviation - a.deviation).total_cmp(&0.0)
    }
}

/// Rank factors with [`factor_order`] and keep the top
/// [`MAX_CONTRIBUTING_FACTORS`].
///
/// Stable insertion sort: every adjacent pair in the result satisfies
/// `factor_order(prev, next) != Greater`, which is well defined even though
/// the comparator is not a total order.
pub fn rank_factors(factors: Vec<ContributingFactor>) -> Vec<ContributingFactor> {
    let mut ranked: Vec<ContributingFactor> = Vec::with_capacity(factors.len());
    for factor in factors {
        let mut pos = ranked.len();
        while pos > 0 && factor_order(&ranked[pos - 1], &factor) == Ordering::Greater {
            pos -= 1;
        }
        ranked.insert(pos, factor);
    }
    ranked.truncate(MAX_CONTRIBUTING_FACTORS);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor(name: &str, value: f64, deviation: f64) -> ContributingFactor {
        ContributingFactor {
            biomarker: name.into(),
            patient_value: value,
            disease_average: 1.0,
            deviation,
            status: Direction::Above,
        }
    }

    #[test]
    fn test_glucose_above_average() {
        let f = ContributingFactor::evaluate("Glucose", Some(180.0), Some(150.0)).unwrap();
        assert_eq!(f.patient_value, 180.0);
        assert_eq!(f.disease_average, 150.0);
        assert!((f.deviation - 20.0).abs() < 1e-9);
        assert_eq!(f.status, Direction::Above);
    }

    #[test]
    fn test_equal_value_is_below() {
        let f = ContributingFactor::evaluate("Hemoglobin", Some(13.0), Some(13.0)).unwrap();
        assert_eq!(f.deviation, 0.0);
        assert_eq!(f.status, Direction::Below);
    }

    #[test]
    fn test_filter_rejects_unusable_pairs() {
        assert!(!is_rankable(Some(10.0), Some(0.0)));
        assert!(!is_rankable(Some(10.0), None));
        assert!(!is_rankable(None, Some(5.0)));
        assert!(!is_rankable(Some(f64::NAN), Some(5.0)));
        assert!(!is_rankable(Some(1.0), Some(f64::INFINITY)));
        assert!(!is_rankable(Some(1.0), Some(-3.0)));
        assert!(is_rankable(Some(0.0), Some(5.0)));
    }

    #[test]
    fn test_close_values_ranked_by_deviation() {
        let ranked = rank_factors(vec![factor("B", 100.005, 10.0), factor("A", 100.0, 30.0)]);
        assert_eq!(ranked[0].biomarker, "A");
        assert_eq!(ranked[1].biomarker, "B");
    }

    #[test]
    fn test_distinct_values_ranked_by_value() {
        let ranked = rank_factors(vec![
            factor("low", 5.0, 90.0),
            factor("high", 200.0, 1.0),
            factor("mid", 50.0, 40.0),
        ]);
        let names: Vec<&str> = ranked.iter().map(|f| f.biomarker.as_str()).collect();
        assert_eq!(names, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_truncated_to_ten() {
        let factors = (0..25).map(|i| factor(&format!("B{i}"), i as f64, 0.0)).collect();
        let ranked = rank_factors(factors);
        assert_eq!(ranked.len(), MAX_CONTRIBUTING_FACTORS);
        assert_eq!(ranked[0].biomarker, "B24");
    }

    #[test]
    fn test_factor_serializes_camel_case() {
        let f = ContributingFactor::evaluate("Glucose", Some(180.0), Some(150.0)).unwrap();
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["patientValue"], 180.0);
        assert_eq!(json["diseaseAverage"], 150.0);
        assert_eq!(json["status"], "above");
    }
}
