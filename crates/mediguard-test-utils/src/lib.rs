//! Shared fixtures for MediGuard tests.
//!
//! The [`cohort`] fixture is a small sample table whose disease averages are
//! easy to check by hand:
//!
//! | disease  | Glucose avg | Hemoglobin avg | Cholesterol avg | Insulin avg |
//! |----------|-------------|----------------|-----------------|-------------|
//! | Diabetes | 150.0       | 13.0           | 207.5           | 12.0        |
//! | Anemia   | 95.0        | 9.0            | -               | -           |
//! | Healthy  | -           | 15.0           | 170.0           | -           |

use chrono::{DateTime, TimeZone, Utc};
use mediguard_common::SampleRecord;

pub use pretty_assertions;

/// Midnight UTC on the given date.
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid fixture date")
}

pub fn sample(
    patient_id: &str,
    timestamp: DateTime<Utc>,
    disease: &str,
    readings: &[(&str, f64)],
) -> SampleRecord {
    readings
        .iter()
        .fold(SampleRecord::new(patient_id, timestamp, disease), |s, (name, value)| {
            s.with(*name, *value)
        })
}

/// Same as [`sample`] but with explicitly null biomarkers.
pub fn sample_with_nulls(
    patient_id: &str,
    timestamp: DateTime<Utc>,
    disease: &str,
    readings: &[(&str, f64)],
    nulls: &[&str],
) -> SampleRecord {
    let mut s = sample(patient_id, timestamp, disease, readings);
    for name in nulls {
        s.biomarkers.insert((*name).to_string(), None);
    }
    s
}

/// Six samples over five patients. P001 has two samples; the latest
/// (2024-03-15) has Glucose 180 against a Diabetes average of 150 and a
/// null Insulin reading.
pub fn cohort() -> Vec<SampleRecord> {
    vec![
        sample("P001", at(2024, 1, 10), "Diabetes",
            &[("Glucose", 170.0), ("Hemoglobin", 13.0), ("Cholesterol", 210.0)]),
        sample_with_nulls("P001", at(2024, 3, 15), "Diabetes",
            &[("Glucose", 180.0), ("Hemoglobin", 12.0), ("Cholesterol", 200.0)], &["Insulin"]),
        sample("P002", at(2024, 2, 1), "Diabetes",
            &[("Glucose", 120.0), ("Hemoglobin", 14.0), ("Cholesterol", 190.0), ("Insulin", 10.0)]),
        sample("P003", at(2024, 2, 20), "Diabetes",
            &[("Glucose", 130.0), ("Hemoglobin", 13.0), ("Cholesterol", 230.0), ("Insulin", 14.0)]),
        sample("P004", at(2024, 3, 1), "Healthy",
            &[("Hemoglobin", 15.0), ("Cholesterol", 170.0)]),
        sample("P005", at(2024, 3, 5), "Anemia",
            &[("Glucose", 95.0), ("Hemoglobin", 9.0)]),
    ]
}

/// Biomarker names present in [`cohort`], sorted.
pub fn cohort_biomarkers() -> Vec<String> {
    ["Cholesterol", "Glucose", "Hemoglobin", "Insulin"]
        .into_iter()
        .map(String::from)
        .collect()
}
