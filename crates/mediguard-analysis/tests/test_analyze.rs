//! End-to-end analysis over the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use mediguard_analysis::{AnalysisError, Analyzer, BiomarkerRegistry, Direction};
use mediguard_common::{
    BiomarkerSummary, DiseaseCount, DiseaseFilter, Granularity, SampleRecord, TemporalCount,
};
use mediguard_db::{DbError, MemorySampleStore, SampleStore};
use mediguard_test_utils::pretty_assertions::assert_eq;
use mediguard_test_utils::{at, cohort, cohort_biomarkers, sample};

fn analyzer_over(samples: Vec<mediguard_common::SampleRecord>, biomarkers: Vec<String>) -> Analyzer {
    let store: Arc<dyn SampleStore> = Arc::new(MemorySampleStore::new().with_samples(samples));
    Analyzer::new(store, Arc::new(BiomarkerRegistry::from_names(biomarkers)))
}

fn analyzer() -> Analyzer {
    analyzer_over(cohort(), cohort_biomarkers())
}

#[tokio::test]
async fn test_glucose_factor_for_latest_sample() {
    let result = analyzer().analyze("P001", None).await.unwrap();
    assert_eq!(result.patient_id, "P001");
    assert_eq!(result.disease, "Diabetes");
    assert_eq!(result.timestamp, at(2024, 3, 15));

    let glucose = result
        .top_contributing_factors
        .iter()
        .find(|f| f.biomarker == "Glucose")
        .unwrap();
    assert_eq!(glucose.patient_value, 180.0);
    assert_eq!(glucose.disease_average, 150.0);
    assert!((glucose.deviation - 20.0).abs() < 1e-9);
    assert_eq!(glucose.status, Direction::Above);
}

#[tokio::test]
async fn test_null_patient_value_skipped() {
    let result = analyzer().analyze("P001", None).await.unwrap();
    let names: Vec<&str> = result
        .top_contributing_factors
        .iter()
        .map(|f| f.biomarker.as_str())
        .collect();
    // Insulin is null on the latest sample; ranked by raw value
    assert_eq!(names, vec!["Cholesterol", "Glucose", "Hemoglobin"]);
}

#[tokio::test]
async fn test_explicit_timestamp_selects_older_sample() {
    let result = analyzer().analyze("P001", Some(at(2024, 1, 10))).await.unwrap();
    assert_eq!(result.timestamp, at(2024, 1, 10));
    assert_eq!(result.patient_data.value("Glucose"), Some(170.0));
}

#[tokio::test]
async fn test_unknown_patient_is_not_found() {
    let err = analyzer().analyze("P999", None).await.unwrap_err();
    assert!(matches!(err, AnalysisError::PatientNotFound));
    assert_eq!(err.to_string(), "Patient not found");
}

#[tokio::test]
async fn test_unknown_timestamp_is_not_found() {
    let err = analyzer().analyze("P001", Some(at(2020, 1, 1))).await.unwrap_err();
    assert!(matches!(err, AnalysisError::PatientNotFound));
}

#[tokio::test]
async fn test_zero_average_skipped() {
    let samples = vec![
        sample("Z1", at(2024, 1, 1), "Flu", &[("Crp", 0.0), ("Wbc", 8.0)]),
        sample("Z2", at(2024, 1, 2), "Flu", &[("Crp", 0.0), ("Wbc", 12.0)]),
    ];
    let result = analyzer_over(samples, vec!["Crp".into(), "Wbc".into(), "Missing".into()])
        .analyze("Z2", None)
        .await
        .unwrap();
    assert_eq!(result.top_contributing_factors.len(), 1);
    assert_eq!(result.top_contributing_factors[0].biomarker, "Wbc");
    assert!((result.top_contributing_factors[0].deviation - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_idempotent() {
    let a = analyzer();
    let first = a.analyze("P002", None).await.unwrap();
    let second = a.analyze("P002", None).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_ranked_list_capped_at_ten() {
    let readings: Vec<(String, f64)> = (0..15).map(|i| (format!("M{i:02}"), 10.0 + i as f64)).collect();
    let refs: Vec<(&str, f64)> = readings.iter().map(|(n, v)| (n.as_str(), *v)).collect();
    let names: Vec<String> = readings.iter().map(|(n, _)| n.clone()).collect();

    let samples = vec![
        sample("W1", at(2024, 1, 1), "Panel", &refs),
        sample("W2", at(2024, 1, 2), "Panel", &refs),
    ];
    let result = analyzer_over(samples, names).analyze("W1", None).await.unwrap();
    assert_eq!(result.top_contributing_factors.len(), 10);
    assert_eq!(result.top_contributing_factors[0].biomarker, "M14");
}

#[tokio::test]
async fn test_disease_profile_top() {
    let profile = analyzer().disease_profile_top("Diabetes").await.unwrap();
    let flat: Vec<(&str, f64)> = profile.iter().map(|p| (p.biomarker.as_str(), p.value)).collect();
    assert_eq!(
        flat,
        vec![("Cholesterol", 207.5), ("Glucose", 150.0), ("Hemoglobin", 13.0), ("Insulin", 12.0)]
    );
}

/// In-memory store whose average query fails for one biomarker.
struct FailingAverageStore {
    inner: MemorySampleStore,
    fail_for: &'static str,
    asked: Mutex<Vec<String>>,
}

#[async_trait]
impl SampleStore for FailingAverageStore {
    async fn latest_sample(&self, patient_id: &str) -> mediguard_db::Result<Option<SampleRecord>> {
        self.inner.latest_sample(patient_id).await
    }

    async fn sample_at(&self, patient_id: &str, timestamp: DateTime<Utc>) -> mediguard_db::Result<Option<SampleRecord>> {
        self.inner.sample_at(patient_id, timestamp).await
    }

    async fn all_timestamps(&self, patient_id: &str) -> mediguard_db::Result<Vec<DateTime<Utc>>> {
        self.inner.all_timestamps(patient_id).await
    }

    async fn disease_distribution(&self) -> mediguard_db::Result<Vec<DiseaseCount>> {
        self.inner.disease_distribution().await
    }

    async fn biomarker_average(&self, disease: &str, biomarker: &str) -> mediguard_db::Result<Option<f64>> {
        self.asked.lock().unwrap().push(biomarker.to_string());
        if biomarker == self.fail_for {
            return Err(DbError::Decode(format!("average for {biomarker} unavailable")));
        }
        self.inner.biomarker_average(disease, biomarker).await
    }

    async fn biomarker_summary(&self, disease: &str, biomarker: &str) -> mediguard_db::Result<Option<BiomarkerSummary>> {
        self.inner.biomarker_summary(disease, biomarker).await
    }

    async fn temporal_counts(&self, filter: &DiseaseFilter, granularity: Granularity) -> mediguard_db::Result<Vec<TemporalCount>> {
        self.inner.temporal_counts(filter, granularity).await
    }

    async fn list_numeric_biomarkers(&self) -> mediguard_db::Result<Vec<String>> {
        self.inner.list_numeric_biomarkers().await
    }

    async fn ping(&self) -> mediguard_db::Result<()> {
        self.inner.ping().await
    }
}

#[tokio::test]
async fn test_average_failure_aborts_analysis() {
    let store = Arc::new(FailingAverageStore {
        inner: MemorySampleStore::new().with_samples(cohort()),
        fail_for: "Glucose",
        asked: Mutex::new(Vec::new()),
    });
    let dyn_store: Arc<dyn SampleStore> = store.clone();
    let analyzer = Analyzer::new(dyn_store, Arc::new(BiomarkerRegistry::from_names(cohort_biomarkers())));

    let err = analyzer.analyze("P001", None).await.unwrap_err();
    assert!(matches!(err, AnalysisError::Store(DbError::Decode(_))));
    assert_eq!(err.to_string(), "Malformed row: average for Glucose unavailable");
    // Nothing after the failing biomarker is queried
    assert_eq!(*store.asked.lock().unwrap(), vec!["Cholesterol", "Glucose"]);
}
