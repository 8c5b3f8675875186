//! The aggregate query layer over sample records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mediguard_common::{
    BiomarkerAverage, BiomarkerSummary, DiseaseCount, DiseaseFilter, Granularity, SampleRecord,
    TemporalCount,
};

use crate::error::Result;

/// Read-only statistical access to the sample store.
///
/// "Not found" is signalled through `None` or an empty `Vec`; `Err` is
/// reserved for data-access failures. Biomarker names passed in must already
/// be validated against the registry.
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Most recent sample for a patient.
    async fn latest_sample(&self, patient_id: &str) -> Result<Option<SampleRecord>>;

    /// Sample recorded at exactly `timestamp`.
    async fn sample_at(
        &self,
        patient_id: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Option<SampleRecord>>;

    /// Every timestamp recorded for a patient, newest first.
    async fn all_timestamps(&self, patient_id: &str) -> Result<Vec<DateTime<Utc>>>;

    /// Sample counts per disease label, largest first.
    async fn disease_distribution(&self) -> Result<Vec<DiseaseCount>>;

    /// Mean over non-null values of `biomarker` among samples labelled `disease`.
    async fn biomarker_average(&self, disease: &str, biomarker: &str) -> Result<Option<f64>>;

    /// Min/max/mean/quartiles/count; `None` when no sample matches.
    async fn biomarker_summary(
        &self,
        disease: &str,
        biomarker: &str,
    ) -> Result<Option<BiomarkerSummary>>;

    /// Disease average of every given biomarker, skipping those without data.
    /// Queries run one after another; the result is unsorted.
    async fn disease_profile(
        &self,
        disease: &str,
        biomarkers: &[String],
    ) -> Result<Vec<BiomarkerAverage>> {
        let mut averages = Vec::with_capacity(biomarkers.len());
        for biomarker in biomarkers {
            if let Some(value) = self.biomarker_average(disease, biomarker).await? {
                averages.push(BiomarkerAverage { biomarker: biomarker.clone(), value });
            }
        }
        Ok(averages)
    }

    /// Sample counts per period over the most recent capped window of samples.
    async fn temporal_counts(
        &self,
        filter: &DiseaseFilter,
        granularity: Granularity,
    ) -> Result<Vec<TemporalCount>>;

    /// Numeric columns of the sample table, excluding identifier, label and
    /// timestamp columns.
    async fn list_numeric_biomarkers(&self) -> Result<Vec<String>>;

    /// Cheap liveness check.
    async fn ping(&self) -> Result<()>;
}
