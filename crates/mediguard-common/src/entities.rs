/// Core record types mirroring the `blood_samples` table and the aggregates
/// computed over it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Sample record
// ---------------------------------------------------------------------------

/// One timestamped blood-test observation for one patient.
///
/// Serialized with the table's canonical column names so clients see the same
/// shape regardless of the backing store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    #[serde(rename = "PatientID")]
    pub patient_id: String,
    #[serde(rename = "Timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "Disease")]
    pub disease: String,
    /// Biomarker name → value. `None` when the column is null or non-numeric.
    #[serde(flatten)]
    pub biomarkers: BTreeMap<String, Option<f64>>,
}

impl SampleRecord {
    pub fn new(
        patient_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        disease: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            timestamp,
            disease: disease.into(),
            biomarkers: BTreeMap::new(),
        }
    }

    /// Builder-style setter for a single biomarker value.
    pub fn with(mut self, biomarker: impl Into<String>, value: f64) -> Self {
        self.biomarkers.insert(biomarker.into(), Some(value));
        self
    }

    /// Patient's value for a biomarker, if present and finite.
    pub fn value(&self, biomarker: &str) -> Option<f64> {
        self.biomarkers
            .get(biomarker)
            .copied()
            .flatten()
            .filter(|v| v.is_finite())
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Number of samples per disease label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseCount {
    pub disease: Option<String>,
    pub count: i64,
}

/// Descriptive statistics for one biomarker within one disease.
/// Quartiles are continuous percentiles (linear interpolation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub count: i64,
}

/// Disease average for one biomarker (a disease profile entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerAverage {
    pub biomarker: String,
    pub value: f64,
}

/// Sample count for one period bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalCount {
    pub period: String,
    pub disease: String,
    pub count: i64,
}
