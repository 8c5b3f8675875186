//! Patient deviation analysis and disease profiles.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

use mediguard_common::{BiomarkerAverage, SampleRecord};
use mediguard_db::SampleStore;

use crate::deviation::{rank_factors, ContributingFactor};
use crate::error::AnalysisError;
use crate::registry::BiomarkerRegistry;

/// Disease profile length.
pub const PROFILE_SIZE: usize = 10;

/// Result of [`Analyzer::analyze`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientAnalysis {
    pub patient_id: String,
    pub disease: String,
    pub timestamp: DateTime<Utc>,
    pub patient_data: SampleRecord,
    pub top_contributing_factors: Vec<ContributingFactor>,
}

/// Ranking engine over an injected store and registry.
#[derive(Clone)]
pub struct Analyzer {
    store: Arc<dyn SampleStore>,
    registry: Arc<BiomarkerRegistry>,
}

impl Analyzer {
    pub fn new(store: Arc<dyn SampleStore>, registry: Arc<BiomarkerRegistry>) -> Self {
        Self { store, registry }
    }

    /// Rank how far a patient's sample sits from the averages of its own
    /// disease label.
    ///
    /// Uses the sample at `timestamp` when given, otherwise the latest one.
    /// One average query per registered biomarker, issued in sequence; any
    /// query failure aborts the whole analysis.
    pub async fn analyze(
        &self,
        patient_id: &str,
        timestamp: Option<DateTime<Utc>>,
    ) -> Result<PatientAnalysis, AnalysisError> {
        let sample = match timestamp {
            Some(ts) => self.store.sample_at(patient_id, ts).await?,
            None => self.store.latest_sample(patient_id).await?,
        }
        .ok_or(AnalysisError::PatientNotFound)?;

        let disease = sample.disease.clone();
        let biomarkers = self.registry.list();

        let mut factors = Vec::with_capacity(biomarkers.len());
        for biomarker in biomarkers.iter() {
            let average = self.store.biomarker_average(&disease, biomarker).await?;
            match ContributingFactor::evaluate(biomarker, sample.value(biomarker), average) {
                Some(factor) => factors.push(factor),
                None => tracing::trace!(biomarker = %biomarker, "skipped: no usable value or average"),
            }
        }

        let evaluated = factors.len();
        let top = rank_factors(factors);
        tracing::debug!(
            patient_id,
            disease = %disease,
            registered = biomarkers.len(),
            evaluated,
            "patient analysis complete"
        );

        Ok(PatientAnalysis {
            patient_id: patient_id.to_string(),
            disease,
            timestamp: sample.timestamp,
            patient_data: sample,
            top_contributing_factors: top,
        })
    }

    /// Disease averages for every registered biomarker, highest first,
    /// truncated to [`PROFILE_SIZE`].
    pub async fn disease_profile_top(
        &self,
        disease: &str,
    ) -> Result<Vec<BiomarkerAverage>, AnalysisError> {
        let biomarkers = self.registry.list();
        let profile = self.store.disease_profile(disease, &biomarkers).await?;
        Ok(top_profile(profile))
    }
}

pub fn top_profile(mut averages: Vec<BiomarkerAverage>) -> Vec<BiomarkerAverage> {
    averages.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    averages.truncate(PROFILE_SIZE);
    averages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_profile_sorted_and_truncated() {
        let averages = (0..14)
            .map(|i| BiomarkerAverage { biomarker: format!("B{i}"), value: (i % 7) as f64 })
            .collect();
        let top = top_profile(averages);
        assert_eq!(top.len(), PROFILE_SIZE);
        assert!(top.windows(2).all(|w| w[0].value >= w[1].value));
        assert_eq!(top[0].value, 6.0);
    }
}
