//! In-memory SampleStore.
//!
//! Mirrors the PostgreSQL queries row for row so the analysis engine and the
//! HTTP layer can be exercised without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use mediguard_common::{
    BiomarkerSummary, DiseaseCount, DiseaseFilter, Granularity, SampleRecord, TemporalCount,
};
use mediguard_config::StoreConfig;

use crate::error::Result;
use crate::stats;
use crate::store::SampleStore;

pub struct MemorySampleStore {
    samples: RwLock<Vec<SampleRecord>>,
    healthy_label: String,
    temporal_limit: usize,
}

impl MemorySampleStore {
    pub fn new() -> Self {
        Self::with_config(&StoreConfig::default())
    }

    pub fn with_config(store: &StoreConfig) -> Self {
        Self {
            samples: RwLock::new(Vec::new()),
            healthy_label: store.healthy_label.clone(),
            temporal_limit: store.temporal_sample_limit.max(0) as usize,
        }
    }

    pub fn with_samples(mut self, samples: impl IntoIterator<Item = SampleRecord>) -> Self {
        self.samples.get_mut().unwrap_or_else(|e| e.into_inner()).extend(samples);
        self
    }

    pub fn insert(&self, sample: SampleRecord) {
        self.write().push(sample);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<SampleRecord>> {
        self.samples.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Vec<SampleRecord>> {
        self.samples.write().unwrap_or_else(|e| e.into_inner())
    }

    fn values_for(&self, disease: &str, biomarker: &str) -> Vec<f64> {
        self.read()
            .iter()
            .filter(|s| s.disease == disease)
            .filter_map(|s| s.value(biomarker))
            .collect()
    }
}

impl Default for MemorySampleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SampleStore for MemorySampleStore {
    async fn latest_sample(&self, patient_id: &str) -> Result<Option<SampleRecord>> {
        Ok(self
            .read()
            .iter()
            .filter(|s| s.patient_id == patient_id)
            .max_by_key(|s| s.timestamp)
            .cloned())
    }

    async fn sample_at(&self, patient_id: &str, timestamp: DateTime<Utc>) -> Result<Option<SampleRecord>> {
        Ok(self
            .read()
            .iter()
            .find(|s| s.patient_id == patient_id && s.timestamp == timestamp)
            .cloned())
    }

    async fn all_timestamps(&self, patient_id: &str) -> Result<Vec<DateTime<Utc>>> {
        let mut stamps: Vec<DateTime<Utc>> = self
            .read()
            .iter()
            .filter(|s| s.patient_id == patient_id)
            .map(|s| s.timestamp)
            .collect();
        stamps.sort_unstable_by(|a, b| b.cmp(a));
        Ok(stamps)
    }

    async fn disease_distribution(&self) -> Result<Vec<DiseaseCount>> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for sample in self.read().iter() {
            *counts.entry(sample.disease.clone()).or_default() += 1;
        }
        let mut rows: Vec<DiseaseCount> = counts
            .into_iter()
            .map(|(disease, count)| DiseaseCount { disease: Some(disease), count })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.disease.cmp(&b.disease)));
        Ok(rows)
    }

    async fn biomarker_average(&self, disease: &str, biomarker: &str) -> Result<Option<f64>> {
        Ok(stats::mean(&self.values_for(disease, biomarker)))
    }

    async fn biomarker_summary(&self, disease: &str, biomarker: &str) -> Result<Option<BiomarkerSummary>> {
        Ok(stats::summarize(&self.values_for(disease, biomarker)))
    }

    async fn temporal_counts(&self, filter: &DiseaseFilter, granularity: Granularity) -> Result<Vec<TemporalCount>> {
        let samples = self.read();
        let mut window: Vec<&SampleRecord> = samples
            .iter()
            .filter(|s| match filter {
                DiseaseFilter::Only(d) => s.disease == *d,
                DiseaseFilter::All => s.disease != self.healthy_label,
            })
            .collect();
        window.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        window.truncate(self.temporal_limit);

        let pattern = granularity.chrono_pattern();
        let mut buckets: BTreeMap<(String, String), i64> = BTreeMap::new();
        for sample in window {
            let period = sample.timestamp.format(pattern).to_string();
            let disease = match filter {
                DiseaseFilter::Only(d) => d.clone(),
                DiseaseFilter::All => sample.disease.clone(),
            };
            *buckets.entry((period, disease)).or_default() += 1;
        }

        let mut rows: Vec<TemporalCount> = buckets
            .into_iter()
            .map(|((period, disease), count)| TemporalCount { period, disease, count })
            .collect();
        rows.sort_by(|a, b| a.period.cmp(&b.period).then_with(|| b.count.cmp(&a.count)));
        Ok(rows)
    }

    async fn list_numeric_biomarkers(&self) -> Result<Vec<String>> {
        let names: BTreeSet<String> = self
            .read()
            .iter()
            .flat_map(|s| s.biomarkers.keys().cloned())
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
