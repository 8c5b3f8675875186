//! Biomarker registry.
//!
//! The list is fixed at startup, either from `[biomarkers] names` in the
//! configuration or from one schema introspection, and only changes when
//! [`BiomarkerRegistry::refresh`] is called after a schema migration.

use std::sync::{Arc, RwLock};

use mediguard_config::BiomarkerConfig;
use mediguard_db::{Result, SampleStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrySource {
    /// Pinned by configuration; refresh is a no-op.
    Configured,
    /// Derived from the table schema.
    Schema,
}

#[derive(Debug)]
pub struct BiomarkerRegistry {
    names: RwLock<Arc<Vec<String>>>,
    source: RegistrySource,
}

impl BiomarkerRegistry {
    pub fn from_names(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::with_source(names.into_iter().map(Into::into).collect(), RegistrySource::Configured)
    }

    fn with_source(names: Vec<String>, source: RegistrySource) -> Self {
        Self { names: RwLock::new(Arc::new(names)), source }
    }

    /// Build the registry at startup.
    pub async fn load(config: &BiomarkerConfig, store: &dyn SampleStore) -> Result<Self> {
        if !config.names.is_empty() {
            tracing::info!("Biomarker registry pinned by configuration: {} names", config.names.len());
            return Ok(Self::from_names(config.names.iter().cloned()));
        }
        let names = store.list_numeric_biomarkers().await?;
        tracing::info!("Biomarker registry introspected from schema: {} names", names.len());
        Ok(Self::with_source(names, RegistrySource::Schema))
    }

    /// Current biomarker names, in registry order.
    pub fn list(&self) -> Arc<Vec<String>> {
        self.names.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.list().iter().any(|n| n == name)
    }

    pub fn source(&self) -> RegistrySource {
        self.source
    }

    /// Re-read the schema. Configured registries keep their list.
    pub async fn refresh(&self, store: &dyn SampleStore) -> Result<Arc<Vec<String>>> {
        if self.source == RegistrySource::Configured {
            tracing::info!("Biomarker registry is pinned by configuration; refresh skipped");
            return Ok(self.list());
        }
        let fresh = Arc::new(store.list_numeric_biomarkers().await?);
        *self.names.write().unwrap_or_else(|e| e.into_inner()) = fresh.clone();
        tracing::info!("Biomarker registry refreshed: {} names", fresh.len());
        Ok(fresh)
    }
}
