//! Shared application state for the web server.

use std::sync::Arc;

use mediguard_analysis::{Analyzer, BiomarkerRegistry};
use mediguard_config::{Environment, ServerConfig};
use mediguard_db::SampleStore;

use crate::prediction::PredictionService;
use crate::rate_limit::RateLimiter;

/// Shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SampleStore>,
    pub registry: Arc<BiomarkerRegistry>,
    pub analyzer: Analyzer,
    pub prediction: Arc<dyn PredictionService>,
    pub environment: Environment,
    /// Applied to `/api`; `None` disables limiting.
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    /// State with the default `/api` rate limit.
    pub fn new(
        store: Arc<dyn SampleStore>,
        registry: Arc<BiomarkerRegistry>,
        prediction: Arc<dyn PredictionService>,
        environment: Environment,
    ) -> Self {
        let analyzer = Analyzer::new(store.clone(), registry.clone());
        let rate_limiter = RateLimiter::from_config(&ServerConfig::default()).map(Arc::new);
        Self { store, registry, analyzer, prediction, environment, rate_limiter }
    }

    /// Replace the rate limit with the one configured in `[server]`.
    pub fn with_rate_limit(mut self, server: &ServerConfig) -> Self {
        self.rate_limiter = RateLimiter::from_config(server).map(Arc::new);
        self
    }
}

pub type SharedState = Arc<AppState>;
