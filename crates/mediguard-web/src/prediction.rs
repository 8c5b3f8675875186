//! Client for the external disease-prediction service.
//!
//! The service takes a flat object of biomarker readings plus an optional
//! `predicted_disease` label and answers with a prediction, a confidence,
//! the top features and a free-text explanation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use mediguard_common::ApiError;
use mediguard_config::PredictionConfig;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },
}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        match err {
            PredictionError::Api { status, message } => ApiError::Service {
                status,
                message: "Error from prediction service".to_string(),
                detail: Some(message),
            },
            PredictionError::Http(e) => ApiError::upstream(e),
        }
    }
}

/// Body sent to the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    #[serde(flatten)]
    pub readings: BTreeMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted_disease: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
    pub confidence: f64,
    #[serde(default)]
    pub top_features: Vec<serde_json::Value>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict(&self, req: &PredictionRequest) -> Result<PredictionResponse, PredictionError>;
}

pub struct PredictionClient {
    base_url: String,
    client: reqwest::Client,
}

impl PredictionClient {
    pub fn new(config: &PredictionConfig) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { base_url: config.base_url.trim_end_matches('/').to_string(), client })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/predict", self.base_url)
    }
}

#[async_trait]
impl PredictionService for PredictionClient {
    async fn predict(&self, req: &PredictionRequest) -> Result<PredictionResponse, PredictionError> {
        let resp = self.client.post(self.endpoint()).json(req).send().await?;
        let status = resp.status().as_u16();
        if status >= 400 {
            let body = resp.text().await.unwrap_or_default();
            return Err(PredictionError::Api { status, message: error_message(&body) });
        }
        Ok(resp.json().await?)
    }
}

/// Pull a readable message out of an error body (`detail`, `message` or
/// `error`), falling back to the raw text.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|json| {
            ["detail", "message", "error"]
                .iter()
                .find_map(|key| json[*key].as_str().map(str::to_string))
        })
        .unwrap_or_else(|| if body.is_empty() { "unknown API error".to_string() } else { body.to_string() })
}
