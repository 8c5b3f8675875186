//! Prediction forwarder.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;

use mediguard_common::ApiError;

use crate::prediction::PredictionRequest;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictPayload {
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub biomarkers: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub predicted_disease: Option<String>,
}

impl PredictPayload {
    /// Check the payload and build the upstream request. Null readings are
    /// dropped; any other non-numeric reading is rejected.
    pub fn into_request(self) -> Result<(String, PredictionRequest), ApiError> {
        let patient_id = self.patient_id.trim().to_string();
        if patient_id.is_empty() {
            return Err(ApiError::Validation("patientId is required".to_string()));
        }

        let mut readings = BTreeMap::new();
        for (name, value) in self.biomarkers {
            if value.is_null() {
                continue;
            }
            match value.as_f64().filter(|v| v.is_finite()) {
                Some(v) => {
                    readings.insert(name, v);
                }
                None => {
                    return Err(ApiError::Validation(format!("Biomarker '{name}' must be numeric")))
                }
            }
        }
        if readings.is_empty() {
            return Err(ApiError::Validation(
                "At least one numeric biomarker reading is required".to_string(),
            ));
        }

        let predicted_disease = self
            .predicted_disease
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        Ok((patient_id, PredictionRequest { readings, predicted_disease }))
    }
}

/// POST /api/predict
pub async fn predict(
    State(state): State<SharedState>,
    payload: Result<Json<PredictPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    let (patient_id, request) = payload.into_request()?;

    tracing::info!(patient_id = %patient_id, readings = request.readings.len(), "forwarding prediction request");
    let response = state.prediction.predict(&request).await?;
    Ok(Json(response))
}
