//! Aggregate dashboard endpoints: distributions, biomarker summaries,
//! disease profiles and temporal counts.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

use mediguard_common::{ApiError, DiseaseFilter, Granularity};

use super::param;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct BiomarkerQuery {
    pub disease: Option<String>,
    pub biomarker: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub disease: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TemporalQuery {
    pub disease: Option<String>,
    pub interval: Option<String>,
}

pub async fn ping() -> impl IntoResponse {
    Json(json!({ "message": "pong" }))
}

pub async fn disease_distribution(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let counts = state.store.disease_distribution().await?;
    Ok(Json(counts))
}

pub async fn available_biomarkers(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.registry.list().to_vec())
}

/// GET /api/dashboard/biomarker-data?disease=&biomarker=
pub async fn biomarker_data(
    State(state): State<SharedState>,
    Query(query): Query<BiomarkerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(disease), Some(biomarker)) = (param(&query.disease), param(&query.biomarker)) else {
        return Err(ApiError::Validation(
            "Disease and biomarker parameters are required".to_string(),
        ));
    };
    if !state.registry.contains(biomarker) {
        return Err(ApiError::Validation(format!("Unknown biomarker '{biomarker}'")));
    }

    let summary = state
        .store
        .biomarker_summary(disease, biomarker)
        .await?
        .ok_or_else(|| ApiError::NotFound("No data found for this combination".to_string()))?;
    Ok(Json(summary))
}

/// GET /api/dashboard/disease-profile?disease=
pub async fn disease_profile(
    State(state): State<SharedState>,
    Query(query): Query<ProfileQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let disease = param(&query.disease)
        .ok_or_else(|| ApiError::Validation("Disease parameter is required".to_string()))?;
    let profile = state.analyzer.disease_profile_top(disease).await?;
    Ok(Json(profile))
}

/// GET /api/dashboard/disease-temporal?disease=&interval=
///
/// `interval` is one of `daily` (periods `YYYY-MM-DD`), `weekly`
/// (`YYYY-WW`), `monthly` (`YYYY-MM`) or `yearly`, and defaults to daily
/// when absent or empty. Any other value is a 400.
///
/// `disease` absent or `all` covers every non-healthy label.
pub async fn disease_temporal(
    State(state): State<SharedState>,
    Query(query): Query<TemporalQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let granularity = match param(&query.interval) {
        Some(raw) => raw.parse::<Granularity>()?,
        None => Granularity::default(),
    };
    let filter = DiseaseFilter::from_param(query.disease.as_deref());
    tracing::debug!(?filter, interval = %granularity, "temporal counts");

    let counts = state.store.temporal_counts(&filter, granularity).await?;
    Ok(Json(counts))
}

/// POST /api/dashboard/biomarkers/refresh
pub async fn refresh_biomarkers(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, ApiError> {
    let names = state.registry.refresh(state.store.as_ref()).await?;
    Ok(Json(names.to_vec()))
}
