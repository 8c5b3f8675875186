//! Per-patient endpoints.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Deserialize;

use mediguard_common::ApiError;

use super::param;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct AnalysisQuery {
    pub timestamp: Option<String>,
}

pub async fn patient(
    State(state): State<SharedState>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sample = state
        .store
        .latest_sample(&patient_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Patient not found".to_string()))?;
    Ok(Json(sample))
}

pub async fn patient_dates(
    State(state): State<SharedState>,
    Path(patient_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let dates = state.store.all_timestamps(&patient_id).await?;
    if dates.is_empty() {
        return Err(ApiError::NotFound(
            "No analysis records found for this patient".to_string(),
        ));
    }
    Ok(Json(dates))
}

/// GET /api/dashboard/patient-analysis/{patient_id}?timestamp=
pub async fn patient_analysis(
    State(state): State<SharedState>,
    Path(patient_id): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let timestamp = param(&query.timestamp).map(parse_timestamp).transpose()?;
    let analysis = state.analyzer.analyze(&patient_id, timestamp).await?;
    Ok(Json(analysis))
}

/// RFC 3339, or a bare ISO-8601 date/date-time read as UTC.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(ApiError::Validation(format!("Invalid timestamp '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-15T08:30:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-15T10:30:00+02:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-15T08:30:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2024-03-15 08:30:00.000").unwrap(), expected);
        assert_eq!(
            parse_timestamp("2024-03-15").unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("last tuesday").unwrap_err();
        assert_eq!(err.status().as_u16(), 400);
    }
}
