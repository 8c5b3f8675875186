//! HTTP-facing error taxonomy shared by every handler.
//!
//! Every error renders as `{ "message": ..., "error": ..., "stack": ... }`
//! with `error` and `stack` omitted when empty. `stack` (the debug rendering
//! of the cause chain) never goes out by default: 500 responses carry it in
//! an [`ErrorDetails`] extension, and [`reveal_error_details`] swaps it into
//! the body. The router does that outside production.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed request parameters.
    #[error("{0}")]
    Validation(String),

    /// No matching patient, sample or disease/biomarker combination.
    #[error("{0}")]
    NotFound(String),

    /// Data-access failure or any other unexpected error.
    #[error("Server Error: {0:#}")]
    Upstream(anyhow::Error),

    /// An external service answered with an error status; forwarded as-is.
    #[error("{message} [{status}]")]
    Service {
        status: u16,
        message: String,
        detail: Option<String>,
    },
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn upstream(err: impl Into<anyhow::Error>) -> Self {
        ApiError::Upstream(err.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Service { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
        }
    }

    /// JSON body for this error.
    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::Validation(msg) | ApiError::NotFound(msg) => ErrorBody {
                message: msg.clone(),
                error: None,
                stack: None,
            },
            ApiError::Upstream(err) => ErrorBody {
                message: "Server Error".to_string(),
                error: Some(format!("{err:#}")),
                stack: None,
            },
            ApiError::Service { message, detail, .. } => ErrorBody {
                message: message.clone(),
                error: detail.clone(),
                stack: None,
            },
        }
    }
}

impl ApiError {
    /// [`ApiError::body`] plus `stack` for upstream failures.
    pub fn detailed_body(&self) -> ErrorBody {
        let mut body = self.body();
        if let ApiError::Upstream(err) = self {
            body.stack = Some(format!("{err:?}"));
        }
        body
    }
}

/// Full error body, stack included, attached to 500 responses.
#[derive(Debug, Clone)]
pub struct ErrorDetails(pub ErrorBody);

/// Replace the body of an error response with its [`ErrorDetails`], if any.
pub fn reveal_error_details(mut response: Response) -> Response {
    match response.extensions_mut().remove::<ErrorDetails>() {
        Some(ErrorDetails(body)) => (response.status(), Json(body)).into_response(),
        None => response,
    }
}

/// Wire shape of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = ?self, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
        }
        let mut response = (status, Json(self.body())).into_response();
        if matches!(self, ApiError::Upstream(_)) {
            response.extensions_mut().insert(ErrorDetails(self.detailed_body()));
        }
        response
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Upstream(err)
    }
}

impl From<crate::period::UnknownGranularity> for ApiError {
    fn from(err: crate::period::UnknownGranularity) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_is_400_without_error_field() {
        let (status, body) = render(ApiError::Validation("Disease parameter is required".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "message": "Disease parameter is required" }));
    }

    #[tokio::test]
    async fn test_not_found_is_404() {
        let (status, body) = render(ApiError::NotFound("Patient not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Patient not found");
    }

    #[tokio::test]
    async fn test_upstream_surfaces_cause() {
        let err = anyhow::anyhow!("connection refused").context("average query failed");
        let (status, body) = render(ApiError::upstream(err)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server Error");
        assert_eq!(body["error"], "average query failed: connection refused");
    }

    #[tokio::test]
    async fn test_stack_only_after_reveal() {
        let err = anyhow::anyhow!("pool timed out").context("ping failed");
        let (_, hidden) = render(ApiError::upstream(err)).await;
        assert!(hidden.get("stack").is_none());

        let err = anyhow::anyhow!("pool timed out").context("ping failed");
        let resp = reveal_error_details(ApiError::upstream(err).into_response());
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["message"], "Server Error");
        assert_eq!(body["error"], "ping failed: pool timed out");
        assert!(body["stack"].as_str().unwrap().contains("pool timed out"));
    }

    #[tokio::test]
    async fn test_reveal_leaves_client_errors_alone() {
        let resp = reveal_error_details(ApiError::NotFound("Patient not found".into()).into_response());
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Patient not found" }));
    }

    #[tokio::test]
    async fn test_service_error_keeps_upstream_status() {
        let err = ApiError::Service {
            status: 422,
            message: "Error from prediction service".into(),
            detail: Some("Glucose: field required".into()),
        };
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "Glucose: field required");
    }
}
