//! Service banner, health check and the JSON 404 fallback.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use crate::state::SharedState;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "MediGuard AI Backend API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "dashboard": "/api/dashboard",
            "predict": "/api/predict",
        },
    }))
}

/// Always 200; the database state is reported in the body.
pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let database = match state.store.ping().await {
        Ok(()) => "connected",
        Err(e) => {
            tracing::warn!(error = %e, "database ping failed");
            "disconnected"
        }
    };

    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": Utc::now(),
        "database": { "status": database },
        "environment": state.environment.as_str(),
    }))
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "message": "Route not found" })),
    )
}
