//! Axum router: maps all URL paths to handlers.

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use mediguard_common::reveal_error_details;

use crate::handlers::{
    dashboard::{
        available_biomarkers, biomarker_data, disease_distribution, disease_profile,
        disease_temporal, ping, refresh_biomarkers,
    },
    patients::{patient, patient_analysis, patient_dates},
    predict::predict,
    system::{health, not_found, root},
};
use crate::rate_limit::limit_requests;
use crate::security::with_security_headers;
use crate::state::{AppState, SharedState};

fn dashboard_routes() -> Router<SharedState> {
    Router::new()
        .route("/ping",                  get(ping))
        .route("/disease-distribution",  get(disease_distribution))
        .route("/available-biomarkers",  get(available_biomarkers))
        .route("/biomarker-data",        get(biomarker_data))
        .route("/disease-profile",       get(disease_profile))
        .route("/disease-temporal",      get(disease_temporal))
        .route("/biomarkers/refresh",    post(refresh_biomarkers))
        .route("/patient/{patient_id}",          get(patient))
        .route("/patient-dates/{patient_id}",    get(patient_dates))
        .route("/patient-analysis/{patient_id}", get(patient_analysis))
}

fn api_routes(state: &AppState) -> Router<SharedState> {
    let api = Router::new()
        .route("/health",  get(health))
        .route("/predict", post(predict))
        .nest("/dashboard", dashboard_routes());

    match &state.rate_limiter {
        Some(limiter) => api.layer(middleware::from_fn_with_state(limiter.clone(), limit_requests)),
        None => api,
    }
}

/// Outside production, upstream error bodies carry a `stack` field.
async fn error_details(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if state.environment.is_production() {
        response
    } else {
        reveal_error_details(response)
    }
}

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let api = api_routes(&state);
    let shared: SharedState = Arc::new(state);

    let router = Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(shared.clone(), error_details));

    with_security_headers(router)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(shared)
}
