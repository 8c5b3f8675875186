//! MediGuard API server.
//!
//! Run with: cargo run -p mediguard-web

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mediguard_analysis::BiomarkerRegistry;
use mediguard_config::Config;
use mediguard_db::{connect, PgSampleStore, SampleStore};
use mediguard_web::{prediction::PredictionClient, build_router, shutdown, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mediguard=debug,info")),
        )
        .init();

    info!("MediGuard starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().context("loading configuration")?;
    let environment = config.server.environment;
    info!("Configuration loaded. Environment: {}, table: {}", environment.as_str(), config.store.table);

    info!("Connecting to PostgreSQL...");
    let pool = connect(&config.database).await.context("connecting to PostgreSQL")?;
    let store: Arc<dyn SampleStore> = Arc::new(
        PgSampleStore::new(pool, &config.store).context("resolving sample table layout")?,
    );
    info!("PostgreSQL connected.");

    let registry = BiomarkerRegistry::load(&config.biomarkers, store.as_ref())
        .await
        .context("loading biomarker registry")?;
    info!("Biomarker registry ready: {} biomarkers", registry.list().len());

    let prediction = PredictionClient::new(&config.prediction)
        .context("building prediction service client")?;
    info!("Prediction service: {}", prediction.endpoint());

    let state = AppState::new(store, Arc::new(registry), Arc::new(prediction), environment)
        .with_rate_limit(&config.server);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.bind.as_str())
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    info!("Listening on http://{}", config.server.bind);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown::signal())
        .await
        .context("server error")?;

    info!("MediGuard stopped.");
    Ok(())
}
