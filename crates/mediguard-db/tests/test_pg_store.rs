//! PostgreSQL store against a live database.
//!
//! Requires database connection. Run with:
//! ```bash
//! DATABASE_URL=postgres://... cargo test --package mediguard-db --test test_pg_store -- --ignored --nocapture
//! ```

use mediguard_common::{DiseaseFilter, Granularity};
use mediguard_config::{Config, DatabaseConfig};
use mediguard_db::{connect, PgSampleStore, SampleStore};

async fn store() -> PgSampleStore {
    let config = Config::default();
    let database = DatabaseConfig {
        url: std::env::var("DATABASE_URL").unwrap_or(config.database.url.clone()),
        max_connections: 2,
        ..config.database.clone()
    };
    let pool = connect(&database).await.expect("Failed to connect to database");
    PgSampleStore::new(pool, &config.store).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
#[ignore] // Requires database connection
async fn test_pg_ping_and_schema() {
    let store = store().await;
    store.ping().await.unwrap();

    let biomarkers = store.list_numeric_biomarkers().await.unwrap();
    println!("Biomarkers: {:?}", biomarkers);
    assert!(biomarkers.iter().all(|b| !b.eq_ignore_ascii_case("patientid")));
}

#[tokio::test(flavor = "multi_thread")]
#[ignore] // Requires database connection
async fn test_pg_aggregates() {
    let store = store().await;
    let distribution = store.disease_distribution().await.unwrap();
    println!("Distribution: {:?}", distribution);
    assert!(distribution.windows(2).all(|w| w[0].count >= w[1].count));

    let temporal = store
        .temporal_counts(&DiseaseFilter::All, Granularity::Monthly)
        .await
        .unwrap();
    assert!(temporal.iter().map(|t| t.count).sum::<i64>() <= 1000);
}
