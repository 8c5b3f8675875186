//! PostgreSQL implementation of SampleStore.
//!
//! Rows are fetched as `to_jsonb` documents so the table can carry any set of
//! biomarker columns; aggregates are cast to `float8` to avoid NUMERIC
//! decoding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::collections::BTreeMap;
use std::time::Duration;

use mediguard_common::{
    BiomarkerSummary, DiseaseCount, DiseaseFilter, Granularity, SampleRecord, TemporalCount,
};
use mediguard_config::{DatabaseConfig, StoreConfig};

use crate::error::{DbError, Result};
use crate::layout::{quote_ident, TableLayout};
use crate::store::SampleStore;

/// Build the shared connection pool.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await?;
    tracing::info!(
        max_connections = config.max_connections,
        "PostgreSQL pool ready"
    );
    Ok(pool)
}

/// PostgreSQL-backed sample store.
#[derive(Clone)]
pub struct PgSampleStore {
    pool: PgPool,
    layout: TableLayout,
}

impl PgSampleStore {
    pub fn new(pool: PgPool, store: &StoreConfig) -> Result<Self> {
        Ok(Self { pool, layout: TableLayout::from_config(store)? })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_sample(&self, sql: &str, patient_id: &str, at: Option<DateTime<Utc>>, op: &'static str) -> Result<Option<SampleRecord>> {
        let mut query = sqlx::query_as::<_, (serde_json::Value, Option<DateTime<Utc>>)>(sql).bind(patient_id);
        if let Some(ts) = at {
            query = query.bind(ts);
        }
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(DbError::query(op))?;

        row.map(|(doc, ts)| decode_sample(&self.layout, doc, ts)).transpose()
    }
}

fn sample_select(l: &TableLayout) -> String {
    format!(
        "SELECT to_jsonb(s) AS row, s.{ts}::timestamptz AS ts FROM {table} s",
        ts = l.timestamp,
        table = l.table,
    )
}

/// Rows without a timestamp sort after every dated row.
fn latest_sample_sql(l: &TableLayout) -> String {
    format!(
        "{select} WHERE s.{pid}::text = $1 ORDER BY s.{ts} DESC NULLS LAST LIMIT 1",
        select = sample_select(l),
        pid = l.patient_id,
        ts = l.timestamp,
    )
}

fn all_timestamps_sql(l: &TableLayout) -> String {
    format!(
        "SELECT {ts}::timestamptz FROM {table} WHERE {pid}::text = $1 ORDER BY {ts} DESC NULLS LAST",
        ts = l.timestamp,
        table = l.table,
        pid = l.patient_id,
    )
}

#[async_trait]
impl SampleStore for PgSampleStore {
    async fn latest_sample(&self, patient_id: &str) -> Result<Option<SampleRecord>> {
        let sql = latest_sample_sql(&self.layout);
        self.fetch_sample(&sql, patient_id, None, "latest_sample").await
    }

    async fn sample_at(&self, patient_id: &str, timestamp: DateTime<Utc>) -> Result<Option<SampleRecord>> {
        let l = &self.layout;
        let sql = format!(
            "{select} WHERE s.{pid}::text = $1 AND s.{ts}::timestamptz = $2 LIMIT 1",
            select = sample_select(l),
            pid = l.patient_id,
            ts = l.timestamp,
        );
        self.fetch_sample(&sql, patient_id, Some(timestamp), "sample_at").await
    }

    async fn all_timestamps(&self, patient_id: &str) -> Result<Vec<DateTime<Utc>>> {
        let sql = all_timestamps_sql(&self.layout);
        let rows: Vec<Option<DateTime<Utc>>> = sqlx::query_scalar(&sql)
            .bind(patient_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::query("all_timestamps"))?;
        Ok(rows.into_iter().flatten().collect())
    }

    async fn disease_distribution(&self) -> Result<Vec<DiseaseCount>> {
        let l = &self.layout;
        let sql = format!(
            "SELECT {d}::text AS disease, COUNT(*) AS count FROM {table} GROUP BY {d} ORDER BY count DESC",
            d = l.disease,
            table = l.table,
        );
        let rows: Vec<(Option<String>, i64)> = sqlx::query_as(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DbError::query("disease_distribution"))?;
        tracing::debug!("disease_distribution: {} groups", rows.len());
        Ok(rows.into_iter().map(|(disease, count)| DiseaseCount { disease, count }).collect())
    }

    async fn biomarker_average(&self, disease: &str, biomarker: &str) -> Result<Option<f64>> {
        let l = &self.layout;
        let col = quote_ident(biomarker);
        let sql = format!(
            "SELECT AVG({col})::float8 FROM {table} WHERE {d} = $1 AND {col} IS NOT NULL",
            table = l.table,
            d = l.disease,
        );
        sqlx::query_scalar(&sql)
            .bind(disease)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::query("biomarker_average"))
    }

    async fn biomarker_summary(&self, disease: &str, biomarker: &str) -> Result<Option<BiomarkerSummary>> {
        let l = &self.layout;
        let col = quote_ident(biomarker);
        let sql = format!(
            r#"
            SELECT
                MIN({col})::float8,
                MAX({col})::float8,
                AVG({col})::float8,
                PERCENTILE_CONT(0.25) WITHIN GROUP (ORDER BY {col}::float8),
                PERCENTILE_CONT(0.50) WITHIN GROUP (ORDER BY {col}::float8),
                PERCENTILE_CONT(0.75) WITHIN GROUP (ORDER BY {col}::float8),
                COUNT(*)
            FROM {table}
            WHERE {d} = $1 AND {col} IS NOT NULL
            "#,
            table = l.table,
            d = l.disease,
        );
        type Row = (Option<f64>, Option<f64>, Option<f64>, Option<f64>, Option<f64>, Option<f64>, i64);
        let (min, max, mean, q1, median, q3, count): Row = sqlx::query_as(&sql)
            .bind(disease)
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::query("biomarker_summary"))?;

        if count == 0 {
            return Ok(None);
        }
        match (min, max, mean, q1, median, q3) {
            (Some(min), Some(max), Some(mean), Some(q1), Some(median), Some(q3)) => {
                Ok(Some(BiomarkerSummary { min, max, mean, q1, median, q3, count }))
            }
            _ => Err(DbError::Decode(format!(
                "null aggregate for {biomarker}/{disease} with count {count}"
            ))),
        }
    }

    async fn temporal_counts(&self, filter: &DiseaseFilter, granularity: Granularity) -> Result<Vec<TemporalCount>> {
        let l = &self.layout;
        let pattern = granularity.pg_pattern();

        match filter {
            DiseaseFilter::Only(disease) => {
                let sql = format!(
                    r#"
                    SELECT TO_CHAR(ts, '{pattern}') AS period, COUNT(*) AS count
                    FROM (
                        SELECT {t}::timestamptz AS ts
                        FROM {table}
                        WHERE {d} = $1
                        ORDER BY {t} DESC
                        LIMIT $2
                    ) AS limited_data
                    GROUP BY period
                    ORDER BY period ASC
                    "#,
                    t = l.timestamp,
                    table = l.table,
                    d = l.disease,
                );
                let rows: Vec<(Option<String>, i64)> = sqlx::query_as(&sql)
                    .bind(disease)
                    .bind(l.temporal_limit)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(DbError::query("temporal_counts"))?;
                Ok(rows
                    .into_iter()
                    .map(|(period, count)| TemporalCount {
                        period: period.unwrap_or_default(),
                        disease: disease.clone(),
                        count,
                    })
                    .collect())
            }
            DiseaseFilter::All => {
                let sql = format!(
                    r#"
                    SELECT TO_CHAR(ts, '{pattern}') AS period, disease, COUNT(*) AS count
                    FROM (
                        SELECT {t}::timestamptz AS ts, {d}::text AS disease
                        FROM {table}
                        WHERE {d} != $1
                        ORDER BY {t} DESC
                        LIMIT $2
                    ) AS limited_data
                    GROUP BY period, disease
                    ORDER BY period ASC, count DESC
                    "#,
                    t = l.timestamp,
                    table = l.table,
                    d = l.disease,
                );
                let rows: Vec<(Option<String>, Option<String>, i64)> = sqlx::query_as(&sql)
                    .bind(&l.healthy_label)
                    .bind(l.temporal_limit)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(DbError::query("temporal_counts"))?;
                Ok(rows
                    .into_iter()
                    .map(|(period, disease, count)| TemporalCount {
                        period: period.unwrap_or_default(),
                        disease: disease.unwrap_or_default(),
                        count,
                    })
                    .collect())
            }
        }
    }

    async fn list_numeric_biomarkers(&self) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT column_name::text
            FROM information_schema.columns
            WHERE table_name = $1
              AND data_type IN ('integer', 'numeric', 'double precision', 'real')
              AND LOWER(column_name) <> ALL($2)
            ORDER BY ordinal_position
            "#,
        )
        .bind(&self.layout.table_name)
        .bind(&self.layout.reserved)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::query("list_numeric_biomarkers"))?;

        tracing::debug!("list_numeric_biomarkers: {} columns", names.len());
        Ok(names)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::query("ping"))?;
        Ok(())
    }
}

// ── Row decoding ─────────────────────────────────────────────────────────────

/// Turn a `to_jsonb` row into a [`SampleRecord`].
///
/// Reserved columns are lifted into the typed fields; numeric columns become
/// biomarkers, nulls become absent values, and other JSON types are dropped.
pub(crate) fn decode_sample(
    layout: &TableLayout,
    doc: serde_json::Value,
    ts: Option<DateTime<Utc>>,
) -> Result<SampleRecord> {
    let serde_json::Value::Object(map) = doc else {
        return Err(DbError::Decode("sample row is not a JSON object".into()));
    };

    let patient_id = match map.get(&layout.patient_id_key) {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Err(DbError::Decode(format!("missing {}", layout.patient_id_key))),
    };
    let timestamp = ts.ok_or_else(|| DbError::Decode(format!("missing {}", layout.timestamp_key)))?;
    let disease = map
        .get(&layout.disease_key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let mut biomarkers = BTreeMap::new();
    for (column, value) in &map {
        if layout.is_reserved(column) {
            continue;
        }
        match value {
            serde_json::Value::Number(n) => {
                biomarkers.insert(column.clone(), n.as_f64());
            }
            serde_json::Value::Null => {
                biomarkers.insert(column.clone(), None);
            }
            _ => {}
        }
    }

    Ok(SampleRecord { patient_id, timestamp, disease, biomarkers })
}
