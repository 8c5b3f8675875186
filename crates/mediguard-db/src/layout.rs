//! Table layout: the configured table and column names, pre-quoted for SQL.

use crate::error::{DbError, Result};
use mediguard_config::StoreConfig;

/// Quote an SQL identifier, doubling embedded double quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[derive(Debug, Clone)]
pub struct TableLayout {
    /// Raw table name, as stored in `information_schema`.
    pub table_name: String,
    pub table: String,
    pub patient_id: String,
    pub timestamp: String,
    pub disease: String,
    pub patient_id_key: String,
    pub timestamp_key: String,
    pub disease_key: String,
    pub healthy_label: String,
    pub temporal_limit: i64,
    /// Lowercased column names that are never biomarkers.
    pub reserved: Vec<String>,
}

impl TableLayout {
    pub fn from_config(cfg: &StoreConfig) -> Result<Self> {
        for name in [&cfg.table, &cfg.patient_id_column, &cfg.timestamp_column, &cfg.disease_column] {
            if name.trim().is_empty() || name.contains('\0') {
                return Err(DbError::InvalidIdentifier(format!("{name:?}")));
            }
        }
        Ok(Self {
            table_name: cfg.table.clone(),
            table: quote_ident(&cfg.table),
            patient_id: quote_ident(&cfg.patient_id_column),
            timestamp: quote_ident(&cfg.timestamp_column),
            disease: quote_ident(&cfg.disease_column),
            patient_id_key: cfg.patient_id_column.clone(),
            timestamp_key: cfg.timestamp_column.clone(),
            disease_key: cfg.disease_column.clone(),
            healthy_label: cfg.healthy_label.clone(),
            temporal_limit: cfg.temporal_sample_limit,
            reserved: cfg.reserved_columns(),
        })
    }

    pub fn is_reserved(&self, column: &str) -> bool {
        let lower = column.to_lowercase();
        self.reserved.iter().any(|r| *r == lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("Glucose"), "\"Glucose\"");
        assert_eq!(quote_ident("a\"; DROP TABLE x; --"), "\"a\"\"; DROP TABLE x; --\"");
    }

    #[test]
    fn test_layout_reserved_is_case_insensitive() {
        let layout = TableLayout::from_config(&StoreConfig::default()).unwrap();
        assert!(layout.is_reserved("patientid"));
        assert!(layout.is_reserved("TIMESTAMP"));
        assert!(layout.is_reserved("Id"));
        assert!(!layout.is_reserved("Glucose"));
        assert_eq!(layout.table, "\"blood_samples\"");
    }

    #[test]
    fn test_layout_rejects_empty_names() {
        let cfg = StoreConfig { table: " ".into(), ..StoreConfig::default() };
        assert!(TableLayout::from_config(&cfg).is_err());
    }
}
