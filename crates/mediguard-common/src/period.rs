//! Temporal bucketing granularity and the disease filter used by the
//! temporal-count query.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Period granularity for temporal counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Granularity {
    /// PostgreSQL `TO_CHAR` pattern for the period label.
    /// Weekly labels pair the calendar year with the ISO week number.
    pub fn pg_pattern(&self) -> &'static str {
        match self {
            Granularity::Daily   => "YYYY-MM-DD",
            Granularity::Weekly  => "YYYY-IW",
            Granularity::Monthly => "YYYY-MM",
            Granularity::Yearly  => "YYYY",
        }
    }

    /// chrono format string producing the same labels as [`pg_pattern`](Self::pg_pattern).
    pub fn chrono_pattern(&self) -> &'static str {
        match self {
            Granularity::Daily   => "%Y-%m-%d",
            Granularity::Weekly  => "%Y-%V",
            Granularity::Monthly => "%Y-%m",
            Granularity::Yearly  => "%Y",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Daily   => "daily",
            Granularity::Weekly  => "weekly",
            Granularity::Monthly => "monthly",
            Granularity::Yearly  => "yearly",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown interval '{0}' (expected daily, weekly, monthly or yearly)")]
pub struct UnknownGranularity(pub String);

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily"   => Ok(Granularity::Daily),
            "weekly"  => Ok(Granularity::Weekly),
            "monthly" => Ok(Granularity::Monthly),
            "yearly"  => Ok(Granularity::Yearly),
            _         => Err(UnknownGranularity(s.to_string())),
        }
    }
}

/// Which samples a temporal query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiseaseFilter {
    /// Every non-healthy disease, grouped per disease.
    All,
    /// A single disease label.
    Only(String),
}

impl DiseaseFilter {
    /// Absent, empty and `"all"` select every disease.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            None | Some("") | Some("all") => DiseaseFilter::All,
            Some(d) => DiseaseFilter::Only(d.to_string()),
        }
    }
}
