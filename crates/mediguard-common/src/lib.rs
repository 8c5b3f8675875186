//! mediguard-common: Shared types and errors used across all MediGuard crates.

pub mod error;
pub mod entities;
pub mod period;

// Re-export commonly used types
pub use entities::{
    SampleRecord, DiseaseCount, BiomarkerSummary, BiomarkerAverage, TemporalCount,
};
pub use error::{reveal_error_details, ApiError, ApiResult, ErrorBody};
pub use period::{Granularity, DiseaseFilter};
