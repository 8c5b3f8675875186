//! mediguard-analysis: Patient biomarker deviation ranking.
//!
//! - [`registry`]: the biomarker list, loaded once and refreshed on demand
//! - [`deviation`]: per-biomarker deviation math, the admission filter and
//!   the contributing-factor ranking
//! - [`engine`]: `analyze` and the disease profile built on a `SampleStore`

pub mod deviation;
pub mod engine;
pub mod error;
pub mod registry;

pub use deviation::{ContributingFactor, Direction};
pub use engine::{Analyzer, PatientAnalysis};
pub use error::AnalysisError;
pub use registry::BiomarkerRegistry;
