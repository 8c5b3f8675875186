use mediguard_common::ApiError;
use mediguard_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Patient not found")]
    PatientNotFound,

    #[error(transparent)]
    Store(#[from] DbError),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::PatientNotFound => ApiError::NotFound(err.to_string()),
            AnalysisError::Store(e) => e.into(),
        }
    }
}
