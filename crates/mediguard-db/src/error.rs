//! Database error types.

use mediguard_common::ApiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{op} failed: {source}")]
    Query {
        op: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl DbError {
    pub(crate) fn query(op: &'static str) -> impl FnOnce(sqlx::Error) -> DbError {
        move |source| DbError::Query { op, source }
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::upstream(err)
    }
}
