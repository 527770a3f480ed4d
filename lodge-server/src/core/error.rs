//! Engine error taxonomy
//!
//! Three caller-facing classes plus the storage plumbing:
//! - [`EngineError::Validation`] — malformed input, rejected before any
//!   lock is taken.
//! - [`EngineError::Conflict`] — capacity exhausted; recoverable, the
//!   caller retries with different dates or type.
//! - [`EngineError::InvalidTransition`] — state change not reachable from
//!   the current state; surfaced verbatim with the allowed-next set,
//!   never silently coerced.

use crate::db::repository::RepoError;

/// Engine-level error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(
        "Invalid transition for {entity}.{field}: {current} -> {attempted} (allowed from '{current}': [{}])",
        .allowed.join(", ")
    )]
    InvalidTransition {
        entity: &'static str,
        field: &'static str,
        current: String,
        attempted: String,
        allowed: Vec<String>,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepoError> for EngineError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => EngineError::NotFound(msg),
            RepoError::Duplicate(msg) => EngineError::Conflict(msg),
            RepoError::Validation(msg) => EngineError::Validation(msg),
            RepoError::Database(msg) => EngineError::Database(msg),
        }
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => EngineError::NotFound("Row not found".into()),
            other => EngineError::Database(other.to_string()),
        }
    }
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
