//! Repository Module
//!
//! CRUD and query functions over the SQLite schema. Functions take an
//! executor so they compose into a caller's transaction where needed.

// Inventory
pub mod property;
pub mod room;
pub mod room_type;

// Reservations
pub mod payment;
pub mod reservation;

// Audit
pub mod transition_log;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Operational statuses that hold inventory, as a SQL `IN` list body.
/// Kept as one constant so every overlap query agrees on the active set.
pub(crate) const ACTIVE_STATUSES_SQL: &str = "'incomplete','pending','confirmed','check_in'";
