//! State Transition Log Model
//!
//! Append-only audit trail. One row per accepted state transition,
//! written in the same unit of work as the entity update. Rows are
//! never updated or deleted.

use serde::{Deserialize, Serialize};

/// Immutable audit record of a single state transition
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StateTransitionLog {
    pub id: i64,
    /// Entity kind, e.g. "reservation" or "room"
    pub entity_type: String,
    pub entity_id: i64,
    /// Status column that changed, e.g. "operational_status"
    pub field: String,
    pub old_value: String,
    pub new_value: String,
    pub changed_by: Option<i64>,
    pub changed_by_name: Option<String>,
    pub organization_id: i64,
    pub created_at: i64,
}
