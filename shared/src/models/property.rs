//! Property Model

use serde::{Deserialize, Serialize};

/// Property entity — a single hotel operated by an organization
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Property {
    pub id: i64,
    pub organization_id: i64,
    pub name: String,
    pub slug: String,
    /// ISO-4217 currency code used for all reservations of this property
    pub currency: String,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create property payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyCreate {
    pub organization_id: i64,
    pub name: String,
    pub slug: String,
    pub currency: Option<String>,
}
