//! Room Type Model

use serde::{Deserialize, Serialize};

/// Room type entity — a sellable category within a property.
///
/// Many rooms may serve one type and one room may serve several types
/// (room ↔ type is many-to-many, not 1:1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RoomType {
    pub id: i64,
    pub property_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub max_adults: i32,
    pub max_children: i32,
    /// Base nightly price, before any pricing modifiers
    pub base_price: f64,
    /// Nightly surcharge per adult after the first
    pub extra_adult_fee: f64,
    /// Nightly surcharge per child
    pub extra_child_fee: f64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create room type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTypeCreate {
    pub property_id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub max_adults: i32,
    #[serde(default)]
    pub max_children: i32,
    pub base_price: f64,
    #[serde(default)]
    pub extra_adult_fee: f64,
    #[serde(default)]
    pub extra_child_fee: f64,
}

/// Update room type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomTypeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub max_adults: Option<i32>,
    pub max_children: Option<i32>,
    pub base_price: Option<f64>,
    pub extra_adult_fee: Option<f64>,
    pub extra_child_fee: Option<f64>,
    pub is_active: Option<bool>,
}

/// Bed configuration attached to a room type (e.g. "1 king", "2 twins")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BedConfiguration {
    pub id: i64,
    pub room_type_id: i64,
    pub name: String,
}

/// Create bed configuration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedConfigurationCreate {
    pub room_type_id: i64,
    pub name: String,
}
