//! Room Model

use serde::{Deserialize, Serialize};

/// Room housekeeping/occupancy status.
///
/// Transitions are validated by the room status state machine; the
/// status column is never written outside a validated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum RoomStatus {
    Available,
    Occupied,
    Dirty,
    Cleaning,
    Inspection,
    Blocked,
    Maintenance,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Dirty => "dirty",
            RoomStatus::Cleaning => "cleaning",
            RoomStatus::Inspection => "inspection",
            RoomStatus::Blocked => "blocked",
            RoomStatus::Maintenance => "maintenance",
        }
    }

    pub const ALL: [RoomStatus; 7] = [
        RoomStatus::Available,
        RoomStatus::Occupied,
        RoomStatus::Dirty,
        RoomStatus::Cleaning,
        RoomStatus::Inspection,
        RoomStatus::Blocked,
        RoomStatus::Maintenance,
    ];
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Room entity — a physical unit of a property
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Room {
    pub id: i64,
    pub property_id: i64,
    /// Human room number, unique per property
    pub number: String,
    pub floor: Option<String>,
    pub status: RoomStatus,
    /// Currently installed bed configuration, if any
    pub active_bed_configuration_id: Option<i64>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create room payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreate {
    pub property_id: i64,
    pub number: String,
    pub floor: Option<String>,
    /// Sellable types this room can serve (many-to-many)
    pub room_type_ids: Vec<i64>,
    pub active_bed_configuration_id: Option<i64>,
}

/// Update room payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub number: Option<String>,
    pub floor: Option<String>,
    pub room_type_ids: Option<Vec<i64>>,
    pub active_bed_configuration_id: Option<i64>,
    pub is_active: Option<bool>,
}
