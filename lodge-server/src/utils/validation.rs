//! Input validation helpers
//!
//! Malformed input is rejected here, before any lock is taken or any
//! query runs.

use chrono::NaiveDate;
use shared::StayRange;
use shared::models::RoomType;

use crate::core::error::{EngineError, EngineResult};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_NOTE_LEN: usize = 1000;

/// Validate a required text field: non-empty after trim, bounded length.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> EngineResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{field} must not be empty")));
    }
    if trimmed.len() > max_len {
        return Err(EngineError::Validation(format!(
            "{field} exceeds maximum length of {max_len}"
        )));
    }
    Ok(())
}

/// Validate an optional text field when present.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> EngineResult<()> {
    if let Some(v) = value {
        if v.len() > max_len {
            return Err(EngineError::Validation(format!(
                "{field} exceeds maximum length of {max_len}"
            )));
        }
    }
    Ok(())
}

/// Validate a stay range: strictly ordered dates.
pub fn validate_stay_range(range: &StayRange) -> EngineResult<()> {
    if !range.is_valid() {
        return Err(EngineError::Validation(format!(
            "check-out date must be after check-in date, got {range}"
        )));
    }
    Ok(())
}

/// Validate a stay range that must not start in the past.
pub fn validate_future_stay_range(range: &StayRange, today: NaiveDate) -> EngineResult<()> {
    validate_stay_range(range)?;
    if range.check_in < today {
        return Err(EngineError::Validation(
            "check-in date must not be in the past".into(),
        ));
    }
    Ok(())
}

/// Validate party size against a room type's capacity.
pub fn validate_party(room_type: &RoomType, adults: i32, children: i32) -> EngineResult<()> {
    if adults < 1 {
        return Err(EngineError::Validation(
            "at least one adult is required".into(),
        ));
    }
    if children < 0 {
        return Err(EngineError::Validation(
            "children must not be negative".into(),
        ));
    }
    if adults > room_type.max_adults {
        return Err(EngineError::Validation(format!(
            "room type '{}' allows at most {} adults",
            room_type.name, room_type.max_adults
        )));
    }
    if children > room_type.max_children {
        return Err(EngineError::Validation(format!(
            "room type '{}' allows at most {} children",
            room_type.name, room_type.max_children
        )));
    }
    Ok(())
}
