//! Common types for the shared crate

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// Half-open stay range `[check_in, check_out)`.
///
/// The check-out day is not occupied, so back-to-back stays
/// (A checks out the day B checks in) never conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayRange {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayRange {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            check_in,
            check_out,
        }
    }

    /// A range is well-formed only when check-in is strictly before check-out.
    pub fn is_valid(&self) -> bool {
        self.check_in < self.check_out
    }

    /// Number of nights in the stay.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Strict half-open overlap: `[a,b)` and `[c,d)` intersect iff `a < d && c < b`.
    pub fn overlaps(&self, other: &StayRange) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }
}

impl std::fmt::Display for StayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {})", self.check_in, self.check_out)
    }
}

/// The acting principal for an operation.
///
/// Tenancy (organization) is always supplied by the caller; the engine
/// never resolves it. `user_id` is `None` for system-initiated actions
/// such as the stale-hold sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub organization_id: i64,
    pub user_id: Option<i64>,
    pub display_name: Option<String>,
}

impl Actor {
    pub fn user(organization_id: i64, user_id: i64, display_name: impl Into<String>) -> Self {
        Self {
            organization_id,
            user_id: Some(user_id),
            display_name: Some(display_name.into()),
        }
    }

    /// System actor for background jobs (no user attached).
    pub fn system(organization_id: i64) -> Self {
        Self {
            organization_id,
            user_id: None,
            display_name: None,
        }
    }
}
