//! Reservation Model
//!
//! A reservation carries two independent status axes: the operational
//! lifecycle (incomplete → … → check_out) and the financial lifecycle
//! (pending_payment → … → refunded). They are validated by separate
//! state machines and must never be conflated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Operational reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OperationalStatus {
    Incomplete,
    Pending,
    Confirmed,
    CheckIn,
    CheckOut,
    Cancelled,
    NoShow,
}

impl OperationalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationalStatus::Incomplete => "incomplete",
            OperationalStatus::Pending => "pending",
            OperationalStatus::Confirmed => "confirmed",
            OperationalStatus::CheckIn => "check_in",
            OperationalStatus::CheckOut => "check_out",
            OperationalStatus::Cancelled => "cancelled",
            OperationalStatus::NoShow => "no_show",
        }
    }

    /// Statuses that still hold inventory for their date range.
    pub const ACTIVE: [OperationalStatus; 4] = [
        OperationalStatus::Incomplete,
        OperationalStatus::Pending,
        OperationalStatus::Confirmed,
        OperationalStatus::CheckIn,
    ];

    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OperationalStatus::CheckOut
                | OperationalStatus::Cancelled
                | OperationalStatus::NoShow
        )
    }
}

impl std::fmt::Display for OperationalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Financial reservation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum FinancialStatus {
    PendingPayment,
    Partial,
    Paid,
    PartialRefund,
    Refunded,
}

impl FinancialStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinancialStatus::PendingPayment => "pending_payment",
            FinancialStatus::Partial => "partial",
            FinancialStatus::Paid => "paid",
            FinancialStatus::PartialRefund => "partial_refund",
            FinancialStatus::Refunded => "refunded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FinancialStatus::PartialRefund | FinancialStatus::Refunded
        )
    }
}

impl std::fmt::Display for FinancialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the reservation originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum OriginType {
    Website,
    WalkIn,
    Phone,
    Ota,
    Other,
}

impl OriginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OriginType::Website => "website",
            OriginType::WalkIn => "walk_in",
            OriginType::Phone => "phone",
            OriginType::Ota => "ota",
            OriginType::Other => "other",
        }
    }
}

/// Reservation entity — a stay request against a property's inventory.
///
/// The stay occupies `[check_in_date, check_out_date)`; the room may stay
/// unbound (`room_id` NULL) until check-in, in which case the reservation
/// still consumes capacity of its room type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    /// Human-readable code printed on the confirmation, unique
    pub confirmation_code: String,
    pub organization_id: i64,
    pub property_id: i64,
    pub room_type_id: i64,
    pub room_id: Option<i64>,
    pub requested_bed_configuration_id: Option<i64>,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub adults: i32,
    pub children: i32,
    pub total_amount: f64,
    pub currency: String,
    pub operational_status: OperationalStatus,
    pub financial_status: FinancialStatus,
    pub origin_type: OriginType,
    /// Links sibling reservations created together for one party
    pub group_code: Option<String>,
    pub special_requests: Option<String>,
    /// Deadline (Unix millis) for the guest to secure a pending hold
    pub payment_deadline: Option<i64>,
    pub created_by: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Reservation {
    pub fn stay_range(&self) -> crate::types::StayRange {
        crate::types::StayRange::new(self.check_in_date, self.check_out_date)
    }
}

/// Create reservation payload (allocator input)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub property_id: i64,
    pub room_type_id: i64,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    #[serde(default = "default_adults")]
    pub adults: i32,
    #[serde(default)]
    pub children: i32,
    pub origin_type: OriginType,
    pub requested_bed_configuration_id: Option<i64>,
    pub special_requests: Option<String>,
    /// Optional promotion code forwarded to the pricing collaborator
    pub promotion_code: Option<String>,
    pub payment_deadline: Option<i64>,
}

fn default_adults() -> i32 {
    1
}
