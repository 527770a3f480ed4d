//! Payment Model

use serde::{Deserialize, Serialize};

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    Cash,
    Card,
    Transfer,
    Online,
}

/// Payment record status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
    Failed,
}

/// Payment entity.
///
/// Refunds are stored as negative-amount completed rows, so the sum of
/// completed payments is always the net amount held.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub reservation_id: i64,
    pub organization_id: i64,
    pub amount: f64,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Gateway or bank reference, when one exists
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub processed_at: i64,
    pub created_by: Option<i64>,
}

/// Create payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub amount: f64,
    pub method: PaymentMethod,
    #[serde(default = "default_status")]
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

fn default_status() -> PaymentStatus {
    PaymentStatus::Completed
}

/// Refund request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundRequest {
    pub amount: f64,
    pub notes: Option<String>,
}
