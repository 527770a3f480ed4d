//! Finite State Machine
//!
//! Generic transition validator plus typed, per-entity transition ops.
//! Three independent tables share one algorithm: room status,
//! reservation operational status and reservation financial status.
//! A reservation carries two unrelated state axes that are validated by
//! separate tables and must never be conflated.
//!
//! Every accepted transition writes the entity field and appends one
//! `state_transition_log` row on the SAME connection, so callers that
//! pass a transaction get both writes or neither.

use shared::Actor;
use shared::models::{FinancialStatus, OperationalStatus, RoomStatus};
use sqlx::SqliteConnection;

use crate::core::error::{EngineError, EngineResult};
use crate::db::repository::{reservation, room, transition_log};

/// Static transition table: `state → set of allowed next states`.
pub struct StateMachine<S: Copy + Eq + 'static> {
    transitions: &'static [(S, &'static [S])],
}

impl<S: Copy + Eq + 'static> StateMachine<S> {
    pub const fn new(transitions: &'static [(S, &'static [S])]) -> Self {
        Self { transitions }
    }

    /// Allowed next states from `current`. Terminal states map to `[]`.
    pub fn allowed_from(&self, current: S) -> &'static [S] {
        self.transitions
            .iter()
            .find(|(state, _)| *state == current)
            .map(|(_, next)| *next)
            .unwrap_or(&[])
    }

    /// Pure membership test.
    pub fn can_transition(&self, current: S, next: S) -> bool {
        self.allowed_from(current).contains(&next)
    }
}

/// Room status machine (housekeeping cycle).
pub static ROOM_STATUS: StateMachine<RoomStatus> = StateMachine::new(&[
    (
        RoomStatus::Available,
        &[RoomStatus::Occupied, RoomStatus::Blocked, RoomStatus::Maintenance],
    ),
    (RoomStatus::Occupied, &[RoomStatus::Dirty]),
    (RoomStatus::Dirty, &[RoomStatus::Cleaning]),
    (RoomStatus::Cleaning, &[RoomStatus::Inspection]),
    (RoomStatus::Inspection, &[RoomStatus::Available, RoomStatus::Dirty]),
    (RoomStatus::Blocked, &[RoomStatus::Available]),
    (RoomStatus::Maintenance, &[RoomStatus::Available]),
]);

/// Operational reservation machine.
pub static OPERATIONAL: StateMachine<OperationalStatus> = StateMachine::new(&[
    (
        OperationalStatus::Incomplete,
        &[
            OperationalStatus::Pending,
            OperationalStatus::Confirmed,
            OperationalStatus::Cancelled,
        ],
    ),
    (
        OperationalStatus::Pending,
        &[OperationalStatus::Confirmed, OperationalStatus::Cancelled],
    ),
    (
        OperationalStatus::Confirmed,
        &[
            OperationalStatus::CheckIn,
            OperationalStatus::Cancelled,
            OperationalStatus::NoShow,
        ],
    ),
    (OperationalStatus::CheckIn, &[OperationalStatus::CheckOut]),
    (OperationalStatus::CheckOut, &[]),
    (OperationalStatus::Cancelled, &[]),
    (OperationalStatus::NoShow, &[]),
]);

/// Financial reservation machine.
pub static FINANCIAL: StateMachine<FinancialStatus> = StateMachine::new(&[
    (
        FinancialStatus::PendingPayment,
        &[FinancialStatus::Partial, FinancialStatus::Paid],
    ),
    (
        FinancialStatus::Partial,
        &[FinancialStatus::Paid, FinancialStatus::Refunded],
    ),
    (
        FinancialStatus::Paid,
        &[FinancialStatus::PartialRefund, FinancialStatus::Refunded],
    ),
    (FinancialStatus::PartialRefund, &[]),
    (FinancialStatus::Refunded, &[]),
]);

fn invalid_transition<S: Copy + std::fmt::Display>(
    entity: &'static str,
    field: &'static str,
    current: S,
    attempted: S,
    allowed: &[S],
) -> EngineError {
    EngineError::InvalidTransition {
        entity,
        field,
        current: current.to_string(),
        attempted: attempted.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
}

/// Transition a room's status. The row is left untouched when the target
/// is not reachable from the current state.
pub async fn set_room_status(
    conn: &mut SqliteConnection,
    room_id: i64,
    next: RoomStatus,
    actor: &Actor,
) -> EngineResult<()> {
    let current = room::read_status(&mut *conn, room_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("Room {room_id} not found")))?;

    if !ROOM_STATUS.can_transition(current, next) {
        return Err(invalid_transition(
            "room",
            "status",
            current,
            next,
            ROOM_STATUS.allowed_from(current),
        ));
    }

    room::write_status(&mut *conn, room_id, next).await?;
    transition_log::append(
        &mut *conn,
        "room",
        room_id,
        "status",
        current.as_str(),
        next.as_str(),
        actor,
    )
    .await?;
    tracing::debug!(room_id, from = %current, to = %next, "room status transition");
    Ok(())
}

/// Transition a reservation's operational status.
pub async fn set_operational_status(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    next: OperationalStatus,
    actor: &Actor,
) -> EngineResult<()> {
    let current = reservation::read_operational_status(&mut *conn, reservation_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("Reservation {reservation_id} not found")))?;

    if !OPERATIONAL.can_transition(current, next) {
        return Err(invalid_transition(
            "reservation",
            "operational_status",
            current,
            next,
            OPERATIONAL.allowed_from(current),
        ));
    }

    reservation::write_status_field(&mut *conn, reservation_id, "operational_status", next.as_str())
        .await?;
    transition_log::append(
        &mut *conn,
        "reservation",
        reservation_id,
        "operational_status",
        current.as_str(),
        next.as_str(),
        actor,
    )
    .await?;
    tracing::debug!(reservation_id, from = %current, to = %next, "operational transition");
    Ok(())
}

/// Transition a reservation's financial status.
pub async fn set_financial_status(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    next: FinancialStatus,
    actor: &Actor,
) -> EngineResult<()> {
    let current = reservation::read_financial_status(&mut *conn, reservation_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("Reservation {reservation_id} not found")))?;

    if !FINANCIAL.can_transition(current, next) {
        return Err(invalid_transition(
            "reservation",
            "financial_status",
            current,
            next,
            FINANCIAL.allowed_from(current),
        ));
    }

    reservation::write_status_field(&mut *conn, reservation_id, "financial_status", next.as_str())
        .await?;
    transition_log::append(
        &mut *conn,
        "reservation",
        reservation_id,
        "financial_status",
        current.as_str(),
        next.as_str(),
        actor,
    )
    .await?;
    tracing::debug!(reservation_id, from = %current, to = %next, "financial transition");
    Ok(())
}
