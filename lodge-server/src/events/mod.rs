//! Lifecycle event bus
//!
//! The orchestrator raises exactly one named event per successful
//! operation and does not know or care what consumes it. Dispatch is
//! fire-and-forget over a broadcast channel: consumer failures or a
//! missing consumer never unwind the transaction that produced the
//! event.

use shared::Actor;
use shared::models::Reservation;
use shared::util::now_millis;
use tokio::sync::broadcast;

/// Event names raised by the lifecycle orchestrator.
pub mod names {
    pub const RESERVATION_CONFIRMED: &str = "reservation.confirmed";
    pub const RESERVATION_CHECK_IN: &str = "reservation.check_in";
    pub const RESERVATION_CHECK_OUT: &str = "reservation.check_out";
    pub const RESERVATION_CANCELLED: &str = "reservation.cancelled";
    pub const RESERVATION_NO_SHOW: &str = "reservation.no_show";
    pub const RESERVATION_EXPIRED: &str = "reservation.expired";
}

/// A named lifecycle event with the references consumers need to load
/// their own context.
#[derive(Debug, Clone)]
pub struct LifecycleEvent {
    pub name: &'static str,
    pub organization_id: i64,
    pub property_id: i64,
    pub reservation_id: i64,
    pub room_id: Option<i64>,
    pub actor_user_id: Option<i64>,
    pub timestamp: i64,
}

impl LifecycleEvent {
    pub fn for_reservation(name: &'static str, reservation: &Reservation, actor: &Actor) -> Self {
        Self {
            name,
            organization_id: reservation.organization_id,
            property_id: reservation.property_id,
            reservation_id: reservation.id,
            room_id: reservation.room_id,
            actor_user_id: actor.user_id,
            timestamp: now_millis(),
        }
    }
}

/// Broadcast bus for lifecycle events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }

    /// Fire-and-forget dispatch. A send error only means nobody is
    /// listening right now; it is logged and swallowed.
    pub fn dispatch(&self, event: LifecycleEvent) {
        tracing::debug!(
            event = event.name,
            reservation_id = event.reservation_id,
            "lifecycle event"
        );
        if self.tx.send(event).is_err() {
            tracing::debug!("no lifecycle event subscribers");
        }
    }
}
