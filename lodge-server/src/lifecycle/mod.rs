//! Lifecycle Orchestrator
//!
//! Couples reservation and room state transitions. Every operation runs
//! its entity transitions inside one transaction — if the room's
//! transition is rejected, the reservation's transition rolls back with
//! it — then raises exactly one lifecycle event after commit.

pub mod financial;

#[cfg(test)]
mod tests;

use shared::models::{OperationalStatus, Reservation, Room, RoomStatus};
use shared::{Actor, StayRange};
use sqlx::{SqliteConnection, SqlitePool};

use crate::core::error::{EngineError, EngineResult};
use crate::db::repository::{reservation, room};
use crate::events::{EventBus, LifecycleEvent, names};
use crate::fsm;

/// Reservation lifecycle operations
#[derive(Clone)]
pub struct LifecycleService {
    pool: SqlitePool,
    events: EventBus,
}

impl LifecycleService {
    pub fn new(pool: SqlitePool, events: EventBus) -> Self {
        Self { pool, events }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load(&self, reservation_id: i64) -> EngineResult<Reservation> {
        reservation::find_by_id(&self.pool, reservation_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Reservation {reservation_id} not found")))
    }

    /// Confirm a hold (incomplete or pending → confirmed).
    pub async fn confirm(&self, reservation_id: i64, actor: &Actor) -> EngineResult<Reservation> {
        let mut tx = self.pool.begin().await?;
        fsm::set_operational_status(&mut tx, reservation_id, OperationalStatus::Confirmed, actor)
            .await?;
        tx.commit().await?;

        let updated = self.load(reservation_id).await?;
        self.events.dispatch(LifecycleEvent::for_reservation(
            names::RESERVATION_CONFIRMED,
            &updated,
            actor,
        ));
        Ok(updated)
    }

    /// A guest-secured hold moves incomplete → pending (e.g. after a
    /// payment voucher arrives).
    pub async fn submit_hold(&self, reservation_id: i64, actor: &Actor) -> EngineResult<Reservation> {
        let mut tx = self.pool.begin().await?;
        fsm::set_operational_status(&mut tx, reservation_id, OperationalStatus::Pending, actor)
            .await?;
        tx.commit().await?;
        self.load(reservation_id).await
    }

    /// Check a guest in. Binds a room (explicit, previously bound, or
    /// auto-assigned) and moves reservation and room together:
    /// confirmed → check_in and available → occupied in one unit of
    /// work.
    pub async fn check_in(
        &self,
        reservation_id: i64,
        room_id: Option<i64>,
        actor: &Actor,
    ) -> EngineResult<Reservation> {
        let res = self.load(reservation_id).await?;

        let mut tx = self.pool.begin().await?;

        // Resolve the room to occupy.
        let target_room = match room_id {
            Some(id) => {
                let r = room::find_by_id(&mut *tx, id)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("Room {id} not found")))?;
                if r.property_id != res.property_id {
                    return Err(EngineError::Validation(
                        "room belongs to a different property".into(),
                    ));
                }
                r
            }
            None => match res.room_id {
                Some(bound) => room::find_by_id(&mut *tx, bound)
                    .await?
                    .ok_or_else(|| EngineError::NotFound(format!("Room {bound} not found")))?,
                None => {
                    let mut candidates = available_rooms_for(&mut tx, &res).await?;
                    if candidates.is_empty() {
                        return Err(EngineError::Conflict(
                            "No available room of the requested type for these dates".into(),
                        ));
                    }
                    candidates.remove(0)
                }
            },
        };

        if target_room.status != RoomStatus::Available {
            return Err(EngineError::Validation(format!(
                "room {} is not available (status: {})",
                target_room.number, target_room.status
            )));
        }

        reservation::assign_room(&mut tx, res.id, target_room.id).await?;
        fsm::set_operational_status(&mut tx, res.id, OperationalStatus::CheckIn, actor).await?;
        fsm::set_room_status(&mut tx, target_room.id, RoomStatus::Occupied, actor).await?;
        tx.commit().await?;

        let updated = self.load(res.id).await?;
        self.events.dispatch(LifecycleEvent::for_reservation(
            names::RESERVATION_CHECK_IN,
            &updated,
            actor,
        ));
        Ok(updated)
    }

    /// Check a guest out (check_in → check_out). The room is left for
    /// the external housekeeping workflow, which moves it to dirty via
    /// its own transition.
    pub async fn check_out(&self, reservation_id: i64, actor: &Actor) -> EngineResult<Reservation> {
        let mut tx = self.pool.begin().await?;
        fsm::set_operational_status(&mut tx, reservation_id, OperationalStatus::CheckOut, actor)
            .await?;
        tx.commit().await?;

        let updated = self.load(reservation_id).await?;
        self.events.dispatch(LifecycleEvent::for_reservation(
            names::RESERVATION_CHECK_OUT,
            &updated,
            actor,
        ));
        Ok(updated)
    }

    /// Cancel a reservation. Inventory is freed implicitly: a cancelled
    /// reservation no longer counts against availability.
    pub async fn cancel(&self, reservation_id: i64, actor: &Actor) -> EngineResult<Reservation> {
        let mut tx = self.pool.begin().await?;
        fsm::set_operational_status(&mut tx, reservation_id, OperationalStatus::Cancelled, actor)
            .await?;
        tx.commit().await?;

        let updated = self.load(reservation_id).await?;
        self.events.dispatch(LifecycleEvent::for_reservation(
            names::RESERVATION_CANCELLED,
            &updated,
            actor,
        ));
        Ok(updated)
    }

    /// Mark a confirmed reservation as a no-show.
    pub async fn no_show(&self, reservation_id: i64, actor: &Actor) -> EngineResult<Reservation> {
        let mut tx = self.pool.begin().await?;
        fsm::set_operational_status(&mut tx, reservation_id, OperationalStatus::NoShow, actor)
            .await?;
        tx.commit().await?;

        let updated = self.load(reservation_id).await?;
        self.events.dispatch(LifecycleEvent::for_reservation(
            names::RESERVATION_NO_SHOW,
            &updated,
            actor,
        ));
        Ok(updated)
    }

    /// Rooms a receptionist may pick for manual check-in: eligible for
    /// the type, currently available, not taken by another overlapping
    /// assigned reservation. Rooms matching the requested bed
    /// configuration come first; both partitions are ordered by number.
    pub async fn list_available_rooms(&self, reservation_id: i64) -> EngineResult<Vec<Room>> {
        let res = self.load(reservation_id).await?;
        let mut conn = self.pool.acquire().await?;
        available_rooms_for(&mut conn, &res).await
    }

    /// Hard delete. Only reservations that never committed inventory
    /// (incomplete) or already released it (cancelled) may be destroyed;
    /// everything else is retained for audit.
    pub async fn delete(&self, reservation_id: i64) -> EngineResult<()> {
        let res = self.load(reservation_id).await?;
        if !matches!(
            res.operational_status,
            OperationalStatus::Incomplete | OperationalStatus::Cancelled
        ) {
            return Err(EngineError::Validation(
                "only incomplete or cancelled reservations can be deleted".into(),
            ));
        }
        reservation::delete(&self.pool, res.id).await?;
        Ok(())
    }

    /// Periodic external sweep: cancel pending holds whose payment
    /// deadline has passed. Each hold is cancelled through the state
    /// machine in its own unit of work; one expired hold failing does
    /// not block the rest.
    pub async fn expire_stale_holds(&self, now_millis: i64) -> EngineResult<Vec<Reservation>> {
        let expired = reservation::find_expired_pending(&self.pool, now_millis).await?;
        let mut cancelled = Vec::new();

        for res in expired {
            let actor = Actor::system(res.organization_id);
            let mut tx = self.pool.begin().await?;
            match fsm::set_operational_status(
                &mut tx,
                res.id,
                OperationalStatus::Cancelled,
                &actor,
            )
            .await
            {
                Ok(()) => {
                    tx.commit().await?;
                    let updated = self.load(res.id).await?;
                    self.events.dispatch(LifecycleEvent::for_reservation(
                        names::RESERVATION_EXPIRED,
                        &updated,
                        &actor,
                    ));
                    cancelled.push(updated);
                }
                Err(e) => {
                    // Raced with a concurrent transition; skip this hold.
                    tracing::warn!(reservation_id = res.id, error = %e, "stale hold not cancelled");
                }
            }
        }
        Ok(cancelled)
    }
}

/// Shared room picker for check-in: preferred bed configuration first,
/// then the rest, both lexicographically by room number.
async fn available_rooms_for(
    conn: &mut SqliteConnection,
    res: &Reservation,
) -> EngineResult<Vec<Room>> {
    let eligible = room::find_eligible(&mut *conn, res.property_id, res.room_type_id).await?;
    let taken = reservation::overlapping_assigned_room_ids(
        &mut *conn,
        res.property_id,
        &StayRange::new(res.check_in_date, res.check_out_date),
        res.id,
    )
    .await?;

    let mut rooms: Vec<Room> = eligible
        .into_iter()
        .filter(|r| r.status == RoomStatus::Available && !taken.contains(&r.id))
        .collect();

    if let Some(preferred) = res.requested_bed_configuration_id {
        // `find_eligible` returns number order; stable partition keeps it
        // inside each half.
        let (matching, rest): (Vec<Room>, Vec<Room>) = rooms
            .into_iter()
            .partition(|r| r.active_bed_configuration_id == Some(preferred));
        rooms = matching;
        rooms.extend(rest);
    }
    Ok(rooms)
}
