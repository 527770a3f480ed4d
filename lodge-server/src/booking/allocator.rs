//! Reservation Allocator
//!
//! Concurrency-safe creation of reservations. The correctness mechanism
//! is lock-then-recheck: take the property's date-range lock, re-run the
//! inventory query inside the same transaction that will insert the row,
//! and only then write. Two racing requests for the last room both see
//! the lock; the loser observes the winner's insert and fails with a
//! clean conflict.

use std::sync::Arc;

use shared::models::{OriginType, Reservation, ReservationCreate};
use shared::util::confirmation_code;
use shared::{Actor, StayRange};
use sqlx::SqlitePool;

use crate::booking::availability;
use crate::booking::locks::RangeLockManager;
use crate::core::error::{EngineError, EngineResult};
use crate::db::repository::reservation::NewReservation;
use crate::db::repository::{property, reservation, room_type};
use crate::pricing::{self, PricingProvider};
use crate::utils::validation::{
    MAX_NOTE_LEN, validate_optional_text, validate_party, validate_stay_range,
};

/// One line of a group booking: `quantity` rooms of a type, each seating
/// the given share of the party.
#[derive(Debug, Clone)]
pub struct GroupLine {
    pub room_type_id: i64,
    pub quantity: i32,
    pub adults_per_room: i32,
    pub children_per_room: i32,
}

/// Reservation write path
#[derive(Clone)]
pub struct Allocator {
    pool: SqlitePool,
    locks: Arc<RangeLockManager>,
}

impl Allocator {
    pub fn new(pool: SqlitePool, locks: Arc<RangeLockManager>) -> Self {
        Self { pool, locks }
    }

    /// Create a single reservation, or fail with `Conflict` when the
    /// type has no capacity left for the window.
    ///
    /// The reservation starts unassigned (no room bound) in
    /// `incomplete` / `pending_payment`; lifecycle operations move it on
    /// from there.
    pub async fn create(
        &self,
        data: &ReservationCreate,
        actor: &Actor,
        pricing: &dyn PricingProvider,
    ) -> EngineResult<Reservation> {
        let range = StayRange::new(data.check_in_date, data.check_out_date);

        // Everything that can be rejected without looking at contended
        // state is rejected before the lock.
        validate_stay_range(&range)?;
        validate_optional_text(&data.special_requests, "special_requests", MAX_NOTE_LEN)?;
        let prop = property::find_by_id(&self.pool, data.property_id)
            .await?
            .ok_or_else(|| {
                EngineError::NotFound(format!("Property {} not found", data.property_id))
            })?;
        let rt = room_type::find_by_id(&self.pool, data.room_type_id)
            .await?
            .ok_or_else(|| {
                EngineError::NotFound(format!("Room type {} not found", data.room_type_id))
            })?;
        if rt.property_id != prop.id || !rt.is_active {
            return Err(EngineError::Validation(
                "room type does not belong to this property or is inactive".into(),
            ));
        }
        validate_party(&rt, data.adults, data.children)?;

        // Lock the contended window, then recheck under the lock.
        let _guard = self.locks.acquire(prop.id, range).await;
        let mut tx = self.pool.begin().await?;

        let free = availability::available(&mut tx, prop.id, rt.id, &range).await?;
        if free <= 0 {
            // Transaction and guard drop here; nothing was written.
            return Err(EngineError::Conflict(
                "No availability for the selected dates".into(),
            ));
        }

        let nightly = pricing.nightly_prices(
            &rt,
            &range,
            data.adults,
            data.children,
            data.promotion_code.as_deref(),
        );
        let total = pricing::total(&nightly);

        let created = reservation::insert(
            &mut tx,
            &NewReservation {
                organization_id: actor.organization_id,
                property_id: prop.id,
                room_type_id: rt.id,
                requested_bed_configuration_id: data.requested_bed_configuration_id,
                range,
                adults: data.adults,
                children: data.children,
                total_amount: total,
                currency: &prop.currency,
                origin_type: data.origin_type,
                group_code: None,
                special_requests: data.special_requests.as_deref(),
                payment_deadline: data.payment_deadline,
                created_by: actor.user_id,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(
            reservation_id = created.id,
            code = %created.confirmation_code,
            property_id = prop.id,
            room_type_id = rt.id,
            %range,
            "reservation created"
        );
        Ok(created)
    }

    /// Create the sibling reservations of a group booking in one unit of
    /// work. Every line's availability is rechecked under the lock; any
    /// shortfall rolls the whole batch back.
    pub async fn create_group(
        &self,
        property_id: i64,
        range: StayRange,
        lines: &[GroupLine],
        origin_type: OriginType,
        actor: &Actor,
        pricing: &dyn PricingProvider,
    ) -> EngineResult<Vec<Reservation>> {
        validate_stay_range(&range)?;
        if lines.is_empty() {
            return Err(EngineError::Validation("group booking has no rooms".into()));
        }
        let total_rooms: i32 = lines.iter().map(|l| l.quantity).sum();
        if total_rooms < 2 {
            return Err(EngineError::Validation(
                "group bookings span at least two rooms; use the single-room path".into(),
            ));
        }

        let prop = property::find_by_id(&self.pool, property_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Property {property_id} not found")))?;

        let mut types = Vec::with_capacity(lines.len());
        for line in lines {
            if line.quantity < 1 {
                return Err(EngineError::Validation(
                    "group line quantity must be at least 1".into(),
                ));
            }
            let rt = room_type::find_by_id(&self.pool, line.room_type_id)
                .await?
                .ok_or_else(|| {
                    EngineError::NotFound(format!("Room type {} not found", line.room_type_id))
                })?;
            if rt.property_id != prop.id || !rt.is_active {
                return Err(EngineError::Validation(
                    "room type does not belong to this property or is inactive".into(),
                ));
            }
            validate_party(&rt, line.adults_per_room, line.children_per_room)?;
            types.push(rt);
        }

        let group_code = confirmation_code();
        let _guard = self.locks.acquire(prop.id, range).await;
        let mut tx = self.pool.begin().await?;

        for (line, rt) in lines.iter().zip(&types) {
            let free = availability::available(&mut tx, prop.id, rt.id, &range).await?;
            if free < line.quantity as i64 {
                return Err(EngineError::Conflict(format!(
                    "Room type '{}' has {} rooms free, {} requested",
                    rt.name, free, line.quantity
                )));
            }
        }

        let mut created = Vec::with_capacity(total_rooms as usize);
        for (line, rt) in lines.iter().zip(&types) {
            let nightly = pricing.nightly_prices(
                rt,
                &range,
                line.adults_per_room,
                line.children_per_room,
                None,
            );
            let total = pricing::total(&nightly);
            for _ in 0..line.quantity {
                let row = reservation::insert(
                    &mut tx,
                    &NewReservation {
                        organization_id: actor.organization_id,
                        property_id: prop.id,
                        room_type_id: rt.id,
                        requested_bed_configuration_id: None,
                        range,
                        adults: line.adults_per_room,
                        children: line.children_per_room,
                        total_amount: total,
                        currency: &prop.currency,
                        origin_type,
                        group_code: Some(&group_code),
                        special_requests: None,
                        payment_deadline: None,
                        created_by: actor.user_id,
                    },
                )
                .await?;
                created.push(row);
            }
        }
        tx.commit().await?;

        tracing::info!(
            group_code = %group_code,
            property_id = prop.id,
            rooms = total_rooms,
            %range,
            "group reservations created"
        );
        Ok(created)
    }
}
