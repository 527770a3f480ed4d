//! Inventory Query
//!
//! Computes, for a property / room type / date range, how many physical
//! rooms are free. Unassigned reservations (room type booked, no room
//! picked yet) are first-class consumers of capacity, because room
//! binding can be deferred until check-in.

use chrono::Utc;
use shared::StayRange;
use shared::models::RoomType;
use sqlx::{SqliteConnection, SqlitePool};

use crate::core::error::EngineResult;
use crate::db::repository::{reservation, room_type};
use crate::pricing::{self, NightlyPrice, PricingProvider};
use crate::utils::validation::validate_future_stay_range;

/// Free capacity for one room type over a range:
/// `max(0, eligible − busy − unassigned)`.
pub async fn available(
    conn: &mut SqliteConnection,
    property_id: i64,
    room_type_id: i64,
    range: &StayRange,
) -> EngineResult<i64> {
    let eligible = reservation::count_eligible_rooms(&mut *conn, property_id, room_type_id).await?;
    let busy = reservation::count_busy_rooms(&mut *conn, property_id, room_type_id, range).await?;
    let unassigned =
        reservation::count_unassigned(&mut *conn, property_id, room_type_id, range).await?;
    Ok((eligible - busy - unassigned).max(0))
}

/// Availability of one room type, priced for the requested party
#[derive(Debug, Clone)]
pub struct TypeAvailability {
    pub room_type: RoomType,
    pub available_rooms: i64,
    pub nightly_prices: Vec<NightlyPrice>,
    pub total: f64,
}

/// Multi-type availability: every active type of the property that can
/// seat the party in one room and still has free capacity. Feeds both
/// the public availability response and the group combination search.
pub async fn check_availability(
    pool: &SqlitePool,
    property_id: i64,
    range: &StayRange,
    adults: i32,
    children: i32,
    pricing: &dyn PricingProvider,
) -> EngineResult<Vec<TypeAvailability>> {
    validate_future_stay_range(range, Utc::now().date_naive())?;

    let types = room_type::find_with_min_capacity(pool, property_id, adults).await?;
    let mut conn = pool.acquire().await?;

    let mut results = Vec::new();
    for rt in types {
        let count = available(&mut conn, property_id, rt.id, range).await?;
        if count > 0 {
            let nightly = pricing.nightly_prices(&rt, range, adults, children, None);
            let total = pricing::total(&nightly);
            results.push(TypeAvailability {
                room_type: rt,
                available_rooms: count,
                nightly_prices: nightly,
                total,
            });
        }
    }
    Ok(results)
}
