//! Shared test fixtures: temporary database, seeded inventory, actors.

use chrono::NaiveDate;
use shared::models::{
    OriginType, Property, PropertyCreate, ReservationCreate, Room, RoomCreate, RoomType,
    RoomTypeCreate,
};
use shared::{Actor, StayRange};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::db::DbService;
use crate::db::repository::{property, room, room_type};

pub const ORG: i64 = 1;

/// A migrated SQLite database in a temp directory. Keep the struct
/// alive for the duration of the test; dropping it deletes the files.
pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

pub async fn test_db() -> TestDb {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("test.db");
    let db = DbService::new(&path.to_string_lossy())
        .await
        .expect("open test database");
    TestDb {
        pool: db.pool,
        _dir: dir,
    }
}

pub fn actor() -> Actor {
    Actor::user(ORG, 77, "Test Receptionist")
}

pub fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2027, 7, day).unwrap()
}

pub fn july(from: u32, to: u32) -> StayRange {
    StayRange::new(date(from), date(to))
}

pub async fn seed_property(pool: &SqlitePool) -> Property {
    property::create(
        pool,
        PropertyCreate {
            organization_id: ORG,
            name: "Arena Blanca".into(),
            slug: "arena-blanca".into(),
            currency: None,
        },
    )
    .await
    .expect("seed property")
}

pub async fn seed_room_type(
    pool: &SqlitePool,
    property_id: i64,
    name: &str,
    max_adults: i32,
    base_price: f64,
) -> RoomType {
    room_type::create(
        pool,
        RoomTypeCreate {
            property_id,
            name: name.into(),
            slug: name.to_lowercase().replace(' ', "-"),
            description: None,
            max_adults,
            max_children: 2,
            base_price,
            extra_adult_fee: 0.0,
            extra_child_fee: 0.0,
        },
    )
    .await
    .expect("seed room type")
}

pub async fn seed_room(
    pool: &SqlitePool,
    property_id: i64,
    number: &str,
    room_type_ids: &[i64],
) -> Room {
    room::create(
        pool,
        RoomCreate {
            property_id,
            number: number.into(),
            floor: Some("1".into()),
            room_type_ids: room_type_ids.to_vec(),
            active_bed_configuration_id: None,
        },
    )
    .await
    .expect("seed room")
}

pub fn booking_request(
    property_id: i64,
    room_type_id: i64,
    range: StayRange,
    adults: i32,
) -> ReservationCreate {
    ReservationCreate {
        property_id,
        room_type_id,
        check_in_date: range.check_in,
        check_out_date: range.check_out,
        adults,
        children: 0,
        origin_type: OriginType::WalkIn,
        requested_bed_configuration_id: None,
        special_requests: None,
        promotion_code: None,
        payment_deadline: None,
    }
}

/// Property with one room type and N rooms, the common scenario base.
pub async fn seed_small_property(
    pool: &SqlitePool,
    rooms: usize,
    max_adults: i32,
) -> (Property, RoomType, Vec<Room>) {
    let prop = seed_property(pool).await;
    let rt = seed_room_type(pool, prop.id, "Double", max_adults, 100.0).await;
    let mut seeded = Vec::new();
    for i in 0..rooms {
        seeded.push(seed_room(pool, prop.id, &format!("10{i}"), &[rt.id]).await);
    }
    (prop, rt, seeded)
}
