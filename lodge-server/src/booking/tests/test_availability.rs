use super::*;
use crate::booking::availability::available;
use crate::core::error::EngineError;
use crate::pricing::BaseRatePricing;

#[tokio::test]
async fn empty_property_has_no_availability() {
    let db = test_db().await;
    let prop = seed_property(&db.pool).await;
    let rt = seed_room_type(&db.pool, prop.id, "Double", 2, 100.0).await;

    let mut conn = db.pool.acquire().await.unwrap();
    let free = available(&mut conn, prop.id, rt.id, &july(10, 12)).await.unwrap();
    assert_eq!(free, 0);
}

#[tokio::test]
async fn each_room_adds_one_unit_of_capacity() {
    let db = test_db().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 3, 2).await;

    let mut conn = db.pool.acquire().await.unwrap();
    let free = available(&mut conn, prop.id, rt.id, &july(10, 12)).await.unwrap();
    assert_eq!(free, 3);
}

#[tokio::test]
async fn unassigned_reservation_consumes_capacity() {
    let db = test_db().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 2, 2).await;
    let alloc = allocator(&db.pool);

    // Allocated but no room bound yet: still consumes a unit.
    let created = alloc
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    assert!(created.room_id.is_none());

    let mut conn = db.pool.acquire().await.unwrap();
    let free = available(&mut conn, prop.id, rt.id, &july(10, 12)).await.unwrap();
    assert_eq!(free, 1);
}

#[tokio::test]
async fn overlap_is_half_open() {
    let db = test_db().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 1, 2).await;
    let alloc = allocator(&db.pool);

    alloc
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();

    let mut conn = db.pool.acquire().await.unwrap();
    // Identical range conflicts.
    assert_eq!(available(&mut conn, prop.id, rt.id, &july(10, 12)).await.unwrap(), 0);
    // One shared night conflicts.
    assert_eq!(available(&mut conn, prop.id, rt.id, &july(11, 13)).await.unwrap(), 0);
    // Back-to-back (checkout == checkin) does not.
    assert_eq!(available(&mut conn, prop.id, rt.id, &july(12, 14)).await.unwrap(), 1);
    // Ending exactly at the existing check-in does not.
    assert_eq!(available(&mut conn, prop.id, rt.id, &july(8, 10)).await.unwrap(), 1);
}

#[tokio::test]
async fn cancelled_reservation_releases_capacity() {
    let db = test_db().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 1, 2).await;
    let alloc = allocator(&db.pool);
    let state = crate::ServerState::with_pool(crate::Config::from_env(), db.pool.clone());
    let lifecycle = state.lifecycle();

    let created = alloc
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();

    let mut conn = db.pool.acquire().await.unwrap();
    assert_eq!(available(&mut conn, prop.id, rt.id, &july(10, 12)).await.unwrap(), 0);
    drop(conn);

    lifecycle.cancel(created.id, &actor()).await.unwrap();

    let mut conn = db.pool.acquire().await.unwrap();
    assert_eq!(available(&mut conn, prop.id, rt.id, &july(10, 12)).await.unwrap(), 1);
}

#[tokio::test]
async fn multi_type_room_counts_against_every_type_it_serves() {
    let db = test_db().await;
    let prop = seed_property(&db.pool).await;
    let double = seed_room_type(&db.pool, prop.id, "Double", 2, 100.0).await;
    let twin = seed_room_type(&db.pool, prop.id, "Twin", 2, 90.0).await;
    // One flexible room serving both types.
    seed_room(&db.pool, prop.id, "101", &[double.id, twin.id]).await;

    let alloc = allocator(&db.pool);
    let created = alloc
        .create(&booking_request(prop.id, double.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();

    // Bind the room so the hold is room-specific.
    let state = crate::ServerState::with_pool(crate::Config::from_env(), db.pool.clone());
    let lifecycle = state.lifecycle();
    lifecycle.confirm(created.id, &actor()).await.unwrap();
    lifecycle.check_in(created.id, None, &actor()).await.unwrap();

    // The physical room is taken, so the twin view of it is gone too.
    let mut conn = db.pool.acquire().await.unwrap();
    assert_eq!(available(&mut conn, prop.id, twin.id, &july(10, 12)).await.unwrap(), 0);
}

#[tokio::test]
async fn group_options_reflect_live_inventory() {
    let db = test_db().await;
    let prop = seed_property(&db.pool).await;
    let double = seed_room_type(&db.pool, prop.id, "Double", 2, 100.0).await;
    let twin = seed_room_type(&db.pool, prop.id, "Twin", 2, 80.0).await;
    seed_room(&db.pool, prop.id, "101", &[double.id]).await;
    seed_room(&db.pool, prop.id, "102", &[twin.id]).await;

    let combos = crate::booking::groups::search_group_options(
        &db.pool,
        prop.id,
        &july(10, 12),
        4,
        0,
        &BaseRatePricing,
        5,
    )
    .await
    .unwrap();
    // Only one of each room: the single viable split is Double + Twin.
    assert_eq!(combos.len(), 1);
    assert_eq!(combos[0].total, 360.0);

    // Book the twin away and the split disappears.
    allocator(&db.pool)
        .create(&booking_request(prop.id, twin.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    let combos = crate::booking::groups::search_group_options(
        &db.pool,
        prop.id,
        &july(10, 12),
        4,
        0,
        &BaseRatePricing,
        5,
    )
    .await
    .unwrap();
    assert!(combos.is_empty());
}

#[tokio::test]
async fn check_availability_rejects_inverted_range() {
    let db = test_db().await;
    let (prop, _, _) = seed_small_property(&db.pool, 1, 2).await;

    let range = shared::StayRange::new(date(12), date(10));
    let err = crate::booking::availability::check_availability(
        &db.pool,
        prop.id,
        &range,
        2,
        0,
        &BaseRatePricing,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn check_availability_prices_and_filters_types() {
    let db = test_db().await;
    let prop = seed_property(&db.pool).await;
    let double = seed_room_type(&db.pool, prop.id, "Double", 2, 100.0).await;
    let single = seed_room_type(&db.pool, prop.id, "Single", 1, 60.0).await;
    seed_room(&db.pool, prop.id, "101", &[double.id]).await;
    seed_room(&db.pool, prop.id, "102", &[single.id]).await;

    let results = crate::booking::availability::check_availability(
        &db.pool,
        prop.id,
        &july(10, 12),
        2,
        0,
        &BaseRatePricing,
    )
    .await
    .unwrap();

    // Singles cannot seat two adults; only the double qualifies.
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].room_type.id, double.id);
    assert_eq!(results[0].available_rooms, 1);
    assert_eq!(results[0].nightly_prices.len(), 2);
    assert_eq!(results[0].total, 200.0);
}
