//! Lifecycle orchestration tests: coupled transitions, room picking,
//! deletion rules, the stale-hold sweep and the financial axis.

use std::sync::Arc;

use shared::models::{
    BedConfigurationCreate, FinancialStatus, OperationalStatus, PaymentCreate, PaymentMethod,
    PaymentStatus, RoomStatus,
};
use shared::util::now_millis;

use crate::booking::allocator::Allocator;
use crate::booking::locks::RangeLockManager;
use crate::core::error::EngineError;
use crate::db::repository::{reservation, room, room_type, transition_log};
use crate::pricing::BaseRatePricing;
use crate::testutil::*;
use crate::{Config, ServerState};

async fn setup() -> (TestDb, ServerState) {
    let db = test_db().await;
    let state = ServerState::with_pool(Config::from_env(), db.pool.clone());
    (db, state)
}

fn allocator(state: &ServerState) -> Allocator {
    Allocator::new(state.pool.clone(), Arc::new(RangeLockManager::new()))
}

#[tokio::test]
async fn full_stay_flow_couples_reservation_and_room() {
    let (db, state) = setup().await;
    let (prop, rt, rooms) = seed_small_property(&db.pool, 1, 2).await;
    let lifecycle = state.lifecycle();
    let mut events = state.events.subscribe();

    let created = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();

    let confirmed = lifecycle.confirm(created.id, &actor()).await.unwrap();
    assert_eq!(confirmed.operational_status, OperationalStatus::Confirmed);

    let checked_in = lifecycle.check_in(created.id, None, &actor()).await.unwrap();
    assert_eq!(checked_in.operational_status, OperationalStatus::CheckIn);
    assert_eq!(checked_in.room_id, Some(rooms[0].id));
    let occupied = room::find_by_id(&db.pool, rooms[0].id).await.unwrap().unwrap();
    assert_eq!(occupied.status, RoomStatus::Occupied);

    let checked_out = lifecycle.check_out(created.id, &actor()).await.unwrap();
    assert_eq!(checked_out.operational_status, OperationalStatus::CheckOut);
    // The room is housekeeping's problem now, not the orchestrator's.
    let after = room::find_by_id(&db.pool, rooms[0].id).await.unwrap().unwrap();
    assert_eq!(after.status, RoomStatus::Occupied);

    // One named event per successful operation, in order.
    let mut names = Vec::new();
    while let Ok(event) = events.try_recv() {
        names.push(event.name);
    }
    assert_eq!(
        names,
        vec![
            "reservation.confirmed",
            "reservation.check_in",
            "reservation.check_out"
        ]
    );
}

#[tokio::test]
async fn check_in_before_confirmation_rolls_back_room_binding() {
    let (db, state) = setup().await;
    let (prop, rt, rooms) = seed_small_property(&db.pool, 1, 2).await;
    let lifecycle = state.lifecycle();

    let created = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();

    // incomplete → check_in is not in the table; the whole unit of work
    // (including the room binding that already happened) must roll back.
    let err = lifecycle.check_in(created.id, None, &actor()).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTransition { .. }));

    let after = reservation::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
    assert_eq!(after.operational_status, OperationalStatus::Incomplete);
    assert!(after.room_id.is_none());
    let room_after = room::find_by_id(&db.pool, rooms[0].id).await.unwrap().unwrap();
    assert_eq!(room_after.status, RoomStatus::Available);
}

#[tokio::test]
async fn explicit_check_in_room_must_belong_to_the_property() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 1, 2).await;
    let other_prop = crate::db::repository::property::create(
        &db.pool,
        shared::models::PropertyCreate {
            organization_id: ORG,
            name: "Other".into(),
            slug: "other".into(),
            currency: None,
        },
    )
    .await
    .unwrap();
    let other_rt = seed_room_type(&db.pool, other_prop.id, "Double", 2, 80.0).await;
    let foreign_room = seed_room(&db.pool, other_prop.id, "901", &[other_rt.id]).await;

    let lifecycle = state.lifecycle();
    let created = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    lifecycle.confirm(created.id, &actor()).await.unwrap();

    let err = lifecycle
        .check_in(created.id, Some(foreign_room.id), &actor())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn room_picker_prefers_requested_bed_configuration() {
    let (db, state) = setup().await;
    let prop = seed_property(&db.pool).await;
    let rt = seed_room_type(&db.pool, prop.id, "Double", 2, 100.0).await;
    let king = room_type::create_bed_configuration(
        &db.pool,
        BedConfigurationCreate { room_type_id: rt.id, name: "1 King".into() },
    )
    .await
    .unwrap();

    // 101 and 103 are twins, 102 and 104 are kings.
    for (number, config) in [("101", None), ("102", Some(king.id)), ("103", None), ("104", Some(king.id))] {
        crate::db::repository::room::create(
            &db.pool,
            shared::models::RoomCreate {
                property_id: prop.id,
                number: number.into(),
                floor: None,
                room_type_ids: vec![rt.id],
                active_bed_configuration_id: config,
            },
        )
        .await
        .unwrap();
    }

    let mut request = booking_request(prop.id, rt.id, july(10, 12), 2);
    request.requested_bed_configuration_id = Some(king.id);
    let created = allocator(&state)
        .create(&request, &actor(), &BaseRatePricing)
        .await
        .unwrap();

    let rooms = state.lifecycle().list_available_rooms(created.id).await.unwrap();
    let numbers: Vec<&str> = rooms.iter().map(|r| r.number.as_str()).collect();
    // Kings first, then the rest, both halves by room number.
    assert_eq!(numbers, vec!["102", "104", "101", "103"]);
}

#[tokio::test]
async fn cancelling_twice_is_rejected_and_leaves_audit_untouched() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 1, 2).await;
    let lifecycle = state.lifecycle();

    let created = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();

    lifecycle.cancel(created.id, &actor()).await.unwrap();
    let rows_after_first =
        transition_log::count_for_entity(&db.pool, "reservation", created.id).await.unwrap();

    let err = lifecycle.cancel(created.id, &actor()).await.unwrap_err();
    match &err {
        EngineError::InvalidTransition { current, allowed, .. } => {
            assert_eq!(current, "cancelled");
            assert!(allowed.is_empty());
        }
        other => panic!("expected InvalidTransition, got {other}"),
    }

    let rows_after_second =
        transition_log::count_for_entity(&db.pool, "reservation", created.id).await.unwrap();
    assert_eq!(rows_after_first, rows_after_second);
    let after = reservation::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
    assert_eq!(after.operational_status, OperationalStatus::Cancelled);
}

#[tokio::test]
async fn no_show_requires_a_confirmed_reservation() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 2, 2).await;
    let lifecycle = state.lifecycle();

    let unconfirmed = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    assert!(matches!(
        lifecycle.no_show(unconfirmed.id, &actor()).await.unwrap_err(),
        EngineError::InvalidTransition { .. }
    ));

    let confirmed = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(20, 22), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    lifecycle.confirm(confirmed.id, &actor()).await.unwrap();
    let after = lifecycle.no_show(confirmed.id, &actor()).await.unwrap();
    assert_eq!(after.operational_status, OperationalStatus::NoShow);
}

#[tokio::test]
async fn only_incomplete_or_cancelled_reservations_can_be_deleted() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 2, 2).await;
    let lifecycle = state.lifecycle();

    let keep = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    lifecycle.confirm(keep.id, &actor()).await.unwrap();
    assert!(matches!(
        lifecycle.delete(keep.id).await.unwrap_err(),
        EngineError::Validation(_)
    ));

    let discard = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(20, 22), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    lifecycle.delete(discard.id).await.unwrap();
    assert!(reservation::find_by_id(&db.pool, discard.id).await.unwrap().is_none());
}

#[tokio::test]
async fn sweep_cancels_only_overdue_pending_holds() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 3, 2).await;
    let lifecycle = state.lifecycle();
    let now = now_millis();

    let mut overdue = booking_request(prop.id, rt.id, july(10, 12), 2);
    overdue.payment_deadline = Some(now - 60_000);
    let overdue = allocator(&state)
        .create(&overdue, &actor(), &BaseRatePricing)
        .await
        .unwrap();
    lifecycle.submit_hold(overdue.id, &actor()).await.unwrap();

    let mut fresh = booking_request(prop.id, rt.id, july(20, 22), 2);
    fresh.payment_deadline = Some(now + 3_600_000);
    let fresh = allocator(&state)
        .create(&fresh, &actor(), &BaseRatePricing)
        .await
        .unwrap();
    lifecycle.submit_hold(fresh.id, &actor()).await.unwrap();

    // Confirmed reservations are never swept, deadline or not.
    let mut confirmed = booking_request(prop.id, rt.id, july(25, 27), 2);
    confirmed.payment_deadline = Some(now - 60_000);
    let confirmed = allocator(&state)
        .create(&confirmed, &actor(), &BaseRatePricing)
        .await
        .unwrap();
    lifecycle.confirm(confirmed.id, &actor()).await.unwrap();

    let cancelled = lifecycle.expire_stale_holds(now).await.unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0].id, overdue.id);
    assert_eq!(cancelled[0].operational_status, OperationalStatus::Cancelled);

    let fresh_after = reservation::find_by_id(&db.pool, fresh.id).await.unwrap().unwrap();
    assert_eq!(fresh_after.operational_status, OperationalStatus::Pending);
    let confirmed_after =
        reservation::find_by_id(&db.pool, confirmed.id).await.unwrap().unwrap();
    assert_eq!(confirmed_after.operational_status, OperationalStatus::Confirmed);
}

// ========================================================================
// Financial axis
// ========================================================================

fn cash(amount: f64) -> PaymentCreate {
    PaymentCreate {
        amount,
        method: PaymentMethod::Cash,
        status: PaymentStatus::Completed,
        reference: None,
        notes: None,
    }
}

#[tokio::test]
async fn payments_walk_pending_partial_paid() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 1, 2).await;
    let lifecycle = state.lifecycle();

    // Two nights at 100: total 200.
    let created = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();

    lifecycle.record_payment(created.id, &cash(80.0), &actor()).await.unwrap();
    let partial = reservation::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
    assert_eq!(partial.financial_status, FinancialStatus::Partial);

    lifecycle.record_payment(created.id, &cash(120.0), &actor()).await.unwrap();
    let paid = reservation::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
    assert_eq!(paid.financial_status, FinancialStatus::Paid);
}

#[tokio::test]
async fn refund_from_paid_steps_down_to_partial_refund() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 1, 2).await;
    let lifecycle = state.lifecycle();

    let created = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    let payment = lifecycle.record_payment(created.id, &cash(200.0), &actor()).await.unwrap();

    let after = lifecycle
        .refund_payment(created.id, payment.id, 50.0, None, &actor())
        .await
        .unwrap();
    assert_eq!(after.financial_status, FinancialStatus::PartialRefund);
}

#[tokio::test]
async fn refunding_everything_from_partial_reaches_refunded() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 1, 2).await;
    let lifecycle = state.lifecycle();

    let created = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    let payment = lifecycle.record_payment(created.id, &cash(100.0), &actor()).await.unwrap();

    // Net drops back to zero after money actually moved → refunded,
    // the explicit rule, not a force-write around the table.
    let after = lifecycle
        .refund_payment(created.id, payment.id, 100.0, None, &actor())
        .await
        .unwrap();
    assert_eq!(after.financial_status, FinancialStatus::Refunded);
}

#[tokio::test]
async fn refund_cannot_exceed_original_or_run_twice() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 1, 2).await;
    let lifecycle = state.lifecycle();

    let created = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();
    let payment = lifecycle.record_payment(created.id, &cash(100.0), &actor()).await.unwrap();

    assert!(matches!(
        lifecycle
            .refund_payment(created.id, payment.id, 150.0, None, &actor())
            .await
            .unwrap_err(),
        EngineError::Validation(_)
    ));

    lifecycle
        .refund_payment(created.id, payment.id, 60.0, None, &actor())
        .await
        .unwrap();
    // The payment is now refunded; a second pass is rejected.
    assert!(matches!(
        lifecycle
            .refund_payment(created.id, payment.id, 10.0, None, &actor())
            .await
            .unwrap_err(),
        EngineError::Validation(_)
    ));
}

#[tokio::test]
async fn pending_payment_confirmation_completes_the_ledger() {
    let (db, state) = setup().await;
    let (prop, rt, _) = seed_small_property(&db.pool, 1, 2).await;
    let lifecycle = state.lifecycle();

    let created = allocator(&state)
        .create(&booking_request(prop.id, rt.id, july(10, 12), 2), &actor(), &BaseRatePricing)
        .await
        .unwrap();

    let pending = lifecycle
        .record_payment(
            created.id,
            &PaymentCreate {
                amount: 200.0,
                method: PaymentMethod::Transfer,
                status: PaymentStatus::Pending,
                reference: Some("OP-123".into()),
                notes: None,
            },
            &actor(),
        )
        .await
        .unwrap();

    // Pending money does not move the financial axis.
    let before = reservation::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
    assert_eq!(before.financial_status, FinancialStatus::PendingPayment);

    let confirmed = lifecycle
        .confirm_payment(created.id, pending.id, 200.0, Some("verified"), &actor())
        .await
        .unwrap();
    assert_eq!(confirmed.status, PaymentStatus::Completed);

    let after = reservation::find_by_id(&db.pool, created.id).await.unwrap().unwrap();
    assert_eq!(after.financial_status, FinancialStatus::Paid);
}
