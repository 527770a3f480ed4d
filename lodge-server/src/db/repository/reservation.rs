//! Reservation Repository
//!
//! Includes the capacity counting queries used by the inventory query:
//! eligible rooms, rooms held by overlapping assigned reservations, and
//! unassigned overlapping demand. Overlap is always the strict half-open
//! test `existing.check_in < out AND existing.check_out > in`, so
//! back-to-back stays never conflict.

use shared::StayRange;
use shared::models::{
    OperationalStatus, OriginType, Reservation,
};
use shared::util::{confirmation_code, now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqliteExecutor};

use super::{ACTIVE_STATUSES_SQL, RepoError, RepoResult};

const COLUMNS: &str = "id, confirmation_code, organization_id, property_id, room_type_id, \
     room_id, requested_bed_configuration_id, check_in_date, check_out_date, adults, children, \
     total_amount, currency, operational_status, financial_status, origin_type, group_code, \
     special_requests, payment_deadline, created_by, created_at, updated_at";

pub async fn find_by_id(
    exec: impl SqliteExecutor<'_>,
    id: i64,
) -> RepoResult<Option<Reservation>> {
    let sql = format!("SELECT {COLUMNS} FROM reservation WHERE id = ?");
    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(reservation)
}

pub async fn find_by_code(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
    code: &str,
) -> RepoResult<Option<Reservation>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM reservation WHERE property_id = ? AND confirmation_code = ?"
    );
    let reservation = sqlx::query_as::<_, Reservation>(&sql)
        .bind(property_id)
        .bind(code.to_uppercase())
        .fetch_optional(exec)
        .await?;
    Ok(reservation)
}

/// Sibling reservations sharing a group code, ordered by creation.
pub async fn find_by_group_code(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
    group_code: &str,
) -> RepoResult<Vec<Reservation>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM reservation \
         WHERE property_id = ? AND group_code = ? ORDER BY created_at, id"
    );
    let reservations = sqlx::query_as::<_, Reservation>(&sql)
        .bind(property_id)
        .bind(group_code)
        .fetch_all(exec)
        .await?;
    Ok(reservations)
}

/// Count of active rooms of the property that can serve the type.
pub async fn count_eligible_rooms(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
    room_type_id: i64,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM room r \
         JOIN room_room_type rrt ON rrt.room_id = r.id \
         WHERE r.property_id = ? AND rrt.room_type_id = ? AND r.is_active = 1",
    )
    .bind(property_id)
    .bind(room_type_id)
    .fetch_one(exec)
    .await?;
    Ok(count)
}

/// Count of eligible rooms held by an active reservation (for ANY type
/// the room serves) whose dates overlap the range.
pub async fn count_busy_rooms(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
    room_type_id: i64,
    range: &StayRange,
) -> RepoResult<i64> {
    let sql = format!(
        "SELECT COUNT(DISTINCT res.room_id) FROM reservation res \
         JOIN room_room_type rrt ON rrt.room_id = res.room_id \
         WHERE res.property_id = ? AND rrt.room_type_id = ? \
           AND res.room_id IS NOT NULL \
           AND res.operational_status IN ({ACTIVE_STATUSES_SQL}) \
           AND res.check_in_date < ? AND res.check_out_date > ?"
    );
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(property_id)
        .bind(room_type_id)
        .bind(range.check_out)
        .bind(range.check_in)
        .fetch_one(exec)
        .await?;
    Ok(count)
}

/// Count of active reservations of the type with no room bound yet whose
/// dates overlap the range. These consume capacity before a room is picked.
pub async fn count_unassigned(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
    room_type_id: i64,
    range: &StayRange,
) -> RepoResult<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM reservation \
         WHERE property_id = ? AND room_type_id = ? AND room_id IS NULL \
           AND operational_status IN ({ACTIVE_STATUSES_SQL}) \
           AND check_in_date < ? AND check_out_date > ?"
    );
    let count: i64 = sqlx::query_scalar(&sql)
        .bind(property_id)
        .bind(room_type_id)
        .bind(range.check_out)
        .bind(range.check_in)
        .fetch_one(exec)
        .await?;
    Ok(count)
}

/// Room IDs taken by other active, room-assigned reservations overlapping
/// the range. Used to filter the check-in room picker.
pub async fn overlapping_assigned_room_ids(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
    range: &StayRange,
    exclude_reservation_id: i64,
) -> RepoResult<Vec<i64>> {
    let sql = format!(
        "SELECT DISTINCT room_id FROM reservation \
         WHERE property_id = ? AND room_id IS NOT NULL AND id != ? \
           AND operational_status IN ({ACTIVE_STATUSES_SQL}) \
           AND check_in_date < ? AND check_out_date > ?"
    );
    let ids: Vec<i64> = sqlx::query_scalar(&sql)
        .bind(property_id)
        .bind(exclude_reservation_id)
        .bind(range.check_out)
        .bind(range.check_in)
        .fetch_all(exec)
        .await?;
    Ok(ids)
}

/// Everything the allocator needs to insert a reservation row.
pub struct NewReservation<'a> {
    pub organization_id: i64,
    pub property_id: i64,
    pub room_type_id: i64,
    pub requested_bed_configuration_id: Option<i64>,
    pub range: StayRange,
    pub adults: i32,
    pub children: i32,
    pub total_amount: f64,
    pub currency: &'a str,
    pub origin_type: OriginType,
    pub group_code: Option<&'a str>,
    pub special_requests: Option<&'a str>,
    pub payment_deadline: Option<i64>,
    pub created_by: Option<i64>,
}

/// Insert a reservation in `incomplete` / `pending_payment`. Runs on the
/// caller's connection so the insert commits with the availability
/// recheck that justified it.
pub async fn insert(conn: &mut SqliteConnection, data: &NewReservation<'_>) -> RepoResult<Reservation> {
    let id = snowflake_id();
    let now = now_millis();
    // Confirmation codes are random; retry once on the unlikely collision.
    for attempt in 0..2 {
        let code = confirmation_code();
        let result = sqlx::query(
            "INSERT INTO reservation (id, confirmation_code, organization_id, property_id, \
             room_type_id, room_id, requested_bed_configuration_id, check_in_date, check_out_date, \
             adults, children, total_amount, currency, operational_status, financial_status, \
             origin_type, group_code, special_requests, payment_deadline, created_by, created_at, \
             updated_at) \
             VALUES (?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, ?, ?, ?, 'incomplete', 'pending_payment', \
             ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&code)
        .bind(data.organization_id)
        .bind(data.property_id)
        .bind(data.room_type_id)
        .bind(data.requested_bed_configuration_id)
        .bind(data.range.check_in)
        .bind(data.range.check_out)
        .bind(data.adults)
        .bind(data.children)
        .bind(data.total_amount)
        .bind(data.currency)
        .bind(data.origin_type)
        .bind(data.group_code)
        .bind(data.special_requests)
        .bind(data.payment_deadline)
        .bind(data.created_by)
        .bind(now)
        .bind(now)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => break,
            Err(e) if attempt == 0 && e.to_string().contains("UNIQUE") => continue,
            Err(e) => return Err(e.into()),
        }
    }

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create reservation".into()))
}

/// Bind a room to a reservation (deferred room assignment).
pub async fn assign_room(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    room_id: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE reservation SET room_id = ?, updated_at = ? WHERE id = ?")
        .bind(room_id)
        .bind(now_millis())
        .bind(reservation_id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Reservation {reservation_id} not found"
        )));
    }
    Ok(())
}

/// Raw operational status read, used by the state machine.
pub async fn read_operational_status(
    exec: impl SqliteExecutor<'_>,
    reservation_id: i64,
) -> RepoResult<Option<OperationalStatus>> {
    let status: Option<OperationalStatus> =
        sqlx::query_scalar("SELECT operational_status FROM reservation WHERE id = ?")
            .bind(reservation_id)
            .fetch_optional(exec)
            .await?;
    Ok(status)
}

/// Raw financial status read, used by the state machine.
pub async fn read_financial_status(
    exec: impl SqliteExecutor<'_>,
    reservation_id: i64,
) -> RepoResult<Option<shared::models::FinancialStatus>> {
    let status: Option<shared::models::FinancialStatus> =
        sqlx::query_scalar("SELECT financial_status FROM reservation WHERE id = ?")
            .bind(reservation_id)
            .fetch_optional(exec)
            .await?;
    Ok(status)
}

/// Status column write. Only the state machine calls this, inside the
/// same transaction that appends the audit row.
pub async fn write_status_field(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    field: &'static str,
    value: &str,
) -> RepoResult<()> {
    // `field` is one of the two status column names, fixed at compile time.
    let sql = format!("UPDATE reservation SET {field} = ?, updated_at = ? WHERE id = ?");
    let rows = sqlx::query(&sql)
        .bind(value)
        .bind(now_millis())
        .bind(reservation_id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Reservation {reservation_id} not found"
        )));
    }
    Ok(())
}

/// Pending holds whose payment deadline has passed.
pub async fn find_expired_pending(
    exec: impl SqliteExecutor<'_>,
    now: i64,
) -> RepoResult<Vec<Reservation>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM reservation \
         WHERE operational_status = 'pending' AND payment_deadline IS NOT NULL \
           AND payment_deadline < ? ORDER BY payment_deadline"
    );
    let reservations = sqlx::query_as::<_, Reservation>(&sql)
        .bind(now)
        .fetch_all(exec)
        .await?;
    Ok(reservations)
}

/// Hard delete. The caller enforces the lifecycle rule (only incomplete
/// or cancelled reservations may be destroyed).
pub async fn delete(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM reservation WHERE id = ?")
        .bind(id)
        .execute(exec)
        .await?;
    Ok(rows.rows_affected() > 0)
}
