//! Room Repository

use shared::models::{Room, RoomCreate, RoomStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

use super::{RepoError, RepoResult};

const COLUMNS: &str = "id, property_id, number, floor, status, active_bed_configuration_id, \
     is_active, created_at, updated_at";

pub async fn find_by_id(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Room>> {
    let sql = format!("SELECT {COLUMNS} FROM room WHERE id = ?");
    let room = sqlx::query_as::<_, Room>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(room)
}

pub async fn find_by_number(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
    number: &str,
) -> RepoResult<Option<Room>> {
    let sql = format!("SELECT {COLUMNS} FROM room WHERE property_id = ? AND number = ? LIMIT 1");
    let room = sqlx::query_as::<_, Room>(&sql)
        .bind(property_id)
        .bind(number)
        .fetch_optional(exec)
        .await?;
    Ok(room)
}

/// Active rooms of a property that can serve the given type, by number.
pub async fn find_eligible(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
    room_type_id: i64,
) -> RepoResult<Vec<Room>> {
    let sql = "SELECT r.id, r.property_id, r.number, r.floor, r.status, \
         r.active_bed_configuration_id, r.is_active, r.created_at, r.updated_at \
         FROM room r \
         JOIN room_room_type rrt ON rrt.room_id = r.id \
         WHERE r.property_id = ? AND rrt.room_type_id = ? AND r.is_active = 1 \
         ORDER BY r.number";
    let rooms = sqlx::query_as::<_, Room>(sql)
        .bind(property_id)
        .bind(room_type_id)
        .fetch_all(exec)
        .await?;
    Ok(rooms)
}

/// Raw status column read, used by the state machine before a transition.
pub async fn read_status(
    exec: impl SqliteExecutor<'_>,
    room_id: i64,
) -> RepoResult<Option<RoomStatus>> {
    let status: Option<RoomStatus> = sqlx::query_scalar("SELECT status FROM room WHERE id = ?")
        .bind(room_id)
        .fetch_optional(exec)
        .await?;
    Ok(status)
}

/// Status column write. Only the state machine calls this, inside the
/// same transaction that appends the audit row.
pub async fn write_status(
    conn: &mut SqliteConnection,
    room_id: i64,
    status: RoomStatus,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE room SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now_millis())
        .bind(room_id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Room {room_id} not found")));
    }
    Ok(())
}

/// Create a room and link it to its sellable types.
pub async fn create(pool: &SqlitePool, data: RoomCreate) -> RepoResult<Room> {
    if data.room_type_ids.is_empty() {
        return Err(RepoError::Validation(
            "a room must serve at least one room type".into(),
        ));
    }
    if find_by_number(pool, data.property_id, &data.number)
        .await?
        .is_some()
    {
        return Err(RepoError::Duplicate(format!(
            "Room '{}' already exists in this property",
            data.number
        )));
    }

    let id = snowflake_id();
    let now = now_millis();
    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO room (id, property_id, number, floor, status, active_bed_configuration_id, \
         is_active, created_at, updated_at) VALUES (?, ?, ?, ?, 'available', ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(data.property_id)
    .bind(&data.number)
    .bind(&data.floor)
    .bind(data.active_bed_configuration_id)
    .bind(now)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for type_id in &data.room_type_ids {
        sqlx::query("INSERT INTO room_room_type (room_id, room_type_id) VALUES (?, ?)")
            .bind(id)
            .bind(type_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create room".into()))
}

/// Hard delete a room. Refused while any reservation references it.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let referenced: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM reservation WHERE room_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if referenced > 0 {
        return Err(RepoError::Validation(
            "Cannot delete a room that reservations reference".into(),
        ));
    }
    sqlx::query("DELETE FROM room WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(true)
}
