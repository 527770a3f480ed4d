//! Room Type Repository

use shared::models::{BedConfiguration, BedConfigurationCreate, RoomType, RoomTypeCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteExecutor, SqlitePool};

use super::{RepoError, RepoResult};

const COLUMNS: &str = "id, property_id, name, slug, description, max_adults, max_children, \
     base_price, extra_adult_fee, extra_child_fee, is_active, created_at, updated_at";

pub async fn find_by_id(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<RoomType>> {
    let sql = format!("SELECT {COLUMNS} FROM room_type WHERE id = ?");
    let room_type = sqlx::query_as::<_, RoomType>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(room_type)
}

/// Active room types of a property, ordered by name.
pub async fn find_active_for_property(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
) -> RepoResult<Vec<RoomType>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM room_type WHERE property_id = ? AND is_active = 1 ORDER BY name"
    );
    let room_types = sqlx::query_as::<_, RoomType>(&sql)
        .bind(property_id)
        .fetch_all(exec)
        .await?;
    Ok(room_types)
}

/// Active room types of a property that can seat `adults` in one room.
pub async fn find_with_min_capacity(
    exec: impl SqliteExecutor<'_>,
    property_id: i64,
    adults: i32,
) -> RepoResult<Vec<RoomType>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM room_type \
         WHERE property_id = ? AND is_active = 1 AND max_adults >= ? ORDER BY name"
    );
    let room_types = sqlx::query_as::<_, RoomType>(&sql)
        .bind(property_id)
        .bind(adults)
        .fetch_all(exec)
        .await?;
    Ok(room_types)
}

pub async fn create(pool: &SqlitePool, data: RoomTypeCreate) -> RepoResult<RoomType> {
    if data.max_adults < 1 {
        return Err(RepoError::Validation(
            "max_adults must be at least 1".into(),
        ));
    }
    if data.base_price < 0.0 || !data.base_price.is_finite() {
        return Err(RepoError::Validation(
            "base_price must be a non-negative finite number".into(),
        ));
    }

    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM room_type WHERE property_id = ? AND slug = ?")
            .bind(data.property_id)
            .bind(&data.slug)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Room type '{}' already exists in this property",
            data.slug
        )));
    }

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO room_type (id, property_id, name, slug, description, max_adults, max_children, \
         base_price, extra_adult_fee, extra_child_fee, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(data.property_id)
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.description)
    .bind(data.max_adults)
    .bind(data.max_children)
    .bind(data.base_price)
    .bind(data.extra_adult_fee)
    .bind(data.extra_child_fee)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create room type".into()))
}

pub async fn create_bed_configuration(
    pool: &SqlitePool,
    data: BedConfigurationCreate,
) -> RepoResult<BedConfiguration> {
    let id = snowflake_id();
    sqlx::query("INSERT INTO bed_configuration (id, room_type_id, name) VALUES (?, ?, ?)")
        .bind(id)
        .bind(data.room_type_id)
        .bind(&data.name)
        .execute(pool)
        .await?;

    let config = sqlx::query_as::<_, BedConfiguration>(
        "SELECT id, room_type_id, name FROM bed_configuration WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    config.ok_or_else(|| RepoError::Database("Failed to create bed configuration".into()))
}

pub async fn find_bed_configurations(
    exec: impl SqliteExecutor<'_>,
    room_type_id: i64,
) -> RepoResult<Vec<BedConfiguration>> {
    let configs = sqlx::query_as::<_, BedConfiguration>(
        "SELECT id, room_type_id, name FROM bed_configuration WHERE room_type_id = ? ORDER BY name",
    )
    .bind(room_type_id)
    .fetch_all(exec)
    .await?;
    Ok(configs)
}
