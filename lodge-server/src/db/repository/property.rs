//! Property Repository

use shared::models::{Property, PropertyCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteExecutor, SqlitePool};

use super::{RepoError, RepoResult};

const COLUMNS: &str =
    "id, organization_id, name, slug, currency, is_active, created_at, updated_at";

pub async fn find_by_id(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Property>> {
    let sql = format!("SELECT {COLUMNS} FROM property WHERE id = ?");
    let property = sqlx::query_as::<_, Property>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(property)
}

pub async fn find_by_slug(
    exec: impl SqliteExecutor<'_>,
    organization_id: i64,
    slug: &str,
) -> RepoResult<Option<Property>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM property WHERE organization_id = ? AND slug = ? AND is_active = 1"
    );
    let property = sqlx::query_as::<_, Property>(&sql)
        .bind(organization_id)
        .bind(slug)
        .fetch_optional(exec)
        .await?;
    Ok(property)
}

pub async fn create(pool: &SqlitePool, data: PropertyCreate) -> RepoResult<Property> {
    if find_by_slug(pool, data.organization_id, &data.slug)
        .await?
        .is_some()
    {
        return Err(RepoError::Duplicate(format!(
            "Property '{}' already exists in this organization",
            data.slug
        )));
    }

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO property (id, organization_id, name, slug, currency, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(data.organization_id)
    .bind(&data.name)
    .bind(&data.slug)
    .bind(data.currency.as_deref().unwrap_or("PEN"))
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create property".into()))
}
