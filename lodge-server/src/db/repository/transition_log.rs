//! State Transition Log Repository
//!
//! Append and query only. The table has no update or delete path.

use shared::Actor;
use shared::models::StateTransitionLog;
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqliteExecutor};

use super::RepoResult;

const COLUMNS: &str = "id, entity_type, entity_id, field, old_value, new_value, changed_by, \
     changed_by_name, organization_id, created_at";

/// Append one audit row. Called by the state machine inside the same
/// transaction as the entity write.
pub async fn append(
    conn: &mut SqliteConnection,
    entity_type: &str,
    entity_id: i64,
    field: &str,
    old_value: &str,
    new_value: &str,
    actor: &Actor,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO state_transition_log (id, entity_type, entity_id, field, old_value, \
         new_value, changed_by, changed_by_name, organization_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(snowflake_id())
    .bind(entity_type)
    .bind(entity_id)
    .bind(field)
    .bind(old_value)
    .bind(new_value)
    .bind(actor.user_id)
    .bind(&actor.display_name)
    .bind(actor.organization_id)
    .bind(now_millis())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

/// Audit trail for one entity, oldest first.
pub async fn find_for_entity(
    exec: impl SqliteExecutor<'_>,
    entity_type: &str,
    entity_id: i64,
) -> RepoResult<Vec<StateTransitionLog>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM state_transition_log \
         WHERE entity_type = ? AND entity_id = ? ORDER BY created_at, id"
    );
    let rows = sqlx::query_as::<_, StateTransitionLog>(&sql)
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(exec)
        .await?;
    Ok(rows)
}

pub async fn count_for_entity(
    exec: impl SqliteExecutor<'_>,
    entity_type: &str,
    entity_id: i64,
) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM state_transition_log WHERE entity_type = ? AND entity_id = ?",
    )
    .bind(entity_type)
    .bind(entity_id)
    .fetch_one(exec)
    .await?;
    Ok(count)
}
