//! Payment Repository

use shared::models::{Payment, PaymentCreate, PaymentStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqliteExecutor};

use super::{RepoError, RepoResult};

const COLUMNS: &str = "id, reservation_id, organization_id, amount, currency, method, status, \
     reference, notes, processed_at, created_by";

pub async fn find_by_id(exec: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Payment>> {
    let sql = format!("SELECT {COLUMNS} FROM payment WHERE id = ?");
    let payment = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(exec)
        .await?;
    Ok(payment)
}

pub async fn find_for_reservation(
    exec: impl SqliteExecutor<'_>,
    reservation_id: i64,
) -> RepoResult<Vec<Payment>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM payment WHERE reservation_id = ? ORDER BY processed_at DESC, id DESC"
    );
    let payments = sqlx::query_as::<_, Payment>(&sql)
        .bind(reservation_id)
        .fetch_all(exec)
        .await?;
    Ok(payments)
}

/// Net amount held: sum of completed payments (refund rows are negative).
pub async fn sum_completed(
    exec: impl SqliteExecutor<'_>,
    reservation_id: i64,
) -> RepoResult<f64> {
    let total: Option<f64> = sqlx::query_scalar(
        "SELECT SUM(amount) FROM payment WHERE reservation_id = ? AND status = 'completed'",
    )
    .bind(reservation_id)
    .fetch_one(exec)
    .await?;
    Ok(total.unwrap_or(0.0))
}

pub async fn insert(
    conn: &mut SqliteConnection,
    reservation_id: i64,
    organization_id: i64,
    currency: &str,
    created_by: Option<i64>,
    data: &PaymentCreate,
) -> RepoResult<Payment> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO payment (id, reservation_id, organization_id, amount, currency, method, \
         status, reference, notes, processed_at, created_by) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(reservation_id)
    .bind(organization_id)
    .bind(data.amount)
    .bind(currency)
    .bind(data.method)
    .bind(data.status)
    .bind(&data.reference)
    .bind(&data.notes)
    .bind(now_millis())
    .bind(created_by)
    .execute(&mut *conn)
    .await?;

    find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create payment".into()))
}

/// Flip a payment's status (pending → completed, completed → refunded).
pub async fn set_status(
    conn: &mut SqliteConnection,
    payment_id: i64,
    status: PaymentStatus,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE payment SET status = ? WHERE id = ?")
        .bind(status)
        .bind(payment_id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Payment {payment_id} not found"
        )));
    }
    Ok(())
}

/// Finalize a pending payment with the amount actually received.
pub async fn confirm(
    conn: &mut SqliteConnection,
    payment_id: i64,
    amount: f64,
    notes: Option<&str>,
) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE payment SET amount = ?, status = 'completed', \
         notes = COALESCE(?, notes) WHERE id = ? AND status = 'pending'",
    )
    .bind(amount)
    .bind(notes)
    .bind(payment_id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Payment {payment_id} not found or not pending"
        )));
    }
    Ok(())
}
