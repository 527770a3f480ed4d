//! Payments and financial status
//!
//! The financial axis is recomputed from the sum of completed payments
//! (refunds are negative rows) and always moves through the financial
//! state machine — a recomputed target the table cannot reach is
//! surfaced as `InvalidTransition`, never force-written.

use shared::Actor;
use shared::models::{
    FinancialStatus, Payment, PaymentCreate, PaymentStatus, Reservation,
};
use sqlx::SqliteConnection;

use crate::core::error::{EngineError, EngineResult};
use crate::db::repository::{payment, reservation};
use crate::fsm;
use crate::utils::money;

use super::LifecycleService;

impl LifecycleService {
    /// Record a payment against a reservation. Completed payments
    /// immediately recompute the financial status in the same unit of
    /// work.
    pub async fn record_payment(
        &self,
        reservation_id: i64,
        data: &PaymentCreate,
        actor: &Actor,
    ) -> EngineResult<Payment> {
        if !data.amount.is_finite() || data.amount <= 0.0 {
            return Err(EngineError::Validation(
                "payment amount must be a positive finite number".into(),
            ));
        }

        let res = self.load_for_payment(reservation_id).await?;
        let mut tx = self.pool().begin().await?;
        let created = payment::insert(
            &mut tx,
            res.id,
            res.organization_id,
            &res.currency,
            actor.user_id,
            data,
        )
        .await?;

        if created.status == PaymentStatus::Completed {
            recompute_financial_status(&mut tx, &res, actor).await?;
        }
        tx.commit().await?;

        tracing::info!(
            reservation_id = res.id,
            payment_id = created.id,
            amount = created.amount,
            "payment recorded"
        );
        Ok(created)
    }

    /// Finalize a pending payment with the amount actually received.
    pub async fn confirm_payment(
        &self,
        reservation_id: i64,
        payment_id: i64,
        amount: f64,
        notes: Option<&str>,
        actor: &Actor,
    ) -> EngineResult<Payment> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::Validation(
                "payment amount must be a positive finite number".into(),
            ));
        }
        let res = self.load_for_payment(reservation_id).await?;
        let existing = payment::find_by_id(self.pool(), payment_id)
            .await?
            .filter(|p| p.reservation_id == res.id)
            .ok_or_else(|| EngineError::NotFound(format!("Payment {payment_id} not found")))?;
        if existing.status != PaymentStatus::Pending {
            return Err(EngineError::Validation(
                "only pending payments can be confirmed".into(),
            ));
        }

        let mut tx = self.pool().begin().await?;
        payment::confirm(&mut tx, payment_id, amount, notes).await?;
        recompute_financial_status(&mut tx, &res, actor).await?;
        tx.commit().await?;

        payment::find_by_id(self.pool(), payment_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Payment {payment_id} not found")))
    }

    /// Refund (part of) a completed payment: the payment flips to
    /// refunded, a negative completed row keeps the ledger additive, and
    /// the financial status is recomputed — all in one unit of work.
    pub async fn refund_payment(
        &self,
        reservation_id: i64,
        payment_id: i64,
        amount: f64,
        notes: Option<String>,
        actor: &Actor,
    ) -> EngineResult<Reservation> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(EngineError::Validation(
                "refund amount must be a positive finite number".into(),
            ));
        }
        let res = self.load_for_payment(reservation_id).await?;
        let original = payment::find_by_id(self.pool(), payment_id)
            .await?
            .filter(|p| p.reservation_id == res.id)
            .ok_or_else(|| EngineError::NotFound(format!("Payment {payment_id} not found")))?;
        if original.status != PaymentStatus::Completed {
            return Err(EngineError::Validation(
                "only completed payments can be refunded".into(),
            ));
        }
        if amount > original.amount {
            return Err(EngineError::Validation(
                "refund cannot exceed the original payment".into(),
            ));
        }

        let mut tx = self.pool().begin().await?;
        payment::set_status(&mut tx, payment_id, PaymentStatus::Refunded).await?;
        payment::insert(
            &mut tx,
            res.id,
            res.organization_id,
            &res.currency,
            actor.user_id,
            &PaymentCreate {
                amount: -amount,
                method: original.method,
                status: PaymentStatus::Completed,
                reference: original.reference.clone(),
                notes,
            },
        )
        .await?;
        recompute_financial_status(&mut tx, &res, actor).await?;
        tx.commit().await?;

        tracing::info!(
            reservation_id = res.id,
            payment_id,
            amount,
            "payment refunded"
        );
        self.load_for_payment(reservation_id).await
    }

    async fn load_for_payment(&self, reservation_id: i64) -> EngineResult<Reservation> {
        reservation::find_by_id(self.pool(), reservation_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("Reservation {reservation_id} not found")))
    }
}

/// Recompute the financial status from the completed-payment total.
///
/// Target resolution, in order:
/// - net < 0 (refunds exceed payments) → refunded; a distinct explicit
///   case, not inferred from the table.
/// - net == 0 → pending_payment when nothing ever happened; refunded
///   when money moved and came all the way back.
/// - 0 < net < total → partial, or partial_refund when stepping down
///   from paid.
/// - net >= total → paid.
async fn recompute_financial_status(
    conn: &mut SqliteConnection,
    res: &Reservation,
    actor: &Actor,
) -> EngineResult<()> {
    let paid = money::to_decimal(payment::sum_completed(&mut *conn, res.id).await?);
    let total = money::to_decimal(res.total_amount);
    let zero = money::to_decimal(0.0);

    let current = reservation::read_financial_status(&mut *conn, res.id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("Reservation {} not found", res.id)))?;

    let target = if paid < zero {
        FinancialStatus::Refunded
    } else if paid == zero {
        if current == FinancialStatus::PendingPayment {
            FinancialStatus::PendingPayment
        } else {
            FinancialStatus::Refunded
        }
    } else if paid < total {
        if current == FinancialStatus::Paid {
            FinancialStatus::PartialRefund
        } else {
            FinancialStatus::Partial
        }
    } else {
        FinancialStatus::Paid
    };

    if target == current {
        return Ok(());
    }
    fsm::set_financial_status(&mut *conn, res.id, target, actor).await
}
