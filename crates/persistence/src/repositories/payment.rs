//! Payment repository.

use domain::models::PaymentStatus;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{PaymentEntity, PaymentStatusDb};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_booking(
        &self,
        booking_id: Uuid,
    ) -> Result<Option<PaymentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_payment_by_booking");
        let result = Self::find_by_booking_in(&mut *self.pool.acquire().await?, booking_id).await;
        timer.record();
        result
    }

    pub async fn find_by_booking_in(
        conn: &mut PgConnection,
        booking_id: Uuid,
    ) -> Result<Option<PaymentEntity>, sqlx::Error> {
        sqlx::query_as::<_, PaymentEntity>(
            r#"
            SELECT id, booking_id, amount, status, external_id, created_at, updated_at
            FROM payments
            WHERE booking_id = $1
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&mut *conn)
        .await
    }

    /// Inserts an INITIATED payment. A second payment for the same booking
    /// fails with a unique violation.
    pub async fn insert_initiated(
        conn: &mut PgConnection,
        booking_id: Uuid,
        amount: Decimal,
        external_id: &str,
    ) -> Result<PaymentEntity, sqlx::Error> {
        let timer = QueryTimer::new("insert_payment");
        let result = sqlx::query_as::<_, PaymentEntity>(
            r#"
            INSERT INTO payments (booking_id, amount, status, external_id)
            VALUES ($1, $2, 'INITIATED', $3)
            RETURNING id, booking_id, amount, status, external_id, created_at, updated_at
            "#,
        )
        .bind(booking_id)
        .bind(amount)
        .bind(external_id)
        .fetch_one(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Sets `to` only while the payment is still in `from`.
    ///
    /// Returns `None` when the payment is missing or already moved on.
    pub async fn transition(
        &self,
        id: Uuid,
        from: PaymentStatus,
        to: PaymentStatus,
    ) -> Result<Option<PaymentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("transition_payment");
        let result = sqlx::query_as::<_, PaymentEntity>(
            r#"
            UPDATE payments
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, booking_id, amount, status, external_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(PaymentStatusDb::from(from))
        .bind(PaymentStatusDb::from(to))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Settles an INITIATED payment identified by the processor's intent id.
    pub async fn settle_by_external_id(
        &self,
        external_id: &str,
        to: PaymentStatus,
    ) -> Result<Option<PaymentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("settle_payment");
        let result = sqlx::query_as::<_, PaymentEntity>(
            r#"
            UPDATE payments
            SET status = $2, updated_at = NOW()
            WHERE external_id = $1 AND status = 'INITIATED'
            RETURNING id, booking_id, amount, status, external_id, created_at, updated_at
            "#,
        )
        .bind(external_id)
        .bind(PaymentStatusDb::from(to))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
