//! Facility repository.
//!
//! The table holds at most one row, enforced by a unique `singleton` column.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::entities::FacilityEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct FacilityRepository {
    pool: PgPool,
}

impl FacilityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn current(&self) -> Result<Option<FacilityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_facility");
        let result = sqlx::query_as::<_, FacilityEntity>(
            r#"
            SELECT id, capacity, pricing, created_at, updated_at
            FROM facility
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Reads and row-locks the facility inside an open transaction.
    pub async fn lock_current(
        conn: &mut PgConnection,
    ) -> Result<Option<FacilityEntity>, sqlx::Error> {
        let timer = QueryTimer::new("lock_facility");
        let result = sqlx::query_as::<_, FacilityEntity>(
            r#"
            SELECT id, capacity, pricing, created_at, updated_at
            FROM facility
            ORDER BY created_at
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .fetch_optional(&mut *conn)
        .await;
        timer.record();
        result
    }

    /// Creates the facility with `defaults` for missing fields, or patches
    /// the provided fields of the existing row.
    pub async fn upsert(
        &self,
        capacity: Option<i32>,
        pricing: Option<Decimal>,
        default_capacity: i32,
        default_pricing: Decimal,
    ) -> Result<FacilityEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_facility");
        let result = sqlx::query_as::<_, FacilityEntity>(
            r#"
            INSERT INTO facility (capacity, pricing)
            VALUES (COALESCE($1, $3), COALESCE($2, $4))
            ON CONFLICT (singleton) DO UPDATE
            SET capacity = COALESCE($1, facility.capacity),
                pricing = COALESCE($2, facility.pricing),
                updated_at = NOW()
            RETURNING id, capacity, pricing, created_at, updated_at
            "#,
        )
        .bind(capacity)
        .bind(pricing)
        .bind(default_capacity)
        .bind(default_pricing)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}
