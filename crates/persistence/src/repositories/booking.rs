//! Booking repository: reservations, status changes and read projections.

use chrono::{DateTime, Utc};
use domain::models::BookingStatus;
use domain::services::capacity::{self, CapacityExceeded, CapacityMode, Stay};
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::facility::FacilityRepository;
use crate::entities::{BookingDetailEntity, BookingEntity, BookingStatusDb, StayEntity};
use crate::metrics::QueryTimer;

/// Result of a reservation attempt.
#[derive(Debug)]
pub enum ReserveOutcome {
    Reserved(BookingEntity),
    Rejected(CapacityExceeded),
    FacilityMissing,
}

/// Result of a status change.
#[derive(Debug)]
pub enum TransitionOutcome {
    Updated(BookingEntity),
    Illegal { from: BookingStatus },
    NotFound,
}

const BOOKING_COLUMNS: &str =
    "id, pet_id, user_id, start_date, end_date, status, created_at, updated_at";

/// Booking joined with its pet and payment, filtered by `condition`.
fn detail_query(condition: &str, order: &str) -> String {
    format!(
        r#"
        SELECT b.id, b.pet_id, b.user_id, b.start_date, b.end_date, b.status,
               b.created_at, b.updated_at,
               p.name AS pet_name, p.pet_type AS pet_type, p.breed AS pet_breed,
               p.age AS pet_age, p.owner_id AS pet_owner_id,
               p.created_at AS pet_created_at, p.updated_at AS pet_updated_at,
               pay.id AS payment_id, pay.amount AS payment_amount,
               pay.status AS payment_status, pay.external_id AS payment_external_id,
               pay.created_at AS payment_created_at, pay.updated_at AS payment_updated_at
        FROM bookings b
        JOIN pets p ON p.id = b.pet_id
        LEFT JOIN payments pay ON pay.booking_id = b.id
        WHERE {condition}
        {order}
        "#
    )
}

const BY_START: &str = "ORDER BY b.start_date ASC, b.created_at ASC";

#[derive(Clone)]
pub struct BookingRepository {
    pool: PgPool,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Checks capacity and inserts a PENDING booking in one transaction.
    ///
    /// The facility row is locked first, which serialises concurrent
    /// reservations: the second waits and then sees the first's booking.
    pub async fn reserve(
        &self,
        pet_id: Uuid,
        user_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        mode: CapacityMode,
    ) -> Result<ReserveOutcome, sqlx::Error> {
        let timer = QueryTimer::new("reserve_booking");
        let mut tx = self.pool.begin().await?;

        let Some(facility) = FacilityRepository::lock_current(&mut tx).await? else {
            tx.rollback().await?;
            timer.record();
            return Ok(ReserveOutcome::FacilityMissing);
        };

        let request = Stay::new(start_date, end_date);
        let (window_start, window_end) = capacity::day_window(request.first_day(), request.last_day());
        let existing = Self::active_stays_in(&mut tx, window_start, window_end).await?;

        if let Err(exceeded) = capacity::check_capacity(mode, facility.capacity, &existing, &request)
        {
            tx.rollback().await?;
            timer.record();
            return Ok(ReserveOutcome::Rejected(exceeded));
        }

        let booking = sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            INSERT INTO bookings (pet_id, user_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, 'PENDING')
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(pet_id)
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        debug!(booking_id = %booking.id, load_checked = existing.len(), "Booking reserved");
        Ok(ReserveOutcome::Reserved(booking))
    }

    /// Active bookings that cover any day of `[window_start, window_end)`.
    async fn active_stays_in(
        conn: &mut PgConnection,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Stay>, sqlx::Error> {
        let rows = sqlx::query_as::<_, StayEntity>(
            r#"
            SELECT start_date, end_date
            FROM bookings
            WHERE status IN ('PENDING', 'APPROVED', 'CHECKED_IN')
              AND start_date < $2
              AND end_date >= $1
            "#,
        )
        .bind(window_start)
        .bind(window_end)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(Stay::from).collect())
    }

    /// Active stays touching the day window, read outside a transaction.
    pub async fn active_stays_between(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<Stay>, sqlx::Error> {
        let timer = QueryTimer::new("active_stays_between");
        let mut conn = self.pool.acquire().await?;
        let result = Self::active_stays_in(&mut conn, window_start, window_end).await;
        timer.record();
        result
    }

    /// Moves a booking to `next` if the status machine allows it.
    pub async fn transition(
        &self,
        id: Uuid,
        next: BookingStatus,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let timer = QueryTimer::new("transition_booking");
        let mut tx = self.pool.begin().await?;

        let Some(current) = Self::lock(&mut tx, id).await? else {
            tx.rollback().await?;
            timer.record();
            return Ok(TransitionOutcome::NotFound);
        };

        let from = BookingStatus::from(current.status);
        if !from.can_transition_to(next) {
            tx.rollback().await?;
            timer.record();
            return Ok(TransitionOutcome::Illegal { from });
        }

        let updated = sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(BookingStatusDb::from(next))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(TransitionOutcome::Updated(updated))
    }

    /// Reads and row-locks a booking inside an open transaction.
    pub async fn lock(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<BookingEntity>, sqlx::Error> {
        sqlx::query_as::<_, BookingEntity>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<BookingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_booking_by_id");
        let result = sqlx::query_as::<_, BookingEntity>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_detail(&self, id: Uuid) -> Result<Option<BookingDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_booking_detail");
        let result = sqlx::query_as::<_, BookingDetailEntity>(&detail_query("b.id = $1", ""))
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn list_all(&self) -> Result<Vec<BookingDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_bookings");
        let result = sqlx::query_as::<_, BookingDetailEntity>(&detail_query("TRUE", BY_START))
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<BookingDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_bookings_by_user");
        let result =
            sqlx::query_as::<_, BookingDetailEntity>(&detail_query("b.user_id = $1", BY_START))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await;
        timer.record();
        result
    }

    /// PENDING or APPROVED bookings starting at or after `now`.
    pub async fn list_upcoming(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<BookingDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_upcoming_bookings");
        let result = sqlx::query_as::<_, BookingDetailEntity>(&detail_query(
            "b.start_date >= $1 AND b.status IN ('PENDING', 'APPROVED')",
            BY_START,
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_for_pet(&self, pet_id: Uuid) -> Result<Vec<BookingEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_bookings_for_pet");
        let result = sqlx::query_as::<_, BookingEntity>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE pet_id = $1
            ORDER BY start_date ASC
            "#
        ))
        .bind(pet_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
