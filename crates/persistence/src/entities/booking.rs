//! Booking entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::booking::{Booking, BookingDetail, BookingStatus, BookingSummary};
use domain::models::{Payment, Pet};
use domain::services::Stay;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::payment::PaymentStatusDb;

/// Postgres `booking_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatusDb {
    Pending,
    Approved,
    CheckedIn,
    CheckedOut,
    Canceled,
}

impl From<BookingStatusDb> for BookingStatus {
    fn from(db: BookingStatusDb) -> Self {
        match db {
            BookingStatusDb::Pending => BookingStatus::Pending,
            BookingStatusDb::Approved => BookingStatus::Approved,
            BookingStatusDb::CheckedIn => BookingStatus::CheckedIn,
            BookingStatusDb::CheckedOut => BookingStatus::CheckedOut,
            BookingStatusDb::Canceled => BookingStatus::Canceled,
        }
    }
}

impl From<BookingStatus> for BookingStatusDb {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::Pending => BookingStatusDb::Pending,
            BookingStatus::Approved => BookingStatusDb::Approved,
            BookingStatus::CheckedIn => BookingStatusDb::CheckedIn,
            BookingStatus::CheckedOut => BookingStatusDb::CheckedOut,
            BookingStatus::Canceled => BookingStatusDb::Canceled,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct BookingEntity {
    pub id: Uuid,
    pub pet_id: Uuid,
    pub user_id: Uuid,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: BookingStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookingEntity> for Booking {
    fn from(entity: BookingEntity) -> Self {
        Self {
            id: entity.id,
            pet_id: entity.pet_id,
            user_id: entity.user_id,
            start_date: entity.start_date,
            end_date: entity.end_date,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

impl From<BookingEntity> for BookingSummary {
    fn from(entity: BookingEntity) -> Self {
        Booking::from(entity).into()
    }
}

/// Interval of an active booking, as read for capacity checks.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct StayEntity {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl From<StayEntity> for Stay {
    fn from(entity: StayEntity) -> Self {
        Stay::new(entity.start_date, entity.end_date)
    }
}

/// Booking joined with its pet and optional payment.
#[derive(Debug, Clone, FromRow)]
pub struct BookingDetailEntity {
    #[sqlx(flatten)]
    pub booking: BookingEntity,

    pub pet_name: String,
    pub pet_type: String,
    pub pet_breed: String,
    pub pet_age: i32,
    pub pet_owner_id: Uuid,
    pub pet_created_at: DateTime<Utc>,
    pub pet_updated_at: DateTime<Utc>,

    pub payment_id: Option<Uuid>,
    pub payment_amount: Option<Decimal>,
    pub payment_status: Option<PaymentStatusDb>,
    pub payment_external_id: Option<String>,
    pub payment_created_at: Option<DateTime<Utc>>,
    pub payment_updated_at: Option<DateTime<Utc>>,
}

impl From<BookingDetailEntity> for BookingDetail {
    fn from(e: BookingDetailEntity) -> Self {
        let pet = Pet {
            id: e.booking.pet_id,
            name: e.pet_name,
            pet_type: e.pet_type,
            breed: e.pet_breed,
            age: e.pet_age,
            owner_id: e.pet_owner_id,
            created_at: e.pet_created_at,
            updated_at: e.pet_updated_at,
        };

        let payment = match (
            e.payment_id,
            e.payment_amount,
            e.payment_status,
            e.payment_created_at,
            e.payment_updated_at,
        ) {
            (Some(id), Some(amount), Some(status), Some(created_at), Some(updated_at)) => {
                Some(Payment {
                    id,
                    booking_id: e.booking.id,
                    amount,
                    status: status.into(),
                    external_id: e.payment_external_id,
                    created_at,
                    updated_at,
                })
            }
            _ => None,
        };

        Self {
            booking: e.booking.into(),
            pet,
            payment,
        }
    }
}
