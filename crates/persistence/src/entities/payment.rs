//! Payment entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Payment, PaymentStatus};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Postgres `payment_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatusDb {
    Initiated,
    Completed,
    Failed,
    Refunded,
}

impl From<PaymentStatusDb> for PaymentStatus {
    fn from(db: PaymentStatusDb) -> Self {
        match db {
            PaymentStatusDb::Initiated => PaymentStatus::Initiated,
            PaymentStatusDb::Completed => PaymentStatus::Completed,
            PaymentStatusDb::Failed => PaymentStatus::Failed,
            PaymentStatusDb::Refunded => PaymentStatus::Refunded,
        }
    }
}

impl From<PaymentStatus> for PaymentStatusDb {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Initiated => PaymentStatusDb::Initiated,
            PaymentStatus::Completed => PaymentStatusDb::Completed,
            PaymentStatus::Failed => PaymentStatusDb::Failed,
            PaymentStatus::Refunded => PaymentStatusDb::Refunded,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub status: PaymentStatusDb,
    pub external_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentEntity> for Payment {
    fn from(entity: PaymentEntity) -> Self {
        Self {
            id: entity.id,
            booking_id: entity.booking_id,
            amount: entity.amount,
            status: entity.status.into(),
            external_id: entity.external_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversion_is_lossless() {
        for status in [
            PaymentStatus::Initiated,
            PaymentStatus::Completed,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(PaymentStatus::from(PaymentStatusDb::from(status)), status);
        }
    }
}
