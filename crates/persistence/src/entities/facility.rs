//! Facility entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::Facility;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct FacilityEntity {
    pub id: Uuid,
    pub capacity: i32,
    pub pricing: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FacilityEntity> for Facility {
    fn from(entity: FacilityEntity) -> Self {
        Self {
            id: entity.id,
            capacity: entity.capacity,
            pricing: entity.pricing,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
