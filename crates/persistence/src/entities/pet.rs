//! Pet entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::pet::{Pet, PetWithOwner};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct PetEntity {
    pub id: Uuid,
    pub name: String,
    pub pet_type: String,
    pub breed: String,
    pub age: i32,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PetEntity> for Pet {
    fn from(entity: PetEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            pet_type: entity.pet_type,
            breed: entity.breed,
            age: entity.age,
            owner_id: entity.owner_id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Pet row joined with `users.email`.
#[derive(Debug, Clone, FromRow)]
pub struct PetWithOwnerEntity {
    #[sqlx(flatten)]
    pub pet: PetEntity,
    pub owner_email: String,
}

impl From<PetWithOwnerEntity> for PetWithOwner {
    fn from(entity: PetWithOwnerEntity) -> Self {
        Self {
            pet: entity.pet.into(),
            owner_email: entity.owner_email,
        }
    }
}
