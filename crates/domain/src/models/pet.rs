//! Pet registry models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_not_blank;
use uuid::Uuid;
use validator::Validate;

use super::booking::BookingSummary;

/// A pet boarded at the facility. The owner never changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub pet_type: String,
    pub breed: String,
    pub age: i32,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Pet row joined with its owner's email for staff listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetWithOwner {
    #[serde(flatten)]
    pub pet: Pet,
    pub owner_email: String,
}

/// Single-pet view including the pet's bookings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetDetail {
    #[serde(flatten)]
    pub pet: Pet,
    pub bookings: Vec<BookingSummary>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePetRequest {
    #[validate(
        length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"),
        custom(function = "validate_not_blank")
    )]
    pub name: String,

    #[serde(rename = "type")]
    #[validate(
        length(min = 1, max = 50, message = "Type must be between 1 and 50 characters"),
        custom(function = "validate_not_blank")
    )]
    pub pet_type: String,

    #[validate(
        length(min = 1, max = 50, message = "Breed must be between 1 and 50 characters"),
        custom(function = "validate_not_blank")
    )]
    pub breed: String,

    #[validate(range(min = 0, message = "Age must be non-negative"))]
    pub age: i32,

    /// Only honoured for staff and above.
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePetRequest {
    #[validate(length(min = 1, max = 50, message = "Name must be between 1 and 50 characters"))]
    pub name: Option<String>,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Type must be between 1 and 50 characters"))]
    pub pet_type: Option<String>,

    #[validate(length(min = 1, max = 50, message = "Breed must be between 1 and 50 characters"))]
    pub breed: Option<String>,

    #[validate(range(min = 0, message = "Age must be non-negative"))]
    pub age: Option<i32>,
}

impl UpdatePetRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.pet_type.is_none() && self.breed.is_none() && self.age.is_none()
    }
}
