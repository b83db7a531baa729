//! Pet registry endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    booking::BookingSummary,
    pet::{CreatePetRequest, PetDetail, PetWithOwner, UpdatePetRequest},
    Pet, Role,
};
use domain::services::{AccessDenied, Caller};
use persistence::repositories::{BookingRepository, PetRepository, UserRepository};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};

/// Owner of a new pet: the caller, unless staff name someone else.
pub fn resolve_owner(caller: &Caller, requested: Option<Uuid>) -> Result<Uuid, AccessDenied> {
    match requested {
        None => Ok(caller.user_id),
        Some(owner) if owner == caller.user_id => Ok(owner),
        Some(owner) => {
            caller.require_role(Role::Staff)?;
            Ok(owner)
        }
    }
}

/// Loads a pet and checks the caller may act on it.
async fn load_authorized(repo: &PetRepository, caller: &Caller, id: Uuid) -> Result<Pet, ApiError> {
    let pet: Pet = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Pet not found".to_string()))?
        .into();
    caller.require_owner_or(pet.owner_id, Role::Staff)?;
    Ok(pet)
}

/// POST /api/v1/pets
pub async fn create_pet(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreatePetRequest>,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    request.validate()?;
    let owner_id = resolve_owner(&auth, request.owner_id)?;

    if owner_id != auth.user_id
        && UserRepository::new(state.pool.clone())
            .find_by_id(owner_id)
            .await?
            .is_none()
    {
        return Err(ApiError::NotFound("Owner not found".to_string()));
    }

    let pet: Pet = PetRepository::new(state.pool.clone())
        .create(
            request.name.trim(),
            request.pet_type.trim(),
            request.breed.trim(),
            request.age,
            owner_id,
        )
        .await?
        .into();

    info!(pet_id = %pet.id, owner_id = %owner_id, "Pet registered");
    Ok((StatusCode::CREATED, Json(pet)))
}

/// GET /api/v1/pets
pub async fn list_pets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<PetWithOwner>>, ApiError> {
    auth.require_role(Role::Staff)?;

    let pets = PetRepository::new(state.pool.clone())
        .list_with_owners()
        .await?
        .into_iter()
        .map(PetWithOwner::from)
        .collect();

    Ok(Json(pets))
}

/// GET /api/v1/pets/mine
pub async fn my_pets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Pet>>, ApiError> {
    let pets = PetRepository::new(state.pool.clone())
        .list_by_owner(auth.user_id)
        .await?
        .into_iter()
        .map(Pet::from)
        .collect();

    Ok(Json(pets))
}

/// GET /api/v1/pets/:id
pub async fn get_pet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<PetDetail>, ApiError> {
    let pet = load_authorized(&PetRepository::new(state.pool.clone()), &auth, id).await?;

    let bookings = BookingRepository::new(state.pool.clone())
        .list_for_pet(pet.id)
        .await?
        .into_iter()
        .map(BookingSummary::from)
        .collect();

    Ok(Json(PetDetail { pet, bookings }))
}

/// PATCH /api/v1/pets/:id
pub async fn update_pet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdatePetRequest>,
) -> Result<Json<Pet>, ApiError> {
    request.validate()?;
    if request.is_empty() {
        return Err(ApiError::Validation("No fields to update".to_string()));
    }

    let repo = PetRepository::new(state.pool.clone());
    load_authorized(&repo, &auth, id).await?;

    let pet = repo
        .update(
            id,
            request.name.as_deref().map(str::trim),
            request.pet_type.as_deref().map(str::trim),
            request.breed.as_deref().map(str::trim),
            request.age,
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Pet not found".to_string()))?;

    Ok(Json(pet.into()))
}

/// DELETE /api/v1/pets/:id
pub async fn delete_pet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = PetRepository::new(state.pool.clone());
    load_authorized(&repo, &auth, id).await?;

    match repo.delete(id).await {
        Ok(true) => {
            info!(pet_id = %id, by = %auth.user_id, "Pet deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Ok(false) => Err(ApiError::NotFound("Pet not found".to_string())),
        Err(sqlx::Error::Database(db)) if db.is_foreign_key_violation() => Err(
            ApiError::Conflict("Pet has bookings and cannot be deleted".to_string()),
        ),
        Err(e) => Err(e.into()),
    }
}
