//! Account administration and the caller's own profile.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    user::{
        normalize_email, CreateUserRequest, ProfileResponse, UpdateUserRequest, UserResponse,
    },
    Pet, Role, User,
};
use persistence::repositories::{PetRepository, UserRepository};
use shared::password::hash_password;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};

fn duplicate_email(err: sqlx::Error) -> ApiError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            ApiError::Conflict("Email already registered".to_string())
        }
        _ => err.into(),
    }
}

/// GET /api/v1/users/me
pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user: User = UserRepository::new(state.pool.clone())
        .find_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
        .into();

    let pets = PetRepository::new(state.pool.clone())
        .list_by_owner(auth.user_id)
        .await?
        .into_iter()
        .map(Pet::from)
        .collect();

    Ok(Json(ProfileResponse {
        user: user.into(),
        pets,
    }))
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    auth.require_role(Role::Admin)?;

    let users = UserRepository::new(state.pool.clone())
        .list_all()
        .await?
        .into_iter()
        .map(|e| User::from(e).into())
        .collect();

    Ok(Json(users))
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    auth.require_role(Role::Admin)?;
    request.validate()?;

    let password_hash = hash_password(&request.password)?;
    let created = UserRepository::new(state.pool.clone())
        .create(
            request.name.trim(),
            &normalize_email(&request.email),
            &password_hash,
            request.role,
            request.staff_level,
        )
        .await
        .map_err(duplicate_email)?;

    info!(user_id = %created.id, role = %request.role, by = %auth.user_id, "User created by admin");
    Ok((StatusCode::CREATED, Json(User::from(created).into())))
}

/// PATCH /api/v1/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    auth.require_role(Role::Admin)?;
    request.validate()?;

    let email = request.email.as_deref().map(normalize_email);
    let updated = UserRepository::new(state.pool.clone())
        .update(id, email.as_deref(), request.role, request.staff_level)
        .await
        .map_err(duplicate_email)?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    info!(user_id = %id, by = %auth.user_id, "User updated by admin");
    Ok(Json(User::from(updated).into()))
}

/// DELETE /api/v1/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    auth.require_role(Role::Admin)?;

    if id == auth.user_id {
        return Err(ApiError::Validation(
            "Administrators cannot delete their own account".to_string(),
        ));
    }

    let users = UserRepository::new(state.pool.clone());
    if users.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    if users.has_dependents(id).await? {
        return Err(ApiError::Conflict(
            "User still owns pets or bookings".to_string(),
        ));
    }

    if !users.delete(id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(user_id = %id, by = %auth.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_email_passthrough() {
        assert!(matches!(
            duplicate_email(sqlx::Error::RowNotFound),
            ApiError::NotFound(_)
        ));
    }
}
