//! Booking endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::models::{
    booking::{BookingDetail, CreateBookingRequest, UpdateBookingRequest},
    Booking,
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};

/// POST /api/v1/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), ApiError> {
    let booking = state
        .reservation_service()
        .create(&auth, request.pet_id, request.start_date, request.end_date)
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/v1/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<BookingDetail>>, ApiError> {
    Ok(Json(state.reservation_service().list_all(&auth).await?))
}

/// GET /api/v1/bookings/mine
pub async fn my_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<BookingDetail>>, ApiError> {
    Ok(Json(state.reservation_service().list_mine(&auth).await?))
}

/// GET /api/v1/bookings/upcoming
pub async fn upcoming_bookings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<BookingDetail>>, ApiError> {
    Ok(Json(state.reservation_service().list_upcoming(&auth).await?))
}

/// GET /api/v1/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDetail>, ApiError> {
    Ok(Json(state.reservation_service().get(&auth, id).await?))
}

/// PATCH /api/v1/bookings/:id
pub async fn update_booking(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateBookingRequest>,
) -> Result<Json<Booking>, ApiError> {
    let booking = state
        .reservation_service()
        .update_status(&auth, id, request.status)
        .await?;

    Ok(Json(booking))
}
