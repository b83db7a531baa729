//! Facility configuration and availability.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::NaiveDate;
use domain::models::{
    facility::{default_pricing, AvailabilityQuery, DayAvailability, UpdateFacilityRequest, DEFAULT_CAPACITY},
    Facility, Role,
};
use domain::services::capacity;
use persistence::repositories::{BookingRepository, FacilityRepository};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, AuthUser};

fn facility_missing() -> ApiError {
    ApiError::NotFound("Facility has not been configured".to_string())
}

/// Inclusive range check for availability queries.
pub fn validate_range(start: NaiveDate, end: NaiveDate, max_days: i64) -> Result<(), ApiError> {
    if start > end {
        return Err(ApiError::Validation(
            "startDate must not be after endDate".to_string(),
        ));
    }
    let span = (end - start).num_days() + 1;
    if span > max_days {
        return Err(ApiError::Validation(format!(
            "Date range may cover at most {} days",
            max_days
        )));
    }
    Ok(())
}

/// GET /api/v1/facility
pub async fn get_facility(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Facility>, ApiError> {
    let facility = FacilityRepository::new(state.pool.clone())
        .current()
        .await?
        .ok_or_else(facility_missing)?;

    Ok(Json(facility.into()))
}

/// PATCH /api/v1/facility
///
/// Creates the facility with defaults on first use.
pub async fn update_facility(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(request): ApiJson<UpdateFacilityRequest>,
) -> Result<Json<Facility>, ApiError> {
    auth.require_role(Role::Manager)?;
    request.validate()?;
    if let Some(msg) = request.pricing_error() {
        return Err(ApiError::Validation(msg.to_string()));
    }

    let facility: Facility = FacilityRepository::new(state.pool.clone())
        .upsert(
            request.capacity,
            request.pricing,
            DEFAULT_CAPACITY,
            default_pricing(),
        )
        .await?
        .into();

    info!(
        capacity = facility.capacity,
        pricing = %facility.pricing,
        by = %auth.user_id,
        "Facility updated"
    );
    Ok(Json(facility))
}

/// GET /api/v1/facility/availability?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD
pub async fn availability(
    State(state): State<AppState>,
    _auth: AuthUser,
    query: Result<Query<AvailabilityQuery>, QueryRejection>,
) -> Result<Json<Vec<DayAvailability>>, ApiError> {
    let Query(query) = query.map_err(|_| {
        ApiError::Validation("startDate and endDate must be dates in YYYY-MM-DD form".to_string())
    })?;
    validate_range(
        query.start_date,
        query.end_date,
        state.config.booking.max_availability_days,
    )?;

    let facility: Facility = FacilityRepository::new(state.pool.clone())
        .current()
        .await?
        .ok_or_else(facility_missing)?
        .into();

    let (window_start, window_end) = capacity::day_window(query.start_date, query.end_date);
    let stays = BookingRepository::new(state.pool.clone())
        .active_stays_between(window_start, window_end)
        .await?;

    Ok(Json(capacity::availability(
        facility.capacity,
        &stays,
        query.start_date,
        query.end_date,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2031, 5, day).unwrap()
    }

    #[test]
    fn test_validate_range_single_day() {
        assert!(validate_range(d(1), d(1), 366).is_ok());
    }

    #[test]
    fn test_validate_range_inverted() {
        assert!(matches!(
            validate_range(d(2), d(1), 366),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_range_too_long() {
        assert!(validate_range(d(1), d(7), 7).is_ok());
        assert!(matches!(
            validate_range(d(1), d(8), 7),
            Err(ApiError::Validation(_))
        ));
    }
}
