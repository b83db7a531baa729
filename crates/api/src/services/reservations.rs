//! Booking reservation engine: creation under the capacity guard, status
//! changes and read projections.

use chrono::{DateTime, Utc};
use domain::models::{booking::BookingDetail, Booking, BookingStatus, Pet, Role};
use domain::services::{AccessDenied, Caller, CapacityExceeded, CapacityMode};
use persistence::repositories::{BookingRepository, PetRepository, ReserveOutcome, TransitionOutcome};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::metrics::{record_booking_created, record_booking_rejected};

#[derive(Debug, Error)]
pub enum ReservationError {
    #[error("Pet not found")]
    PetNotFound,

    #[error("Booking not found")]
    BookingNotFound,

    #[error(transparent)]
    Access(#[from] AccessDenied),

    #[error("Start date must be before end date")]
    InvalidRange,

    #[error(transparent)]
    Capacity(#[from] CapacityExceeded),

    #[error("Cannot change booking status from {from} to {to}")]
    IllegalTransition { from: BookingStatus, to: BookingStatus },

    #[error("Facility configuration not found")]
    FacilityMissing,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::PetNotFound | ReservationError::BookingNotFound => {
                ApiError::NotFound(err.to_string())
            }
            ReservationError::Access(denied) => denied.into(),
            ReservationError::InvalidRange | ReservationError::IllegalTransition { .. } => {
                ApiError::Validation(err.to_string())
            }
            ReservationError::Capacity(exceeded) => exceeded.into(),
            ReservationError::FacilityMissing => ApiError::Internal(err.to_string()),
            ReservationError::Database(e) => e.into(),
        }
    }
}

/// Rejects empty and inverted intervals.
pub fn ensure_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ReservationError> {
    if start < end {
        Ok(())
    } else {
        Err(ReservationError::InvalidRange)
    }
}

/// Access to a booking: the person who booked it, the pet's owner, or staff.
pub fn authorize_booking_access(caller: &Caller, detail: &BookingDetail) -> Result<(), AccessDenied> {
    let owner = if detail.pet.owner_id == caller.user_id {
        detail.pet.owner_id
    } else {
        detail.booking.user_id
    };
    caller.require_owner_or(owner, Role::Staff)
}

/// Role gate for a status change; approval and cancellation need a manager.
pub fn authorize_transition(caller: &Caller, next: BookingStatus) -> Result<(), AccessDenied> {
    caller.require_role(Role::Staff)?;
    caller.require_role(next.required_role())
}

pub struct ReservationService {
    bookings: BookingRepository,
    pets: PetRepository,
    mode: CapacityMode,
}

impl ReservationService {
    pub fn new(pool: PgPool, mode: CapacityMode) -> Self {
        Self {
            bookings: BookingRepository::new(pool.clone()),
            pets: PetRepository::new(pool),
            mode,
        }
    }

    pub async fn create(
        &self,
        caller: &Caller,
        pet_id: Uuid,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Booking, ReservationError> {
        let pet: Pet = self
            .pets
            .find_by_id(pet_id)
            .await?
            .ok_or(ReservationError::PetNotFound)?
            .into();

        caller.require_owner_or(pet.owner_id, Role::Staff)?;
        ensure_ordered(start_date, end_date)?;

        let outcome = self
            .bookings
            .reserve(pet.id, caller.user_id, start_date, end_date, self.mode)
            .await?;

        match outcome {
            ReserveOutcome::Reserved(entity) => {
                let booking = Booking::from(entity);
                record_booking_created();
                info!(booking_id = %booking.id, pet_id = %pet.id, "Booking created");
                Ok(booking)
            }
            ReserveOutcome::Rejected(exceeded) => {
                record_booking_rejected("capacity");
                info!(pet_id = %pet.id, load = exceeded.load, capacity = exceeded.capacity, "Booking rejected at capacity");
                Err(exceeded.into())
            }
            ReserveOutcome::FacilityMissing => {
                record_booking_rejected("no_facility");
                Err(ReservationError::FacilityMissing)
            }
        }
    }

    pub async fn update_status(
        &self,
        caller: &Caller,
        id: Uuid,
        next: BookingStatus,
    ) -> Result<Booking, ReservationError> {
        authorize_transition(caller, next)?;

        match self.bookings.transition(id, next).await? {
            TransitionOutcome::Updated(entity) => {
                info!(booking_id = %id, status = %next, by = %caller.user_id, "Booking status changed");
                Ok(entity.into())
            }
            TransitionOutcome::Illegal { from } => {
                Err(ReservationError::IllegalTransition { from, to: next })
            }
            TransitionOutcome::NotFound => Err(ReservationError::BookingNotFound),
        }
    }

    pub async fn get(&self, caller: &Caller, id: Uuid) -> Result<BookingDetail, ReservationError> {
        let detail: BookingDetail = self
            .bookings
            .find_detail(id)
            .await?
            .ok_or(ReservationError::BookingNotFound)?
            .into();

        authorize_booking_access(caller, &detail)?;
        Ok(detail)
    }

    pub async fn list_all(&self, caller: &Caller) -> Result<Vec<BookingDetail>, ReservationError> {
        caller.require_role(Role::Staff)?;
        let rows = self.bookings.list_all().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_mine(&self, caller: &Caller) -> Result<Vec<BookingDetail>, ReservationError> {
        let rows = self.bookings.list_by_user(caller.user_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn list_upcoming(
        &self,
        caller: &Caller,
    ) -> Result<Vec<BookingDetail>, ReservationError> {
        caller.require_role(Role::Staff)?;
        let rows = self.bookings.list_upcoming(Utc::now()).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2031, 3, day, 10, 0, 0).unwrap()
    }

    fn detail(owner: Uuid, booked_by: Uuid) -> BookingDetail {
        BookingDetail {
            booking: Booking {
                id: Uuid::new_v4(),
                pet_id: Uuid::new_v4(),
                user_id: booked_by,
                start_date: at(1),
                end_date: at(3),
                status: BookingStatus::Pending,
                created_at: at(1),
                updated_at: at(1),
            },
            pet: Pet {
                id: Uuid::new_v4(),
                name: "Rex".into(),
                pet_type: "Dog".into(),
                breed: "Beagle".into(),
                age: 4,
                owner_id: owner,
                created_at: at(1),
                updated_at: at(1),
            },
            payment: None,
        }
    }

    #[test]
    fn test_ensure_ordered() {
        assert!(ensure_ordered(at(1), at(2)).is_ok());
        assert!(matches!(ensure_ordered(at(2), at(2)), Err(ReservationError::InvalidRange)));
        assert!(matches!(ensure_ordered(at(3), at(2)), Err(ReservationError::InvalidRange)));
    }

    #[test]
    fn test_booking_access() {
        let owner = Uuid::new_v4();
        let staff_member = Uuid::new_v4();
        let d = detail(owner, staff_member);

        assert!(authorize_booking_access(&Caller::new(owner, Role::Customer), &d).is_ok());
        assert!(authorize_booking_access(&Caller::new(staff_member, Role::Customer), &d).is_ok());
        assert!(authorize_booking_access(&Caller::new(Uuid::new_v4(), Role::Staff), &d).is_ok());
        assert!(authorize_booking_access(&Caller::new(Uuid::new_v4(), Role::Customer), &d).is_err());
    }

    #[test]
    fn test_transition_roles() {
        let staff = Caller::new(Uuid::new_v4(), Role::Staff);
        let manager = Caller::new(Uuid::new_v4(), Role::Manager);
        let customer = Caller::new(Uuid::new_v4(), Role::Customer);

        assert!(authorize_transition(&staff, BookingStatus::CheckedIn).is_ok());
        assert!(authorize_transition(&staff, BookingStatus::CheckedOut).is_ok());
        assert!(authorize_transition(&staff, BookingStatus::Approved).is_err());
        assert!(authorize_transition(&staff, BookingStatus::Canceled).is_err());
        assert!(authorize_transition(&manager, BookingStatus::Approved).is_ok());
        assert!(authorize_transition(&manager, BookingStatus::Canceled).is_ok());
        assert!(authorize_transition(&customer, BookingStatus::CheckedIn).is_err());
    }

    #[test]
    fn test_error_mapping() {
        use axum::http::StatusCode;
        use axum::response::IntoResponse;

        let cases = [
            (ReservationError::PetNotFound, StatusCode::NOT_FOUND),
            (ReservationError::InvalidRange, StatusCode::BAD_REQUEST),
            (
                ReservationError::Capacity(CapacityExceeded { load: 2, capacity: 2 }),
                StatusCode::CONFLICT,
            ),
            (
                ReservationError::IllegalTransition {
                    from: BookingStatus::Canceled,
                    to: BookingStatus::Approved,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                ReservationError::Access(AccessDenied::InsufficientRole(Role::Manager)),
                StatusCode::FORBIDDEN,
            ),
            (ReservationError::FacilityMissing, StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn test_illegal_transition_message() {
        let err = ReservationError::IllegalTransition {
            from: BookingStatus::CheckedOut,
            to: BookingStatus::CheckedIn,
        };
        assert_eq!(
            err.to_string(),
            "Cannot change booking status from CHECKED_OUT to CHECKED_IN"
        );
    }
}
