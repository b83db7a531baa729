//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod booking;
pub mod facility;
pub mod password_reset;
pub mod payment;
pub mod pet;
pub mod user;

pub use booking::{BookingDetailEntity, BookingEntity, BookingStatusDb, StayEntity};
pub use facility::FacilityEntity;
pub use password_reset::PasswordResetEntity;
pub use payment::{PaymentEntity, PaymentStatusDb};
pub use pet::{PetEntity, PetWithOwnerEntity};
pub use user::{UserEntity, UserRoleDb};
