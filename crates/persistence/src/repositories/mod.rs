//! Repository implementations for database operations.

pub mod booking;
pub mod facility;
pub mod password_reset;
pub mod payment;
pub mod pet;
pub mod user;

pub use booking::{BookingRepository, ReserveOutcome, TransitionOutcome};
pub use facility::FacilityRepository;
pub use password_reset::PasswordResetRepository;
pub use payment::PaymentRepository;
pub use pet::PetRepository;
pub use user::UserRepository;
