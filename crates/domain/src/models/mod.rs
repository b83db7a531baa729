//! Domain models for pet boarding.

pub mod booking;
pub mod facility;
pub mod password_reset;
pub mod payment;
pub mod pet;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use facility::Facility;
pub use password_reset::PasswordReset;
pub use payment::{Payment, PaymentStatus};
pub use pet::Pet;
pub use user::{Role, User};
