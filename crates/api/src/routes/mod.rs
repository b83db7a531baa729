//! HTTP route handlers.

pub mod auth;
pub mod bookings;
pub mod facility;
pub mod health;
pub mod payments;
pub mod pets;
pub mod users;
