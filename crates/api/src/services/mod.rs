//! Application services sitting between the HTTP handlers and the repositories.

pub mod admin_bootstrap;
pub mod auth;
pub mod email;
pub mod payments;
pub mod reservations;
pub mod stripe;

pub use admin_bootstrap::{bootstrap_admin, BootstrapError, BootstrapOutcome};
pub use auth::{AuthError, AuthService};
pub use email::{EmailError, EmailService};
pub use payments::{PaymentError, PaymentService};
pub use reservations::{ReservationError, ReservationService};
pub use stripe::StripePaymentProcessor;
