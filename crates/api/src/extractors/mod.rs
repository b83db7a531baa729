//! Custom Axum extractors.

pub mod auth_user;
pub mod json;

pub use auth_user::{bearer_token, AuthUser};
pub use json::ApiJson;
