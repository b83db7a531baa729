//! Domain layer for the pet boarding backend.
//!
//! This crate contains:
//! - Domain models and request/response DTOs
//! - The role order and the booking status machine
//! - Pure services: access policy, capacity, pricing, payment processor seam

pub mod models;
pub mod services;
