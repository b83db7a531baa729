//! Persistence layer for the pet boarding backend.
//!
//! This crate contains:
//! - Connection pool creation and embedded migrations
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Query timing metrics

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
