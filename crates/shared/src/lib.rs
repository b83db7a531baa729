//! Shared utilities for the pet boarding backend.
//!
//! - Password hashing with Argon2id and password policy
//! - Token generation, SHA-256 digests and HMAC signatures
//! - HS256 access tokens
//! - Reusable field validators

pub mod crypto;
pub mod jwt;
pub mod password;
pub mod validation;
