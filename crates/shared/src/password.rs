//! Password hashing with Argon2id.
//!
//! Hashes are stored as PHC strings, so the algorithm, parameters and salt
//! travel with each hash and verification never depends on current settings.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Shortest password accepted at signup, reset and admin user creation.
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// OWASP 2024 baseline for Argon2id: 19 MiB, 2 passes, 1 lane.
const MEMORY_COST_KIB: u32 = 19456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;
const OUTPUT_LEN: usize = 32;

fn argon2id() -> Result<Argon2<'static>, PasswordError> {
    let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, Some(OUTPUT_LEN))
        .map_err(|e| PasswordError::HashError(format!("invalid Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password into a self-describing PHC string.
///
/// A fresh random salt is drawn for every call, so hashing the same password
/// twice yields different strings.
///
/// # Arguments
/// * `password` - The plaintext password to hash
///
/// # Returns
/// * `Ok(String)` - PHC-formatted Argon2id hash
/// * `Err(PasswordError::HashError)` - If the hasher could not be built or run
///
/// # Example
/// ```
/// use shared::password::hash_password;
///
/// let hash = hash_password("kennel-door-42").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2id()?
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a password against a stored PHC hash.
///
/// The comparison runs in constant time.
///
/// # Arguments
/// * `password` - The plaintext password supplied at login
/// * `hash` - The PHC string stored for the account
///
/// # Returns
/// * `Ok(true)` - The password matches
/// * `Ok(false)` - The password does not match
/// * `Err(PasswordError::InvalidHashFormat)` - If `hash` is not a PHC string
/// * `Err(PasswordError::VerifyError)` - If verification fails for another reason
///
/// # Example
/// ```
/// use shared::password::{hash_password, verify_password};
///
/// let hash = hash_password("kennel-door-42").unwrap();
/// assert!(verify_password("kennel-door-42", &hash).unwrap());
/// assert!(!verify_password("kennel-door-43", &hash).unwrap());
/// ```
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHashFormat)?;

    // Parameters are read from the hash itself.
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Whether a password is long enough to be accepted.
///
/// Length is counted in characters, not bytes.
///
/// # Arguments
/// * `password` - The candidate password
///
/// # Returns
/// `true` when it has at least [`MIN_PASSWORD_LENGTH`] characters.
///
/// # Example
/// ```
/// use shared::password::meets_length_policy;
///
/// assert!(meets_length_policy("schnauzer"));
/// assert!(!meets_length_policy("pug"));
/// ```
pub fn meets_length_policy(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_uses_argon2id_with_configured_params() {
        let hash = hash_password("walkies-at-noon").unwrap();
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let first = hash_password("same_password").unwrap();
        let second = hash_password("same_password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        let result = verify_password("password", "not-a-phc-string");
        assert!(matches!(result, Err(PasswordError::InvalidHashFormat)));
    }

    #[test]
    fn test_length_policy_counts_characters() {
        assert!(!meets_length_policy("short"));
        assert!(meets_length_policy("exactly8"));
        // 8 multibyte characters
        assert!(meets_length_policy("ééééééééé"));
        assert!(!meets_length_policy("éééé"));
    }
}
