//! Creates the first ADMIN account at startup.

use domain::models::{user::normalize_email, Role};
use persistence::repositories::UserRepository;
use shared::password::{hash_password, meets_length_policy, PasswordError, MIN_PASSWORD_LENGTH};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminBootstrapConfig;

#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] PasswordError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// What [`bootstrap_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    NotConfigured,
    AlreadyExists,
    Created,
}

/// Idempotent: does nothing when the account already exists.
pub async fn bootstrap_admin(
    pool: &PgPool,
    config: &AdminBootstrapConfig,
) -> Result<BootstrapOutcome, BootstrapError> {
    if config.bootstrap_email.is_empty() {
        return Ok(BootstrapOutcome::NotConfigured);
    }

    if config.bootstrap_password.is_empty() {
        warn!("PB__ADMIN__BOOTSTRAP_EMAIL is set but PB__ADMIN__BOOTSTRAP_PASSWORD is empty, skipping bootstrap");
        return Ok(BootstrapOutcome::NotConfigured);
    }

    if !meets_length_policy(&config.bootstrap_password) {
        return Err(BootstrapError::Config(format!(
            "bootstrap password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let email = normalize_email(&config.bootstrap_email);
    let users = UserRepository::new(pool.clone());

    if users.find_by_email(&email).await?.is_some() {
        info!(email = %email, "Bootstrap admin already exists, skipping");
        return Ok(BootstrapOutcome::AlreadyExists);
    }

    let password_hash = hash_password(&config.bootstrap_password)?;
    let created = match users
        .create("Administrator", &email, &password_hash, Role::Admin, None)
        .await
    {
        Ok(user) => user,
        // Another instance won the race.
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Ok(BootstrapOutcome::AlreadyExists)
        }
        Err(e) => return Err(e.into()),
    };

    info!(email = %email, user_id = %created.id, "Bootstrap admin created");
    warn!("Remove PB__ADMIN__BOOTSTRAP_PASSWORD from the environment once the admin has signed in");

    Ok(BootstrapOutcome::Created)
}
