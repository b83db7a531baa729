//! Signup, login and the password reset flow.

use chrono::Utc;
use domain::models::{
    password_reset::PasswordReset,
    user::{normalize_email, LoginResponse, UserResponse},
    Role, User,
};
use persistence::repositories::{PasswordResetRepository, UserRepository};
use shared::crypto::{generate_reset_token, sha256_hex};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::services::email::EmailService;

/// Reply to every forgot-password request, whether or not the account exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists with this email, you will receive a password reset link";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired reset token")]
    InvalidResetToken,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthError::InvalidResetToken => ApiError::InvalidToken(err.to_string()),
            AuthError::Database(e) => e.into(),
            AuthError::Token(e) => ApiError::Internal(e.to_string()),
            AuthError::Password(e) => ApiError::Internal(e.to_string()),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub struct AuthService {
    users: UserRepository,
    resets: PasswordResetRepository,
    jwt: Arc<JwtConfig>,
    email: EmailService,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>, email: EmailService) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            resets: PasswordResetRepository::new(pool),
            jwt,
            email,
        }
    }

    /// Creates a CUSTOMER account. Input must already be validated.
    pub async fn sign_up(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserResponse, AuthError> {
        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(name.trim(), &email, &password_hash, Role::Customer, None)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::EmailAlreadyExists
                } else {
                    AuthError::Database(e)
                }
            })?;

        info!(user_id = %user.id, "User signed up");
        Ok(User::from(user).into())
    }

    /// Wrong email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user: User = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?
            .into();

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let issued = self.jwt.issue(user.id, user.role.as_str())?;
        debug!(user_id = %user.id, jti = %issued.jti, "Access token issued");

        Ok(LoginResponse {
            access_token: issued.token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user: user.into(),
        })
    }

    /// Stores a hashed one-hour token and mails the raw one.
    ///
    /// Never fails: unknown emails, storage errors and mail errors are all
    /// logged and swallowed so the response cannot reveal whether an
    /// account exists.
    pub async fn forgot_password(&self, email: &str) {
        let email = normalize_email(email);

        let user = match self.users.find_by_email(&email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                debug!("Password reset requested for unknown email");
                return;
            }
            Err(e) => {
                warn!(error = %e, "Password reset lookup failed");
                return;
            }
        };

        let token = generate_reset_token();
        let expires_at = PasswordReset::expiry_from(Utc::now());

        if let Err(e) = self
            .resets
            .create(user.id, &sha256_hex(&token), expires_at)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Failed to store password reset token");
            return;
        }

        info!(user_id = %user.id, "Password reset token generated");

        if let Err(e) = self
            .email
            .send_password_reset_email(&user.email, Some(&user.name), &token)
            .await
        {
            warn!(user_id = %user.id, error = %e, "Failed to send password reset email");
        }
    }

    /// Sets a new password and burns the token in one transaction.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        let password_hash = hash_password(new_password)?;

        let user_id = self
            .resets
            .consume(&sha256_hex(token), &password_hash, Utc::now())
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        info!(user_id = %user_id, "Password reset completed");
        Ok(())
    }
}
