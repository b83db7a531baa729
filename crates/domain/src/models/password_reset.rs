//! Password reset tokens.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

/// Lifetime of a reset token.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// A stored reset request. Only the SHA-256 of the token is kept.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl PasswordReset {
    /// Expiry for a token issued at `issued_at`.
    pub fn expiry_from(issued_at: DateTime<Utc>) -> DateTime<Utc> {
        issued_at + Duration::minutes(RESET_TOKEN_TTL_MINUTES)
    }

    /// A token is usable while unused and strictly before its expiry.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.used && now < self.expires_at
    }
}
