//! Password reset entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::PasswordReset;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl From<PasswordResetEntity> for PasswordReset {
    fn from(entity: PasswordResetEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            token_hash: entity.token_hash,
            expires_at: entity.expires_at,
            used: entity.used,
            created_at: entity.created_at,
        }
    }
}
