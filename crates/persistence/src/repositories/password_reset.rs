//! Password reset repository.

use chrono::{DateTime, Utc};
use domain::models::PasswordReset;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::PasswordResetEntity;
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct PasswordResetRepository {
    pool: PgPool,
}

impl PasswordResetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_password_reset");
        let result = sqlx::query_as::<_, PasswordResetEntity>(
            r#"
            INSERT INTO password_resets (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, used, created_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Atomically sets the user's new password hash and burns the token.
    ///
    /// Returns the user id, or `None` when the token is unknown, used or
    /// expired at `now`. The token row is locked for the duration so two
    /// concurrent resets cannot both succeed.
    pub async fn consume(
        &self,
        token_hash: &str,
        new_password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let timer = QueryTimer::new("consume_password_reset");
        let mut tx = self.pool.begin().await?;

        let reset = sqlx::query_as::<_, PasswordResetEntity>(
            r#"
            SELECT id, user_id, token_hash, expires_at, used, created_at
            FROM password_resets
            WHERE token_hash = $1
            FOR UPDATE
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .map(PasswordReset::from);

        let Some(reset) = reset.filter(|r| r.is_usable_at(now)) else {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        };

        sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
            .bind(reset.user_id)
            .bind(new_password_hash)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE password_resets SET used = TRUE WHERE id = $1")
            .bind(reset.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(Some(reset.user_id))
    }
}
