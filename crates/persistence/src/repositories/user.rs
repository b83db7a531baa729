//! User repository for database operations.

use domain::models::Role;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, role, staff_level, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Looks up by the normalised (lower-case) email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, role, staff_level, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Current role only; used on every authenticated request.
    pub async fn find_role(&self, id: Uuid) -> Result<Option<UserRoleDb>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_role");
        let result = sqlx::query_scalar::<_, UserRoleDb>("SELECT role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Inserts a user. A duplicate email surfaces as a unique violation.
    pub async fn create(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        staff_level: Option<i32>,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            INSERT INTO users (name, email, password_hash, role, staff_level)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, role, staff_level, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(UserRoleDb::from(role))
        .bind(staff_level)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Patches the provided fields and leaves the rest untouched.
    pub async fn update(
        &self,
        id: Uuid,
        email: Option<&str>,
        role: Option<Role>,
        staff_level: Option<i32>,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_user");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                role = COALESCE($3, role),
                staff_level = COALESCE($4, staff_level),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, password_hash, role, staff_level, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(role.map(UserRoleDb::from))
        .bind(staff_level)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_all(&self) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, name, email, password_hash, role, staff_level, created_at, updated_at
            FROM users
            ORDER BY created_at, email
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether the user still owns pets or has requested bookings.
    pub async fn has_dependents(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("user_has_dependents");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM pets WHERE owner_id = $1)
                OR EXISTS (SELECT 1 FROM bookings WHERE user_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns whether a row was removed. Password resets cascade.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
