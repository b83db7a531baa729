//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Role, User};
use sqlx::FromRow;
use uuid::Uuid;

/// Postgres `user_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRoleDb {
    Customer,
    Staff,
    Manager,
    Admin,
}

impl From<UserRoleDb> for Role {
    fn from(db_role: UserRoleDb) -> Self {
        match db_role {
            UserRoleDb::Customer => Role::Customer,
            UserRoleDb::Staff => Role::Staff,
            UserRoleDb::Manager => Role::Manager,
            UserRoleDb::Admin => Role::Admin,
        }
    }
}

impl From<Role> for UserRoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Customer => UserRoleDb::Customer,
            Role::Staff => UserRoleDb::Staff,
            Role::Manager => UserRoleDb::Manager,
            Role::Admin => UserRoleDb::Admin,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRoleDb,
    pub staff_level: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            email: entity.email,
            password_hash: entity.password_hash,
            role: entity.role.into(),
            staff_level: entity.staff_level,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
