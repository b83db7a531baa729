//! Pet repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PetEntity, PetWithOwnerEntity};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct PetRepository {
    pool: PgPool,
}

impl PetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a pet. An unknown owner surfaces as a foreign key violation.
    pub async fn create(
        &self,
        name: &str,
        pet_type: &str,
        breed: &str,
        age: i32,
        owner_id: Uuid,
    ) -> Result<PetEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_pet");
        let result = sqlx::query_as::<_, PetEntity>(
            r#"
            INSERT INTO pets (name, pet_type, breed, age, owner_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, pet_type, breed, age, owner_id, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(pet_type)
        .bind(breed)
        .bind(age)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_pet_by_id");
        let result = sqlx::query_as::<_, PetEntity>(
            r#"
            SELECT id, name, pet_type, breed, age, owner_id, created_at, updated_at
            FROM pets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        pet_type: Option<&str>,
        breed: Option<&str>,
        age: Option<i32>,
    ) -> Result<Option<PetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_pet");
        let result = sqlx::query_as::<_, PetEntity>(
            r#"
            UPDATE pets
            SET name = COALESCE($2, name),
                pet_type = COALESCE($3, pet_type),
                breed = COALESCE($4, breed),
                age = COALESCE($5, age),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, pet_type, breed, age, owner_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(pet_type)
        .bind(breed)
        .bind(age)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Returns whether a row was removed. Fails with a foreign key
    /// violation while bookings still reference the pet.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_pet");
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected() > 0)
    }

    pub async fn list_with_owners(&self) -> Result<Vec<PetWithOwnerEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pets_with_owners");
        let result = sqlx::query_as::<_, PetWithOwnerEntity>(
            r#"
            SELECT p.id, p.name, p.pet_type, p.breed, p.age, p.owner_id, p.created_at, p.updated_at,
                   u.email AS owner_email
            FROM pets p
            JOIN users u ON u.id = p.owner_id
            ORDER BY p.created_at, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<PetEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_pets_by_owner");
        let result = sqlx::query_as::<_, PetEntity>(
            r#"
            SELECT id, name, pet_type, breed, age, owner_id, created_at, updated_at
            FROM pets
            WHERE owner_id = $1
            ORDER BY created_at, name
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
