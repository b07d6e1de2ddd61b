//! Household membership queries
//!
//! Households and users are maintained elsewhere; the bills engine only
//! reads them.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Read-only repository over `users` and `households`
#[derive(Debug, Clone)]
pub struct HouseholdRepository {
    pool: PgPool,
}

impl HouseholdRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Household of a user
    ///
    /// Returns `DatabaseError::NotFound` for an unknown user and `Ok(None)`
    /// for a user without a household.
    pub async fn household_of(&self, user_id: Uuid) -> Result<Option<Uuid>, DatabaseError> {
        let row: Option<(Option<Uuid>,)> =
            sqlx::query_as("SELECT household_id FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(DatabaseError::classify)?;

        row.map(|(household_id,)| household_id)
            .ok_or_else(|| DatabaseError::not_found("User", user_id))
    }

    /// Members of a household, ordered by id
    pub async fn list_members(&self, household_id: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
        sqlx::query_scalar("SELECT id FROM users WHERE household_id = $1 ORDER BY id")
            .bind(household_id)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::classify)
    }

    /// Creates a household
    pub async fn create_household(&self, id: Uuid, name: &str) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO households (id, name) VALUES ($1, $2)")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;
        Ok(())
    }

    /// Creates a user, optionally inside a household
    pub async fn create_user(
        &self,
        id: Uuid,
        username: &str,
        household_id: Option<Uuid>,
    ) -> Result<(), DatabaseError> {
        sqlx::query("INSERT INTO users (id, username, household_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(username)
            .bind(household_id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::classify)?;
        Ok(())
    }
}
