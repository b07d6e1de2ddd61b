//! PostgreSQL Household Directory Adapter

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use core_kernel::{DomainPort, HouseholdId, PortError, UserId};
use domain_bills::HouseholdDirectory;

use crate::adapters::bills::db_to_port_error;
use crate::error::DatabaseError;
use crate::repositories::households::HouseholdRepository;

/// Reads household membership from the `users` table
#[derive(Debug, Clone)]
pub struct PostgresHouseholdDirectory {
    repository: HouseholdRepository,
}

impl PostgresHouseholdDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: HouseholdRepository::new(pool),
        }
    }
}

impl DomainPort for PostgresHouseholdDirectory {}

#[async_trait]
impl HouseholdDirectory for PostgresHouseholdDirectory {
    #[instrument(skip(self), fields(user_id = %user))]
    async fn household_of(&self, user: UserId) -> Result<Option<HouseholdId>, PortError> {
        match self.repository.household_of(*user.as_uuid()).await {
            Ok(household) => Ok(household.map(HouseholdId::from_uuid)),
            Err(DatabaseError::NotFound(_)) => Err(PortError::not_found("User", user)),
            Err(e) => Err(db_to_port_error(e)),
        }
    }

    #[instrument(skip(self), fields(household_id = %household))]
    async fn list_members(&self, household: HouseholdId) -> Result<Vec<UserId>, PortError> {
        Ok(self
            .repository
            .list_members(*household.as_uuid())
            .await
            .map_err(db_to_port_error)?
            .into_iter()
            .map(UserId::from_uuid)
            .collect())
    }
}
