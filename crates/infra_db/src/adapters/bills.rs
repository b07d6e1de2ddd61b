//! PostgreSQL Bill Store Adapter
//!
//! Implements the `BillStore` port on top of [`BillRepository`], converting
//! rows to domain types and database errors to port errors.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_bills::BillStore;
//! use infra_db::adapters::PostgresBillStore;
//!
//! let store: Arc<dyn BillStore> = Arc::new(PostgresBillStore::new(pool));
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, BillId, BillSplitId, DomainPort, HealthCheckResult, HealthCheckable,
    HouseholdId, Money, OperationMetadata, PortError, UserId,
};
use domain_bills::{Bill, BillSplit, BillStore, IssuedBill, SplitStatus};

use crate::error::DatabaseError;
use crate::repositories::bills::{
    BillRepository, BillRow, BillSplitRow, NewBill, NewBillSplit, SplitStatus as DbSplitStatus,
};

const ADAPTER_ID: &str = "postgres-bill-store";

/// PostgreSQL-backed implementation of the BillStore port
#[derive(Debug, Clone)]
pub struct PostgresBillStore {
    repository: BillRepository,
    pool: PgPool,
}

impl PostgresBillStore {
    /// Creates a new adapter over the pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: BillRepository::new(pool.clone()),
            pool,
        }
    }
}

impl DomainPort for PostgresBillStore {}

#[async_trait]
impl HealthCheckable for PostgresBillStore {
    /// Runs `SELECT 1` against the pool
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: ADAPTER_ID.to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database error: {}", e)),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl BillStore for PostgresBillStore {
    #[instrument(skip(self, issued, metadata), fields(bill_id = %issued.bill.id, splits = issued.splits.len()))]
    async fn insert_bill(
        &self,
        issued: &IssuedBill,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        if let Some(meta) = &metadata {
            debug!(initiated_by = ?meta.initiated_by, "Inserting bill");
        }

        let bill = &issued.bill;
        let new_bill = NewBill {
            id: *bill.id.as_uuid(),
            name: bill.name.clone(),
            amount: bill.amount.amount(),
            description: bill.description.clone(),
            due_date: bill.due_date,
            household_id: *bill.household_id.as_uuid(),
            created_by: *bill.created_by.as_uuid(),
            created_at: bill.created_at,
        };
        let new_splits: Vec<NewBillSplit> = issued
            .splits
            .iter()
            .map(|split| NewBillSplit {
                id: *split.id.as_uuid(),
                user_id: *split.user_id.as_uuid(),
                split_amount: split.split_amount.amount(),
                status: domain_to_db_status(split.status),
            })
            .collect();

        self.repository
            .insert_with_splits(&new_bill, &new_splits)
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(skip(self), fields(bill_id = %id))]
    async fn find_bill(&self, id: BillId) -> Result<Option<Bill>, PortError> {
        self.repository
            .find_bill(*id.as_uuid())
            .await
            .map_err(db_to_port_error)?
            .map(row_to_bill)
            .transpose()
    }

    #[instrument(skip(self), fields(split_id = %id))]
    async fn find_split(&self, id: BillSplitId) -> Result<Option<BillSplit>, PortError> {
        self.repository
            .find_split(*id.as_uuid())
            .await
            .map_err(db_to_port_error)?
            .map(row_to_split)
            .transpose()
    }

    #[instrument(skip(self, metadata), fields(split_id = %id, from = %from, to = %to))]
    async fn compare_and_set_status(
        &self,
        id: BillSplitId,
        from: SplitStatus,
        to: SplitStatus,
        metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError> {
        let applied = self
            .repository
            .compare_and_set_status(*id.as_uuid(), domain_to_db_status(from), domain_to_db_status(to))
            .await
            .map_err(db_to_port_error)?;

        debug!(
            applied,
            initiated_by = ?metadata.and_then(|m| m.initiated_by),
            "Split status compare-and-set"
        );
        Ok(applied)
    }

    #[instrument(skip(self, metadata), fields(bill_id = %id))]
    async fn delete_bill(
        &self,
        id: BillId,
        metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError> {
        let removed = self
            .repository
            .delete_with_splits(*id.as_uuid())
            .await
            .map_err(db_to_port_error)?;

        debug!(
            removed,
            initiated_by = ?metadata.and_then(|m| m.initiated_by),
            "Bill delete"
        );
        Ok(removed)
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn find_bills_for_user(&self, user: UserId) -> Result<Vec<Bill>, PortError> {
        self.repository
            .find_bills_for_user(*user.as_uuid())
            .await
            .map_err(db_to_port_error)?
            .into_iter()
            .map(row_to_bill)
            .collect()
    }

    #[instrument(skip(self), fields(bill_id = %bill))]
    async fn find_splits_for_bill(&self, bill: BillId) -> Result<Vec<BillSplit>, PortError> {
        self.repository
            .find_splits_for_bill(*bill.as_uuid())
            .await
            .map_err(db_to_port_error)?
            .into_iter()
            .map(row_to_split)
            .collect()
    }

    #[instrument(skip(self), fields(user_id = %user))]
    async fn find_splits_for_user(&self, user: UserId) -> Result<Vec<BillSplit>, PortError> {
        self.repository
            .find_splits_for_user(*user.as_uuid())
            .await
            .map_err(db_to_port_error)?
            .into_iter()
            .map(row_to_split)
            .collect()
    }
}

// =============================================================================
// Conversion Functions
// =============================================================================

/// Converts a database error to a port error
pub(crate) fn db_to_port_error(e: DatabaseError) -> PortError {
    match e {
        DatabaseError::NotFound(message) => PortError::NotFound {
            entity_type: "row".to_string(),
            id: message,
        },
        DatabaseError::DuplicateEntry(message)
        | DatabaseError::ForeignKeyViolation(message) => PortError::Conflict { message },
        DatabaseError::ConstraintViolation(message) => PortError::Validation {
            message,
            field: None,
        },
        DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted => PortError::Connection {
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
        _ => PortError::Internal {
            message: e.to_string(),
            source: Some(Box::new(e)),
        },
    }
}

fn row_to_bill(row: BillRow) -> Result<Bill, PortError> {
    let amount = Money::try_new(row.amount).map_err(|e| {
        db_to_port_error(DatabaseError::CorruptRow(format!("bill {}: {}", row.id, e)))
    })?;

    Ok(Bill {
        id: BillId::from_uuid(row.id),
        name: row.name,
        amount,
        description: row.description,
        due_date: row.due_date,
        household_id: HouseholdId::from_uuid(row.household_id),
        created_by: UserId::from_uuid(row.created_by),
        created_at: row.created_at,
    })
}

fn row_to_split(row: BillSplitRow) -> Result<BillSplit, PortError> {
    let split_amount = Money::try_new(row.split_amount).map_err(|e| {
        db_to_port_error(DatabaseError::CorruptRow(format!("bill split {}: {}", row.id, e)))
    })?;

    Ok(BillSplit {
        id: BillSplitId::from_uuid(row.id),
        bill_id: BillId::from_uuid(row.bill_id),
        user_id: UserId::from_uuid(row.user_id),
        split_amount,
        status: db_to_domain_status(row.status),
    })
}

fn db_to_domain_status(s: DbSplitStatus) -> SplitStatus {
    match s {
        DbSplitStatus::Unpaid => SplitStatus::Unpaid,
        DbSplitStatus::PendingApproval => SplitStatus::PendingApproval,
        DbSplitStatus::Paid => SplitStatus::Paid,
    }
}

fn domain_to_db_status(s: SplitStatus) -> DbSplitStatus {
    match s {
        SplitStatus::Unpaid => DbSplitStatus::Unpaid,
        SplitStatus::PendingApproval => DbSplitStatus::PendingApproval,
        SplitStatus::Paid => DbSplitStatus::Paid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_status_conversion_roundtrip() {
        for status in SplitStatus::ALL {
            assert_eq!(db_to_domain_status(domain_to_db_status(status)), status);
        }
    }

    #[test]
    fn test_row_to_split() {
        let row = BillSplitRow {
            id: Uuid::now_v7(),
            bill_id: Uuid::now_v7(),
            user_id: Uuid::new_v4(),
            split_amount: dec!(33.33),
            status: DbSplitStatus::PendingApproval,
        };

        let split = row_to_split(row.clone()).unwrap();
        assert_eq!(*split.id.as_uuid(), row.id);
        assert_eq!(split.split_amount.amount(), dec!(33.33));
        assert_eq!(split.status, SplitStatus::PendingApproval);
    }

    #[test]
    fn test_corrupt_amount_is_internal_error() {
        let row = BillRow {
            id: Uuid::now_v7(),
            name: "Rent".to_string(),
            amount: dec!(1.005),
            description: None,
            due_date: None,
            household_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
        };

        assert!(matches!(row_to_bill(row), Err(PortError::Internal { .. })));
    }

    #[test]
    fn test_error_mapping() {
        assert!(db_to_port_error(DatabaseError::PoolExhausted).is_transient());
        assert!(matches!(
            db_to_port_error(DatabaseError::duplicate("BillSplit", "id", "x")),
            PortError::Conflict { .. }
        ));
        assert!(db_to_port_error(DatabaseError::not_found("User", "u")).is_not_found());
    }
}
