//! Bills Domain Ports
//!
//! The settlement service talks to persistence through two ports:
//!
//! - [`BillStore`]: bills and their splits, with an atomic status
//!   compare-and-set used to serialise concurrent settle/approve calls
//! - [`HouseholdDirectory`]: read-only view of users and household membership
//!
//! PostgreSQL adapters live in `infra_db`; in-memory adapters are in
//! [`mock`] behind the `mock` feature.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_bills::{SettlementService, ports::mock::{MockBillStore, MockHouseholdDirectory}};
//!
//! let service = SettlementService::new(
//!     Arc::new(MockBillStore::new()),
//!     Arc::new(MockHouseholdDirectory::new()),
//! );
//! ```

use async_trait::async_trait;

use core_kernel::{
    BillId, BillSplitId, DomainPort, HealthCheckable, HouseholdId, OperationMetadata, PortError,
    UserId,
};

use crate::bill::{Bill, IssuedBill};
use crate::split::{BillSplit, SplitStatus};

/// Persistence port for bills and splits
#[async_trait]
pub trait BillStore: DomainPort + HealthCheckable {
    /// Persists a bill and all of its splits atomically
    ///
    /// Either every row is written or none is.
    async fn insert_bill(
        &self,
        issued: &IssuedBill,
        metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError>;

    /// Loads a bill by id
    async fn find_bill(&self, id: BillId) -> Result<Option<Bill>, PortError>;

    /// Loads a split by id
    async fn find_split(&self, id: BillSplitId) -> Result<Option<BillSplit>, PortError>;

    /// Sets the status of a split to `to` only if it is currently `from`
    ///
    /// Returns `false` when the split is missing or its status has moved on.
    /// Of two concurrent calls with the same `from`, at most one returns
    /// `true`.
    async fn compare_and_set_status(
        &self,
        id: BillSplitId,
        from: SplitStatus,
        to: SplitStatus,
        metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError>;

    /// Deletes a bill and its splits atomically
    ///
    /// Returns `false` if the bill did not exist.
    async fn delete_bill(
        &self,
        id: BillId,
        metadata: Option<OperationMetadata>,
    ) -> Result<bool, PortError>;

    /// Bills the user created or owes a split of, newest first, without
    /// duplicates
    async fn find_bills_for_user(&self, user: UserId) -> Result<Vec<Bill>, PortError>;

    /// Splits of a bill in the order they were created
    async fn find_splits_for_bill(&self, bill: BillId) -> Result<Vec<BillSplit>, PortError>;

    /// Splits owed by a user, newest bill first
    async fn find_splits_for_user(&self, user: UserId) -> Result<Vec<BillSplit>, PortError>;
}

/// Read-only access to household membership
#[async_trait]
pub trait HouseholdDirectory: DomainPort {
    /// Household the user belongs to, if any
    ///
    /// Unknown users are reported as `NotFound`.
    async fn household_of(&self, user: UserId) -> Result<Option<HouseholdId>, PortError>;

    /// Current members of a household
    async fn list_members(&self, household: HouseholdId) -> Result<Vec<UserId>, PortError>;
}

/// In-memory adapters for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use chrono::Utc;
    use tokio::sync::RwLock;

    use core_kernel::{AdapterHealth, HealthCheckResult};

    #[derive(Debug, Default)]
    struct Tables {
        bills: HashMap<BillId, Bill>,
        /// Splits in insertion order
        splits: Vec<BillSplit>,
    }

    /// In-memory mock implementation of BillStore
    ///
    /// Bills and splits share one lock so status changes are atomic.
    #[derive(Debug, Default)]
    pub struct MockBillStore {
        tables: Arc<RwLock<Tables>>,
        fail_writes: AtomicBool,
    }

    impl MockBillStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent write fail with a connection error
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Number of stored bills
        pub async fn bill_count(&self) -> usize {
            self.tables.read().await.bills.len()
        }

        /// Number of stored splits
        pub async fn split_count(&self) -> usize {
            self.tables.read().await.splits.len()
        }

        fn check_writable(&self) -> Result<(), PortError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(PortError::connection("mock store is failing writes"));
            }
            Ok(())
        }
    }

    impl DomainPort for MockBillStore {}

    #[async_trait]
    impl HealthCheckable for MockBillStore {
        async fn health_check(&self) -> HealthCheckResult {
            let failing = self.fail_writes.load(Ordering::SeqCst);
            HealthCheckResult {
                adapter_id: "mock-bill-store".to_string(),
                status: if failing {
                    AdapterHealth::Degraded
                } else {
                    AdapterHealth::Healthy
                },
                latency_ms: 0,
                message: Some("In-memory store".to_string()),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl BillStore for MockBillStore {
        async fn insert_bill(
            &self,
            issued: &IssuedBill,
            _metadata: Option<OperationMetadata>,
        ) -> Result<(), PortError> {
            self.check_writable()?;
            let mut tables = self.tables.write().await;
            if tables.bills.contains_key(&issued.bill.id) {
                return Err(PortError::conflict(format!(
                    "Bill {} already exists",
                    issued.bill.id
                )));
            }
            tables.bills.insert(issued.bill.id, issued.bill.clone());
            tables.splits.extend(issued.splits.iter().cloned());
            Ok(())
        }

        async fn find_bill(&self, id: BillId) -> Result<Option<Bill>, PortError> {
            Ok(self.tables.read().await.bills.get(&id).cloned())
        }

        async fn find_split(&self, id: BillSplitId) -> Result<Option<BillSplit>, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .splits
                .iter()
                .find(|s| s.id == id)
                .cloned())
        }

        async fn compare_and_set_status(
            &self,
            id: BillSplitId,
            from: SplitStatus,
            to: SplitStatus,
            _metadata: Option<OperationMetadata>,
        ) -> Result<bool, PortError> {
            self.check_writable()?;
            let mut tables = self.tables.write().await;
            match tables.splits.iter_mut().find(|s| s.id == id) {
                Some(split) if split.status == from => {
                    split.status = to;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn delete_bill(
            &self,
            id: BillId,
            _metadata: Option<OperationMetadata>,
        ) -> Result<bool, PortError> {
            self.check_writable()?;
            let mut tables = self.tables.write().await;
            tables.splits.retain(|s| s.bill_id != id);
            Ok(tables.bills.remove(&id).is_some())
        }

        async fn find_bills_for_user(&self, user: UserId) -> Result<Vec<Bill>, PortError> {
            let tables = self.tables.read().await;
            let mut bills: Vec<Bill> = tables
                .bills
                .values()
                .filter(|b| b.involves(user, &tables.splits))
                .cloned()
                .collect();
            bills.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(bills)
        }

        async fn find_splits_for_bill(&self, bill: BillId) -> Result<Vec<BillSplit>, PortError> {
            Ok(self
                .tables
                .read()
                .await
                .splits
                .iter()
                .filter(|s| s.bill_id == bill)
                .cloned()
                .collect())
        }

        async fn find_splits_for_user(&self, user: UserId) -> Result<Vec<BillSplit>, PortError> {
            let tables = self.tables.read().await;
            let mut splits: Vec<BillSplit> = tables
                .splits
                .iter()
                .filter(|s| s.user_id == user)
                .cloned()
                .collect();
            splits.sort_by(|a, b| {
                let created = |s: &BillSplit| tables.bills.get(&s.bill_id).map(|b| b.created_at);
                created(b).cmp(&created(a)).then(b.id.cmp(&a.id))
            });
            Ok(splits)
        }
    }

    /// In-memory mock implementation of HouseholdDirectory
    #[derive(Debug, Default)]
    pub struct MockHouseholdDirectory {
        /// user -> household (None for users without one)
        users: Arc<RwLock<Vec<(UserId, Option<HouseholdId>)>>>,
    }

    impl MockHouseholdDirectory {
        /// Creates an empty directory
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a household with `size` fresh members
        pub async fn with_household(size: usize) -> (Self, HouseholdId, Vec<UserId>) {
            let directory = Self::new();
            let household = HouseholdId::new();
            let mut members = Vec::with_capacity(size);
            for _ in 0..size {
                let user = UserId::new();
                directory.add_user(user, Some(household)).await;
                members.push(user);
            }
            (directory, household, members)
        }

        /// Registers a user, optionally as a household member
        pub async fn add_user(&self, user: UserId, household: Option<HouseholdId>) {
            let mut users = self.users.write().await;
            match users.iter_mut().find(|(id, _)| *id == user) {
                Some(entry) => entry.1 = household,
                None => users.push((user, household)),
            }
        }
    }

    impl DomainPort for MockHouseholdDirectory {}

    #[async_trait]
    impl HouseholdDirectory for MockHouseholdDirectory {
        async fn household_of(&self, user: UserId) -> Result<Option<HouseholdId>, PortError> {
            self.users
                .read()
                .await
                .iter()
                .find(|(id, _)| *id == user)
                .map(|(_, household)| *household)
                .ok_or_else(|| PortError::not_found("User", user))
        }

        async fn list_members(&self, household: HouseholdId) -> Result<Vec<UserId>, PortError> {
            Ok(self
                .users
                .read()
                .await
                .iter()
                .filter(|(_, h)| *h == Some(household))
                .map(|(id, _)| *id)
                .collect())
        }
    }
}
