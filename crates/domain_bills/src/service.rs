//! Settlement service
//!
//! Public entry point of the bills engine. Composes the allocator, the bill
//! aggregate and the split ledger over the [`BillStore`] and
//! [`HouseholdDirectory`] ports. Every call takes the acting user explicitly.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use core_kernel::{BillId, BillSplitId, OperationMetadata, UserId};

use crate::bill::{Bill, BillDraft, BillSummary, IssuedBill, ObligorSelection};
use crate::error::BillingError;
use crate::ports::{BillStore, HouseholdDirectory};
use crate::split::{BillSplit, SplitTransition};

/// Orchestrates bill creation, settlement and approval
#[derive(Clone)]
pub struct SettlementService {
    bills: Arc<dyn BillStore>,
    households: Arc<dyn HouseholdDirectory>,
}

impl SettlementService {
    /// Creates a service over the given ports
    pub fn new(bills: Arc<dyn BillStore>, households: Arc<dyn HouseholdDirectory>) -> Self {
        Self { bills, households }
    }

    /// The bill store, for health reporting
    pub fn store(&self) -> &Arc<dyn BillStore> {
        &self.bills
    }

    /// Creates a bill in the actor's household and splits it among obligors
    ///
    /// # Errors
    ///
    /// * `Validation` for a malformed draft (checked before any lookup)
    /// * `NoHousehold` if the actor has no household or is unknown to the
    ///   directory
    /// * `NoObligors` if no household member remains after resolving `selection`
    /// * `Storage` if a port fails; nothing is persisted in that case
    #[instrument(skip(self, draft, selection), fields(actor = %actor))]
    pub async fn create_bill(
        &self,
        actor: UserId,
        draft: BillDraft,
        selection: ObligorSelection,
    ) -> Result<IssuedBill, BillingError> {
        draft.validate()?;

        // an actor the directory does not know has no household either
        let household = match self.households.household_of(actor).await {
            Ok(Some(household)) => household,
            Ok(None) => return Err(BillingError::NoHousehold(actor)),
            Err(e) if e.is_not_found() => {
                warn!(error = %e, "Actor unknown to the household directory");
                return Err(BillingError::NoHousehold(actor));
            }
            Err(e) => return Err(e.into()),
        };

        let members = self.households.list_members(household).await?;
        let obligors = selection.resolve(&members);
        if obligors.is_empty() {
            warn!(household = %household, "No obligors resolved for new bill");
            return Err(BillingError::NoObligors);
        }

        let issued = Bill::issue(draft, household, actor, &obligors)?;
        self.bills
            .insert_bill(&issued, Some(metadata(actor, "create_bill")))
            .await?;

        info!(
            bill_id = %issued.bill.id,
            household = %household,
            splits = issued.splits.len(),
            "Bill created"
        );
        Ok(issued)
    }

    /// Obligor declares their share paid (`UNPAID` → `PENDING_APPROVAL`)
    ///
    /// # Errors
    ///
    /// * `ObligationNotFound` if the split does not exist
    /// * `NotObligor` if `actor` does not owe the split
    /// * `InvalidState` if the split is not `UNPAID`, including when a
    ///   concurrent call got there first
    #[instrument(skip(self), fields(actor = %actor, split_id = %split_id))]
    pub async fn settle(&self, actor: UserId, split_id: BillSplitId) -> Result<BillSplit, BillingError> {
        let mut split = self.load_split(split_id).await?;

        let transition = split.settle(actor).map_err(|e| {
            warn!(error = %e, "Settle rejected");
            e
        })?;
        self.apply(actor, transition, "settle").await?;

        info!(bill_id = %split.bill_id, "Split settled, awaiting approval");
        Ok(split)
    }

    /// Bill creator confirms a settled share (`PENDING_APPROVAL` → `PAID`)
    ///
    /// # Errors
    ///
    /// * `ObligationNotFound` if the split does not exist
    /// * `BillNotFound` if its bill is gone
    /// * `NotCreator` if `actor` did not create the bill
    /// * `InvalidState` if the split is not `PENDING_APPROVAL`
    #[instrument(skip(self), fields(actor = %actor, split_id = %split_id))]
    pub async fn approve(&self, actor: UserId, split_id: BillSplitId) -> Result<BillSplit, BillingError> {
        let mut split = self.load_split(split_id).await?;
        let bill = self.get_bill(split.bill_id).await?;

        let transition = split.approve(&bill, actor).map_err(|e| {
            warn!(error = %e, "Approve rejected");
            e
        })?;
        self.apply(actor, transition, "approve").await?;

        info!(bill_id = %bill.id, "Split approved");
        Ok(split)
    }

    /// Deletes a bill and all of its splits
    ///
    /// Deleting a bill that does not exist succeeds without changes.
    #[instrument(skip(self), fields(actor = %actor, bill_id = %bill_id))]
    pub async fn delete_bill(&self, actor: UserId, bill_id: BillId) -> Result<(), BillingError> {
        let removed = self
            .bills
            .delete_bill(bill_id, Some(metadata(actor, "delete_bill")))
            .await?;

        if removed {
            info!("Bill deleted");
        } else {
            info!("Bill already absent, nothing deleted");
        }
        Ok(())
    }

    /// Loads a bill
    ///
    /// # Errors
    ///
    /// `BillNotFound` if it does not exist
    pub async fn get_bill(&self, bill_id: BillId) -> Result<Bill, BillingError> {
        self.bills
            .find_bill(bill_id)
            .await?
            .ok_or(BillingError::BillNotFound(bill_id))
    }

    /// Settlement progress of a bill
    pub async fn bill_summary(&self, bill_id: BillId) -> Result<BillSummary, BillingError> {
        let bill = self.get_bill(bill_id).await?;
        let splits = self.bills.find_splits_for_bill(bill_id).await?;
        Ok(BillSummary::new(&bill, &splits))
    }

    /// Bills the user created or owes a share of, newest first
    pub async fn list_bills_for_user(&self, user: UserId) -> Result<Vec<Bill>, BillingError> {
        Ok(self.bills.find_bills_for_user(user).await?)
    }

    /// Splits of a bill; empty for unknown or deleted bills
    pub async fn list_splits_for_bill(&self, bill_id: BillId) -> Result<Vec<BillSplit>, BillingError> {
        Ok(self.bills.find_splits_for_bill(bill_id).await?)
    }

    /// Splits owed by the user across all bills
    pub async fn list_splits_for_user(&self, user: UserId) -> Result<Vec<BillSplit>, BillingError> {
        Ok(self.bills.find_splits_for_user(user).await?)
    }

    async fn load_split(&self, split_id: BillSplitId) -> Result<BillSplit, BillingError> {
        self.bills
            .find_split(split_id)
            .await?
            .ok_or(BillingError::ObligationNotFound(split_id))
    }

    /// Writes a checked transition; a lost race is reported with the status
    /// the winner left behind
    async fn apply(
        &self,
        actor: UserId,
        transition: SplitTransition,
        operation: &str,
    ) -> Result<(), BillingError> {
        let applied = self
            .bills
            .compare_and_set_status(
                transition.split_id,
                transition.from,
                transition.to,
                Some(metadata(actor, operation)),
            )
            .await?;
        if applied {
            return Ok(());
        }

        let current = self.load_split(transition.split_id).await?;
        warn!(
            expected = %transition.from,
            observed = %current.status,
            "Split changed concurrently"
        );
        Err(BillingError::InvalidState {
            from: current.status,
            to: transition.to,
        })
    }
}

fn metadata(actor: UserId, operation: &str) -> OperationMetadata {
    OperationMetadata::default()
        .initiated_by(actor)
        .with_context("operation", operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::mock::{MockBillStore, MockHouseholdDirectory};
    use crate::split::SplitStatus;
    use core_kernel::HouseholdId;
    use rust_decimal_macros::dec;

    struct Harness {
        service: SettlementService,
        store: Arc<MockBillStore>,
        directory: Arc<MockHouseholdDirectory>,
        members: Vec<UserId>,
    }

    async fn harness(size: usize) -> Harness {
        let (directory, _household, members) = MockHouseholdDirectory::with_household(size).await;
        let store = Arc::new(MockBillStore::new());
        let directory = Arc::new(directory);
        let service = SettlementService::new(store.clone(), directory.clone());
        Harness {
            service,
            store,
            directory,
            members,
        }
    }

    fn rent() -> BillDraft {
        BillDraft::new("Rent", dec!(100.00))
    }

    #[tokio::test]
    async fn test_scenario_a_settle_and_approve() {
        let h = harness(3).await;
        let (a, b) = (h.members[0], h.members[1]);

        let issued = h
            .service
            .create_bill(a, rent(), ObligorSelection::SplitEqually)
            .await
            .unwrap();

        assert_eq!(issued.splits.len(), 3);
        for split in &issued.splits {
            assert_eq!(split.split_amount.amount(), dec!(33.33));
            assert_eq!(split.status, SplitStatus::Unpaid);
        }

        let b_split = issued.splits.iter().find(|s| s.user_id == b).unwrap();
        let settled = h.service.settle(b, b_split.id).await.unwrap();
        assert_eq!(settled.status, SplitStatus::PendingApproval);

        let approved = h.service.approve(a, b_split.id).await.unwrap();
        assert_eq!(approved.status, SplitStatus::Paid);

        let splits = h.service.list_splits_for_bill(issued.bill.id).await.unwrap();
        for split in splits {
            let expected = if split.user_id == b { SplitStatus::Paid } else { SplitStatus::Unpaid };
            assert_eq!(split.status, expected);
        }
    }

    #[tokio::test]
    async fn test_scenario_b_selected_obligors_only() {
        let h = harness(4).await;
        let (a, b, c) = (h.members[0], h.members[1], h.members[2]);

        let issued = h
            .service
            .create_bill(a, BillDraft::new("Pizza", dec!(50.00)), ObligorSelection::Selected(vec![b, c]))
            .await
            .unwrap();

        assert_eq!(issued.splits.len(), 2);
        assert!(issued.splits.iter().all(|s| s.split_amount.amount() == dec!(25.00)));
        assert!(issued.splits.iter().all(|s| s.user_id != a));

        let result = h.service.settle(a, issued.splits[0].id).await;
        assert!(matches!(result, Err(BillingError::NotObligor { .. })));
    }

    #[tokio::test]
    async fn test_scenario_c_delete_cascades() {
        let h = harness(3).await;
        let issued = h
            .service
            .create_bill(h.members[0], rent(), ObligorSelection::SplitEqually)
            .await
            .unwrap();

        h.service.delete_bill(h.members[0], issued.bill.id).await.unwrap();

        assert!(h.service.list_splits_for_bill(issued.bill.id).await.unwrap().is_empty());
        assert!(matches!(
            h.service.get_bill(issued.bill.id).await,
            Err(BillingError::BillNotFound(_))
        ));
        assert_eq!(h.store.split_count().await, 0);
    }

    #[tokio::test]
    async fn test_delete_missing_bill_is_noop() {
        let h = harness(1).await;
        h.service.delete_bill(h.members[0], BillId::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_double_settle_is_invalid_state() {
        let h = harness(2).await;
        let (a, b) = (h.members[0], h.members[1]);
        let issued = h
            .service
            .create_bill(a, rent(), ObligorSelection::Selected(vec![b]))
            .await
            .unwrap();
        let split_id = issued.splits[0].id;

        h.service.settle(b, split_id).await.unwrap();
        let second = h.service.settle(b, split_id).await;

        assert!(matches!(
            second,
            Err(BillingError::InvalidState {
                from: SplitStatus::PendingApproval,
                to: SplitStatus::PendingApproval
            })
        ));
        let split = h.store.find_split(split_id).await.unwrap().unwrap();
        assert_eq!(split.status, SplitStatus::PendingApproval);
    }

    #[tokio::test]
    async fn test_concurrent_settle_exactly_one_wins() {
        let h = harness(2).await;
        let (a, b) = (h.members[0], h.members[1]);
        let issued = h
            .service
            .create_bill(a, rent(), ObligorSelection::Selected(vec![b]))
            .await
            .unwrap();
        let split_id = issued.splits[0].id;

        let first = tokio::spawn({
            let service = h.service.clone();
            async move { service.settle(b, split_id).await }
        });
        let second = tokio::spawn({
            let service = h.service.clone();
            async move { service.settle(b, split_id).await }
        });

        let results = [first.await.unwrap(), second.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(BillingError::InvalidState { .. })))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
    }

    #[tokio::test]
    async fn test_approve_by_non_creator_leaves_split_pending() {
        let h = harness(3).await;
        let (a, b, c) = (h.members[0], h.members[1], h.members[2]);
        let issued = h
            .service
            .create_bill(a, rent(), ObligorSelection::SplitEqually)
            .await
            .unwrap();
        let b_split = issued.splits.iter().find(|s| s.user_id == b).unwrap().id;
        h.service.settle(b, b_split).await.unwrap();

        for actor in [b, c] {
            let result = h.service.approve(actor, b_split).await;
            assert!(matches!(result, Err(BillingError::NotCreator { .. })));
        }
        let split = h.store.find_split(b_split).await.unwrap().unwrap();
        assert_eq!(split.status, SplitStatus::PendingApproval);
    }

    #[tokio::test]
    async fn test_approve_unpaid_split_is_invalid_state() {
        let h = harness(2).await;
        let issued = h
            .service
            .create_bill(h.members[0], rent(), ObligorSelection::SplitEqually)
            .await
            .unwrap();

        let result = h.service.approve(h.members[0], issued.splits[1].id).await;
        assert!(matches!(
            result,
            Err(BillingError::InvalidState { from: SplitStatus::Unpaid, .. })
        ));
    }

    #[tokio::test]
    async fn test_unknown_split() {
        let h = harness(1).await;
        let result = h.service.settle(h.members[0], BillSplitId::new()).await;
        assert!(matches!(result, Err(BillingError::ObligationNotFound(_))));
    }

    #[tokio::test]
    async fn test_actor_without_household() {
        let h = harness(2).await;
        let loner = UserId::new();
        h.directory.add_user(loner, None).await;

        let result = h
            .service
            .create_bill(loner, rent(), ObligorSelection::SplitEqually)
            .await;
        assert!(matches!(result, Err(BillingError::NoHousehold(_))));
    }

    #[tokio::test]
    async fn test_unknown_actor_has_no_household() {
        let h = harness(2).await;
        let unknown = UserId::new();

        let result = h
            .service
            .create_bill(unknown, rent(), ObligorSelection::SplitEqually)
            .await;
        assert!(matches!(result, Err(BillingError::NoHousehold(user)) if user == unknown));
        assert_eq!(h.store.bill_count().await, 0);
    }

    #[tokio::test]
    async fn test_selection_outside_household_has_no_obligors() {
        let h = harness(2).await;
        let stranger = UserId::new();
        h.directory.add_user(stranger, Some(HouseholdId::new())).await;

        let result = h
            .service
            .create_bill(h.members[0], rent(), ObligorSelection::Selected(vec![stranger]))
            .await;
        assert!(matches!(result, Err(BillingError::NoObligors)));
        assert_eq!(h.store.bill_count().await, 0);
    }

    #[tokio::test]
    async fn test_validation_precedes_household_lookup() {
        let h = harness(1).await;
        let result = h
            .service
            .create_bill(UserId::new(), BillDraft::new("", dec!(10)), ObligorSelection::SplitEqually)
            .await;
        assert!(matches!(result, Err(BillingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_store_failure_persists_nothing() {
        let h = harness(3).await;
        h.store.fail_writes(true);

        let result = h
            .service
            .create_bill(h.members[0], rent(), ObligorSelection::SplitEqually)
            .await;

        assert!(matches!(result, Err(BillingError::Storage(_))));
        assert_eq!(h.store.bill_count().await, 0);
        assert_eq!(h.store.split_count().await, 0);
    }

    #[tokio::test]
    async fn test_summary_tracks_progress() {
        let h = harness(2).await;
        let (a, b) = (h.members[0], h.members[1]);
        let issued = h
            .service
            .create_bill(a, rent(), ObligorSelection::SplitEqually)
            .await
            .unwrap();

        for split in &issued.splits {
            h.service.settle(split.user_id, split.id).await.unwrap();
            h.service.approve(a, split.id).await.unwrap();
        }

        let summary = h.service.bill_summary(issued.bill.id).await.unwrap();
        assert!(summary.is_fully_paid());
        assert!(summary.outstanding.is_zero());
        assert_eq!(summary.paid, 2);

        let bills = h.service.list_bills_for_user(b).await.unwrap();
        assert_eq!(bills.len(), 1);
    }
}
