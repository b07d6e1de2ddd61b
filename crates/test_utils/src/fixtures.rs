//! Test Fixtures
//!
//! Households wired to the in-memory stores plus canned bill drafts.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use fake::faker::lorem::en::Words;
use fake::Fake;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{HouseholdId, UserId};
use domain_bills::{BillDraft, MockBillStore, MockHouseholdDirectory, SettlementService};

/// Due date used by the dated drafts (1 Feb 2024, midnight)
pub static DUE_DATE: Lazy<NaiveDateTime> = Lazy::new(|| {
    NaiveDate::from_ymd_opt(2024, 2, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap()
});

/// A household of fresh users sharing an in-memory settlement service
pub struct HouseholdFixture {
    pub service: SettlementService,
    pub store: Arc<MockBillStore>,
    pub directory: Arc<MockHouseholdDirectory>,
    pub household: HouseholdId,
    pub members: Vec<UserId>,
}

impl HouseholdFixture {
    /// Creates a household with `size` members
    pub async fn new(size: usize) -> Self {
        let (directory, household, members) = MockHouseholdDirectory::with_household(size).await;
        let store = Arc::new(MockBillStore::new());
        let directory = Arc::new(directory);
        let service = SettlementService::new(store.clone(), directory.clone());

        Self {
            service,
            store,
            directory,
            household,
            members,
        }
    }

    /// The `index`-th member
    pub fn member(&self, index: usize) -> UserId {
        self.members[index]
    }

    /// Registers a user who belongs to no household
    pub async fn add_homeless_user(&self) -> UserId {
        let user = UserId::new();
        self.directory.add_user(user, None).await;
        user
    }

    /// Registers a user in a different household
    pub async fn add_neighbour(&self) -> UserId {
        let user = UserId::new();
        self.directory.add_user(user, Some(HouseholdId::new())).await;
        user
    }
}

/// Canned bill drafts
pub struct DraftFixtures;

impl DraftFixtures {
    /// 100.00 of rent, the usual three-way split example
    pub fn rent() -> BillDraft {
        BillDraft::new("Rent", dec!(100.00))
    }

    /// A dated utilities bill with a description
    pub fn utilities() -> BillDraft {
        BillDraft::new("Electricity", dec!(90.00))
            .with_description("Q1 electricity")
            .with_due_date(*DUE_DATE)
    }

    /// A small bill that leaves a rounding gap for most group sizes
    pub fn odd_cents() -> BillDraft {
        BillDraft::new("Snacks", dec!(10.01))
    }

    /// A draft with a random name and amount between 1.00 and 9999.99
    pub fn random() -> BillDraft {
        let words: Vec<String> = Words(1..4).fake();
        let cents: i64 = (100..1_000_000).fake();
        BillDraft::new(words.join(" "), Decimal::new(cents, 2))
    }
}
