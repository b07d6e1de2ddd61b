//! Bill aggregate
//!
//! A bill belongs to exactly one household, records who created it, and owns
//! the splits produced when it was issued. Amount, household and creator never
//! change after creation; the split set is fixed at issue time.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{BillId, HouseholdId, Money, UserId};
use crate::allocation::{allocate, distinct_obligors};
use crate::error::BillingError;
use crate::split::{BillSplit, SplitStatus};

/// Maximum bill name length
pub const MAX_NAME_LEN: usize = 255;

/// Maximum description length
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Largest accepted bill amount (fits NUMERIC(12, 2))
pub const MAX_BILL_AMOUNT: Decimal = dec!(9999999999.99);

/// User input for a new bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillDraft {
    pub name: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
}

impl BillDraft {
    /// Creates a draft with no description or due date
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
            description: None,
            due_date: None,
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due date
    pub fn with_due_date(mut self, due_date: NaiveDateTime) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Validates the draft and returns the amount as Money
    ///
    /// # Errors
    ///
    /// `Validation` when the name is blank or too long, the amount is not
    /// positive, finer than a cent or too large, or the description is too
    /// long.
    pub fn validate(&self) -> Result<Money, BillingError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(BillingError::validation("Bill name is required"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(BillingError::validation(format!(
                "Bill name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(BillingError::validation(format!(
                    "Description must be at most {} characters",
                    MAX_DESCRIPTION_LEN
                )));
            }
        }
        if self.amount <= Decimal::ZERO {
            return Err(BillingError::validation("Bill amount must be greater than zero"));
        }
        if self.amount > MAX_BILL_AMOUNT {
            return Err(BillingError::validation(format!(
                "Bill amount must not exceed {}",
                MAX_BILL_AMOUNT
            )));
        }
        Ok(Money::try_new(self.amount)?)
    }
}

/// Who the bill is split among
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObligorSelection {
    /// Every current member of the creator's household
    SplitEqually,
    /// Only these users; anyone outside the household is ignored
    Selected(Vec<UserId>),
}

impl ObligorSelection {
    /// Builds a selection from the `obligorIds` / `splitEqually` request pair
    pub fn from_request(obligor_ids: Option<Vec<UserId>>, split_equally: bool) -> Self {
        if split_equally {
            ObligorSelection::SplitEqually
        } else {
            ObligorSelection::Selected(obligor_ids.unwrap_or_default())
        }
    }

    /// Resolves the obligors against the current household members
    ///
    /// The result has no duplicates and keeps the order of the source list.
    pub fn resolve(&self, members: &[UserId]) -> Vec<UserId> {
        match self {
            ObligorSelection::SplitEqually => distinct_obligors(members),
            ObligorSelection::Selected(ids) => {
                let in_household: Vec<UserId> = ids
                    .iter()
                    .copied()
                    .filter(|id| members.contains(id))
                    .collect();
                distinct_obligors(&in_household)
            }
        }
    }
}

/// A bill shared by household members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier
    pub id: BillId,
    /// Short name, e.g. "Electricity March"
    pub name: String,
    /// Total amount
    pub amount: Money,
    /// Free text
    pub description: Option<String>,
    /// Optional due date (household-local time)
    pub due_date: Option<NaiveDateTime>,
    /// Owning household
    pub household_id: HouseholdId,
    /// Member who created the bill; the only one allowed to approve
    pub created_by: UserId,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Bill {
    /// Issues a bill and its splits
    ///
    /// Validates the draft, divides the amount among `obligors` and returns
    /// the bill together with one `UNPAID` split per distinct obligor. Nothing
    /// is persisted here.
    ///
    /// # Errors
    ///
    /// * `Validation` if the draft is invalid
    /// * `NoObligors` if `obligors` is empty
    pub fn issue(
        draft: BillDraft,
        household_id: HouseholdId,
        created_by: UserId,
        obligors: &[UserId],
    ) -> Result<IssuedBill, BillingError> {
        let amount = draft.validate()?;
        let shares = allocate(amount, obligors)?;

        let bill = Bill {
            id: BillId::new_v7(),
            name: draft.name.trim().to_string(),
            amount,
            description: draft.description.filter(|d| !d.trim().is_empty()),
            due_date: draft.due_date,
            household_id,
            created_by,
            created_at: Utc::now(),
        };
        let splits = shares
            .iter()
            .map(|share| BillSplit::new(bill.id, share))
            .collect();

        Ok(IssuedBill { bill, splits })
    }

    /// True if `user` created the bill or owes one of `splits`
    pub fn involves(&self, user: UserId, splits: &[BillSplit]) -> bool {
        self.created_by == user
            || splits
                .iter()
                .any(|s| s.bill_id == self.id && s.user_id == user)
    }

    /// True once the bill's due date has passed and some split is unpaid
    pub fn is_overdue(&self, splits: &[BillSplit], now: NaiveDateTime) -> bool {
        match self.due_date {
            Some(due) => now > due && splits.iter().any(|s| !s.status.is_final()),
            None => false,
        }
    }
}

/// A freshly issued bill with its splits, persisted together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedBill {
    pub bill: Bill,
    pub splits: Vec<BillSplit>,
}

/// Settlement progress of a bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSummary {
    pub bill_id: BillId,
    /// Bill total
    pub total: Money,
    /// Sum of all splits (may differ from `total` by rounding)
    pub allocated: Money,
    /// Sum of splits not yet `PAID`
    pub outstanding: Money,
    pub unpaid: usize,
    pub pending_approval: usize,
    pub paid: usize,
}

impl BillSummary {
    /// Summarises the splits of `bill`
    pub fn new(bill: &Bill, splits: &[BillSplit]) -> Self {
        let own: Vec<&BillSplit> = splits.iter().filter(|s| s.bill_id == bill.id).collect();
        let count = |status: SplitStatus| own.iter().filter(|s| s.status == status).count();

        Self {
            bill_id: bill.id,
            total: bill.amount,
            allocated: own.iter().map(|s| s.split_amount).sum(),
            outstanding: own
                .iter()
                .filter(|s| !s.status.is_final())
                .map(|s| s.split_amount)
                .sum(),
            unpaid: count(SplitStatus::Unpaid),
            pending_approval: count(SplitStatus::PendingApproval),
            paid: count(SplitStatus::Paid),
        }
    }

    /// True when every split has been approved
    pub fn is_fully_paid(&self) -> bool {
        self.unpaid == 0 && self.pending_approval == 0 && self.paid > 0
    }
}
