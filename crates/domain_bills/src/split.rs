//! Obligation ledger: one member's share of a bill and its settlement lifecycle
//!
//! # Lifecycle
//!
//! ```text
//! UNPAID --settle (obligor)--> PENDING_APPROVAL --approve (bill creator)--> PAID
//! ```
//!
//! The obligor claims payment, the creator confirms receipt. Status only
//! moves forward; every other transition is rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use core_kernel::{BillId, BillSplitId, Money, UserId};
use crate::allocation::Share;
use crate::bill::Bill;
use crate::error::BillingError;

/// Settlement status of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitStatus {
    /// Nothing paid yet
    Unpaid,
    /// Obligor says it is paid; waiting for the creator
    PendingApproval,
    /// Creator confirmed payment
    Paid,
}

impl SplitStatus {
    pub const ALL: [SplitStatus; 3] = [
        SplitStatus::Unpaid,
        SplitStatus::PendingApproval,
        SplitStatus::Paid,
    ];

    /// Storage and wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitStatus::Unpaid => "UNPAID",
            SplitStatus::PendingApproval => "PENDING_APPROVAL",
            SplitStatus::Paid => "PAID",
        }
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: SplitStatus) -> bool {
        use SplitStatus::*;
        matches!(
            (*self, target),
            (Unpaid, PendingApproval) | (PendingApproval, Paid)
        )
    }

    /// Returns true once the creator has confirmed payment
    pub fn is_final(&self) -> bool {
        matches!(self, SplitStatus::Paid)
    }
}

impl fmt::Display for SplitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitStatus {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SplitStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| BillingError::validation(format!("Unknown split status: {}", s)))
    }
}

/// A status change that passed every domain check and still has to be
/// applied to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitTransition {
    pub split_id: BillSplitId,
    pub from: SplitStatus,
    pub to: SplitStatus,
}

/// One obligor's share of a bill
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSplit {
    /// Unique identifier
    pub id: BillSplitId,
    /// Owning bill
    pub bill_id: BillId,
    /// The obligor
    pub user_id: UserId,
    /// Amount owed, in cents precision
    pub split_amount: Money,
    /// Settlement status
    pub status: SplitStatus,
}

impl BillSplit {
    /// Creates an unpaid split for an allocated share
    pub fn new(bill_id: BillId, share: &Share) -> Self {
        Self {
            id: BillSplitId::new_v7(),
            bill_id,
            user_id: share.obligor,
            split_amount: share.amount,
            status: SplitStatus::Unpaid,
        }
    }

    /// Obligor declares their share paid
    ///
    /// # Errors
    ///
    /// * `NotObligor` if `actor` does not owe this split
    /// * `InvalidState` unless the split is `UNPAID`
    pub fn settle(&mut self, actor: UserId) -> Result<SplitTransition, BillingError> {
        if actor != self.user_id {
            return Err(BillingError::NotObligor {
                split_id: self.id,
                actor,
            });
        }
        self.transition_to(SplitStatus::PendingApproval)
    }

    /// Bill creator confirms a settled share was received
    ///
    /// `bill` must be the bill this split belongs to.
    ///
    /// # Errors
    ///
    /// * `BillNotFound` if `bill` is not the owning bill
    /// * `NotCreator` if `actor` did not create the bill
    /// * `InvalidState` unless the split is `PENDING_APPROVAL`
    pub fn approve(&mut self, bill: &Bill, actor: UserId) -> Result<SplitTransition, BillingError> {
        if bill.id != self.bill_id {
            return Err(BillingError::BillNotFound(self.bill_id));
        }
        if actor != bill.created_by {
            return Err(BillingError::NotCreator {
                bill_id: bill.id,
                actor,
            });
        }
        self.transition_to(SplitStatus::Paid)
    }

    fn transition_to(&mut self, target: SplitStatus) -> Result<SplitTransition, BillingError> {
        if !self.status.can_transition_to(target) {
            return Err(BillingError::InvalidState {
                from: self.status,
                to: target,
            });
        }
        let transition = SplitTransition {
            split_id: self.id,
            from: self.status,
            to: target,
        };
        self.status = target;
        Ok(transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_forward_transitions() {
        use SplitStatus::*;
        for from in SplitStatus::ALL {
            for to in SplitStatus::ALL {
                let expected = matches!((from, to), (Unpaid, PendingApproval) | (PendingApproval, Paid));
                assert_eq!(from.can_transition_to(to), expected, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in SplitStatus::ALL {
            assert_eq!(status.as_str().parse::<SplitStatus>().unwrap(), status);
        }
        assert_eq!("pending_approval".parse::<SplitStatus>().unwrap(), SplitStatus::PendingApproval);
        assert!("REFUNDED".parse::<SplitStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&SplitStatus::PendingApproval).unwrap();
        assert_eq!(json, "\"PENDING_APPROVAL\"");
    }

    #[test]
    fn test_new_split_is_unpaid() {
        let share = Share {
            obligor: UserId::new(),
            amount: Money::from_minor(3333),
        };
        let split = BillSplit::new(BillId::new(), &share);

        assert_eq!(split.status, SplitStatus::Unpaid);
        assert_eq!(split.user_id, share.obligor);
        assert_eq!(split.split_amount, share.amount);
    }
}
