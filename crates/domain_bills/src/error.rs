//! Bills domain errors

use thiserror::Error;

use core_kernel::{BillId, BillSplitId, MoneyError, PortError, UserId};
use crate::allocation::AllocationError;
use crate::split::SplitStatus;

/// Errors that can occur in the bills domain
///
/// Every failure leaves persisted state unchanged; nothing here is fatal.
#[derive(Debug, Error)]
pub enum BillingError {
    /// Malformed input, rejected before any lookup or persistence
    #[error("Validation error: {0}")]
    Validation(String),

    /// The acting user does not belong to a household
    #[error("User {0} must be in a household to create bills")]
    NoHousehold(UserId),

    /// The resolved obligor set was empty
    #[error("No household members found to split the bill")]
    NoObligors,

    /// Bill split not found
    #[error("Bill split not found: {0}")]
    ObligationNotFound(BillSplitId),

    /// Bill not found
    #[error("Bill not found: {0}")]
    BillNotFound(BillId),

    /// Only the obligor may settle their own split
    #[error("User {actor} is not the obligor of split {split_id}")]
    NotObligor { split_id: BillSplitId, actor: UserId },

    /// Only the bill creator may approve a settlement
    #[error("User {actor} did not create bill {bill_id}")]
    NotCreator { bill_id: BillId, actor: UserId },

    /// Transition not legal from the current status
    #[error("Invalid status transition from {from} to {to}")]
    InvalidState { from: SplitStatus, to: SplitStatus },

    /// A collaborator (store or household directory) failed
    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl BillingError {
    pub fn validation(message: impl Into<String>) -> Self {
        BillingError::Validation(message.into())
    }

    /// Returns true for failures caused by the actor lacking a relationship
    /// to the bill or split
    pub fn is_authorization(&self) -> bool {
        matches!(self, BillingError::NotObligor { .. } | BillingError::NotCreator { .. })
    }

    /// Returns true when a referenced id does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BillingError::ObligationNotFound(_) | BillingError::BillNotFound(_)
        )
    }
}

impl From<AllocationError> for BillingError {
    fn from(error: AllocationError) -> Self {
        match error {
            AllocationError::EmptyObligorSet => BillingError::NoObligors,
            AllocationError::Money(e) => BillingError::Validation(e.to_string()),
        }
    }
}

impl From<MoneyError> for BillingError {
    fn from(error: MoneyError) -> Self {
        BillingError::Validation(error.to_string())
    }
}
