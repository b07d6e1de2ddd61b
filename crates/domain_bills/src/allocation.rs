//! Equal-share allocation of a bill amount among obligors
//!
//! Each obligor owes `total / n` rounded to the cent (half-up). The
//! remainder is deliberately left unassigned, so the shares of a bill can sum
//! to slightly less (100.00 / 3 = 3 × 33.33 = 99.99) or slightly more
//! (100.00 / 6 = 6 × 16.67 = 100.02) than its total. The difference is at
//! most half a cent per obligor.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{Money, MoneyError, UserId};

/// Errors from the allocator
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    #[error("Cannot split an amount among zero obligors")]
    EmptyObligorSet,

    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// One obligor's share of a total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub obligor: UserId,
    pub amount: Money,
}

/// Divides `total` equally among the distinct `obligors`
///
/// Duplicate ids are collapsed; shares come back in first-occurrence order.
/// Every share is identical, so the order of `obligors` never changes what
/// an individual owes.
///
/// # Errors
///
/// Returns `AllocationError::EmptyObligorSet` when `obligors` is empty.
///
/// # Example
///
/// ```rust
/// use core_kernel::{Money, UserId};
/// use domain_bills::allocation::allocate;
///
/// let members = vec![UserId::new(), UserId::new(), UserId::new()];
/// let shares = allocate(Money::from_minor(10_000), &members).unwrap();
///
/// assert!(shares.iter().all(|s| s.amount == Money::from_minor(3_333)));
/// ```
pub fn allocate(total: Money, obligors: &[UserId]) -> Result<Vec<Share>, AllocationError> {
    let obligors = distinct_obligors(obligors);
    if obligors.is_empty() {
        return Err(AllocationError::EmptyObligorSet);
    }

    let parts = u32::try_from(obligors.len()).map_err(|_| MoneyError::Overflow)?;
    let amount = total.equal_share(parts)?;

    Ok(obligors
        .into_iter()
        .map(|obligor| Share { obligor, amount })
        .collect())
}

/// Removes duplicate ids, keeping the first occurrence of each
pub fn distinct_obligors(obligors: &[UserId]) -> Vec<UserId> {
    let mut seen = HashSet::with_capacity(obligors.len());
    obligors
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Sum of all shares
pub fn allocated_total(shares: &[Share]) -> Money {
    shares.iter().map(|s| s.amount).sum()
}

/// `total` minus the allocated shares; negative when rounding overshoots
pub fn shortfall(total: Money, shares: &[Share]) -> Money {
    total - allocated_total(shares)
}
