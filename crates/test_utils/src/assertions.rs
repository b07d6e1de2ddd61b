//! Custom Assertions
//!
//! Assertion helpers for splits, allocations and bill summaries.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{Money, UserId};
use domain_bills::{BillSplit, BillSummary, SplitStatus};

/// Largest per-obligor rounding error of a half-up split
pub const HALF_CENT: Decimal = dec!(0.005);

/// Asserts every split carries the same amount
pub fn assert_equal_shares(splits: &[BillSplit]) {
    let Some(first) = splits.first() else {
        panic!("Expected at least one split");
    };
    for split in splits {
        assert_eq!(
            split.split_amount, first.split_amount,
            "Split {} owes {}, expected {}",
            split.id, split.split_amount, first.split_amount
        );
    }
}

/// Asserts the splits add up to `total` within half a cent per obligor
pub fn assert_allocation_within_rounding(total: Money, splits: &[BillSplit]) {
    let allocated: Decimal = splits.iter().map(|s| s.split_amount.amount()).sum();
    let gap = (total.amount() - allocated).abs();
    let bound = HALF_CENT * Decimal::from(splits.len());

    assert!(
        gap <= bound,
        "Splits sum to {}, {} away from the total {} (bound {})",
        allocated,
        gap,
        total,
        bound
    );
}

/// Asserts exactly one split exists per obligor and nobody else owes anything
pub fn assert_one_split_per_obligor(splits: &[BillSplit], obligors: &[UserId]) {
    assert_eq!(
        splits.len(),
        obligors.len(),
        "Expected {} splits, got {}",
        obligors.len(),
        splits.len()
    );
    for obligor in obligors {
        let owed = splits.iter().filter(|s| s.user_id == *obligor).count();
        assert_eq!(owed, 1, "Obligor {} has {} splits", obligor, owed);
    }
}

/// Asserts a split is in the expected state
pub fn assert_split_status(split: &BillSplit, expected: SplitStatus) {
    assert_eq!(
        split.status, expected,
        "Split {} is {}, expected {}",
        split.id, split.status, expected
    );
}

/// Asserts the status of the split owed by `user`
pub fn assert_status_of(splits: &[BillSplit], user: UserId, expected: SplitStatus) {
    let split = splits
        .iter()
        .find(|s| s.user_id == user)
        .unwrap_or_else(|| panic!("No split owed by {}", user));
    assert_split_status(split, expected);
}

/// Asserts the per-status counts of a summary
pub fn assert_summary_counts(summary: &BillSummary, unpaid: usize, pending_approval: usize, paid: usize) {
    assert_eq!(
        (summary.unpaid, summary.pending_approval, summary.paid),
        (unpaid, pending_approval, paid),
        "Summary counts (unpaid, pending, paid) mismatch for bill {}",
        summary.bill_id
    );
}
