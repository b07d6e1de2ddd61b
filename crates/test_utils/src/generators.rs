//! Property-Based Test Generators
//!
//! Proptest strategies for bill amounts, obligor sets and drafts.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Money, UserId};
use domain_bills::{BillDraft, SplitStatus};

/// Largest bill amount in cents (9 999 999 999.99)
pub const MAX_BILL_CENTS: i64 = 999_999_999_999;

/// Strategy for valid bill totals
pub fn bill_amount_strategy() -> impl Strategy<Value = Money> {
    (1i64..=MAX_BILL_CENTS).prop_map(Money::from_minor)
}

/// Strategy for everyday bill totals (0.01 to 10 000.00)
pub fn everyday_amount_strategy() -> impl Strategy<Value = Money> {
    (1i64..=1_000_000).prop_map(Money::from_minor)
}

/// Strategy for between 1 and `max` distinct obligors
pub fn obligors_strategy(max: usize) -> impl Strategy<Value = Vec<UserId>> {
    (1..=max).prop_map(|n| (0..n).map(|_| UserId::new()).collect())
}

/// Strategy for obligor lists that repeat ids, paired with the distinct count
pub fn obligors_with_duplicates_strategy(max: usize) -> impl Strategy<Value = (Vec<UserId>, usize)> {
    obligors_strategy(max).prop_flat_map(|distinct| {
        let count = distinct.len();
        prop::collection::vec(0..count, count..=count * 3).prop_map(move |picks| {
            let mut list = distinct.clone();
            list.extend(picks.into_iter().map(|i| distinct[i]));
            (list, count)
        })
    })
}

/// Strategy for split statuses
pub fn split_status_strategy() -> impl Strategy<Value = SplitStatus> {
    prop_oneof![
        Just(SplitStatus::Unpaid),
        Just(SplitStatus::PendingApproval),
        Just(SplitStatus::Paid),
    ]
}

/// Strategy for valid bill drafts
pub fn bill_draft_strategy() -> impl Strategy<Value = BillDraft> {
    ("[A-Za-z][A-Za-z ]{0,40}", 1i64..=1_000_000)
        .prop_map(|(name, cents)| BillDraft::new(name, Decimal::new(cents, 2)))
}

/// Strategy for bill amounts with sub-cent precision, which must be rejected
pub fn sub_cent_amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000_000).prop_filter_map("needs a third fractional digit", |mills| {
        (mills % 10 != 0).then(|| Decimal::new(mills, 3))
    })
}
