//! Tests for domain_bills: allocation, split lifecycle and the bill aggregate

use chrono::{Days, NaiveDate, Utc};
use rust_decimal_macros::dec;

use core_kernel::{BillId, HouseholdId, Money, UserId};

use domain_bills::allocation::{allocate, allocated_total, shortfall};
use domain_bills::bill::{Bill, BillDraft, BillSummary, ObligorSelection, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};
use domain_bills::split::{BillSplit, SplitStatus};
use domain_bills::BillingError;

fn members(n: usize) -> Vec<UserId> {
    (0..n).map(|_| UserId::new()).collect()
}

// ============================================================================
// Allocation Tests
// ============================================================================

mod allocation_tests {
    use super::*;

    #[test]
    fn test_split_among_one_is_whole_amount() {
        let alice = UserId::new();
        let shares = allocate(Money::from_minor(4999), &[alice]).unwrap();

        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].amount.amount(), dec!(49.99));
    }

    #[test]
    fn test_hundred_among_three_is_one_cent_short() {
        let total = Money::from_minor(10000);
        let shares = allocate(total, &members(3)).unwrap();

        assert!(shares.iter().all(|s| s.amount.amount() == dec!(33.33)));
        assert_eq!(allocated_total(&shares).amount(), dec!(99.99));
        assert_eq!(shortfall(total, &shares).amount(), dec!(0.01));
    }

    #[test]
    fn test_hundred_among_six_overshoots() {
        let total = Money::from_minor(10000);
        let shares = allocate(total, &members(6)).unwrap();

        assert!(shares.iter().all(|s| s.amount.amount() == dec!(16.67)));
        assert_eq!(allocated_total(&shares).amount(), dec!(100.02));
    }

    #[test]
    fn test_one_cent_among_three_rounds_to_zero() {
        let shares = allocate(Money::from_minor(1), &members(3)).unwrap();
        assert!(shares.iter().all(|s| s.amount.is_zero()));
    }

    #[test]
    fn test_empty_set_maps_to_no_obligors() {
        let err: BillingError = allocate(Money::from_minor(100), &[]).unwrap_err().into();
        assert!(matches!(err, BillingError::NoObligors));
    }
}

// ============================================================================
// Split Lifecycle Tests
// ============================================================================

mod split_tests {
    use super::*;

    fn issued_bill(creator: UserId, obligors: &[UserId]) -> (Bill, Vec<BillSplit>) {
        let issued = Bill::issue(
            BillDraft::new("Electricity", dec!(120.00)),
            HouseholdId::new(),
            creator,
            obligors,
        )
        .unwrap();
        (issued.bill, issued.splits)
    }

    #[test]
    fn test_settle_then_approve() {
        let creator = UserId::new();
        let obligor = UserId::new();
        let (bill, mut splits) = issued_bill(creator, &[obligor]);
        let split = &mut splits[0];

        let settled = split.settle(obligor).unwrap();
        assert_eq!(settled.from, SplitStatus::Unpaid);
        assert_eq!(settled.to, SplitStatus::PendingApproval);

        let approved = split.approve(&bill, creator).unwrap();
        assert_eq!(approved.to, SplitStatus::Paid);
        assert!(split.status.is_final());
    }

    #[test]
    fn test_settle_by_other_member_is_rejected() {
        let creator = UserId::new();
        let obligor = UserId::new();
        let (_, mut splits) = issued_bill(creator, &[obligor]);

        let result = splits[0].settle(creator);

        assert!(matches!(result, Err(BillingError::NotObligor { .. })));
        assert_eq!(splits[0].status, SplitStatus::Unpaid);
    }

    #[test]
    fn test_creator_can_settle_own_share() {
        let creator = UserId::new();
        let (bill, mut splits) = issued_bill(creator, &[creator]);

        splits[0].settle(creator).unwrap();
        splits[0].approve(&bill, creator).unwrap();
        assert_eq!(splits[0].status, SplitStatus::Paid);
    }

    #[test]
    fn test_approve_by_obligor_is_rejected() {
        let creator = UserId::new();
        let obligor = UserId::new();
        let (bill, mut splits) = issued_bill(creator, &[obligor]);
        splits[0].settle(obligor).unwrap();

        let result = splits[0].approve(&bill, obligor);

        let err = result.unwrap_err();
        assert!(err.is_authorization());
        assert_eq!(splits[0].status, SplitStatus::PendingApproval);
    }

    #[test]
    fn test_paid_split_cannot_move() {
        let creator = UserId::new();
        let (bill, mut splits) = issued_bill(creator, &[creator]);
        splits[0].settle(creator).unwrap();
        splits[0].approve(&bill, creator).unwrap();

        assert!(matches!(
            splits[0].settle(creator),
            Err(BillingError::InvalidState { from: SplitStatus::Paid, .. })
        ));
        assert!(matches!(
            splits[0].approve(&bill, creator),
            Err(BillingError::InvalidState { from: SplitStatus::Paid, .. })
        ));
    }

    #[test]
    fn test_approve_against_foreign_bill() {
        let creator = UserId::new();
        let (_, mut splits) = issued_bill(creator, &[creator]);
        let (other_bill, _) = issued_bill(creator, &[creator]);
        splits[0].settle(creator).unwrap();

        let result = splits[0].approve(&other_bill, creator);
        assert!(matches!(result, Err(BillingError::BillNotFound(_))));
    }
}

// ============================================================================
// Bill Aggregate Tests
// ============================================================================

mod bill_tests {
    use super::*;

    #[test]
    fn test_issue_creates_one_unpaid_split_per_obligor() {
        let group = members(4);
        let issued = Bill::issue(
            BillDraft::new("Internet", dec!(80.00)),
            HouseholdId::new(),
            group[0],
            &group,
        )
        .unwrap();

        assert_eq!(issued.splits.len(), 4);
        assert!(issued.splits.iter().all(|s| s.status == SplitStatus::Unpaid));
        assert!(issued.splits.iter().all(|s| s.bill_id == issued.bill.id));
        assert!(issued.splits.iter().all(|s| s.split_amount.amount() == dec!(20.00)));
        assert_eq!(issued.bill.amount.amount(), dec!(80.00));
    }

    #[test]
    fn test_issue_without_obligors() {
        let result = Bill::issue(
            BillDraft::new("Internet", dec!(80.00)),
            HouseholdId::new(),
            UserId::new(),
            &[],
        );
        assert!(matches!(result, Err(BillingError::NoObligors)));
    }

    #[test]
    fn test_name_length_limit() {
        let ok = BillDraft::new("x".repeat(MAX_NAME_LEN), dec!(1));
        let too_long = BillDraft::new("x".repeat(MAX_NAME_LEN + 1), dec!(1));

        assert!(ok.validate().is_ok());
        assert!(too_long.validate().is_err());
    }

    #[test]
    fn test_description_length_limit() {
        let draft = BillDraft::new("Rent", dec!(1)).with_description("d".repeat(MAX_DESCRIPTION_LEN + 1));
        assert!(matches!(draft.validate(), Err(BillingError::Validation(_))));
    }

    #[test]
    fn test_amount_upper_bound() {
        assert!(BillDraft::new("Rent", dec!(9999999999.99)).validate().is_ok());
        assert!(BillDraft::new("Rent", dec!(10000000000.00)).validate().is_err());
    }

    #[test]
    fn test_split_equally_uses_every_member() {
        let group = members(3);
        assert_eq!(ObligorSelection::SplitEqually.resolve(&group), group);
    }

    #[test]
    fn test_selection_keeps_request_order() {
        let group = members(3);
        let selection = ObligorSelection::Selected(vec![group[2], group[0]]);
        assert_eq!(selection.resolve(&group), vec![group[2], group[0]]);
    }

    #[test]
    fn test_overdue_only_with_open_splits() {
        let creator = UserId::new();
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let issued = Bill::issue(
            BillDraft::new("Water", dec!(30.00)).with_due_date(due),
            HouseholdId::new(),
            creator,
            &[creator],
        )
        .unwrap();
        let later = due.checked_add_days(Days::new(1)).unwrap();

        assert!(issued.bill.is_overdue(&issued.splits, later));
        assert!(!issued.bill.is_overdue(&issued.splits, due));

        let mut splits = issued.splits.clone();
        splits[0].settle(creator).unwrap();
        splits[0].approve(&issued.bill, creator).unwrap();
        assert!(!issued.bill.is_overdue(&splits, later));
    }

    #[test]
    fn test_summary_counts_and_outstanding() {
        let group = members(3);
        let creator = group[0];
        let mut issued = Bill::issue(
            BillDraft::new("Rent", dec!(100.00)),
            HouseholdId::new(),
            creator,
            &group,
        )
        .unwrap();

        issued.splits[1].settle(group[1]).unwrap();
        issued.splits[2].settle(group[2]).unwrap();
        issued.splits[2].approve(&issued.bill, creator).unwrap();

        let summary = BillSummary::new(&issued.bill, &issued.splits);

        assert_eq!(summary.total.amount(), dec!(100.00));
        assert_eq!(summary.allocated.amount(), dec!(99.99));
        assert_eq!(summary.outstanding.amount(), dec!(66.66));
        assert_eq!((summary.unpaid, summary.pending_approval, summary.paid), (1, 1, 1));
        assert!(!summary.is_fully_paid());
    }

    #[test]
    fn test_summary_ignores_other_bills() {
        let creator = UserId::new();
        let issued = Bill::issue(BillDraft::new("Rent", dec!(10)), HouseholdId::new(), creator, &[creator]).unwrap();
        let stray = BillSplit::new(
            BillId::new(),
            &domain_bills::Share { obligor: creator, amount: Money::from_minor(500) },
        );
        let mut splits = issued.splits.clone();
        splits.push(stray);

        let summary = BillSummary::new(&issued.bill, &splits);
        assert_eq!(summary.unpaid, 1);
        assert_eq!(summary.allocated.amount(), dec!(10.00));
    }

    #[test]
    fn test_involves_creator_and_obligors() {
        let group = members(2);
        let outsider = UserId::new();
        let issued = Bill::issue(
            BillDraft::new("Rent", dec!(10)),
            HouseholdId::new(),
            group[0],
            &[group[1]],
        )
        .unwrap();

        assert!(issued.bill.involves(group[0], &issued.splits));
        assert!(issued.bill.involves(group[1], &issued.splits));
        assert!(!issued.bill.involves(outsider, &issued.splits));
        assert!(issued.bill.created_at <= Utc::now());
    }
}
