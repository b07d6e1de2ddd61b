//! Tests for strongly-typed identifiers

use core_kernel::{BillId, BillSplitId, HouseholdId, UserId};
use uuid::Uuid;

#[test]
fn test_prefixes() {
    assert!(HouseholdId::new().to_string().starts_with("HH-"));
    assert!(UserId::new().to_string().starts_with("USR-"));
    assert!(BillId::new().to_string().starts_with("BILL-"));
    assert!(BillSplitId::new().to_string().starts_with("SPL-"));
    assert_eq!(BillId::prefix(), "BILL");
}

#[test]
fn test_v7_ids_are_time_ordered() {
    let first = BillId::new_v7();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = BillId::new_v7();
    assert!(first < second);
}

#[test]
fn test_parse_rejects_garbage() {
    assert!("USR-not-a-uuid".parse::<UserId>().is_err());
}

#[test]
fn test_serde_is_transparent() {
    let uuid = Uuid::new_v4();
    let id = UserId::from_uuid(uuid);
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", uuid));

    let back: UserId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}

#[test]
fn test_distinct_ids() {
    assert_ne!(BillSplitId::new(), BillSplitId::new());
}
