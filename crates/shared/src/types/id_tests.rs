//! Tests for typed ID wrappers.

use std::str::FromStr;

use super::id::{AccountId, CompanyId, JournalEntryId};

#[test]
fn test_new_ids_are_unique() {
    let a = JournalEntryId::new();
    let b = JournalEntryId::new();
    assert_ne!(a, b);
}

#[test]
fn test_v7_ids_are_time_ordered() {
    let a = AccountId::new();
    let b = AccountId::new();
    // UUID v7 embeds a millisecond timestamp in the most significant bits,
    // so ids created in sequence never sort backwards.
    assert!(a.into_inner() <= b.into_inner());
}

#[test]
fn test_roundtrip_through_string() {
    let id = CompanyId::new();
    let parsed = CompanyId::from_str(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn test_from_uuid_preserves_value() {
    let uuid = uuid::Uuid::now_v7();
    let id = AccountId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid);
}

#[test]
fn test_parse_invalid_string_fails() {
    assert!(CompanyId::from_str("not-a-uuid").is_err());
}
