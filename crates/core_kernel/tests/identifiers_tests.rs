//! Integration tests for strongly-typed identifiers

use core_kernel::identifiers::{
    ContractorId, PenaltyId, QuoteId, RequestId, TransactionId, WalletId,
};
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn ids_are_unique() {
    let mut seen = HashSet::new();
    for _ in 0..100 {
        assert!(seen.insert(WalletId::new()));
    }
}

#[test]
fn display_includes_prefix() {
    assert!(ContractorId::new().to_string().starts_with("CTR-"));
    assert!(WalletId::new().to_string().starts_with("WAL-"));
    assert!(TransactionId::new().to_string().starts_with("TXN-"));
    assert!(QuoteId::new().to_string().starts_with("QTE-"));
    assert!(RequestId::new().to_string().starts_with("REQ-"));
    assert!(PenaltyId::new().to_string().starts_with("PEN-"));
}

#[test]
fn parses_with_and_without_prefix() {
    let id = QuoteId::new();
    let with_prefix: QuoteId = id.to_string().parse().unwrap();
    let bare: QuoteId = id.as_uuid().to_string().parse().unwrap();

    assert_eq!(with_prefix, id);
    assert_eq!(bare, id);
}

#[test]
fn parse_rejects_garbage() {
    assert!("not-a-uuid".parse::<TransactionId>().is_err());
}

#[test]
fn v7_ids_are_time_ordered() {
    let earlier = TransactionId::new_v7();
    let later = TransactionId::new_v7();
    // the first 48 bits of a v7 UUID are a millisecond timestamp; the random
    // tail is not ordered, so only the timestamp prefix is comparable
    let earlier_ts = &earlier.as_uuid().as_bytes()[..6];
    let later_ts = &later.as_uuid().as_bytes()[..6];
    assert!(earlier_ts <= later_ts);
}

#[test]
fn uuid_round_trip() {
    let uuid = Uuid::new_v4();
    let id = ContractorId::from_uuid(uuid);
    assert_eq!(*id.as_uuid(), uuid);
    let back: Uuid = id.into();
    assert_eq!(back, uuid);
}

#[test]
fn serde_is_transparent() {
    let id = WalletId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{}\"", id.as_uuid()));

    let back: WalletId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
