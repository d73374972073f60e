//! Property-Based Test Generators
//!
//! Proptest strategies for the settlement domain, including random operation
//! sequences used to hammer the ledger invariants.

use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{ContractorId, Money, PenaltyId, QuoteId};

/// Strategy for positive amounts in minor units (0.01 to 5,000.00)
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..500_000i64
}

/// Strategy for positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for rates in `[0, 1)` with four decimal places
pub fn rate_decimal_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..10_000u32).prop_map(|n| Decimal::new(n as i64, 4))
}

/// Strategy for ContractorId
pub fn contractor_id_strategy() -> impl Strategy<Value = ContractorId> {
    any::<[u8; 16]>().prop_map(|bytes| ContractorId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for QuoteId
pub fn quote_id_strategy() -> impl Strategy<Value = QuoteId> {
    any::<[u8; 16]>().prop_map(|bytes| QuoteId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for PenaltyId
pub fn penalty_id_strategy() -> impl Strategy<Value = PenaltyId> {
    any::<[u8; 16]>().prop_map(|bytes| PenaltyId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// One randomly generated ledger operation
///
/// Sequences of these drive the invariant property tests. Operations are
/// allowed to fail business rules (insufficient balance, below minimum);
/// the invariants must hold either way.
#[derive(Debug, Clone)]
pub enum LedgerOp {
    /// Settle a quote credit of `net_minor`, recording `commission_minor`
    SettleQuote { net_minor: i64, commission_minor: i64 },
    /// Debit a penalty of `minor`
    Penalty { minor: i64 },
    /// Request a withdrawal hold of `minor`
    RequestWithdrawal { minor: i64 },
    /// Decide the oldest open withdrawal
    DecideOldest { complete: bool },
    /// Record a manual adjustment
    Adjust { credit: bool, minor: i64 },
}

/// Strategy for a single ledger operation
pub fn ledger_op_strategy() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        3 => (positive_amount_minor_strategy(), 0i64..100_000i64)
            .prop_map(|(net_minor, commission_minor)| LedgerOp::SettleQuote {
                net_minor,
                commission_minor,
            }),
        2 => positive_amount_minor_strategy().prop_map(|minor| LedgerOp::Penalty { minor }),
        2 => positive_amount_minor_strategy()
            .prop_map(|minor| LedgerOp::RequestWithdrawal { minor }),
        2 => any::<bool>().prop_map(|complete| LedgerOp::DecideOldest { complete }),
        1 => (any::<bool>(), positive_amount_minor_strategy())
            .prop_map(|(credit, minor)| LedgerOp::Adjust { credit, minor }),
    ]
}

/// Strategy for a sequence of ledger operations
pub fn ledger_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
    proptest::collection::vec(ledger_op_strategy(), 1..=max_len)
}
