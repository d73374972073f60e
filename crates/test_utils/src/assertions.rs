//! Ledger Invariant Assertions
//!
//! The wallet's balance columns are a materialized projection of its entry
//! log. These helpers recompute the projection from scratch and compare it to
//! the stored figures; every settlement test ends by calling them.

use rust_decimal::Decimal;

use domain_ledger::entry::{EntryStatus, EntryType, LedgerEntry, ReferenceType};
use domain_ledger::wallet::Wallet;

/// Asserts that both balances are non-negative and the cumulative counters
/// have not gone negative either
pub fn assert_non_negative(wallet: &Wallet) {
    assert!(
        !wallet.current_balance.is_negative(),
        "current_balance went negative: {}",
        wallet.current_balance
    );
    assert!(
        !wallet.pending_balance.is_negative(),
        "pending_balance went negative: {}",
        wallet.pending_balance
    );
    for (name, value) in [
        ("total_earned", wallet.total_earned),
        ("total_commission_paid", wallet.total_commission_paid),
        ("total_penalties", wallet.total_penalties),
        ("total_withdrawn", wallet.total_withdrawn),
    ] {
        assert!(!value.is_negative(), "{name} went negative: {value}");
    }
}

/// Asserts that the wallet's balances equal the projection of its entry log
///
/// Checks, over the entries belonging to this wallet:
///
/// * `current_balance + pending_balance == sum of signed completed amounts`
/// * `pending_balance == sum of pending withdrawal holds`
/// * each cumulative counter matches its slice of the completed log
pub fn assert_balance_projection(wallet: &Wallet, entries: &[LedgerEntry]) {
    assert_non_negative(wallet);

    let own: Vec<&LedgerEntry> = entries.iter().filter(|e| e.wallet_id == wallet.id).collect();

    let completed_signed: Decimal = own
        .iter()
        .filter(|e| e.status == EntryStatus::Completed)
        .map(|e| e.signed_amount())
        .sum();
    let held = wallet.current_balance + wallet.pending_balance;
    assert_eq!(
        held.amount(),
        completed_signed,
        "balance projection diverged from the completed log: current {} + pending {} != {}",
        wallet.current_balance,
        wallet.pending_balance,
        completed_signed
    );

    let pending_holds: Decimal = own
        .iter()
        .filter(|e| {
            e.status == EntryStatus::Pending
                && e.reference.reference_type == ReferenceType::Withdrawal
        })
        .map(|e| e.amount.amount())
        .sum();
    assert_eq!(
        wallet.pending_balance.amount(),
        pending_holds,
        "pending_balance diverged from open withdrawal holds"
    );

    let earned: Decimal = own
        .iter()
        .filter(|e| {
            e.status == EntryStatus::Completed
                && e.entry_type == EntryType::Credit
                && matches!(
                    e.reference.reference_type,
                    ReferenceType::Quote | ReferenceType::Invoice
                )
        })
        .map(|e| e.amount.amount())
        .sum();
    assert_eq!(wallet.total_earned.amount(), earned, "total_earned diverged");

    let penalties: Decimal = own
        .iter()
        .filter(|e| {
            e.status == EntryStatus::Completed
                && e.reference.reference_type == ReferenceType::Penalty
        })
        .map(|e| e.amount.amount())
        .sum();
    assert_eq!(
        wallet.total_penalties.amount(),
        penalties,
        "total_penalties diverged"
    );

    let withdrawn: Decimal = own
        .iter()
        .filter(|e| {
            e.status == EntryStatus::Completed
                && e.reference.reference_type == ReferenceType::Withdrawal
        })
        .map(|e| e.amount.amount())
        .sum();
    assert_eq!(
        wallet.total_withdrawn.amount(),
        withdrawn,
        "total_withdrawn diverged"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{EntryBuilder, WalletBuilder};
    use core_kernel::Money;
    use domain_ledger::entry::Reference;
    use core_kernel::PenaltyId;
    use rust_decimal_macros::dec;

    #[test]
    fn projection_accepts_a_consistent_wallet() {
        let mut wallet = WalletBuilder::new().build();
        wallet.settle_credit(Money::new(dec!(1000)), Money::zero()).unwrap();
        wallet.apply_penalty(Money::new(dec!(400))).unwrap();

        let entries = vec![
            EntryBuilder::new(wallet.id)
                .with_amount(Money::new(dec!(1000)))
                .build(),
            EntryBuilder::new(wallet.id)
                .debit()
                .with_amount(Money::new(dec!(400)))
                .with_reference(Reference::penalty(PenaltyId::new()))
                .build(),
        ];

        assert_balance_projection(&wallet, &entries);
    }

    #[test]
    #[should_panic(expected = "balance projection diverged")]
    fn projection_rejects_a_drifted_balance() {
        let wallet = WalletBuilder::new().with_balance(Money::new(dec!(999))).build();
        let entries = vec![EntryBuilder::new(wallet.id)
            .with_amount(Money::new(dec!(1000)))
            .build()];

        assert_balance_projection(&wallet, &entries);
    }
}
