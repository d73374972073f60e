//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults. Tests
//! specify only the fields they care about.

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{ContractorId, Money, PenaltyId, QuoteId, RequestId, TransactionId, WalletId};
use domain_ledger::entry::{EntryStatus, EntryType, LedgerEntry, Reference};
use domain_ledger::penalty::{Penalty, PenaltyParty, PenaltyType};
use domain_ledger::quote::{QuoteApprovalStatus, QuoteFacts};
use domain_ledger::wallet::Wallet;

/// Builder for wallets in a given state
pub struct WalletBuilder {
    contractor_id: ContractorId,
    current_balance: Money,
    pending_balance: Money,
    total_earned: Money,
    is_suspended: bool,
}

impl Default for WalletBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WalletBuilder {
    pub fn new() -> Self {
        Self {
            contractor_id: ContractorId::new(),
            current_balance: Money::zero(),
            pending_balance: Money::zero(),
            total_earned: Money::zero(),
            is_suspended: false,
        }
    }

    pub fn with_contractor_id(mut self, contractor_id: ContractorId) -> Self {
        self.contractor_id = contractor_id;
        self
    }

    /// Sets the spendable balance (and the earned counter to match, so the
    /// wallet looks like it reached this state through settlements)
    pub fn with_balance(mut self, amount: Money) -> Self {
        self.current_balance = amount;
        self.total_earned = amount;
        self
    }

    pub fn with_pending(mut self, amount: Money) -> Self {
        self.pending_balance = amount;
        self
    }

    pub fn suspended(mut self) -> Self {
        self.is_suspended = true;
        self
    }

    pub fn build(self) -> Wallet {
        let mut wallet = Wallet::new(self.contractor_id);
        wallet.current_balance = self.current_balance;
        wallet.pending_balance = self.pending_balance;
        wallet.total_earned = self.total_earned;
        wallet.is_suspended = self.is_suspended;
        wallet
    }
}

/// Builder for quote facts
pub struct QuoteBuilder {
    id: QuoteId,
    request_id: RequestId,
    contractor_id: ContractorId,
    base_price: Money,
    price_per_unit: Money,
    system_size_kwp: Decimal,
    is_selected: bool,
    admin_status: QuoteApprovalStatus,
}

impl Default for QuoteBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteBuilder {
    /// An approved, selected 10,000.00 quote for a 12.5 kWp system
    pub fn new() -> Self {
        Self {
            id: QuoteId::new(),
            request_id: RequestId::new(),
            contractor_id: ContractorId::new(),
            base_price: Money::new(dec!(10000)),
            price_per_unit: Money::new(dec!(800)),
            system_size_kwp: dec!(12.5),
            is_selected: true,
            admin_status: QuoteApprovalStatus::Approved,
        }
    }

    pub fn with_id(mut self, id: QuoteId) -> Self {
        self.id = id;
        self
    }

    pub fn with_contractor_id(mut self, contractor_id: ContractorId) -> Self {
        self.contractor_id = contractor_id;
        self
    }

    pub fn with_base_price(mut self, base_price: Money) -> Self {
        self.base_price = base_price;
        self
    }

    pub fn with_unit_pricing(mut self, price_per_unit: Money, system_size_kwp: Decimal) -> Self {
        self.price_per_unit = price_per_unit;
        self.system_size_kwp = system_size_kwp;
        self
    }

    pub fn unselected(mut self) -> Self {
        self.is_selected = false;
        self
    }

    pub fn with_status(mut self, status: QuoteApprovalStatus) -> Self {
        self.admin_status = status;
        self
    }

    pub fn build(self) -> QuoteFacts {
        QuoteFacts {
            id: self.id,
            request_id: self.request_id,
            contractor_id: self.contractor_id,
            base_price: self.base_price,
            price_per_unit: self.price_per_unit,
            system_size_kwp: self.system_size_kwp,
            is_selected: self.is_selected,
            admin_status: self.admin_status,
        }
    }
}

/// Builder for penalty records
pub struct PenaltyBuilder {
    id: PenaltyId,
    quote_id: Option<QuoteId>,
    request_id: Option<RequestId>,
    penalty_type: PenaltyType,
    amount: Money,
    applied_to: PenaltyParty,
    reason: String,
}

impl Default for PenaltyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PenaltyBuilder {
    /// An unprocessed 500.00 contractor-side delay penalty
    pub fn new() -> Self {
        Self {
            id: PenaltyId::new(),
            quote_id: None,
            request_id: None,
            penalty_type: PenaltyType::InstallationDelay,
            amount: Money::new(dec!(500)),
            applied_to: PenaltyParty::Contractor,
            reason: "installation delayed beyond committed date".to_string(),
        }
    }

    pub fn with_id(mut self, id: PenaltyId) -> Self {
        self.id = id;
        self
    }

    pub fn for_quote(mut self, quote_id: QuoteId) -> Self {
        self.quote_id = Some(quote_id);
        self
    }

    pub fn for_request(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn applied_to(mut self, party: PenaltyParty) -> Self {
        self.applied_to = party;
        self
    }

    pub fn with_type(mut self, penalty_type: PenaltyType) -> Self {
        self.penalty_type = penalty_type;
        self
    }

    pub fn build(self) -> Penalty {
        Penalty {
            id: self.id,
            quote_id: self.quote_id,
            request_id: self.request_id,
            penalty_type: self.penalty_type,
            amount: self.amount,
            applied_to: self.applied_to,
            reason: self.reason,
            is_processed: false,
            transaction_id: None,
            created_at: Utc::now(),
        }
    }
}

/// Builder for ledger entries (projection/assertion tests)
pub struct EntryBuilder {
    wallet_id: WalletId,
    entry_type: EntryType,
    amount: Money,
    reference: Reference,
    status: EntryStatus,
}

impl EntryBuilder {
    /// A completed 100.00 quote credit
    pub fn new(wallet_id: WalletId) -> Self {
        Self {
            wallet_id,
            entry_type: EntryType::Credit,
            amount: Money::new(dec!(100)),
            reference: Reference::quote(QuoteId::new()),
            status: EntryStatus::Completed,
        }
    }

    pub fn debit(mut self) -> Self {
        self.entry_type = EntryType::Debit;
        self
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    pub fn build(self) -> LedgerEntry {
        let now = Utc::now();
        let terminal = !matches!(self.status, EntryStatus::Pending);
        LedgerEntry {
            id: TransactionId::new_v7(),
            wallet_id: self.wallet_id,
            entry_type: self.entry_type,
            amount: self.amount,
            reference: self.reference,
            status: self.status,
            description: "test entry".to_string(),
            notes: None,
            method_snapshot: None,
            created_at: now,
            processed_at: terminal.then_some(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_builder_defaults_are_payable() {
        assert!(QuoteBuilder::new().build().is_payable());
        assert!(!QuoteBuilder::new().unselected().build().is_payable());
    }

    #[test]
    fn penalty_builder_defaults_are_contractor_side() {
        let penalty = PenaltyBuilder::new().build();
        assert!(penalty.affects_contractor());
        assert!(!penalty.is_processed);
    }

    #[test]
    fn wallet_builder_seeds_balance_and_earned() {
        let wallet = WalletBuilder::new().with_balance(Money::new(dec!(300))).build();
        assert_eq!(wallet.current_balance.amount(), dec!(300));
        assert_eq!(wallet.total_earned.amount(), dec!(300));
    }
}
