//! Ledger entry types
//!
//! A ledger entry records one monetary movement against a wallet. Entries are
//! append-only; once completed they are immutable and corrections happen via
//! new adjustment entries.
//!
//! Amounts are unsigned positive magnitudes; direction lives in the
//! [`EntryType`] tag. This is the single sign convention of the whole system;
//! signed values exist only transiently in [`LedgerEntry::signed_amount`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use core_kernel::{Money, PenaltyId, QuoteId, TransactionId, WalletId};

use crate::error::LedgerError;
use crate::payment_method::PaymentMethod;

/// Direction of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Funds into the wallet
    Credit,
    /// Funds out of the wallet
    Debit,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Credit => "credit",
            EntryType::Debit => "debit",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Created but not yet applied to the balance (withdrawal under review)
    Pending,
    /// Applied to the balance; immutable from here on
    Completed,
    /// Terminal failure; the balance effect was reversed or never applied
    Failed,
    /// Corrected by a later adjustment entry
    Reversed,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Completed => "completed",
            EntryStatus::Failed => "failed",
            EntryStatus::Reversed => "reversed",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of marketplace event an entry settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Quote,
    Invoice,
    Penalty,
    Withdrawal,
    Adjustment,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceType::Quote => "quote",
            ReferenceType::Invoice => "invoice",
            ReferenceType::Penalty => "penalty",
            ReferenceType::Withdrawal => "withdrawal",
            ReferenceType::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The idempotency key of a settlement: what the entry settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reference {
    pub reference_type: ReferenceType,
    pub reference_id: Uuid,
}

impl Reference {
    pub fn new(reference_type: ReferenceType, reference_id: Uuid) -> Self {
        Self {
            reference_type,
            reference_id,
        }
    }

    pub fn quote(id: QuoteId) -> Self {
        Self::new(ReferenceType::Quote, id.into())
    }

    pub fn invoice(id: Uuid) -> Self {
        Self::new(ReferenceType::Invoice, id)
    }

    pub fn penalty(id: PenaltyId) -> Self {
        Self::new(ReferenceType::Penalty, id.into())
    }

    pub fn withdrawal(id: TransactionId) -> Self {
        Self::new(ReferenceType::Withdrawal, id.into())
    }

    pub fn adjustment(id: Uuid) -> Self {
        Self::new(ReferenceType::Adjustment, id)
    }

    /// Whether this reference may settle at most once
    ///
    /// Quote, invoice, and penalty references are idempotency keys. Withdrawal
    /// entries reference their own transaction id and adjustments may repeat.
    pub fn is_settlement_key(&self) -> bool {
        matches!(
            self.reference_type,
            ReferenceType::Quote | ReferenceType::Invoice | ReferenceType::Penalty
        )
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.reference_type, self.reference_id)
    }
}

/// An append-only ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier (time-ordered)
    pub id: TransactionId,
    /// Owning wallet
    pub wallet_id: WalletId,
    /// Direction
    pub entry_type: EntryType,
    /// Positive magnitude
    pub amount: Money,
    /// What this entry settles
    pub reference: Reference,
    /// Lifecycle status
    pub status: EntryStatus,
    /// Human-readable description
    pub description: String,
    /// Operator notes (withdrawal decisions)
    pub notes: Option<String>,
    /// Payment method snapshot (withdrawal entries)
    pub method_snapshot: Option<PaymentMethod>,
    /// When the entry was created
    pub created_at: DateTime<Utc>,
    /// When the entry reached a terminal status
    pub processed_at: Option<DateTime<Utc>>,
}

impl LedgerEntry {
    /// The entry's contribution to the balance projection, signed
    pub fn signed_amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Credit => self.amount.amount(),
            EntryType::Debit => -self.amount.amount(),
        }
    }

    /// Returns true once the entry has been applied to the balance
    pub fn is_completed(&self) -> bool {
        self.status == EntryStatus::Completed
    }
}

/// The data needed to append a completed entry
///
/// Drafts validate their amount at construction so malformed movements are
/// rejected before any store access.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub entry_type: EntryType,
    pub amount: Money,
    pub reference: Reference,
    pub description: String,
    /// Commission retained alongside a quote credit, recorded on the wallet's
    /// cumulative counters
    pub commission_recorded: Money,
}

impl EntryDraft {
    /// Creates a credit draft
    ///
    /// A zero credit is allowed: a quote whose net was fully consumed by
    /// penalty deductions still settles, so its idempotency key is recorded.
    pub fn credit(
        amount: Money,
        reference: Reference,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        if amount.is_negative() {
            return Err(LedgerError::validation(format!(
                "credit amount must not be negative, got {amount}"
            )));
        }
        Ok(Self {
            entry_type: EntryType::Credit,
            amount,
            reference,
            description: description.into(),
            commission_recorded: Money::zero(),
        })
    }

    /// Creates a debit draft; the amount must be strictly positive
    pub fn debit(
        amount: Money,
        reference: Reference,
        description: impl Into<String>,
    ) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::validation(format!(
                "debit amount must be positive, got {amount}"
            )));
        }
        Ok(Self {
            entry_type: EntryType::Debit,
            amount,
            reference,
            description: description.into(),
            commission_recorded: Money::zero(),
        })
    }

    /// Records the commission retained alongside this credit
    pub fn with_commission(mut self, commission: Money) -> Self {
        self.commission_recorded = commission;
        self
    }

    /// Applies this draft's balance effect to a wallet
    ///
    /// Every store adapter calls this inside its atomic unit of work, so the
    /// sufficiency checks and counter updates are one code path regardless of
    /// where the wallet is persisted.
    pub fn apply_to(&self, wallet: &mut crate::wallet::Wallet) -> Result<(), LedgerError> {
        match (self.entry_type, self.reference.reference_type) {
            (EntryType::Credit, ReferenceType::Quote | ReferenceType::Invoice) => {
                wallet.settle_credit(self.amount, self.commission_recorded)
            }
            (EntryType::Debit, ReferenceType::Penalty) => wallet.apply_penalty(self.amount),
            (entry_type, ReferenceType::Adjustment) => {
                wallet.apply_adjustment(entry_type, self.amount)
            }
            (entry_type, reference_type) => Err(LedgerError::validation(format!(
                "unsupported settlement: {entry_type} against {reference_type}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signed_amount_follows_the_tag() {
        let reference = Reference::quote(QuoteId::new());
        let entry = LedgerEntry {
            id: TransactionId::new_v7(),
            wallet_id: WalletId::new(),
            entry_type: EntryType::Credit,
            amount: Money::new(dec!(100)),
            reference,
            status: EntryStatus::Completed,
            description: "credit".into(),
            notes: None,
            method_snapshot: None,
            created_at: Utc::now(),
            processed_at: Some(Utc::now()),
        };
        assert_eq!(entry.signed_amount(), dec!(100));

        let debit = LedgerEntry {
            entry_type: EntryType::Debit,
            ..entry
        };
        assert_eq!(debit.signed_amount(), dec!(-100));
    }

    #[test]
    fn test_draft_validation() {
        let reference = Reference::penalty(PenaltyId::new());

        assert!(EntryDraft::debit(Money::zero(), reference, "zero debit").is_err());
        assert!(EntryDraft::debit(Money::new(dec!(-5)), reference, "negative").is_err());
        assert!(EntryDraft::credit(Money::new(dec!(-5)), reference, "negative").is_err());
        assert!(EntryDraft::credit(Money::zero(), reference, "zero credit").is_ok());
    }

    #[test]
    fn test_settlement_keys() {
        assert!(Reference::quote(QuoteId::new()).is_settlement_key());
        assert!(Reference::penalty(PenaltyId::new()).is_settlement_key());
        assert!(!Reference::withdrawal(TransactionId::new()).is_settlement_key());
        assert!(!Reference::adjustment(Uuid::new_v4()).is_settlement_key());
    }

    #[test]
    fn test_reference_display() {
        let id = QuoteId::new();
        let reference = Reference::quote(id);
        assert_eq!(reference.to_string(), format!("quote {}", id.as_uuid()));
    }
}
