//! Ledger domain errors
//!
//! The taxonomy follows the settlement contract: validation failures are
//! rejected before any store access, business-rule failures after read but
//! before any write (always carrying current-state context), conflicts are
//! retryable, and store failures are infrastructure faults the caller may
//! retry because every operation is idempotent per reference.

use thiserror::Error;

use core_kernel::{ContractorId, Money, QuoteId, TransactionId};
use domain_pricing::PricingError;

use crate::entry::{EntryStatus, Reference};
use crate::quote::QuoteApprovalStatus;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Malformed input, rejected before touching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// A pricing rule rejected the settlement
    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    /// A debit would overdraw the wallet
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance {
        available: Money,
        requested: Money,
    },

    /// A withdrawal request below the configured minimum
    #[error("Withdrawal of {requested} is below the minimum of {minimum}")]
    BelowMinimumWithdrawal {
        minimum: Money,
        requested: Money,
    },

    /// The reference has already been settled
    #[error("{reference} was already settled by transaction {transaction_id}")]
    DuplicateSettlement {
        reference: Reference,
        transaction_id: TransactionId,
    },

    /// The quote is not in a payable state
    #[error("Quote {quote_id} is not payable (status: {status}, selected: {is_selected})")]
    InvalidQuoteState {
        quote_id: QuoteId,
        status: QuoteApprovalStatus,
        is_selected: bool,
    },

    /// The wallet is suspended; no settlement may touch it
    #[error("Wallet for contractor {0} is suspended")]
    WalletSuspended(ContractorId),

    /// The transaction is not in a state that permits the transition
    #[error("Transaction {transaction_id} cannot transition from status {status}")]
    InvalidEntryState {
        transaction_id: TransactionId,
        status: EntryStatus,
    },

    /// Quote not found
    #[error("Quote not found: {0}")]
    QuoteNotFound(QuoteId),

    /// Transaction not found
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// A concurrent update conflicted; the caller may retry the operation
    #[error("Conflicting concurrent update: {0}")]
    Conflict(String),

    /// The underlying store failed
    #[error("Ledger store error: {0}")]
    Store(String),
}

impl LedgerError {
    /// Creates a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    /// Creates a store error from any displayable source
    pub fn store(source: impl std::fmt::Display) -> Self {
        LedgerError::Store(source.to_string())
    }

    /// Returns true for business-rule rejections
    ///
    /// These are expected outcomes, not faults; they must never be retried
    /// automatically and are the caller's responsibility to present.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            LedgerError::Pricing(_)
                | LedgerError::InsufficientBalance { .. }
                | LedgerError::BelowMinimumWithdrawal { .. }
                | LedgerError::DuplicateSettlement { .. }
                | LedgerError::InvalidQuoteState { .. }
                | LedgerError::WalletSuspended(_)
                | LedgerError::InvalidEntryState { .. }
        )
    }

    /// Returns true when retrying the whole operation may succeed
    ///
    /// Safe because settlement operations are idempotent per reference id.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::Conflict(_) | LedgerError::Store(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_classification() {
        let insufficient = LedgerError::InsufficientBalance {
            available: Money::new(Decimal::new(300, 0)),
            requested: Money::new(Decimal::new(500, 0)),
        };
        assert!(insufficient.is_business_rule());
        assert!(!insufficient.is_retryable());

        let conflict = LedgerError::Conflict("serialization failure".into());
        assert!(conflict.is_retryable());
        assert!(!conflict.is_business_rule());

        let validation = LedgerError::validation("bad amount");
        assert!(!validation.is_business_rule());
        assert!(!validation.is_retryable());
    }

    #[test]
    fn test_insufficient_balance_message_carries_context() {
        let err = LedgerError::InsufficientBalance {
            available: Money::new(Decimal::new(300, 0)),
            requested: Money::new(Decimal::new(500, 0)),
        };
        let message = err.to_string();
        assert!(message.contains("500.00"));
        assert!(message.contains("300.00"));
    }
}
