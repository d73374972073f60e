//! Contractor wallet
//!
//! One wallet per contractor, created lazily on the first financial event and
//! never hard-deleted; suspension is a flag. The balance columns are a
//! materialized projection of the completed entries in the transaction log,
//! maintained incrementally by the transition methods below.
//!
//! Every store adapter runs these same methods inside its atomic unit of
//! work; the sufficiency checks and non-negative invariants live here and
//! nowhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ContractorId, Money, WalletId};

use crate::entry::EntryType;
use crate::error::LedgerError;
use crate::payment_method::PaymentMethodConfig;

/// Per-contractor running balance record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    /// Unique identifier
    pub id: WalletId,
    /// Owning contractor (unique)
    pub contractor_id: ContractorId,
    /// Spendable balance, never negative
    pub current_balance: Money,
    /// Funds held for withdrawals under review, never negative
    pub pending_balance: Money,
    /// Cumulative net credited from settlements, non-decreasing
    pub total_earned: Money,
    /// Cumulative commission retained by the platform, non-decreasing
    pub total_commission_paid: Money,
    /// Cumulative penalties debited, non-decreasing
    pub total_penalties: Money,
    /// Cumulative completed withdrawals, non-decreasing
    pub total_withdrawn: Money,
    /// Configured payout methods, exactly one primary once any are set
    pub payment_methods: Vec<PaymentMethodConfig>,
    pub is_active: bool,
    pub is_suspended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Creates an empty wallet for a contractor
    pub fn new(contractor_id: ContractorId) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::new_v7(),
            contractor_id,
            current_balance: Money::zero(),
            pending_balance: Money::zero(),
            total_earned: Money::zero(),
            total_commission_paid: Money::zero(),
            total_penalties: Money::zero(),
            total_withdrawn: Money::zero(),
            payment_methods: Vec::new(),
            is_active: true,
            is_suspended: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rejects settlement operations against a suspended wallet
    pub fn ensure_operational(&self) -> Result<(), LedgerError> {
        if self.is_suspended {
            return Err(LedgerError::WalletSuspended(self.contractor_id));
        }
        Ok(())
    }

    /// Credits a settlement net and records the commission retained
    pub fn settle_credit(&mut self, net: Money, commission: Money) -> Result<(), LedgerError> {
        self.ensure_operational()?;
        if net.is_negative() || commission.is_negative() {
            return Err(LedgerError::validation(
                "settlement amounts must not be negative",
            ));
        }

        self.current_balance = self.current_balance + net;
        self.total_earned = self.total_earned + net;
        self.total_commission_paid = self.total_commission_paid + commission;
        self.touch();
        Ok(())
    }

    /// Debits a penalty after checking sufficiency
    ///
    /// # Errors
    ///
    /// `InsufficientBalance` with the current figures; the wallet is left
    /// untouched.
    pub fn apply_penalty(&mut self, amount: Money) -> Result<(), LedgerError> {
        self.ensure_operational()?;
        self.ensure_debitable(amount)?;

        self.current_balance = self.current_balance - amount;
        self.total_penalties = self.total_penalties + amount;
        self.touch();
        Ok(())
    }

    /// Moves funds from the spendable balance into the withdrawal hold
    pub fn hold_for_withdrawal(&mut self, amount: Money) -> Result<(), LedgerError> {
        self.ensure_operational()?;
        self.ensure_debitable(amount)?;

        self.current_balance = self.current_balance - amount;
        self.pending_balance = self.pending_balance + amount;
        self.touch();
        Ok(())
    }

    /// Drains a withdrawal hold; the funds permanently leave the wallet
    pub fn complete_withdrawal(&mut self, amount: Money) -> Result<(), LedgerError> {
        if self.pending_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: self.pending_balance,
                requested: amount,
            });
        }

        self.pending_balance = self.pending_balance - amount;
        self.total_withdrawn = self.total_withdrawn + amount;
        self.touch();
        Ok(())
    }

    /// Returns a rejected withdrawal hold to the spendable balance in full
    pub fn release_withdrawal(&mut self, amount: Money) -> Result<(), LedgerError> {
        if self.pending_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: self.pending_balance,
                requested: amount,
            });
        }

        self.pending_balance = self.pending_balance - amount;
        self.current_balance = self.current_balance + amount;
        self.touch();
        Ok(())
    }

    /// Applies a manual adjustment in either direction
    ///
    /// Adjustment debits respect the non-negative floor like any other debit;
    /// adjustments do not move the cumulative counters.
    pub fn apply_adjustment(
        &mut self,
        entry_type: EntryType,
        amount: Money,
    ) -> Result<(), LedgerError> {
        self.ensure_operational()?;
        match entry_type {
            EntryType::Credit => {
                self.current_balance = self.current_balance + amount;
            }
            EntryType::Debit => {
                self.ensure_debitable(amount)?;
                self.current_balance = self.current_balance - amount;
            }
        }
        self.touch();
        Ok(())
    }

    fn ensure_debitable(&self, amount: Money) -> Result<(), LedgerError> {
        if self.current_balance < amount {
            return Err(LedgerError::InsufficientBalance {
                available: self.current_balance,
                requested: amount,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
