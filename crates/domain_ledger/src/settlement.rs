//! Settlement engine
//!
//! Orchestrates the state machines that turn marketplace events into ledger
//! movements:
//!
//! * quote payment: approved+selected quote -> breakdown -> completed credit
//! * penalty: sufficiency check -> completed debit -> penalty marked processed
//! * withdrawal: request -> pending hold -> operator decision -> completed or
//!   failed (fully reversible)
//!
//! The engine holds no state of its own; atomicity and per-wallet
//! serialization are the store's contract. Every operation is idempotent per
//! reference id, so callers may retry infrastructure failures wholesale.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use core_kernel::{ContractorId, Money, PenaltyId, QuoteId, TransactionId};
use domain_pricing::FinancialPolicy;

use crate::entry::{EntryDraft, EntryType, LedgerEntry, Reference};
use crate::error::LedgerError;
use crate::payment_method::{validate_methods, PaymentMethod, PaymentMethodConfig};
use crate::ports::{
    EntryFilter, LedgerStore, Page, PageRequest, PenaltySource, QuoteSource, WithdrawalOutcome,
};
use crate::wallet::Wallet;

/// A withdrawal request held for operator review
#[derive(Debug, Clone)]
pub struct WithdrawalRequest {
    /// The pending debit entry; its id is what `decide_withdrawal` takes
    pub transaction: LedgerEntry,
    /// Spendable balance after the hold
    pub current_balance: Money,
    /// Held balance including this request
    pub pending_balance: Money,
}

/// The settlement engine
///
/// Generic over the ledger store and the two collaborator read models so the
/// same orchestration runs against the in-memory store in tests and the
/// PostgreSQL store in production.
pub struct SettlementService<L, Q, P> {
    policy: FinancialPolicy,
    store: Arc<L>,
    quotes: Arc<Q>,
    penalties: Arc<P>,
}

impl<L, Q, P> Clone for SettlementService<L, Q, P> {
    fn clone(&self) -> Self {
        Self {
            policy: self.policy,
            store: Arc::clone(&self.store),
            quotes: Arc::clone(&self.quotes),
            penalties: Arc::clone(&self.penalties),
        }
    }
}

impl<L, Q, P> SettlementService<L, Q, P>
where
    L: LedgerStore,
    Q: QuoteSource,
    P: PenaltySource,
{
    /// Creates the engine over a store and the collaborator read models
    pub fn new(policy: FinancialPolicy, store: Arc<L>, quotes: Arc<Q>, penalties: Arc<P>) -> Self {
        Self {
            policy,
            store,
            quotes,
            penalties,
        }
    }

    /// The financial policy this engine settles under
    pub fn policy(&self) -> &FinancialPolicy {
        &self.policy
    }

    /// Returns the contractor's wallet, creating it on first use
    pub async fn get_or_create_wallet(
        &self,
        contractor_id: ContractorId,
    ) -> Result<Wallet, LedgerError> {
        self.store.get_or_create_wallet(contractor_id).await
    }

    /// Settles an approved, selected, externally-paid quote into the
    /// contractor's wallet
    ///
    /// Computes the breakdown (deducting the quote's unprocessed
    /// contractor-side penalties), credits the net atomically, and marks the
    /// consumed penalties processed.
    ///
    /// # Errors
    ///
    /// * `QuoteNotFound` / `InvalidQuoteState` before anything is read from
    ///   the ledger
    /// * `DuplicateSettlement` if the quote already settled; the error carries
    ///   the existing transaction id and the wallet is untouched
    /// * `Pricing` if the penalties exceed the contractor net
    pub async fn process_quote_payment(
        &self,
        quote_id: QuoteId,
    ) -> Result<LedgerEntry, LedgerError> {
        let facts = self
            .quotes
            .quote_facts(quote_id)
            .await?
            .ok_or(LedgerError::QuoteNotFound(quote_id))?;

        if !facts.is_payable() {
            return Err(LedgerError::InvalidQuoteState {
                quote_id,
                status: facts.admin_status,
                is_selected: facts.is_selected,
            });
        }

        let reference = Reference::quote(quote_id);
        if let Some(existing) = self.store.find_settlement(&reference).await? {
            return Err(LedgerError::DuplicateSettlement {
                reference,
                transaction_id: existing.id,
            });
        }

        let penalties: Vec<_> = self
            .penalties
            .unprocessed_for_quote(quote_id)
            .await?
            .into_iter()
            .filter(|p| p.affects_contractor())
            .collect();
        let penalty_amounts: Vec<Money> = penalties.iter().map(|p| p.amount).collect();

        let breakdown = self
            .policy
            .quote_breakdown(facts.base_price, &penalty_amounts)?;

        let draft = EntryDraft::credit(
            breakdown.contractor_net,
            reference,
            format!(
                "Quote payment: {} less {} commission",
                facts.base_price.rounded(),
                breakdown.commission_amount
            ),
        )?
        .with_commission(breakdown.commission_amount);

        let (entry, wallet) = self.store.apply_completed(facts.contractor_id, draft).await?;

        for penalty in &penalties {
            self.penalties.mark_processed(penalty.id, entry.id).await?;
        }

        info!(
            wallet_id = %wallet.id,
            quote_id = %quote_id,
            transaction_id = %entry.id,
            amount = %entry.amount,
            penalties = penalties.len(),
            "quote payment settled"
        );
        Ok(entry)
    }

    /// Debits a penalty from the contractor's wallet
    ///
    /// Insufficient balance is a business-rule rejection carrying the current
    /// figures; nothing is written and the operation is never retried
    /// automatically.
    pub async fn process_penalty(
        &self,
        contractor_id: ContractorId,
        amount: Money,
        reason: &str,
        penalty_id: PenaltyId,
    ) -> Result<LedgerEntry, LedgerError> {
        let amount = amount.rounded();
        if !amount.is_positive() {
            return Err(LedgerError::validation(format!(
                "penalty amount must be positive, got {amount}"
            )));
        }

        let reference = Reference::penalty(penalty_id);
        if let Some(existing) = self.store.find_settlement(&reference).await? {
            return Err(LedgerError::DuplicateSettlement {
                reference,
                transaction_id: existing.id,
            });
        }

        let draft = EntryDraft::debit(amount, reference, format!("Penalty: {reason}"))?;
        let (entry, wallet) = match self.store.apply_completed(contractor_id, draft).await {
            Ok(applied) => applied,
            Err(err) => {
                if err.is_business_rule() {
                    warn!(
                        contractor_id = %contractor_id,
                        penalty_id = %penalty_id,
                        amount = %amount,
                        %err,
                        "penalty rejected"
                    );
                }
                return Err(err);
            }
        };

        if let Some(record) = self.penalties.find(penalty_id).await? {
            if !record.is_processed {
                self.penalties.mark_processed(record.id, entry.id).await?;
            }
        }

        info!(
            wallet_id = %wallet.id,
            penalty_id = %penalty_id,
            transaction_id = %entry.id,
            amount = %amount,
            "penalty settled"
        );
        Ok(entry)
    }

    /// Opens a withdrawal request: validates the payout method and the
    /// minimum, then moves the amount into the pending hold
    pub async fn request_withdrawal(
        &self,
        contractor_id: ContractorId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<WithdrawalRequest, LedgerError> {
        method.validate()?;

        let amount = amount.rounded();
        if !amount.is_positive() {
            return Err(LedgerError::validation(format!(
                "withdrawal amount must be positive, got {amount}"
            )));
        }
        if amount < self.policy.min_withdrawal() {
            return Err(LedgerError::BelowMinimumWithdrawal {
                minimum: self.policy.min_withdrawal(),
                requested: amount,
            });
        }

        let (entry, wallet) = self
            .store
            .open_withdrawal(contractor_id, amount, method)
            .await?;

        info!(
            wallet_id = %wallet.id,
            transaction_id = %entry.id,
            amount = %amount,
            "withdrawal requested"
        );
        Ok(WithdrawalRequest {
            transaction: entry,
            current_balance: wallet.current_balance,
            pending_balance: wallet.pending_balance,
        })
    }

    /// Applies an operator's withdrawal decision (admin operation)
    ///
    /// `Completed` permanently drains the hold; `Failed` restores the
    /// spendable balance to exactly its pre-request value.
    pub async fn decide_withdrawal(
        &self,
        transaction_id: TransactionId,
        outcome: WithdrawalOutcome,
        notes: Option<String>,
    ) -> Result<LedgerEntry, LedgerError> {
        let (entry, wallet) = self
            .store
            .resolve_withdrawal(transaction_id, outcome, notes)
            .await?;

        info!(
            wallet_id = %wallet.id,
            transaction_id = %entry.id,
            status = %entry.status,
            "withdrawal decided"
        );
        Ok(entry)
    }

    /// Pages through a contractor's transaction history, newest first
    pub async fn transaction_history(
        &self,
        contractor_id: ContractorId,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, LedgerError> {
        self.store.list_entries(contractor_id, filter, page).await
    }

    /// Replaces the contractor's payout methods
    ///
    /// Exactly one method must be primary; bank transfers must carry account
    /// number, bank name, and beneficiary name.
    pub async fn update_payment_methods(
        &self,
        contractor_id: ContractorId,
        methods: Vec<PaymentMethodConfig>,
    ) -> Result<Wallet, LedgerError> {
        validate_methods(&methods)?;
        self.store
            .update_payment_methods(contractor_id, methods)
            .await
    }

    /// Records a manual correction entry (admin operation)
    ///
    /// Completed entries are immutable; this is the sanctioned correction
    /// path. Debit adjustments respect the non-negative balance floor.
    pub async fn record_adjustment(
        &self,
        contractor_id: ContractorId,
        entry_type: EntryType,
        amount: Money,
        reason: &str,
    ) -> Result<LedgerEntry, LedgerError> {
        let amount = amount.rounded();
        if !amount.is_positive() {
            return Err(LedgerError::validation(format!(
                "adjustment amount must be positive, got {amount}"
            )));
        }

        let reference = Reference::adjustment(Uuid::new_v4());
        let description = format!("Adjustment: {reason}");
        let draft = match entry_type {
            EntryType::Credit => EntryDraft::credit(amount, reference, description)?,
            EntryType::Debit => EntryDraft::debit(amount, reference, description)?,
        };

        let (entry, wallet) = self.store.apply_completed(contractor_id, draft).await?;

        info!(
            wallet_id = %wallet.id,
            transaction_id = %entry.id,
            entry_type = %entry.entry_type,
            amount = %amount,
            "adjustment recorded"
        );
        Ok(entry)
    }
}
