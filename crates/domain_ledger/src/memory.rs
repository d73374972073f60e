//! In-memory ledger store
//!
//! [`MemoryLedger`] implements the full [`LedgerStore`] contract over a
//! mutex-serialized state map. One lock guards all wallets, which trivially
//! satisfies the per-wallet serialization requirement for a single process;
//! the PostgreSQL adapter in `infra_db` provides the multi-process
//! equivalent via row-level locking.
//!
//! The synchronous [`MemoryState`] methods carry the actual semantics and are
//! exercised directly by the property tests; the async trait impls only lock
//! and delegate.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use core_kernel::{ContractorId, Money, PenaltyId, QuoteId, TransactionId};

use crate::entry::{EntryDraft, EntryStatus, EntryType, LedgerEntry, Reference, ReferenceType};
use crate::error::LedgerError;
use crate::payment_method::{PaymentMethod, PaymentMethodConfig};
use crate::penalty::Penalty;
use crate::ports::{
    EntryFilter, LedgerStore, Page, PageRequest, PenaltySource, QuoteSource, WithdrawalOutcome,
};
use crate::quote::QuoteFacts;
use crate::wallet::Wallet;

/// The wallets and the append-only entry log
#[derive(Debug, Default)]
pub struct MemoryState {
    wallets: HashMap<ContractorId, Wallet>,
    entries: Vec<LedgerEntry>,
}

impl MemoryState {
    /// Returns the contractor's wallet, creating it if absent
    pub fn get_or_create(&mut self, contractor_id: ContractorId) -> Wallet {
        self.wallets
            .entry(contractor_id)
            .or_insert_with(|| Wallet::new(contractor_id))
            .clone()
    }

    /// Read access to a wallet
    pub fn wallet(&self, contractor_id: &ContractorId) -> Option<&Wallet> {
        self.wallets.get(contractor_id)
    }

    /// Read access to the full entry log
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Inserts a prepared wallet (test seeding)
    pub fn insert_wallet(&mut self, wallet: Wallet) {
        self.wallets.insert(wallet.contractor_id, wallet);
    }

    /// The completed entry that settled a reference, if any
    pub fn find_settlement(&self, reference: &Reference) -> Option<&LedgerEntry> {
        self.entries
            .iter()
            .find(|e| e.reference == *reference && e.status == EntryStatus::Completed)
    }

    /// Appends a completed entry and applies its balance effect
    ///
    /// The entry insert and the wallet mutation happen under the caller's
    /// exclusive access to the state; a failed transition leaves both
    /// untouched.
    pub fn apply_completed(
        &mut self,
        contractor_id: ContractorId,
        draft: EntryDraft,
    ) -> Result<(LedgerEntry, Wallet), LedgerError> {
        if draft.reference.is_settlement_key() {
            if let Some(existing) = self.find_settlement(&draft.reference) {
                return Err(LedgerError::DuplicateSettlement {
                    reference: draft.reference,
                    transaction_id: existing.id,
                });
            }
        }

        let wallet = self
            .wallets
            .entry(contractor_id)
            .or_insert_with(|| Wallet::new(contractor_id));

        draft.apply_to(wallet)?;

        let now = Utc::now();
        let entry = LedgerEntry {
            id: TransactionId::new_v7(),
            wallet_id: wallet.id,
            entry_type: draft.entry_type,
            amount: draft.amount,
            reference: draft.reference,
            status: EntryStatus::Completed,
            description: draft.description,
            notes: None,
            method_snapshot: None,
            created_at: now,
            processed_at: Some(now),
        };
        self.entries.push(entry.clone());

        Ok((entry, wallet.clone()))
    }

    /// Opens a withdrawal hold and its pending entry
    pub fn open_withdrawal(
        &mut self,
        contractor_id: ContractorId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<(LedgerEntry, Wallet), LedgerError> {
        let wallet = self
            .wallets
            .entry(contractor_id)
            .or_insert_with(|| Wallet::new(contractor_id));

        wallet.hold_for_withdrawal(amount)?;

        let id = TransactionId::new_v7();
        let entry = LedgerEntry {
            id,
            wallet_id: wallet.id,
            entry_type: EntryType::Debit,
            amount,
            reference: Reference::withdrawal(id),
            status: EntryStatus::Pending,
            description: format!("Withdrawal via {method}"),
            notes: None,
            method_snapshot: Some(method),
            created_at: Utc::now(),
            processed_at: None,
        };
        self.entries.push(entry.clone());

        Ok((entry, wallet.clone()))
    }

    /// Resolves a pending withdrawal
    pub fn resolve_withdrawal(
        &mut self,
        transaction_id: TransactionId,
        outcome: WithdrawalOutcome,
        notes: Option<String>,
    ) -> Result<(LedgerEntry, Wallet), LedgerError> {
        let position = self
            .entries
            .iter()
            .position(|e| e.id == transaction_id)
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?;

        let (wallet_id, amount) = {
            let entry = &self.entries[position];
            let is_pending_withdrawal = entry.entry_type == EntryType::Debit
                && entry.reference.reference_type == ReferenceType::Withdrawal
                && entry.status == EntryStatus::Pending;
            if !is_pending_withdrawal {
                return Err(LedgerError::InvalidEntryState {
                    transaction_id,
                    status: entry.status,
                });
            }
            (entry.wallet_id, entry.amount)
        };

        let wallet = self
            .wallets
            .values_mut()
            .find(|w| w.id == wallet_id)
            .ok_or_else(|| LedgerError::store(format!("wallet {wallet_id} missing for entry")))?;

        match outcome {
            WithdrawalOutcome::Completed => wallet.complete_withdrawal(amount)?,
            WithdrawalOutcome::Failed => wallet.release_withdrawal(amount)?,
        }
        let wallet_snapshot = wallet.clone();

        let entry = &mut self.entries[position];
        entry.status = match outcome {
            WithdrawalOutcome::Completed => EntryStatus::Completed,
            WithdrawalOutcome::Failed => EntryStatus::Failed,
        };
        entry.processed_at = Some(Utc::now());
        entry.notes = notes;

        Ok((entry.clone(), wallet_snapshot))
    }

    /// Pages through a contractor's entries, newest first
    pub fn list_entries(
        &self,
        contractor_id: ContractorId,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Page<LedgerEntry> {
        let wallet_id = match self.wallets.get(&contractor_id) {
            Some(wallet) => wallet.id,
            None => {
                return Page {
                    items: Vec::new(),
                    page: page.page(),
                    limit: page.limit(),
                    total: 0,
                }
            }
        };

        let matching: Vec<&LedgerEntry> = self
            .entries
            .iter()
            .rev()
            .filter(|e| e.wallet_id == wallet_id && filter.matches(e))
            .collect();

        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Page {
            items,
            page: page.page(),
            limit: page.limit(),
            total,
        }
    }

    /// Replaces the wallet's payout configuration
    pub fn update_payment_methods(
        &mut self,
        contractor_id: ContractorId,
        methods: Vec<PaymentMethodConfig>,
    ) -> Wallet {
        let wallet = self
            .wallets
            .entry(contractor_id)
            .or_insert_with(|| Wallet::new(contractor_id));
        wallet.payment_methods = methods;
        wallet.updated_at = Utc::now();
        wallet.clone()
    }
}

/// Mutex-serialized in-process ledger store
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<MemoryState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Inserts a prepared wallet (test seeding)
    pub fn seed_wallet(&self, wallet: Wallet) {
        self.state().insert_wallet(wallet);
    }

    /// Snapshot of a contractor's wallet
    pub fn wallet_snapshot(&self, contractor_id: ContractorId) -> Option<Wallet> {
        self.state().wallet(&contractor_id).cloned()
    }

    /// Snapshot of the full entry log
    pub fn entries_snapshot(&self) -> Vec<LedgerEntry> {
        self.state().entries().to_vec()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn get_or_create_wallet(
        &self,
        contractor_id: ContractorId,
    ) -> Result<Wallet, LedgerError> {
        Ok(self.state().get_or_create(contractor_id))
    }

    async fn get_wallet(
        &self,
        contractor_id: ContractorId,
    ) -> Result<Option<Wallet>, LedgerError> {
        Ok(self.state().wallet(&contractor_id).cloned())
    }

    async fn find_settlement(
        &self,
        reference: &Reference,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.state().find_settlement(reference).cloned())
    }

    async fn apply_completed(
        &self,
        contractor_id: ContractorId,
        draft: EntryDraft,
    ) -> Result<(LedgerEntry, Wallet), LedgerError> {
        self.state().apply_completed(contractor_id, draft)
    }

    async fn open_withdrawal(
        &self,
        contractor_id: ContractorId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<(LedgerEntry, Wallet), LedgerError> {
        self.state().open_withdrawal(contractor_id, amount, method)
    }

    async fn resolve_withdrawal(
        &self,
        transaction_id: TransactionId,
        outcome: WithdrawalOutcome,
        notes: Option<String>,
    ) -> Result<(LedgerEntry, Wallet), LedgerError> {
        self.state()
            .resolve_withdrawal(transaction_id, outcome, notes)
    }

    async fn list_entries(
        &self,
        contractor_id: ContractorId,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, LedgerError> {
        Ok(self.state().list_entries(contractor_id, filter, page))
    }

    async fn update_payment_methods(
        &self,
        contractor_id: ContractorId,
        methods: Vec<PaymentMethodConfig>,
    ) -> Result<Wallet, LedgerError> {
        Ok(self.state().update_payment_methods(contractor_id, methods))
    }
}

/// In-memory quote facts for tests and single-node use
#[derive(Debug, Default)]
pub struct MemoryQuotes {
    quotes: Mutex<HashMap<QuoteId, QuoteFacts>>,
}

impl MemoryQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, facts: QuoteFacts) {
        match self.quotes.lock() {
            Ok(mut guard) => guard.insert(facts.id, facts),
            Err(poisoned) => poisoned.into_inner().insert(facts.id, facts),
        };
    }
}

#[async_trait]
impl QuoteSource for MemoryQuotes {
    async fn quote_facts(&self, quote_id: QuoteId) -> Result<Option<QuoteFacts>, LedgerError> {
        let guard = match self.quotes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Ok(guard.get(&quote_id).cloned())
    }
}

/// In-memory penalty records for tests and single-node use
#[derive(Debug, Default)]
pub struct MemoryPenalties {
    penalties: Mutex<HashMap<PenaltyId, Penalty>>,
}

impl MemoryPenalties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, penalty: Penalty) {
        match self.penalties.lock() {
            Ok(mut guard) => guard.insert(penalty.id, penalty),
            Err(poisoned) => poisoned.into_inner().insert(penalty.id, penalty),
        };
    }

    /// Snapshot of a penalty record
    pub fn snapshot(&self, penalty_id: PenaltyId) -> Option<Penalty> {
        let guard = match self.penalties.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get(&penalty_id).cloned()
    }
}

#[async_trait]
impl PenaltySource for MemoryPenalties {
    async fn unprocessed_for_quote(
        &self,
        quote_id: QuoteId,
    ) -> Result<Vec<Penalty>, LedgerError> {
        let guard = match self.penalties.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut matching: Vec<Penalty> = guard
            .values()
            .filter(|p| p.quote_id == Some(quote_id) && !p.is_processed)
            .cloned()
            .collect();
        matching.sort_by_key(|p| p.created_at);
        Ok(matching)
    }

    async fn find(&self, penalty_id: PenaltyId) -> Result<Option<Penalty>, LedgerError> {
        Ok(self.snapshot(penalty_id))
    }

    async fn mark_processed(
        &self,
        penalty_id: PenaltyId,
        transaction_id: TransactionId,
    ) -> Result<(), LedgerError> {
        let mut guard = match self.penalties.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let penalty = guard
            .get_mut(&penalty_id)
            .ok_or_else(|| LedgerError::store(format!("penalty {penalty_id} not found")))?;
        penalty.mark_processed(transaction_id);
        Ok(())
    }
}
