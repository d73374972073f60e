//! Storage ports for the settlement engine
//!
//! The engine is generic over these traits. Implementations must make each
//! mutating operation a single atomic unit of work: the entry insert and the
//! wallet update commit together or not at all, and concurrent operations on
//! the same wallet serialize on that wallet's record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{ContractorId, Money, PenaltyId, QuoteId, TransactionId};

use crate::entry::{EntryDraft, EntryStatus, EntryType, LedgerEntry, Reference, ReferenceType};
use crate::error::LedgerError;
use crate::payment_method::{PaymentMethod, PaymentMethodConfig};
use crate::penalty::Penalty;
use crate::quote::QuoteFacts;
use crate::wallet::Wallet;

/// Maximum page size for transaction history queries
pub const MAX_PAGE_SIZE: u32 = 100;

/// Filters for transaction history queries
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub entry_type: Option<EntryType>,
    pub reference_type: Option<ReferenceType>,
    pub status: Option<EntryStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl EntryFilter {
    /// Returns true when the entry passes every set filter
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if let Some(entry_type) = self.entry_type {
            if entry.entry_type != entry_type {
                return false;
            }
        }
        if let Some(reference_type) = self.reference_type {
            if entry.reference.reference_type != reference_type {
                return false;
            }
        }
        if let Some(status) = self.status {
            if entry.status != status {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if entry.created_at > to {
                return false;
            }
        }
        true
    }
}

/// A 1-based page request with a clamped limit
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, 20)
    }
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            self.total.div_ceil(u64::from(self.limit))
        }
    }
}

/// Outcome of a withdrawal decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalOutcome {
    /// Funds leave the platform; the hold drains into `total_withdrawn`
    Completed,
    /// Transfer rejected or bounced; the hold returns to the spendable balance
    Failed,
}

/// Durable wallet and transaction storage
///
/// The wallet record is the single serialization point per contractor. No
/// implementation may acquire locks on more than one wallet in a single
/// operation.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Returns the contractor's wallet, creating it if absent
    ///
    /// Must be safe under concurrent first calls: insert-or-fetch, not
    /// read-then-insert.
    async fn get_or_create_wallet(
        &self,
        contractor_id: ContractorId,
    ) -> Result<Wallet, LedgerError>;

    /// Returns the contractor's wallet if one exists
    async fn get_wallet(&self, contractor_id: ContractorId)
        -> Result<Option<Wallet>, LedgerError>;

    /// Finds the completed entry that settled a reference, if any
    async fn find_settlement(
        &self,
        reference: &Reference,
    ) -> Result<Option<LedgerEntry>, LedgerError>;

    /// Appends a completed entry and applies its balance effect atomically
    ///
    /// Creates the wallet if this is the contractor's first financial event.
    /// Fails without writing anything on insufficient balance, suspension, or
    /// a duplicate settlement key.
    async fn apply_completed(
        &self,
        contractor_id: ContractorId,
        draft: EntryDraft,
    ) -> Result<(LedgerEntry, Wallet), LedgerError>;

    /// Opens a withdrawal: moves the amount into the pending hold and inserts
    /// the pending entry, atomically
    async fn open_withdrawal(
        &self,
        contractor_id: ContractorId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<(LedgerEntry, Wallet), LedgerError>;

    /// Resolves a pending withdrawal, atomically
    async fn resolve_withdrawal(
        &self,
        transaction_id: TransactionId,
        outcome: WithdrawalOutcome,
        notes: Option<String>,
    ) -> Result<(LedgerEntry, Wallet), LedgerError>;

    /// Lists a contractor's entries, newest first
    async fn list_entries(
        &self,
        contractor_id: ContractorId,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, LedgerError>;

    /// Replaces the wallet's payout method configuration
    async fn update_payment_methods(
        &self,
        contractor_id: ContractorId,
        methods: Vec<PaymentMethodConfig>,
    ) -> Result<Wallet, LedgerError>;
}

/// Read access to quote facts owned by the quote lifecycle collaborator
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote_facts(&self, quote_id: QuoteId) -> Result<Option<QuoteFacts>, LedgerError>;
}

/// Access to penalty records owned by the dispute workflow
#[async_trait]
pub trait PenaltySource: Send + Sync {
    /// Unprocessed penalties attached to a quote
    async fn unprocessed_for_quote(
        &self,
        quote_id: QuoteId,
    ) -> Result<Vec<Penalty>, LedgerError>;

    /// Looks up a penalty by id
    async fn find(&self, penalty_id: PenaltyId) -> Result<Option<Penalty>, LedgerError>;

    /// Links a penalty to the transaction that settled it
    async fn mark_processed(
        &self,
        penalty_id: PenaltyId,
        transaction_id: TransactionId,
    ) -> Result<(), LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_clamps() {
        let page = PageRequest::new(0, 0);
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 1);

        let oversized = PageRequest::new(2, 10_000);
        assert_eq!(oversized.limit(), MAX_PAGE_SIZE);
        assert_eq!(oversized.offset(), 100);
    }

    #[test]
    fn test_total_pages() {
        let page: Page<u32> = Page {
            items: vec![],
            page: 1,
            limit: 20,
            total: 41,
        };
        assert_eq!(page.total_pages(), 3);

        let empty: Page<u32> = Page {
            items: vec![],
            page: 1,
            limit: 20,
            total: 0,
        };
        assert_eq!(empty.total_pages(), 0);
    }
}
