//! Ledger Domain - Contractor Wallets and Quote Settlement
//!
//! This crate owns the financial heart of the marketplace: the per-contractor
//! wallet, its append-only transaction log, and the settlement engine that
//! turns approved quotes, penalties, and withdrawal decisions into atomic,
//! auditable monetary movements.
//!
//! # Invariants
//!
//! - `current_balance + pending_balance` always equals the signed sum of the
//!   wallet's completed transactions; the log is the source of truth and the
//!   balance is its materialized projection.
//! - Neither balance ever goes negative; a debit that would overdraw fails
//!   before anything is written.
//! - A completed transaction is immutable; corrections are new adjustment
//!   entries.
//! - Each quote, invoice, or penalty reference settles at most once.
//!
//! # Architecture
//!
//! Storage sits behind the [`ports::LedgerStore`] trait. [`memory::MemoryLedger`]
//! is the in-process implementation used by tests and single-node deployments;
//! the `infra_db` crate provides the PostgreSQL implementation with row-level
//! locking. Balance mutation runs through the named transition methods on
//! [`wallet::Wallet`] in either case, so the sufficiency checks and invariant
//! enforcement are a single, testable code path.

pub mod entry;
pub mod error;
pub mod memory;
pub mod payment_method;
pub mod penalty;
pub mod ports;
pub mod quote;
pub mod settlement;
pub mod wallet;

pub use entry::{EntryDraft, EntryStatus, EntryType, LedgerEntry, Reference, ReferenceType};
pub use error::LedgerError;
pub use memory::{MemoryLedger, MemoryPenalties, MemoryQuotes};
pub use payment_method::{PaymentMethod, PaymentMethodConfig};
pub use penalty::{Penalty, PenaltyParty, PenaltyType};
pub use ports::{
    EntryFilter, LedgerStore, Page, PageRequest, PenaltySource, QuoteSource, WithdrawalOutcome,
};
pub use quote::{QuoteApprovalStatus, QuoteFacts};
pub use settlement::{SettlementService, WithdrawalRequest};
pub use wallet::Wallet;
