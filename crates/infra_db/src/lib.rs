//! Infrastructure Database Layer
//!
//! PostgreSQL implementations of the ledger, quote, and penalty ports using
//! SQLx with the repository pattern.
//!
//! # Concurrency discipline
//!
//! The wallet row is the single serialization point per contractor. Every
//! mutating operation runs in one database transaction that locks the wallet
//! row with `SELECT ... FOR UPDATE`, applies the domain transition in Rust,
//! and writes the entry insert and the wallet update together. No operation
//! ever locks more than one wallet, so there is no lock-ordering deadlock
//! between contractors.

pub mod error;
pub mod pool;
pub mod repositories;
pub mod rows;

pub use error::DatabaseError;
pub use pool::{create_pool, DatabaseConfig, DatabasePool};
pub use repositories::{PgLedgerStore, PgPenaltySource, PgQuoteSource};
