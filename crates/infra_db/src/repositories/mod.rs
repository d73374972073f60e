//! Repository implementations of the domain ports

pub mod ledger;
pub mod penalties;
pub mod quotes;

pub use ledger::PgLedgerStore;
pub use penalties::PgPenaltySource;
pub use quotes::PgQuoteSource;
