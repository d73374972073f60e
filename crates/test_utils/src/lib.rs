//! Test Utilities for the settlement workspace
//!
//! Shared builders, fixtures, assertions, proptest generators, and the
//! Postgres testcontainer harness used across crate test suites.

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;

pub use assertions::{assert_balance_projection, assert_non_negative};
pub use builders::{EntryBuilder, PenaltyBuilder, QuoteBuilder, WalletBuilder};
pub use fixtures::{IdFixtures, MoneyFixtures, DEFAULT_POLICY};
