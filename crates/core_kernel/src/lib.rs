//! Core Kernel - Foundational types for the contractor settlement platform
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money with precise decimal arithmetic in the platform currency
//! - Strongly-typed identifiers for settlement entities
//! - Common error types

pub mod error;
pub mod identifiers;
pub mod money;

pub use error::CoreError;
pub use identifiers::{
    ContractorId, PenaltyId, QuoteId, RequestId, TransactionId, WalletId,
};
pub use money::{Money, MoneyError, Rate, CURRENCY};
