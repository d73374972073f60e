//! Pricing domain errors

use core_kernel::Money;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the pricing domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Base price must be strictly positive
    #[error("Base price must be positive, got {0}")]
    InvalidBasePrice(Money),

    /// A configured percentage is outside `[0, 1)`
    #[error("Rate '{name}' must be in [0, 1), got {value}")]
    InvalidRate { name: &'static str, value: Decimal },

    /// The configured minimum withdrawal must be positive
    #[error("Minimum withdrawal must be positive, got {0}")]
    InvalidMinimumWithdrawal(Money),

    /// Outstanding penalties exceed the contractor's net for this quote
    #[error(
        "Penalties of {penalties} exceed the contractor net of {net_before_penalties}"
    )]
    PenaltiesExceedNet {
        net_before_penalties: Money,
        penalties: Money,
    },

    /// A declared base price disagrees with the derived unit-price total
    #[error("Declared base price {declared} does not match {derived} derived from unit price")]
    BasePriceMismatch { declared: Money, derived: Money },

    /// A configuration value could not be read or parsed
    #[error("Configuration error: {0}")]
    Configuration(String),
}
