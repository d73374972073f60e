//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values using
//! rust_decimal for precise calculations without floating-point errors. The
//! platform settles in a single currency; amounts never carry a per-value
//! currency tag.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use thiserror::Error;

/// ISO 4217 code of the single platform currency.
pub const CURRENCY: &str = "SAR";

/// Decimal places of the platform currency's minor unit (halalas).
pub const CURRENCY_SCALE: u32 = 2;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount in the platform currency
///
/// Money keeps full decimal precision internally; rounding to the currency
/// scale happens once, at the edge of a calculation, via [`Money::rounded`].
/// Monetary rounding is round-half-up, away from zero on the midpoint.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Creates Money from an integer amount in minor units (halalas)
    pub fn from_minor(minor_units: i64) -> Self {
        Self(Decimal::new(minor_units, CURRENCY_SCALE))
    }

    /// Returns the zero amount
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Returns the raw decimal amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Rounds to the currency scale using round-half-up
    ///
    /// This is the only rounding step in any monetary calculation; callers
    /// keep full precision until the final output value.
    pub fn rounded(&self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Checked addition
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Money)
            .ok_or(MoneyError::Overflow)
    }

    /// Multiplies by a scalar (e.g., for rate calculations)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self(self.0 * factor)
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self(self.0 / divisor))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} {}", self.0, CURRENCY)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, divisor: Decimal) -> Self {
        self.divide(divisor).expect("Division by zero in Money::div")
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Represents a percentage rate (e.g., commission rate, VAT rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(Decimal);

impl Rate {
    /// Creates a rate from a decimal value (e.g., 0.15 for 15%)
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Creates a rate from a percentage (e.g., 15.0 for 15%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self(percentage / dec!(100))
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0 * dec!(100)
    }

    /// Returns true if the rate lies in `[0, 1)`
    ///
    /// Configured percentages must be proper fractions of the base amount; a
    /// 100% commission or markup is a configuration mistake, not a tariff.
    pub fn is_proper_fraction(&self) -> bool {
        self.0 >= Decimal::ZERO && self.0 < Decimal::ONE
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Money {
        money.multiply(self.0)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50));
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00));
        let b = Money::new(dec!(50.00));

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
        assert_eq!((-a).amount(), dec!(-100.00));
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(Money::new(dec!(1.005)).rounded().amount(), dec!(1.01));
        assert_eq!(Money::new(dec!(1.004)).rounded().amount(), dec!(1.00));
        assert_eq!(Money::new(dec!(-1.005)).rounded().amount(), dec!(-1.01));
        assert_eq!(Money::new(dec!(2.675)).rounded().amount(), dec!(2.68));
    }

    #[test]
    fn test_rounding_only_at_the_edge() {
        // 0.345 * 2 at full precision is 0.69; rounding each operand first
        // would give 0.70. The type keeps full precision until rounded().
        let m = Money::new(dec!(0.345));
        let doubled = m + m;
        assert_eq!(doubled.rounded().amount(), dec!(0.69));
    }

    #[test]
    fn test_division_by_zero() {
        let m = Money::new(dec!(10));
        assert_eq!(m.divide(Decimal::ZERO), Err(MoneyError::DivisionByZero));
    }

    #[test]
    fn test_rate_application() {
        let rate = Rate::from_percentage(dec!(15.0));
        let amount = Money::new(dec!(10000.00));

        assert_eq!(rate.apply(&amount).amount(), dec!(1500.00));
    }

    #[test]
    fn test_rate_proper_fraction() {
        assert!(Rate::new(dec!(0)).is_proper_fraction());
        assert!(Rate::new(dec!(0.15)).is_proper_fraction());
        assert!(Rate::new(dec!(0.999)).is_proper_fraction());
        assert!(!Rate::new(dec!(1)).is_proper_fraction());
        assert!(!Rate::new(dec!(-0.1)).is_proper_fraction());
    }

    #[test]
    fn test_display() {
        let m = Money::new(dec!(1234.5));
        assert_eq!(m.to_string(), "1234.50 SAR");
    }
}
