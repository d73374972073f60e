//! Financial policy configuration
//!
//! The percentages that drive every settlement calculation. Rates are
//! validated once, when the policy is constructed, never per call.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, Rate};

use crate::error::PricingError;

/// Environment variable holding the commission percentage (e.g. `15`).
pub const ENV_COMMISSION_PERCENT: &str = "SETTLEMENT_COMMISSION_PERCENT";
/// Environment variable holding the customer markup percentage (e.g. `10`).
pub const ENV_OVERPRICE_PERCENT: &str = "SETTLEMENT_OVERPRICE_PERCENT";
/// Environment variable holding the VAT percentage (e.g. `15`).
pub const ENV_VAT_PERCENT: &str = "SETTLEMENT_VAT_PERCENT";
/// Environment variable holding the minimum withdrawal amount (e.g. `100`).
pub const ENV_MIN_WITHDRAWAL: &str = "SETTLEMENT_MIN_WITHDRAWAL";

/// The platform's financial rules
///
/// * `commission_rate` - share of the base price retained by the platform
///   from the contractor's payment.
/// * `overprice_rate` - markup added on top of the base price and charged to
///   the end customer; never paid to the contractor.
/// * `vat_rate` - VAT applied to the contractor's net amount.
/// * `min_withdrawal` - smallest amount a contractor may request to withdraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialPolicy {
    commission_rate: Rate,
    overprice_rate: Rate,
    vat_rate: Rate,
    min_withdrawal: Money,
}

impl FinancialPolicy {
    /// Creates a policy, validating every parameter
    ///
    /// # Errors
    ///
    /// Returns `InvalidRate` for any rate outside `[0, 1)` and
    /// `InvalidMinimumWithdrawal` for a non-positive minimum.
    pub fn new(
        commission_rate: Rate,
        overprice_rate: Rate,
        vat_rate: Rate,
        min_withdrawal: Money,
    ) -> Result<Self, PricingError> {
        for (name, rate) in [
            ("commission_rate", commission_rate),
            ("overprice_rate", overprice_rate),
            ("vat_rate", vat_rate),
        ] {
            if !rate.is_proper_fraction() {
                return Err(PricingError::InvalidRate {
                    name,
                    value: rate.as_decimal(),
                });
            }
        }

        if !min_withdrawal.is_positive() {
            return Err(PricingError::InvalidMinimumWithdrawal(min_withdrawal));
        }

        Ok(Self {
            commission_rate,
            overprice_rate,
            vat_rate,
            min_withdrawal,
        })
    }

    /// Loads the policy from the environment, falling back to defaults
    ///
    /// Percentages are given as whole numbers (`15` for 15%). Validation
    /// happens here, at load time; a malformed or out-of-range value fails
    /// startup rather than a settlement later.
    pub fn from_env() -> Result<Self, PricingError> {
        let commission = read_decimal(ENV_COMMISSION_PERCENT, dec!(15))?;
        let overprice = read_decimal(ENV_OVERPRICE_PERCENT, dec!(10))?;
        let vat = read_decimal(ENV_VAT_PERCENT, dec!(15))?;
        let min_withdrawal = read_decimal(ENV_MIN_WITHDRAWAL, dec!(100))?;

        Self::new(
            Rate::from_percentage(commission),
            Rate::from_percentage(overprice),
            Rate::from_percentage(vat),
            Money::new(min_withdrawal),
        )
    }

    /// Platform commission rate
    pub fn commission_rate(&self) -> Rate {
        self.commission_rate
    }

    /// Customer-side markup rate
    pub fn overprice_rate(&self) -> Rate {
        self.overprice_rate
    }

    /// VAT rate applied to the contractor net
    pub fn vat_rate(&self) -> Rate {
        self.vat_rate
    }

    /// Minimum withdrawal amount
    pub fn min_withdrawal(&self) -> Money {
        self.min_withdrawal
    }
}

impl Default for FinancialPolicy {
    /// Platform defaults: 15% commission, 10% markup, 15% VAT, 100.00 minimum
    fn default() -> Self {
        Self {
            commission_rate: Rate::new(dec!(0.15)),
            overprice_rate: Rate::new(dec!(0.10)),
            vat_rate: Rate::new(dec!(0.15)),
            min_withdrawal: Money::new(dec!(100)),
        }
    }
}

fn read_decimal(var: &str, default: Decimal) -> Result<Decimal, PricingError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<Decimal>()
            .map_err(|e| PricingError::Configuration(format!("{var}: {e}"))),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(e) => Err(PricingError::Configuration(format!("{var}: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = FinancialPolicy::default();
        assert_eq!(policy.commission_rate().as_decimal(), dec!(0.15));
        assert_eq!(policy.overprice_rate().as_decimal(), dec!(0.10));
        assert_eq!(policy.vat_rate().as_decimal(), dec!(0.15));
        assert_eq!(policy.min_withdrawal().amount(), dec!(100));
    }

    #[test]
    fn test_rejects_rate_of_one_or_more() {
        let result = FinancialPolicy::new(
            Rate::new(dec!(1.0)),
            Rate::new(dec!(0.10)),
            Rate::new(dec!(0.15)),
            Money::new(dec!(100)),
        );
        assert!(matches!(
            result,
            Err(PricingError::InvalidRate {
                name: "commission_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_negative_rate() {
        let result = FinancialPolicy::new(
            Rate::new(dec!(0.15)),
            Rate::new(dec!(-0.01)),
            Rate::new(dec!(0.15)),
            Money::new(dec!(100)),
        );
        assert!(matches!(
            result,
            Err(PricingError::InvalidRate {
                name: "overprice_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_zero_minimum_withdrawal() {
        let result = FinancialPolicy::new(
            Rate::new(dec!(0.15)),
            Rate::new(dec!(0.10)),
            Rate::new(dec!(0.15)),
            Money::zero(),
        );
        assert!(matches!(
            result,
            Err(PricingError::InvalidMinimumWithdrawal(_))
        ));
    }

    #[test]
    fn test_zero_rates_are_allowed() {
        let policy = FinancialPolicy::new(
            Rate::new(dec!(0)),
            Rate::new(dec!(0)),
            Rate::new(dec!(0)),
            Money::new(dec!(1)),
        );
        assert!(policy.is_ok());
    }
}
