//! Quote breakdown calculation
//!
//! Turns a base price and the platform's financial policy into the full
//! monetary breakdown a settlement records: commission, customer markup,
//! contractor net, and VAT.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Money;

use crate::error::PricingError;
use crate::policy::FinancialPolicy;

/// Tolerance when checking a declared base price against the unit-derived
/// total: one minor unit absorbs the rounding of the declared figure.
const UNIT_PRICE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// The monetary breakdown of one approved quote
///
/// Every field is rounded to the currency scale; the arithmetic that produced
/// it ran at full precision. Amounts relate as:
///
/// * `total_user_price = base_price + overprice_amount`
/// * `contractor_net = base_price - commission_amount - penalties_deducted`
/// * `total_payable_with_vat = contractor_net + vat_amount`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    /// Contractor's quoted price
    pub base_price: Money,
    /// Platform commission retained from the contractor's payment
    pub commission_amount: Money,
    /// Markup charged on top to the end customer
    pub overprice_amount: Money,
    /// What the end customer pays
    pub total_user_price: Money,
    /// Outstanding penalties deducted in this settlement
    pub penalties_deducted: Money,
    /// Net amount credited to the contractor
    pub contractor_net: Money,
    /// VAT on the contractor net
    pub vat_amount: Money,
    /// Contractor net including VAT
    pub total_payable_with_vat: Money,
}

impl FinancialPolicy {
    /// Computes the breakdown for a quote
    ///
    /// # Arguments
    ///
    /// * `base_price` - the contractor's quoted price, must be positive
    /// * `penalties` - unprocessed penalty amounts to deduct from the net
    ///
    /// # Errors
    ///
    /// * `InvalidBasePrice` for a zero or negative base price
    /// * `PenaltiesExceedNet` when the deductions would drive the contractor
    ///   net below zero; the quote must not settle until the penalties are
    ///   resolved
    pub fn quote_breakdown(
        &self,
        base_price: Money,
        penalties: &[Money],
    ) -> Result<QuoteBreakdown, PricingError> {
        if !base_price.is_positive() {
            return Err(PricingError::InvalidBasePrice(base_price));
        }

        let commission = self.commission_rate().apply(&base_price);
        let overprice = self.overprice_rate().apply(&base_price);
        let total_user_price = base_price + overprice;

        let penalties_total: Money = penalties.iter().copied().sum();
        let net_before_penalties = base_price - commission;
        let contractor_net = net_before_penalties - penalties_total;
        if contractor_net.is_negative() {
            return Err(PricingError::PenaltiesExceedNet {
                net_before_penalties: net_before_penalties.rounded(),
                penalties: penalties_total.rounded(),
            });
        }

        let vat = self.vat_rate().apply(&contractor_net);
        let total_payable_with_vat = contractor_net + vat;

        Ok(QuoteBreakdown {
            base_price: base_price.rounded(),
            commission_amount: commission.rounded(),
            overprice_amount: overprice.rounded(),
            total_user_price: total_user_price.rounded(),
            penalties_deducted: penalties_total.rounded(),
            contractor_net: contractor_net.rounded(),
            vat_amount: vat.rounded(),
            total_payable_with_vat: total_payable_with_vat.rounded(),
        })
    }

    /// Checks a declared base price against the unit-derived total
    ///
    /// Quotes arrive with both a total and `price_per_unit × system_size`
    /// components. The total is derived data and is never trusted as
    /// submitted; a disagreement beyond one minor unit is rejected.
    pub fn unit_price_check(
        &self,
        declared: Money,
        price_per_unit: Money,
        system_size_kwp: Decimal,
    ) -> Result<(), PricingError> {
        let derived = price_per_unit.multiply(system_size_kwp).rounded();
        let delta = (declared - derived).abs();
        if delta.amount() > UNIT_PRICE_TOLERANCE {
            return Err(PricingError::BasePriceMismatch { declared, derived });
        }
        Ok(())
    }
}
