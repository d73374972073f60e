//! Common Test Fixtures
//!
//! Deterministic values used across the test suites. Fixture amounts line up
//! with the documented reference cases (10,000 base price, 300/500 penalty
//! sufficiency pair) so failures read naturally.

use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use core_kernel::{ContractorId, Money, PenaltyId, QuoteId, RequestId};
use domain_pricing::FinancialPolicy;

/// The default platform policy (15% commission, 10% markup, 15% VAT)
pub static DEFAULT_POLICY: Lazy<FinancialPolicy> = Lazy::new(FinancialPolicy::default);

/// Common monetary fixtures
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The reference quote price from the settlement documentation
    pub fn quote_base_price() -> Money {
        Money::new(dec!(10000))
    }

    /// Contractor net for the reference quote under the default policy
    pub fn quote_net() -> Money {
        Money::new(dec!(8500))
    }

    /// A balance too small for [`Self::penalty`]
    pub fn small_balance() -> Money {
        Money::new(dec!(300))
    }

    /// The reference penalty amount
    pub fn penalty() -> Money {
        Money::new(dec!(500))
    }

    /// A withdrawal comfortably above the default minimum
    pub fn withdrawal() -> Money {
        Money::new(dec!(1000))
    }

    /// An amount below the default minimum withdrawal
    pub fn below_minimum() -> Money {
        Money::new(dec!(50))
    }
}

/// Identifier fixtures
pub struct IdFixtures;

impl IdFixtures {
    pub fn contractor_id() -> ContractorId {
        ContractorId::new()
    }

    pub fn quote_id() -> QuoteId {
        QuoteId::new()
    }

    pub fn request_id() -> RequestId {
        RequestId::new()
    }

    pub fn penalty_id() -> PenaltyId {
        PenaltyId::new()
    }
}
