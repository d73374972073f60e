//! Table-driven and property tests for the financial rules calculator

use core_kernel::{Money, Rate};
use domain_pricing::{FinancialPolicy, PricingError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn policy(commission: Decimal, overprice: Decimal, vat: Decimal) -> FinancialPolicy {
    FinancialPolicy::new(
        Rate::new(commission),
        Rate::new(overprice),
        Rate::new(vat),
        Money::new(dec!(100)),
    )
    .unwrap()
}

#[test]
fn breakdown_table() {
    struct Case {
        name: &'static str,
        base: Decimal,
        commission_rate: Decimal,
        overprice_rate: Decimal,
        vat_rate: Decimal,
        penalties: Vec<Decimal>,
        commission: Decimal,
        user_price: Decimal,
        net: Decimal,
        vat: Decimal,
        payable_with_vat: Decimal,
    }

    let cases = vec![
        Case {
            name: "platform defaults on a 10k quote",
            base: dec!(10000),
            commission_rate: dec!(0.15),
            overprice_rate: dec!(0.10),
            vat_rate: dec!(0.15),
            penalties: vec![],
            commission: dec!(1500.00),
            user_price: dec!(11000.00),
            net: dec!(8500.00),
            vat: dec!(1275.00),
            payable_with_vat: dec!(9775.00),
        },
        Case {
            name: "penalty deducted before VAT",
            base: dec!(10000),
            commission_rate: dec!(0.15),
            overprice_rate: dec!(0.10),
            vat_rate: dec!(0.15),
            penalties: vec![dec!(500)],
            commission: dec!(1500.00),
            user_price: dec!(11000.00),
            net: dec!(8000.00),
            vat: dec!(1200.00),
            payable_with_vat: dec!(9200.00),
        },
        Case {
            name: "zero rates pass the base through",
            base: dec!(1234.56),
            commission_rate: dec!(0),
            overprice_rate: dec!(0),
            vat_rate: dec!(0),
            penalties: vec![],
            commission: dec!(0.00),
            user_price: dec!(1234.56),
            net: dec!(1234.56),
            vat: dec!(0.00),
            payable_with_vat: dec!(1234.56),
        },
        Case {
            name: "fractional base rounds half-up at the edge",
            base: dec!(333.33),
            commission_rate: dec!(0.15),
            overprice_rate: dec!(0.10),
            vat_rate: dec!(0.15),
            penalties: vec![],
            // 333.33 * 0.15 = 49.9995 -> 50.00
            commission: dec!(50.00),
            // 333.33 * 1.10 = 366.663 -> 366.66
            user_price: dec!(366.66),
            // 333.33 - 49.9995 = 283.3305 -> 283.33
            net: dec!(283.33),
            // 283.3305 * 0.15 = 42.499575 -> 42.50
            vat: dec!(42.50),
            // 283.3305 * 1.15 = 325.830075 -> 325.83
            payable_with_vat: dec!(325.83),
        },
    ];

    for case in cases {
        let policy = policy(case.commission_rate, case.overprice_rate, case.vat_rate);
        let penalties: Vec<Money> = case.penalties.iter().copied().map(Money::new).collect();
        let breakdown = policy
            .quote_breakdown(Money::new(case.base), &penalties)
            .unwrap_or_else(|e| panic!("{}: {e}", case.name));

        assert_eq!(breakdown.commission_amount.amount(), case.commission, "{}", case.name);
        assert_eq!(breakdown.total_user_price.amount(), case.user_price, "{}", case.name);
        assert_eq!(breakdown.contractor_net.amount(), case.net, "{}", case.name);
        assert_eq!(breakdown.vat_amount.amount(), case.vat, "{}", case.name);
        assert_eq!(
            breakdown.total_payable_with_vat.amount(),
            case.payable_with_vat,
            "{}",
            case.name
        );
    }
}

#[test]
fn penalties_equal_to_net_settle_at_zero() {
    let policy = policy(dec!(0.15), dec!(0.10), dec!(0.15));
    let breakdown = policy
        .quote_breakdown(Money::new(dec!(1000)), &[Money::new(dec!(850))])
        .unwrap();

    assert_eq!(breakdown.contractor_net.amount(), dec!(0.00));
    assert_eq!(breakdown.vat_amount.amount(), dec!(0.00));
}

#[test]
fn penalties_over_net_are_rejected_not_clamped() {
    let policy = policy(dec!(0.15), dec!(0.10), dec!(0.15));
    let result = policy.quote_breakdown(Money::new(dec!(1000)), &[Money::new(dec!(850.01))]);

    match result {
        Err(PricingError::PenaltiesExceedNet {
            net_before_penalties,
            penalties,
        }) => {
            assert_eq!(net_before_penalties.amount(), dec!(850.00));
            assert_eq!(penalties.amount(), dec!(850.01));
        }
        other => panic!("expected PenaltiesExceedNet, got {other:?}"),
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn base_price_strategy() -> impl Strategy<Value = Money> {
        // 1.00 to 10,000,000.00 in halalas
        (100i64..1_000_000_000i64).prop_map(Money::from_minor)
    }

    fn rate_strategy() -> impl Strategy<Value = Decimal> {
        (0u32..10_000u32).prop_map(|n| Decimal::new(n as i64, 4))
    }

    proptest! {
        #[test]
        fn base_price_reassembles_from_parts(
            base in base_price_strategy(),
            commission_rate in rate_strategy(),
            overprice_rate in rate_strategy(),
            vat_rate in rate_strategy(),
        ) {
            let policy = policy(commission_rate, overprice_rate, vat_rate);
            let breakdown = policy.quote_breakdown(base, &[]).unwrap();

            // commission + net equals the base up to output rounding of each part
            let reassembled = breakdown.commission_amount + breakdown.contractor_net;
            let delta = (reassembled - base.rounded()).abs();
            prop_assert!(delta.amount() <= dec!(0.01));
        }

        #[test]
        fn user_price_is_never_below_base(
            base in base_price_strategy(),
            overprice_rate in rate_strategy(),
        ) {
            let policy = policy(dec!(0.15), overprice_rate, dec!(0.15));
            let breakdown = policy.quote_breakdown(base, &[]).unwrap();

            prop_assert!(breakdown.total_user_price >= breakdown.base_price);
        }

        #[test]
        fn contractor_net_is_never_negative(
            base in base_price_strategy(),
            commission_rate in rate_strategy(),
            penalty_minor in 0i64..1_000_000i64,
        ) {
            let policy = policy(commission_rate, dec!(0.10), dec!(0.15));
            let penalty = Money::from_minor(penalty_minor);

            match policy.quote_breakdown(base, &[penalty]) {
                Ok(breakdown) => prop_assert!(!breakdown.contractor_net.is_negative()),
                Err(PricingError::PenaltiesExceedNet { .. }) => {}
                Err(e) => return Err(TestCaseError::fail(format!("unexpected error: {e}"))),
            }
        }
    }
}
