//! Integration tests for core error types

use core_kernel::error::CoreError;
use core_kernel::money::{Money, MoneyError};
use rust_decimal::Decimal;

#[test]
fn money_errors_convert_into_core_errors() {
    let money_error = Money::new(Decimal::new(10, 0))
        .divide(Decimal::ZERO)
        .unwrap_err();
    let core: CoreError = money_error.into();

    assert!(matches!(core, CoreError::Money(MoneyError::DivisionByZero)));
    assert!(core.to_string().contains("Division by zero"));
}

#[test]
fn helper_constructors_set_the_variant() {
    let validation = CoreError::validation("amount is malformed");
    assert!(matches!(validation, CoreError::Validation(_)));
    assert!(validation.to_string().contains("amount is malformed"));

    let state = CoreError::invalid_state("cannot settle a rejected quote");
    assert!(matches!(state, CoreError::InvalidStateTransition(_)));

    let missing = CoreError::not_found("wallet");
    assert!(matches!(missing, CoreError::NotFound(_)));
}
