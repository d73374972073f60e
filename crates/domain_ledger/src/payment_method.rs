//! Contractor payout methods
//!
//! Contractors configure how withdrawals are paid out. Exactly one method is
//! flagged primary; bank transfers carry the full beneficiary details because
//! the withdrawal entry snapshots the method at request time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::LedgerError;

/// A payout destination
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Bank transfer; all three fields are required
    BankTransfer {
        account_number: String,
        bank_name: String,
        beneficiary_name: String,
    },
    /// Digital wallet payout
    DigitalWallet { provider: String, handle: String },
}

impl PaymentMethod {
    /// Validates the method's required fields
    pub fn validate(&self) -> Result<(), LedgerError> {
        match self {
            PaymentMethod::BankTransfer {
                account_number,
                bank_name,
                beneficiary_name,
            } => {
                for (field, value) in [
                    ("account_number", account_number),
                    ("bank_name", bank_name),
                    ("beneficiary_name", beneficiary_name),
                ] {
                    if value.trim().is_empty() {
                        return Err(LedgerError::validation(format!(
                            "bank transfer method requires {field}"
                        )));
                    }
                }
                Ok(())
            }
            PaymentMethod::DigitalWallet { provider, handle } => {
                if provider.trim().is_empty() || handle.trim().is_empty() {
                    return Err(LedgerError::validation(
                        "digital wallet method requires provider and handle",
                    ));
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::BankTransfer { bank_name, .. } => {
                write!(f, "bank transfer via {bank_name}")
            }
            PaymentMethod::DigitalWallet { provider, .. } => {
                write!(f, "digital wallet via {provider}")
            }
        }
    }
}

/// A configured payout method with its primary flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodConfig {
    pub method: PaymentMethod,
    pub is_primary: bool,
}

impl PaymentMethodConfig {
    pub fn new(method: PaymentMethod, is_primary: bool) -> Self {
        Self { method, is_primary }
    }
}

/// Validates a full method configuration before it is stored
///
/// # Errors
///
/// Rejects an empty list, any invalid method, and any primary count other
/// than exactly one.
pub fn validate_methods(methods: &[PaymentMethodConfig]) -> Result<(), LedgerError> {
    if methods.is_empty() {
        return Err(LedgerError::validation(
            "at least one payment method is required",
        ));
    }

    for config in methods {
        config.method.validate()?;
    }

    let primary_count = methods.iter().filter(|m| m.is_primary).count();
    if primary_count != 1 {
        return Err(LedgerError::validation(format!(
            "exactly one payment method must be primary, found {primary_count}"
        )));
    }

    Ok(())
}
