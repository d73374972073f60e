//! Database row types and conversions
//!
//! Row structs mirror the table layouts; fallible conversions turn them into
//! domain types. Enumerations are stored as text and validated on the way
//! out, so a corrupted row surfaces as a decoding error instead of a panic.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use core_kernel::{ContractorId, Money, PenaltyId, QuoteId, RequestId, TransactionId, WalletId};
use domain_ledger::entry::{EntryStatus, EntryType, LedgerEntry, Reference, ReferenceType};
use domain_ledger::payment_method::{PaymentMethod, PaymentMethodConfig};
use domain_ledger::penalty::{Penalty, PenaltyParty, PenaltyType};
use domain_ledger::quote::{QuoteApprovalStatus, QuoteFacts};
use domain_ledger::wallet::Wallet;

use crate::error::DatabaseError;

/// Row of the `wallets` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WalletRow {
    pub wallet_id: Uuid,
    pub contractor_id: Uuid,
    pub current_balance: Decimal,
    pub pending_balance: Decimal,
    pub total_earned: Decimal,
    pub total_commission_paid: Decimal,
    pub total_penalties: Decimal,
    pub total_withdrawn: Decimal,
    pub payment_methods: serde_json::Value,
    pub is_active: bool,
    pub is_suspended: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WalletRow {
    pub fn into_domain(self) -> Result<Wallet, DatabaseError> {
        let payment_methods: Vec<PaymentMethodConfig> =
            serde_json::from_value(self.payment_methods)
                .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        Ok(Wallet {
            id: WalletId::from_uuid(self.wallet_id),
            contractor_id: ContractorId::from_uuid(self.contractor_id),
            current_balance: Money::new(self.current_balance),
            pending_balance: Money::new(self.pending_balance),
            total_earned: Money::new(self.total_earned),
            total_commission_paid: Money::new(self.total_commission_paid),
            total_penalties: Money::new(self.total_penalties),
            total_withdrawn: Money::new(self.total_withdrawn),
            payment_methods,
            is_active: self.is_active,
            is_suspended: self.is_suspended,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row of the `wallet_transactions` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EntryRow {
    pub transaction_id: Uuid,
    pub wallet_id: Uuid,
    pub entry_type: String,
    pub amount: Decimal,
    pub reference_type: String,
    pub reference_id: Uuid,
    pub status: String,
    pub description: String,
    pub notes: Option<String>,
    pub method_snapshot: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl EntryRow {
    pub fn into_domain(self) -> Result<LedgerEntry, DatabaseError> {
        let method_snapshot: Option<PaymentMethod> = self
            .method_snapshot
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| DatabaseError::SerializationError(e.to_string()))?;

        Ok(LedgerEntry {
            id: TransactionId::from_uuid(self.transaction_id),
            wallet_id: WalletId::from_uuid(self.wallet_id),
            entry_type: parse_entry_type(&self.entry_type)?,
            amount: Money::new(self.amount),
            reference: Reference::new(
                parse_reference_type(&self.reference_type)?,
                self.reference_id,
            ),
            status: parse_entry_status(&self.status)?,
            description: self.description,
            notes: self.notes,
            method_snapshot,
            created_at: self.created_at,
            processed_at: self.processed_at,
        })
    }
}

/// Row of the `quotes` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuoteRow {
    pub quote_id: Uuid,
    pub request_id: Uuid,
    pub contractor_id: Uuid,
    pub base_price: Decimal,
    pub price_per_unit: Decimal,
    pub system_size_kwp: Decimal,
    pub is_selected: bool,
    pub admin_status: String,
}

impl QuoteRow {
    pub fn into_domain(self) -> Result<QuoteFacts, DatabaseError> {
        Ok(QuoteFacts {
            id: QuoteId::from_uuid(self.quote_id),
            request_id: RequestId::from_uuid(self.request_id),
            contractor_id: ContractorId::from_uuid(self.contractor_id),
            base_price: Money::new(self.base_price),
            price_per_unit: Money::new(self.price_per_unit),
            system_size_kwp: self.system_size_kwp,
            is_selected: self.is_selected,
            admin_status: parse_quote_status(&self.admin_status)?,
        })
    }
}

/// Row of the `penalties` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PenaltyRow {
    pub penalty_id: Uuid,
    pub quote_id: Option<Uuid>,
    pub request_id: Option<Uuid>,
    pub penalty_type: String,
    pub amount: Decimal,
    pub applied_to: String,
    pub reason: String,
    pub is_processed: bool,
    pub transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl PenaltyRow {
    pub fn into_domain(self) -> Result<Penalty, DatabaseError> {
        Ok(Penalty {
            id: PenaltyId::from_uuid(self.penalty_id),
            quote_id: self.quote_id.map(QuoteId::from_uuid),
            request_id: self.request_id.map(RequestId::from_uuid),
            penalty_type: parse_penalty_type(&self.penalty_type)?,
            amount: Money::new(self.amount),
            applied_to: parse_penalty_party(&self.applied_to)?,
            reason: self.reason,
            is_processed: self.is_processed,
            transaction_id: self.transaction_id.map(TransactionId::from_uuid),
            created_at: self.created_at,
        })
    }
}

/// Serializes a payout configuration for the JSONB column
pub fn methods_to_json(
    methods: &[PaymentMethodConfig],
) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(methods).map_err(|e| DatabaseError::SerializationError(e.to_string()))
}

/// Serializes a payout method snapshot for the JSONB column
pub fn method_to_json(method: &PaymentMethod) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(method).map_err(|e| DatabaseError::SerializationError(e.to_string()))
}

fn unknown(kind: &str, value: &str) -> DatabaseError {
    DatabaseError::SerializationError(format!("unknown {kind}: '{value}'"))
}

pub fn parse_entry_type(value: &str) -> Result<EntryType, DatabaseError> {
    match value {
        "credit" => Ok(EntryType::Credit),
        "debit" => Ok(EntryType::Debit),
        other => Err(unknown("entry_type", other)),
    }
}

pub fn parse_entry_status(value: &str) -> Result<EntryStatus, DatabaseError> {
    match value {
        "pending" => Ok(EntryStatus::Pending),
        "completed" => Ok(EntryStatus::Completed),
        "failed" => Ok(EntryStatus::Failed),
        "reversed" => Ok(EntryStatus::Reversed),
        other => Err(unknown("status", other)),
    }
}

pub fn parse_reference_type(value: &str) -> Result<ReferenceType, DatabaseError> {
    match value {
        "quote" => Ok(ReferenceType::Quote),
        "invoice" => Ok(ReferenceType::Invoice),
        "penalty" => Ok(ReferenceType::Penalty),
        "withdrawal" => Ok(ReferenceType::Withdrawal),
        "adjustment" => Ok(ReferenceType::Adjustment),
        other => Err(unknown("reference_type", other)),
    }
}

pub fn parse_quote_status(value: &str) -> Result<QuoteApprovalStatus, DatabaseError> {
    match value {
        "pending_review" => Ok(QuoteApprovalStatus::PendingReview),
        "approved" => Ok(QuoteApprovalStatus::Approved),
        "rejected" => Ok(QuoteApprovalStatus::Rejected),
        "revision_needed" => Ok(QuoteApprovalStatus::RevisionNeeded),
        other => Err(unknown("admin_status", other)),
    }
}

pub fn parse_penalty_type(value: &str) -> Result<PenaltyType, DatabaseError> {
    match value {
        "contractor_cancellation" => Ok(PenaltyType::ContractorCancellation),
        "installation_delay" => Ok(PenaltyType::InstallationDelay),
        "quality_dispute" => Ok(PenaltyType::QualityDispute),
        "other" => Ok(PenaltyType::Other),
        other => Err(unknown("penalty_type", other)),
    }
}

pub fn parse_penalty_party(value: &str) -> Result<PenaltyParty, DatabaseError> {
    match value {
        "user" => Ok(PenaltyParty::User),
        "contractor" => Ok(PenaltyParty::Contractor),
        "both" => Ok(PenaltyParty::Both),
        other => Err(unknown("applied_to", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wallet_row_round_trip() {
        let row = WalletRow {
            wallet_id: Uuid::new_v4(),
            contractor_id: Uuid::new_v4(),
            current_balance: dec!(8500.00),
            pending_balance: dec!(0),
            total_earned: dec!(8500.00),
            total_commission_paid: dec!(1500.00),
            total_penalties: dec!(0),
            total_withdrawn: dec!(0),
            payment_methods: serde_json::json!([]),
            is_active: true,
            is_suspended: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let wallet = row.clone().into_domain().unwrap();
        assert_eq!(wallet.current_balance.amount(), dec!(8500.00));
        assert_eq!(*wallet.id.as_uuid(), row.wallet_id);
        assert!(wallet.payment_methods.is_empty());
    }

    #[test]
    fn test_wallet_row_rejects_malformed_methods() {
        let row = WalletRow {
            wallet_id: Uuid::new_v4(),
            contractor_id: Uuid::new_v4(),
            current_balance: dec!(0),
            pending_balance: dec!(0),
            total_earned: dec!(0),
            total_commission_paid: dec!(0),
            total_penalties: dec!(0),
            total_withdrawn: dec!(0),
            payment_methods: serde_json::json!({"not": "a list"}),
            is_active: true,
            is_suspended: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(matches!(
            row.into_domain(),
            Err(DatabaseError::SerializationError(_))
        ));
    }

    #[test]
    fn test_entry_row_parses_tags() {
        let row = EntryRow {
            transaction_id: Uuid::new_v4(),
            wallet_id: Uuid::new_v4(),
            entry_type: "debit".into(),
            amount: dec!(500.00),
            reference_type: "penalty".into(),
            reference_id: Uuid::new_v4(),
            status: "completed".into(),
            description: "Penalty: delay".into(),
            notes: None,
            method_snapshot: None,
            created_at: Utc::now(),
            processed_at: Some(Utc::now()),
        };

        let entry = row.into_domain().unwrap();
        assert_eq!(entry.entry_type, EntryType::Debit);
        assert_eq!(entry.reference.reference_type, ReferenceType::Penalty);
        assert_eq!(entry.signed_amount(), dec!(-500.00));
    }

    #[test]
    fn test_unknown_tags_are_decoding_errors() {
        assert!(parse_entry_type("wire").is_err());
        assert!(parse_entry_status("limbo").is_err());
        assert!(parse_reference_type("bonus").is_err());
        assert!(parse_quote_status("maybe").is_err());
    }

    #[test]
    fn test_method_snapshot_round_trip() {
        let method = PaymentMethod::BankTransfer {
            account_number: "SA442".into(),
            bank_name: "Riyad Bank".into(),
            beneficiary_name: "Nour Solar".into(),
        };
        let json = method_to_json(&method).unwrap();
        let back: PaymentMethod = serde_json::from_value(json).unwrap();
        assert_eq!(back, method);
    }
}
