//! Penalty records
//!
//! Penalties are created by the dispute/cancellation workflow (an external
//! collaborator). The settlement engine consumes unprocessed contractor-side
//! penalties and marks them processed with the transaction that debited them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PenaltyId, QuoteId, RequestId, TransactionId};

/// Why the penalty was imposed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyType {
    /// Contractor cancelled after selection
    ContractorCancellation,
    /// Installation missed the committed date
    InstallationDelay,
    /// Quality dispute resolved against the contractor
    QualityDispute,
    Other,
}

/// Which party the penalty applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyParty {
    User,
    Contractor,
    Both,
}

/// A penalty imposed by the dispute workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Penalty {
    pub id: PenaltyId,
    pub quote_id: Option<QuoteId>,
    pub request_id: Option<RequestId>,
    pub penalty_type: PenaltyType,
    /// Positive magnitude
    pub amount: Money,
    pub applied_to: PenaltyParty,
    pub reason: String,
    pub is_processed: bool,
    /// The debit that settled this penalty, once processed
    pub transaction_id: Option<TransactionId>,
    pub created_at: DateTime<Utc>,
}

impl Penalty {
    /// Whether this penalty debits the contractor's wallet
    ///
    /// User-side penalties are collected through the customer invoice flow
    /// and never touch the ledger.
    pub fn affects_contractor(&self) -> bool {
        matches!(self.applied_to, PenaltyParty::Contractor | PenaltyParty::Both)
    }

    /// Links the penalty to the transaction that settled it
    pub fn mark_processed(&mut self, transaction_id: TransactionId) {
        self.is_processed = true;
        self.transaction_id = Some(transaction_id);
    }
}
