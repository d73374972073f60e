//! Quote facts consumed by the settlement engine
//!
//! The quote lifecycle (submission, revision, admin review, customer
//! selection) is owned by an external collaborator. The engine reads the
//! facts below and never mutates them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ContractorId, Money, QuoteId, RequestId};

/// Admin review status of a quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteApprovalStatus {
    PendingReview,
    Approved,
    Rejected,
    RevisionNeeded,
}

impl QuoteApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteApprovalStatus::PendingReview => "pending_review",
            QuoteApprovalStatus::Approved => "approved",
            QuoteApprovalStatus::Rejected => "rejected",
            QuoteApprovalStatus::RevisionNeeded => "revision_needed",
        }
    }
}

impl fmt::Display for QuoteApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The subset of quote data settlement needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteFacts {
    pub id: QuoteId,
    pub request_id: RequestId,
    pub contractor_id: ContractorId,
    /// Contractor's quoted total
    pub base_price: Money,
    /// Quoted price per kWp
    pub price_per_unit: Money,
    /// Installed system size in kWp
    pub system_size_kwp: Decimal,
    /// Chosen by the homeowner
    pub is_selected: bool,
    pub admin_status: QuoteApprovalStatus,
}

impl QuoteFacts {
    /// Only approved and selected quotes are eligible for payment settlement
    pub fn is_payable(&self) -> bool {
        self.admin_status == QuoteApprovalStatus::Approved && self.is_selected
    }
}
