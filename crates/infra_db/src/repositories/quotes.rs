//! Read-side quote facts repository
//!
//! The quotes table is owned by the quote lifecycle service; the settlement
//! engine only reads it.

use async_trait::async_trait;
use sqlx::PgPool;

use core_kernel::QuoteId;
use domain_ledger::error::LedgerError;
use domain_ledger::ports::QuoteSource;
use domain_ledger::quote::QuoteFacts;

use crate::error::DatabaseError;
use crate::rows::QuoteRow;

/// Repository implementing quote facts lookup on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgQuoteSource {
    pool: PgPool,
}

impl PgQuoteSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuoteSource for PgQuoteSource {
    async fn quote_facts(&self, quote_id: QuoteId) -> Result<Option<QuoteFacts>, LedgerError> {
        let row: Option<QuoteRow> = sqlx::query_as(
            "SELECT quote_id, request_id, contractor_id, base_price, price_per_unit, \
             system_size_kwp, is_selected, admin_status \
             FROM quotes WHERE quote_id = $1",
        )
        .bind(*quote_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LedgerError::from(DatabaseError::from(&e)))?;

        row.map(|r| r.into_domain().map_err(LedgerError::from))
            .transpose()
    }
}
