//! Penalty records repository
//!
//! Penalties are created by the dispute workflow; the settlement engine reads
//! the unprocessed ones and links each to the transaction that debited it.

use async_trait::async_trait;
use sqlx::PgPool;

use core_kernel::{PenaltyId, QuoteId, TransactionId};
use domain_ledger::error::LedgerError;
use domain_ledger::penalty::Penalty;
use domain_ledger::ports::PenaltySource;

use crate::error::DatabaseError;
use crate::rows::PenaltyRow;

const PENALTY_COLUMNS: &str = "penalty_id, quote_id, request_id, penalty_type, amount, \
     applied_to, reason, is_processed, transaction_id, created_at";

/// Repository implementing penalty access on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgPenaltySource {
    pool: PgPool,
}

impl PgPenaltySource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PenaltySource for PgPenaltySource {
    async fn unprocessed_for_quote(
        &self,
        quote_id: QuoteId,
    ) -> Result<Vec<Penalty>, LedgerError> {
        let rows: Vec<PenaltyRow> = sqlx::query_as(&format!(
            "SELECT {PENALTY_COLUMNS} FROM penalties \
             WHERE quote_id = $1 AND is_processed = FALSE ORDER BY created_at"
        ))
        .bind(*quote_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(|r| r.into_domain().map_err(LedgerError::from))
            .collect()
    }

    async fn find(&self, penalty_id: PenaltyId) -> Result<Option<Penalty>, LedgerError> {
        let row: Option<PenaltyRow> = sqlx::query_as(&format!(
            "SELECT {PENALTY_COLUMNS} FROM penalties WHERE penalty_id = $1"
        ))
        .bind(*penalty_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| r.into_domain().map_err(LedgerError::from))
            .transpose()
    }

    async fn mark_processed(
        &self,
        penalty_id: PenaltyId,
        transaction_id: TransactionId,
    ) -> Result<(), LedgerError> {
        let result = sqlx::query(
            "UPDATE penalties SET is_processed = TRUE, transaction_id = $2 WHERE penalty_id = $1",
        )
        .bind(*penalty_id.as_uuid())
        .bind(*transaction_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::store(format!(
                "penalty {penalty_id} not found"
            )));
        }
        Ok(())
    }
}

fn db_err(error: sqlx::Error) -> LedgerError {
    LedgerError::from(DatabaseError::from(&error))
}
