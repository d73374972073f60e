//! PostgreSQL ledger store
//!
//! Implements the `LedgerStore` port. Every mutating operation is one
//! database transaction: the wallet row is locked with `SELECT ... FOR
//! UPDATE`, the domain transition runs in Rust against the locked snapshot,
//! and the entry insert plus the wallet write-back commit together. A partial
//! unique index on completed settlement references backs the idempotency
//! check against races the in-transaction lookup cannot see.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tracing::debug;

use core_kernel::{ContractorId, Money, TransactionId};
use domain_ledger::entry::{EntryDraft, EntryStatus, EntryType, LedgerEntry, Reference, ReferenceType};
use domain_ledger::error::LedgerError;
use domain_ledger::payment_method::{PaymentMethod, PaymentMethodConfig};
use domain_ledger::ports::{EntryFilter, LedgerStore, Page, PageRequest, WithdrawalOutcome};
use domain_ledger::wallet::Wallet;

use crate::error::DatabaseError;
use crate::rows::{method_to_json, methods_to_json, EntryRow, WalletRow};

const WALLET_COLUMNS: &str = "wallet_id, contractor_id, current_balance, pending_balance, \
     total_earned, total_commission_paid, total_penalties, total_withdrawn, payment_methods, \
     is_active, is_suspended, created_at, updated_at";

const ENTRY_COLUMNS: &str = "transaction_id, wallet_id, entry_type, amount, reference_type, \
     reference_id, status, description, notes, method_snapshot, created_at, processed_at";

/// Repository implementing the ledger store on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    /// Creates a new store over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the wallet row if absent, then locks and loads it
    ///
    /// Insert-or-fetch keeps concurrent first calls safe: the losing insert
    /// is a no-op and both callers proceed to lock the same row.
    async fn lock_or_create_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        contractor_id: ContractorId,
    ) -> Result<Wallet, LedgerError> {
        let fresh = Wallet::new(contractor_id);
        sqlx::query(
            "INSERT INTO wallets (wallet_id, contractor_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (contractor_id) DO NOTHING",
        )
        .bind(*fresh.id.as_uuid())
        .bind(*contractor_id.as_uuid())
        .bind(fresh.created_at)
        .bind(fresh.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

        let row: WalletRow = sqlx::query_as(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE contractor_id = $1 FOR UPDATE"
        ))
        .bind(*contractor_id.as_uuid())
        .fetch_one(&mut **tx)
        .await
        .map_err(db_err)?;

        row.into_domain().map_err(LedgerError::from)
    }

    /// Looks up the completed settlement for a reference within a transaction
    async fn find_settlement_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        reference: &Reference,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let row: Option<EntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM wallet_transactions \
             WHERE reference_type = $1 AND reference_id = $2 AND status = 'completed' LIMIT 1"
        ))
        .bind(reference.reference_type.as_str())
        .bind(reference.reference_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_err)?;

        row.map(|r| r.into_domain().map_err(LedgerError::from))
            .transpose()
    }

    async fn insert_entry(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: &LedgerEntry,
    ) -> Result<(), DatabaseError> {
        let method_snapshot = entry
            .method_snapshot
            .as_ref()
            .map(method_to_json)
            .transpose()?;

        sqlx::query(
            "INSERT INTO wallet_transactions (transaction_id, wallet_id, entry_type, amount, \
             reference_type, reference_id, status, description, notes, method_snapshot, \
             created_at, processed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(*entry.id.as_uuid())
        .bind(*entry.wallet_id.as_uuid())
        .bind(entry.entry_type.as_str())
        .bind(entry.amount.amount())
        .bind(entry.reference.reference_type.as_str())
        .bind(entry.reference.reference_id)
        .bind(entry.status.as_str())
        .bind(&entry.description)
        .bind(&entry.notes)
        .bind(method_snapshot)
        .bind(entry.created_at)
        .bind(entry.processed_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| DatabaseError::from(&e))?;

        Ok(())
    }

    async fn persist_wallet(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet: &Wallet,
    ) -> Result<(), LedgerError> {
        let methods = methods_to_json(&wallet.payment_methods)?;

        sqlx::query(
            "UPDATE wallets SET current_balance = $2, pending_balance = $3, total_earned = $4, \
             total_commission_paid = $5, total_penalties = $6, total_withdrawn = $7, \
             payment_methods = $8, is_active = $9, is_suspended = $10, updated_at = $11 \
             WHERE wallet_id = $1",
        )
        .bind(*wallet.id.as_uuid())
        .bind(wallet.current_balance.amount())
        .bind(wallet.pending_balance.amount())
        .bind(wallet.total_earned.amount())
        .bind(wallet.total_commission_paid.amount())
        .bind(wallet.total_penalties.amount())
        .bind(wallet.total_withdrawn.amount())
        .bind(methods)
        .bind(wallet.is_active)
        .bind(wallet.is_suspended)
        .bind(wallet.updated_at)
        .execute(&mut **tx)
        .await
        .map_err(db_err)?;

        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn get_or_create_wallet(
        &self,
        contractor_id: ContractorId,
    ) -> Result<Wallet, LedgerError> {
        let fresh = Wallet::new(contractor_id);
        let inserted = sqlx::query(
            "INSERT INTO wallets (wallet_id, contractor_id, created_at, updated_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (contractor_id) DO NOTHING",
        )
        .bind(*fresh.id.as_uuid())
        .bind(*contractor_id.as_uuid())
        .bind(fresh.created_at)
        .bind(fresh.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if inserted.rows_affected() == 1 {
            debug!(contractor_id = %contractor_id, wallet_id = %fresh.id, "wallet created");
        }

        let row: WalletRow = sqlx::query_as(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE contractor_id = $1"
        ))
        .bind(*contractor_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        row.into_domain().map_err(LedgerError::from)
    }

    async fn get_wallet(
        &self,
        contractor_id: ContractorId,
    ) -> Result<Option<Wallet>, LedgerError> {
        let row: Option<WalletRow> = sqlx::query_as(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE contractor_id = $1"
        ))
        .bind(*contractor_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| r.into_domain().map_err(LedgerError::from))
            .transpose()
    }

    async fn find_settlement(
        &self,
        reference: &Reference,
    ) -> Result<Option<LedgerEntry>, LedgerError> {
        let row: Option<EntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM wallet_transactions \
             WHERE reference_type = $1 AND reference_id = $2 AND status = 'completed' LIMIT 1"
        ))
        .bind(reference.reference_type.as_str())
        .bind(reference.reference_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.map(|r| r.into_domain().map_err(LedgerError::from))
            .transpose()
    }

    async fn apply_completed(
        &self,
        contractor_id: ContractorId,
        draft: EntryDraft,
    ) -> Result<(LedgerEntry, Wallet), LedgerError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let mut wallet = self.lock_or_create_wallet(&mut tx, contractor_id).await?;

        if draft.reference.is_settlement_key() {
            if let Some(existing) = self.find_settlement_in_tx(&mut tx, &draft.reference).await? {
                return Err(LedgerError::DuplicateSettlement {
                    reference: draft.reference,
                    transaction_id: existing.id,
                });
            }
        }

        draft.apply_to(&mut wallet)?;

        let now = Utc::now();
        let entry = LedgerEntry {
            id: TransactionId::new_v7(),
            wallet_id: wallet.id,
            entry_type: draft.entry_type,
            amount: draft.amount,
            reference: draft.reference,
            status: EntryStatus::Completed,
            description: draft.description.clone(),
            notes: None,
            method_snapshot: None,
            created_at: now,
            processed_at: Some(now),
        };

        match self.insert_entry(&mut tx, &entry).await {
            Ok(()) => {}
            Err(db) if db.is_duplicate() => {
                // lost the settlement race on another node; the partial unique
                // index is the arbiter
                drop(tx);
                if let Some(existing) = self.find_settlement(&draft.reference).await? {
                    return Err(LedgerError::DuplicateSettlement {
                        reference: draft.reference,
                        transaction_id: existing.id,
                    });
                }
                return Err(LedgerError::Conflict(db.to_string()));
            }
            Err(db) => return Err(db.into()),
        }

        self.persist_wallet(&mut tx, &wallet).await?;
        tx.commit().await.map_err(db_err)?;

        Ok((entry, wallet))
    }

    async fn open_withdrawal(
        &self,
        contractor_id: ContractorId,
        amount: Money,
        method: PaymentMethod,
    ) -> Result<(LedgerEntry, Wallet), LedgerError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let mut wallet = self.lock_or_create_wallet(&mut tx, contractor_id).await?;
        wallet.hold_for_withdrawal(amount)?;

        let id = TransactionId::new_v7();
        let entry = LedgerEntry {
            id,
            wallet_id: wallet.id,
            entry_type: EntryType::Debit,
            amount,
            reference: Reference::withdrawal(id),
            status: EntryStatus::Pending,
            description: format!("Withdrawal via {method}"),
            notes: None,
            method_snapshot: Some(method),
            created_at: Utc::now(),
            processed_at: None,
        };

        self.insert_entry(&mut tx, &entry)
            .await
            .map_err(LedgerError::from)?;
        self.persist_wallet(&mut tx, &wallet).await?;
        tx.commit().await.map_err(db_err)?;

        Ok((entry, wallet))
    }

    async fn resolve_withdrawal(
        &self,
        transaction_id: TransactionId,
        outcome: WithdrawalOutcome,
        notes: Option<String>,
    ) -> Result<(LedgerEntry, Wallet), LedgerError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let row: Option<EntryRow> = sqlx::query_as(&format!(
            "SELECT {ENTRY_COLUMNS} FROM wallet_transactions WHERE transaction_id = $1 FOR UPDATE"
        ))
        .bind(*transaction_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;

        let mut entry = row
            .ok_or(LedgerError::TransactionNotFound(transaction_id))?
            .into_domain()
            .map_err(LedgerError::from)?;

        let is_pending_withdrawal = entry.entry_type == EntryType::Debit
            && entry.reference.reference_type == ReferenceType::Withdrawal
            && entry.status == EntryStatus::Pending;
        if !is_pending_withdrawal {
            return Err(LedgerError::InvalidEntryState {
                transaction_id,
                status: entry.status,
            });
        }

        let wallet_row: WalletRow = sqlx::query_as(&format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE wallet_id = $1 FOR UPDATE"
        ))
        .bind(*entry.wallet_id.as_uuid())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;
        let mut wallet = wallet_row.into_domain().map_err(LedgerError::from)?;

        match outcome {
            WithdrawalOutcome::Completed => wallet.complete_withdrawal(entry.amount)?,
            WithdrawalOutcome::Failed => wallet.release_withdrawal(entry.amount)?,
        }

        entry.status = match outcome {
            WithdrawalOutcome::Completed => EntryStatus::Completed,
            WithdrawalOutcome::Failed => EntryStatus::Failed,
        };
        entry.processed_at = Some(Utc::now());
        entry.notes = notes;

        sqlx::query(
            "UPDATE wallet_transactions SET status = $2, notes = $3, processed_at = $4 \
             WHERE transaction_id = $1",
        )
        .bind(*transaction_id.as_uuid())
        .bind(entry.status.as_str())
        .bind(&entry.notes)
        .bind(entry.processed_at)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        self.persist_wallet(&mut tx, &wallet).await?;
        tx.commit().await.map_err(db_err)?;

        Ok((entry, wallet))
    }

    async fn list_entries(
        &self,
        contractor_id: ContractorId,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<Page<LedgerEntry>, LedgerError> {
        let wallet = match self.get_wallet(contractor_id).await? {
            Some(wallet) => wallet,
            None => {
                return Ok(Page {
                    items: Vec::new(),
                    page: page.page(),
                    limit: page.limit(),
                    total: 0,
                })
            }
        };

        let mut count_query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM wallet_transactions WHERE wallet_id = ",
        );
        count_query.push_bind(*wallet.id.as_uuid());
        push_filters(&mut count_query, filter);
        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut list_query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {ENTRY_COLUMNS} FROM wallet_transactions WHERE wallet_id = "
        ));
        list_query.push_bind(*wallet.id.as_uuid());
        push_filters(&mut list_query, filter);
        list_query.push(" ORDER BY created_at DESC, transaction_id DESC LIMIT ");
        list_query.push_bind(i64::from(page.limit()));
        list_query.push(" OFFSET ");
        list_query.push_bind(page.offset() as i64);

        let rows: Vec<EntryRow> = list_query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let items = rows
            .into_iter()
            .map(|r| r.into_domain().map_err(LedgerError::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            items,
            page: page.page(),
            limit: page.limit(),
            total: total as u64,
        })
    }

    async fn update_payment_methods(
        &self,
        contractor_id: ContractorId,
        methods: Vec<PaymentMethodConfig>,
    ) -> Result<Wallet, LedgerError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let mut wallet = self.lock_or_create_wallet(&mut tx, contractor_id).await?;
        wallet.payment_methods = methods;
        wallet.updated_at = Utc::now();

        self.persist_wallet(&mut tx, &wallet).await?;
        tx.commit().await.map_err(db_err)?;

        Ok(wallet)
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &EntryFilter) {
    if let Some(entry_type) = filter.entry_type {
        builder.push(" AND entry_type = ");
        builder.push_bind(entry_type.as_str());
    }
    if let Some(reference_type) = filter.reference_type {
        builder.push(" AND reference_type = ");
        builder.push_bind(reference_type.as_str());
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
    if let Some(from) = filter.from {
        builder.push(" AND created_at >= ");
        builder.push_bind(from);
    }
    if let Some(to) = filter.to {
        builder.push(" AND created_at <= ");
        builder.push_bind(to);
    }
}

fn db_err(error: sqlx::Error) -> LedgerError {
    LedgerError::from(DatabaseError::from(&error))
}
