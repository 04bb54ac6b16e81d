//! General ledger repository.
//!
//! Implements [`LedgerPort`]: resolution and balance checks happen in
//! `LedgerService`; this module inserts the header, its lines and the
//! cached account balance updates in one database transaction.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use moka::future::Cache;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, info};
use uuid::Uuid;

use backoffice_core::ledger::{
    GlAccount, GlAccountType, GlTransaction, JournalDraft, JournalLine, JournalStatus,
    LedgerError, LedgerService, PostingContext, ResolvedJournal,
};
use backoffice_core::recorder::LedgerPort;
use backoffice_shared::types::PageRequest;

use crate::entities::{gl_accounts, gl_journal_lines, gl_transactions};

/// Default chart cache lifetime (5 minutes).
const DEFAULT_CHART_TTL_SECS: u64 = 300;

fn db_err(e: DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}

/// Short-lived copy of the chart of accounts used for code resolution.
///
/// Balances in the cached copy go stale immediately; only identity, type
/// and the active flag are read from it.
#[derive(Clone)]
pub struct ChartCache {
    cache: Cache<(), Arc<Vec<GlAccount>>>,
}

impl ChartCache {
    /// Creates a cache with the default TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CHART_TTL_SECS)
    }

    /// Creates a cache whose snapshot expires after `ttl_secs`.
    #[must_use]
    pub fn with_ttl(ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        Self { cache }
    }

    async fn get(&self) -> Option<Arc<Vec<GlAccount>>> {
        self.cache.get(&()).await
    }

    async fn put(&self, chart: Arc<Vec<GlAccount>>) {
        self.cache.insert((), chart).await;
    }

    /// Drops the cached snapshot; the next lookup reloads it.
    pub fn invalidate(&self) {
        self.cache.invalidate_all();
    }
}

impl Default for ChartCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Journal header list filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalFilter {
    /// Restrict to one branch.
    pub branch_id: Option<Uuid>,
    /// Restrict to one source module.
    pub source_module: Option<String>,
    /// Journal date on or after.
    pub from: Option<NaiveDate>,
    /// Journal date on or before.
    pub to: Option<NaiveDate>,
}

/// General ledger repository.
#[derive(Clone)]
pub struct GlRepository {
    db: DatabaseConnection,
    chart: ChartCache,
}

impl GlRepository {
    /// Creates a repository with its own chart cache.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_cache(db, ChartCache::new())
    }

    /// Creates a repository sharing an existing chart cache.
    #[must_use]
    pub const fn with_cache(db: DatabaseConnection, chart: ChartCache) -> Self {
        Self { db, chart }
    }

    /// Chart snapshot, from cache when fresh.
    async fn chart(&self) -> Result<Arc<Vec<GlAccount>>, LedgerError> {
        if let Some(chart) = self.chart.get().await {
            return Ok(chart);
        }
        let chart = Arc::new(self.list_accounts().await?);
        self.chart.put(Arc::clone(&chart)).await;
        debug!(accounts = chart.len(), "chart of accounts loaded");
        Ok(chart)
    }

    /// Lists the chart of accounts with live balances, by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self) -> Result<Vec<GlAccount>, LedgerError> {
        gl_accounts::Entity::find()
            .order_by_asc(gl_accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_gl_account)
            .collect()
    }

    /// Lists journal headers, newest first, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_transactions(
        &self,
        filter: &JournalFilter,
        page: &PageRequest,
    ) -> Result<(Vec<GlTransaction>, u64), LedgerError> {
        let mut query = gl_transactions::Entity::find();
        if let Some(branch_id) = filter.branch_id {
            query = query.filter(gl_transactions::Column::BranchId.eq(branch_id));
        }
        if let Some(module) = &filter.source_module {
            query = query.filter(gl_transactions::Column::SourceModule.eq(module.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(gl_transactions::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(gl_transactions::Column::Date.lte(to));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let headers = query
            .order_by_desc(gl_transactions::Column::Date)
            .order_by_desc(gl_transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let journals = headers
            .into_iter()
            .map(|h| to_gl_transaction(h, Vec::new()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((journals, total))
    }

    /// Fetches a journal with its lines.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` if absent.
    pub async fn get_transaction(&self, id: Uuid) -> Result<GlTransaction, LedgerError> {
        let header = gl_transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(LedgerError::TransactionNotFound(id))?;
        let lines = load_lines(&self.db, id).await?;
        to_gl_transaction(header, lines)
    }

    /// Resolves a draft, refreshing the chart once if an account is missing.
    async fn resolve(&self, draft: &JournalDraft) -> Result<ResolvedJournal, LedgerError> {
        let chart = self.chart().await?;
        match LedgerService::resolve(draft, &chart) {
            Err(LedgerError::AccountNotFound { .. }) => {
                self.chart.invalidate();
                let chart = self.chart().await?;
                LedgerService::resolve(draft, &chart)
            }
            other => other,
        }
    }
}

#[async_trait]
impl LedgerPort for GlRepository {
    async fn post(&self, draft: JournalDraft) -> Result<Uuid, LedgerError> {
        let resolved = self.resolve(&draft).await?;

        let txn = self.db.begin().await.map_err(db_err)?;
        let id = insert_journal(&txn, &resolved).await?;
        txn.commit().await.map_err(db_err)?;

        info!(
            gl_transaction_id = %id,
            source_module = %resolved.context.source_module,
            amount = %resolved.totals.debit,
            "journal posted"
        );
        Ok(id)
    }

    async fn reverse(
        &self,
        gl_transaction_id: Uuid,
        context: PostingContext,
    ) -> Result<Uuid, LedgerError> {
        let chart = self.chart().await?;
        let txn = self.db.begin().await.map_err(db_err)?;

        let exists = gl_transactions::Entity::find_by_id(gl_transaction_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .is_some();
        if !exists {
            return Err(LedgerError::TransactionNotFound(gl_transaction_id));
        }

        let marked = gl_transactions::Entity::update_many()
            .col_expr(
                gl_transactions::Column::Status,
                Expr::value(JournalStatus::Reversed.as_str()),
            )
            .filter(gl_transactions::Column::Id.eq(gl_transaction_id))
            .filter(gl_transactions::Column::Status.eq(JournalStatus::Posted.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if marked.rows_affected == 0 {
            return Err(LedgerError::AlreadyReversed(gl_transaction_id));
        }

        let original = load_lines(&txn, gl_transaction_id).await?;
        let resolved = LedgerService::reverse(&original, context, &chart)?;
        let id = insert_journal(&txn, &resolved).await?;
        txn.commit().await.map_err(db_err)?;

        info!(gl_transaction_id = %id, reverses = %gl_transaction_id, "journal reversed");
        Ok(id)
    }
}

/// Inserts header, lines and balance updates. Runs inside the caller's
/// database transaction.
async fn insert_journal<C: ConnectionTrait>(
    conn: &C,
    journal: &ResolvedJournal,
) -> Result<Uuid, LedgerError> {
    let id = Uuid::now_v7();
    let ctx = &journal.context;

    gl_transactions::ActiveModel {
        id: Set(id),
        date: Set(ctx.date),
        source_module: Set(ctx.source_module.clone()),
        source_transaction_id: Set(ctx.source_transaction_id),
        source_transaction_type: Set(ctx.source_transaction_type.clone()),
        description: Set(ctx.description.clone()),
        status: Set(JournalStatus::Posted.as_str().to_string()),
        created_by: Set(ctx.created_by),
        branch_id: Set(ctx.branch_id),
        metadata: Set(ctx.metadata.clone()),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await
    .map_err(db_err)?;

    for (line_no, line) in (1_i32..).zip(&journal.lines) {
        gl_journal_lines::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(id),
            line_no: Set(line_no),
            account_id: Set(line.account_id),
            account_code: Set(line.account_code.clone()),
            debit: Set(line.debit),
            credit: Set(line.credit),
            description: Set(line.description.clone()),
        }
        .insert(conn)
        .await
        .map_err(db_err)?;
    }

    for delta in journal.balance_deltas.iter().filter(|d| !d.delta.is_zero()) {
        gl_accounts::Entity::update_many()
            .col_expr(
                gl_accounts::Column::Balance,
                Expr::col(gl_accounts::Column::Balance).add(delta.delta),
            )
            .filter(gl_accounts::Column::Id.eq(delta.account_id))
            .exec(conn)
            .await
            .map_err(db_err)?;
    }

    Ok(id)
}

async fn load_lines<C: ConnectionTrait>(
    conn: &C,
    transaction_id: Uuid,
) -> Result<Vec<JournalLine>, LedgerError> {
    let lines = gl_journal_lines::Entity::find()
        .filter(gl_journal_lines::Column::TransactionId.eq(transaction_id))
        .order_by_asc(gl_journal_lines::Column::LineNo)
        .all(conn)
        .await
        .map_err(db_err)?;

    Ok(lines
        .into_iter()
        .map(|l| JournalLine {
            account_id: l.account_id,
            account_code: l.account_code,
            debit: l.debit,
            credit: l.credit,
            description: l.description,
        })
        .collect())
}

pub(crate) fn to_gl_account(model: gl_accounts::Model) -> Result<GlAccount, LedgerError> {
    let account_type = GlAccountType::parse(&model.account_type).ok_or_else(|| {
        LedgerError::Database(format!("unknown GL account type '{}'", model.account_type))
    })?;
    Ok(GlAccount {
        id: model.id,
        code: model.code,
        name: model.name,
        account_type,
        balance: model.balance,
        is_active: model.is_active,
    })
}

fn to_gl_transaction(
    header: gl_transactions::Model,
    lines: Vec<JournalLine>,
) -> Result<GlTransaction, LedgerError> {
    let status = JournalStatus::parse(&header.status).ok_or_else(|| {
        LedgerError::Database(format!("unknown journal status '{}'", header.status))
    })?;
    Ok(GlTransaction {
        id: header.id,
        context: PostingContext {
            source_module: header.source_module,
            source_transaction_id: header.source_transaction_id,
            source_transaction_type: header.source_transaction_type,
            description: header.description,
            date: header.date,
            branch_id: header.branch_id,
            created_by: header.created_by,
            metadata: header.metadata,
        },
        status,
        created_at: header.created_at.with_timezone(&Utc),
        lines,
    })
}
