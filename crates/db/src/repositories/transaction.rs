//! Domain transaction repository.
//!
//! Implements [`TransactionStore`]. Every write runs in one database
//! transaction: the row change, its float movements and any card
//! consumption commit together.

use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime, Utc};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, UpdateMany,
};
use tracing::debug;
use uuid::Uuid;

use backoffice_core::float::{BalanceChange, FloatAccount};
use backoffice_core::recorder::{
    DomainTransaction, PlannedMovement, RecordPlan, RecorderError, Revision, TransactionFilter,
    TransactionModule, TransactionPatch, TransactionStatus, TransactionStore,
};
use backoffice_shared::types::PageRequest;

use super::batch::consume_card;
use super::float_account::to_float_account;
use super::movement::apply_movement;
use crate::entities::{domain_transactions, float_accounts};

fn db_err(e: DbErr) -> RecorderError {
    RecorderError::Database(e.to_string())
}

/// Domain transaction repository.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionStore for TransactionRepository {
    async fn find(&self, id: Uuid) -> Result<Option<DomainTransaction>, RecorderError> {
        domain_transactions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(to_domain_transaction)
            .transpose()
    }

    async fn load_float(&self, id: Uuid) -> Result<Option<FloatAccount>, RecorderError> {
        let model = float_accounts::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(to_float_account).transpose()?)
    }

    async fn insert(
        &self,
        plan: RecordPlan,
    ) -> Result<(DomainTransaction, Vec<BalanceChange>), RecorderError> {
        let t = plan.transaction;
        let txn = self.db.begin().await.map_err(db_err)?;

        if let Some(batch_id) = plan.consume_card_from {
            consume_card(&txn, batch_id).await?;
        }

        let now = Utc::now().into();
        let completed_at = (t.status == TransactionStatus::Completed).then_some(now);
        let row = domain_transactions::ActiveModel {
            id: Set(t.id),
            branch_id: Set(t.branch_id),
            module: Set(t.module.as_str().to_string()),
            status: Set(t.status.as_str().to_string()),
            amount: Set(t.amount),
            fee: Set(t.fee),
            reference: Set(t.reference),
            payment_float_id: Set(t.payment_float_id),
            service_float_id: Set(t.service_float_id),
            details: Set(t.details),
            gl_transaction_id: Set(None),
            notes: Set(t.notes),
            created_by: Set(t.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            completed_at: Set(completed_at),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let changes = apply_all(&txn, t.id, &plan.movements, Some(t.created_by)).await?;
        txn.commit().await.map_err(db_err)?;

        Ok((to_domain_transaction(row)?, changes))
    }

    async fn transition(
        &self,
        expected: Revision,
        to: TransactionStatus,
        movements: &[PlannedMovement],
    ) -> Result<(DomainTransaction, Vec<BalanceChange>), RecorderError> {
        let id = expected.id;
        let from = expected.status;
        let txn = self.db.begin().await.map_err(db_err)?;
        let now = Utc::now();

        let mut update = domain_transactions::Entity::update_many()
            .col_expr(domain_transactions::Column::Status, Expr::value(to.as_str()))
            .col_expr(domain_transactions::Column::UpdatedAt, next_updated_at());
        if to == TransactionStatus::Completed {
            update = update.col_expr(domain_transactions::Column::CompletedAt, Expr::value(now));
        }
        let result = guarded(update, expected)
            .exec(&txn)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(missing_or_conflict(&txn, id).await);
        }

        let changes = apply_all(&txn, id, movements, None).await?;
        let row = find_row(&txn, id).await?;
        txn.commit().await.map_err(db_err)?;

        debug!(transaction_id = %id, from = %from, to = %to, "status written");
        Ok((to_domain_transaction(row)?, changes))
    }

    async fn update(
        &self,
        expected: Revision,
        patch: &TransactionPatch,
    ) -> Result<DomainTransaction, RecorderError> {
        let id = expected.id;
        let mut update = domain_transactions::Entity::update_many()
            .col_expr(domain_transactions::Column::UpdatedAt, next_updated_at());
        if let Some(amount) = patch.amount {
            update = update.col_expr(domain_transactions::Column::Amount, Expr::value(amount));
        }
        if let Some(fee) = patch.fee {
            update = update.col_expr(domain_transactions::Column::Fee, Expr::value(fee));
        }
        if let Some(reference) = &patch.reference {
            update = update.col_expr(
                domain_transactions::Column::Reference,
                Expr::value(reference.clone()),
            );
        }
        if let Some(notes) = &patch.notes {
            update = update.col_expr(domain_transactions::Column::Notes, Expr::value(notes.clone()));
        }
        if let Some(details) = &patch.details {
            update = update.col_expr(
                domain_transactions::Column::Details,
                Expr::value(details.clone()),
            );
        }

        let result = guarded(update, expected)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(missing_or_conflict(&self.db, id).await);
        }

        to_domain_transaction(find_row(&self.db, id).await?)
    }

    async fn link_journal(&self, id: Uuid, gl_transaction_id: Uuid) -> Result<(), RecorderError> {
        let result = domain_transactions::Entity::update_many()
            .col_expr(
                domain_transactions::Column::GlTransactionId,
                Expr::value(gl_transaction_id),
            )
            .filter(domain_transactions::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(RecorderError::NotFound(id));
        }
        Ok(())
    }

    async fn list(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<(Vec<DomainTransaction>, u64), RecorderError> {
        let mut query = domain_transactions::Entity::find();
        if let Some(branch_id) = filter.branch_id {
            query = query.filter(domain_transactions::Column::BranchId.eq(branch_id));
        }
        if let Some(module) = filter.module {
            query = query.filter(domain_transactions::Column::Module.eq(module.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(domain_transactions::Column::Status.eq(status.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(domain_transactions::Column::CreatedAt.gte(start_of(from)));
        }
        if let Some(end) = filter.to.and_then(|to| to.checked_add_days(Days::new(1))) {
            query = query.filter(domain_transactions::Column::CreatedAt.lt(start_of(end)));
        }

        let total = query.clone().count(&self.db).await.map_err(db_err)?;
        let rows = query
            .order_by_desc(domain_transactions::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        let transactions = rows
            .into_iter()
            .map(to_domain_transaction)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((transactions, total))
    }
}

async fn apply_all<C: ConnectionTrait>(
    conn: &C,
    transaction_id: Uuid,
    movements: &[PlannedMovement],
    created_by: Option<Uuid>,
) -> Result<Vec<BalanceChange>, RecorderError> {
    let mut changes = Vec::with_capacity(movements.len());
    for m in movements {
        let change = apply_movement(
            conn,
            m.float_account_id,
            m.delta,
            Some(transaction_id),
            &m.memo,
            created_by,
        )
        .await?;
        changes.push(change);
    }
    Ok(changes)
}

/// Restricts a row update to the revision that was read.
fn guarded(
    update: UpdateMany<domain_transactions::Entity>,
    expected: Revision,
) -> UpdateMany<domain_transactions::Entity> {
    update
        .filter(domain_transactions::Column::Id.eq(expected.id))
        .filter(domain_transactions::Column::Status.eq(expected.status.as_str()))
        .filter(domain_transactions::Column::UpdatedAt.eq(expected.updated_at))
}

/// `updated_at` strictly increases on every write, even within one clock tick.
fn next_updated_at() -> SimpleExpr {
    Expr::cust("GREATEST(NOW(), updated_at + INTERVAL '1 microsecond')")
}

async fn find_row<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<domain_transactions::Model, RecorderError> {
    domain_transactions::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(RecorderError::NotFound(id))
}

async fn missing_or_conflict<C: ConnectionTrait>(conn: &C, id: Uuid) -> RecorderError {
    match find_row(conn, id).await {
        Ok(_) => RecorderError::Conflict(id),
        Err(e) => e,
    }
}

fn start_of(date: NaiveDate) -> chrono::DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn to_domain_transaction(
    model: domain_transactions::Model,
) -> Result<DomainTransaction, RecorderError> {
    let module = TransactionModule::parse(&model.module).ok_or_else(|| {
        RecorderError::Database(format!("unknown module '{}'", model.module))
    })?;
    let status = TransactionStatus::parse(&model.status).ok_or_else(|| {
        RecorderError::Database(format!("unknown status '{}'", model.status))
    })?;

    Ok(DomainTransaction {
        id: model.id,
        branch_id: model.branch_id,
        module,
        status,
        amount: model.amount,
        fee: model.fee,
        reference: model.reference,
        payment_float_id: model.payment_float_id,
        service_float_id: model.service_float_id,
        details: model.details,
        gl_transaction_id: model.gl_transaction_id,
        notes: model.notes,
        created_by: model.created_by,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
        completed_at: model.completed_at.map(|t| t.with_timezone(&Utc)),
    })
}
