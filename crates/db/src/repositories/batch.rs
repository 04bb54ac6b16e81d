//! E-Zwich card batch repository.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use backoffice_core::batch::{BatchError, BatchService, CardBatch, CardBatchPatch, NewCardBatch};

use crate::entities::card_batches;

fn db_err(e: DbErr) -> BatchError {
    BatchError::Database(e.to_string())
}

fn duplicate_or_db(e: DbErr, batch_code: &str) -> BatchError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        BatchError::Duplicate(batch_code.to_string())
    } else {
        db_err(e)
    }
}

/// Card batch repository.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    db: DatabaseConnection,
}

impl BatchRepository {
    /// Creates a new batch repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a received batch.
    ///
    /// # Errors
    ///
    /// Returns `Validation`, `Duplicate` for a reused code in the branch,
    /// or a database error.
    pub async fn create(&self, input: NewCardBatch) -> Result<CardBatch, BatchError> {
        BatchService::validate_new(&input)?;
        let now = Utc::now().into();

        let model = card_batches::ActiveModel {
            id: Set(Uuid::now_v7()),
            branch_id: Set(input.branch_id),
            batch_code: Set(input.batch_code.clone()),
            quantity_received: Set(input.quantity_received),
            quantity_issued: Set(0),
            card_type: Set(input.card_type),
            unit_cost: Set(input.unit_cost),
            received_date: Set(input.received_date),
            notes: Set(input.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| duplicate_or_db(e, &input.batch_code))?;

        info!(batch_id = %model.id, quantity = model.quantity_received, "card batch received");
        Ok(to_card_batch(model))
    }

    /// Fetches a batch.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn get(&self, id: Uuid) -> Result<CardBatch, BatchError> {
        find_model(&self.db, id).await.map(to_card_batch)
    }

    /// Lists batches, newest delivery first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, branch_id: Option<Uuid>) -> Result<Vec<CardBatch>, BatchError> {
        let mut query = card_batches::Entity::find();
        if let Some(branch_id) = branch_id {
            query = query.filter(card_batches::Column::BranchId.eq(branch_id));
        }
        let rows = query
            .order_by_desc(card_batches::Column::ReceivedDate)
            .order_by_asc(card_batches::Column::BatchCode)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(to_card_batch).collect())
    }

    /// Updates a batch.
    ///
    /// Both writes commit together. The received quantity is written with
    /// a guard so a card issued between read and write cannot leave it
    /// below `quantity_issued`.
    ///
    /// # Errors
    ///
    /// Returns `BelowIssued`, `Validation`, `Duplicate` or `NotFound`.
    pub async fn update(&self, id: Uuid, patch: &CardBatchPatch) -> Result<CardBatch, BatchError> {
        let model = find_model(&self.db, id).await?;
        let updated = BatchService::apply_patch(&to_card_batch(model.clone()), patch)?;

        let txn = self.db.begin().await.map_err(db_err)?;
        if let Some(quantity) = patch.quantity_received {
            let result = card_batches::Entity::update_many()
                .col_expr(card_batches::Column::QuantityReceived, Expr::value(quantity))
                .filter(card_batches::Column::Id.eq(id))
                .filter(card_batches::Column::QuantityIssued.lte(quantity))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            if result.rows_affected == 0 {
                let current = find_model(&txn, id).await?;
                return Err(BatchError::BelowIssued(current.quantity_issued));
            }
        }

        let mut active = model.into_active_model();
        active.batch_code = Set(updated.batch_code.clone());
        active.card_type = Set(updated.card_type);
        active.unit_cost = Set(updated.unit_cost);
        active.received_date = Set(updated.received_date);
        active.notes = Set(updated.notes);
        active.updated_at = Set(updated.updated_at.into());

        let saved = active
            .update(&txn)
            .await
            .map_err(|e| duplicate_or_db(e, &updated.batch_code))?;
        txn.commit().await.map_err(db_err)?;
        Ok(to_card_batch(saved))
    }

    /// Deletes a batch that never issued a card.
    ///
    /// # Errors
    ///
    /// Returns `HasIssuedCards` or `NotFound`.
    pub async fn delete(&self, id: Uuid) -> Result<(), BatchError> {
        let batch = self.get(id).await?;
        BatchService::validate_delete(&batch)?;

        let result = card_batches::Entity::delete_many()
            .filter(card_batches::Column::Id.eq(id))
            .filter(card_batches::Column::QuantityIssued.eq(0))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            let current = find_model(&self.db, id).await?;
            return Err(BatchError::HasIssuedCards(current.quantity_issued));
        }

        info!(batch_id = %id, "card batch deleted");
        Ok(())
    }

    /// Issues one card outside a recorded transaction.
    ///
    /// # Errors
    ///
    /// Returns `Exhausted` when no cards are left, or `NotFound`.
    pub async fn issue_card(&self, id: Uuid) -> Result<CardBatch, BatchError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        consume_card(&txn, id).await?;
        let model = find_model(&txn, id).await?;
        txn.commit().await.map_err(db_err)?;

        info!(batch_id = %id, issued = model.quantity_issued, "card issued");
        Ok(to_card_batch(model))
    }
}

/// Draws one card with a guarded increment. Runs on the caller's
/// connection so the recorder can include it in its transaction.
pub(crate) async fn consume_card<C: ConnectionTrait>(
    conn: &C,
    batch_id: Uuid,
) -> Result<(), BatchError> {
    let result = card_batches::Entity::update_many()
        .col_expr(
            card_batches::Column::QuantityIssued,
            Expr::col(card_batches::Column::QuantityIssued).add(1),
        )
        .col_expr(card_batches::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(card_batches::Column::Id.eq(batch_id))
        .filter(
            Expr::col(card_batches::Column::QuantityIssued)
                .lt(Expr::col(card_batches::Column::QuantityReceived)),
        )
        .exec(conn)
        .await
        .map_err(db_err)?;

    if result.rows_affected == 0 {
        find_model(conn, batch_id).await?;
        return Err(BatchError::Exhausted(batch_id));
    }
    Ok(())
}

async fn find_model<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<card_batches::Model, BatchError> {
    card_batches::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(db_err)?
        .ok_or(BatchError::NotFound(id))
}

fn to_card_batch(model: card_batches::Model) -> CardBatch {
    CardBatch {
        id: model.id,
        branch_id: model.branch_id,
        batch_code: model.batch_code,
        quantity_received: model.quantity_received,
        quantity_issued: model.quantity_issued,
        card_type: model.card_type,
        unit_cost: model.unit_cost,
        received_date: model.received_date,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
