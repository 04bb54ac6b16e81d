//! Float account repository.
//!
//! Balance changes always go through the guarded update in
//! [`super::movement`]; the snapshot checks here only produce friendlier
//! errors before the database has the final word.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use backoffice_core::auth::UserRole;
use backoffice_core::float::{
    BalanceChange, FloatAccount, FloatAccountPatch, FloatAccountType, FloatAlert, FloatError,
    FloatService, NewFloatAccount,
};

use super::movement::{apply_movement, float_db_err};
use crate::entities::{domain_transactions, float_accounts, float_movements};

/// List filter for float accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FloatFilter {
    /// Restrict to one branch.
    pub branch_id: Option<Uuid>,
    /// Restrict to one rail.
    pub account_type: Option<FloatAccountType>,
    /// Restrict by active flag.
    pub is_active: Option<bool>,
}

/// Float account repository.
#[derive(Debug, Clone)]
pub struct FloatAccountRepository {
    db: DatabaseConnection,
}

impl FloatAccountRepository {
    /// Creates a new float account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a float. A positive opening balance is booked as a movement.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `Duplicate` when an active float with the
    /// same type and provider exists in the branch, or a database error.
    pub async fn create(
        &self,
        input: NewFloatAccount,
        created_by: Uuid,
    ) -> Result<FloatAccount, FloatError> {
        FloatService::validate_new(&input)?;

        let txn = self.db.begin().await.map_err(float_db_err)?;
        let now = Utc::now().into();
        let id = Uuid::now_v7();

        float_accounts::ActiveModel {
            id: Set(id),
            branch_id: Set(input.branch_id),
            account_type: Set(input.account_type.as_str().to_string()),
            provider: Set(input.provider),
            account_number: Set(input.account_number),
            current_balance: Set(Decimal::ZERO),
            min_threshold: Set(input.min_threshold),
            max_threshold: Set(input.max_threshold),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| duplicate_or_db(e, input.account_type))?;

        if input.opening_balance > Decimal::ZERO {
            apply_movement(
                &txn,
                id,
                input.opening_balance,
                None,
                "opening balance",
                Some(created_by),
            )
            .await?;
        }

        let account = find_model(&txn, id).await?;
        txn.commit().await.map_err(float_db_err)?;

        info!(float_account_id = %id, branch_id = %account.branch_id, "float account created");
        to_float_account(account)
    }

    /// Fetches a float.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if absent.
    pub async fn get(&self, id: Uuid) -> Result<FloatAccount, FloatError> {
        to_float_account(find_model(&self.db, id).await?)
    }

    /// Lists floats ordered by branch, type and provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, filter: &FloatFilter) -> Result<Vec<FloatAccount>, FloatError> {
        let mut query = float_accounts::Entity::find();
        if let Some(branch_id) = filter.branch_id {
            query = query.filter(float_accounts::Column::BranchId.eq(branch_id));
        }
        if let Some(account_type) = filter.account_type {
            query = query.filter(float_accounts::Column::AccountType.eq(account_type.as_str()));
        }
        if let Some(active) = filter.is_active {
            query = query.filter(float_accounts::Column::IsActive.eq(active));
        }

        query
            .order_by_asc(float_accounts::Column::BranchId)
            .order_by_asc(float_accounts::Column::AccountType)
            .order_by_asc(float_accounts::Column::Provider)
            .all(&self.db)
            .await
            .map_err(float_db_err)?
            .into_iter()
            .map(to_float_account)
            .collect()
    }

    /// Updates descriptive fields, thresholds and the active flag.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `InvalidThresholds`, or `Duplicate` when
    /// re-activating would clash with another active float.
    pub async fn update(
        &self,
        id: Uuid,
        patch: &FloatAccountPatch,
    ) -> Result<FloatAccount, FloatError> {
        let model = find_model(&self.db, id).await?;
        let current = to_float_account(model.clone())?;
        let updated = FloatService::apply_patch(&current, patch)?;

        let mut active = model.into_active_model();
        active.provider = Set(updated.provider);
        active.account_number = Set(updated.account_number);
        active.min_threshold = Set(updated.min_threshold);
        active.max_threshold = Set(updated.max_threshold);
        active.is_active = Set(updated.is_active);
        active.updated_at = Set(Utc::now().into());

        let saved = active
            .update(&self.db)
            .await
            .map_err(|e| duplicate_or_db(e, current.account_type))?;
        to_float_account(saved)
    }

    /// Applies a manual signed adjustment and logs it as a movement.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAdjustment`, `Inactive`, `InsufficientBalance` or
    /// `NotFound`.
    pub async fn adjust(
        &self,
        id: Uuid,
        delta: Decimal,
        memo: &str,
        created_by: Uuid,
    ) -> Result<BalanceChange, FloatError> {
        let account = self.get(id).await?;
        FloatService::apply_adjustment(&account, delta)?;

        let txn = self.db.begin().await.map_err(float_db_err)?;
        let change = apply_movement(&txn, id, delta, None, memo, Some(created_by)).await?;
        txn.commit().await.map_err(float_db_err)?;

        info!(
            float_account_id = %id,
            delta = %delta,
            balance_after = %change.balance_after,
            "float adjusted"
        );
        Ok(change)
    }

    /// Moves funds between two floats of one branch. Source change first.
    ///
    /// # Errors
    ///
    /// Returns the transfer validation errors, or `InsufficientBalance` if
    /// the source was drained concurrently.
    pub async fn transfer(
        &self,
        from_id: Uuid,
        to_id: Uuid,
        amount: Decimal,
        created_by: Uuid,
    ) -> Result<(BalanceChange, BalanceChange), FloatError> {
        let from = self.get(from_id).await?;
        let to = self.get(to_id).await?;
        FloatService::plan_transfer(&from, &to, amount)?;

        let memo = format!("transfer {} -> {}", from.account_type, to.account_type);
        let txn = self.db.begin().await.map_err(float_db_err)?;
        let debit = apply_movement(&txn, from_id, -amount, None, &memo, Some(created_by)).await?;
        let credit = apply_movement(&txn, to_id, amount, None, &memo, Some(created_by)).await?;
        txn.commit().await.map_err(float_db_err)?;

        info!(from = %from_id, to = %to_id, amount = %amount, "float transfer completed");
        Ok((debit, credit))
    }

    /// Hard-deletes a float that no transaction references, together with
    /// its own movement log.
    ///
    /// The caller verifies the password and passes the result.
    ///
    /// # Errors
    ///
    /// Returns `AdminRequired`, `InvalidPassword`, `HasTransactions` or
    /// `NotFound`.
    pub async fn delete(
        &self,
        id: Uuid,
        role: UserRole,
        password_verified: bool,
    ) -> Result<(), FloatError> {
        let txn = self.db.begin().await.map_err(float_db_err)?;
        let account = to_float_account(find_model(&txn, id).await?)?;

        let referencing_transactions = domain_transactions::Entity::find()
            .filter(
                Condition::any()
                    .add(domain_transactions::Column::PaymentFloatId.eq(id))
                    .add(domain_transactions::Column::ServiceFloatId.eq(id)),
            )
            .count(&txn)
            .await
            .map_err(float_db_err)?;
        let linked_movements = float_movements::Entity::find()
            .filter(float_movements::Column::FloatAccountId.eq(id))
            .filter(float_movements::Column::TransactionId.is_not_null())
            .count(&txn)
            .await
            .map_err(float_db_err)?;

        FloatService::validate_deletion(
            &account,
            role,
            password_verified,
            referencing_transactions + linked_movements,
        )?;

        float_movements::Entity::delete_many()
            .filter(float_movements::Column::FloatAccountId.eq(id))
            .exec(&txn)
            .await
            .map_err(float_db_err)?;
        float_accounts::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(float_db_err)?;

        txn.commit().await.map_err(float_db_err)?;
        info!(float_account_id = %id, "float account deleted");
        Ok(())
    }

    /// Active floats outside their thresholds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn alerts(&self, branch_id: Option<Uuid>) -> Result<Vec<FloatAlert>, FloatError> {
        let filter = FloatFilter {
            branch_id,
            account_type: None,
            is_active: Some(true),
        };
        Ok(FloatService::alerts(self.list(&filter).await?))
    }
}

async fn find_model<C: sea_orm::ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<float_accounts::Model, FloatError> {
    float_accounts::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(float_db_err)?
        .ok_or(FloatError::NotFound(id))
}

fn duplicate_or_db(e: DbErr, account_type: FloatAccountType) -> FloatError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        FloatError::Duplicate {
            account_type: account_type.to_string(),
        }
    } else {
        float_db_err(e)
    }
}

/// Converts a row into the core snapshot.
pub(crate) fn to_float_account(model: float_accounts::Model) -> Result<FloatAccount, FloatError> {
    let account_type = FloatAccountType::parse(&model.account_type).ok_or_else(|| {
        FloatError::Database(format!("unknown float type '{}'", model.account_type))
    })?;

    Ok(FloatAccount {
        id: model.id,
        branch_id: model.branch_id,
        account_type,
        provider: model.provider,
        account_number: model.account_number,
        current_balance: model.current_balance,
        min_threshold: model.min_threshold,
        max_threshold: model.max_threshold,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
