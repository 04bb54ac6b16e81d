//! Guarded float balance mutation shared by the float and transaction
//! repositories.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, Set, Statement,
};
use uuid::Uuid;

use backoffice_core::float::{BalanceChange, FloatError};

use crate::entities::{float_accounts, float_movements};

/// Single-statement update that refuses to go negative or touch an
/// inactive float.
const GUARDED_UPDATE_SQL: &str = r"
UPDATE float_accounts
SET current_balance = current_balance + $1, updated_at = now()
WHERE id = $2 AND is_active AND current_balance + $1 >= 0
RETURNING current_balance
";

pub(crate) fn float_db_err(e: DbErr) -> FloatError {
    FloatError::Database(e.to_string())
}

/// Applies `delta` to a float and appends the movement row.
///
/// Must run inside the caller's database transaction.
pub(crate) async fn apply_movement<C: ConnectionTrait>(
    conn: &C,
    float_account_id: Uuid,
    delta: Decimal,
    transaction_id: Option<Uuid>,
    memo: &str,
    created_by: Option<Uuid>,
) -> Result<BalanceChange, FloatError> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            GUARDED_UPDATE_SQL,
            [delta.into(), float_account_id.into()],
        ))
        .await
        .map_err(float_db_err)?;

    let Some(row) = row else {
        return Err(explain_rejection(conn, float_account_id, delta).await);
    };
    let balance_after: Decimal = row.try_get("", "current_balance").map_err(float_db_err)?;

    let change = BalanceChange {
        float_account_id,
        delta,
        balance_before: balance_after - delta,
        balance_after,
    };

    float_movements::ActiveModel {
        id: Set(Uuid::now_v7()),
        float_account_id: Set(float_account_id),
        transaction_id: Set(transaction_id),
        delta: Set(delta),
        balance_before: Set(change.balance_before),
        balance_after: Set(change.balance_after),
        memo: Set(memo.to_string()),
        created_by: Set(created_by),
        created_at: Set(chrono::Utc::now().into()),
    }
    .insert(conn)
    .await
    .map_err(float_db_err)?;

    Ok(change)
}

async fn explain_rejection<C: ConnectionTrait>(
    conn: &C,
    float_account_id: Uuid,
    delta: Decimal,
) -> FloatError {
    match float_accounts::Entity::find_by_id(float_account_id).one(conn).await {
        Ok(None) => FloatError::NotFound(float_account_id),
        Ok(Some(account)) if !account.is_active => FloatError::Inactive(float_account_id),
        Ok(Some(account)) => FloatError::InsufficientBalance {
            account_id: float_account_id,
            available: account.current_balance,
            required: -delta,
        },
        Err(e) => float_db_err(e),
    }
}
