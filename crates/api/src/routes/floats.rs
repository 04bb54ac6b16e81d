//! Float account routes.
//!
//! Manual adjustments and transfers move money outside a customer
//! transaction, so after the balances commit their journal is posted
//! here. A failed posting is logged and reported in the response; the
//! balance change stands.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiError, ApiResult, created, ok},
};
use backoffice_core::auth::{UserRole, verify_password};
use backoffice_core::float::{
    BalanceChange, FloatAccountPatch, FloatAccountType, NewFloatAccount,
};
use backoffice_core::ledger::{LedgerEvent, PostingContext, PostingRules};
use backoffice_core::recorder::{LedgerPort, PostingOutcome};
use backoffice_db::{FloatAccountRepository, FloatFilter, UserRepository};
use backoffice_shared::AppError;

/// Creates the float account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/float-accounts", get(list_floats).post(create_float))
        .route("/float-accounts/alerts", get(list_alerts))
        .route("/float-accounts/transfer", post(transfer))
        .route(
            "/float-accounts/{id}",
            get(get_float).patch(update_float).delete(delete_float),
        )
        .route("/float-accounts/{id}/adjust", post(adjust))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a float account.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateFloatRequest {
    /// Target branch; defaults to the caller's own.
    pub branch_id: Option<Uuid>,
    /// Rail the float serves.
    pub account_type: FloatAccountType,
    /// Provider name (MTN, ECG, ...).
    #[validate(length(min = 1, max = 100))]
    pub provider: Option<String>,
    /// External account number.
    #[validate(length(max = 64))]
    pub account_number: Option<String>,
    /// Low-balance alert level.
    #[serde(default)]
    pub min_threshold: Decimal,
    /// High-balance alert level; zero disables it.
    #[serde(default)]
    pub max_threshold: Decimal,
    /// Opening balance.
    #[serde(default)]
    pub opening_balance: Decimal,
}

/// Request body for a manual adjustment.
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustRequest {
    /// Signed amount: positive tops up, negative withdraws.
    pub delta: Decimal,
    /// Why the balance changed.
    #[validate(length(min = 1, max = 255))]
    pub memo: String,
}

/// Request body for a float-to-float transfer.
#[derive(Debug, Deserialize, Validate)]
pub struct TransferRequest {
    /// Source float.
    pub from_float_id: Uuid,
    /// Destination float.
    pub to_float_id: Uuid,
    /// Positive amount moved.
    pub amount: Decimal,
    /// Optional narration.
    #[validate(length(max = 255))]
    pub memo: Option<String>,
}

/// Request body for deleting a float account.
#[derive(Debug, Deserialize, Validate)]
pub struct DeleteFloatRequest {
    /// The caller's own password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Query parameters for the alerts endpoint.
#[derive(Debug, Deserialize)]
pub struct BranchQuery {
    /// Branch to inspect.
    pub branch_id: Option<Uuid>,
}

/// Result of an adjustment.
#[derive(Debug, Serialize)]
pub struct AdjustResponse {
    /// Balance change applied.
    pub balance: BalanceChange,
    /// Journal posting result.
    pub ledger: PostingOutcome,
}

/// Result of a transfer.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    /// Debit side.
    pub from: BalanceChange,
    /// Credit side.
    pub to: BalanceChange,
    /// Journal posting result.
    pub ledger: PostingOutcome,
}

// ============================================================================
// Handlers
// ============================================================================

async fn list_floats(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<FloatFilter>, QueryRejection>,
) -> ApiResult {
    let Query(mut filter) = query?;
    filter.branch_id = auth.branch_scope(filter.branch_id)?;

    let repo = FloatAccountRepository::new((*state.db).clone());
    Ok(ok(repo.list(&filter).await?))
}

async fn create_float(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateFloatRequest>, JsonRejection>,
) -> ApiResult {
    auth.require(UserRole::can_manage_floats, "create float accounts")?;
    let Json(req) = payload?;
    req.validate()?;

    let branch_id = auth.branch_scope(req.branch_id)?.unwrap_or(auth.branch_id());
    let input = NewFloatAccount {
        branch_id,
        account_type: req.account_type,
        provider: req.provider,
        account_number: req.account_number,
        min_threshold: req.min_threshold,
        max_threshold: req.max_threshold,
        opening_balance: req.opening_balance,
    };

    let repo = FloatAccountRepository::new((*state.db).clone());
    let account = repo.create(input, auth.user_id()).await?;
    Ok(created(account))
}

async fn list_alerts(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<BranchQuery>, QueryRejection>,
) -> ApiResult {
    let Query(q) = query?;
    let branch_id = auth.branch_scope(q.branch_id)?;

    let repo = FloatAccountRepository::new((*state.db).clone());
    Ok(ok(repo.alerts(branch_id).await?))
}

async fn get_float(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    let repo = FloatAccountRepository::new((*state.db).clone());
    let account = repo.get(id).await?;
    auth.ensure_branch(account.branch_id)?;
    Ok(ok(account))
}

async fn update_float(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<FloatAccountPatch>, JsonRejection>,
) -> ApiResult {
    auth.require(UserRole::can_manage_floats, "edit float accounts")?;
    let Json(patch) = payload?;

    let repo = FloatAccountRepository::new((*state.db).clone());
    let account = repo.get(id).await?;
    auth.ensure_branch(account.branch_id)?;

    Ok(ok(repo.update(id, &patch).await?))
}

async fn adjust(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<AdjustRequest>, JsonRejection>,
) -> ApiResult {
    auth.require(UserRole::can_move_funds, "adjust float balances")?;
    let Json(req) = payload?;
    req.validate()?;

    let repo = FloatAccountRepository::new((*state.db).clone());
    let account = repo.get(id).await?;
    auth.ensure_branch(account.branch_id)?;

    let balance = repo.adjust(id, req.delta, &req.memo, auth.user_id()).await?;
    let ledger = post_float_journal(
        &state,
        &LedgerEvent::ManualAdjustment {
            delta: req.delta,
            float: account.account_type,
        },
        account.branch_id,
        &auth,
        format!("Manual adjustment on {}: {}", account.account_type, req.memo),
        json!({ "float_account_id": id, "delta": req.delta, "memo": req.memo }),
    )
    .await;

    Ok(ok(AdjustResponse { balance, ledger }))
}

async fn transfer(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> ApiResult {
    auth.require(UserRole::can_move_funds, "transfer between floats")?;
    let Json(req) = payload?;
    req.validate()?;

    let repo = FloatAccountRepository::new((*state.db).clone());
    let from = repo.get(req.from_float_id).await?;
    let to = repo.get(req.to_float_id).await?;
    auth.ensure_branch(from.branch_id)?;

    let (debit, credit) = repo
        .transfer(from.id, to.id, req.amount, auth.user_id())
        .await?;

    let description = req
        .memo
        .clone()
        .unwrap_or_else(|| format!("Transfer {} to {}", from.account_type, to.account_type));
    let ledger = post_float_journal(
        &state,
        &LedgerEvent::FloatTransfer {
            amount: req.amount,
            from: from.account_type,
            to: to.account_type,
        },
        from.branch_id,
        &auth,
        description,
        json!({ "from_float_id": from.id, "to_float_id": to.id, "amount": req.amount }),
    )
    .await;

    Ok(ok(TransferResponse {
        from: debit,
        to: credit,
        ledger,
    }))
}

async fn delete_float(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<DeleteFloatRequest>, JsonRejection>,
) -> ApiResult {
    auth.require(UserRole::can_delete_floats, "delete float accounts")?;
    let Json(req) = payload?;
    req.validate()?;

    let user = UserRepository::new((*state.db).clone())
        .find_by_id(auth.user_id())
        .await?
        .ok_or_else(|| ApiError::unauthorized("User no longer exists"))?;
    let password_verified = verify_password(&req.password, &user.password_hash)
        .map_err(|e| ApiError::new(AppError::Internal(e.to_string())))?;

    let repo = FloatAccountRepository::new((*state.db).clone());
    repo.delete(id, auth.role(), password_verified).await?;

    info!(float_account_id = %id, user_id = %auth.user_id(), "float account deleted");
    Ok(ok(json!({ "id": id, "deleted": true })))
}

/// Posts the journal for a float-only movement. Failures are swallowed.
async fn post_float_journal(
    state: &AppState,
    event: &LedgerEvent,
    branch_id: Uuid,
    auth: &AuthUser,
    description: String,
    metadata: serde_json::Value,
) -> PostingOutcome {
    let kind = event.kind();
    let draft = PostingRules::draft(
        event,
        PostingContext {
            source_module: "floats".to_string(),
            source_transaction_id: None,
            source_transaction_type: kind.to_string(),
            description,
            date: Utc::now().date_naive(),
            branch_id,
            created_by: auth.user_id(),
            metadata,
        },
    );

    match state.gl().post(draft).await {
        Ok(gl_transaction_id) => PostingOutcome::Posted { gl_transaction_id },
        Err(e) => {
            warn!(error = %e, kind, branch_id = %branch_id, "float journal not posted");
            PostingOutcome::Failed {
                error: e.to_string(),
            }
        }
    }
}
