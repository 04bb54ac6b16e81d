//! Domain transaction routes: recording, listing, editing and status
//! transitions for every business module.

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiError, ApiResult, created, ok},
};
use backoffice_core::auth::UserRole;
use backoffice_core::recorder::{
    DomainTransaction, RecordRequest, TransactionFilter, TransactionModule, TransactionPatch,
    TransactionStatus,
};
use backoffice_shared::types::PageRequest;

/// Creates the transaction routes, with one recording route per module.
pub fn routes() -> Router<AppState> {
    let mut router = Router::new()
        .route("/transactions", get(list_transactions))
        .route(
            "/transactions/{id}",
            get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route("/transactions/{id}/complete", post(complete_transaction))
        .route("/transactions/{id}/fail", post(fail_transaction))
        .route("/transactions/{id}/reverse", post(reverse_transaction));

    for module in TransactionModule::ALL {
        router = router.route(
            &format!("/{}/transactions", module.as_str()),
            post(
                move |state: State<AppState>,
                      auth: AuthUser,
                      payload: Result<Json<RecordTransactionRequest>, JsonRejection>| {
                    record_transaction(module, state, auth, payload)
                },
            ),
        );
    }
    router
}

// ============================================================================
// Request Types
// ============================================================================

const fn default_settle() -> bool {
    true
}

/// Request body for recording a transaction.
#[derive(Debug, Deserialize, Validate)]
pub struct RecordTransactionRequest {
    /// Branch; defaults to the caller's own.
    pub branch_id: Option<Uuid>,
    /// Principal amount.
    pub amount: Decimal,
    /// Fee charged to the customer.
    #[serde(default)]
    pub fee: Decimal,
    /// External reference (voucher, MoMo ID, tracking number).
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    /// Float receiving or paying the customer's money.
    pub payment_float_id: Option<Uuid>,
    /// Rail-specific float.
    pub service_float_id: Option<Uuid>,
    /// Complete immediately; `false` stores a pending transaction.
    #[serde(default = "default_settle")]
    pub settle: bool,
    /// Free-text notes.
    #[validate(length(max = 1000))]
    pub notes: Option<String>,
    /// Module-specific fields.
    #[serde(default)]
    pub details: serde_json::Value,
}

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by branch.
    pub branch_id: Option<Uuid>,
    /// Filter by module.
    pub module: Option<TransactionModule>,
    /// Filter by status.
    pub status: Option<TransactionStatus>,
    /// Created on or after (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Created on or before (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default 20, max 100).
    pub per_page: Option<u32>,
}

// ============================================================================
// Handlers
// ============================================================================

async fn record_transaction(
    module: TransactionModule,
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<RecordTransactionRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;
    req.validate()?;

    let branch_id = auth.branch_scope(req.branch_id)?.unwrap_or(auth.branch_id());
    let outcome = state
        .recorder()
        .record(RecordRequest {
            branch_id,
            module,
            amount: req.amount,
            fee: req.fee,
            reference: req.reference,
            payment_float_id: req.payment_float_id,
            service_float_id: req.service_float_id,
            settle: req.settle,
            notes: req.notes,
            details: req.details,
            created_by: auth.user_id(),
        })
        .await?;

    Ok(created(outcome))
}

async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ListTransactionsQuery>, QueryRejection>,
) -> ApiResult {
    let Query(q) = query?;
    let filter = TransactionFilter {
        branch_id: auth.branch_scope(q.branch_id)?,
        module: q.module,
        status: q.status,
        from: q.from,
        to: q.to,
    };
    let page = PageRequest::from_query(q.page, q.per_page);

    Ok(ok(state.recorder().list(&filter, &page).await?))
}

async fn get_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    Ok(ok(visible(&state, &auth, id).await?))
}

async fn update_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<TransactionPatch>, JsonRejection>,
) -> ApiResult {
    let Json(patch) = payload?;
    if patch.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }
    visible(&state, &auth, id).await?;

    Ok(ok(state.recorder().update(id, patch).await?))
}

async fn delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    auth.require(UserRole::can_move_funds, "delete transactions")?;
    visible(&state, &auth, id).await?;

    Ok(ok(state.recorder().delete(id, auth.user_id()).await?))
}

async fn complete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    visible(&state, &auth, id).await?;
    Ok(ok(state.recorder().complete(id, auth.user_id()).await?))
}

async fn fail_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    visible(&state, &auth, id).await?;
    Ok(ok(state.recorder().fail(id, auth.user_id()).await?))
}

async fn reverse_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    auth.require(UserRole::can_move_funds, "reverse transactions")?;
    visible(&state, &auth, id).await?;

    Ok(ok(state.recorder().reverse(id, auth.user_id()).await?))
}

/// Loads a transaction the caller is allowed to see.
async fn visible(
    state: &AppState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<DomainTransaction, ApiError> {
    let transaction = state.recorder().get(id).await?;
    auth.ensure_branch(transaction.branch_id)?;
    Ok(transaction)
}
