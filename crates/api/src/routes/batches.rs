//! E-Zwich card batch routes.

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
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, created, ok},
};
use backoffice_core::auth::UserRole;
use backoffice_core::batch::{CardBatch, CardBatchPatch, NewCardBatch};
use backoffice_db::BatchRepository;

/// Creates the card batch routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/e-zwich/batches", get(list_batches).post(create_batch))
        .route(
            "/e-zwich/batches/{id}",
            get(get_batch).put(update_batch).delete(delete_batch),
        )
        .route("/e-zwich/batches/{id}/issue", post(issue_card))
}

/// Request body for registering a batch.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBatchRequest {
    /// Receiving branch; defaults to the caller's own.
    pub branch_id: Option<Uuid>,
    /// Supplier batch code, unique per branch.
    #[validate(length(min = 1, max = 50))]
    pub batch_code: String,
    /// Cards delivered.
    #[validate(range(min = 1))]
    pub quantity_received: i32,
    /// Card product.
    #[validate(length(min = 1, max = 50))]
    pub card_type: String,
    /// Cost per card.
    #[serde(default)]
    pub unit_cost: Decimal,
    /// Delivery date.
    pub received_date: NaiveDate,
    /// Free-text notes.
    pub notes: Option<String>,
}

/// Request body for editing a batch.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBatchRequest {
    /// New code.
    #[validate(length(min = 1, max = 50))]
    pub batch_code: Option<String>,
    /// New received quantity; never below the issued count.
    #[validate(range(min = 1))]
    pub quantity_received: Option<i32>,
    /// New card product.
    #[validate(length(min = 1, max = 50))]
    pub card_type: Option<String>,
    /// New unit cost.
    pub unit_cost: Option<Decimal>,
    /// New delivery date.
    pub received_date: Option<NaiveDate>,
    /// New notes.
    pub notes: Option<String>,
}

/// Query parameters for listing batches.
#[derive(Debug, Deserialize)]
pub struct ListBatchesQuery {
    /// Filter by branch.
    pub branch_id: Option<Uuid>,
}

async fn list_batches(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ListBatchesQuery>, QueryRejection>,
) -> ApiResult {
    let Query(q) = query?;
    let branch_id = auth.branch_scope(q.branch_id)?;

    let repo = BatchRepository::new((*state.db).clone());
    Ok(ok(repo.list(branch_id).await?))
}

async fn create_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    payload: Result<Json<CreateBatchRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;
    req.validate()?;

    let branch_id = auth.branch_scope(req.branch_id)?.unwrap_or(auth.branch_id());
    let repo = BatchRepository::new((*state.db).clone());
    let batch = repo
        .create(NewCardBatch {
            branch_id,
            batch_code: req.batch_code,
            quantity_received: req.quantity_received,
            card_type: req.card_type,
            unit_cost: req.unit_cost,
            received_date: req.received_date,
            notes: req.notes,
        })
        .await?;

    Ok(created(batch))
}

async fn get_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    let repo = BatchRepository::new((*state.db).clone());
    Ok(ok(visible(&repo, &auth, id).await?))
}

async fn update_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateBatchRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = payload?;
    req.validate()?;

    let repo = BatchRepository::new((*state.db).clone());
    visible(&repo, &auth, id).await?;

    let patch = CardBatchPatch {
        batch_code: req.batch_code,
        quantity_received: req.quantity_received,
        card_type: req.card_type,
        unit_cost: req.unit_cost,
        received_date: req.received_date,
        notes: req.notes,
    };
    Ok(ok(repo.update(id, &patch).await?))
}

/// Hands out one card from the batch outside a recorded transaction.
async fn issue_card(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    let repo = BatchRepository::new((*state.db).clone());
    visible(&repo, &auth, id).await?;
    Ok(ok(repo.issue_card(id).await?))
}

async fn delete_batch(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    auth.require(UserRole::can_delete_batches, "delete card batches")?;

    let repo = BatchRepository::new((*state.db).clone());
    visible(&repo, &auth, id).await?;
    repo.delete(id).await?;

    Ok(ok(json!({ "id": id, "deleted": true })))
}

async fn visible(
    repo: &BatchRepository,
    auth: &AuthUser,
    id: Uuid,
) -> Result<CardBatch, crate::response::ApiError> {
    let batch = repo.get(id).await?;
    auth.ensure_branch(batch.branch_id)?;
    Ok(batch)
}
