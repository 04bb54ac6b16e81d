//! General ledger read routes.

use axum::{
    Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiResult, ok},
};
use backoffice_core::reports::ReportService;
use backoffice_db::{JournalFilter, ReportRepository};
use backoffice_shared::types::{PageRequest, PageResponse};

/// Creates the GL routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/gl/accounts", get(list_accounts))
        .route("/gl/transactions", get(list_journals))
        .route("/gl/transactions/{id}", get(get_journal))
        .route("/gl/trial-balance", get(trial_balance))
}

/// Query parameters for listing journals.
#[derive(Debug, Deserialize)]
pub struct ListJournalsQuery {
    /// Filter by branch.
    pub branch_id: Option<Uuid>,
    /// Filter by source module (`power`, `floats`, ...).
    pub source_module: Option<String>,
    /// Journal date on or after.
    pub from: Option<NaiveDate>,
    /// Journal date on or before.
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size (default 20, max 100).
    pub per_page: Option<u32>,
}

/// Query parameters for the trial balance.
#[derive(Debug, Deserialize)]
pub struct TrialBalanceQuery {
    /// Report date; defaults to today.
    pub as_of: Option<NaiveDate>,
}

async fn list_accounts(State(state): State<AppState>, _auth: AuthUser) -> ApiResult {
    Ok(ok(state.gl().list_accounts().await?))
}

async fn list_journals(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ListJournalsQuery>, QueryRejection>,
) -> ApiResult {
    let Query(q) = query?;
    let filter = JournalFilter {
        branch_id: auth.branch_scope(q.branch_id)?,
        source_module: q.source_module,
        from: q.from,
        to: q.to,
    };
    let page = PageRequest::from_query(q.page, q.per_page);

    let (journals, total) = state.gl().list_transactions(&filter, &page).await?;
    Ok(ok(PageResponse::new(
        journals,
        page.page,
        page.per_page,
        total,
    )))
}

async fn get_journal(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult {
    let journal = state.gl().get_transaction(id).await?;
    auth.ensure_branch(journal.context.branch_id)?;
    Ok(ok(journal))
}

async fn trial_balance(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<TrialBalanceQuery>, QueryRejection>,
) -> ApiResult {
    ReportService::check_access(auth.role())?;
    let Query(q) = query?;
    let as_of = q.as_of.unwrap_or_else(|| Utc::now().date_naive());

    let repo = ReportRepository::new((*state.db).clone());
    Ok(ok(repo.trial_balance(as_of).await?))
}
