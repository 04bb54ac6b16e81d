//! Branch report routes.
//!
//! Every report requires a role that may view reports. Branch-bound
//! roles are pinned to their own branch; the branch comparison is
//! cross-branch by nature.

use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::AuthUser,
    response::{ApiError, ApiResult, ok},
};
use backoffice_core::reports::{DateRange, ReportService};
use backoffice_db::ReportRepository;

/// Creates the report routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports/summary", get(summary))
        .route("/reports/daily", get(daily))
        .route("/reports/weekly", get(weekly))
        .route("/reports/floats", get(floats))
        .route("/reports/branches", get(branches))
}

/// Query parameters shared by the reports.
#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Branch to report on.
    pub branch_id: Option<Uuid>,
    /// First day; defaults to the first of `to`'s month.
    pub from: Option<NaiveDate>,
    /// Last day; defaults to today.
    pub to: Option<NaiveDate>,
}

impl ReportQuery {
    /// Resolves the date range, defaulting to month-to-date.
    fn range(&self, today: NaiveDate) -> Result<DateRange, ApiError> {
        let to = self.to.unwrap_or(today);
        let from = self.from.unwrap_or_else(|| to.with_day(1).unwrap_or(to));
        Ok(DateRange::new(from, to)?)
    }
}

/// Checks the role and resolves the branch scope and date range.
fn prepare(
    auth: &AuthUser,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<(Option<Uuid>, DateRange), ApiError> {
    ReportService::check_access(auth.role())?;
    let Query(q) = query?;
    let branch_id = auth.branch_scope(q.branch_id)?;
    let range = q.range(Utc::now().date_naive())?;
    Ok((branch_id, range))
}

async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult {
    let (branch_id, range) = prepare(&auth, query)?;
    let repo = ReportRepository::new((*state.db).clone());
    Ok(ok(repo.module_summary(branch_id, range).await?))
}

async fn daily(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult {
    let (branch_id, range) = prepare(&auth, query)?;
    let repo = ReportRepository::new((*state.db).clone());
    Ok(ok(repo.daily(branch_id, range).await?))
}

async fn weekly(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult {
    let (branch_id, range) = prepare(&auth, query)?;
    let repo = ReportRepository::new((*state.db).clone());
    Ok(ok(repo.weekly(branch_id, range).await?))
}

async fn floats(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult {
    let (branch_id, _) = prepare(&auth, query)?;
    let repo = ReportRepository::new((*state.db).clone());
    Ok(ok(repo.float_position(branch_id).await?))
}

async fn branches(
    State(state): State<AppState>,
    auth: AuthUser,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> ApiResult {
    ReportService::check_access(auth.role())?;
    let Query(q) = query?;
    let range = q.range(Utc::now().date_naive())?;

    let repo = ReportRepository::new((*state.db).clone());
    Ok(ok(repo.branch_comparison(range).await?))
}
