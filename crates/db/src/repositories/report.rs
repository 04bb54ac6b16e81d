//! Report repository: read-side aggregation over completed transactions.
//!
//! Every call re-runs its queries. Rows are shaped into reports by
//! [`ReportService`].

use chrono::{NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbBackend, DbErr, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, Statement,
};
use uuid::Uuid;

use backoffice_core::reports::{
    BranchComparison, BranchTotals, DailyPoint, DateRange, FloatPosition, ModuleSummary,
    ModuleTotals, ReportError, ReportService, Totals, TrialBalanceReport, WeeklyPoint,
};
use backoffice_core::recorder::TransactionModule;

use super::float_account::to_float_account;
use super::gl::to_gl_account;
use crate::entities::{float_accounts, gl_accounts};

// ============================================================================
// Queries
// ============================================================================

const MODULE_TOTALS_SQL: &str = r"
SELECT module,
       COUNT(*)::BIGINT AS count,
       COALESCE(SUM(amount), 0) AS volume,
       COALESCE(SUM(fee), 0) AS fees
FROM domain_transactions
WHERE status = 'completed'
  AND completed_at >= $1 AND completed_at < $2
  AND ($3::UUID IS NULL OR branch_id = $3)
GROUP BY module
";

const DAILY_TOTALS_SQL: &str = r"
SELECT (completed_at AT TIME ZONE 'UTC')::DATE AS day,
       COUNT(*)::BIGINT AS count,
       COALESCE(SUM(amount), 0) AS volume,
       COALESCE(SUM(fee), 0) AS fees
FROM domain_transactions
WHERE status = 'completed'
  AND completed_at >= $1 AND completed_at < $2
  AND ($3::UUID IS NULL OR branch_id = $3)
GROUP BY day
ORDER BY day
";

const BRANCH_TOTALS_SQL: &str = r"
SELECT b.id AS branch_id,
       b.name AS branch_name,
       COUNT(t.id)::BIGINT AS count,
       COALESCE(SUM(t.amount), 0) AS volume,
       COALESCE(SUM(t.fee), 0) AS fees
FROM branches b
LEFT JOIN domain_transactions t
       ON t.branch_id = b.id
      AND t.status = 'completed'
      AND t.completed_at >= $1 AND t.completed_at < $2
WHERE b.is_active
GROUP BY b.id, b.name
";

#[derive(Debug, FromQueryResult)]
struct ModuleRow {
    module: String,
    count: i64,
    volume: Decimal,
    fees: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct DailyRow {
    day: NaiveDate,
    count: i64,
    volume: Decimal,
    fees: Decimal,
}

#[derive(Debug, FromQueryResult)]
struct BranchRow {
    branch_id: Uuid,
    branch_name: String,
    count: i64,
    volume: Decimal,
    fees: Decimal,
}

fn db_err(e: DbErr) -> ReportError {
    ReportError::Database(e.to_string())
}

fn totals(count: i64, volume: Decimal, fees: Decimal) -> Totals {
    Totals {
        count: u64::try_from(count).unwrap_or_default(),
        volume,
        fees,
    }
}

/// `[start of from, start of the day after to)` in UTC.
fn bounds(range: DateRange) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
    let start = range.from.and_time(NaiveTime::MIN).and_utc();
    let end_day = range.to.succ_opt().unwrap_or(range.to);
    (start, end_day.and_time(NaiveTime::MIN).and_utc())
}

/// Report repository.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Count, volume and fees per module.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn module_summary(
        &self,
        branch_id: Option<Uuid>,
        range: DateRange,
    ) -> Result<ModuleSummary, ReportError> {
        let (start, end) = bounds(range);
        let rows = ModuleRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            MODULE_TOTALS_SQL,
            [start.into(), end.into(), branch_id.into()],
        ))
        .all(&self.db)
        .await
        .map_err(db_err)?;

        let rows = rows
            .into_iter()
            .filter_map(|r| {
                TransactionModule::parse(&r.module).map(|module| ModuleTotals {
                    module,
                    totals: totals(r.count, r.volume, r.fees),
                })
            })
            .collect();
        Ok(ReportService::module_summary(branch_id, range, rows))
    }

    /// One point per day of the range.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn daily(
        &self,
        branch_id: Option<Uuid>,
        range: DateRange,
    ) -> Result<Vec<DailyPoint>, ReportError> {
        let (start, end) = bounds(range);
        let rows = DailyRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            DAILY_TOTALS_SQL,
            [start.into(), end.into(), branch_id.into()],
        ))
        .all(&self.db)
        .await
        .map_err(db_err)?;

        let points = rows
            .into_iter()
            .map(|r| DailyPoint {
                date: r.day,
                totals: totals(r.count, r.volume, r.fees),
            })
            .collect();
        Ok(ReportService::daily_series(range, points))
    }

    /// ISO-week rollup of the daily series.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn weekly(
        &self,
        branch_id: Option<Uuid>,
        range: DateRange,
    ) -> Result<Vec<WeeklyPoint>, ReportError> {
        let daily = self.daily(branch_id, range).await?;
        Ok(ReportService::weekly_rollup(&daily))
    }

    /// Active branches ranked by completed volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn branch_comparison(&self, range: DateRange) -> Result<BranchComparison, ReportError> {
        let (start, end) = bounds(range);
        let rows = BranchRow::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            BRANCH_TOTALS_SQL,
            [start.into(), end.into()],
        ))
        .all(&self.db)
        .await
        .map_err(db_err)?;

        let rows = rows
            .into_iter()
            .map(|r| BranchTotals {
                branch_id: r.branch_id,
                branch_name: r.branch_name,
                totals: totals(r.count, r.volume, r.fees),
            })
            .collect();
        Ok(ReportService::compare_branches(range, rows))
    }

    /// Current float balances with threshold states.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn float_position(
        &self,
        branch_id: Option<Uuid>,
    ) -> Result<FloatPosition, ReportError> {
        let mut query = float_accounts::Entity::find();
        if let Some(branch_id) = branch_id {
            query = query.filter(float_accounts::Column::BranchId.eq(branch_id));
        }
        let accounts = query
            .order_by_asc(float_accounts::Column::AccountType)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_float_account)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ReportError::Database(e.to_string()))?;

        Ok(ReportService::float_position(branch_id, accounts))
    }

    /// Trial balance from the cached GL balances.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn trial_balance(&self, as_of: NaiveDate) -> Result<TrialBalanceReport, ReportError> {
        let accounts = gl_accounts::Entity::find()
            .filter(gl_accounts::Column::IsActive.eq(true))
            .order_by_asc(gl_accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .map(to_gl_account)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ReportError::Database(e.to_string()))?;

        Ok(ReportService::trial_balance(&accounts, as_of))
    }
}
