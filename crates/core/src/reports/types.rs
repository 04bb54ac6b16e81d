//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ReportError;
use crate::float::{FloatAccount, FloatAccountType, ThresholdState};
use crate::ledger::GlAccountType;
use crate::recorder::TransactionModule;

/// Longest range a report may cover, in days (one leap year).
pub const MAX_RANGE_DAYS: i64 = 366;

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day.
    pub from: NaiveDate,
    /// Last day.
    pub to: NaiveDate,
}

impl DateRange {
    /// Creates a range of at most [`MAX_RANGE_DAYS`] days.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` for `from > to` and
    /// `ReportError::RangeTooLong` past the cap.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, ReportError> {
        if from > to {
            return Err(ReportError::InvalidDateRange {
                start: from,
                end: to,
            });
        }
        let days = (to - from).num_days() + 1;
        if days > MAX_RANGE_DAYS {
            return Err(ReportError::RangeTooLong { days });
        }
        Ok(Self { from, to })
    }

    /// Every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.from.iter_days().take_while(|d| *d <= self.to)
    }
}

/// Count, volume and fees of completed transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Number of transactions.
    pub count: u64,
    /// Sum of amounts.
    pub volume: Decimal,
    /// Sum of fees.
    pub fees: Decimal,
}

impl Totals {
    /// Adds another total into this one.
    pub fn add(&mut self, other: &Self) {
        self.count += other.count;
        self.volume += other.volume;
        self.fees += other.fees;
    }
}

/// Aggregated row for one module, as returned by the GROUP BY query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleTotals {
    /// Module.
    pub module: TransactionModule,
    /// Totals.
    #[serde(flatten)]
    pub totals: Totals,
}

/// Per-module summary for a branch (or all branches) over a range.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleSummary {
    /// Branch filter; `None` means all branches.
    pub branch_id: Option<Uuid>,
    /// Range covered.
    pub range: DateRange,
    /// One row per module, zero rows included.
    pub modules: Vec<ModuleTotals>,
    /// Grand total.
    pub totals: Totals,
}

/// One day of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// Day.
    pub date: NaiveDate,
    /// Totals for the day.
    #[serde(flatten)]
    pub totals: Totals,
}

/// One ISO week of activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    /// ISO week-numbering year.
    pub iso_year: i32,
    /// ISO week number (1..=53).
    pub iso_week: u32,
    /// First day of the week inside the range.
    pub start: NaiveDate,
    /// Last day of the week inside the range.
    pub end: NaiveDate,
    /// Totals for the week.
    #[serde(flatten)]
    pub totals: Totals,
}

/// Aggregated row for one branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchTotals {
    /// Branch ID.
    pub branch_id: Uuid,
    /// Branch name.
    pub branch_name: String,
    /// Totals.
    #[serde(flatten)]
    pub totals: Totals,
}

/// Branches ranked by volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchComparison {
    /// Range covered.
    pub range: DateRange,
    /// Branches, highest volume first.
    pub branches: Vec<BranchTotals>,
    /// Grand total.
    pub totals: Totals,
}

/// A float with its threshold state.
#[derive(Debug, Clone, Serialize)]
pub struct FloatPositionLine {
    /// Account snapshot.
    pub account: FloatAccount,
    /// Threshold state.
    pub state: ThresholdState,
}

/// Sum of balances for one float type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloatTypeTotal {
    /// Float type.
    pub account_type: FloatAccountType,
    /// Summed balance of active accounts.
    pub balance: Decimal,
}

/// Current float position.
#[derive(Debug, Clone, Serialize)]
pub struct FloatPosition {
    /// Branch filter; `None` means all branches.
    pub branch_id: Option<Uuid>,
    /// Every account.
    pub accounts: Vec<FloatPositionLine>,
    /// Active balances per type.
    pub by_type: Vec<FloatTypeTotal>,
    /// Sum of active balances.
    pub total_balance: Decimal,
    /// Active accounts below their minimum.
    pub low_count: usize,
    /// Active accounts above their maximum.
    pub high_count: usize,
}

/// One trial balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceLine {
    /// Account ID.
    pub account_id: Uuid,
    /// Chart code.
    pub code: String,
    /// Account name.
    pub name: String,
    /// Classification.
    pub account_type: GlAccountType,
    /// Debit column.
    pub debit: Decimal,
    /// Credit column.
    pub credit: Decimal,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Total debit.
    pub total_debit: Decimal,
    /// Total credit.
    pub total_credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

/// Trial balance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// As of date.
    pub as_of: NaiveDate,
    /// Non-zero accounts in code order.
    pub lines: Vec<TrialBalanceLine>,
    /// Totals.
    pub totals: TrialBalanceTotals,
}
