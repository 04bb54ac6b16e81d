//! Report generation service.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::ReportError;
use super::types::{
    BranchComparison, BranchTotals, DailyPoint, DateRange, FloatPosition, FloatPositionLine,
    FloatTypeTotal, ModuleSummary, ModuleTotals, Totals, TrialBalanceLine, TrialBalanceReport,
    TrialBalanceTotals, WeeklyPoint,
};
use crate::auth::UserRole;
use crate::float::{FloatAccount, FloatAccountType, FloatService, ThresholdState};
use crate::ledger::GlAccount;
use crate::recorder::TransactionModule;

/// Service for shaping report rows.
pub struct ReportService;

impl ReportService {
    /// Only admin, finance and manager users read reports.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Forbidden`.
    pub fn check_access(role: UserRole) -> Result<(), ReportError> {
        if role.can_view_reports() {
            Ok(())
        } else {
            Err(ReportError::Forbidden)
        }
    }

    /// Builds a module summary with one row per module, in module order.
    #[must_use]
    pub fn module_summary(
        branch_id: Option<Uuid>,
        range: DateRange,
        rows: Vec<ModuleTotals>,
    ) -> ModuleSummary {
        let modules: Vec<ModuleTotals> = TransactionModule::ALL
            .into_iter()
            .map(|module| {
                let mut totals = Totals::default();
                for row in rows.iter().filter(|r| r.module == module) {
                    totals.add(&row.totals);
                }
                ModuleTotals { module, totals }
            })
            .collect();

        ModuleSummary {
            branch_id,
            range,
            totals: Self::grand_total(modules.iter().map(|m| &m.totals)),
            modules,
        }
    }

    /// Builds a daily series covering every day of the range; days without
    /// rows get zero totals and rows outside the range are dropped.
    #[must_use]
    pub fn daily_series(range: DateRange, rows: Vec<DailyPoint>) -> Vec<DailyPoint> {
        let mut by_day: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
        for row in rows {
            by_day.entry(row.date).or_default().add(&row.totals);
        }

        range
            .days()
            .map(|date| DailyPoint {
                date,
                totals: by_day.get(&date).copied().unwrap_or_default(),
            })
            .collect()
    }

    /// Rolls a daily series up into ISO weeks.
    ///
    /// `start`/`end` are the first and last days of the week that appear in
    /// the series, so partial weeks at the edges of a range stay partial.
    #[must_use]
    pub fn weekly_rollup(daily: &[DailyPoint]) -> Vec<WeeklyPoint> {
        let mut weeks: BTreeMap<(i32, u32), WeeklyPoint> = BTreeMap::new();
        for point in daily {
            let iso = point.date.iso_week();
            let week = weeks
                .entry((iso.year(), iso.week()))
                .or_insert_with(|| WeeklyPoint {
                    iso_year: iso.year(),
                    iso_week: iso.week(),
                    start: point.date,
                    end: point.date,
                    totals: Totals::default(),
                });
            week.start = week.start.min(point.date);
            week.end = week.end.max(point.date);
            week.totals.add(&point.totals);
        }
        weeks.into_values().collect()
    }

    /// Ranks branches by volume, highest first; ties keep name order.
    #[must_use]
    pub fn compare_branches(range: DateRange, mut rows: Vec<BranchTotals>) -> BranchComparison {
        rows.sort_by(|a, b| {
            b.totals
                .volume
                .cmp(&a.totals.volume)
                .then_with(|| a.branch_name.cmp(&b.branch_name))
        });
        BranchComparison {
            range,
            totals: Self::grand_total(rows.iter().map(|r| &r.totals)),
            branches: rows,
        }
    }

    /// Current float position. Inactive accounts are listed but excluded
    /// from totals and alert counts.
    #[must_use]
    pub fn float_position(branch_id: Option<Uuid>, accounts: Vec<FloatAccount>) -> FloatPosition {
        let mut by_type: Vec<FloatTypeTotal> = Vec::new();
        let mut total_balance = Decimal::ZERO;
        let mut low_count = 0;
        let mut high_count = 0;

        let lines: Vec<FloatPositionLine> = accounts
            .into_iter()
            .map(|account| {
                let state = FloatService::threshold_state(&account);
                if account.is_active {
                    total_balance += account.current_balance;
                    Self::add_type_total(&mut by_type, account.account_type, account.current_balance);
                    match state {
                        ThresholdState::Low => low_count += 1,
                        ThresholdState::High => high_count += 1,
                        ThresholdState::Normal => {}
                    }
                }
                FloatPositionLine { account, state }
            })
            .collect();

        by_type.sort_by_key(|t| {
            FloatAccountType::ALL
                .iter()
                .position(|a| *a == t.account_type)
        });

        FloatPosition {
            branch_id,
            accounts: lines,
            by_type,
            total_balance,
            low_count,
            high_count,
        }
    }

    /// Trial balance from cached GL balances.
    ///
    /// A positive balance sits in the account's normal column, a negative
    /// one in the opposite column. Zero-balance accounts are omitted.
    #[must_use]
    pub fn trial_balance(accounts: &[GlAccount], as_of: NaiveDate) -> TrialBalanceReport {
        let mut lines: Vec<TrialBalanceLine> = accounts
            .iter()
            .filter(|a| a.balance != Decimal::ZERO)
            .map(|a| {
                let normal_debit = a.account_type.is_debit_normal();
                let on_normal_side = a.balance > Decimal::ZERO;
                let amount = a.balance.abs();
                let (debit, credit) = if normal_debit == on_normal_side {
                    (amount, Decimal::ZERO)
                } else {
                    (Decimal::ZERO, amount)
                };
                TrialBalanceLine {
                    account_id: a.id,
                    code: a.code.clone(),
                    name: a.name.clone(),
                    account_type: a.account_type,
                    debit,
                    credit,
                }
            })
            .collect();
        lines.sort_by(|a, b| a.code.cmp(&b.code));

        let total_debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit).sum();

        TrialBalanceReport {
            as_of,
            lines,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
            },
        }
    }

    fn grand_total<'a>(rows: impl Iterator<Item = &'a Totals>) -> Totals {
        let mut total = Totals::default();
        for row in rows {
            total.add(row);
        }
        total
    }

    fn add_type_total(totals: &mut Vec<FloatTypeTotal>, account_type: FloatAccountType, balance: Decimal) {
        match totals.iter_mut().find(|t| t.account_type == account_type) {
            Some(total) => total.balance += balance,
            None => totals.push(FloatTypeTotal {
                account_type,
                balance,
            }),
        }
    }
}
