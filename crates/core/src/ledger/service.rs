//! Ledger service: account resolution and balance enforcement.
//!
//! Pure logic over a chart snapshot. The db crate loads the chart, calls
//! [`LedgerService::resolve`] or [`LedgerService::reverse`], then inserts
//! the result and applies its balance deltas in one database transaction.

use rust_decimal::Decimal;

use super::balance::balance_deltas;
use super::error::LedgerError;
use super::types::{
    EntrySide, GlAccount, GlAccountType, JournalDraft, JournalLine, JournalTotals, LineSpec,
    PostingContext, ResolvedJournal,
};

/// Ledger service for journal validation and resolution.
pub struct LedgerService;

impl LedgerService {
    /// Resolves a draft against the chart and validates it.
    ///
    /// 1. Rejects negative line amounts and drops zero ones
    /// 2. Picks the first active account among each line's candidate codes
    ///    whose type matches
    /// 3. Requires at least 2 lines
    /// 4. Requires debits == credits
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if any step fails.
    pub fn resolve(
        draft: &JournalDraft,
        chart: &[GlAccount],
    ) -> Result<ResolvedJournal, LedgerError> {
        let mut lines = Vec::with_capacity(draft.lines.len());
        let mut typed = Vec::with_capacity(draft.lines.len());

        for spec in &draft.lines {
            if spec.amount < Decimal::ZERO {
                return Err(LedgerError::NegativeAmount);
            }
            if spec.amount == Decimal::ZERO {
                continue;
            }

            let account = Self::find_account(spec, chart)?;
            let (debit, credit) = match spec.side {
                EntrySide::Debit => (spec.amount, Decimal::ZERO),
                EntrySide::Credit => (Decimal::ZERO, spec.amount),
            };
            lines.push(JournalLine {
                account_id: account.id,
                account_code: account.code.clone(),
                debit,
                credit,
                description: spec.description.clone(),
            });
            typed.push(account.account_type);
        }

        Self::finish(draft.context.clone(), lines, &typed)
    }

    /// Builds the mirror of a posted journal: every debit becomes a credit
    /// and vice versa, on the same accounts.
    ///
    /// # Errors
    ///
    /// Returns `UnknownAccount` if a line's account is missing from the
    /// chart, or a validation error if the original was malformed.
    pub fn reverse(
        original: &[JournalLine],
        context: PostingContext,
        chart: &[GlAccount],
    ) -> Result<ResolvedJournal, LedgerError> {
        let mut lines = Vec::with_capacity(original.len());
        let mut typed = Vec::with_capacity(original.len());

        for line in original {
            let account = chart
                .iter()
                .find(|a| a.id == line.account_id)
                .ok_or(LedgerError::UnknownAccount(line.account_id))?;

            lines.push(JournalLine {
                account_id: line.account_id,
                account_code: line.account_code.clone(),
                debit: line.credit,
                credit: line.debit,
                description: format!("Reversal: {}", line.description),
            });
            typed.push(account.account_type);
        }

        Self::finish(context, lines, &typed)
    }

    /// Calculate journal totals from resolved lines.
    #[must_use]
    pub fn calculate_totals(lines: &[JournalLine]) -> JournalTotals {
        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit).sum();
        JournalTotals::new(debit, credit)
    }

    fn find_account<'a>(
        spec: &LineSpec,
        chart: &'a [GlAccount],
    ) -> Result<&'a GlAccount, LedgerError> {
        spec.codes
            .iter()
            .find_map(|code| {
                chart.iter().find(|a| {
                    a.code == *code && a.is_active && a.account_type == spec.account_type
                })
            })
            .ok_or_else(|| LedgerError::AccountNotFound {
                codes: spec.codes.join(", "),
                account_type: spec.account_type,
            })
    }

    fn finish(
        context: PostingContext,
        lines: Vec<JournalLine>,
        types: &[GlAccountType],
    ) -> Result<ResolvedJournal, LedgerError> {
        if lines.len() < 2 {
            return Err(LedgerError::InsufficientEntries);
        }

        let totals = Self::calculate_totals(&lines);
        if !totals.is_balanced {
            return Err(LedgerError::UnbalancedTransaction {
                debit: totals.debit,
                credit: totals.credit,
            });
        }

        let balance_deltas = balance_deltas(lines.iter().zip(types.iter().copied()));
        Ok(ResolvedJournal {
            context,
            lines,
            totals,
            balance_deltas,
        })
    }
}
