//! Ledger domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::balance::BalanceDelta;

/// Chart of accounts classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlAccountType {
    /// Resources held (cash, floats).
    Asset,
    /// Amounts owed (partner payables).
    Liability,
    /// Owner's capital.
    Equity,
    /// Commissions and fees earned.
    Revenue,
    /// Operating costs.
    Expense,
}

impl GlAccountType {
    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// Parses a type, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asset" => Some(Self::Asset),
            "liability" => Some(Self::Liability),
            "equity" => Some(Self::Equity),
            "revenue" => Some(Self::Revenue),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Asset and expense balances grow with debits.
    #[must_use]
    pub const fn is_debit_normal(&self) -> bool {
        matches!(self, Self::Asset | Self::Expense)
    }

    /// Balance change caused by a line on an account of this type.
    ///
    /// - Asset/Expense: debit - credit
    /// - Liability/Equity/Revenue: credit - debit
    #[must_use]
    pub fn balance_change(&self, debit: Decimal, credit: Decimal) -> Decimal {
        if self.is_debit_normal() {
            debit - credit
        } else {
            credit - debit
        }
    }
}

impl fmt::Display for GlAccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Debit or credit side of a journal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit.
    Debit,
    /// Credit.
    Credit,
}

/// Chart of accounts row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlAccount {
    /// Account ID.
    pub id: Uuid,
    /// Chart code, e.g. `1001`.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: GlAccountType,
    /// Cached balance, signed by the normal side.
    pub balance: Decimal,
    /// Inactive accounts are skipped during resolution.
    pub is_active: bool,
}

/// One unresolved journal line: candidate codes in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSpec {
    /// Candidate account codes, first active match wins.
    pub codes: Vec<&'static str>,
    /// Required account type.
    pub account_type: GlAccountType,
    /// Debit or credit.
    pub side: EntrySide,
    /// Non-negative amount; zero lines are dropped.
    pub amount: Decimal,
    /// Line narration.
    pub description: String,
}

impl LineSpec {
    /// Debit line against a single code.
    #[must_use]
    pub fn debit(
        code: &'static str,
        account_type: GlAccountType,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self::any_of(vec![code], account_type, EntrySide::Debit, amount, description)
    }

    /// Credit line against a single code.
    #[must_use]
    pub fn credit(
        code: &'static str,
        account_type: GlAccountType,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self::any_of(vec![code], account_type, EntrySide::Credit, amount, description)
    }

    /// Line against the first active account among `codes`.
    #[must_use]
    pub fn any_of(
        codes: Vec<&'static str>,
        account_type: GlAccountType,
        side: EntrySide,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            codes,
            account_type,
            side,
            amount,
            description: description.into(),
        }
    }
}

/// Header fields shared by every journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingContext {
    /// Module that produced the event (`power`, `momo`, `floats`, ...).
    pub source_module: String,
    /// Domain transaction the journal belongs to, if any.
    pub source_transaction_id: Option<Uuid>,
    /// Event kind, e.g. `power_sale` or `reversal`.
    pub source_transaction_type: String,
    /// Header narration.
    pub description: String,
    /// Accounting date.
    pub date: NaiveDate,
    /// Branch the event happened in.
    pub branch_id: Uuid,
    /// Acting user.
    pub created_by: Uuid,
    /// Free-form metadata (amount, fee, reference, reversal link).
    pub metadata: serde_json::Value,
}

/// A journal before account resolution.
#[derive(Debug, Clone)]
pub struct JournalDraft {
    /// Header fields.
    pub context: PostingContext,
    /// Line specifications.
    pub lines: Vec<LineSpec>,
}

impl JournalDraft {
    /// True when every line is zero, so there is nothing to post.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.amount == Decimal::ZERO)
    }
}

/// A resolved journal line, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// GL account ID.
    pub account_id: Uuid,
    /// GL account code at posting time.
    pub account_code: String,
    /// Debit amount (zero on credit lines).
    pub debit: Decimal,
    /// Credit amount (zero on debit lines).
    pub credit: Decimal,
    /// Line narration.
    pub description: String,
}

/// Debit/credit sums of a journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JournalTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
    /// Whether debits equal credits.
    pub is_balanced: bool,
}

impl JournalTotals {
    /// Creates totals from debit and credit sums.
    #[must_use]
    pub fn new(debit: Decimal, credit: Decimal) -> Self {
        Self {
            debit,
            credit,
            is_balanced: debit == credit,
        }
    }

    /// Returns debits minus credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

/// A validated journal ready to insert.
#[derive(Debug, Clone)]
pub struct ResolvedJournal {
    /// Header fields.
    pub context: PostingContext,
    /// Resolved lines.
    pub lines: Vec<JournalLine>,
    /// Totals, always balanced.
    pub totals: JournalTotals,
    /// Per-account cached balance changes.
    pub balance_deltas: Vec<BalanceDelta>,
}

/// Journal header status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalStatus {
    /// Posted and in effect.
    Posted,
    /// Cancelled by a later reversal journal.
    Reversed,
}

impl JournalStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Posted => "posted",
            Self::Reversed => "reversed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "posted" => Some(Self::Posted),
            "reversed" => Some(Self::Reversed),
            _ => None,
        }
    }
}

/// Stored journal header with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct GlTransaction {
    /// Journal ID.
    pub id: Uuid,
    /// Header fields.
    #[serde(flatten)]
    pub context: PostingContext,
    /// Posting status.
    pub status: JournalStatus,
    /// Insert time.
    pub created_at: DateTime<Utc>,
    /// Lines; empty when only headers were listed.
    pub lines: Vec<JournalLine>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_balance_change_follows_normal_side() {
        assert_eq!(GlAccountType::Asset.balance_change(dec!(10), dec!(3)), dec!(7));
        assert_eq!(GlAccountType::Expense.balance_change(dec!(10), dec!(0)), dec!(10));
        assert_eq!(GlAccountType::Revenue.balance_change(dec!(0), dec!(4)), dec!(4));
        assert_eq!(GlAccountType::Liability.balance_change(dec!(5), dec!(0)), dec!(-5));
        assert_eq!(GlAccountType::Equity.balance_change(dec!(2), dec!(2)), Decimal::ZERO);
    }

    #[test]
    fn test_totals() {
        let totals = JournalTotals::new(dec!(100.50), dec!(100.50));
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);

        let totals = JournalTotals::new(dec!(100), dec!(90));
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(10));
    }

    #[test]
    fn test_empty_draft() {
        let context = PostingContext {
            source_module: "e-zwich".to_string(),
            source_transaction_id: None,
            source_transaction_type: "card_issuance".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            branch_id: Uuid::nil(),
            created_by: Uuid::nil(),
            metadata: serde_json::Value::Null,
        };
        let draft = JournalDraft {
            context,
            lines: vec![
                LineSpec::debit("1001", GlAccountType::Asset, Decimal::ZERO, "fee"),
                LineSpec::credit("4004", GlAccountType::Revenue, Decimal::ZERO, "fee"),
            ],
        };
        assert!(draft.is_empty());
    }
}
