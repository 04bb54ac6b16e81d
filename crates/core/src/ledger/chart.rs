//! Chart of accounts seed and expense category mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::types::GlAccountType;

/// Well-known account codes.
pub mod codes {
    /// Cash in till.
    pub const CASH_IN_TILL: &str = "1001";
    /// Mobile money float.
    pub const MOMO_FLOAT: &str = "1010";
    /// Agency banking float.
    pub const AGENCY_FLOAT: &str = "1020";
    /// Power float.
    pub const POWER_FLOAT: &str = "1030";
    /// E-Zwich settlement.
    pub const EZWICH_SETTLEMENT: &str = "1040";
    /// Jumia float.
    pub const JUMIA_FLOAT: &str = "1050";
    /// Jumia payable.
    pub const JUMIA_PAYABLE: &str = "2100";
    /// Owner's capital.
    pub const OWNERS_CAPITAL: &str = "3001";
    /// MoMo commission.
    pub const MOMO_COMMISSION: &str = "4001";
    /// Agency banking commission.
    pub const AGENCY_COMMISSION: &str = "4002";
    /// Power commission.
    pub const POWER_COMMISSION: &str = "4003";
    /// E-Zwich card issuance fees.
    pub const CARD_ISSUANCE_FEES: &str = "4004";
    /// Jumia commission.
    pub const JUMIA_COMMISSION: &str = "4005";
}

/// One seeded chart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartEntry {
    /// Account code.
    pub code: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Classification.
    pub account_type: GlAccountType,
}

const fn entry(code: &'static str, name: &'static str, account_type: GlAccountType) -> ChartEntry {
    ChartEntry {
        code,
        name,
        account_type,
    }
}

/// Chart of accounts installed by the initial migration.
pub const SEED_CHART: &[ChartEntry] = &[
    entry("1001", "Cash in Till", GlAccountType::Asset),
    entry("1010", "Mobile Money Float", GlAccountType::Asset),
    entry("1020", "Agency Banking Float", GlAccountType::Asset),
    entry("1030", "Power Float", GlAccountType::Asset),
    entry("1040", "E-Zwich Settlement", GlAccountType::Asset),
    entry("1050", "Jumia Float", GlAccountType::Asset),
    entry("2100", "Jumia Payable", GlAccountType::Liability),
    entry("3001", "Owner's Capital", GlAccountType::Equity),
    entry("4001", "MoMo Commission", GlAccountType::Revenue),
    entry("4002", "Agency Banking Commission", GlAccountType::Revenue),
    entry("4003", "Power Commission", GlAccountType::Revenue),
    entry("4004", "E-Zwich Card Issuance Fees", GlAccountType::Revenue),
    entry("4005", "Jumia Commission", GlAccountType::Revenue),
    entry("5001", "Operational Expenses", GlAccountType::Expense),
    entry("5100", "General Operating Expenses", GlAccountType::Expense),
    entry("5200", "Administrative Expenses", GlAccountType::Expense),
    entry("5300", "Marketing Expenses", GlAccountType::Expense),
    entry("5400", "Staff Costs", GlAccountType::Expense),
    entry("5500", "Utilities", GlAccountType::Expense),
    entry("5600", "Transport", GlAccountType::Expense),
    entry("5900", "Other Expenses", GlAccountType::Expense),
];

/// Expense categories and the GL accounts they post to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    /// Day-to-day running costs.
    Operational,
    /// Office and admin overhead.
    Administrative,
    /// Promotion and advertising.
    Marketing,
    /// Salaries and allowances.
    Staff,
    /// Power, water, internet.
    Utilities,
    /// Fuel, fares, deliveries.
    Transport,
    /// Anything else.
    Other,
}

impl ExpenseCategory {
    /// Returns the string representation of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::Administrative => "administrative",
            Self::Marketing => "marketing",
            Self::Staff => "staff",
            Self::Utilities => "utilities",
            Self::Transport => "transport",
            Self::Other => "other",
        }
    }

    /// Strict parse, accepting common aliases.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "operational" | "operations" | "operating" => Some(Self::Operational),
            "administrative" | "admin" | "administration" => Some(Self::Administrative),
            "marketing" | "advertising" => Some(Self::Marketing),
            "staff" | "salaries" | "payroll" => Some(Self::Staff),
            "utilities" | "utility" => Some(Self::Utilities),
            "transport" | "transportation" | "travel" => Some(Self::Transport),
            "other" | "miscellaneous" | "misc" => Some(Self::Other),
            _ => None,
        }
    }

    /// Lenient parse: unknown categories post as operational.
    #[must_use]
    pub fn resolve(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            debug!(category = s, "unknown expense category, posting as operational");
            Self::Operational
        })
    }

    /// Candidate expense accounts, in priority order.
    #[must_use]
    pub fn gl_codes(&self) -> Vec<&'static str> {
        match self {
            Self::Operational => vec!["5001", "5100"],
            Self::Administrative => vec!["5200"],
            Self::Marketing => vec!["5300"],
            Self::Staff => vec!["5400"],
            Self::Utilities => vec!["5500"],
            Self::Transport => vec!["5600"],
            Self::Other => vec!["5900"],
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("operational", ExpenseCategory::Operational)]
    #[case("  Admin ", ExpenseCategory::Administrative)]
    #[case("PAYROLL", ExpenseCategory::Staff)]
    #[case("travel", ExpenseCategory::Transport)]
    #[case("stationery", ExpenseCategory::Operational)]
    #[case("", ExpenseCategory::Operational)]
    fn test_resolve(#[case] raw: &str, #[case] expected: ExpenseCategory) {
        assert_eq!(ExpenseCategory::resolve(raw), expected);
    }

    #[test]
    fn test_category_codes_exist_in_seed_as_expenses() {
        for category in [
            ExpenseCategory::Operational,
            ExpenseCategory::Administrative,
            ExpenseCategory::Marketing,
            ExpenseCategory::Staff,
            ExpenseCategory::Utilities,
            ExpenseCategory::Transport,
            ExpenseCategory::Other,
        ] {
            for code in category.gl_codes() {
                let seeded = SEED_CHART.iter().find(|e| e.code == code).unwrap();
                assert_eq!(seeded.account_type, GlAccountType::Expense);
            }
        }
    }

    #[test]
    fn test_seed_codes_unique() {
        let mut codes: Vec<_> = SEED_CHART.iter().map(|e| e.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), SEED_CHART.len());
    }
}
