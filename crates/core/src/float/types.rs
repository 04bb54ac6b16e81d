//! Float account domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Payment rail a float account holds funds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FloatAccountType {
    /// Physical cash in the branch till.
    CashInTill,
    /// Mobile money e-float.
    Momo,
    /// Agency banking partner float.
    AgencyBanking,
    /// Prepaid power/utility vending float.
    Power,
    /// E-Zwich settlement float.
    EZwich,
    /// Jumia pay-on-delivery collections.
    Jumia,
}

impl FloatAccountType {
    /// All float types, in chart order.
    pub const ALL: [Self; 6] = [
        Self::CashInTill,
        Self::Momo,
        Self::AgencyBanking,
        Self::Power,
        Self::EZwich,
        Self::Jumia,
    ];

    /// Returns the string representation of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CashInTill => "cash-in-till",
            Self::Momo => "momo",
            Self::AgencyBanking => "agency-banking",
            Self::Power => "power",
            Self::EZwich => "e-zwich",
            Self::Jumia => "jumia",
        }
    }

    /// Parses a type from its kebab-case name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    /// GL asset account mirroring this float.
    #[must_use]
    pub const fn gl_code(&self) -> &'static str {
        match self {
            Self::CashInTill => "1001",
            Self::Momo => "1010",
            Self::AgencyBanking => "1020",
            Self::Power => "1030",
            Self::EZwich => "1040",
            Self::Jumia => "1050",
        }
    }
}

impl fmt::Display for FloatAccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of a float account row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatAccount {
    /// Account ID.
    pub id: Uuid,
    /// Owning branch.
    pub branch_id: Uuid,
    /// Rail this float serves.
    pub account_type: FloatAccountType,
    /// Provider name (e.g. network operator, partner bank).
    pub provider: Option<String>,
    /// Provider-side account number.
    pub account_number: Option<String>,
    /// Current balance, never negative.
    pub current_balance: Decimal,
    /// Low-balance alert level.
    pub min_threshold: Decimal,
    /// High-balance alert level; zero disables the ceiling.
    pub max_threshold: Decimal,
    /// Disabled floats cannot move money.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a float account.
#[derive(Debug, Clone)]
pub struct NewFloatAccount {
    /// Owning branch.
    pub branch_id: Uuid,
    /// Rail this float serves.
    pub account_type: FloatAccountType,
    /// Provider name.
    pub provider: Option<String>,
    /// Provider-side account number.
    pub account_number: Option<String>,
    /// Low-balance alert level.
    pub min_threshold: Decimal,
    /// High-balance alert level (zero = none).
    pub max_threshold: Decimal,
    /// Balance the float starts with.
    pub opening_balance: Decimal,
}

/// Partial update of a float account. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FloatAccountPatch {
    /// New provider name.
    pub provider: Option<String>,
    /// New provider-side account number.
    pub account_number: Option<String>,
    /// New low-balance alert level.
    pub min_threshold: Option<Decimal>,
    /// New high-balance alert level.
    pub max_threshold: Option<Decimal>,
    /// Enable or disable the float.
    pub is_active: Option<bool>,
}

/// Before/after record of one balance mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceChange {
    /// The float that moved.
    pub float_account_id: Uuid,
    /// Signed amount applied.
    pub delta: Decimal,
    /// Balance before the change.
    pub balance_before: Decimal,
    /// Balance after the change.
    pub balance_after: Decimal,
}

/// Where a balance sits relative to its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdState {
    /// Below `min_threshold`.
    Low,
    /// Within thresholds.
    Normal,
    /// Above a non-zero `max_threshold`.
    High,
}

/// A float outside its thresholds.
#[derive(Debug, Clone, Serialize)]
pub struct FloatAlert {
    /// The account snapshot.
    pub account: FloatAccount,
    /// Which side it broke.
    pub state: ThresholdState,
}
