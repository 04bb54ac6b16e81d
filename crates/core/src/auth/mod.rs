//! Roles and password hashing.
//!
//! Tokens are issued elsewhere; this module only decides what a verified
//! role may do and re-checks passwords for destructive operations.

mod password;

pub use password::{PasswordError, hash_password, verify_password};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Back-office staff roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access across branches.
    Admin,
    /// Accounting staff, cross-branch read access.
    Finance,
    /// Branch manager.
    Manager,
    /// Back-office operations staff.
    Operations,
    /// Front-desk teller.
    Cashier,
}

impl UserRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Finance => "finance",
            Self::Manager => "manager",
            Self::Operations => "operations",
            Self::Cashier => "cashier",
        }
    }

    /// Parses a role, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "finance" => Some(Self::Finance),
            "manager" => Some(Self::Manager),
            "operations" => Some(Self::Operations),
            "cashier" => Some(Self::Cashier),
            _ => None,
        }
    }

    /// Admin and finance see every branch; everyone else only their own.
    #[must_use]
    pub const fn sees_all_branches(&self) -> bool {
        matches!(self, Self::Admin | Self::Finance)
    }

    /// Returns true if this role can view and export branch reports.
    #[must_use]
    pub const fn can_view_reports(&self) -> bool {
        matches!(self, Self::Admin | Self::Finance | Self::Manager)
    }

    /// Returns true if this role can create or edit float accounts.
    #[must_use]
    pub const fn can_manage_floats(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// Returns true if this role can move money outside a customer transaction
    /// (manual adjustments, float transfers, reversals, deletions).
    #[must_use]
    pub const fn can_move_funds(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager | Self::Finance)
    }

    /// Returns true if this role can delete card batches.
    #[must_use]
    pub const fn can_delete_batches(&self) -> bool {
        matches!(self, Self::Admin | Self::Manager)
    }

    /// Only admins may hard-delete float accounts.
    #[must_use]
    pub const fn can_delete_floats(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true if a user of this role attached to `home` may act on `target`.
    #[must_use]
    pub fn can_access_branch(&self, home: Uuid, target: Uuid) -> bool {
        self.sees_all_branches() || home == target
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
