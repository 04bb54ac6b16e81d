//! Float account errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::money::ScaleError;

/// Errors that can occur during float account operations.
#[derive(Debug, Error)]
pub enum FloatError {
    /// Float account not found.
    #[error("Float account not found: {0}")]
    NotFound(Uuid),

    /// Float account is disabled.
    #[error("Float account {0} is inactive")]
    Inactive(Uuid),

    /// The change would drive the balance below zero.
    #[error("Insufficient float balance on {account_id}: available {available}, required {required}")]
    InsufficientBalance {
        /// The float account.
        account_id: Uuid,
        /// Current balance.
        available: Decimal,
        /// Amount the change needs.
        required: Decimal,
    },

    /// A zero adjustment was requested.
    #[error("Adjustment amount cannot be zero")]
    ZeroAdjustment,

    /// An amount carries more decimal places than can be stored.
    #[error(transparent)]
    TooPrecise(#[from] ScaleError),

    /// Transfer amounts must be positive.
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    /// Opening balance below zero.
    #[error("Opening balance cannot be negative")]
    NegativeOpeningBalance,

    /// Thresholds are negative or inverted.
    #[error("Invalid thresholds: min {min}, max {max}")]
    InvalidThresholds {
        /// Requested minimum.
        min: Decimal,
        /// Requested maximum.
        max: Decimal,
    },

    /// Transfer source and destination are the same account.
    #[error("Cannot transfer a float to itself")]
    SameAccount,

    /// Transfer across branches.
    #[error("Float accounts belong to different branches")]
    BranchMismatch,

    /// The account is referenced by historical transactions.
    #[error("Cannot delete float account with {count} historical transaction(s)")]
    HasTransactions {
        /// The float account.
        account_id: Uuid,
        /// Number of referencing rows.
        count: u64,
    },

    /// Requester lacks the admin role.
    #[error("Only administrators can delete float accounts")]
    AdminRequired,

    /// Password re-verification failed.
    #[error("Invalid password")]
    InvalidPassword,

    /// An active float of the same type and provider already exists.
    #[error("An active {account_type} float for this provider already exists in the branch")]
    Duplicate {
        /// The float type.
        account_type: String,
    },

    /// A guarded write lost a race.
    #[error("Float account {0} was modified concurrently, please retry")]
    Conflict(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl FloatError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "FLOAT_NOT_FOUND",
            Self::Inactive(_) => "FLOAT_INACTIVE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::ZeroAdjustment => "ZERO_ADJUSTMENT",
            Self::NonPositiveAmount => "NON_POSITIVE_AMOUNT",
            Self::TooPrecise(_) => "VALIDATION_ERROR",
            Self::NegativeOpeningBalance => "NEGATIVE_OPENING_BALANCE",
            Self::InvalidThresholds { .. } => "INVALID_THRESHOLDS",
            Self::SameAccount => "SAME_ACCOUNT",
            Self::BranchMismatch => "BRANCH_MISMATCH",
            Self::HasTransactions { .. } => "FLOAT_HAS_TRANSACTIONS",
            Self::AdminRequired => "ADMIN_REQUIRED",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::Duplicate { .. } => "DUPLICATE_FLOAT",
            Self::Conflict(_) => "CONCURRENT_MODIFICATION",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Inactive(_)
            | Self::InsufficientBalance { .. }
            | Self::ZeroAdjustment
            | Self::NonPositiveAmount
            | Self::TooPrecise(_)
            | Self::NegativeOpeningBalance
            | Self::InvalidThresholds { .. }
            | Self::SameAccount
            | Self::BranchMismatch
            | Self::HasTransactions { .. } => 400,

            Self::InvalidPassword => 401,
            Self::AdminRequired => 403,
            Self::NotFound(_) => 404,
            Self::Duplicate { .. } | Self::Conflict(_) => 409,
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_codes() {
        assert_eq!(FloatError::NotFound(Uuid::nil()).http_status_code(), 404);
        assert_eq!(FloatError::AdminRequired.http_status_code(), 403);
        assert_eq!(FloatError::InvalidPassword.http_status_code(), 401);
        assert_eq!(FloatError::Conflict(Uuid::nil()).http_status_code(), 409);
        assert_eq!(
            FloatError::HasTransactions {
                account_id: Uuid::nil(),
                count: 3
            }
            .http_status_code(),
            400
        );
    }

    #[test]
    fn test_insufficient_balance_message() {
        let err = FloatError::InsufficientBalance {
            account_id: Uuid::nil(),
            available: dec!(50.00),
            required: dec!(75.50),
        };
        assert_eq!(err.error_code(), "INSUFFICIENT_BALANCE");
        assert!(err.to_string().contains("available 50.00, required 75.50"));
    }
}
