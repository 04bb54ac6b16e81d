//! Ledger posting errors.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use super::types::GlAccountType;

/// Errors that can occur while building or posting a journal.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Journal must have at least 2 non-zero lines.
    #[error("Journal must have at least 2 entries")]
    InsufficientEntries,

    /// Debits and credits differ.
    #[error("Journal is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedTransaction {
        /// Total debits.
        debit: Decimal,
        /// Total credits.
        credit: Decimal,
    },

    /// A line amount was negative.
    #[error("Entry amount cannot be negative")]
    NegativeAmount,

    /// No active account matched the candidate codes.
    #[error("No active {account_type} account found for codes [{codes}]")]
    AccountNotFound {
        /// Candidate codes, comma separated.
        codes: String,
        /// Required account type.
        account_type: GlAccountType,
    },

    /// A stored line points at an account missing from the chart.
    #[error("GL account {0} is not in the chart of accounts")]
    UnknownAccount(Uuid),

    /// Journal not found.
    #[error("GL transaction not found: {0}")]
    TransactionNotFound(Uuid),

    /// Journal was already reversed.
    #[error("GL transaction {0} has already been reversed")]
    AlreadyReversed(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientEntries => "INSUFFICIENT_ENTRIES",
            Self::UnbalancedTransaction { .. } => "UNBALANCED_TRANSACTION",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::AccountNotFound { .. } => "GL_ACCOUNT_NOT_FOUND",
            Self::UnknownAccount(_) => "UNKNOWN_GL_ACCOUNT",
            Self::TransactionNotFound(_) => "GL_TRANSACTION_NOT_FOUND",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InsufficientEntries
            | Self::UnbalancedTransaction { .. }
            | Self::NegativeAmount
            | Self::AccountNotFound { .. }
            | Self::UnknownAccount(_) => 400,
            Self::TransactionNotFound(_) => 404,
            Self::AlreadyReversed(_) => 409,
            Self::Database(_) => 500,
        }
    }
}
