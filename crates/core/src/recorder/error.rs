//! Transaction recorder errors.

use thiserror::Error;
use uuid::Uuid;

use super::status::TransitionAction;
use super::types::TransactionStatus;
use crate::batch::BatchError;
use crate::float::FloatError;
use crate::money::ScaleError;

/// Errors that can occur while recording or transitioning a transaction.
#[derive(Debug, Error)]
pub enum RecorderError {
    /// Bad input.
    #[error("{0}")]
    Validation(String),

    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    NotFound(Uuid),

    /// The action is not allowed from the current status.
    #[error("Cannot {action} a {from} transaction")]
    InvalidTransition {
        /// Current status.
        from: TransactionStatus,
        /// Attempted action.
        action: TransitionAction,
    },

    /// The transaction can no longer be edited.
    #[error("Cannot edit a {0} transaction")]
    Immutable(TransactionStatus),

    /// The field may only change while pending.
    #[error("Cannot change {field} on a {status} transaction")]
    FieldLocked {
        /// Current status.
        status: TransactionStatus,
        /// Offending field.
        field: &'static str,
    },

    /// The status changed between read and write.
    #[error("Transaction {0} was modified concurrently, please retry")]
    Conflict(Uuid),

    /// Float rule violated.
    #[error(transparent)]
    Float(#[from] FloatError),

    /// Card batch rule violated.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<ScaleError> for RecorderError {
    fn from(e: ScaleError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl RecorderError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Immutable(_) => "TRANSACTION_IMMUTABLE",
            Self::FieldLocked { .. } => "FIELD_LOCKED",
            Self::Conflict(_) => "CONCURRENT_MODIFICATION",
            Self::Float(e) => e.error_code(),
            Self::Batch(e) => e.error_code(),
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::InvalidTransition { .. }
            | Self::Immutable(_)
            | Self::FieldLocked { .. } => 400,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::Float(e) => e.http_status_code(),
            Self::Batch(e) => e.http_status_code(),
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_message() {
        let err = RecorderError::InvalidTransition {
            from: TransactionStatus::Deleted,
            action: TransitionAction::Reverse,
        };
        assert_eq!(err.to_string(), "Cannot reverse a deleted transaction");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_wrapped_errors_keep_their_status() {
        let err = RecorderError::from(FloatError::NotFound(Uuid::nil()));
        assert_eq!(err.http_status_code(), 404);
        assert_eq!(err.error_code(), "FLOAT_NOT_FOUND");

        let err = RecorderError::from(BatchError::Exhausted(Uuid::nil()));
        assert_eq!(err.to_string(), "No cards available in batch");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_conflict() {
        assert_eq!(RecorderError::Conflict(Uuid::nil()).http_status_code(), 409);
    }
}
