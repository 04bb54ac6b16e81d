//! Card batch errors.

use thiserror::Error;
use uuid::Uuid;

use crate::money::ScaleError;

/// Errors that can occur during card batch operations.
#[derive(Debug, Error)]
pub enum BatchError {
    /// Bad input.
    #[error("{0}")]
    Validation(String),

    /// Batch not found.
    #[error("Card batch not found: {0}")]
    NotFound(Uuid),

    /// Received quantity would drop below what was already issued.
    #[error("Cannot reduce quantity below issued cards ({0})")]
    BelowIssued(i32),

    /// Batches with issued cards are kept for audit.
    #[error("Cannot delete a batch with issued cards ({0})")]
    HasIssuedCards(i32),

    /// Every card in the batch has been issued.
    #[error("No cards available in batch")]
    Exhausted(Uuid),

    /// Batch code already used in this branch.
    #[error("Batch code already exists: {0}")]
    Duplicate(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl From<ScaleError> for BatchError {
    fn from(e: ScaleError) -> Self {
        Self::Validation(e.to_string())
    }
}

impl BatchError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "BATCH_NOT_FOUND",
            Self::BelowIssued(_) => "QUANTITY_BELOW_ISSUED",
            Self::HasIssuedCards(_) => "BATCH_HAS_ISSUED_CARDS",
            Self::Exhausted(_) => "BATCH_EXHAUSTED",
            Self::Duplicate(_) => "DUPLICATE_BATCH",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation(_)
            | Self::BelowIssued(_)
            | Self::HasIssuedCards(_)
            | Self::Exhausted(_) => 400,
            Self::NotFound(_) => 404,
            Self::Duplicate(_) => 409,
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_issued_message() {
        let err = BatchError::BelowIssued(60);
        assert_eq!(
            err.to_string(),
            "Cannot reduce quantity below issued cards (60)"
        );
        assert_eq!(err.http_status_code(), 400);
    }
}
