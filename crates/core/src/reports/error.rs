//! Report error types.

use chrono::NaiveDate;
use thiserror::Error;

use super::types::MAX_RANGE_DAYS;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// The range covers more days than a report may.
    #[error("Date range spans {days} days, at most {MAX_RANGE_DAYS} are allowed")]
    RangeTooLong {
        /// Requested span, inclusive.
        days: i64,
    },

    /// The caller's role may not read reports.
    #[error("Reports are restricted to admin, finance and manager roles")]
    Forbidden,

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl ReportError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidDateRange { .. } | Self::RangeTooLong { .. } => "INVALID_DATE_RANGE",
            Self::Forbidden => "FORBIDDEN",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidDateRange { .. } | Self::RangeTooLong { .. } => 400,
            Self::Forbidden => 403,
            Self::Database(_) => 500,
        }
    }
}
