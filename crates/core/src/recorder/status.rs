//! Central status-transition validator.
//!
//! | From               | Action   | To        | Floats  | Ledger  |
//! |--------------------|----------|-----------|---------|---------|
//! | new, settle        | record   | completed | apply   | post    |
//! | new, no settle     | record   | pending   | -       | -       |
//! | pending            | complete | completed | apply   | post    |
//! | pending            | fail     | failed    | -       | -       |
//! | completed          | reverse  | reversed  | inverse | reverse |
//! | pending, failed    | delete   | deleted   | -       | -       |
//! | completed          | delete   | deleted   | inverse | reverse |
//! | reversed           | delete   | deleted   | -       | -       |
//! | deleted            | any      | rejected  |         |         |

use serde::Serialize;
use std::fmt;

use super::error::RecorderError;
use super::types::{TransactionPatch, TransactionStatus};

/// Lifecycle action requested by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionAction {
    /// Settle a pending transaction.
    Complete,
    /// Abandon a pending transaction.
    Fail,
    /// Undo a completed transaction.
    Reverse,
    /// Soft-delete.
    Delete,
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Complete => "complete",
            Self::Fail => "fail",
            Self::Reverse => "reverse",
            Self::Delete => "delete",
        })
    }
}

/// What happens to floats on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatEffect {
    /// No money moves.
    None,
    /// Apply the transaction's movement plan.
    Apply,
    /// Apply the inverse of the movement plan.
    Inverse,
}

/// What happens in the ledger on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlEffect {
    /// Nothing is posted.
    None,
    /// Post the transaction's journal.
    Post,
    /// Post the mirror of the transaction's journal.
    Reverse,
}

/// A validated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    /// Status the write is conditional on; `None` for a new row.
    pub from: Option<TransactionStatus>,
    /// Resulting status.
    pub to: TransactionStatus,
    /// Float side effect.
    pub floats: FloatEffect,
    /// Ledger side effect.
    pub ledger: GlEffect,
}

/// Stateless transition rules.
pub struct StatusService;

impl StatusService {
    /// Transition for a newly recorded transaction.
    #[must_use]
    pub const fn initial(settle: bool) -> StatusTransition {
        if settle {
            StatusTransition {
                from: None,
                to: TransactionStatus::Completed,
                floats: FloatEffect::Apply,
                ledger: GlEffect::Post,
            }
        } else {
            StatusTransition {
                from: None,
                to: TransactionStatus::Pending,
                floats: FloatEffect::None,
                ledger: GlEffect::None,
            }
        }
    }

    /// Validates an action against the current status.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError::InvalidTransition` for anything not in the
    /// table above.
    pub fn transition(
        from: TransactionStatus,
        action: TransitionAction,
    ) -> Result<StatusTransition, RecorderError> {
        use TransactionStatus::{Completed, Deleted, Failed, Pending, Reversed};

        let (to, floats, ledger) = match (from, action) {
            (Pending, TransitionAction::Complete) => (Completed, FloatEffect::Apply, GlEffect::Post),
            (Pending, TransitionAction::Fail) => (Failed, FloatEffect::None, GlEffect::None),
            (Completed, TransitionAction::Reverse) => {
                (Reversed, FloatEffect::Inverse, GlEffect::Reverse)
            }
            (Pending | Failed | Reversed, TransitionAction::Delete) => {
                (Deleted, FloatEffect::None, GlEffect::None)
            }
            (Completed, TransitionAction::Delete) => {
                (Deleted, FloatEffect::Inverse, GlEffect::Reverse)
            }
            _ => return Err(RecorderError::InvalidTransition { from, action }),
        };

        Ok(StatusTransition {
            from: Some(from),
            to,
            floats,
            ledger,
        })
    }

    /// Validates an edit against the current status.
    ///
    /// Pending rows accept every field; completed rows accept reference and
    /// notes only; everything else is immutable.
    ///
    /// # Errors
    ///
    /// Returns `Immutable`, `FieldLocked`, or `Validation` for an empty patch.
    pub fn check_edit(
        status: TransactionStatus,
        patch: &TransactionPatch,
    ) -> Result<(), RecorderError> {
        if status.is_immutable() {
            return Err(RecorderError::Immutable(status));
        }
        if patch.is_empty() {
            return Err(RecorderError::Validation("No fields to update".to_string()));
        }
        if status == TransactionStatus::Completed
            && let Some(&field) = patch.money_fields().first()
        {
            return Err(RecorderError::FieldLocked { status, field });
        }
        Ok(())
    }
}
