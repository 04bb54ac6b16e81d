//! Domain transaction types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::float::{BalanceChange, FloatAccountType};

/// Business module a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransactionModule {
    /// Prepaid power vending.
    Power,
    /// Mobile money cash-in/cash-out.
    Momo,
    /// Agency banking deposits/withdrawals.
    AgencyBanking,
    /// E-Zwich card issuance.
    EZwich,
    /// Jumia pay-on-delivery collection.
    JumiaCollection,
    /// Jumia settlement payout.
    JumiaSettlement,
    /// Branch expenses.
    Expenses,
}

impl TransactionModule {
    /// All modules.
    pub const ALL: [Self; 7] = [
        Self::Power,
        Self::Momo,
        Self::AgencyBanking,
        Self::EZwich,
        Self::JumiaCollection,
        Self::JumiaSettlement,
        Self::Expenses,
    ];

    /// Returns the URL/storage name of the module.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "power",
            Self::Momo => "momo",
            Self::AgencyBanking => "agency-banking",
            Self::EZwich => "e-zwich",
            Self::JumiaCollection => "jumia-collection",
            Self::JumiaSettlement => "jumia-settlement",
            Self::Expenses => "expenses",
        }
    }

    /// Parses a module name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    /// Float type the service float must have, if the module uses one.
    #[must_use]
    pub const fn service_float_type(&self) -> Option<FloatAccountType> {
        match self {
            Self::Power => Some(FloatAccountType::Power),
            Self::Momo => Some(FloatAccountType::Momo),
            Self::AgencyBanking => Some(FloatAccountType::AgencyBanking),
            Self::JumiaCollection | Self::JumiaSettlement => Some(FloatAccountType::Jumia),
            Self::EZwich | Self::Expenses => None,
        }
    }

    /// Whether the module takes or pays money through a payment float.
    #[must_use]
    pub const fn uses_payment_float(&self) -> bool {
        !matches!(self, Self::JumiaCollection | Self::JumiaSettlement)
    }
}

impl fmt::Display for TransactionModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain transaction lifecycle status.
///
/// - pending -> completed | failed | deleted
/// - completed -> reversed | deleted
/// - failed, reversed -> deleted
/// - deleted is final
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Recorded, money not yet moved.
    Pending,
    /// Money moved and ledger posted.
    Completed,
    /// Abandoned before completion.
    Failed,
    /// Completed, then undone.
    Reversed,
    /// Soft-deleted.
    Deleted,
}

impl TransactionStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Reversed => "reversed",
            Self::Deleted => "deleted",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "reversed" => Some(Self::Reversed),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Returns true if no field may change.
    #[must_use]
    pub const fn is_immutable(&self) -> bool {
        matches!(self, Self::Failed | Self::Reversed | Self::Deleted)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored domain transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTransaction {
    /// Transaction ID.
    pub id: Uuid,
    /// Branch it happened in.
    pub branch_id: Uuid,
    /// Business module.
    pub module: TransactionModule,
    /// Lifecycle status.
    pub status: TransactionStatus,
    /// Principal amount.
    pub amount: Decimal,
    /// Fee or commission charged.
    pub fee: Decimal,
    /// External reference (token, receipt, tracking number).
    pub reference: Option<String>,
    /// Float that took or paid the customer's money.
    pub payment_float_id: Option<Uuid>,
    /// Rail float consumed or replenished.
    pub service_float_id: Option<Uuid>,
    /// Module-specific fields.
    pub details: serde_json::Value,
    /// Journal posted for this transaction, if posting succeeded.
    pub gl_transaction_id: Option<Uuid>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Creating user.
    pub created_by: Uuid,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// When the transaction reached `completed`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl DomainTransaction {
    /// The revision a write against this snapshot is conditional on.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        Revision {
            id: self.id,
            status: self.status,
            updated_at: self.updated_at,
        }
    }
}

/// Snapshot version a guarded write expects to find.
///
/// Every edit moves `updated_at` forward, so a revision read before an
/// edit no longer matches after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    /// Transaction ID.
    pub id: Uuid,
    /// Status that was read.
    pub status: TransactionStatus,
    /// `updated_at` that was read.
    pub updated_at: DateTime<Utc>,
}

/// Input for recording a transaction.
#[derive(Debug, Clone)]
pub struct RecordRequest {
    /// Branch the transaction happens in.
    pub branch_id: Uuid,
    /// Business module.
    pub module: TransactionModule,
    /// Principal amount.
    pub amount: Decimal,
    /// Fee charged.
    pub fee: Decimal,
    /// External reference.
    pub reference: Option<String>,
    /// Payment float.
    pub payment_float_id: Option<Uuid>,
    /// Service float.
    pub service_float_id: Option<Uuid>,
    /// Move money now (`completed`) or just record (`pending`).
    pub settle: bool,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Module-specific fields.
    pub details: serde_json::Value,
    /// Acting user.
    pub created_by: Uuid,
}

/// Row to insert, built from a validated [`RecordRequest`].
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Pre-generated ID.
    pub id: Uuid,
    /// Branch.
    pub branch_id: Uuid,
    /// Module.
    pub module: TransactionModule,
    /// Initial status.
    pub status: TransactionStatus,
    /// Principal amount.
    pub amount: Decimal,
    /// Fee.
    pub fee: Decimal,
    /// External reference.
    pub reference: Option<String>,
    /// Payment float.
    pub payment_float_id: Option<Uuid>,
    /// Service float.
    pub service_float_id: Option<Uuid>,
    /// Module-specific fields.
    pub details: serde_json::Value,
    /// Notes.
    pub notes: Option<String>,
    /// Acting user.
    pub created_by: Uuid,
}

/// One planned float balance change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedMovement {
    /// Float to move.
    pub float_account_id: Uuid,
    /// Signed amount, already summed per float.
    pub delta: Decimal,
    /// Audit memo stored on the movement row.
    pub memo: String,
}

/// Everything the store writes atomically when recording.
#[derive(Debug, Clone)]
pub struct RecordPlan {
    /// Row to insert.
    pub transaction: NewTransaction,
    /// Float movements to apply (empty when pending).
    pub movements: Vec<PlannedMovement>,
    /// Card batch to draw one card from.
    pub consume_card_from: Option<Uuid>,
}

/// Editable fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionPatch {
    /// New amount (pending only).
    pub amount: Option<Decimal>,
    /// New fee (pending only).
    pub fee: Option<Decimal>,
    /// New reference.
    pub reference: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// Replacement details (pending only).
    pub details: Option<serde_json::Value>,
}

impl TransactionPatch {
    /// Names of fields that only pending transactions may change.
    #[must_use]
    pub fn money_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.amount.is_some() {
            fields.push("amount");
        }
        if self.fee.is_some() {
            fields.push("fee");
        }
        if self.details.is_some() {
            fields.push("details");
        }
        fields
    }

    /// True when nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.money_fields().is_empty() && self.reference.is_none() && self.notes.is_none()
    }
}

/// List filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    /// Restrict to one branch.
    pub branch_id: Option<Uuid>,
    /// Restrict to one module.
    pub module: Option<TransactionModule>,
    /// Restrict to one status.
    pub status: Option<TransactionStatus>,
    /// Created on or after this date.
    pub from: Option<NaiveDate>,
    /// Created on or before this date.
    pub to: Option<NaiveDate>,
}

/// Result of the ledger step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PostingOutcome {
    /// Journal inserted.
    Posted {
        /// The journal.
        gl_transaction_id: Uuid,
    },
    /// Nothing to post for this step.
    Skipped {
        /// Why.
        reason: String,
    },
    /// Posting failed; the business transaction stands.
    Failed {
        /// Error message.
        error: String,
    },
}

/// Result of the notification step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum NotificationOutcome {
    /// All messages delivered.
    Sent {
        /// Number of messages.
        count: usize,
    },
    /// Nothing to send.
    Skipped,
    /// At least one message failed.
    Failed {
        /// First error message.
        error: String,
    },
}

/// What a recorder operation did.
#[derive(Debug, Clone, Serialize)]
pub struct RecordOutcome {
    /// Transaction after the operation.
    pub transaction: DomainTransaction,
    /// Float balance changes applied.
    pub balances: Vec<BalanceChange>,
    /// Ledger step result.
    pub ledger: PostingOutcome,
    /// Notification step result.
    pub notification: NotificationOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_module_names_round_trip() {
        for module in TransactionModule::ALL {
            assert_eq!(TransactionModule::parse(module.as_str()), Some(module));
            let json = serde_json::to_value(module).unwrap();
            assert_eq!(json, serde_json::json!(module.as_str()));
        }
        assert_eq!(TransactionModule::parse("airtime"), None);
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            TransactionStatus::parse("COMPLETED"),
            Some(TransactionStatus::Completed)
        );
        assert_eq!(TransactionStatus::parse("voided"), None);
        assert_eq!(TransactionStatus::Deleted.to_string(), "deleted");
    }

    #[test]
    fn test_immutable_statuses() {
        assert!(!TransactionStatus::Pending.is_immutable());
        assert!(!TransactionStatus::Completed.is_immutable());
        assert!(TransactionStatus::Failed.is_immutable());
        assert!(TransactionStatus::Reversed.is_immutable());
        assert!(TransactionStatus::Deleted.is_immutable());
    }

    #[test]
    fn test_ledger_outcome_shape() {
        let failed = PostingOutcome::Failed {
            error: "boom".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"status": "failed", "error": "boom"})
        );
    }

    #[test]
    fn test_patch_money_fields() {
        let patch = TransactionPatch {
            amount: Some(dec!(5)),
            notes: Some("n".to_string()),
            ..Default::default()
        };
        assert_eq!(patch.money_fields(), vec!["amount"]);
        assert!(!patch.is_empty());
        assert!(TransactionPatch::default().is_empty());
    }
}
