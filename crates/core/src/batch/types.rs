//! Card batch types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A received lot of E-Zwich cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardBatch {
    /// Batch ID.
    pub id: Uuid,
    /// Branch holding the cards.
    pub branch_id: Uuid,
    /// Supplier batch code, unique per branch.
    pub batch_code: String,
    /// Cards received.
    pub quantity_received: i32,
    /// Cards issued so far.
    pub quantity_issued: i32,
    /// Card type (e.g. "standard").
    pub card_type: String,
    /// Cost per card.
    pub unit_cost: Decimal,
    /// Delivery date.
    pub received_date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl CardBatch {
    /// Cards still on hand.
    #[must_use]
    pub const fn quantity_available(&self) -> i32 {
        self.quantity_received - self.quantity_issued
    }
}

/// Input for registering a batch.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCardBatch {
    /// Branch holding the cards.
    pub branch_id: Uuid,
    /// Supplier batch code.
    pub batch_code: String,
    /// Cards received.
    pub quantity_received: i32,
    /// Card type.
    pub card_type: String,
    /// Cost per card.
    pub unit_cost: Decimal,
    /// Delivery date.
    pub received_date: NaiveDate,
    /// Notes.
    pub notes: Option<String>,
}

/// Editable batch fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CardBatchPatch {
    /// New batch code.
    pub batch_code: Option<String>,
    /// Corrected received quantity; never below issued.
    pub quantity_received: Option<i32>,
    /// New card type.
    pub card_type: Option<String>,
    /// New unit cost.
    pub unit_cost: Option<Decimal>,
    /// New delivery date.
    pub received_date: Option<NaiveDate>,
    /// New notes.
    pub notes: Option<String>,
}
