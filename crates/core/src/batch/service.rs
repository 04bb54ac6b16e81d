//! Card batch rules.

use chrono::Utc;
use rust_decimal::Decimal;

use super::error::BatchError;
use super::types::{CardBatch, CardBatchPatch, NewCardBatch};
use crate::money::check_scale;

/// Stateless batch rules; the db repository applies them inside its writes.
pub struct BatchService;

impl BatchService {
    /// Validates a new batch.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::Validation` for a blank code or card type, a
    /// non-positive quantity or a negative unit cost.
    pub fn validate_new(input: &NewCardBatch) -> Result<(), BatchError> {
        if input.batch_code.trim().is_empty() {
            return Err(BatchError::Validation("batch_code is required".to_string()));
        }
        if input.card_type.trim().is_empty() {
            return Err(BatchError::Validation("card_type is required".to_string()));
        }
        if input.quantity_received <= 0 {
            return Err(BatchError::Validation(
                "quantity_received must be greater than zero".to_string(),
            ));
        }
        check_scale("unit_cost", input.unit_cost)?;
        if input.unit_cost < Decimal::ZERO {
            return Err(BatchError::Validation(
                "unit_cost cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies a patch to a batch snapshot.
    ///
    /// # Errors
    ///
    /// Returns `BelowIssued` if the received quantity would drop under the
    /// issued count, or `Validation` for blank or negative values.
    pub fn apply_patch(batch: &CardBatch, patch: &CardBatchPatch) -> Result<CardBatch, BatchError> {
        let mut updated = batch.clone();

        if let Some(quantity) = patch.quantity_received {
            if quantity < batch.quantity_issued {
                return Err(BatchError::BelowIssued(batch.quantity_issued));
            }
            updated.quantity_received = quantity;
        }
        if let Some(code) = &patch.batch_code {
            if code.trim().is_empty() {
                return Err(BatchError::Validation("batch_code is required".to_string()));
            }
            updated.batch_code.clone_from(code);
        }
        if let Some(card_type) = &patch.card_type {
            if card_type.trim().is_empty() {
                return Err(BatchError::Validation("card_type is required".to_string()));
            }
            updated.card_type.clone_from(card_type);
        }
        if let Some(cost) = patch.unit_cost {
            check_scale("unit_cost", cost)?;
            if cost < Decimal::ZERO {
                return Err(BatchError::Validation(
                    "unit_cost cannot be negative".to_string(),
                ));
            }
            updated.unit_cost = cost;
        }
        if let Some(date) = patch.received_date {
            updated.received_date = date;
        }
        if let Some(notes) = &patch.notes {
            updated.notes = Some(notes.clone());
        }

        updated.updated_at = Utc::now();
        Ok(updated)
    }

    /// Only batches that never issued a card may be deleted.
    ///
    /// # Errors
    ///
    /// Returns `HasIssuedCards`.
    pub fn validate_delete(batch: &CardBatch) -> Result<(), BatchError> {
        if batch.quantity_issued > 0 {
            return Err(BatchError::HasIssuedCards(batch.quantity_issued));
        }
        Ok(())
    }

}
