//! Money precision.
//!
//! Every money column is `NUMERIC(19,4)`. Amounts with more decimal places
//! are rejected up front instead of being rounded on write.

use rust_decimal::Decimal;
use thiserror::Error;

/// Decimal places a stored amount may carry.
pub const MONEY_SCALE: u32 = 4;

/// A money input carries more decimal places than can be stored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} has more than {MONEY_SCALE} decimal places: {value}")]
pub struct ScaleError {
    /// Input field name.
    pub field: &'static str,
    /// Offending value.
    pub value: Decimal,
}

/// Checks that `value` fits [`MONEY_SCALE`]; trailing zeros do not count.
///
/// # Errors
///
/// Returns [`ScaleError`] naming `field`.
pub fn check_scale(field: &'static str, value: Decimal) -> Result<(), ScaleError> {
    if value.normalize().scale() <= MONEY_SCALE {
        Ok(())
    } else {
        Err(ScaleError { field, value })
    }
}
