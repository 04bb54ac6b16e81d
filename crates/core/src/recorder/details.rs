//! Module-specific transaction details.
//!
//! Details travel as JSON and are stored as JSONB; this module parses
//! and validates them per module.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use super::error::RecorderError;
use super::types::TransactionModule;
use crate::ledger::ExpenseCategory;

/// MoMo direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MomoDirection {
    /// Customer hands over cash, receives e-money.
    CashIn,
    /// Customer sends e-money, receives cash.
    CashOut,
}

/// Agency banking direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgencyDirection {
    /// Cash paid into a partner bank account.
    Deposit,
    /// Cash taken out of a partner bank account.
    Withdrawal,
}

/// Power sale details.
#[derive(Debug, Clone, Deserialize)]
pub struct PowerDetails {
    /// Prepaid meter number.
    pub meter_number: String,
    /// Utility provider.
    pub provider: String,
}

/// MoMo details.
#[derive(Debug, Clone, Deserialize)]
pub struct MomoDetails {
    /// Cash-in or cash-out.
    pub direction: MomoDirection,
    /// Customer wallet number.
    pub phone_number: String,
}

/// Agency banking details.
#[derive(Debug, Clone, Deserialize)]
pub struct AgencyDetails {
    /// Deposit or withdrawal.
    pub direction: AgencyDirection,
    /// Partner bank.
    pub partner_bank: String,
    /// Customer bank account.
    pub account_number: String,
}

/// E-Zwich card issuance details.
#[derive(Debug, Clone, Deserialize)]
pub struct CardIssuanceDetails {
    /// Batch the card comes from.
    pub batch_id: Uuid,
    /// Printed card number.
    pub card_number: String,
    /// Card holder.
    pub customer_name: String,
}

/// Jumia collection details.
#[derive(Debug, Clone, Deserialize)]
pub struct JumiaCollectionDetails {
    /// Parcel tracking ID.
    pub tracking_id: String,
}

/// Jumia settlement details.
#[derive(Debug, Clone, Deserialize)]
pub struct JumiaSettlementDetails {
    /// Partner-side settlement reference.
    pub settlement_reference: String,
}

/// Expense details.
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseDetails {
    /// Category name; unknown names post as operational.
    pub category: String,
    /// What the money was spent on.
    pub description: String,
}

impl ExpenseDetails {
    /// Resolved category.
    #[must_use]
    pub fn category(&self) -> ExpenseCategory {
        ExpenseCategory::resolve(&self.category)
    }
}

/// Parsed details, one variant per module.
#[derive(Debug, Clone)]
pub enum TransactionDetails {
    /// Power sale.
    Power(PowerDetails),
    /// MoMo.
    Momo(MomoDetails),
    /// Agency banking.
    Agency(AgencyDetails),
    /// Card issuance.
    CardIssuance(CardIssuanceDetails),
    /// Jumia collection.
    JumiaCollection(JumiaCollectionDetails),
    /// Jumia settlement.
    JumiaSettlement(JumiaSettlementDetails),
    /// Expense.
    Expense(ExpenseDetails),
}

impl TransactionDetails {
    /// Parses and validates details for a module.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError::Validation` naming the first missing or
    /// blank field.
    pub fn parse(module: TransactionModule, details: &Value) -> Result<Self, RecorderError> {
        let parsed = match module {
            TransactionModule::Power => {
                let d: PowerDetails = from_value(module, details)?;
                require(&[("meter_number", &d.meter_number), ("provider", &d.provider)])?;
                Self::Power(d)
            }
            TransactionModule::Momo => {
                let d: MomoDetails = from_value(module, details)?;
                require(&[("phone_number", &d.phone_number)])?;
                Self::Momo(d)
            }
            TransactionModule::AgencyBanking => {
                let d: AgencyDetails = from_value(module, details)?;
                require(&[
                    ("partner_bank", &d.partner_bank),
                    ("account_number", &d.account_number),
                ])?;
                Self::Agency(d)
            }
            TransactionModule::EZwich => {
                let d: CardIssuanceDetails = from_value(module, details)?;
                require(&[
                    ("card_number", &d.card_number),
                    ("customer_name", &d.customer_name),
                ])?;
                Self::CardIssuance(d)
            }
            TransactionModule::JumiaCollection => {
                let d: JumiaCollectionDetails = from_value(module, details)?;
                require(&[("tracking_id", &d.tracking_id)])?;
                Self::JumiaCollection(d)
            }
            TransactionModule::JumiaSettlement => {
                let d: JumiaSettlementDetails = from_value(module, details)?;
                require(&[("settlement_reference", &d.settlement_reference)])?;
                Self::JumiaSettlement(d)
            }
            TransactionModule::Expenses => {
                let d: ExpenseDetails = from_value(module, details)?;
                require(&[("category", &d.category), ("description", &d.description)])?;
                Self::Expense(d)
            }
        };
        Ok(parsed)
    }

    /// Batch to draw a card from, for card issuance.
    #[must_use]
    pub const fn card_batch(&self) -> Option<Uuid> {
        match self {
            Self::CardIssuance(d) => Some(d.batch_id),
            _ => None,
        }
    }
}

fn from_value<T: DeserializeOwned>(
    module: TransactionModule,
    details: &Value,
) -> Result<T, RecorderError> {
    T::deserialize(details)
        .map_err(|e| RecorderError::Validation(format!("Invalid {module} details: {e}")))
}

fn require(fields: &[(&str, &String)]) -> Result<(), RecorderError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(RecorderError::Validation(format!("{name} is required"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(TransactionModule::Power, json!({"meter_number": "0412", "provider": "ECG"}))]
    #[case(TransactionModule::Momo, json!({"direction": "cash-out", "phone_number": "0244"}))]
    #[case(TransactionModule::AgencyBanking, json!({"direction": "deposit", "partner_bank": "GCB", "account_number": "1"}))]
    #[case(TransactionModule::EZwich, json!({"batch_id": Uuid::nil(), "card_number": "EZ1", "customer_name": "Kofi"}))]
    #[case(TransactionModule::JumiaCollection, json!({"tracking_id": "JM-1"}))]
    #[case(TransactionModule::JumiaSettlement, json!({"settlement_reference": "ST-9"}))]
    #[case(TransactionModule::Expenses, json!({"category": "utilities", "description": "Water bill"}))]
    fn test_valid_details(#[case] module: TransactionModule, #[case] details: Value) {
        assert!(TransactionDetails::parse(module, &details).is_ok());
    }

    #[test]
    fn test_missing_field_names_module() {
        let err = TransactionDetails::parse(TransactionModule::Power, &json!({"provider": "ECG"}))
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid power details"), "{message}");
        assert!(message.contains("meter_number"), "{message}");
    }

    #[test]
    fn test_blank_field_rejected() {
        let err = TransactionDetails::parse(
            TransactionModule::Expenses,
            &json!({"category": "transport", "description": "   "}),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "description is required");
    }

    #[test]
    fn test_bad_direction_rejected() {
        assert!(
            TransactionDetails::parse(
                TransactionModule::Momo,
                &json!({"direction": "sideways", "phone_number": "0244"}),
            )
            .is_err()
        );
    }

    #[test]
    fn test_card_batch() {
        let batch = Uuid::new_v4();
        let details = TransactionDetails::parse(
            TransactionModule::EZwich,
            &json!({"batch_id": batch, "card_number": "EZ1", "customer_name": "Kofi"}),
        )
        .unwrap();
        assert_eq!(details.card_batch(), Some(batch));
    }

    #[test]
    fn test_unknown_expense_category_falls_back() {
        let details = TransactionDetails::parse(
            TransactionModule::Expenses,
            &json!({"category": "snacks", "description": "Team lunch"}),
        )
        .unwrap();
        let TransactionDetails::Expense(expense) = details else {
            panic!("expected expense details");
        };
        assert_eq!(expense.category(), ExpenseCategory::Operational);
    }
}
