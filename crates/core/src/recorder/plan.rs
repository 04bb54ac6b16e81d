//! Float movement planning and ledger event mapping.
//!
//! `pay` is the payment float, `svc` the service float:
//!
//! | Event             | Movements               |
//! |-------------------|-------------------------|
//! | Power sale        | svc -A; pay +A+F        |
//! | MoMo cash-in      | svc -A; pay +A+F        |
//! | MoMo cash-out     | svc +A; pay -A+F        |
//! | Agency deposit    | svc -A; pay +A+F        |
//! | Agency withdrawal | svc +A; pay -A+F        |
//! | Card issuance     | pay +F                  |
//! | Jumia collection  | svc +A                  |
//! | Jumia settlement  | svc -A                  |
//! | Expense           | pay -A                  |
//!
//! Movements on the same float are summed before the balance check.

use rust_decimal::Decimal;
use uuid::Uuid;

use super::details::{AgencyDirection, MomoDirection, TransactionDetails};
use super::error::RecorderError;
use super::types::{PlannedMovement, TransactionModule};
use crate::float::{BalanceChange, FloatAccount, FloatError, FloatService};
use crate::ledger::LedgerEvent;
use crate::money::check_scale;

/// Floats referenced by a transaction, loaded from the store.
#[derive(Debug, Clone, Default)]
pub struct LoadedFloats {
    /// Payment float.
    pub payment: Option<FloatAccount>,
    /// Service float.
    pub service: Option<FloatAccount>,
}

impl LoadedFloats {
    fn find(&self, id: Uuid) -> Option<&FloatAccount> {
        self.payment
            .iter()
            .chain(self.service.iter())
            .find(|f| f.id == id)
    }
}

/// Monetary inputs of a transaction.
#[derive(Debug, Clone, Copy)]
pub struct Amounts {
    /// Principal.
    pub amount: Decimal,
    /// Fee.
    pub fee: Decimal,
}

/// Stateless movement planner.
pub struct MovementPlanner;

impl MovementPlanner {
    /// Amount must be positive (card issuance may be zero); fee non-negative.
    /// Both must fit the stored money scale.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError::Validation`.
    pub fn validate_amounts(
        module: TransactionModule,
        amounts: Amounts,
    ) -> Result<(), RecorderError> {
        check_scale("amount", amounts.amount)?;
        check_scale("fee", amounts.fee)?;
        let amount_ok = if module == TransactionModule::EZwich {
            amounts.amount >= Decimal::ZERO
        } else {
            amounts.amount > Decimal::ZERO
        };
        if !amount_ok {
            return Err(RecorderError::Validation(
                "Amount must be greater than zero".to_string(),
            ));
        }
        if amounts.fee < Decimal::ZERO {
            return Err(RecorderError::Validation(
                "Fee cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks the floats a module needs are present, active, of the right
    /// type and in the transaction's branch.
    ///
    /// # Errors
    ///
    /// Returns a validation or float error naming the first problem.
    pub fn validate_floats(
        module: TransactionModule,
        branch_id: Uuid,
        floats: &LoadedFloats,
    ) -> Result<(), RecorderError> {
        if module.uses_payment_float() {
            let payment = floats.payment.as_ref().ok_or_else(|| {
                RecorderError::Validation("payment_float_id is required".to_string())
            })?;
            Self::check_float(payment, branch_id)?;
        }

        if let Some(expected) = module.service_float_type() {
            let service = floats.service.as_ref().ok_or_else(|| {
                RecorderError::Validation("service_float_id is required".to_string())
            })?;
            if service.account_type != expected {
                return Err(RecorderError::Validation(format!(
                    "Service float must be a {expected} float, got {}",
                    service.account_type
                )));
            }
            Self::check_float(service, branch_id)?;
        }
        Ok(())
    }

    fn check_float(float: &FloatAccount, branch_id: Uuid) -> Result<(), RecorderError> {
        if float.branch_id != branch_id {
            return Err(FloatError::BranchMismatch.into());
        }
        if !float.is_active {
            return Err(FloatError::Inactive(float.id).into());
        }
        Ok(())
    }

    /// Plans the movements for a transaction, summed per float with zero
    /// nets dropped.
    #[must_use]
    pub fn plan(
        details: &TransactionDetails,
        amounts: Amounts,
        floats: &LoadedFloats,
    ) -> Vec<PlannedMovement> {
        let Amounts { amount, fee } = amounts;
        let pay = floats.payment.as_ref().map(|f| f.id);
        let svc = floats.service.as_ref().map(|f| f.id);

        let raw: Vec<(Option<Uuid>, Decimal, &str)> = match details {
            TransactionDetails::Power(_) => vec![
                (svc, -amount, "Power units sold"),
                (pay, amount + fee, "Power sale received"),
            ],
            TransactionDetails::Momo(d) => match d.direction {
                MomoDirection::CashIn => vec![
                    (svc, -amount, "MoMo cash-in sent"),
                    (pay, amount + fee, "MoMo cash-in received"),
                ],
                MomoDirection::CashOut => vec![
                    (svc, amount, "MoMo cash-out received"),
                    (pay, fee - amount, "MoMo cash-out paid"),
                ],
            },
            TransactionDetails::Agency(d) => match d.direction {
                AgencyDirection::Deposit => vec![
                    (svc, -amount, "Agency deposit credited"),
                    (pay, amount + fee, "Agency deposit received"),
                ],
                AgencyDirection::Withdrawal => vec![
                    (svc, amount, "Agency withdrawal debited"),
                    (pay, fee - amount, "Agency withdrawal paid"),
                ],
            },
            TransactionDetails::CardIssuance(_) => vec![(pay, fee, "Card issuance fee")],
            TransactionDetails::JumiaCollection(_) => vec![(svc, amount, "Jumia POD collected")],
            TransactionDetails::JumiaSettlement(_) => vec![(svc, -amount, "Jumia settlement paid")],
            TransactionDetails::Expense(_) => vec![(pay, -amount, "Expense paid")],
        };

        Self::sum_per_float(
            raw.into_iter()
                .filter_map(|(id, delta, memo)| id.map(|id| (id, delta, memo))),
        )
    }

    fn sum_per_float<'a>(
        raw: impl IntoIterator<Item = (Uuid, Decimal, &'a str)>,
    ) -> Vec<PlannedMovement> {
        let mut summed: Vec<PlannedMovement> = Vec::new();
        for (id, delta, memo) in raw {
            match summed.iter_mut().find(|m| m.float_account_id == id) {
                Some(existing) => {
                    existing.delta += delta;
                    existing.memo = format!("{}; {memo}", existing.memo);
                }
                None => summed.push(PlannedMovement {
                    float_account_id: id,
                    delta,
                    memo: memo.to_string(),
                }),
            }
        }
        summed.retain(|m| m.delta != Decimal::ZERO);
        summed
    }

    /// Movements that undo a plan.
    #[must_use]
    pub fn inverse(plan: &[PlannedMovement]) -> Vec<PlannedMovement> {
        plan.iter()
            .map(|m| PlannedMovement {
                float_account_id: m.float_account_id,
                delta: -m.delta,
                memo: format!("Reversal: {}", m.memo),
            })
            .collect()
    }

    /// Checks every movement against the loaded snapshots.
    ///
    /// The store re-checks at write time with a guarded update; this gives
    /// callers a precise error before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `FloatError::NotFound`, `Inactive` or `InsufficientBalance`.
    pub fn check_funds(
        plan: &[PlannedMovement],
        floats: &LoadedFloats,
    ) -> Result<Vec<BalanceChange>, RecorderError> {
        plan.iter()
            .map(|m| {
                let float = floats
                    .find(m.float_account_id)
                    .ok_or(FloatError::NotFound(m.float_account_id))?;
                Ok(FloatService::check_movement(float, m.delta)?)
            })
            .collect()
    }

    /// Ledger event for a transaction, if it has a payment float where one
    /// is needed.
    #[must_use]
    pub fn ledger_event(
        details: &TransactionDetails,
        amounts: Amounts,
        floats: &LoadedFloats,
    ) -> Option<LedgerEvent> {
        let Amounts { amount, fee } = amounts;
        let payment = floats.payment.as_ref().map(|f| f.account_type);

        let event = match details {
            TransactionDetails::Power(_) => LedgerEvent::PowerSale {
                amount,
                fee,
                payment: payment?,
            },
            TransactionDetails::Momo(d) => match d.direction {
                MomoDirection::CashIn => LedgerEvent::MomoCashIn {
                    amount,
                    fee,
                    payment: payment?,
                },
                MomoDirection::CashOut => LedgerEvent::MomoCashOut {
                    amount,
                    fee,
                    payment: payment?,
                },
            },
            TransactionDetails::Agency(d) => match d.direction {
                AgencyDirection::Deposit => LedgerEvent::AgencyDeposit {
                    amount,
                    fee,
                    payment: payment?,
                },
                AgencyDirection::Withdrawal => LedgerEvent::AgencyWithdrawal {
                    amount,
                    fee,
                    payment: payment?,
                },
            },
            TransactionDetails::CardIssuance(_) => LedgerEvent::CardIssuance {
                fee,
                payment: payment?,
            },
            TransactionDetails::JumiaCollection(_) => LedgerEvent::JumiaCollection { amount },
            TransactionDetails::JumiaSettlement(_) => LedgerEvent::JumiaSettlement { amount },
            TransactionDetails::Expense(d) => LedgerEvent::Expense {
                amount,
                category: d.category(),
                payment: payment?,
            },
        };
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::FloatAccountType;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn float(account_type: FloatAccountType, balance: Decimal, branch_id: Uuid) -> FloatAccount {
        FloatAccount {
            id: Uuid::new_v4(),
            branch_id,
            account_type,
            provider: None,
            account_number: None,
            current_balance: balance,
            min_threshold: Decimal::ZERO,
            max_threshold: Decimal::ZERO,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn momo(direction: &str) -> TransactionDetails {
        TransactionDetails::parse(
            TransactionModule::Momo,
            &json!({"direction": direction, "phone_number": "0244000000"}),
        )
        .unwrap()
    }

    fn floats(branch: Uuid) -> LoadedFloats {
        LoadedFloats {
            payment: Some(float(FloatAccountType::CashInTill, dec!(1000), branch)),
            service: Some(float(FloatAccountType::Momo, dec!(1000), branch)),
        }
    }

    fn amounts() -> Amounts {
        Amounts {
            amount: dec!(300),
            fee: dec!(5),
        }
    }

    #[test]
    fn test_cash_out_plan() {
        let f = floats(Uuid::new_v4());
        let plan = MovementPlanner::plan(&momo("cash-out"), amounts(), &f);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].float_account_id, f.service.as_ref().unwrap().id);
        assert_eq!(plan[0].delta, dec!(300));
        assert_eq!(plan[1].float_account_id, f.payment.as_ref().unwrap().id);
        assert_eq!(plan[1].delta, dec!(-295));

        let changes = MovementPlanner::check_funds(&plan, &f).unwrap();
        assert_eq!(changes[1].balance_after, dec!(705));
    }

    #[test]
    fn test_same_float_movements_are_summed() {
        let branch = Uuid::new_v4();
        let shared = float(FloatAccountType::Momo, dec!(0), branch);
        let f = LoadedFloats {
            payment: Some(shared.clone()),
            service: Some(shared),
        };
        // svc +300 and pay -295 on one float nets to +5, so an empty float
        // still passes the check.
        let plan = MovementPlanner::plan(&momo("cash-out"), amounts(), &f);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].delta, dec!(5));
        assert!(MovementPlanner::check_funds(&plan, &f).is_ok());
    }

    #[test]
    fn test_insufficient_service_float() {
        let branch = Uuid::new_v4();
        let mut f = floats(branch);
        f.service.as_mut().unwrap().current_balance = dec!(299.99);

        let plan = MovementPlanner::plan(&momo("cash-in"), amounts(), &f);
        assert!(matches!(
            MovementPlanner::check_funds(&plan, &f),
            Err(RecorderError::Float(FloatError::InsufficientBalance { .. }))
        ));
    }

    #[test]
    fn test_inverse_negates() {
        let f = floats(Uuid::new_v4());
        let plan = MovementPlanner::plan(&momo("cash-in"), amounts(), &f);
        let inverse = MovementPlanner::inverse(&plan);
        for (a, b) in plan.iter().zip(&inverse) {
            assert_eq!(a.delta, -b.delta);
            assert!(b.memo.starts_with("Reversal: "));
        }
    }

    #[test]
    fn test_validate_floats() {
        let branch = Uuid::new_v4();
        let f = floats(branch);
        assert!(MovementPlanner::validate_floats(TransactionModule::Momo, branch, &f).is_ok());

        let err = MovementPlanner::validate_floats(TransactionModule::Power, branch, &f).unwrap_err();
        assert_eq!(err.to_string(), "Service float must be a power float, got momo");

        assert!(matches!(
            MovementPlanner::validate_floats(TransactionModule::Momo, Uuid::new_v4(), &f),
            Err(RecorderError::Float(FloatError::BranchMismatch))
        ));

        let missing = LoadedFloats {
            payment: None,
            ..f
        };
        assert_eq!(
            MovementPlanner::validate_floats(TransactionModule::Expenses, branch, &missing)
                .unwrap_err()
                .to_string(),
            "payment_float_id is required"
        );
    }

    #[test]
    fn test_jumia_needs_no_payment_float() {
        let branch = Uuid::new_v4();
        let f = LoadedFloats {
            payment: None,
            service: Some(float(FloatAccountType::Jumia, dec!(0), branch)),
        };
        assert!(
            MovementPlanner::validate_floats(TransactionModule::JumiaCollection, branch, &f)
                .is_ok()
        );
        let details = TransactionDetails::parse(
            TransactionModule::JumiaCollection,
            &json!({"tracking_id": "JM-77"}),
        )
        .unwrap();
        assert_eq!(
            MovementPlanner::ledger_event(&details, amounts(), &f),
            Some(LedgerEvent::JumiaCollection { amount: dec!(300) })
        );
    }

    #[test]
    fn test_amount_validation() {
        let zero = Amounts {
            amount: Decimal::ZERO,
            fee: dec!(10),
        };
        assert!(MovementPlanner::validate_amounts(TransactionModule::EZwich, zero).is_ok());
        assert!(MovementPlanner::validate_amounts(TransactionModule::Power, zero).is_err());
        let negative_fee = Amounts {
            amount: dec!(1),
            fee: dec!(-1),
        };
        assert!(MovementPlanner::validate_amounts(TransactionModule::Power, negative_fee).is_err());
    }

    #[rstest]
    #[case::amount(dec!(10.00005), dec!(0))]
    #[case::fee(dec!(10), dec!(0.00005))]
    #[case::card_fee(dec!(0), dec!(15.123456))]
    fn test_amounts_beyond_four_decimals_rejected(#[case] amount: Decimal, #[case] fee: Decimal) {
        let module = if amount == Decimal::ZERO {
            TransactionModule::EZwich
        } else {
            TransactionModule::Power
        };
        let err = MovementPlanner::validate_amounts(module, Amounts { amount, fee }).unwrap_err();
        assert!(matches!(err, RecorderError::Validation(_)));
        assert_eq!(err.http_status_code(), 400);
        assert!(err.to_string().contains("more than 4 decimal places"));
    }
}
