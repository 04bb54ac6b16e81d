//! Float account rules.

use rust_decimal::Decimal;

use super::error::FloatError;
use super::types::{
    BalanceChange, FloatAccount, FloatAccountPatch, FloatAlert, NewFloatAccount, ThresholdState,
};
use crate::auth::UserRole;
use crate::money::check_scale;

/// Stateless float account rules.
pub struct FloatService;

impl FloatService {
    /// Checks `0 <= min` and `0 <= max`, with `min <= max` unless max is zero.
    ///
    /// # Errors
    ///
    /// Returns `FloatError::InvalidThresholds` otherwise, or `TooPrecise`.
    pub fn validate_thresholds(min: Decimal, max: Decimal) -> Result<(), FloatError> {
        check_scale("min_threshold", min)?;
        check_scale("max_threshold", max)?;
        let ok = min >= Decimal::ZERO
            && max >= Decimal::ZERO
            && (max == Decimal::ZERO || min <= max);
        if ok {
            Ok(())
        } else {
            Err(FloatError::InvalidThresholds { min, max })
        }
    }

    /// Validates a new float before insert.
    ///
    /// # Errors
    ///
    /// Returns an error for bad thresholds or a negative opening balance.
    pub fn validate_new(input: &NewFloatAccount) -> Result<(), FloatError> {
        Self::validate_thresholds(input.min_threshold, input.max_threshold)?;
        check_scale("opening_balance", input.opening_balance)?;
        if input.opening_balance < Decimal::ZERO {
            return Err(FloatError::NegativeOpeningBalance);
        }
        Ok(())
    }

    /// Applies a patch to a snapshot, validating the merged thresholds.
    ///
    /// # Errors
    ///
    /// Returns `FloatError::InvalidThresholds` if the result is inconsistent.
    pub fn apply_patch(
        account: &FloatAccount,
        patch: &FloatAccountPatch,
    ) -> Result<FloatAccount, FloatError> {
        let mut updated = account.clone();
        if let Some(provider) = &patch.provider {
            updated.provider = Some(provider.clone());
        }
        if let Some(number) = &patch.account_number {
            updated.account_number = Some(number.clone());
        }
        if let Some(min) = patch.min_threshold {
            updated.min_threshold = min;
        }
        if let Some(max) = patch.max_threshold {
            updated.max_threshold = max;
        }
        if let Some(active) = patch.is_active {
            updated.is_active = active;
        }

        Self::validate_thresholds(updated.min_threshold, updated.max_threshold)?;
        Ok(updated)
    }

    /// Computes a signed adjustment against a snapshot.
    ///
    /// # Errors
    ///
    /// - `ZeroAdjustment` for a zero delta
    /// - `TooPrecise` for more than four decimal places
    /// - `Inactive` for a disabled float
    /// - `InsufficientBalance` if the result would be negative
    pub fn apply_adjustment(
        account: &FloatAccount,
        delta: Decimal,
    ) -> Result<BalanceChange, FloatError> {
        check_scale("delta", delta)?;
        if delta == Decimal::ZERO {
            return Err(FloatError::ZeroAdjustment);
        }
        Self::check_movement(account, delta)
    }

    /// Like [`Self::apply_adjustment`] but zero is a no-op change.
    ///
    /// Used for planned transaction movements, which may net to zero.
    ///
    /// # Errors
    ///
    /// Returns `Inactive` or `InsufficientBalance`.
    pub fn check_movement(
        account: &FloatAccount,
        delta: Decimal,
    ) -> Result<BalanceChange, FloatError> {
        if !account.is_active {
            return Err(FloatError::Inactive(account.id));
        }

        let balance_after = account.current_balance + delta;
        if balance_after < Decimal::ZERO {
            return Err(FloatError::InsufficientBalance {
                account_id: account.id,
                available: account.current_balance,
                required: -delta,
            });
        }

        Ok(BalanceChange {
            float_account_id: account.id,
            delta,
            balance_before: account.current_balance,
            balance_after,
        })
    }

    /// Validates a float-to-float transfer and returns both changes
    /// (source first).
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive, the floats are the
    /// same or in different branches, either is inactive, or the source
    /// lacks funds.
    pub fn plan_transfer(
        from: &FloatAccount,
        to: &FloatAccount,
        amount: Decimal,
    ) -> Result<(BalanceChange, BalanceChange), FloatError> {
        check_scale("amount", amount)?;
        if amount <= Decimal::ZERO {
            return Err(FloatError::NonPositiveAmount);
        }
        if from.id == to.id {
            return Err(FloatError::SameAccount);
        }
        if from.branch_id != to.branch_id {
            return Err(FloatError::BranchMismatch);
        }

        let debit = Self::check_movement(from, -amount)?;
        let credit = Self::check_movement(to, amount)?;
        Ok((debit, credit))
    }

    /// Deletion gate: admin role, verified password, no referencing rows.
    ///
    /// # Errors
    ///
    /// Returns `AdminRequired`, `InvalidPassword` or `HasTransactions`.
    pub fn validate_deletion(
        account: &FloatAccount,
        role: UserRole,
        password_verified: bool,
        reference_count: u64,
    ) -> Result<(), FloatError> {
        if !role.can_delete_floats() {
            return Err(FloatError::AdminRequired);
        }
        if !password_verified {
            return Err(FloatError::InvalidPassword);
        }
        if reference_count > 0 {
            return Err(FloatError::HasTransactions {
                account_id: account.id,
                count: reference_count,
            });
        }
        Ok(())
    }

    /// Classifies a balance against the account's thresholds.
    #[must_use]
    pub fn threshold_state(account: &FloatAccount) -> ThresholdState {
        if account.current_balance < account.min_threshold {
            ThresholdState::Low
        } else if account.max_threshold > Decimal::ZERO
            && account.current_balance > account.max_threshold
        {
            ThresholdState::High
        } else {
            ThresholdState::Normal
        }
    }

    /// Active floats outside their thresholds.
    #[must_use]
    pub fn alerts(accounts: Vec<FloatAccount>) -> Vec<FloatAlert> {
        accounts
            .into_iter()
            .filter(|a| a.is_active)
            .filter_map(|account| match Self::threshold_state(&account) {
                ThresholdState::Normal => None,
                state => Some(FloatAlert { account, state }),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::types::FloatAccountType;
    use chrono::Utc;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn account(balance: Decimal) -> FloatAccount {
        FloatAccount {
            id: Uuid::new_v4(),
            branch_id: Uuid::nil(),
            account_type: FloatAccountType::CashInTill,
            provider: None,
            account_number: None,
            current_balance: balance,
            min_threshold: dec!(100),
            max_threshold: dec!(5000),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(dec!(0), dec!(0), true)]
    #[case(dec!(100), dec!(0), true)]
    #[case(dec!(100), dec!(100), true)]
    #[case(dec!(100), dec!(50), false)]
    #[case(dec!(-1), dec!(50), false)]
    #[case(dec!(0), dec!(-5), false)]
    fn test_thresholds(#[case] min: Decimal, #[case] max: Decimal, #[case] ok: bool) {
        assert_eq!(FloatService::validate_thresholds(min, max).is_ok(), ok);
    }

    #[test]
    fn test_adjustment_moves_exact_delta() {
        let acc = account(dec!(250.00));

        let credit = FloatService::apply_adjustment(&acc, dec!(49.50)).unwrap();
        assert_eq!(credit.balance_before, dec!(250.00));
        assert_eq!(credit.balance_after, dec!(299.50));

        let debit = FloatService::apply_adjustment(&acc, dec!(-250.00)).unwrap();
        assert_eq!(debit.balance_after, Decimal::ZERO);
    }

    #[test]
    fn test_adjustment_rejects_overdraft() {
        let acc = account(dec!(10));
        let err = FloatService::apply_adjustment(&acc, dec!(-10.01)).unwrap_err();
        assert!(matches!(
            err,
            FloatError::InsufficientBalance { required, .. } if required == dec!(10.01)
        ));
    }

    #[test]
    fn test_adjustment_rejects_zero_and_inactive() {
        let mut acc = account(dec!(10));
        assert!(matches!(
            FloatService::apply_adjustment(&acc, Decimal::ZERO),
            Err(FloatError::ZeroAdjustment)
        ));

        acc.is_active = false;
        assert!(matches!(
            FloatService::apply_adjustment(&acc, dec!(5)),
            Err(FloatError::Inactive(_))
        ));
    }

    #[test]
    fn test_transfer_rules() {
        let from = account(dec!(300));
        let to = account(dec!(0));

        let (debit, credit) = FloatService::plan_transfer(&from, &to, dec!(120)).unwrap();
        assert_eq!(debit.balance_after, dec!(180));
        assert_eq!(credit.balance_after, dec!(120));

        assert!(matches!(
            FloatService::plan_transfer(&from, &from, dec!(1)),
            Err(FloatError::SameAccount)
        ));
        assert!(matches!(
            FloatService::plan_transfer(&from, &to, dec!(0)),
            Err(FloatError::NonPositiveAmount)
        ));
        assert!(matches!(
            FloatService::plan_transfer(&from, &to, dec!(300.01)),
            Err(FloatError::InsufficientBalance { .. })
        ));

        let mut elsewhere = account(dec!(0));
        elsewhere.branch_id = Uuid::new_v4();
        assert!(matches!(
            FloatService::plan_transfer(&from, &elsewhere, dec!(1)),
            Err(FloatError::BranchMismatch)
        ));
    }

    #[rstest]
    #[case::adjustment_delta("adjust", "delta")]
    #[case::transfer_amount("transfer", "amount")]
    #[case::min_threshold("thresholds", "min_threshold")]
    #[case::max_threshold("thresholds", "max_threshold")]
    #[case::opening_balance("create", "opening_balance")]
    fn test_money_beyond_four_decimals_rejected(#[case] operation: &str, #[case] field: &str) {
        let acc = account(dec!(500));
        let other = account(dec!(0));
        let odd = dec!(10.00005);
        let result = match (operation, field) {
            ("adjust", _) => FloatService::apply_adjustment(&acc, odd).map(drop),
            ("transfer", _) => FloatService::plan_transfer(&acc, &other, odd).map(drop),
            (_, "min_threshold") => FloatService::validate_thresholds(odd, Decimal::ZERO),
            (_, "max_threshold") => FloatService::validate_thresholds(Decimal::ZERO, odd),
            _ => FloatService::validate_new(&NewFloatAccount {
                branch_id: Uuid::nil(),
                account_type: FloatAccountType::CashInTill,
                provider: None,
                account_number: None,
                min_threshold: Decimal::ZERO,
                max_threshold: Decimal::ZERO,
                opening_balance: odd,
            }),
        };

        let err = result.unwrap_err();
        assert!(matches!(err, FloatError::TooPrecise(_)), "{operation}: {err:?}");
        assert_eq!(err.http_status_code(), 400);
        assert!(err.to_string().starts_with(field), "{err}");
    }

    #[test]
    fn test_trailing_zeros_do_not_count_as_precision() {
        let acc = account(dec!(10));
        let change = FloatService::apply_adjustment(&acc, dec!(0.50000000)).unwrap();
        assert_eq!(change.balance_after, dec!(10.5));
    }

    #[test]
    fn test_deletion_gate() {
        let acc = account(dec!(0));

        assert!(FloatService::validate_deletion(&acc, UserRole::Admin, true, 0).is_ok());
        assert!(matches!(
            FloatService::validate_deletion(&acc, UserRole::Manager, true, 0),
            Err(FloatError::AdminRequired)
        ));
        assert!(matches!(
            FloatService::validate_deletion(&acc, UserRole::Admin, false, 0),
            Err(FloatError::InvalidPassword)
        ));
        assert!(matches!(
            FloatService::validate_deletion(&acc, UserRole::Admin, true, 1),
            Err(FloatError::HasTransactions { count: 1, .. })
        ));
    }

    #[rstest]
    #[case(dec!(99.99), dec!(5000), ThresholdState::Low)]
    #[case(dec!(100), dec!(5000), ThresholdState::Normal)]
    #[case(dec!(5000.01), dec!(5000), ThresholdState::High)]
    #[case(dec!(999999), dec!(0), ThresholdState::Normal)]
    fn test_threshold_state(
        #[case] balance: Decimal,
        #[case] max: Decimal,
        #[case] expected: ThresholdState,
    ) {
        let mut acc = account(balance);
        acc.max_threshold = max;
        assert_eq!(FloatService::threshold_state(&acc), expected);
    }

    #[test]
    fn test_alerts_skip_inactive_and_normal() {
        let low = account(dec!(5));
        let normal = account(dec!(500));
        let mut disabled = account(dec!(1));
        disabled.is_active = false;

        let alerts = FloatService::alerts(vec![low.clone(), normal, disabled]);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].account.id, low.id);
        assert_eq!(alerts[0].state, ThresholdState::Low);
    }

    #[test]
    fn test_patch_validates_merged_thresholds() {
        let acc = account(dec!(0));
        let patch = FloatAccountPatch {
            min_threshold: Some(dec!(6000)),
            ..Default::default()
        };
        assert!(FloatService::apply_patch(&acc, &patch).is_err());

        let patch = FloatAccountPatch {
            provider: Some("MTN".to_string()),
            is_active: Some(false),
            ..Default::default()
        };
        let updated = FloatService::apply_patch(&acc, &patch).unwrap();
        assert_eq!(updated.provider.as_deref(), Some("MTN"));
        assert!(!updated.is_active);
    }
}
