//! Property-based tests for journal balance.
//!
//! - Every event the posting rules understand resolves to a balanced journal
//! - A reversal exactly cancels the original's balance deltas

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::chart::ExpenseCategory;
use super::rules::{LedgerEvent, PostingRules};
use super::service::LedgerService;
use super::service::tests::{context, seed_chart};
use crate::float::FloatAccountType;

/// Amounts from 0.00 to 100,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn float_type() -> impl Strategy<Value = FloatAccountType> {
    prop::sample::select(FloatAccountType::ALL.to_vec())
}

fn category() -> impl Strategy<Value = ExpenseCategory> {
    prop_oneof![
        Just(ExpenseCategory::Operational),
        Just(ExpenseCategory::Administrative),
        Just(ExpenseCategory::Marketing),
        Just(ExpenseCategory::Staff),
        Just(ExpenseCategory::Utilities),
        Just(ExpenseCategory::Transport),
        Just(ExpenseCategory::Other),
    ]
}

fn event() -> impl Strategy<Value = LedgerEvent> {
    prop_oneof![
        (amount(), amount(), float_type())
            .prop_map(|(amount, fee, payment)| LedgerEvent::PowerSale { amount, fee, payment }),
        (amount(), amount(), float_type())
            .prop_map(|(amount, fee, payment)| LedgerEvent::MomoCashIn { amount, fee, payment }),
        (amount(), amount(), float_type())
            .prop_map(|(amount, fee, payment)| LedgerEvent::MomoCashOut { amount, fee, payment }),
        (amount(), amount(), float_type()).prop_map(|(amount, fee, payment)| {
            LedgerEvent::AgencyDeposit { amount, fee, payment }
        }),
        (amount(), amount(), float_type()).prop_map(|(amount, fee, payment)| {
            LedgerEvent::AgencyWithdrawal { amount, fee, payment }
        }),
        (amount(), float_type()).prop_map(|(fee, payment)| LedgerEvent::CardIssuance { fee, payment }),
        amount().prop_map(|amount| LedgerEvent::JumiaCollection { amount }),
        amount().prop_map(|amount| LedgerEvent::JumiaSettlement { amount }),
        (amount(), category(), float_type()).prop_map(|(amount, category, payment)| {
            LedgerEvent::Expense { amount, category, payment }
        }),
        (amount(), float_type(), float_type())
            .prop_map(|(amount, from, to)| LedgerEvent::FloatTransfer { amount, from, to }),
        (amount(), any::<bool>(), float_type()).prop_map(|(amount, negative, float)| {
            LedgerEvent::ManualAdjustment {
                delta: if negative { -amount } else { amount },
                float,
            }
        }),
    ]
}

proptest! {
    #[test]
    fn prop_posting_rules_always_balance(event in event()) {
        let chart = seed_chart();
        let draft = PostingRules::draft(&event, context());
        prop_assume!(!draft.is_empty());

        let journal = LedgerService::resolve(&draft, &chart).unwrap();
        prop_assert!(journal.totals.is_balanced);
        prop_assert_eq!(journal.totals.debit, journal.totals.credit);
        prop_assert!(journal.lines.len() >= 2);
        for line in &journal.lines {
            prop_assert!(line.debit >= Decimal::ZERO && line.credit >= Decimal::ZERO);
            prop_assert!(line.debit == Decimal::ZERO || line.credit == Decimal::ZERO);
        }
    }

    #[test]
    fn prop_reversal_cancels_deltas(event in event()) {
        let chart = seed_chart();
        let draft = PostingRules::draft(&event, context());
        prop_assume!(!draft.is_empty());

        let original = LedgerService::resolve(&draft, &chart).unwrap();
        let reversal = LedgerService::reverse(&original.lines, context(), &chart).unwrap();

        prop_assert_eq!(original.totals.debit, reversal.totals.credit);
        prop_assert_eq!(original.balance_deltas.len(), reversal.balance_deltas.len());
        for (o, r) in original.balance_deltas.iter().zip(&reversal.balance_deltas) {
            prop_assert_eq!(o.account_id, r.account_id);
            prop_assert_eq!(o.delta + r.delta, Decimal::ZERO);
        }
    }
}
