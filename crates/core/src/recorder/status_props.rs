//! Property-based tests for the status machine.

use proptest::prelude::*;

use super::error::RecorderError;
use super::status::{FloatEffect, GlEffect, StatusService, TransitionAction};
use super::types::{TransactionPatch, TransactionStatus};

fn arb_status() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::Pending),
        Just(TransactionStatus::Completed),
        Just(TransactionStatus::Failed),
        Just(TransactionStatus::Reversed),
        Just(TransactionStatus::Deleted),
    ]
}

fn arb_action() -> impl Strategy<Value = TransitionAction> {
    prop_oneof![
        Just(TransitionAction::Complete),
        Just(TransitionAction::Fail),
        Just(TransitionAction::Reverse),
        Just(TransitionAction::Delete),
    ]
}

fn arb_patch() -> impl Strategy<Value = TransactionPatch> {
    (any::<bool>(), any::<bool>()).prop_map(|(reference, notes)| TransactionPatch {
        reference: reference.then(|| "R-1".to_string()),
        notes: (notes || !reference).then(|| "note".to_string()),
        ..Default::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Deleted is final: every action and every edit is rejected.
    #[test]
    fn prop_deleted_rejects_everything(action in arb_action(), patch in arb_patch()) {
        let is_invalid_transition = matches!(
            StatusService::transition(TransactionStatus::Deleted, action),
            Err(RecorderError::InvalidTransition { .. })
        );
        prop_assert!(is_invalid_transition);
        let is_immutable = matches!(
            StatusService::check_edit(TransactionStatus::Deleted, &patch),
            Err(RecorderError::Immutable(_))
        );
        prop_assert!(is_immutable);
    }

    /// Money moves back exactly when it had moved forward.
    #[test]
    fn prop_inverse_only_from_completed(from in arb_status(), action in arb_action()) {
        if let Ok(t) = StatusService::transition(from, action) {
            prop_assert_eq!(t.floats == FloatEffect::Inverse, from == TransactionStatus::Completed);
            prop_assert_eq!(t.ledger == GlEffect::Reverse, t.floats == FloatEffect::Inverse);
            prop_assert_eq!(t.floats == FloatEffect::Apply, from == TransactionStatus::Pending && action == TransitionAction::Complete);
            prop_assert_ne!(t.to, from);
        }
    }

    /// Reference/notes edits are accepted on pending and completed rows only.
    #[test]
    fn prop_light_edits(status in arb_status(), patch in arb_patch()) {
        let ok = StatusService::check_edit(status, &patch).is_ok();
        prop_assert_eq!(
            ok,
            matches!(status, TransactionStatus::Pending | TransactionStatus::Completed)
        );
    }
}
