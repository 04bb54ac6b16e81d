//! Integration tests for the float account repository.

mod common;

use std::sync::Arc;

use backoffice_core::auth::UserRole;
use backoffice_core::float::{FloatAccountPatch, FloatAccountType, FloatError};
use backoffice_db::FloatAccountRepository;
use backoffice_db::entities::float_movements;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tokio::task::JoinSet;

use common::{float, setup};

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_books_opening_balance_as_movement() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(500)).await;
    assert_eq!(till.current_balance, dec!(500));

    let movements = float_movements::Entity::find()
        .filter(float_movements::Column::FloatAccountId.eq(till.id))
        .all(&fx.db)
        .await
        .unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].balance_before, Decimal::ZERO);
    assert_eq!(movements[0].balance_after, dec!(500));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_active_float_rejected() {
    let fx = setup().await;
    float(&fx, FloatAccountType::Momo, Some("MTN"), Decimal::ZERO).await;

    let repo = FloatAccountRepository::new(fx.db.clone());
    let err = repo
        .create(
            backoffice_core::float::NewFloatAccount {
                branch_id: fx.branch_id,
                account_type: FloatAccountType::Momo,
                provider: Some("MTN".to_string()),
                account_number: None,
                min_threshold: Decimal::ZERO,
                max_threshold: Decimal::ZERO,
                opening_balance: Decimal::ZERO,
            },
            fx.user_id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FloatError::Duplicate { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_adjust_rejects_overdraw_and_keeps_balance() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(100)).await;
    let repo = FloatAccountRepository::new(fx.db.clone());

    let err = repo
        .adjust(till.id, dec!(-100.01), "count correction", fx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, FloatError::InsufficientBalance { .. }));

    let change = repo
        .adjust(till.id, dec!(-40), "count correction", fx.user_id)
        .await
        .unwrap();
    assert_eq!(change.balance_before, dec!(100));
    assert_eq!(change.balance_after, dec!(60));
    assert_eq!(repo.get(till.id).await.unwrap().current_balance, dec!(60));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_concurrent_debits_never_go_negative() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(100)).await;
    let repo = Arc::new(FloatAccountRepository::new(fx.db.clone()));

    let mut tasks = JoinSet::new();
    for _ in 0..20 {
        let repo = Arc::clone(&repo);
        let user = fx.user_id;
        tasks.spawn(async move { repo.adjust(till.id, dec!(-10), "race", user).await });
    }

    let mut succeeded = 0;
    while let Some(result) = tasks.join_next().await {
        if result.unwrap().is_ok() {
            succeeded += 1;
        }
    }

    assert_eq!(succeeded, 10);
    assert_eq!(repo.get(till.id).await.unwrap().current_balance, Decimal::ZERO);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_transfer_moves_both_balances() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(1000)).await;
    let momo = float(&fx, FloatAccountType::Momo, Some("MTN"), dec!(50)).await;
    let repo = FloatAccountRepository::new(fx.db.clone());

    let (debit, credit) = repo
        .transfer(till.id, momo.id, dec!(300), fx.user_id)
        .await
        .unwrap();
    assert_eq!(debit.balance_after, dec!(700));
    assert_eq!(credit.balance_after, dec!(350));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_requires_admin_and_password() {
    let fx = setup().await;
    let power = float(&fx, FloatAccountType::Power, Some("ECG"), dec!(10)).await;
    let repo = FloatAccountRepository::new(fx.db.clone());

    let err = repo.delete(power.id, UserRole::Manager, true).await.unwrap_err();
    assert!(matches!(err, FloatError::AdminRequired));
    let err = repo.delete(power.id, UserRole::Admin, false).await.unwrap_err();
    assert!(matches!(err, FloatError::InvalidPassword));

    repo.delete(power.id, UserRole::Admin, true).await.unwrap();
    assert!(matches!(
        repo.get(power.id).await.unwrap_err(),
        FloatError::NotFound(_)
    ));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_validates_thresholds() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(10)).await;
    let repo = FloatAccountRepository::new(fx.db.clone());

    let err = repo
        .update(
            till.id,
            &FloatAccountPatch {
                min_threshold: Some(dec!(500)),
                max_threshold: Some(dec!(100)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, FloatError::InvalidThresholds { .. }));

    let updated = repo
        .update(
            till.id,
            &FloatAccountPatch {
                min_threshold: Some(dec!(50)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.min_threshold, dec!(50));

    let alerts = repo.alerts(Some(fx.branch_id)).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].account.id, till.id);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_adjust_beyond_four_decimals_is_a_validation_error() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(100)).await;
    let repo = FloatAccountRepository::new(fx.db.clone());

    let err = repo
        .adjust(till.id, dec!(0.00004), "rounding", fx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, FloatError::TooPrecise(_)));
    assert_eq!(err.http_status_code(), 400);
    assert_eq!(repo.get(till.id).await.unwrap().current_balance, dec!(100));
}
