//! End-to-end recorder tests against PostgreSQL: transaction rows, float
//! movements and journals written by the real repositories.

mod common;

use backoffice_core::auth::UserRole;
use backoffice_core::float::{FloatAccountType, FloatError};
use backoffice_core::notify::NoopNotifier;
use backoffice_core::recorder::{
    PostingOutcome, RecordRequest, RecorderError, TransactionModule, TransactionRecorder,
    TransactionStatus,
};
use backoffice_db::{BatchRepository, FloatAccountRepository, GlRepository, TransactionRepository};
use backoffice_core::batch::{BatchError, NewCardBatch};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

use common::{Fixture, float, setup};

fn recorder(fx: &Fixture) -> TransactionRecorder<TransactionRepository, GlRepository, NoopNotifier> {
    TransactionRecorder::new(
        TransactionRepository::new(fx.db.clone()),
        GlRepository::new(fx.db.clone()),
        NoopNotifier,
    )
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_power_sale_moves_floats_and_posts_balanced_journal() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(1000)).await;
    let power = float(&fx, FloatAccountType::Power, Some("ECG"), dec!(500)).await;
    let recorder = recorder(&fx);

    let outcome = recorder
        .record(RecordRequest {
            branch_id: fx.branch_id,
            module: TransactionModule::Power,
            amount: dec!(200),
            fee: dec!(5),
            reference: Some("TOKEN-1".to_string()),
            payment_float_id: Some(till.id),
            service_float_id: Some(power.id),
            settle: true,
            notes: None,
            details: json!({"meter_number": "0412345", "provider": "ECG"}),
            created_by: fx.user_id,
        })
        .await
        .unwrap();

    assert_eq!(outcome.transaction.status, TransactionStatus::Completed);
    let PostingOutcome::Posted { gl_transaction_id } = outcome.ledger else {
        panic!("expected a posted journal, got {:?}", outcome.ledger);
    };

    let floats = FloatAccountRepository::new(fx.db.clone());
    assert_eq!(floats.get(till.id).await.unwrap().current_balance, dec!(1205));
    assert_eq!(floats.get(power.id).await.unwrap().current_balance, dec!(300));

    let journal = GlRepository::new(fx.db.clone())
        .get_transaction(gl_transaction_id)
        .await
        .unwrap();
    let debit: Decimal = journal.lines.iter().map(|l| l.debit).sum();
    let credit: Decimal = journal.lines.iter().map(|l| l.credit).sum();
    assert_eq!(debit, dec!(205));
    assert_eq!(debit, credit);

    let stored = recorder.get(outcome.transaction.id).await.unwrap();
    assert_eq!(stored.gl_transaction_id, Some(gl_transaction_id));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_reverse_restores_float_balances() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(1000)).await;
    let momo = float(&fx, FloatAccountType::Momo, Some("MTN"), dec!(800)).await;
    let recorder = recorder(&fx);

    let outcome = recorder
        .record(RecordRequest {
            branch_id: fx.branch_id,
            module: TransactionModule::Momo,
            amount: dec!(300),
            fee: dec!(3),
            reference: None,
            payment_float_id: Some(till.id),
            service_float_id: Some(momo.id),
            settle: true,
            notes: None,
            details: json!({"direction": "cash-in", "phone_number": "0241234567"}),
            created_by: fx.user_id,
        })
        .await
        .unwrap();

    let reversed = recorder
        .reverse(outcome.transaction.id, fx.user_id)
        .await
        .unwrap();
    assert_eq!(reversed.transaction.status, TransactionStatus::Reversed);
    assert!(matches!(reversed.ledger, PostingOutcome::Posted { .. }));

    let floats = FloatAccountRepository::new(fx.db.clone());
    assert_eq!(floats.get(till.id).await.unwrap().current_balance, dec!(1000));
    assert_eq!(floats.get(momo.id).await.unwrap().current_balance, dec!(800));

    let err = recorder
        .reverse(outcome.transaction.id, fx.user_id)
        .await
        .unwrap_err();
    assert!(matches!(err, RecorderError::InvalidTransition { .. }));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_insufficient_service_float_writes_nothing() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(1000)).await;
    let power = float(&fx, FloatAccountType::Power, Some("ECG"), dec!(50)).await;
    let recorder = recorder(&fx);

    let err = recorder
        .record(RecordRequest {
            branch_id: fx.branch_id,
            module: TransactionModule::Power,
            amount: dec!(200),
            fee: Decimal::ZERO,
            reference: None,
            payment_float_id: Some(till.id),
            service_float_id: Some(power.id),
            settle: true,
            notes: None,
            details: json!({"meter_number": "0412345", "provider": "ECG"}),
            created_by: fx.user_id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RecorderError::Float(_)));

    let floats = FloatAccountRepository::new(fx.db.clone());
    assert_eq!(floats.get(till.id).await.unwrap().current_balance, dec!(1000));
    assert_eq!(floats.get(power.id).await.unwrap().current_balance, dec!(50));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_card_issuance_draws_from_batch() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(100)).await;
    let batches = BatchRepository::new(fx.db.clone());
    let batch = batches
        .create(NewCardBatch {
            branch_id: fx.branch_id,
            batch_code: "EZ-TEST-1".to_string(),
            quantity_received: 1,
            card_type: "standard".to_string(),
            unit_cost: dec!(8),
            received_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            notes: None,
        })
        .await
        .unwrap();
    let recorder = recorder(&fx);

    let request = RecordRequest {
        branch_id: fx.branch_id,
        module: TransactionModule::EZwich,
        amount: Decimal::ZERO,
        fee: dec!(15),
        reference: None,
        payment_float_id: Some(till.id),
        service_float_id: None,
        settle: true,
        notes: None,
        details: json!({
            "batch_id": batch.id,
            "card_number": "EZ-0001",
            "customer_name": "Ama Mensah",
        }),
        created_by: fx.user_id,
    };

    recorder.record(request.clone()).await.unwrap();
    assert_eq!(batches.get(batch.id).await.unwrap().quantity_issued, 1);

    let err = recorder.record(request).await.unwrap_err();
    assert!(matches!(err, RecorderError::Batch(BatchError::Exhausted(_))));
    let till_after = FloatAccountRepository::new(fx.db.clone())
        .get(till.id)
        .await
        .unwrap();
    assert_eq!(till_after.current_balance, dec!(115));
}

fn power_sale(
    fx: &Fixture,
    till: Uuid,
    power: Uuid,
    amount: Decimal,
    settle: bool,
) -> RecordRequest {
    RecordRequest {
        branch_id: fx.branch_id,
        module: TransactionModule::Power,
        amount,
        fee: Decimal::ZERO,
        reference: None,
        payment_float_id: Some(till),
        service_float_id: Some(power),
        settle,
        notes: None,
        details: json!({"meter_number": "0412345", "provider": "ECG"}),
        created_by: fx.user_id,
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_float_with_transaction_history_cannot_be_deleted() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(1000)).await;
    let settled = float(&fx, FloatAccountType::Power, Some("ECG"), dec!(500)).await;
    let waiting = float(&fx, FloatAccountType::Power, Some("NEDCo"), dec!(500)).await;
    let unused = float(&fx, FloatAccountType::Power, Some("VRA"), dec!(500)).await;
    let recorder = recorder(&fx);

    recorder
        .record(power_sale(&fx, till.id, settled.id, dec!(50), true))
        .await
        .unwrap();
    recorder
        .record(power_sale(&fx, till.id, waiting.id, dec!(50), false))
        .await
        .unwrap();

    let floats = FloatAccountRepository::new(fx.db.clone());
    for id in [till.id, settled.id, waiting.id] {
        let err = floats.delete(id, UserRole::Admin, true).await.unwrap_err();
        assert!(matches!(err, FloatError::HasTransactions { .. }), "{err:?}");
        assert!(floats.get(id).await.is_ok());
    }
    floats.delete(unused.id, UserRole::Admin, true).await.unwrap();
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_amount_beyond_four_decimals_moves_nothing() {
    let fx = setup().await;
    let till = float(&fx, FloatAccountType::CashInTill, None, dec!(1000)).await;
    let power = float(&fx, FloatAccountType::Power, Some("ECG"), dec!(500)).await;

    let err = recorder(&fx)
        .record(power_sale(&fx, till.id, power.id, dec!(10.00005), true))
        .await
        .unwrap_err();
    assert!(matches!(err, RecorderError::Validation(_)));
    assert_eq!(err.http_status_code(), 400);

    let floats = FloatAccountRepository::new(fx.db.clone());
    assert_eq!(floats.get(power.id).await.unwrap().current_balance, dec!(500));
    assert_eq!(floats.get(till.id).await.unwrap().current_balance, dec!(1000));
}
