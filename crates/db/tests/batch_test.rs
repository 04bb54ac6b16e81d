//! Integration tests for the card batch repository.

mod common;

use backoffice_core::batch::{BatchError, CardBatchPatch, NewCardBatch};
use backoffice_db::BatchRepository;
use chrono::NaiveDate;
use rust_decimal_macros::dec;

use common::setup;

fn new_batch(branch_id: uuid::Uuid, code: &str, quantity: i32) -> NewCardBatch {
    NewCardBatch {
        branch_id,
        batch_code: code.to_string(),
        quantity_received: quantity,
        card_type: "standard".to_string(),
        unit_cost: dec!(8.50),
        received_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        notes: None,
    }
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_quantity_cannot_drop_below_issued() {
    let fx = setup().await;
    let repo = BatchRepository::new(fx.db.clone());
    let batch = repo.create(new_batch(fx.branch_id, "B-100", 3)).await.unwrap();
    repo.issue_card(batch.id).await.unwrap();
    repo.issue_card(batch.id).await.unwrap();

    let err = repo
        .update(
            batch.id,
            &CardBatchPatch {
                quantity_received: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot reduce quantity below issued cards (2)");
    assert_eq!(err.http_status_code(), 400);

    let updated = repo
        .update(
            batch.id,
            &CardBatchPatch {
                quantity_received: Some(2),
                notes: Some("recount".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.quantity_received, 2);
    assert_eq!(updated.quantity_available(), 0);
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_issue_card_stops_when_exhausted() {
    let fx = setup().await;
    let repo = BatchRepository::new(fx.db.clone());
    let batch = repo.create(new_batch(fx.branch_id, "B-200", 1)).await.unwrap();

    repo.issue_card(batch.id).await.unwrap();
    let err = repo.issue_card(batch.id).await.unwrap_err();
    assert!(matches!(err, BatchError::Exhausted(_)));
    assert_eq!(err.to_string(), "No cards available in batch");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_refuses_issued_batches() {
    let fx = setup().await;
    let repo = BatchRepository::new(fx.db.clone());
    let used = repo.create(new_batch(fx.branch_id, "B-300", 5)).await.unwrap();
    let unused = repo.create(new_batch(fx.branch_id, "B-301", 5)).await.unwrap();
    repo.issue_card(used.id).await.unwrap();

    assert!(matches!(
        repo.delete(used.id).await.unwrap_err(),
        BatchError::HasIssuedCards(1)
    ));
    repo.delete(unused.id).await.unwrap();
    assert!(matches!(
        repo.get(unused.id).await.unwrap_err(),
        BatchError::NotFound(_)
    ));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_duplicate_code_in_branch_rejected() {
    let fx = setup().await;
    let repo = BatchRepository::new(fx.db.clone());
    repo.create(new_batch(fx.branch_id, "B-400", 5)).await.unwrap();
    let err = repo
        .create(new_batch(fx.branch_id, "B-400", 5))
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::Duplicate(_)));
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_rejected_rename_leaves_quantity_unchanged() {
    let fx = setup().await;
    let repo = BatchRepository::new(fx.db.clone());
    let batch = repo.create(new_batch(fx.branch_id, "B-500", 10)).await.unwrap();
    repo.create(new_batch(fx.branch_id, "B-501", 10)).await.unwrap();

    let err = repo
        .update(
            batch.id,
            &CardBatchPatch {
                batch_code: Some("B-501".to_string()),
                quantity_received: Some(99),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, BatchError::Duplicate(_)));

    let reloaded = repo.get(batch.id).await.unwrap();
    assert_eq!(reloaded.batch_code, "B-500");
    assert_eq!(reloaded.quantity_received, 10);
}
