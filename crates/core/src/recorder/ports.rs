//! Ports the recorder drives. The db crate implements the store and the
//! ledger; the api crate implements the notifier.

use async_trait::async_trait;
use backoffice_shared::types::PageRequest;
use uuid::Uuid;

use super::error::RecorderError;
use super::types::{
    DomainTransaction, PlannedMovement, RecordPlan, Revision, TransactionFilter,
    TransactionPatch, TransactionStatus,
};
use crate::float::{BalanceChange, FloatAccount};
use crate::ledger::{JournalDraft, LedgerError, PostingContext};

/// Persistence for domain transactions.
///
/// Every write is atomic: the row change, its float movements and any
/// card consumption commit together or not at all.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Fetches a transaction.
    async fn find(&self, id: Uuid) -> Result<Option<DomainTransaction>, RecorderError>;

    /// Fetches a float snapshot.
    async fn load_float(&self, id: Uuid) -> Result<Option<FloatAccount>, RecorderError>;

    /// Inserts a transaction and applies its movements.
    async fn insert(
        &self,
        plan: RecordPlan,
    ) -> Result<(DomainTransaction, Vec<BalanceChange>), RecorderError>;

    /// Moves a transaction to `to` and applies `movements`.
    ///
    /// Fails with `Conflict` unless the stored row still matches `expected`
    /// (same status, not edited since it was read).
    async fn transition(
        &self,
        expected: Revision,
        to: TransactionStatus,
        movements: &[PlannedMovement],
    ) -> Result<(DomainTransaction, Vec<BalanceChange>), RecorderError>;

    /// Applies an edit, conditional on the revision that was read.
    async fn update(
        &self,
        expected: Revision,
        patch: &TransactionPatch,
    ) -> Result<DomainTransaction, RecorderError>;

    /// Stores the journal a transaction was posted as.
    async fn link_journal(&self, id: Uuid, gl_transaction_id: Uuid) -> Result<(), RecorderError>;

    /// Lists transactions, newest first, with the total match count.
    async fn list(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<(Vec<DomainTransaction>, u64), RecorderError>;
}

/// General ledger posting.
#[async_trait]
pub trait LedgerPort: Send + Sync {
    /// Resolves, validates and inserts a journal; returns its ID.
    async fn post(&self, draft: JournalDraft) -> Result<Uuid, LedgerError>;

    /// Posts the mirror of an existing journal; returns the new journal's ID.
    async fn reverse(
        &self,
        gl_transaction_id: Uuid,
        context: PostingContext,
    ) -> Result<Uuid, LedgerError>;
}
