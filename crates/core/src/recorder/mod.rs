//! Domain transaction recording and lifecycle.
//!
//! The recorder validates a transaction, plans its float movements, has
//! the store write row and movements atomically, then posts to the ledger
//! and notifies the customer. Ledger and notification steps are guarded
//! independently: their failures are logged and reported in the outcome
//! but never undo the business transaction.

pub mod details;
pub mod error;
pub mod plan;
pub mod ports;
pub mod service;
pub mod status;
pub mod types;

#[cfg(test)]
mod status_props;

pub use details::TransactionDetails;
pub use error::RecorderError;
pub use plan::{Amounts, LoadedFloats, MovementPlanner};
pub use ports::{LedgerPort, TransactionStore};
pub use service::TransactionRecorder;
pub use status::{FloatEffect, GlEffect, StatusService, StatusTransition, TransitionAction};
pub use types::{
    DomainTransaction, NewTransaction, NotificationOutcome, PlannedMovement, PostingOutcome,
    RecordOutcome, RecordPlan, RecordRequest, Revision, TransactionFilter, TransactionModule,
    TransactionPatch, TransactionStatus,
};
