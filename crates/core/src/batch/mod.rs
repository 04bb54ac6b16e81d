//! E-Zwich card batch inventory.

pub mod error;
pub mod service;
pub mod types;

pub use error::BatchError;
pub use service::BatchService;
pub use types::{CardBatch, CardBatchPatch, NewCardBatch};
