//! Repository layer for database operations.
//!
//! Repositories map rows to core types and apply core rules inside their
//! database transactions. Errors come back as the core module errors with
//! database failures folded into their `Database` variants.

pub mod batch;
pub mod float_account;
pub mod gl;
pub(crate) mod movement;
pub mod report;
pub mod transaction;
pub mod user;

pub use batch::BatchRepository;
pub use float_account::{FloatAccountRepository, FloatFilter};
pub use gl::{ChartCache, GlRepository, JournalFilter};
pub use report::ReportRepository;
pub use transaction::TransactionRepository;
pub use user::{BranchRepository, UserRepository};
