//! Entity re-exports.

pub use super::branches::Entity as Branches;
pub use super::card_batches::Entity as CardBatches;
pub use super::domain_transactions::Entity as DomainTransactions;
pub use super::float_accounts::Entity as FloatAccounts;
pub use super::float_movements::Entity as FloatMovements;
pub use super::gl_accounts::Entity as GlAccounts;
pub use super::gl_journal_lines::Entity as GlJournalLines;
pub use super::gl_transactions::Entity as GlTransactions;
pub use super::users::Entity as Users;
