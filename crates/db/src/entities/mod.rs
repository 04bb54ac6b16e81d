//! `SeaORM` entity definitions.
//!
//! Enumerated columns (float type, status, role, module) are stored as
//! text with CHECK constraints and converted at the repository boundary
//! with the core types' `parse`/`as_str`.

pub mod prelude;

pub mod branches;
pub mod card_batches;
pub mod domain_transactions;
pub mod float_accounts;
pub mod float_movements;
pub mod gl_accounts;
pub mod gl_journal_lines;
pub mod gl_transactions;
pub mod users;
