//! Double-entry general ledger posting.
//!
//! This module turns business events into balanced journals:
//! - Chart of accounts seed and expense category mapping
//! - Posting rules per business event
//! - Account resolution and balance enforcement
//! - Balance deltas for cached GL account balances
//! - Reversal journals that mirror an original posting

pub mod balance;
pub mod chart;
pub mod error;
pub mod rules;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use balance::{BalanceDelta, balance_deltas};
pub use chart::{ChartEntry, ExpenseCategory, SEED_CHART};
pub use error::LedgerError;
pub use rules::{LedgerEvent, PostingRules};
pub use service::LedgerService;
pub use types::{
    EntrySide, GlAccount, GlAccountType, GlTransaction, JournalDraft, JournalLine,
    JournalStatus, JournalTotals, LineSpec, PostingContext, ResolvedJournal,
};
