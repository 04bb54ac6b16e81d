//! Branch float accounts.
//!
//! A float is the balance a branch holds for one payment rail. Everything
//! here is pure: the db crate loads a snapshot, asks this module whether a
//! change is allowed, and then applies it with a guarded SQL update.

pub mod error;
pub mod service;
pub mod types;

pub use error::FloatError;
pub use service::FloatService;
pub use types::{
    BalanceChange, FloatAccount, FloatAccountPatch, FloatAccountType, FloatAlert,
    NewFloatAccount, ThresholdState,
};
