//! Read-side report rollups.
//!
//! The db crate runs the SUM/COUNT/GROUP BY queries; this module shapes
//! their rows into reports:
//! - Module summary and branch comparison
//! - Daily series with gap filling, ISO-week rollup
//! - Float position with threshold states
//! - Trial balance from cached GL balances

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
