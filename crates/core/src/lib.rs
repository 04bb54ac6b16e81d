//! Core business logic for the branch back office.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence and delivery are reached through async ports that the db and
//! api crates implement.
//!
//! # Modules
//!
//! - `float` - Float account rules, movements and threshold alerts
//! - `ledger` - Chart of accounts, posting rules and journal validation
//! - `recorder` - Domain transaction lifecycle over store/ledger/notifier ports
//! - `batch` - E-Zwich card batch inventory
//! - `reports` - Summary, daily/weekly, branch, float and trial balance rollups
//! - `notify` - Customer notification messages
//! - `auth` - Roles and password hashing
//! - `money` - Storable money precision

pub mod auth;
pub mod batch;
pub mod float;
pub mod ledger;
pub mod money;
pub mod notify;
pub mod recorder;
pub mod reports;
