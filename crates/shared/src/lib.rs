//! Shared types, errors, and configuration for the back office.
//!
//! This crate provides common building blocks used across all other crates:
//! - Application-wide error type with HTTP mapping
//! - Configuration loading
//! - JWT claims and token verification
//! - Outbound messaging transports (SMTP email, HTTP SMS)
//! - Pagination types for list endpoints

pub mod auth;
pub mod config;
pub mod email;
pub mod error;
pub mod jwt;
pub mod sms;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, EmailConfig, SmsConfig};
pub use email::{EmailError, EmailService};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use sms::{SmsClient, SmsError};
