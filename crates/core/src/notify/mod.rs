//! Customer notifications for recorded transactions.
//!
//! Messages are plain text built here; delivery goes through the
//! [`Notifier`] port, which the api crate backs with SMTP and an SMS
//! gateway. Delivery failures never affect the transaction.

mod messages;

pub use messages::{Contact, NotificationEvent, build_notifications};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// Text message.
    Sms,
    /// Email.
    Email,
}

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Delivery channel.
    pub channel: Channel,
    /// Phone number or email address.
    pub recipient: String,
    /// Email subject; ignored for SMS.
    pub subject: String,
    /// Message body.
    pub body: String,
}

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The channel is not configured.
    #[error("{0:?} notifications are disabled")]
    Disabled(Channel),
    /// The transport rejected the message.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Outbound notification port.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Delivers one notification.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier that drops everything, for deployments without messaging.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Disabled(notification.channel))
    }
}
