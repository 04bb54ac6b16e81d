//! Notification delivery over the configured SMTP relay and SMS gateway.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use backoffice_core::notify::{Channel, Notification, Notifier, NotifyError};
use backoffice_shared::{EmailError, EmailService, SmsClient, SmsError};

/// [`Notifier`] backed by [`EmailService`] and [`SmsClient`].
#[derive(Clone)]
pub struct ChannelNotifier {
    email: Arc<EmailService>,
    sms: Arc<SmsClient>,
}

impl ChannelNotifier {
    /// Creates a notifier over both transports.
    #[must_use]
    pub const fn new(email: Arc<EmailService>, sms: Arc<SmsClient>) -> Self {
        Self { email, sms }
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        match notification.channel {
            Channel::Email => self
                .email
                .send_email(
                    &notification.recipient,
                    &notification.subject,
                    &notification.body,
                )
                .await
                .map_err(|e| match e {
                    EmailError::Disabled => NotifyError::Disabled(Channel::Email),
                    other => NotifyError::Delivery(other.to_string()),
                }),
            Channel::Sms => self
                .sms
                .send(&notification.recipient, &notification.body)
                .await
                .map_err(|e| match e {
                    SmsError::Disabled => NotifyError::Disabled(Channel::Sms),
                    other => NotifyError::Delivery(other.to_string()),
                }),
        }?;

        debug!(channel = ?notification.channel, "notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_shared::{EmailConfig, SmsConfig};

    fn disabled() -> ChannelNotifier {
        ChannelNotifier::new(
            Arc::new(EmailService::new(EmailConfig::default())),
            Arc::new(SmsClient::new(SmsConfig::default())),
        )
    }

    #[tokio::test]
    async fn test_disabled_channels_report_disabled() {
        let notifier = disabled();
        for channel in [Channel::Sms, Channel::Email] {
            let err = notifier
                .send(&Notification {
                    channel,
                    recipient: "0241234567".to_string(),
                    subject: "MoMo transaction completed".to_string(),
                    body: "ok".to_string(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, NotifyError::Disabled(c) if c == channel));
        }
    }
}
