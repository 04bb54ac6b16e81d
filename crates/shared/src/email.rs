//! SMTP transport for transaction notifications.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor, message::header::ContentType,
    transport::smtp::authentication::Credentials,
};
use thiserror::Error;
use tracing::debug;

use crate::config::EmailConfig;

/// Email service errors.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Email delivery is switched off in configuration.
    #[error("Email delivery is disabled")]
    Disabled,
    /// Failed to build email message.
    #[error("Failed to build email: {0}")]
    BuildError(String),
    /// Failed to send email.
    #[error("Failed to send email: {0}")]
    SendError(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Sends plain-text mail through the configured SMTP relay.
#[derive(Clone)]
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    /// Creates a new email service.
    #[must_use]
    pub const fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Whether outbound email is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
            &self.config.smtp_host,
        )
        .port(self.config.smtp_port);

        if !self.config.smtp_username.is_empty() {
            builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
                .map_err(|e| EmailError::SendError(e.to_string()))?
                .port(self.config.smtp_port)
                .credentials(Credentials::new(
                    self.config.smtp_username.clone(),
                    self.config.smtp_password.clone(),
                ));
        }

        Ok(builder.build())
    }

    /// Builds the message without sending it.
    ///
    /// # Errors
    ///
    /// Returns an error if either address is malformed.
    pub fn build_message(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<Message, EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        Message::builder()
            .from(
                from.parse()
                    .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::InvalidAddress(format!("{e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| EmailError::BuildError(e.to_string()))
    }

    /// Sends a plain-text email.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Disabled` when email is switched off, otherwise
    /// any build or transport failure.
    pub async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), EmailError> {
        if !self.config.enabled {
            return Err(EmailError::Disabled);
        }

        let email = self.build_message(to_email, subject, body)?;
        self.transport()?
            .send(email)
            .await
            .map_err(|e| EmailError::SendError(e.to_string()))?;

        debug!(to = to_email, "email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(enabled: bool) -> EmailService {
        EmailService::new(EmailConfig {
            enabled,
            from_email: "noreply@backoffice.local".to_string(),
            from_name: "Back Office".to_string(),
            ..EmailConfig::default()
        })
    }

    #[test]
    fn test_email_config_default() {
        let config = EmailConfig::default();
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
        assert!(!config.enabled);
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let result = service(true).build_message("not an address", "Hi", "body");
        assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
    }

    #[test]
    fn test_build_message_ok() {
        assert!(
            service(true)
                .build_message("ama@example.com", "Receipt", "Paid")
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_disabled_service_does_not_send() {
        let result = service(false)
            .send_email("ama@example.com", "Receipt", "Paid")
            .await;
        assert!(matches!(result, Err(EmailError::Disabled)));
    }
}
