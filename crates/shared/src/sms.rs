//! HTTP SMS gateway client.

use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::SmsConfig;

/// SMS gateway errors.
#[derive(Debug, Error)]
pub enum SmsError {
    /// SMS delivery is switched off in configuration.
    #[error("SMS delivery is disabled")]
    Disabled,
    /// Recipient number is empty or malformed.
    #[error("Invalid phone number: {0}")]
    InvalidNumber(String),
    /// Transport-level failure.
    #[error("SMS request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Gateway answered with a non-success status.
    #[error("SMS gateway returned status {0}")]
    Gateway(u16),
}

#[derive(Debug, Serialize)]
struct SendSmsRequest<'a> {
    sender: &'a str,
    recipient: &'a str,
    message: &'a str,
}

/// Posts messages to the configured SMS gateway.
#[derive(Clone)]
pub struct SmsClient {
    http: Client,
    config: SmsConfig,
}

impl SmsClient {
    /// Creates a new client.
    #[must_use]
    pub fn new(config: SmsConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    /// Whether outbound SMS is configured.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Sends a single text message.
    ///
    /// # Errors
    ///
    /// Returns `SmsError::Disabled` when SMS is switched off, `InvalidNumber`
    /// for an unusable recipient, or a transport/gateway error.
    pub async fn send(&self, recipient: &str, message: &str) -> Result<(), SmsError> {
        if !self.config.enabled {
            return Err(SmsError::Disabled);
        }
        let recipient = normalize_number(recipient)?;

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&SendSmsRequest {
                sender: &self.config.sender_id,
                recipient: &recipient,
                message,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "SMS gateway rejected message");
            return Err(SmsError::Gateway(status.as_u16()));
        }
        debug!(recipient = %recipient, "SMS accepted by gateway");
        Ok(())
    }
}

/// Strips spaces and dashes and checks the result is a plausible number.
///
/// # Errors
///
/// Returns `SmsError::InvalidNumber` if the cleaned number is not 9-15 digits
/// with an optional leading `+`.
pub fn normalize_number(raw: &str) -> Result<String, SmsError> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);

    if (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()) {
        Ok(cleaned)
    } else {
        Err(SmsError::InvalidNumber(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0241234567", "0241234567")]
    #[case("+233 24 123 4567", "+233241234567")]
    #[case("024-123-4567", "0241234567")]
    fn test_normalize_accepts(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_number(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("12345")]
    #[case("024abc4567")]
    fn test_normalize_rejects(#[case] raw: &str) {
        assert!(matches!(
            normalize_number(raw),
            Err(SmsError::InvalidNumber(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_client_does_not_send() {
        let client = SmsClient::new(SmsConfig::default());
        assert!(matches!(
            client.send("0241234567", "hello").await,
            Err(SmsError::Disabled)
        ));
    }
}
