//! WhatsApp delivery via an Evolution API gateway.
//!
//! Sends text messages with `POST {base_url}/message/sendText/{instance}`
//! and the gateway's `apikey` header. Delivery applies a bounded timeout
//! and a bounded retry for transient failures; it reports failure instead
//! of blocking.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::MessagingConfig;
use crate::interfaces::outbound::{ClientError, MessageSender, Result};

/// Evolution API send-text payload.
#[derive(Debug, Serialize)]
struct SendTextRequest<'a> {
    number: &'a str,
    text: &'a str,
}

/// WhatsApp gateway client.
pub struct EvolutionSender {
    client: Client,
    config: MessagingConfig,
}

impl EvolutionSender {
    /// Create a new gateway client. The base URL and instance must be
    /// configured.
    pub fn new(config: MessagingConfig) -> Result<Self> {
        if config.base_url.is_empty() {
            return Err(ClientError::Config(
                "messaging gateway base_url not configured".to_string(),
            ));
        }
        if config.instance.is_empty() {
            return Err(ClientError::Config(
                "messaging gateway instance not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { client, config })
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.config.max_retries)
            .with_jitter()
    }

    fn is_retryable(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    fn is_retryable_status(status: reqwest::StatusCode) -> bool {
        status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    async fn post_text(&self, phone: &str, body: &str) -> Result<()> {
        let url = format!(
            "{}/message/sendText/{}",
            self.config.base_url, self.config.instance
        );

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.config.api_key)
            .json(&SendTextRequest {
                number: phone,
                text: body,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(phone = %phone, "WhatsApp message delivered");
            Ok(())
        } else {
            let text = response.text().await.unwrap_or_default();
            let snippet: String = text.chars().take(200).collect();
            if Self::is_retryable_status(status) {
                warn!(status = %status, body = %snippet, "gateway returned retryable status");
                Err(ClientError::Unavailable(format!("HTTP {status} - {snippet}")))
            } else {
                Err(ClientError::UnexpectedResponse(format!(
                    "HTTP {status} - {snippet}"
                )))
            }
        }
    }
}

#[async_trait]
impl MessageSender for EvolutionSender {
    async fn send_text(&self, phone: &str, body: &str) -> Result<()> {
        (|| async { self.post_text(phone, body).await })
            .retry(self.backoff())
            .when(|e| {
                matches!(e, ClientError::Http(err) if Self::is_retryable(err))
                    || matches!(e, ClientError::Unavailable(_))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_base_url_fails() {
        let result = EvolutionSender::new(MessagingConfig::default());
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn test_missing_instance_fails() {
        let config = MessagingConfig {
            base_url: "https://gateway.example.com".to_string(),
            ..MessagingConfig::default()
        };
        assert!(matches!(
            EvolutionSender::new(config),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_retryable_status_codes() {
        use reqwest::StatusCode;

        assert!(EvolutionSender::is_retryable_status(
            StatusCode::TOO_MANY_REQUESTS
        ));
        assert!(EvolutionSender::is_retryable_status(
            StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert!(EvolutionSender::is_retryable_status(StatusCode::BAD_GATEWAY));

        assert!(!EvolutionSender::is_retryable_status(StatusCode::BAD_REQUEST));
        assert!(!EvolutionSender::is_retryable_status(StatusCode::UNAUTHORIZED));
        assert!(!EvolutionSender::is_retryable_status(StatusCode::NOT_FOUND));
    }
}
