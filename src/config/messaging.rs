//! Outbound messaging gateway configuration (Evolution API).

use std::time::Duration;

use serde::Deserialize;

/// WhatsApp gateway configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagingConfig {
    /// Gateway base URL, e.g. `https://evolution.example.com`.
    pub base_url: String,
    /// API key sent in the `apikey` header.
    pub api_key: String,
    /// Gateway instance name, part of the send path.
    pub instance: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Bounded retry attempts for transient delivery failures.
    pub max_retries: usize,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            instance: String::new(),
            timeout_secs: 10,
            max_retries: 3,
        }
    }
}

impl MessagingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
