//! Coach text-generation (LLM) configuration.

use std::time::Duration;

use serde::Deserialize;

/// Configuration for the chat-completions text generator backing the coach.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CoachConfig {
    /// API base URL (OpenAI-compatible).
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Bounded retry attempts for transient failures.
    pub max_retries: usize,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl CoachConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
