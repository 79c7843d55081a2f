//! Outbound HTTP clients for the external collaborators.

pub mod evolution;
pub mod mock;
pub mod openai;

pub use evolution::EvolutionSender;
pub use openai::OpenAiGenerator;

use async_trait::async_trait;

use crate::interfaces::outbound::{ClientError, MessageSender, Result};

/// Sender used when no gateway is configured. Every delivery reports a
/// configuration error instead of silently dropping the message.
pub struct DisabledSender;

#[async_trait]
impl MessageSender for DisabledSender {
    async fn send_text(&self, _phone: &str, _body: &str) -> Result<()> {
        Err(ClientError::Config(
            "messaging gateway not configured".to_string(),
        ))
    }
}
