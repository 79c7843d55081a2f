//! Outbound integration interfaces: LLM text generation and message
//! delivery.

use async_trait::async_trait;

/// Result type for outbound client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from outbound HTTP integrations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// A single-turn text generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Optional system message steering the generator.
    pub system: Option<String>,
    /// The user prompt.
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: 300,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Interface for natural-language text generation.
///
/// Implementations:
/// - `OpenAiGenerator`: chat-completions API client
/// - `ScriptedGenerator`: canned responses for tests
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Interface for outbound message delivery.
///
/// Implementations:
/// - `EvolutionSender`: WhatsApp via an Evolution API gateway
/// - `RecordingSender`: in-memory capture for tests
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver a text message to a phone number (DDI-prefixed digits).
    ///
    /// Must apply a bounded timeout and report failure rather than block.
    async fn send_text(&self, phone: &str, body: &str) -> Result<()>;
}
