//! Test doubles for the outbound interfaces.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::interfaces::outbound::{
    ClientError, GenerationRequest, MessageSender, Result, TextGenerator,
};

/// Text generator that replays scripted responses in order.
///
/// When the script runs dry it returns a fixed placeholder, so tests that
/// only care about side effects don't need to count generator calls.
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn push_response(&self, body: impl Into<String>) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(body.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(ClientError::Unavailable(message.into())));
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("prompts lock").clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.prompts
            .lock()
            .expect("prompts lock")
            .push(request.prompt.clone());
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Ok("scripted response".to_string()))
    }
}

/// Message sender that records deliveries instead of sending them.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, String)>>,
    fail_numbers: Mutex<Vec<String>>,
}

impl RecordingSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make deliveries to this phone number fail.
    pub fn fail_for(&self, phone: impl Into<String>) {
        self.fail_numbers
            .lock()
            .expect("fail lock")
            .push(phone.into());
    }

    /// Messages delivered so far as (phone, body) pairs.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, phone: &str, body: &str) -> Result<()> {
        if self
            .fail_numbers
            .lock()
            .expect("fail lock")
            .iter()
            .any(|p| p == phone)
        {
            return Err(ClientError::Unavailable(format!(
                "delivery to {phone} failed"
            )));
        }
        self.sent
            .lock()
            .expect("sent lock")
            .push((phone.to_string(), body.to_string()));
        Ok(())
    }
}
