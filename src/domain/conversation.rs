//! Analyzed sales conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Where the conversation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Whatsapp,
    Call,
    Email,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Whatsapp => "whatsapp",
            Channel::Call => "call",
            Channel::Email => "email",
        }
    }
}

impl std::str::FromStr for Channel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "whatsapp" => Ok(Channel::Whatsapp),
            "call" => Ok(Channel::Call),
            "email" => Ok(Channel::Email),
            other => Err(ParseEnumError {
                kind: "channel",
                value: other.to_string(),
            }),
        }
    }
}

/// Scores and findings produced by analyzing a transcript.
///
/// Scores are on a 0–10 scale; `overall_score` is the aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationAnalysis {
    pub stage_score: f64,
    pub quality_score: f64,
    pub objection_score: f64,
    pub outcome_score: f64,
    pub overall_score: f64,
    pub stages_met: Vec<String>,
    pub improvements: Vec<String>,
    pub outcome: String,
    pub summary: Option<String>,
}

impl ConversationAnalysis {
    /// Neutral analysis used when the generator call or parse fails.
    pub fn fallback(reason: &str) -> Self {
        Self {
            stage_score: 5.0,
            quality_score: 5.0,
            objection_score: 5.0,
            outcome_score: 5.0,
            overall_score: 5.0,
            stages_met: Vec::new(),
            improvements: vec![reason.to_string()],
            outcome: "unscored".to_string(),
            summary: None,
        }
    }
}

/// A stored, analyzed conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    pub id: i64,
    pub salesperson_id: i64,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub channel: Channel,
    pub transcript: String,
    pub duration_secs: Option<i64>,
    pub happened_at: DateTime<Utc>,
    pub analysis: ConversationAnalysis,
    pub analyzed: bool,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A conversation submitted for analysis.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub salesperson_id: i64,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub channel: Channel,
    pub transcript: String,
    pub duration_secs: Option<i64>,
    pub happened_at: DateTime<Utc>,
}
