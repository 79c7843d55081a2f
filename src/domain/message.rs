//! Outbound coach messages, logged before delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// What kind of coaching message this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Motivation,
    Alert,
    Praise,
    Taunt,
    Report,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Motivation => "motivation",
            MessageKind::Alert => "alert",
            MessageKind::Praise => "praise",
            MessageKind::Taunt => "taunt",
            MessageKind::Report => "report",
        }
    }
}

impl std::str::FromStr for MessageKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "motivation" => Ok(MessageKind::Motivation),
            "alert" => Ok(MessageKind::Alert),
            "praise" => Ok(MessageKind::Praise),
            "taunt" => Ok(MessageKind::Taunt),
            "report" => Ok(MessageKind::Report),
            other => Err(ParseEnumError {
                kind: "message kind",
                value: other.to_string(),
            }),
        }
    }
}

/// A generated coaching message and its delivery state.
#[derive(Debug, Clone, Serialize)]
pub struct CoachMessage {
    pub id: i64,
    pub salesperson_id: i64,
    pub body: String,
    pub kind: MessageKind,
    pub sent: bool,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
