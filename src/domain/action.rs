//! Point-earning actions and the append-only point ledger.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// The fixed set of point-earning action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    LeadReached,
    InterviewScheduled,
    InterviewCompleted,
    Conversion,
    Sale,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::LeadReached => "lead_reached",
            ActionKind::InterviewScheduled => "interview_scheduled",
            ActionKind::InterviewCompleted => "interview_completed",
            ActionKind::Conversion => "conversion",
            ActionKind::Sale => "sale",
        }
    }
}

impl std::str::FromStr for ActionKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lead_reached" => Ok(ActionKind::LeadReached),
            "interview_scheduled" => Ok(ActionKind::InterviewScheduled),
            "interview_completed" => Ok(ActionKind::InterviewCompleted),
            "conversion" => Ok(ActionKind::Conversion),
            "sale" => Ok(ActionKind::Sale),
            other => Err(ParseEnumError {
                kind: "action kind",
                value: other.to_string(),
            }),
        }
    }
}

/// Optional context flags that drive scoring bonuses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionContext {
    /// The daily goal was already met when this action happened.
    pub daily_goal_met: bool,
    /// Interview scheduled and held on the same day.
    pub same_day: bool,
    /// The interview converted on the spot.
    pub converted: bool,
    /// Deal ticket value, for sales.
    pub ticket_value: f64,
}

/// One immutable entry of the point ledger.
#[derive(Debug, Clone, Serialize)]
pub struct PointEvent {
    pub id: i64,
    pub salesperson_id: i64,
    pub day: NaiveDate,
    pub points: i64,
    pub action_kind: ActionKind,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A ledger entry about to be appended.
#[derive(Debug, Clone)]
pub struct NewPointEvent {
    pub salesperson_id: i64,
    pub day: NaiveDate,
    pub points: i64,
    pub action_kind: ActionKind,
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_kind_round_trip() {
        for kind in [
            ActionKind::LeadReached,
            ActionKind::InterviewScheduled,
            ActionKind::InterviewCompleted,
            ActionKind::Conversion,
            ActionKind::Sale,
        ] {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_action_kind_rejects_unknown() {
        assert!("coffee_break".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_action_kind_serde_names() {
        let json = serde_json::to_string(&ActionKind::LeadReached).unwrap();
        assert_eq!(json, "\"lead_reached\"");
    }
}
