//! Quest-style missions with a numeric target and progress counter.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ActionKind, ParseEnumError};

/// Mission cadence/grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionKind {
    Daily,
    Weekly,
    SideQuest,
    Collective,
}

impl MissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionKind::Daily => "daily",
            MissionKind::Weekly => "weekly",
            MissionKind::SideQuest => "side_quest",
            MissionKind::Collective => "collective",
        }
    }
}

impl std::str::FromStr for MissionKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(MissionKind::Daily),
            "weekly" => Ok(MissionKind::Weekly),
            "side_quest" => Ok(MissionKind::SideQuest),
            "collective" => Ok(MissionKind::Collective),
            other => Err(ParseEnumError {
                kind: "mission kind",
                value: other.to_string(),
            }),
        }
    }
}

/// Which action kind advances a mission.
///
/// Missions without a category (free-form side quests) are never advanced
/// automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionCategory {
    Leads,
    Interviews,
    Sales,
}

impl MissionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionCategory::Leads => "leads",
            MissionCategory::Interviews => "interviews",
            MissionCategory::Sales => "sales",
        }
    }

    /// The category an action kind feeds, if any.
    pub fn for_action(kind: ActionKind) -> Option<Self> {
        match kind {
            ActionKind::LeadReached => Some(MissionCategory::Leads),
            ActionKind::InterviewCompleted => Some(MissionCategory::Interviews),
            ActionKind::Sale => Some(MissionCategory::Sales),
            ActionKind::InterviewScheduled | ActionKind::Conversion => None,
        }
    }
}

impl std::str::FromStr for MissionCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "leads" => Ok(MissionCategory::Leads),
            "interviews" => Ok(MissionCategory::Interviews),
            "sales" => Ok(MissionCategory::Sales),
            other => Err(ParseEnumError {
                kind: "mission category",
                value: other.to_string(),
            }),
        }
    }
}

/// Mission lifecycle. Active → Completed is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Active,
    Completed,
    Expired,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Active => "active",
            MissionStatus::Completed => "completed",
            MissionStatus::Expired => "expired",
        }
    }
}

impl std::str::FromStr for MissionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MissionStatus::Active),
            "completed" => Ok(MissionStatus::Completed),
            "expired" => Ok(MissionStatus::Expired),
            other => Err(ParseEnumError {
                kind: "mission status",
                value: other.to_string(),
            }),
        }
    }
}

/// A goal assigned to one salesperson.
#[derive(Debug, Clone, Serialize)]
pub struct Mission {
    pub id: i64,
    pub salesperson_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: MissionKind,
    pub category: Option<MissionCategory>,
    pub target: i64,
    pub progress: i64,
    pub reward_xp: i64,
    pub status: MissionStatus,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

/// A mission about to be assigned.
#[derive(Debug, Clone)]
pub struct NewMission {
    pub salesperson_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: MissionKind,
    pub category: Option<MissionCategory>,
    pub target: i64,
    pub progress: i64,
    pub reward_xp: i64,
    pub starts_on: NaiveDate,
    pub ends_on: Option<NaiveDate>,
}

/// A mission that transitioned to completed during a record-action call.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedMission {
    pub id: i64,
    pub title: String,
    pub reward_xp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_routing() {
        assert_eq!(
            MissionCategory::for_action(ActionKind::LeadReached),
            Some(MissionCategory::Leads)
        );
        assert_eq!(
            MissionCategory::for_action(ActionKind::InterviewCompleted),
            Some(MissionCategory::Interviews)
        );
        assert_eq!(
            MissionCategory::for_action(ActionKind::Sale),
            Some(MissionCategory::Sales)
        );
        assert_eq!(MissionCategory::for_action(ActionKind::Conversion), None);
        assert_eq!(
            MissionCategory::for_action(ActionKind::InterviewScheduled),
            None
        );
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            MissionStatus::Active,
            MissionStatus::Completed,
            MissionStatus::Expired,
        ] {
            assert_eq!(status.as_str().parse::<MissionStatus>().unwrap(), status);
        }
    }
}
