//! Achievement badges. Append-only, unique per (salesperson, name).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// Badge rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }
}

impl std::str::FromStr for Rarity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "common" => Ok(Rarity::Common),
            "rare" => Ok(Rarity::Rare),
            "epic" => Ok(Rarity::Epic),
            "legendary" => Ok(Rarity::Legendary),
            other => Err(ParseEnumError {
                kind: "rarity",
                value: other.to_string(),
            }),
        }
    }
}

/// A granted achievement.
#[derive(Debug, Clone, Serialize)]
pub struct Badge {
    pub id: i64,
    pub salesperson_id: i64,
    pub name: String,
    pub icon: String,
    pub description: Option<String>,
    pub rarity: Rarity,
    pub awarded_at: DateTime<Utc>,
}

/// A badge grant. Granting an already-held badge is a no-op.
#[derive(Debug, Clone)]
pub struct NewBadge {
    pub salesperson_id: i64,
    pub name: String,
    pub icon: String,
    pub description: Option<String>,
    pub rarity: Rarity,
}
