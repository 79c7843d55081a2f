//! Game rule configuration: point values, bonus multipliers, the level
//! table, milestone badges, and daily targets.
//!
//! Loaded once at startup and passed by reference into the engines. The
//! defaults below are the canonical tables; deployments can override any of
//! them from `config.yaml`.

use serde::Deserialize;

use crate::domain::ActionKind;

/// Errors raised by rule validation at startup.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("level table is empty")]
    EmptyLevels,

    #[error("level table must start at XP 0, found {0}")]
    BadOrigin(i64),

    #[error("level {level}: xp_min {xp_min} > xp_max {xp_max}")]
    InvertedBounds { level: u32, xp_min: i64, xp_max: i64 },

    #[error("gap or overlap between level {prev} and level {next}")]
    Discontinuity { prev: u32, next: u32 },

    #[error("milestone badge references unknown level {0}")]
    UnknownMilestoneLevel(u32),
}

/// Per-action base point values and bonus multiplier rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PointRules {
    pub lead_reached: i64,
    pub interview_scheduled: i64,
    pub interview_completed: i64,
    pub conversion: i64,
    pub sale: i64,

    /// Multiplier when the daily goal was already met.
    pub daily_goal_bonus: f64,
    /// Multiplier when an interview was scheduled and held the same day.
    pub same_day_bonus: f64,
    /// Multiplier for an interview that converted on the spot.
    pub conversion_bonus: f64,
    /// Multiplier for sales above `high_ticket_threshold`.
    pub high_ticket_bonus: f64,
    pub high_ticket_threshold: f64,
    /// Added (not multiplied) to the multiplier per 1000 of ticket value.
    pub ticket_step_bonus: f64,
}

impl Default for PointRules {
    fn default() -> Self {
        Self {
            lead_reached: 2,
            interview_scheduled: 10,
            interview_completed: 15,
            conversion: 30,
            sale: 50,
            daily_goal_bonus: 1.5,
            same_day_bonus: 1.25,
            conversion_bonus: 1.5,
            high_ticket_bonus: 2.0,
            high_ticket_threshold: 5000.0,
            ticket_step_bonus: 0.2,
        }
    }
}

impl PointRules {
    /// Base point value for a single action of the given kind.
    pub fn base_value(&self, kind: ActionKind) -> i64 {
        match kind {
            ActionKind::LeadReached => self.lead_reached,
            ActionKind::InterviewScheduled => self.interview_scheduled,
            ActionKind::InterviewCompleted => self.interview_completed,
            ActionKind::Conversion => self.conversion,
            ActionKind::Sale => self.sale,
        }
    }
}

/// One entry of the level table. Bounds are inclusive on both ends.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelDefinition {
    pub level: u32,
    pub title: String,
    pub xp_min: i64,
    pub xp_max: i64,
}

/// Badge granted when a salesperson levels past a milestone.
#[derive(Debug, Clone, Deserialize)]
pub struct MilestoneBadge {
    pub level: u32,
    pub name: String,
    pub icon: String,
    pub description: String,
}

/// Default daily activity targets, used by missions seeding and the coach.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DailyTargets {
    pub leads: i64,
    pub interviews: i64,
    pub conversions: i64,
}

impl Default for DailyTargets {
    fn default() -> Self {
        Self {
            leads: 40,
            interviews: 3,
            conversions: 1,
        }
    }
}

/// The full immutable rule set.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub points: PointRules,
    pub levels: Vec<LevelDefinition>,
    pub milestones: Vec<MilestoneBadge>,
    pub daily_targets: DailyTargets,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            points: PointRules::default(),
            levels: default_levels(),
            milestones: default_milestones(),
            daily_targets: DailyTargets::default(),
        }
    }
}

impl GameRules {
    /// Check that the level table contiguously partitions the XP range and
    /// that milestones reference existing levels. Run once at startup.
    pub fn validate(&self) -> Result<(), RulesError> {
        let first = self.levels.first().ok_or(RulesError::EmptyLevels)?;
        if first.xp_min != 0 {
            return Err(RulesError::BadOrigin(first.xp_min));
        }

        for def in &self.levels {
            if def.xp_min > def.xp_max {
                return Err(RulesError::InvertedBounds {
                    level: def.level,
                    xp_min: def.xp_min,
                    xp_max: def.xp_max,
                });
            }
        }

        for pair in self.levels.windows(2) {
            if pair[1].xp_min != pair[0].xp_max + 1 {
                return Err(RulesError::Discontinuity {
                    prev: pair[0].level,
                    next: pair[1].level,
                });
            }
        }

        for milestone in &self.milestones {
            if !self.levels.iter().any(|l| l.level == milestone.level) {
                return Err(RulesError::UnknownMilestoneLevel(milestone.level));
            }
        }

        Ok(())
    }

    /// The table entry for a level number, if defined.
    pub fn level_definition(&self, level: u32) -> Option<&LevelDefinition> {
        self.levels.iter().find(|l| l.level == level)
    }
}

fn default_levels() -> Vec<LevelDefinition> {
    let table: &[(u32, &str, i64, i64)] = &[
        (1, "Prospector I", 0, 100),
        (2, "Prospector II", 101, 200),
        (3, "Prospector III", 201, 350),
        (4, "Prospector IV", 351, 500),
        (5, "Prospector V", 501, 700),
        (6, "Hunter I", 701, 900),
        (7, "Hunter II", 901, 1100),
        (8, "Hunter III", 1101, 1300),
        (9, "Hunter IV", 1301, 1500),
        (10, "Hunter V", 1501, 1800),
        (11, "Closer I", 1801, 2100),
        (12, "Closer II", 2101, 2400),
        (13, "Closer III", 2401, 2700),
        (14, "Closer IV", 2701, 3000),
        (15, "Closer V", 3001, 3400),
        (16, "Master I", 3401, 3800),
        (17, "Master II", 3801, 4200),
        (18, "Master III", 4201, 4600),
        (19, "Master IV", 4601, 5000),
        (20, "Master V", 5001, 6000),
        (21, "Legend I", 6001, 7500),
        (22, "Legend II", 7501, 9000),
        (23, "Legend III", 9001, 11000),
        (24, "Legend IV", 11001, 13500),
        // The last entry is open-ended: lookups clamp here for any higher XP.
        (25, "Legend V", 13501, 999999),
    ];

    table
        .iter()
        .map(|&(level, title, xp_min, xp_max)| LevelDefinition {
            level,
            title: title.to_string(),
            xp_min,
            xp_max,
        })
        .collect()
}

fn default_milestones() -> Vec<MilestoneBadge> {
    let table: &[(u32, &str, &str, &str)] = &[
        (5, "Prospector Completo", "🎖️", "Completou todos os níveis Prospector"),
        (10, "Hunter Completo", "🏹", "Completou todos os níveis Hunter"),
        (15, "Closer Completo", "🎯", "Completou todos os níveis Closer"),
        (20, "Master Completo", "👑", "Completou todos os níveis Master"),
    ];

    table
        .iter()
        .map(|&(level, name, icon, description)| MilestoneBadge {
            level,
            name: name.to_string(),
            icon: icon.to_string(),
            description: description.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_validate() {
        GameRules::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn test_default_table_has_25_levels() {
        let rules = GameRules::default();
        assert_eq!(rules.levels.len(), 25);
        assert_eq!(rules.levels[0].xp_min, 0);
        assert_eq!(rules.levels[24].title, "Legend V");
    }

    #[test]
    fn test_base_values() {
        let points = PointRules::default();
        assert_eq!(points.base_value(ActionKind::LeadReached), 2);
        assert_eq!(points.base_value(ActionKind::InterviewScheduled), 10);
        assert_eq!(points.base_value(ActionKind::InterviewCompleted), 15);
        assert_eq!(points.base_value(ActionKind::Conversion), 30);
        assert_eq!(points.base_value(ActionKind::Sale), 50);
    }

    #[test]
    fn test_validate_rejects_gap() {
        let mut rules = GameRules::default();
        rules.levels[1].xp_min = 150;
        assert!(matches!(
            rules.validate(),
            Err(RulesError::Discontinuity { prev: 1, next: 2 })
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_milestone() {
        let mut rules = GameRules::default();
        rules.milestones.push(MilestoneBadge {
            level: 99,
            name: "Ghost".to_string(),
            icon: "👻".to_string(),
            description: "unreachable".to_string(),
        });
        assert!(matches!(
            rules.validate(),
            Err(RulesError::UnknownMilestoneLevel(99))
        ));
    }
}
