//! XP-to-level derivation and milestone badge selection.

use serde::Serialize;

use crate::config::{GameRules, LevelDefinition, MilestoneBadge};

/// The outcome of re-deriving a salesperson's level after an XP change.
#[derive(Debug, Clone, Serialize)]
pub struct LevelChange {
    pub level: u32,
    pub title: String,
    pub leveled_up: bool,
}

/// The level definition containing `xp`.
///
/// XP past the end of the table clamps to the last entry, so the table's
/// final level is effectively unbounded above.
pub fn level_for_xp(levels: &[LevelDefinition], xp: i64) -> &LevelDefinition {
    levels
        .iter()
        .find(|def| def.xp_min <= xp && xp <= def.xp_max)
        .unwrap_or_else(|| &levels[levels.len() - 1])
}

/// Derive the level for the new XP total and report whether it increased.
pub fn apply_xp_delta(rules: &GameRules, prior_level: u32, new_total: i64) -> LevelChange {
    let def = level_for_xp(&rules.levels, new_total);
    LevelChange {
        level: def.level,
        title: def.title.clone(),
        leveled_up: def.level > prior_level,
    }
}

/// Milestone badges earned by moving from `prior_level` to `new_level`.
///
/// Every milestone in `(prior_level, new_level]` counts, so a single large
/// XP grant that jumps past a milestone still earns its badge. Grants are
/// idempotent downstream; re-deriving the same crossing twice is harmless.
pub fn crossed_milestones<'a>(
    rules: &'a GameRules,
    prior_level: u32,
    new_level: u32,
) -> Vec<&'a MilestoneBadge> {
    rules
        .milestones
        .iter()
        .filter(|m| m.level > prior_level && m.level <= new_level)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> GameRules {
        GameRules::default()
    }

    #[test]
    fn test_level_bounds_contain_xp_for_every_total() {
        let rules = rules();
        for xp in (0..20_000).step_by(7) {
            let def = level_for_xp(&rules.levels, xp);
            if def.level < 25 {
                assert!(
                    def.xp_min <= xp && xp <= def.xp_max,
                    "xp {} outside bounds of level {}",
                    xp,
                    def.level
                );
            }
        }
    }

    #[test]
    fn test_boundary_totals() {
        let rules = rules();
        assert_eq!(level_for_xp(&rules.levels, 0).level, 1);
        assert_eq!(level_for_xp(&rules.levels, 100).level, 1);
        assert_eq!(level_for_xp(&rules.levels, 101).level, 2);
        assert_eq!(level_for_xp(&rules.levels, 1501).level, 10);
        assert_eq!(level_for_xp(&rules.levels, 1800).level, 10);
        assert_eq!(level_for_xp(&rules.levels, 1801).level, 11);
    }

    #[test]
    fn test_xp_past_table_clamps_to_last_level() {
        let rules = rules();
        assert_eq!(level_for_xp(&rules.levels, 10_000_000).level, 25);
    }

    #[test]
    fn test_apply_xp_delta_reports_level_up() {
        let rules = rules();
        let change = apply_xp_delta(&rules, 1, 150);
        assert_eq!(change.level, 2);
        assert_eq!(change.title, "Prospector II");
        assert!(change.leveled_up);

        let unchanged = apply_xp_delta(&rules, 2, 180);
        assert_eq!(unchanged.level, 2);
        assert!(!unchanged.leveled_up);
    }

    #[test]
    fn test_milestone_crossing_level_10() {
        let rules = rules();
        let badges = crossed_milestones(&rules, 9, 10);
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].name, "Hunter Completo");
    }

    #[test]
    fn test_milestone_jump_past_level_10() {
        let rules = rules();
        let badges = crossed_milestones(&rules, 9, 11);
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].name, "Hunter Completo");
    }

    #[test]
    fn test_milestone_multi_crossing() {
        let rules = rules();
        let names: Vec<_> = crossed_milestones(&rules, 4, 15)
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Prospector Completo", "Hunter Completo", "Closer Completo"]
        );
    }

    #[test]
    fn test_no_milestone_without_crossing() {
        let rules = rules();
        assert!(crossed_milestones(&rules, 10, 10).is_empty());
        assert!(crossed_milestones(&rules, 5, 6).is_empty());
    }
}
