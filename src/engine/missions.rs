//! Mission progress application.

use crate::domain::{ActionKind, Mission, MissionCategory, MissionStatus};

/// The new state of one mission after progress was applied.
#[derive(Debug, Clone)]
pub struct MissionAdvance {
    pub mission_id: i64,
    pub title: String,
    pub progress: i64,
    pub completed: bool,
    pub reward_xp: i64,
}

/// Apply `quantity` progress of an action to the given active missions.
///
/// `missions` must already be filtered to the salesperson's active missions
/// in the category this action feeds (see
/// [`MissionCategory::for_action`]); actions without a category advance
/// nothing. Completion triggers at progress >= target and is one-way: a
/// completed mission leaves the active set, so its reward is paid exactly
/// once.
pub fn apply_progress(missions: &[Mission], quantity: i64) -> Vec<MissionAdvance> {
    missions
        .iter()
        .filter(|m| m.status == MissionStatus::Active)
        .map(|m| {
            let progress = m.progress + quantity;
            MissionAdvance {
                mission_id: m.id,
                title: m.title.clone(),
                progress,
                completed: progress >= m.target,
                reward_xp: m.reward_xp,
            }
        })
        .collect()
}

/// Whether an action kind can advance missions at all.
pub fn advances_missions(kind: ActionKind) -> bool {
    MissionCategory::for_action(kind).is_some()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use crate::domain::MissionKind;

    use super::*;

    fn mission(id: i64, target: i64, progress: i64, status: MissionStatus) -> Mission {
        Mission {
            id,
            salesperson_id: 1,
            title: format!("Mission {id}"),
            description: None,
            kind: MissionKind::Daily,
            category: Some(MissionCategory::Leads),
            target,
            progress,
            reward_xp: 50,
            status,
            starts_on: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            ends_on: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_progress_accumulates_without_completion() {
        let advances = apply_progress(&[mission(1, 40, 10, MissionStatus::Active)], 5);
        assert_eq!(advances.len(), 1);
        assert_eq!(advances[0].progress, 15);
        assert!(!advances[0].completed);
    }

    #[test]
    fn test_overshoot_completes_once() {
        // target 40, progress 38, quantity 5 -> 43, completed.
        let advances = apply_progress(&[mission(1, 40, 38, MissionStatus::Active)], 5);
        assert_eq!(advances[0].progress, 43);
        assert!(advances[0].completed);
    }

    #[test]
    fn test_exact_target_completes() {
        let advances = apply_progress(&[mission(1, 3, 2, MissionStatus::Active)], 1);
        assert!(advances[0].completed);
    }

    #[test]
    fn test_completed_missions_are_skipped() {
        let advances = apply_progress(&[mission(1, 40, 43, MissionStatus::Completed)], 5);
        assert!(advances.is_empty());
    }

    #[test]
    fn test_action_kinds_that_advance() {
        assert!(advances_missions(ActionKind::LeadReached));
        assert!(advances_missions(ActionKind::InterviewCompleted));
        assert!(advances_missions(ActionKind::Sale));
        assert!(!advances_missions(ActionKind::InterviewScheduled));
        assert!(!advances_missions(ActionKind::Conversion));
    }
}
