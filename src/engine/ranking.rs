//! Leaderboard assembly from period point aggregates.

use serde::Serialize;

use crate::domain::Salesperson;

/// A salesperson's point total within a ranking window.
#[derive(Debug, Clone)]
pub struct PeriodScore {
    pub salesperson: Salesperson,
    pub points: i64,
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct RankEntry {
    pub position: u32,
    pub salesperson_id: i64,
    pub name: String,
    pub avatar: String,
    pub level: u32,
    pub xp_total: i64,
    pub period_points: i64,
}

/// Sort period scores and assign 1-based positions.
///
/// Order: points descending, then salesperson id ascending. The id
/// tie-break makes the ordering a deterministic total order; re-running
/// over the same ledger state always yields the same board. Salespeople
/// with no events in the window are expected to be absent from `scores`.
pub fn assign_positions(mut scores: Vec<PeriodScore>) -> Vec<RankEntry> {
    scores.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(a.salesperson.id.cmp(&b.salesperson.id))
    });

    scores
        .into_iter()
        .enumerate()
        .map(|(idx, score)| RankEntry {
            position: idx as u32 + 1,
            salesperson_id: score.salesperson.id,
            name: score.salesperson.name,
            avatar: score.salesperson.avatar,
            level: score.salesperson.level,
            xp_total: score.salesperson.xp_total,
            period_points: score.points,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn salesperson(id: i64, name: &str) -> Salesperson {
        Salesperson {
            id,
            name: name.to_string(),
            phone: format!("55119999{:04}", id),
            email: None,
            level: 3,
            xp_total: 250,
            avatar: "🎯".to_string(),
            joined_on: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            active: true,
        }
    }

    fn score(id: i64, points: i64) -> PeriodScore {
        PeriodScore {
            salesperson: salesperson(id, &format!("Rep {id}")),
            points,
        }
    }

    #[test]
    fn test_sorts_descending_with_positions() {
        let board = assign_positions(vec![score(1, 150), score(2, 300), score(3, 150)]);
        assert_eq!(board.len(), 3);
        assert_eq!(
            board
                .iter()
                .map(|e| (e.position, e.salesperson_id, e.period_points))
                .collect::<Vec<_>>(),
            vec![(1, 2, 300), (2, 1, 150), (3, 3, 150)]
        );
    }

    #[test]
    fn test_tie_break_is_id_ascending() {
        let board = assign_positions(vec![score(9, 100), score(4, 100), score(7, 100)]);
        assert_eq!(
            board.iter().map(|e| e.salesperson_id).collect::<Vec<_>>(),
            vec![4, 7, 9]
        );
    }

    #[test]
    fn test_empty_scores_empty_board() {
        assert!(assign_positions(vec![]).is_empty());
    }
}
