//! Ranking and stats time windows.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ParseEnumError;

/// A ranking/stat time window.
///
/// The ranking window is anchored: day = today, week = the most recent
/// Monday, month = the first of the current month. Stats use rolling
/// windows instead (today / last 7 days / last 30 days). Both end at today,
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Anchored window start for rankings.
    pub fn ranking_start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => today,
            Period::Week => today - Duration::days(today.weekday().num_days_from_monday() as i64),
            Period::Month => today.with_day(1).unwrap_or(today),
        }
    }

    /// Rolling window start for per-salesperson stats.
    pub fn stats_start(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => today,
            Period::Week => today - Duration::days(7),
            Period::Month => today - Duration::days(30),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(ParseEnumError {
                kind: "period",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_window_is_today() {
        let today = date(2025, 6, 18);
        assert_eq!(Period::Day.ranking_start(today), today);
    }

    #[test]
    fn test_week_window_anchors_on_monday() {
        // 2025-06-18 is a Wednesday; the week started Monday the 16th.
        assert_eq!(Period::Week.ranking_start(date(2025, 6, 18)), date(2025, 6, 16));
        // A Monday anchors on itself.
        assert_eq!(Period::Week.ranking_start(date(2025, 6, 16)), date(2025, 6, 16));
        // A Sunday reaches back six days.
        assert_eq!(Period::Week.ranking_start(date(2025, 6, 22)), date(2025, 6, 16));
    }

    #[test]
    fn test_week_window_crosses_month_boundary() {
        // 2025-07-02 is a Wednesday; the week started Monday June 30th.
        assert_eq!(Period::Week.ranking_start(date(2025, 7, 2)), date(2025, 6, 30));
    }

    #[test]
    fn test_month_window_starts_on_first() {
        assert_eq!(Period::Month.ranking_start(date(2025, 6, 18)), date(2025, 6, 1));
    }

    #[test]
    fn test_stats_windows_roll() {
        let today = date(2025, 6, 18);
        assert_eq!(Period::Day.stats_start(today), today);
        assert_eq!(Period::Week.stats_start(today), date(2025, 6, 11));
        assert_eq!(Period::Month.stats_start(today), date(2025, 5, 19));
    }
}
