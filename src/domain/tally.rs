//! Per-day activity counters, one row per salesperson per day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::{ActionContext, ActionKind};

/// Daily activity counters. Upserted as actions are recorded.
#[derive(Debug, Clone, Serialize)]
pub struct DailyTally {
    pub id: i64,
    pub salesperson_id: i64,
    pub day: NaiveDate,
    pub leads: i64,
    pub interviews_scheduled: i64,
    pub interviews_completed: i64,
    pub conversions: i64,
    pub sales: i64,
    pub avg_ticket: f64,
    pub revenue: f64,
    pub points: i64,
    pub created_at: DateTime<Utc>,
}

/// Increments to fold into a day's tally.
#[derive(Debug, Clone, Copy, Default)]
pub struct TallyDelta {
    pub leads: i64,
    pub interviews_scheduled: i64,
    pub interviews_completed: i64,
    pub conversions: i64,
    pub sales: i64,
    pub revenue: f64,
    pub points: i64,
}

impl TallyDelta {
    /// The tally increments produced by recording one action.
    pub fn from_action(
        kind: ActionKind,
        quantity: i64,
        context: &ActionContext,
        points: i64,
    ) -> Self {
        let mut delta = TallyDelta {
            points,
            ..TallyDelta::default()
        };
        match kind {
            ActionKind::LeadReached => delta.leads = quantity,
            ActionKind::InterviewScheduled => delta.interviews_scheduled = quantity,
            ActionKind::InterviewCompleted => delta.interviews_completed = quantity,
            ActionKind::Conversion => delta.conversions = quantity,
            ActionKind::Sale => {
                delta.sales = quantity;
                delta.revenue = context.ticket_value * quantity as f64;
            }
        }
        delta
    }
}

/// Period sums over tallies, for stats views.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TallySums {
    pub leads: i64,
    pub interviews: i64,
    pub conversions: i64,
    pub sales: i64,
    pub revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_for_sale_carries_revenue() {
        let context = ActionContext {
            ticket_value: 4500.0,
            ..ActionContext::default()
        };
        let delta = TallyDelta::from_action(ActionKind::Sale, 2, &context, 200);
        assert_eq!(delta.sales, 2);
        assert_eq!(delta.revenue, 9000.0);
        assert_eq!(delta.points, 200);
        assert_eq!(delta.leads, 0);
    }

    #[test]
    fn test_delta_for_leads() {
        let delta =
            TallyDelta::from_action(ActionKind::LeadReached, 5, &ActionContext::default(), 10);
        assert_eq!(delta.leads, 5);
        assert_eq!(delta.revenue, 0.0);
    }
}
