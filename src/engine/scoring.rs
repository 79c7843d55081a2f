//! Point computation for a single action event.

use crate::config::PointRules;
use crate::domain::{ActionContext, ActionKind};

/// Compute the points awarded for `quantity` actions of `kind`.
///
/// Base points are the per-kind base value times the quantity. Bonuses
/// compose multiplicatively in a fixed order, except the per-1000 ticket
/// bonus, which is *added* to the accumulated multiplier — that additive
/// layering is intentional and load-bearing for the published point values.
/// The final product truncates toward zero.
pub fn compute_points(
    rules: &PointRules,
    kind: ActionKind,
    quantity: u32,
    context: &ActionContext,
) -> i64 {
    let base = rules.base_value(kind) * quantity as i64;
    let mut multiplier = 1.0f64;

    if context.daily_goal_met {
        multiplier *= rules.daily_goal_bonus;
    }
    if context.same_day {
        multiplier *= rules.same_day_bonus;
    }
    if kind == ActionKind::InterviewCompleted && context.converted {
        multiplier *= rules.conversion_bonus;
    }
    if kind == ActionKind::Sale {
        if context.ticket_value > rules.high_ticket_threshold {
            multiplier *= rules.high_ticket_bonus;
        }
        multiplier += (context.ticket_value / 1000.0).floor() * rules.ticket_step_bonus;
    }

    (base as f64 * multiplier).trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> PointRules {
        PointRules::default()
    }

    #[test]
    fn test_no_context_is_base_times_quantity() {
        let ctx = ActionContext::default();
        assert_eq!(compute_points(&rules(), ActionKind::LeadReached, 1, &ctx), 2);
        assert_eq!(compute_points(&rules(), ActionKind::LeadReached, 7, &ctx), 14);
        assert_eq!(
            compute_points(&rules(), ActionKind::InterviewScheduled, 3, &ctx),
            30
        );
        assert_eq!(
            compute_points(&rules(), ActionKind::InterviewCompleted, 2, &ctx),
            30
        );
        assert_eq!(compute_points(&rules(), ActionKind::Conversion, 1, &ctx), 30);
        assert_eq!(compute_points(&rules(), ActionKind::Sale, 1, &ctx), 50);
    }

    #[test]
    fn test_high_ticket_sale_layers_additive_bonus() {
        // ticket 6000: x2.0 for ticket > 5000, then + 6 * 0.2 = 3.2 total.
        let ctx = ActionContext {
            ticket_value: 6000.0,
            ..ActionContext::default()
        };
        assert_eq!(compute_points(&rules(), ActionKind::Sale, 1, &ctx), 160);
    }

    #[test]
    fn test_ticket_at_threshold_gets_only_step_bonus() {
        // Exactly 5000 does not trigger the high-ticket doubling.
        let ctx = ActionContext {
            ticket_value: 5000.0,
            ..ActionContext::default()
        };
        // multiplier = 1.0 + 5 * 0.2 = 2.0
        assert_eq!(compute_points(&rules(), ActionKind::Sale, 1, &ctx), 100);
    }

    #[test]
    fn test_ticket_bonus_ignored_for_other_kinds() {
        let ctx = ActionContext {
            ticket_value: 9000.0,
            ..ActionContext::default()
        };
        assert_eq!(compute_points(&rules(), ActionKind::Conversion, 1, &ctx), 30);
    }

    #[test]
    fn test_daily_goal_and_same_day_compose() {
        let ctx = ActionContext {
            daily_goal_met: true,
            same_day: true,
            ..ActionContext::default()
        };
        // 10 * 1.5 * 1.25 = 18.75 -> 18
        assert_eq!(
            compute_points(&rules(), ActionKind::InterviewScheduled, 1, &ctx),
            18
        );
    }

    #[test]
    fn test_converted_interview_bonus() {
        let ctx = ActionContext {
            converted: true,
            ..ActionContext::default()
        };
        // 15 * 1.5 = 22.5 -> 22
        assert_eq!(
            compute_points(&rules(), ActionKind::InterviewCompleted, 1, &ctx),
            22
        );
        // The converted flag means nothing for other kinds.
        assert_eq!(compute_points(&rules(), ActionKind::Conversion, 1, &ctx), 30);
    }

    #[test]
    fn test_truncates_toward_zero() {
        let ctx = ActionContext {
            daily_goal_met: true,
            same_day: true,
            ..ActionContext::default()
        };
        // 2 * 1.875 = 3.75 -> 3, never 4.
        assert_eq!(compute_points(&rules(), ActionKind::LeadReached, 1, &ctx), 3);
    }
}
