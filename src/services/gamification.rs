//! The gamification rule engine's operation surface: recording actions,
//! rankings, rosters, and period stats.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::config::GameRules;
use crate::domain::{
    ActionContext, ActionKind, Badge, Mission, NewPointEvent, Period, Salesperson, TallyDelta,
};
use crate::engine::ranking::{assign_positions, RankEntry};
use crate::engine::scoring;
use crate::interfaces::store::{ActionOutcome, ActionRecord};
use crate::interfaces::GameStore;

use super::{Result, ServiceError};

/// A roster row with the current level's XP bounds.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub level: u32,
    pub level_title: String,
    pub xp_total: i64,
    pub xp_min: i64,
    pub xp_max: i64,
    pub avatar: String,
}

/// Identity subset used inside stats views.
#[derive(Debug, Clone, Serialize)]
pub struct SalespersonBrief {
    pub id: i64,
    pub name: String,
    pub level: u32,
    pub xp_total: i64,
    pub avatar: String,
}

impl From<&Salesperson> for SalespersonBrief {
    fn from(sp: &Salesperson) -> Self {
        Self {
            id: sp.id,
            name: sp.name.clone(),
            level: sp.level,
            xp_total: sp.xp_total,
            avatar: sp.avatar.clone(),
        }
    }
}

/// Aggregated stats for one salesperson over a period.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodStats {
    pub salesperson: SalespersonBrief,
    pub period: Period,
    pub leads: i64,
    pub interviews: i64,
    pub conversions: i64,
    pub sales: i64,
    pub revenue: f64,
    pub points: i64,
    pub active_missions: i64,
    pub badges: i64,
}

/// An active mission with its completion percentage.
#[derive(Debug, Clone, Serialize)]
pub struct MissionView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub kind: crate::domain::MissionKind,
    pub target: i64,
    pub progress: i64,
    pub percent: f64,
    pub reward_xp: i64,
}

impl From<&Mission> for MissionView {
    fn from(m: &Mission) -> Self {
        let percent = if m.target > 0 {
            m.progress as f64 / m.target as f64 * 100.0
        } else {
            0.0
        };
        Self {
            id: m.id,
            title: m.title.clone(),
            description: m.description.clone(),
            kind: m.kind,
            target: m.target,
            progress: m.progress,
            percent,
            reward_xp: m.reward_xp,
        }
    }
}

/// Full salesperson detail: month stats plus missions and badges.
#[derive(Debug, Clone, Serialize)]
pub struct SalespersonDetail {
    #[serde(flatten)]
    pub stats: PeriodStats,
    pub missions: Vec<MissionView>,
    pub badge_list: Vec<Badge>,
}

/// Platform-wide counters for today.
#[derive(Debug, Clone, Serialize)]
pub struct TeamOverview {
    pub total_salespeople: i64,
    pub today: TodayTotals,
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayTotals {
    pub leads: i64,
    pub interviews: i64,
    pub sales: i64,
    pub revenue: f64,
}

/// A request to record one action event.
#[derive(Debug, Clone)]
pub struct RecordAction {
    pub salesperson_id: i64,
    pub kind: ActionKind,
    pub quantity: u32,
    pub context: ActionContext,
}

/// Gamification operations over the store and the rule tables.
#[derive(Clone)]
pub struct GamificationService {
    store: Arc<dyn GameStore>,
    rules: Arc<GameRules>,
}

impl GamificationService {
    pub fn new(store: Arc<dyn GameStore>, rules: Arc<GameRules>) -> Self {
        Self { store, rules }
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// All active salespeople with their level bounds.
    pub async fn roster(&self) -> Result<Vec<RosterEntry>> {
        let people = self.store.active_salespeople().await?;
        Ok(people
            .into_iter()
            .map(|sp| {
                let (level_title, xp_min, xp_max) = match self.rules.level_definition(sp.level) {
                    Some(def) => (def.title.clone(), def.xp_min, def.xp_max),
                    None => ("Unknown".to_string(), 0, 0),
                };
                RosterEntry {
                    id: sp.id,
                    name: sp.name,
                    phone: sp.phone,
                    level: sp.level,
                    level_title,
                    xp_total: sp.xp_total,
                    xp_min,
                    xp_max,
                    avatar: sp.avatar,
                }
            })
            .collect())
    }

    /// Score an action, append it to the ledger, and apply every
    /// downstream effect in one transaction.
    pub async fn record_action(
        &self,
        request: &RecordAction,
        today: NaiveDate,
    ) -> Result<ActionOutcome> {
        if request.quantity == 0 {
            return Err(ServiceError::InvalidInput(
                "quantity must be at least 1".to_string(),
            ));
        }

        // Existence check up front so a bad id reads as NotFound, not as a
        // failed write.
        self.store.salesperson(request.salesperson_id).await?;

        let points = scoring::compute_points(
            &self.rules.points,
            request.kind,
            request.quantity,
            &request.context,
        );
        let quantity = i64::from(request.quantity);

        let record = ActionRecord {
            event: NewPointEvent {
                salesperson_id: request.salesperson_id,
                day: today,
                points,
                action_kind: request.kind,
                detail: Some(format!("{}x {}", request.quantity, request.kind.as_str())),
            },
            quantity,
            tally: TallyDelta::from_action(request.kind, quantity, &request.context, points),
        };

        let outcome = self.store.record_action(&record).await?;

        info!(
            salesperson = request.salesperson_id,
            kind = request.kind.as_str(),
            points = outcome.points_awarded,
            level = outcome.level.level,
            leveled_up = outcome.level.leveled_up,
            missions_completed = outcome.completed_missions.len(),
            "action recorded"
        );

        Ok(outcome)
    }

    /// The leaderboard for a period ending today.
    pub async fn ranking(&self, period: Period, today: NaiveDate) -> Result<Vec<RankEntry>> {
        let from = period.ranking_start(today);
        let scores = self.store.period_scores(from, today).await?;
        Ok(assign_positions(scores))
    }

    /// Aggregated stats for one salesperson over a rolling period.
    pub async fn stats(
        &self,
        salesperson_id: i64,
        period: Period,
        today: NaiveDate,
    ) -> Result<PeriodStats> {
        let sp = self.store.salesperson(salesperson_id).await?;
        let from = period.stats_start(today);

        let sums = self.store.tally_sums(salesperson_id, from, today).await?;
        let points = self
            .store
            .points_in_window(salesperson_id, from, today)
            .await?;
        let active_missions = self.store.active_mission_count(salesperson_id).await?;
        let badges = self.store.badge_count(salesperson_id).await?;

        Ok(PeriodStats {
            salesperson: SalespersonBrief::from(&sp),
            period,
            leads: sums.leads,
            interviews: sums.interviews,
            conversions: sums.conversions,
            sales: sums.sales,
            revenue: sums.revenue,
            points,
            active_missions,
            badges,
        })
    }

    /// Month stats plus the active missions and earned badges.
    pub async fn detail(&self, salesperson_id: i64, today: NaiveDate) -> Result<SalespersonDetail> {
        let stats = self.stats(salesperson_id, Period::Month, today).await?;
        let missions = self.store.active_missions(salesperson_id).await?;
        let badge_list = self.store.badges(salesperson_id).await?;

        Ok(SalespersonDetail {
            stats,
            missions: missions.iter().map(MissionView::from).collect(),
            badge_list,
        })
    }

    /// Platform totals for today.
    pub async fn team_overview(&self, today: NaiveDate) -> Result<TeamOverview> {
        let totals = self.store.team_totals(today).await?;
        Ok(TeamOverview {
            total_salespeople: totals.salespeople,
            today: TodayTotals {
                leads: totals.leads,
                interviews: totals.interviews,
                sales: totals.sales,
                revenue: totals.revenue,
            },
        })
    }
}
