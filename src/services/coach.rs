//! The coaching assistant: motivational messages, action feedback,
//! performance alerts, ranking taunts, and nightly reports.
//!
//! Messages are written for WhatsApp in the team's language. LLM-backed
//! generators (motivation, alert) go through the [`TextGenerator`] seam;
//! the rest are plain templates. Every message is persisted to the
//! outbound log with `sent = false` for the dispatcher to pick up.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::config::GameRules;
use crate::domain::{ActionKind, MessageKind, Period};
use crate::engine::leveling::LevelChange;
use crate::interfaces::outbound::GenerationRequest;
use crate::interfaces::{GameStore, TextGenerator};

use super::gamification::GamificationService;
use super::{Result, ServiceError};

/// Alerts only fire below this share of the daily lead goal.
const ALERT_THRESHOLD_PERCENT: f64 = 70.0;

/// Coaching message generation.
pub struct CoachService {
    store: Arc<dyn GameStore>,
    generator: Arc<dyn TextGenerator>,
    gamification: GamificationService,
    rules: Arc<GameRules>,
}

impl CoachService {
    pub fn new(
        store: Arc<dyn GameStore>,
        generator: Arc<dyn TextGenerator>,
        gamification: GamificationService,
        rules: Arc<GameRules>,
    ) -> Self {
        Self {
            store,
            generator,
            gamification,
            rules,
        }
    }

    /// Morning motivation, generated by the LLM from today's standing.
    pub async fn morning_motivation(
        &self,
        salesperson_id: i64,
        today: NaiveDate,
    ) -> Result<String> {
        let stats = self
            .gamification
            .stats(salesperson_id, Period::Day, today)
            .await?;
        let sp = &stats.salesperson;
        let targets = &self.rules.daily_targets;

        let prompt = format!(
            "Você é o Coach Quest, um coach de vendas gamificado, enérgico e motivador.\n\n\
             VENDEDOR: {name}\n\
             NÍVEL: {level} ({xp} XP)\n\
             AVATAR: {avatar}\n\n\
             Gere uma mensagem de BOM DIA motivacional para WhatsApp que:\n\
             - Seja curta (máximo 4 linhas)\n\
             - Use emojis apropriados\n\
             - Mencione as metas do dia: {leads} leads, {interviews} entrevistas\n\
             - Seja enérgica e competitiva\n\
             - Termine com um call-to-action\n\n\
             Tom: Encorajador, direto, sem formalidade excessiva.",
            name = sp.name,
            level = sp.level,
            xp = sp.xp_total,
            avatar = sp.avatar,
            leads = targets.leads,
            interviews = targets.interviews,
        );

        let request = GenerationRequest::new(prompt)
            .with_temperature(0.9)
            .with_max_tokens(150);
        let message = self
            .generator
            .generate(&request)
            .await
            .map_err(ServiceError::Generator)?;

        self.store
            .insert_coach_message(salesperson_id, MessageKind::Motivation, &message)
            .await?;
        Ok(message)
    }

    /// Immediate feedback after an action. Pure template, so the
    /// record-action path never depends on the generator being up.
    pub async fn action_feedback(
        &self,
        salesperson_id: i64,
        kind: ActionKind,
        points: i64,
        level: &LevelChange,
    ) -> Result<String> {
        let mut message = match kind {
            ActionKind::LeadReached => {
                format!("⚡ +{points} XP! Lead registrado! Continue assim!")
            }
            ActionKind::InterviewScheduled => {
                format!("📅 +{points} XP! Entrevista agendada! Boa!")
            }
            ActionKind::InterviewCompleted => {
                format!("💥 +{points} XP! Entrevista realizada! Show!")
            }
            ActionKind::Conversion => format!("🎯 +{points} XP! CONVERSÃO! Você é fera!"),
            ActionKind::Sale => format!("🔥 +{points} XP! VENDA FECHADA! MONSTRUOSO!"),
        };

        if level.leveled_up {
            message.push_str(&format!(
                "\n\n🎊 LEVEL UP! Você alcançou o Nível {}!",
                level.level
            ));
        }

        self.store
            .insert_coach_message(salesperson_id, MessageKind::Praise, &message)
            .await?;
        Ok(message)
    }

    /// Afternoon performance alert. Returns `None` when the salesperson is
    /// at or above the alert threshold of the daily lead goal.
    pub async fn performance_alert(
        &self,
        salesperson_id: i64,
        today: NaiveDate,
    ) -> Result<Option<String>> {
        let stats = self
            .gamification
            .stats(salesperson_id, Period::Day, today)
            .await?;

        let goal = self.rules.daily_targets.leads;
        let percent = if goal > 0 {
            stats.leads as f64 / goal as f64 * 100.0
        } else {
            100.0
        };
        if percent >= ALERT_THRESHOLD_PERCENT {
            return Ok(None);
        }

        let prompt = format!(
            "Você é o Coach Quest, um coach de vendas gamificado.\n\n\
             VENDEDOR: {name}\n\
             LEADS HOJE: {leads}\n\
             META: {goal}\n\
             PERFORMANCE: {percent:.0}% da meta\n\n\
             Gere um ALERTA curto (máx 3 linhas) que:\n\
             - Seja direto mas encorajador\n\
             - Mencione a diferença para a meta\n\
             - Sugira ação imediata\n\
             - Use emoji adequado (⏰, ⚠️, etc)\n\n\
             Tom: Alerta mas não desmotivador.",
            name = stats.salesperson.name,
            leads = stats.leads,
        );

        let request = GenerationRequest::new(prompt)
            .with_temperature(0.7)
            .with_max_tokens(100);
        let message = self
            .generator
            .generate(&request)
            .await
            .map_err(ServiceError::Generator)?;

        self.store
            .insert_coach_message(salesperson_id, MessageKind::Alert, &message)
            .await?;

        info!(salesperson = salesperson_id, percent = percent, "performance alert generated");
        Ok(Some(message))
    }

    /// Competitive taunt from today's leaderboard. Needs at least two
    /// ranked salespeople and the target on the board.
    pub async fn ranking_taunt(
        &self,
        salesperson_id: i64,
        today: NaiveDate,
    ) -> Result<Option<String>> {
        let board = self.gamification.ranking(Period::Day, today).await?;
        if board.len() < 2 {
            return Ok(None);
        }

        let own = match board.iter().find(|e| e.salesperson_id == salesperson_id) {
            Some(entry) => entry,
            None => return Ok(None),
        };

        let message = if own.position == 1 {
            let gap = own.period_points - board[1].period_points;
            format!(
                "👑 Você está em #1 no ranking!\n\
                 Diferença: {gap} pontos do 2º lugar.\n\
                 Mantenha a liderança! 🔥"
            )
        } else {
            let leader = &board[0];
            let gap = leader.period_points - own.period_points;
            format!(
                "🏆 {leader} está em #1!\n\
                 Diferença: {gap} pontos.\n\
                 Você está em #{position}. Vai deixar? 😏",
                leader = leader.name,
                position = own.position,
            )
        };

        self.store
            .insert_coach_message(salesperson_id, MessageKind::Taunt, &message)
            .await?;
        Ok(Some(message))
    }

    /// End-of-day results report. Pure template.
    pub async fn nightly_report(&self, salesperson_id: i64, today: NaiveDate) -> Result<String> {
        let stats = self
            .gamification
            .stats(salesperson_id, Period::Day, today)
            .await?;
        let board = self.gamification.ranking(Period::Day, today).await?;
        let position = board
            .iter()
            .find(|e| e.salesperson_id == salesperson_id)
            .map(|e| e.position);

        let goal = self.rules.daily_targets.leads;
        let lead_percent = if goal > 0 {
            stats.leads as f64 / goal as f64 * 100.0
        } else {
            0.0
        };
        let lead_emoji = if lead_percent >= 100.0 {
            "✅"
        } else if lead_percent >= 70.0 {
            "⚠️"
        } else {
            "❌"
        };

        let mut message = format!("📊 *Resultado do dia, {}*\n\n", stats.salesperson.name);
        message.push_str(&format!(
            "{lead_emoji} {} leads ({lead_percent:.0}% da meta)\n",
            stats.leads
        ));

        if stats.interviews > 0 {
            message.push_str(&format!("✅ {} entrevistas realizadas\n", stats.interviews));
        }
        if stats.conversions > 0 {
            message.push_str(&format!(
                "✅ {} conversões (+{} XP)\n",
                stats.conversions,
                stats.conversions * self.rules.points.conversion
            ));
        }
        if stats.sales > 0 {
            message.push_str(&format!(
                "🔥 {} vendas (R$ {:.2})\n",
                stats.sales, stats.revenue
            ));
        }

        message.push_str(&format!("\n🎯 Total: +{} XP hoje\n", stats.points));
        if let Some(position) = position {
            message.push_str(&format!("Posição: #{position} no ranking\n"));
        }

        message.push_str(match position {
            Some(1) => "\n👑 Você é o líder! Mantenha o ritmo! 🚀",
            Some(2) => "\n🔥 Você está quase lá! Amanhã pode ser #1! 💪",
            _ => "\n💪 Amanhã você sobe no ranking! Bora! 🚀",
        });

        self.store
            .insert_coach_message(salesperson_id, MessageKind::Report, &message)
            .await?;
        Ok(message)
    }
}
