//! Route handlers. Thin JSON glue over the services.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::{ActionContext, ActionKind, Channel, NewConversation, Period};
use crate::engine::ranking::RankEntry;
use crate::interfaces::store::ActionOutcome;
use crate::services::analysis::AnalysisSummary;
use crate::services::dispatch::FlushSummary;
use crate::services::gamification::{
    RecordAction, RosterEntry, SalespersonDetail, PeriodStats, TeamOverview,
};

use super::error::ApiError;
use super::AppState;

/// The server's notion of "today", from the local clock.
fn today() -> NaiveDate {
    Local::now().date_naive()
}

// Health.

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "online",
        service: "questline",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// Salespeople.

pub async fn list_salespeople(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RosterEntry>>, ApiError> {
    Ok(Json(state.gamification.roster().await?))
}

pub async fn salesperson_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<SalespersonDetail>, ApiError> {
    Ok(Json(state.gamification.detail(id, today()).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    period: Option<Period>,
}

pub async fn salesperson_stats(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<PeriodStats>, ApiError> {
    let period = query.period.unwrap_or(Period::Month);
    Ok(Json(state.gamification.stats(id, period, today()).await?))
}

// Ranking.

#[derive(Debug, Deserialize)]
pub struct RankingQuery {
    period: Option<Period>,
}

#[derive(Debug, Serialize)]
pub struct RankingResponse {
    period: Period,
    ranking: Vec<RankEntry>,
}

pub async fn ranking(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RankingQuery>,
) -> Result<Json<RankingResponse>, ApiError> {
    let period = query.period.unwrap_or(Period::Day);
    let ranking = state.gamification.ranking(period, today()).await?;
    Ok(Json(RankingResponse { period, ranking }))
}

// Actions.

#[derive(Debug, Deserialize)]
pub struct RecordActionBody {
    salesperson_id: Option<i64>,
    action_kind: Option<ActionKind>,
    quantity: Option<u32>,
    #[serde(default)]
    context: ActionContext,
}

#[derive(Debug, Serialize)]
pub struct RecordActionResponse {
    #[serde(flatten)]
    outcome: ActionOutcome,
    coach_message: Option<String>,
}

pub async fn record_action(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecordActionBody>,
) -> Result<Json<RecordActionResponse>, ApiError> {
    let salesperson_id = body
        .salesperson_id
        .ok_or_else(|| ApiError::bad_request("salesperson_id is required"))?;
    let kind = body
        .action_kind
        .ok_or_else(|| ApiError::bad_request("action_kind is required"))?;

    let request = RecordAction {
        salesperson_id,
        kind,
        quantity: body.quantity.unwrap_or(1),
        context: body.context,
    };
    let outcome = state.gamification.record_action(&request, today()).await?;

    // The ledger write is already committed; a coaching hiccup must not
    // turn it into an error response.
    let coach_message = match state
        .coach
        .action_feedback(salesperson_id, kind, outcome.points_awarded, &outcome.level)
        .await
    {
        Ok(message) => Some(message),
        Err(err) => {
            warn!(salesperson = salesperson_id, error = %err, "coach feedback failed");
            None
        }
    };

    Ok(Json(RecordActionResponse {
        outcome,
        coach_message,
    }))
}

// Team stats.

pub async fn team_overview(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TeamOverview>, ApiError> {
    Ok(Json(state.gamification.team_overview(today()).await?))
}

// Coach.

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: Option<String>,
}

pub async fn coach_motivation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state.coach.morning_motivation(id, today()).await?;
    Ok(Json(MessageResponse {
        message: Some(message),
    }))
}

pub async fn coach_alert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state.coach.performance_alert(id, today()).await?;
    Ok(Json(MessageResponse { message }))
}

pub async fn coach_taunt(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state.coach.ranking_taunt(id, today()).await?;
    Ok(Json(MessageResponse { message }))
}

pub async fn coach_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let message = state.coach.nightly_report(id, today()).await?;
    Ok(Json(MessageResponse {
        message: Some(message),
    }))
}

// Messaging.

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    salesperson_id: Option<i64>,
    message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    delivered: bool,
}

pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SendMessageBody>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let salesperson_id = body
        .salesperson_id
        .ok_or_else(|| ApiError::bad_request("salesperson_id is required"))?;
    let message = body
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("message is required"))?;

    state.dispatch.send_to(salesperson_id, &message).await?;
    Ok(Json(SendMessageResponse { delivered: true }))
}

pub async fn flush_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<FlushSummary>, ApiError> {
    Ok(Json(state.dispatch.flush_pending().await?))
}

// Conversations.

#[derive(Debug, Deserialize)]
pub struct AnalyzeConversationBody {
    salesperson_id: Option<i64>,
    transcript: Option<String>,
    customer_name: Option<String>,
    customer_phone: Option<String>,
    channel: Option<Channel>,
    duration_secs: Option<i64>,
    happened_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeConversationResponse {
    id: i64,
    analyzed: bool,
    overall_score: f64,
    outcome: String,
}

pub async fn analyze_conversation(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeConversationBody>,
) -> Result<Json<AnalyzeConversationResponse>, ApiError> {
    let salesperson_id = body
        .salesperson_id
        .ok_or_else(|| ApiError::bad_request("salesperson_id is required"))?;
    let transcript = body
        .transcript
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("transcript is required"))?;

    let conversation = state
        .analysis
        .analyze_and_store(NewConversation {
            salesperson_id,
            customer_name: body.customer_name,
            customer_phone: body.customer_phone,
            channel: body.channel.unwrap_or(Channel::Whatsapp),
            transcript,
            duration_secs: body.duration_secs,
            happened_at: body.happened_at.unwrap_or_else(Utc::now),
        })
        .await?;

    Ok(Json(AnalyzeConversationResponse {
        id: conversation.id,
        analyzed: conversation.analyzed,
        overall_score: conversation.analysis.overall_score,
        outcome: conversation.analysis.outcome,
    }))
}

pub async fn conversation_summary(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<AnalysisSummary>, ApiError> {
    Ok(Json(state.analysis.summary(id).await?))
}
