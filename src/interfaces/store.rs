//! Persistent storage interface.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    Badge, CoachMessage, CompletedMission, Conversation, ConversationAnalysis, DailyTally,
    MessageKind, Mission, NewBadge, NewConversation, NewMission, NewPointEvent, NewSalesperson,
    PointEvent, Salesperson, TallyDelta, TallySums,
};
use crate::engine::leveling::LevelChange;
use crate::engine::ranking::PeriodScore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("write conflict persisted after {attempts} attempts")]
    Conflict { attempts: usize },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid date in row: {0}")]
    InvalidDate(String),

    #[error("invalid value in row: {0}")]
    InvalidValue(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }
}

/// Input of the transactional record-action sequence.
///
/// Points are computed by the scoring engine before this call; the store
/// applies them to the ledger, XP, level, missions, and the daily tally in
/// one transaction.
#[derive(Debug, Clone)]
pub struct ActionRecord {
    pub event: NewPointEvent,
    /// How many actions of the event's kind happened; advances missions.
    pub quantity: i64,
    /// Counter increments for the day's tally row.
    pub tally: TallyDelta,
}

/// What the record-action transaction did.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub points_awarded: i64,
    pub xp_total: i64,
    pub level: LevelChange,
    pub completed_missions: Vec<CompletedMission>,
}

/// Team-wide counters for a single day.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TeamTotals {
    pub salespeople: i64,
    pub leads: i64,
    pub interviews: i64,
    pub sales: i64,
    pub revenue: f64,
}

/// Interface for the relational game store.
///
/// Implementations must give each call a consistent snapshot and make
/// `record_action` atomic: two concurrent calls for the same salesperson
/// may serialize or conflict, but never lose an XP update.
#[async_trait]
pub trait GameStore: Send + Sync {
    // Roster.

    async fn insert_salesperson(&self, new: &NewSalesperson) -> Result<Salesperson>;

    /// Fetch one salesperson. `NotFound` if the id is unknown.
    async fn salesperson(&self, id: i64) -> Result<Salesperson>;

    async fn active_salespeople(&self) -> Result<Vec<Salesperson>>;

    // Ledger and the record-action transaction.

    /// Run the full record sequence atomically: append the ledger event,
    /// increment XP, advance matching missions (paying their rewards),
    /// re-derive the level, grant crossed milestone badges, and upsert the
    /// daily tally.
    async fn record_action(&self, record: &ActionRecord) -> Result<ActionOutcome>;

    /// Append a raw ledger entry without side effects (seeding).
    async fn insert_point_event(&self, event: &NewPointEvent) -> Result<()>;

    /// Ledger entries for one salesperson, oldest first.
    async fn point_events(&self, salesperson_id: i64) -> Result<Vec<PointEvent>>;

    /// Summed ledger points per salesperson over `[from, to]`, for
    /// salespeople with at least one event in the window.
    async fn period_scores(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<PeriodScore>>;

    /// Summed ledger points for one salesperson over `[from, to]`.
    async fn points_in_window(
        &self,
        salesperson_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64>;

    // Daily tallies.

    /// Fold a delta into the tally row for `(salesperson, day)`, creating
    /// it if absent (seeding; `record_action` upserts internally).
    async fn upsert_tally(
        &self,
        salesperson_id: i64,
        day: NaiveDate,
        delta: &TallyDelta,
    ) -> Result<()>;

    async fn tally_for_day(
        &self,
        salesperson_id: i64,
        day: NaiveDate,
    ) -> Result<Option<DailyTally>>;

    /// Tally sums for one salesperson over `[from, to]`.
    async fn tally_sums(
        &self,
        salesperson_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<TallySums>;

    /// Team-wide tally totals for a single day.
    async fn team_totals(&self, day: NaiveDate) -> Result<TeamTotals>;

    // Missions.

    async fn insert_mission(&self, new: &NewMission) -> Result<Mission>;

    async fn active_missions(&self, salesperson_id: i64) -> Result<Vec<Mission>>;

    async fn active_mission_count(&self, salesperson_id: i64) -> Result<i64>;

    // Badges.

    /// Grant a badge. Returns false (and changes nothing) when the
    /// salesperson already holds a badge of that name.
    async fn grant_badge(&self, new: &NewBadge) -> Result<bool>;

    async fn badges(&self, salesperson_id: i64) -> Result<Vec<Badge>>;

    async fn badge_count(&self, salesperson_id: i64) -> Result<i64>;

    // Coach message log.

    async fn insert_coach_message(
        &self,
        salesperson_id: i64,
        kind: MessageKind,
        body: &str,
    ) -> Result<i64>;

    /// All messages not yet delivered, oldest first.
    async fn pending_messages(&self) -> Result<Vec<CoachMessage>>;

    async fn mark_message_sent(&self, message_id: i64) -> Result<()>;

    // Conversations.

    async fn insert_conversation(
        &self,
        new: &NewConversation,
        analysis: &ConversationAnalysis,
    ) -> Result<Conversation>;

    /// Most recent conversations for a salesperson, newest first.
    async fn recent_conversations(
        &self,
        salesperson_id: i64,
        limit: i64,
    ) -> Result<Vec<Conversation>>;

    /// Mean overall score across a salesperson's analyzed conversations.
    async fn average_conversation_score(&self, salesperson_id: i64) -> Result<Option<f64>>;

    // Maintenance.

    /// Delete all rows from every table (seeding).
    async fn wipe(&self) -> Result<()>;
}
