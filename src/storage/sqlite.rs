//! SQLite implementation of the game store.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, NaiveDate, Utc};
use sea_query::{Alias, Expr, Func, OnConflict, Order, Query, SqliteQueryBuilder};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use std::time::Duration;

use crate::config::GameRules;
use crate::domain::{
    ActionKind, Badge, Channel, CoachMessage, CompletedMission, Conversation,
    ConversationAnalysis, DailyTally, MessageKind, Mission, MissionCategory, MissionStatus,
    NewBadge, NewConversation, NewMission, NewPointEvent, NewSalesperson, PointEvent, Rarity,
    Salesperson, TallyDelta, TallySums,
};
use crate::engine::ranking::PeriodScore;
use crate::engine::{leveling, missions};
use crate::interfaces::store::{ActionOutcome, ActionRecord, Result, StoreError, TeamTotals};
use crate::interfaces::GameStore;

use super::schema::{
    Badges, CoachMessages, Conversations, DailyTallies, Missions, PointEvents, Salespeople,
    CREATE_TABLES,
};

const DAY_FORMAT: &str = "%Y-%m-%d";

/// SQLite implementation of [`GameStore`].
///
/// Holds the rule tables so the record-action transaction can re-derive
/// levels and milestone badges against the same snapshot it mutates.
pub struct SqliteGameStore {
    pool: SqlitePool,
    rules: Arc<GameRules>,
    write_retries: usize,
}

impl SqliteGameStore {
    /// Create a new SQLite game store.
    pub fn new(pool: SqlitePool, rules: Arc<GameRules>, write_retries: usize) -> Self {
        Self {
            pool,
            rules,
            write_retries,
        }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        for statement in CREATE_TABLES {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Backoff for write transactions that lost a lock race.
    fn write_backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(500))
            .with_max_times(self.write_retries)
            .with_jitter()
    }

    /// One attempt of the record-action sequence, fully inside a
    /// transaction. Retried by [`GameStore::record_action`] on lock
    /// contention.
    async fn try_record_action(&self, record: &ActionRecord) -> Result<ActionOutcome> {
        let event = &record.event;
        let mut tx = self.pool.begin().await?;

        // Salesperson must exist; its prior level anchors milestone grants.
        let sql = Query::select()
            .column(Salespeople::Level)
            .from(Salespeople::Table)
            .and_where(Expr::col(Salespeople::Id).eq(event.salesperson_id))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found("salesperson", event.salesperson_id))?;
        let prior_level = row.get::<i64, _>("level") as u32;

        // Append the ledger entry.
        let sql = Query::insert()
            .into_table(PointEvents::Table)
            .columns([
                PointEvents::SalespersonId,
                PointEvents::Day,
                PointEvents::Points,
                PointEvents::ActionKind,
                PointEvents::Detail,
                PointEvents::CreatedAt,
            ])
            .values_panic([
                event.salesperson_id.into(),
                day_str(event.day).into(),
                event.points.into(),
                event.action_kind.as_str().into(),
                event.detail.clone().into(),
                Utc::now().to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);
        sqlx::query(&sql).execute(&mut *tx).await?;

        // Award the action's points. The increment happens in SQL, never as
        // a read-modify-write from this side of the connection.
        let sql = Query::update()
            .table(Salespeople::Table)
            .value(
                Salespeople::XpTotal,
                Expr::col(Salespeople::XpTotal).add(event.points),
            )
            .and_where(Expr::col(Salespeople::Id).eq(event.salesperson_id))
            .to_string(SqliteQueryBuilder);
        sqlx::query(&sql).execute(&mut *tx).await?;

        // Advance missions in the category this action feeds.
        let mut completed = Vec::new();
        let mut reward_total = 0i64;
        if let Some(category) = MissionCategory::for_action(event.action_kind) {
            let sql = Query::select()
                .columns([
                    Missions::Id,
                    Missions::SalespersonId,
                    Missions::Title,
                    Missions::Description,
                    Missions::Kind,
                    Missions::Category,
                    Missions::Target,
                    Missions::Progress,
                    Missions::RewardXp,
                    Missions::Status,
                    Missions::StartsOn,
                    Missions::EndsOn,
                    Missions::CreatedAt,
                ])
                .from(Missions::Table)
                .and_where(Expr::col(Missions::SalespersonId).eq(event.salesperson_id))
                .and_where(Expr::col(Missions::Status).eq(MissionStatus::Active.as_str()))
                .and_where(Expr::col(Missions::Category).eq(category.as_str()))
                .order_by(Missions::Id, Order::Asc)
                .to_string(SqliteQueryBuilder);
            let rows = sqlx::query(&sql).fetch_all(&mut *tx).await?;

            let mut active = Vec::with_capacity(rows.len());
            for row in &rows {
                active.push(mission_from_row(row)?);
            }

            for advance in missions::apply_progress(&active, record.quantity) {
                let status = if advance.completed {
                    MissionStatus::Completed
                } else {
                    MissionStatus::Active
                };
                let sql = Query::update()
                    .table(Missions::Table)
                    .values([
                        (Missions::Progress, advance.progress.into()),
                        (Missions::Status, status.as_str().into()),
                    ])
                    .and_where(Expr::col(Missions::Id).eq(advance.mission_id))
                    .to_string(SqliteQueryBuilder);
                sqlx::query(&sql).execute(&mut *tx).await?;

                if advance.completed {
                    reward_total += advance.reward_xp;
                    completed.push(CompletedMission {
                        id: advance.mission_id,
                        title: advance.title,
                        reward_xp: advance.reward_xp,
                    });
                }
            }
        }

        if reward_total > 0 {
            let sql = Query::update()
                .table(Salespeople::Table)
                .value(
                    Salespeople::XpTotal,
                    Expr::col(Salespeople::XpTotal).add(reward_total),
                )
                .and_where(Expr::col(Salespeople::Id).eq(event.salesperson_id))
                .to_string(SqliteQueryBuilder);
            sqlx::query(&sql).execute(&mut *tx).await?;
        }

        // Re-derive the level from the post-update total, in the same
        // transaction, so the level/XP invariant holds on commit.
        let sql = Query::select()
            .column(Salespeople::XpTotal)
            .from(Salespeople::Table)
            .and_where(Expr::col(Salespeople::Id).eq(event.salesperson_id))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql).fetch_one(&mut *tx).await?;
        let xp_total: i64 = row.get("xp_total");

        let change = leveling::apply_xp_delta(&self.rules, prior_level, xp_total);
        if change.level != prior_level {
            let sql = Query::update()
                .table(Salespeople::Table)
                .values([(Salespeople::Level, i64::from(change.level).into())])
                .and_where(Expr::col(Salespeople::Id).eq(event.salesperson_id))
                .to_string(SqliteQueryBuilder);
            sqlx::query(&sql).execute(&mut *tx).await?;
        }

        if change.leveled_up {
            for milestone in leveling::crossed_milestones(&self.rules, prior_level, change.level) {
                let sql = Query::insert()
                    .into_table(Badges::Table)
                    .columns([
                        Badges::SalespersonId,
                        Badges::Name,
                        Badges::Icon,
                        Badges::Description,
                        Badges::Rarity,
                        Badges::AwardedAt,
                    ])
                    .values_panic([
                        event.salesperson_id.into(),
                        milestone.name.clone().into(),
                        milestone.icon.clone().into(),
                        milestone.description.clone().into(),
                        Rarity::Epic.as_str().into(),
                        Utc::now().to_rfc3339().into(),
                    ])
                    .on_conflict(
                        OnConflict::columns([Badges::SalespersonId, Badges::Name])
                            .do_nothing()
                            .to_owned(),
                    )
                    .to_string(SqliteQueryBuilder);
                sqlx::query(&sql).execute(&mut *tx).await?;
            }
        }

        fold_tally(&mut tx, event.salesperson_id, event.day, &record.tally).await?;

        tx.commit().await?;

        Ok(ActionOutcome {
            points_awarded: event.points,
            xp_total,
            level: change,
            completed_missions: completed,
        })
    }
}

#[async_trait]
impl GameStore for SqliteGameStore {
    async fn insert_salesperson(&self, new: &NewSalesperson) -> Result<Salesperson> {
        let joined_on = Utc::now().date_naive();
        let sql = Query::insert()
            .into_table(Salespeople::Table)
            .columns([
                Salespeople::Name,
                Salespeople::Phone,
                Salespeople::Email,
                Salespeople::Level,
                Salespeople::XpTotal,
                Salespeople::Avatar,
                Salespeople::JoinedOn,
                Salespeople::Active,
            ])
            .values_panic([
                new.name.clone().into(),
                new.phone.clone().into(),
                new.email.clone().into(),
                i64::from(new.level).into(),
                new.xp_total.into(),
                new.avatar.clone().into(),
                day_str(joined_on).into(),
                1i64.into(),
            ])
            .to_string(SqliteQueryBuilder);
        let result = sqlx::query(&sql).execute(&self.pool).await?;

        Ok(Salesperson {
            id: result.last_insert_rowid(),
            name: new.name.clone(),
            phone: new.phone.clone(),
            email: new.email.clone(),
            level: new.level,
            xp_total: new.xp_total,
            avatar: new.avatar.clone(),
            joined_on,
            active: true,
        })
    }

    async fn salesperson(&self, id: i64) -> Result<Salesperson> {
        let sql = salesperson_select()
            .and_where(Expr::col(Salespeople::Id).eq(id))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("salesperson", id))?;
        salesperson_from_row(&row)
    }

    async fn active_salespeople(&self) -> Result<Vec<Salesperson>> {
        let sql = salesperson_select()
            .and_where(Expr::col(Salespeople::Active).eq(1))
            .order_by(Salespeople::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut people = Vec::with_capacity(rows.len());
        for row in &rows {
            people.push(salesperson_from_row(row)?);
        }
        Ok(people)
    }

    async fn record_action(&self, record: &ActionRecord) -> Result<ActionOutcome> {
        let result = (|| async { self.try_record_action(record).await })
            .retry(self.write_backoff())
            .when(is_locked)
            .await;

        match result {
            Err(err) if is_locked(&err) => Err(StoreError::Conflict {
                attempts: self.write_retries + 1,
            }),
            other => other,
        }
    }

    async fn insert_point_event(&self, event: &NewPointEvent) -> Result<()> {
        let sql = Query::insert()
            .into_table(PointEvents::Table)
            .columns([
                PointEvents::SalespersonId,
                PointEvents::Day,
                PointEvents::Points,
                PointEvents::ActionKind,
                PointEvents::Detail,
                PointEvents::CreatedAt,
            ])
            .values_panic([
                event.salesperson_id.into(),
                day_str(event.day).into(),
                event.points.into(),
                event.action_kind.as_str().into(),
                event.detail.clone().into(),
                Utc::now().to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn point_events(&self, salesperson_id: i64) -> Result<Vec<PointEvent>> {
        let sql = Query::select()
            .columns([
                PointEvents::Id,
                PointEvents::SalespersonId,
                PointEvents::Day,
                PointEvents::Points,
                PointEvents::ActionKind,
                PointEvents::Detail,
                PointEvents::CreatedAt,
            ])
            .from(PointEvents::Table)
            .and_where(Expr::col(PointEvents::SalespersonId).eq(salesperson_id))
            .order_by(PointEvents::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut events = Vec::with_capacity(rows.len());
        for row in &rows {
            events.push(PointEvent {
                id: row.get("id"),
                salesperson_id: row.get("salesperson_id"),
                day: parse_day(row.get("day"))?,
                points: row.get("points"),
                action_kind: parse_enum::<ActionKind>(row.get("action_kind"))?,
                detail: row.get("detail"),
                created_at: parse_timestamp(row.get("created_at"))?,
            });
        }
        Ok(events)
    }

    async fn period_scores(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<PeriodScore>> {
        let sql = Query::select()
            .column((Salespeople::Table, Salespeople::Id))
            .column((Salespeople::Table, Salespeople::Name))
            .column((Salespeople::Table, Salespeople::Phone))
            .column((Salespeople::Table, Salespeople::Email))
            .column((Salespeople::Table, Salespeople::Level))
            .column((Salespeople::Table, Salespeople::XpTotal))
            .column((Salespeople::Table, Salespeople::Avatar))
            .column((Salespeople::Table, Salespeople::JoinedOn))
            .column((Salespeople::Table, Salespeople::Active))
            .expr_as(
                Expr::col((PointEvents::Table, PointEvents::Points)).sum(),
                Alias::new("period_points"),
            )
            .from(PointEvents::Table)
            .inner_join(
                Salespeople::Table,
                Expr::col((PointEvents::Table, PointEvents::SalespersonId))
                    .equals((Salespeople::Table, Salespeople::Id)),
            )
            .and_where(Expr::col((PointEvents::Table, PointEvents::Day)).gte(day_str(from)))
            .and_where(Expr::col((PointEvents::Table, PointEvents::Day)).lte(day_str(to)))
            .group_by_col((Salespeople::Table, Salespeople::Id))
            .to_string(SqliteQueryBuilder);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut scores = Vec::with_capacity(rows.len());
        for row in &rows {
            scores.push(PeriodScore {
                salesperson: salesperson_from_row(row)?,
                points: row.get("period_points"),
            });
        }
        Ok(scores)
    }

    async fn points_in_window(
        &self,
        salesperson_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<i64> {
        let sql = Query::select()
            .expr(Expr::col(PointEvents::Points).sum())
            .from(PointEvents::Table)
            .and_where(Expr::col(PointEvents::SalespersonId).eq(salesperson_id))
            .and_where(Expr::col(PointEvents::Day).gte(day_str(from)))
            .and_where(Expr::col(PointEvents::Day).lte(day_str(to)))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        let total: Option<i64> = row.get(0);
        Ok(total.unwrap_or(0))
    }

    async fn upsert_tally(
        &self,
        salesperson_id: i64,
        day: NaiveDate,
        delta: &TallyDelta,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        fold_tally(&mut tx, salesperson_id, day, delta).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn tally_for_day(
        &self,
        salesperson_id: i64,
        day: NaiveDate,
    ) -> Result<Option<DailyTally>> {
        let sql = tally_select()
            .and_where(Expr::col(DailyTallies::SalespersonId).eq(salesperson_id))
            .and_where(Expr::col(DailyTallies::Day).eq(day_str(day)))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql).fetch_optional(&self.pool).await?;
        row.as_ref().map(tally_from_row).transpose()
    }

    async fn tally_sums(
        &self,
        salesperson_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<TallySums> {
        let sql = Query::select()
            .expr_as(Expr::col(DailyTallies::Leads).sum(), Alias::new("leads"))
            .expr_as(
                Expr::col(DailyTallies::InterviewsCompleted).sum(),
                Alias::new("interviews"),
            )
            .expr_as(
                Expr::col(DailyTallies::Conversions).sum(),
                Alias::new("conversions"),
            )
            .expr_as(Expr::col(DailyTallies::Sales).sum(), Alias::new("sales"))
            .expr_as(Expr::col(DailyTallies::Revenue).sum(), Alias::new("revenue"))
            .from(DailyTallies::Table)
            .and_where(Expr::col(DailyTallies::SalespersonId).eq(salesperson_id))
            .and_where(Expr::col(DailyTallies::Day).gte(day_str(from)))
            .and_where(Expr::col(DailyTallies::Day).lte(day_str(to)))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;

        Ok(TallySums {
            leads: row.get::<Option<i64>, _>("leads").unwrap_or(0),
            interviews: row.get::<Option<i64>, _>("interviews").unwrap_or(0),
            conversions: row.get::<Option<i64>, _>("conversions").unwrap_or(0),
            sales: row.get::<Option<i64>, _>("sales").unwrap_or(0),
            revenue: row.get::<Option<f64>, _>("revenue").unwrap_or(0.0),
        })
    }

    async fn team_totals(&self, day: NaiveDate) -> Result<TeamTotals> {
        let sql = Query::select()
            .expr(Expr::col(Salespeople::Id).count())
            .from(Salespeople::Table)
            .and_where(Expr::col(Salespeople::Active).eq(1))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        let salespeople: i64 = row.get(0);

        let sql = Query::select()
            .expr_as(Expr::col(DailyTallies::Leads).sum(), Alias::new("leads"))
            .expr_as(
                Expr::col(DailyTallies::InterviewsCompleted).sum(),
                Alias::new("interviews"),
            )
            .expr_as(Expr::col(DailyTallies::Sales).sum(), Alias::new("sales"))
            .expr_as(Expr::col(DailyTallies::Revenue).sum(), Alias::new("revenue"))
            .from(DailyTallies::Table)
            .and_where(Expr::col(DailyTallies::Day).eq(day_str(day)))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;

        Ok(TeamTotals {
            salespeople,
            leads: row.get::<Option<i64>, _>("leads").unwrap_or(0),
            interviews: row.get::<Option<i64>, _>("interviews").unwrap_or(0),
            sales: row.get::<Option<i64>, _>("sales").unwrap_or(0),
            revenue: row.get::<Option<f64>, _>("revenue").unwrap_or(0.0),
        })
    }

    async fn insert_mission(&self, new: &NewMission) -> Result<Mission> {
        let created_at = Utc::now();
        let sql = Query::insert()
            .into_table(Missions::Table)
            .columns([
                Missions::SalespersonId,
                Missions::Title,
                Missions::Description,
                Missions::Kind,
                Missions::Category,
                Missions::Target,
                Missions::Progress,
                Missions::RewardXp,
                Missions::Status,
                Missions::StartsOn,
                Missions::EndsOn,
                Missions::CreatedAt,
            ])
            .values_panic([
                new.salesperson_id.into(),
                new.title.clone().into(),
                new.description.clone().into(),
                new.kind.as_str().into(),
                new.category.map(|c| c.as_str().to_string()).into(),
                new.target.into(),
                new.progress.into(),
                new.reward_xp.into(),
                MissionStatus::Active.as_str().into(),
                day_str(new.starts_on).into(),
                new.ends_on.map(day_str).into(),
                created_at.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);
        let result = sqlx::query(&sql).execute(&self.pool).await?;

        Ok(Mission {
            id: result.last_insert_rowid(),
            salesperson_id: new.salesperson_id,
            title: new.title.clone(),
            description: new.description.clone(),
            kind: new.kind,
            category: new.category,
            target: new.target,
            progress: new.progress,
            reward_xp: new.reward_xp,
            status: MissionStatus::Active,
            starts_on: new.starts_on,
            ends_on: new.ends_on,
            created_at,
        })
    }

    async fn active_missions(&self, salesperson_id: i64) -> Result<Vec<Mission>> {
        let sql = mission_select()
            .and_where(Expr::col(Missions::SalespersonId).eq(salesperson_id))
            .and_where(Expr::col(Missions::Status).eq(MissionStatus::Active.as_str()))
            .order_by(Missions::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            result.push(mission_from_row(row)?);
        }
        Ok(result)
    }

    async fn active_mission_count(&self, salesperson_id: i64) -> Result<i64> {
        let sql = Query::select()
            .expr(Expr::col(Missions::Id).count())
            .from(Missions::Table)
            .and_where(Expr::col(Missions::SalespersonId).eq(salesperson_id))
            .and_where(Expr::col(Missions::Status).eq(MissionStatus::Active.as_str()))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.get(0))
    }

    async fn grant_badge(&self, new: &NewBadge) -> Result<bool> {
        let sql = Query::insert()
            .into_table(Badges::Table)
            .columns([
                Badges::SalespersonId,
                Badges::Name,
                Badges::Icon,
                Badges::Description,
                Badges::Rarity,
                Badges::AwardedAt,
            ])
            .values_panic([
                new.salesperson_id.into(),
                new.name.clone().into(),
                new.icon.clone().into(),
                new.description.clone().into(),
                new.rarity.as_str().into(),
                Utc::now().to_rfc3339().into(),
            ])
            .on_conflict(
                OnConflict::columns([Badges::SalespersonId, Badges::Name])
                    .do_nothing()
                    .to_owned(),
            )
            .to_string(SqliteQueryBuilder);
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn badges(&self, salesperson_id: i64) -> Result<Vec<Badge>> {
        let sql = Query::select()
            .columns([
                Badges::Id,
                Badges::SalespersonId,
                Badges::Name,
                Badges::Icon,
                Badges::Description,
                Badges::Rarity,
                Badges::AwardedAt,
            ])
            .from(Badges::Table)
            .and_where(Expr::col(Badges::SalespersonId).eq(salesperson_id))
            .order_by(Badges::AwardedAt, Order::Asc)
            .to_string(SqliteQueryBuilder);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut badges = Vec::with_capacity(rows.len());
        for row in &rows {
            badges.push(Badge {
                id: row.get("id"),
                salesperson_id: row.get("salesperson_id"),
                name: row.get("name"),
                icon: row.get("icon"),
                description: row.get("description"),
                rarity: parse_enum::<Rarity>(row.get("rarity"))?,
                awarded_at: parse_timestamp(row.get("awarded_at"))?,
            });
        }
        Ok(badges)
    }

    async fn badge_count(&self, salesperson_id: i64) -> Result<i64> {
        let sql = Query::select()
            .expr(Expr::col(Badges::Id).count())
            .from(Badges::Table)
            .and_where(Expr::col(Badges::SalespersonId).eq(salesperson_id))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        Ok(row.get(0))
    }

    async fn insert_coach_message(
        &self,
        salesperson_id: i64,
        kind: MessageKind,
        body: &str,
    ) -> Result<i64> {
        let sql = Query::insert()
            .into_table(CoachMessages::Table)
            .columns([
                CoachMessages::SalespersonId,
                CoachMessages::Body,
                CoachMessages::Kind,
                CoachMessages::Sent,
                CoachMessages::CreatedAt,
            ])
            .values_panic([
                salesperson_id.into(),
                body.into(),
                kind.as_str().into(),
                0i64.into(),
                Utc::now().to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    async fn pending_messages(&self) -> Result<Vec<CoachMessage>> {
        let sql = Query::select()
            .columns([
                CoachMessages::Id,
                CoachMessages::SalespersonId,
                CoachMessages::Body,
                CoachMessages::Kind,
                CoachMessages::Sent,
                CoachMessages::SentAt,
                CoachMessages::CreatedAt,
            ])
            .from(CoachMessages::Table)
            .and_where(Expr::col(CoachMessages::Sent).eq(0))
            .order_by(CoachMessages::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            messages.push(CoachMessage {
                id: row.get("id"),
                salesperson_id: row.get("salesperson_id"),
                body: row.get("body"),
                kind: parse_enum::<MessageKind>(row.get("kind"))?,
                sent: row.get::<i64, _>("sent") != 0,
                sent_at: row
                    .get::<Option<String>, _>("sent_at")
                    .as_deref()
                    .map(parse_timestamp)
                    .transpose()?,
                created_at: parse_timestamp(row.get("created_at"))?,
            });
        }
        Ok(messages)
    }

    async fn mark_message_sent(&self, message_id: i64) -> Result<()> {
        let sql = Query::update()
            .table(CoachMessages::Table)
            .values([
                (CoachMessages::Sent, 1i64.into()),
                (CoachMessages::SentAt, Utc::now().to_rfc3339().into()),
            ])
            .and_where(Expr::col(CoachMessages::Id).eq(message_id))
            .to_string(SqliteQueryBuilder);
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("coach message", message_id));
        }
        Ok(())
    }

    async fn insert_conversation(
        &self,
        new: &NewConversation,
        analysis: &ConversationAnalysis,
    ) -> Result<Conversation> {
        let now = Utc::now();
        let stages_met = to_json(&analysis.stages_met)?;
        let improvements = to_json(&analysis.improvements)?;
        let analyzed = analysis.outcome != "unscored";

        let sql = Query::insert()
            .into_table(Conversations::Table)
            .columns([
                Conversations::SalespersonId,
                Conversations::CustomerName,
                Conversations::CustomerPhone,
                Conversations::Channel,
                Conversations::Transcript,
                Conversations::DurationSecs,
                Conversations::HappenedAt,
                Conversations::StageScore,
                Conversations::QualityScore,
                Conversations::ObjectionScore,
                Conversations::OutcomeScore,
                Conversations::OverallScore,
                Conversations::StagesMet,
                Conversations::Improvements,
                Conversations::Outcome,
                Conversations::Analyzed,
                Conversations::AnalyzedAt,
                Conversations::CreatedAt,
            ])
            .values_panic([
                new.salesperson_id.into(),
                new.customer_name.clone().into(),
                new.customer_phone.clone().into(),
                new.channel.as_str().into(),
                new.transcript.clone().into(),
                new.duration_secs.into(),
                new.happened_at.to_rfc3339().into(),
                analysis.stage_score.into(),
                analysis.quality_score.into(),
                analysis.objection_score.into(),
                analysis.outcome_score.into(),
                analysis.overall_score.into(),
                stages_met.into(),
                improvements.into(),
                analysis.outcome.clone().into(),
                i64::from(analyzed).into(),
                analyzed.then(|| now.to_rfc3339()).into(),
                now.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);
        let result = sqlx::query(&sql).execute(&self.pool).await?;

        Ok(Conversation {
            id: result.last_insert_rowid(),
            salesperson_id: new.salesperson_id,
            customer_name: new.customer_name.clone(),
            customer_phone: new.customer_phone.clone(),
            channel: new.channel,
            transcript: new.transcript.clone(),
            duration_secs: new.duration_secs,
            happened_at: new.happened_at,
            analysis: analysis.clone(),
            analyzed,
            analyzed_at: analyzed.then_some(now),
            created_at: now,
        })
    }

    async fn recent_conversations(
        &self,
        salesperson_id: i64,
        limit: i64,
    ) -> Result<Vec<Conversation>> {
        let sql = Query::select()
            .columns([
                Conversations::Id,
                Conversations::SalespersonId,
                Conversations::CustomerName,
                Conversations::CustomerPhone,
                Conversations::Channel,
                Conversations::Transcript,
                Conversations::DurationSecs,
                Conversations::HappenedAt,
                Conversations::StageScore,
                Conversations::QualityScore,
                Conversations::ObjectionScore,
                Conversations::OutcomeScore,
                Conversations::OverallScore,
                Conversations::StagesMet,
                Conversations::Improvements,
                Conversations::Outcome,
                Conversations::Analyzed,
                Conversations::AnalyzedAt,
                Conversations::CreatedAt,
            ])
            .from(Conversations::Table)
            .and_where(Expr::col(Conversations::SalespersonId).eq(salesperson_id))
            .order_by(Conversations::HappenedAt, Order::Desc)
            .limit(limit.max(0) as u64)
            .to_string(SqliteQueryBuilder);
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut conversations = Vec::with_capacity(rows.len());
        for row in &rows {
            conversations.push(conversation_from_row(row)?);
        }
        Ok(conversations)
    }

    async fn average_conversation_score(&self, salesperson_id: i64) -> Result<Option<f64>> {
        let sql = Query::select()
            .expr(Func::avg(Expr::col(Conversations::OverallScore)))
            .from(Conversations::Table)
            .and_where(Expr::col(Conversations::SalespersonId).eq(salesperson_id))
            .and_where(Expr::col(Conversations::Analyzed).eq(1))
            .to_string(SqliteQueryBuilder);
        let row = sqlx::query(&sql).fetch_one(&self.pool).await?;
        let avg: Option<f64> = row.get(0);
        Ok(avg.map(|v| (v * 100.0).round() / 100.0))
    }

    async fn wipe(&self) -> Result<()> {
        // Children before parents, to keep foreign keys satisfied.
        let statements = [
            Query::delete()
                .from_table(Conversations::Table)
                .to_string(SqliteQueryBuilder),
            Query::delete()
                .from_table(CoachMessages::Table)
                .to_string(SqliteQueryBuilder),
            Query::delete()
                .from_table(Badges::Table)
                .to_string(SqliteQueryBuilder),
            Query::delete()
                .from_table(Missions::Table)
                .to_string(SqliteQueryBuilder),
            Query::delete()
                .from_table(DailyTallies::Table)
                .to_string(SqliteQueryBuilder),
            Query::delete()
                .from_table(PointEvents::Table)
                .to_string(SqliteQueryBuilder),
            Query::delete()
                .from_table(Salespeople::Table)
                .to_string(SqliteQueryBuilder),
        ];
        for sql in &statements {
            sqlx::query(sql).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Fold a tally delta into the `(salesperson, day)` row, creating it if
/// absent. Runs on the caller's transaction.
async fn fold_tally(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    salesperson_id: i64,
    day: NaiveDate,
    delta: &TallyDelta,
) -> Result<()> {
    let sql = tally_select()
        .and_where(Expr::col(DailyTallies::SalespersonId).eq(salesperson_id))
        .and_where(Expr::col(DailyTallies::Day).eq(day_str(day)))
        .to_string(SqliteQueryBuilder);
    let existing = sqlx::query(&sql).fetch_optional(&mut **tx).await?;

    match existing {
        Some(row) => {
            let tally = tally_from_row(&row)?;
            let sales = tally.sales + delta.sales;
            let revenue = tally.revenue + delta.revenue;
            let avg_ticket = if sales > 0 { revenue / sales as f64 } else { 0.0 };

            let sql = Query::update()
                .table(DailyTallies::Table)
                .values([
                    (DailyTallies::Leads, (tally.leads + delta.leads).into()),
                    (
                        DailyTallies::InterviewsScheduled,
                        (tally.interviews_scheduled + delta.interviews_scheduled).into(),
                    ),
                    (
                        DailyTallies::InterviewsCompleted,
                        (tally.interviews_completed + delta.interviews_completed).into(),
                    ),
                    (
                        DailyTallies::Conversions,
                        (tally.conversions + delta.conversions).into(),
                    ),
                    (DailyTallies::Sales, sales.into()),
                    (DailyTallies::AvgTicket, avg_ticket.into()),
                    (DailyTallies::Revenue, revenue.into()),
                    (DailyTallies::Points, (tally.points + delta.points).into()),
                ])
                .and_where(Expr::col(DailyTallies::Id).eq(tally.id))
                .to_string(SqliteQueryBuilder);
            sqlx::query(&sql).execute(&mut **tx).await?;
        }
        None => {
            let avg_ticket = if delta.sales > 0 {
                delta.revenue / delta.sales as f64
            } else {
                0.0
            };
            let sql = Query::insert()
                .into_table(DailyTallies::Table)
                .columns([
                    DailyTallies::SalespersonId,
                    DailyTallies::Day,
                    DailyTallies::Leads,
                    DailyTallies::InterviewsScheduled,
                    DailyTallies::InterviewsCompleted,
                    DailyTallies::Conversions,
                    DailyTallies::Sales,
                    DailyTallies::AvgTicket,
                    DailyTallies::Revenue,
                    DailyTallies::Points,
                    DailyTallies::CreatedAt,
                ])
                .values_panic([
                    salesperson_id.into(),
                    day_str(day).into(),
                    delta.leads.into(),
                    delta.interviews_scheduled.into(),
                    delta.interviews_completed.into(),
                    delta.conversions.into(),
                    delta.sales.into(),
                    avg_ticket.into(),
                    delta.revenue.into(),
                    delta.points.into(),
                    Utc::now().to_rfc3339().into(),
                ])
                .to_string(SqliteQueryBuilder);
            sqlx::query(&sql).execute(&mut **tx).await?;
        }
    }
    Ok(())
}

fn salesperson_select() -> sea_query::SelectStatement {
    Query::select()
        .columns([
            Salespeople::Id,
            Salespeople::Name,
            Salespeople::Phone,
            Salespeople::Email,
            Salespeople::Level,
            Salespeople::XpTotal,
            Salespeople::Avatar,
            Salespeople::JoinedOn,
            Salespeople::Active,
        ])
        .from(Salespeople::Table)
        .to_owned()
}

fn mission_select() -> sea_query::SelectStatement {
    Query::select()
        .columns([
            Missions::Id,
            Missions::SalespersonId,
            Missions::Title,
            Missions::Description,
            Missions::Kind,
            Missions::Category,
            Missions::Target,
            Missions::Progress,
            Missions::RewardXp,
            Missions::Status,
            Missions::StartsOn,
            Missions::EndsOn,
            Missions::CreatedAt,
        ])
        .from(Missions::Table)
        .to_owned()
}

fn tally_select() -> sea_query::SelectStatement {
    Query::select()
        .columns([
            DailyTallies::Id,
            DailyTallies::SalespersonId,
            DailyTallies::Day,
            DailyTallies::Leads,
            DailyTallies::InterviewsScheduled,
            DailyTallies::InterviewsCompleted,
            DailyTallies::Conversions,
            DailyTallies::Sales,
            DailyTallies::AvgTicket,
            DailyTallies::Revenue,
            DailyTallies::Points,
            DailyTallies::CreatedAt,
        ])
        .from(DailyTallies::Table)
        .to_owned()
}

fn salesperson_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Salesperson> {
    Ok(Salesperson {
        id: row.get("id"),
        name: row.get("name"),
        phone: row.get("phone"),
        email: row.get("email"),
        level: row.get::<i64, _>("level") as u32,
        xp_total: row.get("xp_total"),
        avatar: row.get("avatar"),
        joined_on: parse_day(row.get("joined_on"))?,
        active: row.get::<i64, _>("active") != 0,
    })
}

fn mission_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Mission> {
    Ok(Mission {
        id: row.get("id"),
        salesperson_id: row.get("salesperson_id"),
        title: row.get("title"),
        description: row.get("description"),
        kind: parse_enum(row.get("kind"))?,
        category: row
            .get::<Option<String>, _>("category")
            .as_deref()
            .map(parse_enum::<MissionCategory>)
            .transpose()?,
        target: row.get("target"),
        progress: row.get("progress"),
        reward_xp: row.get("reward_xp"),
        status: parse_enum(row.get("status"))?,
        starts_on: parse_day(row.get("starts_on"))?,
        ends_on: row
            .get::<Option<String>, _>("ends_on")
            .as_deref()
            .map(parse_day)
            .transpose()?,
        created_at: parse_timestamp(row.get("created_at"))?,
    })
}

fn tally_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<DailyTally> {
    Ok(DailyTally {
        id: row.get("id"),
        salesperson_id: row.get("salesperson_id"),
        day: parse_day(row.get("day"))?,
        leads: row.get("leads"),
        interviews_scheduled: row.get("interviews_scheduled"),
        interviews_completed: row.get("interviews_completed"),
        conversions: row.get("conversions"),
        sales: row.get("sales"),
        avg_ticket: row.get("avg_ticket"),
        revenue: row.get("revenue"),
        points: row.get("points"),
        created_at: parse_timestamp(row.get("created_at"))?,
    })
}

fn conversation_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Conversation> {
    let analysis = ConversationAnalysis {
        stage_score: row.get("stage_score"),
        quality_score: row.get("quality_score"),
        objection_score: row.get("objection_score"),
        outcome_score: row.get("outcome_score"),
        overall_score: row.get("overall_score"),
        stages_met: from_json(row.get("stages_met"))?,
        improvements: from_json(row.get("improvements"))?,
        outcome: row.get("outcome"),
        summary: None,
    };
    Ok(Conversation {
        id: row.get("id"),
        salesperson_id: row.get("salesperson_id"),
        customer_name: row.get("customer_name"),
        customer_phone: row.get("customer_phone"),
        channel: parse_enum::<Channel>(row.get("channel"))?,
        transcript: row.get("transcript"),
        duration_secs: row.get("duration_secs"),
        happened_at: parse_timestamp(row.get("happened_at"))?,
        analysis,
        analyzed: row.get::<i64, _>("analyzed") != 0,
        analyzed_at: row
            .get::<Option<String>, _>("analyzed_at")
            .as_deref()
            .map(parse_timestamp)
            .transpose()?,
        created_at: parse_timestamp(row.get("created_at"))?,
    })
}

fn day_str(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DAY_FORMAT)
        .map_err(|_| StoreError::InvalidDate(value.to_string()))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidDate(value.to_string()))
}

fn parse_enum<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr<Err = crate::domain::ParseEnumError>,
{
    value
        .parse::<T>()
        .map_err(|e| StoreError::InvalidValue(e.to_string()))
}

fn to_json(values: &[String]) -> Result<String> {
    serde_json::to_string(values).map_err(|e| StoreError::InvalidValue(e.to_string()))
}

fn from_json(value: &str) -> Result<Vec<String>> {
    serde_json::from_str(value).map_err(|_| StoreError::InvalidValue(value.to_string()))
}

/// Whether an error is SQLite lock contention worth retrying.
fn is_locked(err: &StoreError) -> bool {
    match err {
        StoreError::Database(sqlx::Error::Database(db)) => {
            // 5 = SQLITE_BUSY, 6 = SQLITE_LOCKED (plus extended variants).
            matches!(
                db.code().as_deref(),
                Some("5") | Some("6") | Some("261") | Some("517")
            ) || db.message().contains("database is locked")
        }
        _ => false,
    }
}
