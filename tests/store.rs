//! Game store contract tests over a real sqlite database.

mod common;

use std::sync::Arc;

use chrono::{Duration, Local, Utc};

use questline::domain::{
    ActionKind, Channel, ConversationAnalysis, MessageKind, MissionCategory, MissionKind,
    NewBadge, NewConversation, NewMission, NewPointEvent, Period, Rarity, TallyDelta,
};
use questline::engine::ranking::assign_positions;
use questline::interfaces::store::{ActionRecord, StoreError};
use questline::interfaces::GameStore;

use common::{add_salesperson, temp_store};

fn lead_record(salesperson_id: i64, quantity: i64) -> ActionRecord {
    let points = quantity * 2;
    ActionRecord {
        event: NewPointEvent {
            salesperson_id,
            day: Local::now().date_naive(),
            points,
            action_kind: ActionKind::LeadReached,
            detail: Some(format!("{quantity}x lead_reached")),
        },
        quantity,
        tally: TallyDelta {
            leads: quantity,
            points,
            ..TallyDelta::default()
        },
    }
}

fn sale_record(salesperson_id: i64, quantity: i64, ticket: f64) -> ActionRecord {
    let points = quantity * 50;
    ActionRecord {
        event: NewPointEvent {
            salesperson_id,
            day: Local::now().date_naive(),
            points,
            action_kind: ActionKind::Sale,
            detail: Some(format!("{quantity}x sale")),
        },
        quantity,
        tally: TallyDelta {
            sales: quantity,
            revenue: ticket * quantity as f64,
            points,
            ..TallyDelta::default()
        },
    }
}

#[tokio::test]
async fn record_action_applies_ledger_xp_and_tally() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Diego", 1).await;
    let today = Local::now().date_naive();

    let outcome = store.record_action(&lead_record(id, 5)).await.expect("record");
    assert_eq!(outcome.points_awarded, 10);
    assert_eq!(outcome.xp_total, 10);
    assert_eq!(outcome.level.level, 1);
    assert!(!outcome.level.leveled_up);
    assert!(outcome.completed_missions.is_empty());

    let sp = store.salesperson(id).await.expect("fetch");
    assert_eq!(sp.xp_total, 10);
    assert_eq!(sp.level, 1);

    let events = store.point_events(id).await.expect("events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].points, 10);
    assert_eq!(events[0].action_kind, ActionKind::LeadReached);

    let tally = store
        .tally_for_day(id, today)
        .await
        .expect("tally query")
        .expect("tally row");
    assert_eq!(tally.leads, 5);
    assert_eq!(tally.points, 10);
    assert_eq!(tally.sales, 0);
}

#[tokio::test]
async fn record_action_levels_up_and_grants_milestone() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Rafael", 2).await;

    // 11 sales at 50 points each put the total at 550, inside level 5.
    let outcome = store.record_action(&sale_record(id, 11, 0.0)).await.expect("record");
    assert_eq!(outcome.xp_total, 550);
    assert_eq!(outcome.level.level, 5);
    assert_eq!(outcome.level.title, "Prospector V");
    assert!(outcome.level.leveled_up);

    let badges = store.badges(id).await.expect("badges");
    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0].name, "Prospector Completo");
    assert_eq!(badges[0].rarity, Rarity::Epic);

    // Another action at the same level must not duplicate the badge.
    store.record_action(&lead_record(id, 1)).await.expect("record again");
    assert_eq!(store.badge_count(id).await.expect("count"), 1);
}

#[tokio::test]
async fn record_action_jump_past_milestone_still_grants_badge() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Mariana", 3).await;

    // 0 -> 1550 XP jumps straight from level 1 to level 10, crossing the
    // level 5 and level 10 milestones in one grant.
    let outcome = store.record_action(&sale_record(id, 31, 0.0)).await.expect("record");
    assert_eq!(outcome.xp_total, 1550);
    assert_eq!(outcome.level.level, 10);

    let names: Vec<_> = store
        .badges(id)
        .await
        .expect("badges")
        .into_iter()
        .map(|b| b.name)
        .collect();
    assert!(names.contains(&"Prospector Completo".to_string()));
    assert!(names.contains(&"Hunter Completo".to_string()));
    assert_eq!(names.len(), 2);
}

#[tokio::test]
async fn record_action_completes_mission_and_pays_reward_once() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Carlos", 4).await;
    let today = Local::now().date_naive();

    store
        .insert_mission(&NewMission {
            salesperson_id: id,
            title: "Alcance 40 leads hoje".to_string(),
            description: None,
            kind: MissionKind::Daily,
            category: Some(MissionCategory::Leads),
            target: 40,
            progress: 38,
            reward_xp: 120,
            starts_on: today,
            ends_on: None,
        })
        .await
        .expect("insert mission");

    let outcome = store.record_action(&lead_record(id, 5)).await.expect("record");
    assert_eq!(outcome.completed_missions.len(), 1);
    assert_eq!(outcome.completed_missions[0].reward_xp, 120);
    // 10 action points + 120 reward = 130, which crosses into level 2.
    assert_eq!(outcome.xp_total, 130);
    assert_eq!(outcome.level.level, 2);

    assert!(store.active_missions(id).await.expect("missions").is_empty());

    // The mission is out of the active set; more leads pay nothing extra.
    let outcome = store.record_action(&lead_record(id, 5)).await.expect("record again");
    assert!(outcome.completed_missions.is_empty());
    assert_eq!(outcome.xp_total, 140);
}

#[tokio::test]
async fn record_action_ignores_missions_of_other_categories() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Ana", 5).await;
    let today = Local::now().date_naive();

    store
        .insert_mission(&NewMission {
            salesperson_id: id,
            title: "Feche 5 vendas esta semana".to_string(),
            description: None,
            kind: MissionKind::Weekly,
            category: Some(MissionCategory::Sales),
            target: 5,
            progress: 0,
            reward_xp: 200,
            starts_on: today,
            ends_on: None,
        })
        .await
        .expect("insert mission");

    store.record_action(&lead_record(id, 10)).await.expect("record");

    let missions = store.active_missions(id).await.expect("missions");
    assert_eq!(missions.len(), 1);
    assert_eq!(missions[0].progress, 0);
}

#[tokio::test]
async fn record_action_unknown_salesperson_is_not_found() {
    let (_dir, store, _rules) = temp_store().await;
    let err = store.record_action(&lead_record(999, 1)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn period_scores_window_and_tiebreak() {
    let (_dir, store, _rules) = temp_store().await;
    let a = add_salesperson(&*store, "Alpha", 11).await;
    let b = add_salesperson(&*store, "Bravo", 12).await;
    let c = add_salesperson(&*store, "Charlie", 13).await;
    let _idle = add_salesperson(&*store, "Delta", 14).await;
    let today = Local::now().date_naive();

    for (id, points) in [(a, 150), (b, 300), (c, 150)] {
        store
            .insert_point_event(&NewPointEvent {
                salesperson_id: id,
                day: today,
                points,
                action_kind: ActionKind::Conversion,
                detail: None,
            })
            .await
            .expect("event");
    }
    // Yesterday's points must stay outside the day window.
    store
        .insert_point_event(&NewPointEvent {
            salesperson_id: c,
            day: today - Duration::days(1),
            points: 1000,
            action_kind: ActionKind::Sale,
            detail: None,
        })
        .await
        .expect("event");

    let from = Period::Day.ranking_start(today);
    let board = assign_positions(store.period_scores(from, today).await.expect("scores"));

    assert_eq!(board.len(), 3, "idle salesperson must be absent");
    assert_eq!(board[0].salesperson_id, b);
    assert_eq!(board[0].position, 1);
    assert_eq!(board[0].period_points, 300);
    // 150-point tie resolves by id ascending.
    assert_eq!(board[1].salesperson_id, a);
    assert_eq!(board[2].salesperson_id, c);

    // The week window picks up yesterday as well.
    let from = Period::Week.ranking_start(today);
    let board = assign_positions(store.period_scores(from, today).await.expect("scores"));
    let charlie = board.iter().find(|e| e.salesperson_id == c).expect("charlie");
    if today.signed_duration_since(from).num_days() >= 1 {
        assert_eq!(charlie.period_points, 1150);
    }
}

#[tokio::test]
async fn concurrent_writers_lose_no_updates() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Hammered", 21).await;

    const WRITERS: usize = 10;
    const ACTIONS_PER_WRITER: usize = 3;

    let mut handles = Vec::new();
    for _ in 0..WRITERS {
        let store = Arc::clone(&store);
        handles.push(tokio::spawn(async move {
            for _ in 0..ACTIONS_PER_WRITER {
                store
                    .record_action(&lead_record(id, 1))
                    .await
                    .expect("concurrent record");
            }
        }));
    }
    futures::future::join_all(handles)
        .await
        .into_iter()
        .for_each(|h| h.expect("writer task"));

    let sp = store.salesperson(id).await.expect("fetch");
    assert_eq!(
        sp.xp_total,
        (WRITERS * ACTIONS_PER_WRITER * 2) as i64,
        "every increment must land exactly once"
    );
    let events = store.point_events(id).await.expect("events");
    assert_eq!(events.len(), WRITERS * ACTIONS_PER_WRITER);
}

#[tokio::test]
async fn badge_grants_are_idempotent() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Badger", 31).await;

    let badge = NewBadge {
        salesperson_id: id,
        name: "Hunter Completo".to_string(),
        icon: "🏹".to_string(),
        description: None,
        rarity: Rarity::Epic,
    };
    assert!(store.grant_badge(&badge).await.expect("first grant"));
    assert!(!store.grant_badge(&badge).await.expect("second grant"));
    assert_eq!(store.badge_count(id).await.expect("count"), 1);
}

#[tokio::test]
async fn tally_upserts_fold_and_recompute_average_ticket() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Tally", 41).await;
    let today = Local::now().date_naive();

    store
        .upsert_tally(
            id,
            today,
            &TallyDelta {
                sales: 1,
                revenue: 4000.0,
                points: 50,
                ..TallyDelta::default()
            },
        )
        .await
        .expect("first upsert");
    store
        .upsert_tally(
            id,
            today,
            &TallyDelta {
                sales: 1,
                revenue: 8000.0,
                points: 50,
                leads: 3,
                ..TallyDelta::default()
            },
        )
        .await
        .expect("second upsert");

    let tally = store
        .tally_for_day(id, today)
        .await
        .expect("query")
        .expect("row");
    assert_eq!(tally.sales, 2);
    assert_eq!(tally.revenue, 12000.0);
    assert_eq!(tally.avg_ticket, 6000.0);
    assert_eq!(tally.leads, 3);
    assert_eq!(tally.points, 100);

    let sums = store.tally_sums(id, today, today).await.expect("sums");
    assert_eq!(sums.sales, 2);
    assert_eq!(sums.revenue, 12000.0);
}

#[tokio::test]
async fn coach_message_log_flow() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Coached", 51).await;

    let message_id = store
        .insert_coach_message(id, MessageKind::Motivation, "Bom dia! 🔥")
        .await
        .expect("insert");

    let pending = store.pending_messages().await.expect("pending");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, message_id);
    assert!(!pending[0].sent);

    store.mark_message_sent(message_id).await.expect("mark sent");
    assert!(store.pending_messages().await.expect("pending").is_empty());

    let err = store.mark_message_sent(9999).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
async fn conversation_scores_average_over_analyzed_only() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Talker", 61).await;

    let mut analysis = ConversationAnalysis {
        stage_score: 8.0,
        quality_score: 8.0,
        objection_score: 8.0,
        outcome_score: 8.0,
        overall_score: 8.0,
        stages_met: vec!["saudacao".to_string()],
        improvements: vec![],
        outcome: "scheduled".to_string(),
        summary: None,
    };

    let new = |happened_at| NewConversation {
        salesperson_id: id,
        customer_name: Some("Cliente 1001".to_string()),
        customer_phone: None,
        channel: Channel::Whatsapp,
        transcript: "Vendedor: Bom dia!".to_string(),
        duration_secs: None,
        happened_at,
    };

    store
        .insert_conversation(&new(Utc::now() - Duration::hours(2)), &analysis)
        .await
        .expect("insert");

    analysis.overall_score = 6.0;
    store
        .insert_conversation(&new(Utc::now() - Duration::hours(1)), &analysis)
        .await
        .expect("insert");

    // A fallback analysis is stored but excluded from the average.
    let fallback = ConversationAnalysis::fallback("análise automática indisponível");
    store
        .insert_conversation(&new(Utc::now()), &fallback)
        .await
        .expect("insert");

    let avg = store
        .average_conversation_score(id)
        .await
        .expect("avg")
        .expect("some");
    assert_eq!(avg, 7.0);

    let recent = store.recent_conversations(id, 10).await.expect("recent");
    assert_eq!(recent.len(), 3);
    // Newest first.
    assert!(!recent[0].analyzed);
    assert_eq!(recent[1].analysis.overall_score, 6.0);
}

#[tokio::test]
async fn wipe_clears_every_table() {
    let (_dir, store, _rules) = temp_store().await;
    let id = add_salesperson(&*store, "Wiped", 71).await;
    store.record_action(&lead_record(id, 2)).await.expect("record");

    store.wipe().await.expect("wipe");

    assert!(store.active_salespeople().await.expect("list").is_empty());
    let err = store.salesperson(id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}
