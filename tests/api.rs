//! HTTP surface tests: the axum router over a real store with scripted
//! outbound clients.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Local;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use questline::api::{build_router, AppState};
use questline::clients::mock::{RecordingSender, ScriptedGenerator};
use questline::domain::{ActionKind, NewPointEvent};
use questline::interfaces::{GameStore, MessageSender, TextGenerator};
use questline::services::{
    AnalysisService, CoachService, DispatchService, GamificationService,
};

use common::{add_salesperson, temp_store};

struct TestApp {
    _dir: TempDir,
    router: Router,
    store: Arc<dyn GameStore>,
    generator: Arc<ScriptedGenerator>,
    sender: Arc<RecordingSender>,
}

async fn test_app() -> TestApp {
    let (dir, store, rules) = temp_store().await;
    let generator = Arc::new(ScriptedGenerator::new());
    let sender = Arc::new(RecordingSender::new());

    let gamification = GamificationService::new(Arc::clone(&store), Arc::clone(&rules));
    let coach = CoachService::new(
        Arc::clone(&store),
        Arc::clone(&generator) as Arc<dyn TextGenerator>,
        gamification.clone(),
        Arc::clone(&rules),
    );
    let dispatch = DispatchService::new(
        Arc::clone(&store),
        Arc::clone(&sender) as Arc<dyn MessageSender>,
    );
    let analysis = AnalysisService::new(
        Arc::clone(&store),
        Arc::clone(&generator) as Arc<dyn TextGenerator>,
    );

    let router = build_router(Arc::new(AppState {
        gamification,
        coach,
        dispatch,
        analysis,
    }));

    TestApp {
        _dir: dir,
        router,
        store,
        generator,
        sender,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1 << 20).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn add_rep(app: &TestApp, name: &str, suffix: u32) -> i64 {
    add_salesperson(&*app.store, name, suffix).await
}

#[tokio::test]
async fn health_reports_online() {
    let app = test_app().await;
    let (status, body) = get(&app.router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "online");
    assert_eq!(body["service"], "questline");
}

#[tokio::test]
async fn roster_includes_level_bounds() {
    let app = test_app().await;
    add_rep(&app, "Diego Santos", 1).await;

    let (status, body) = get(&app.router, "/api/salespeople").await;
    assert_eq!(status, StatusCode::OK);
    let roster = body.as_array().expect("array");
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["name"], "Diego Santos");
    assert_eq!(roster[0]["level"], 1);
    assert_eq!(roster[0]["level_title"], "Prospector I");
    assert_eq!(roster[0]["xp_min"], 0);
    assert_eq!(roster[0]["xp_max"], 100);
}

#[tokio::test]
async fn record_action_requires_id_and_kind() {
    let app = test_app().await;

    let (status, body) = post(&app.router, "/api/actions", json!({ "quantity": 3 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("salesperson_id"));

    let (status, _) = post(
        &app.router,
        "/api/actions",
        json!({ "salesperson_id": 1, "quantity": 3 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn record_action_unknown_salesperson_is_404() {
    let app = test_app().await;
    let (status, _) = post(
        &app.router,
        "/api/actions",
        json!({ "salesperson_id": 4242, "action_kind": "lead_reached" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn record_action_awards_points_and_feedback() {
    let app = test_app().await;
    let id = add_rep(&app, "Mariana", 2).await;

    let (status, body) = post(
        &app.router,
        "/api/actions",
        json!({
            "salesperson_id": id,
            "action_kind": "lead_reached",
            "quantity": 5
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points_awarded"], 10);
    assert_eq!(body["xp_total"], 10);
    assert_eq!(body["level"]["level"], 1);
    assert_eq!(body["level"]["leveled_up"], false);
    let feedback = body["coach_message"].as_str().expect("feedback");
    assert!(feedback.contains("+10 XP"));
    assert!(feedback.contains("Lead registrado"));
}

#[tokio::test]
async fn record_sale_with_high_ticket_context() {
    let app = test_app().await;
    let id = add_rep(&app, "Rafael", 3).await;

    let (status, body) = post(
        &app.router,
        "/api/actions",
        json!({
            "salesperson_id": id,
            "action_kind": "sale",
            "quantity": 1,
            "context": { "ticket_value": 6000.0 }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points_awarded"], 160);
}

#[tokio::test]
async fn ranking_sorts_and_defaults_to_day() {
    let app = test_app().await;
    let a = add_rep(&app, "Alpha", 11).await;
    let b = add_rep(&app, "Bravo", 12).await;
    let today = Local::now().date_naive();

    for (id, points) in [(a, 150), (b, 300)] {
        app.store
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

    let (status, body) = get(&app.router, "/api/ranking").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "day");
    let board = body["ranking"].as_array().expect("array");
    assert_eq!(board.len(), 2);
    assert_eq!(board[0]["salesperson_id"], b);
    assert_eq!(board[0]["position"], 1);
    assert_eq!(board[1]["salesperson_id"], a);

    let (status, body) = get(&app.router, "/api/ranking?period=week").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "week");
}

#[tokio::test]
async fn detail_and_stats_are_404_for_unknown_id() {
    let app = test_app().await;
    let (status, _) = get(&app.router, "/api/salespeople/777").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(&app.router, "/api/salespeople/777/stats?period=week").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn detail_carries_missions_badges_and_stats() {
    let app = test_app().await;
    let id = add_rep(&app, "Carlos", 21).await;

    post(
        &app.router,
        "/api/actions",
        json!({ "salesperson_id": id, "action_kind": "sale", "quantity": 1 }),
    )
    .await;

    let (status, body) = get(&app.router, &format!("/api/salespeople/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["salesperson"]["id"], id);
    assert_eq!(body["sales"], 1);
    assert_eq!(body["points"], 50);
    assert!(body["missions"].as_array().unwrap().is_empty());
    assert!(body["badge_list"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn team_overview_counts_today() {
    let app = test_app().await;
    let id = add_rep(&app, "Ana", 31).await;

    post(
        &app.router,
        "/api/actions",
        json!({ "salesperson_id": id, "action_kind": "lead_reached", "quantity": 7 }),
    )
    .await;

    let (status, body) = get(&app.router, "/api/stats/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_salespeople"], 1);
    assert_eq!(body["today"]["leads"], 7);
}

#[tokio::test]
async fn coach_motivation_uses_generator() {
    let app = test_app().await;
    let id = add_rep(&app, "Juliana", 41).await;
    app.generator.push_response("Bom dia, Juliana! Hoje são 40 leads. Bora! 🔥");

    let (status, body) = get(&app.router, &format!("/api/coach/motivation/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        "Bom dia, Juliana! Hoje são 40 leads. Bora! 🔥"
    );

    let prompts = app.generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Juliana"));
    assert!(prompts[0].contains("40 leads"));
}

#[tokio::test]
async fn coach_alert_is_null_at_or_above_threshold() {
    let app = test_app().await;
    let id = add_rep(&app, "Pedro", 42).await;

    // 28 leads of 40 is exactly 70%: no alert, no generator call.
    post(
        &app.router,
        "/api/actions",
        json!({ "salesperson_id": id, "action_kind": "lead_reached", "quantity": 28 }),
    )
    .await;

    let (status, body) = get(&app.router, &format!("/api/coach/alert/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_null());
    assert!(app.generator.prompts().is_empty());
}

#[tokio::test]
async fn coach_alert_fires_below_threshold() {
    let app = test_app().await;
    let id = add_rep(&app, "Camila", 43).await;
    app.generator.push_response("⏰ Faltam 35 leads para a meta. Acelera!");

    post(
        &app.router,
        "/api/actions",
        json!({ "salesperson_id": id, "action_kind": "lead_reached", "quantity": 5 }),
    )
    .await;

    let (status, body) = get(&app.router, &format!("/api/coach/alert/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "⏰ Faltam 35 leads para a meta. Acelera!");
}

#[tokio::test]
async fn coach_taunt_needs_two_ranked() {
    let app = test_app().await;
    let id = add_rep(&app, "Solo", 44).await;

    post(
        &app.router,
        "/api/actions",
        json!({ "salesperson_id": id, "action_kind": "conversion" }),
    )
    .await;

    let (status, body) = get(&app.router, &format!("/api/coach/taunt/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_null());
}

#[tokio::test]
async fn coach_taunt_congratulates_the_leader() {
    let app = test_app().await;
    let leader = add_rep(&app, "Líder", 45).await;
    let chaser = add_rep(&app, "Perseguidor", 46).await;

    post(
        &app.router,
        "/api/actions",
        json!({ "salesperson_id": leader, "action_kind": "sale" }),
    )
    .await;
    post(
        &app.router,
        "/api/actions",
        json!({ "salesperson_id": chaser, "action_kind": "lead_reached" }),
    )
    .await;

    let (status, body) = get(&app.router, &format!("/api/coach/taunt/{leader}")).await;
    assert_eq!(status, StatusCode::OK);
    let message = body["message"].as_str().expect("message");
    assert!(message.contains("#1"));
    assert!(message.contains("48 pontos"));

    let (_, body) = get(&app.router, &format!("/api/coach/taunt/{chaser}")).await;
    let message = body["message"].as_str().expect("message");
    assert!(message.contains("Líder"));
    assert!(message.contains("#2"));
}

#[tokio::test]
async fn coach_report_summarizes_the_day() {
    let app = test_app().await;
    let id = add_rep(&app, "Fernanda", 47).await;

    post(
        &app.router,
        "/api/actions",
        json!({
            "salesperson_id": id,
            "action_kind": "sale",
            "quantity": 1,
            "context": { "ticket_value": 4000.0 }
        }),
    )
    .await;

    let (status, body) = get(&app.router, &format!("/api/coach/report/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let message = body["message"].as_str().expect("message");
    assert!(message.contains("Resultado do dia, Fernanda"));
    assert!(message.contains("1 vendas"));
    assert!(message.contains("#1 no ranking"));
}

#[tokio::test]
async fn send_message_validates_and_delivers() {
    let app = test_app().await;
    let id = add_rep(&app, "Gustavo", 51).await;

    let (status, _) = post(&app.router, "/api/messages/send", json!({ "message": "oi" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app.router,
        "/api/messages/send",
        json!({ "salesperson_id": 999, "message": "oi" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = post(
        &app.router,
        "/api/messages/send",
        json!({ "salesperson_id": id, "message": "Parabéns pela venda!" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["delivered"], true);

    let sent = app.sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "551199990051");
    assert_eq!(sent[0].1, "Parabéns pela venda!");
}

#[tokio::test]
async fn flush_delivers_pending_coach_messages() {
    let app = test_app().await;
    let id = add_rep(&app, "Renata", 52).await;

    // The report endpoint queues a pending message.
    get(&app.router, &format!("/api/coach/report/{id}")).await;

    let (status, body) = post(&app.router, "/api/messages/flush", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sent"], 1);
    assert_eq!(body["failed"], 0);
    assert_eq!(app.sender.sent().len(), 1);

    // Nothing left to send on the second flush.
    let (_, body) = post(&app.router, "/api/messages/flush", json!({})).await;
    assert_eq!(body["sent"], 0);
}

#[tokio::test]
async fn conversation_analysis_round_trip() {
    let app = test_app().await;
    let id = add_rep(&app, "Beatriz", 61).await;
    app.generator.push_response(
        r#"```json
{
  "stage_score": 8.5,
  "quality_score": 9.0,
  "objection_score": 7.5,
  "outcome_score": 8.0,
  "overall_score": 8.25,
  "stages_met": ["saudacao", "descoberta"],
  "improvements": ["Follow-up mais claro"],
  "outcome": "scheduled",
  "summary": "Cliente agendou demonstração."
}
```"#,
    );

    let (status, body) = post(
        &app.router,
        "/api/conversations",
        json!({
            "salesperson_id": id,
            "transcript": "Vendedor: Bom dia! Cliente: Olá."
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analyzed"], true);
    assert_eq!(body["overall_score"], 8.25);
    assert_eq!(body["outcome"], "scheduled");

    let (status, body) =
        get(&app.router, &format!("/api/salespeople/{id}/conversations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_score"], 8.25);
    assert_eq!(body["total_analyzed"], 1);
    assert_eq!(body["recent"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn conversation_analysis_degrades_on_generator_failure() {
    let app = test_app().await;
    let id = add_rep(&app, "Roberto", 62).await;
    app.generator.push_error("model overloaded");

    let (status, body) = post(
        &app.router,
        "/api/conversations",
        json!({
            "salesperson_id": id,
            "transcript": "Vendedor: Boa tarde!"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["analyzed"], false);
    assert_eq!(body["outcome"], "unscored");
    assert_eq!(body["overall_score"], 5.0);
}
