//! The JSON HTTP surface over the operation services.

mod error;
pub mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::services::{AnalysisService, CoachService, DispatchService, GamificationService};

/// Shared application state injected into every handler.
pub struct AppState {
    pub gamification: GamificationService,
    pub coach: CoachService,
    pub dispatch: DispatchService,
    pub analysis: AnalysisService,
}

/// Build the API router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/salespeople", get(handlers::list_salespeople))
        .route("/api/salespeople/:id", get(handlers::salesperson_detail))
        .route("/api/salespeople/:id/stats", get(handlers::salesperson_stats))
        .route(
            "/api/salespeople/:id/conversations",
            get(handlers::conversation_summary),
        )
        .route("/api/ranking", get(handlers::ranking))
        .route("/api/actions", post(handlers::record_action))
        .route("/api/stats/overview", get(handlers::team_overview))
        .route("/api/coach/motivation/:id", get(handlers::coach_motivation))
        .route("/api/coach/alert/:id", get(handlers::coach_alert))
        .route("/api/coach/taunt/:id", get(handlers::coach_taunt))
        .route("/api/coach/report/:id", get(handlers::coach_report))
        .route("/api/messages/send", post(handlers::send_message))
        .route("/api/messages/flush", post(handlers::flush_messages))
        .route("/api/conversations", post(handlers::analyze_conversation))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
