//! questline-server: the gamification API server.
//!
//! Wires the SQLite store, the rule tables, the outbound clients, and the
//! HTTP router, then serves until interrupted.
//!
//! ## Configuration
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 5200
//!
//! storage:
//!   path: questline.db
//!
//! messaging:
//!   base_url: https://evolution.example.com
//!   api_key: "..."
//!   instance: team-main
//!
//! coach:
//!   api_key: "..."
//!   model: gpt-4o
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};

use questline::api::{build_router, AppState};
use questline::clients::{DisabledSender, EvolutionSender, OpenAiGenerator};
use questline::config::Config;
use questline::interfaces::{MessageSender, TextGenerator};
use questline::services::{
    AnalysisService, CoachService, DispatchService, GamificationService,
};
use questline::storage::init_storage;
use questline::utils::bootstrap;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bootstrap::init_tracing();

    let config_path = bootstrap::parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Starting questline-server");

    let rules = Arc::new(config.rules.clone());
    let store = init_storage(&config.storage, Arc::clone(&rules)).await?;

    let generator: Arc<dyn TextGenerator> =
        Arc::new(OpenAiGenerator::new(config.coach.clone())?);

    let sender: Arc<dyn MessageSender> = if config.messaging.base_url.is_empty() {
        warn!("messaging gateway not configured; deliveries will fail until it is");
        Arc::new(DisabledSender)
    } else {
        Arc::new(EvolutionSender::new(config.messaging.clone())?)
    };

    let gamification = GamificationService::new(Arc::clone(&store), Arc::clone(&rules));
    let coach = CoachService::new(
        Arc::clone(&store),
        Arc::clone(&generator),
        gamification.clone(),
        Arc::clone(&rules),
    );
    let dispatch = DispatchService::new(Arc::clone(&store), sender);
    let analysis = AnalysisService::new(Arc::clone(&store), generator);

    let state = Arc::new(AppState {
        gamification,
        coach,
        dispatch,
        analysis,
    });
    let app = build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down...");
        })
        .await?;

    info!("Shutdown complete");
    Ok(())
}
