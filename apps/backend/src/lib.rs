pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::drill::SessionRegistry;
use crate::services::genai::GenAiClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub genai: GenAiClient,
    pub sessions: SessionRegistry,
}

/// Build the router with all routes.
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/api/sessions", post(routes::sessions::create))
        .route(
            "/api/sessions/:id",
            get(routes::sessions::get).delete(routes::sessions::delete),
        )
        .route("/api/sessions/:id/events", post(routes::sessions::apply_event))
        .route("/api/sessions/:id/compose", post(routes::sessions::compose))
        .route("/api/sessions/:id/speech", post(routes::sessions::speech))
        .route(
            "/api/sessions/:id/speech/complete",
            post(routes::sessions::speech_complete),
        )
        .route("/api/sessions/:id/article", post(routes::study::article))
        .route("/api/sessions/:id/writing", post(routes::study::writing));

    let history_routes = Router::new()
        .route("/api/history", get(routes::history::list))
        .route(
            "/api/history/:id",
            get(routes::history::get).delete(routes::history::delete),
        )
        .route("/api/history/:id/practice", post(routes::history::practice));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/vocabulary/generate", post(routes::vocabulary::generate))
        .route("/api/vocabulary/custom", post(routes::vocabulary::custom))
        .merge(session_routes)
        .merge(history_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let genai = GenAiClient::new(config.genai.clone());
    if !genai.is_available() {
        tracing::warn!("GEMINI_API_KEY is not set; generative endpoints will fail");
    }

    let state = AppState {
        db: Arc::new(db),
        genai,
        sessions: SessionRegistry::with_idle_ttl(config.session_idle_ttl),
    };

    let app = build_router(state);
    let addr = config.bind_addr();

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
