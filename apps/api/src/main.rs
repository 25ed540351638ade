mod config;
mod document;
mod errors;
mod export;
mod generation;
mod history;
mod ingest;
mod layout;
mod llm_client;
mod render;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::images::{GeminiImageGenerator, PlaceholderImages, WithPlaceholder};
use crate::generation::{ClaudeItineraryAi, ImageGenerator};
use crate::history::JsonFileHistory;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SharedSession;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Itinerary API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize image generator (Gemini with placeholder fallback, or placeholders only)
    let images: Arc<dyn ImageGenerator> = match &config.gemini_api_key {
        Some(key) => {
            info!("Image generation: Gemini with placeholder fallback");
            Arc::new(WithPlaceholder::new(GeminiImageGenerator::new(key.clone())))
        }
        None => {
            info!("Image generation: GEMINI_API_KEY not set, using placeholders");
            Arc::new(PlaceholderImages)
        }
    };

    // Initialize history store
    let history = Arc::new(JsonFileHistory::open(&config.history_path).await);

    // Build app state
    let state = AppState {
        config: config.clone(),
        session: SharedSession::default(),
        ai: Arc::new(ClaudeItineraryAi::new(llm)),
        images,
        history,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
