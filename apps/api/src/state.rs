use std::sync::Arc;

use crate::config::Config;
use crate::generation::{ImageGenerator, ItineraryAi};
use crate::history::HistoryStore;
use crate::session::SharedSession;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The operator's editing session.
    pub session: SharedSession,
    /// Plan and quotation generation. Default: Claude via `LlmClient`.
    pub ai: Arc<dyn ItineraryAi>,
    /// Per-day images. Default: Gemini with placeholder fallback, or placeholders only.
    pub images: Arc<dyn ImageGenerator>,
    pub history: Arc<dyn HistoryStore>,
}
