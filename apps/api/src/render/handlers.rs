//! Axum route handlers for the Render and Session API.

use axum::{
    extract::{Query, State},
    response::Html as HtmlResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::TourKind;
use crate::errors::AppError;
use crate::export::print::{launcher_script, toolbar};
use crate::layout::ViewportClass;
use crate::render::markup::{
    document_shell, BASE_STYLES, COMMIT_ON_BLUR_SCRIPT, PAGE_GUIDE_DRAG_SCRIPT,
};
use crate::render::{render_document, RenderMode, RenderOptions};
use crate::session::Session;
use crate::state::AppState;

pub const DOWNLOAD_PATH: &str = "/api/v1/export/download";
pub const PRINT_PATH: &str = "/api/v1/export/print";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct RenderQuery {
    /// Width class of the viewing client. Defaults to narrow.
    #[serde(default)]
    pub viewport: ViewportClass,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: RenderMode,
    /// Keep the current page heights when entering Summary mode.
    #[serde(default)]
    pub carry_over: bool,
}

#[derive(Debug, Deserialize)]
pub struct EditingRequest {
    pub editing: bool,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub has_plan: bool,
    pub kind: TourKind,
    pub mode: RenderMode,
    pub editing: bool,
    pub has_quotation: bool,
    pub generating: bool,
}

fn session_view(session: &Session, generating: bool) -> SessionView {
    SessionView {
        has_plan: session.plan.is_some(),
        kind: session.kind,
        mode: session.mode,
        editing: session.editing,
        has_quotation: session.quotation.is_some(),
        generating,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/render?viewport=narrow|wide|print
///
/// The current plan in the current mode as a full HTML page: Download and Print
/// toolbar, the document, and the edit and drag scripts when they apply.
pub async fn handle_render(
    State(state): State<AppState>,
    Query(query): Query<RenderQuery>,
) -> Result<HtmlResponse<String>, AppError> {
    let session = state.session.read().await;
    let plan = session.plan()?;
    let summary = session.mode == RenderMode::Summary;

    let options = RenderOptions {
        editable: session.editing,
        page_guides: summary,
        viewport: query.viewport,
        banner_src: state.config.banner_url.as_deref(),
    };
    let doc = render_document(
        plan,
        session.kind,
        session.mode,
        Some(session.negotiator.heights()),
        &options,
    );

    let launcher = launcher_script(PRINT_PATH);
    let mut scripts = vec![launcher.as_str()];
    if session.editing {
        scripts.push(COMMIT_ON_BLUR_SCRIPT);
    }
    if summary {
        scripts.push(PAGE_GUIDE_DRAG_SCRIPT);
    }

    let body = format!("{}{}", toolbar(DOWNLOAD_PATH), doc.markup);
    Ok(HtmlResponse(document_shell(
        &doc.title,
        &[BASE_STYLES],
        &body,
        &scripts,
    )))
}

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionView> {
    let session = state.session.read().await;
    Json(session_view(&session, state.session.is_generating()))
}

/// PUT /api/v1/session/mode
///
/// Request: `{ "mode": "summary", "carry_over": false }`
pub async fn handle_set_mode(
    State(state): State<AppState>,
    Json(request): Json<ModeRequest>,
) -> Json<SessionView> {
    let mut session = state.session.write().await;
    session.set_mode(request.mode, request.carry_over);
    info!("Render mode set to {:?}", request.mode);
    Json(session_view(&session, state.session.is_generating()))
}

/// PUT /api/v1/session/editing
///
/// Request: `{ "editing": true }`
pub async fn handle_set_editing(
    State(state): State<AppState>,
    Json(request): Json<EditingRequest>,
) -> Json<SessionView> {
    let mut session = state.session.write().await;
    session.editing = request.editing;
    Json(session_view(&session, state.session.is_generating()))
}
