//! Axum route handlers for the Page Heights API (Summary-mode page guides).

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::layout::page_heights::DragSession;
use crate::layout::PageBreakNegotiator;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Heights and their cumulative boundary offsets, both in millimetres.
#[derive(Debug, Serialize)]
pub struct PageHeightsView {
    pub heights: Vec<u32>,
    pub offsets: Vec<u32>,
    pub drag: DragSession,
}

impl From<&PageBreakNegotiator> for PageHeightsView {
    fn from(negotiator: &PageBreakNegotiator) -> Self {
        PageHeightsView {
            heights: negotiator.heights().entries().to_vec(),
            offsets: negotiator.heights().offsets(),
            drag: negotiator.drag(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BeginDragRequest {
    pub index: usize,
    pub pointer_px: f64,
    pub container_width_px: f64,
}

#[derive(Debug, Deserialize)]
pub struct MoveDragRequest {
    pub index: usize,
    pub pointer_px: f64,
}

#[derive(Debug, Deserialize)]
pub struct UniformRequest {
    pub height_mm: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/page-heights
pub async fn handle_get_page_heights(State(state): State<AppState>) -> Json<PageHeightsView> {
    let session = state.session.read().await;
    Json(PageHeightsView::from(&session.negotiator))
}

/// POST /api/v1/page-heights/drag/begin
pub async fn handle_begin_drag(
    State(state): State<AppState>,
    Json(request): Json<BeginDragRequest>,
) -> Result<Json<PageHeightsView>, AppError> {
    let mut session = state.session.write().await;
    session.negotiator.begin_drag(
        request.index,
        request.pointer_px,
        request.container_width_px,
    )?;
    Ok(Json(PageHeightsView::from(&session.negotiator)))
}

/// POST /api/v1/page-heights/drag/move
///
/// Only the dragged entry changes; later boundaries shift with it.
pub async fn handle_move_drag(
    State(state): State<AppState>,
    Json(request): Json<MoveDragRequest>,
) -> Result<Json<PageHeightsView>, AppError> {
    let mut session = state.session.write().await;
    let height = session
        .negotiator
        .update_drag(request.index, request.pointer_px)?;
    debug!("Page {} height now {height}mm", request.index);
    Ok(Json(PageHeightsView::from(&session.negotiator)))
}

/// POST /api/v1/page-heights/drag/end
///
/// Always succeeds, even with no drag in progress.
pub async fn handle_end_drag(State(state): State<AppState>) -> Json<PageHeightsView> {
    let mut session = state.session.write().await;
    if let Some(index) = session.negotiator.end_drag() {
        debug!("Drag on boundary {index} released");
    }
    Json(PageHeightsView::from(&session.negotiator))
}

/// PUT /api/v1/page-heights/uniform
///
/// Request: `{ "height_mm": 297 }`. The value is clamped to 50–600mm.
pub async fn handle_set_uniform(
    State(state): State<AppState>,
    Json(request): Json<UniformRequest>,
) -> Json<PageHeightsView> {
    let mut session = state.session.write().await;
    session.negotiator.set_all_uniform(request.height_mm);
    Json(PageHeightsView::from(&session.negotiator))
}
