//! Axum route handlers for the Export API.

use axum::{
    extract::{Query, State},
    http::header,
    response::{Html as HtmlResponse, IntoResponse},
};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::export::download::build_download;
use crate::export::print::build_print_page;
use crate::layout::ViewportClass;
use crate::render::{render_document, RenderMode, RenderOptions, RenderedDocument};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// Mode to export. Defaults to the session's current mode.
    #[serde(default)]
    pub mode: Option<RenderMode>,
}

/// Freezes the current plan for export: no edit hooks, no page guides, print grid.
async fn freeze(state: &AppState, mode: Option<RenderMode>) -> Result<RenderedDocument, AppError> {
    let session = state.session.read().await;
    let plan = session.plan()?;
    let mode = mode.unwrap_or(session.mode);
    let options = RenderOptions {
        editable: false,
        page_guides: false,
        viewport: ViewportClass::Print,
        banner_src: state.config.banner_url.as_deref(),
    };
    Ok(render_document(
        plan,
        session.kind,
        mode,
        Some(session.negotiator.heights()),
        &options,
    ))
}

/// GET /api/v1/export/download?mode=full|summary
///
/// Standalone HTML attachment named `{title}_{label}.html`. Full-mode exports carry
/// the quotation table when a quotation exists.
pub async fn handle_download(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let doc = freeze(&state, query.mode).await?;
    let quotation = state.session.read().await.quotation.clone();
    let artifact = build_download(&doc, quotation.as_ref());
    info!(
        "Exported '{}' ({} bytes)",
        artifact.filename,
        artifact.body.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, artifact.content_disposition()),
        ],
        artifact.body,
    ))
}

/// GET /api/v1/export/print?mode=full|summary
///
/// Self-printing page opened by the direct-print launcher in a new window. It waits
/// for its images, settles, prints and closes itself.
pub async fn handle_print_page(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<HtmlResponse<String>, AppError> {
    let doc = freeze(&state, query.mode).await?;
    Ok(HtmlResponse(build_print_page(&doc, state.config.print_settle)))
}
