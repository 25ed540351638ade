//! Axum route handlers for the History API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::document::{Quotation, TourKind, TourPlan};
use crate::errors::AppError;
use crate::history::store::{HistorySummary, HISTORY_CAP};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LoadedRecord {
    pub id: Uuid,
    pub plan: TourPlan,
    pub kind: TourKind,
    pub quotation: Option<Quotation>,
    pub editing: bool,
}

/// GET /api/v1/history
///
/// Newest first.
pub async fn handle_list_history(State(state): State<AppState>) -> Json<Vec<HistorySummary>> {
    let records = state.history.list_recent(HISTORY_CAP).await;
    Json(records.iter().map(HistorySummary::from).collect())
}

/// POST /api/v1/history
///
/// Saves the current plan, its kind and its quotation. A record with the same title
/// is replaced in place.
pub async fn handle_save_history(
    State(state): State<AppState>,
) -> Result<Json<HistorySummary>, AppError> {
    let (plan, kind, quotation) = {
        let session = state.session.read().await;
        (session.plan()?.clone(), session.kind, session.quotation.clone())
    };
    let record = state.history.upsert(plan, kind, quotation).await?;
    info!("Saved '{}' to history ({})", record.plan.main_title, record.id);
    Ok(Json(HistorySummary::from(&record)))
}

/// POST /api/v1/history/:id/load
///
/// Restores plan, kind and quotation into the session and enters edit mode.
pub async fn handle_load_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LoadedRecord>, AppError> {
    let record = state
        .history
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("History record {id} not found")))?;

    state.session.write().await.replace_plan(
        record.plan.clone(),
        record.kind,
        record.quotation.clone(),
    );
    info!("Loaded '{}' from history", record.plan.main_title);

    Ok(Json(LoadedRecord {
        id: record.id,
        plan: record.plan,
        kind: record.kind,
        quotation: record.quotation,
        editing: true,
    }))
}

/// DELETE /api/v1/history/:id
pub async fn handle_delete_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.history.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("History record {id} not found")))
    }
}
