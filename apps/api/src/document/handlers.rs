//! Axum route handlers for the Itinerary and Quotation editing API.
//!
//! Every handler commits through `Session::apply`, so a rejected edit leaves the
//! current snapshot as it was. `:day` is the 0-based day index throughout.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::document::edit::{
    add_images, add_timeline_item, commit_edit, remove_image, remove_timeline_item,
    set_image_count, update_day_field, update_plan_field, update_timeline_item, DayField,
    EditTarget, PlanField,
};
use crate::document::model::MAX_IMAGES_PER_DAY;
use crate::document::quotation::QuotationEdit;
use crate::document::{DayPlan, Quotation, TourKind, TourPlan};
use crate::errors::AppError;
use crate::state::AppState;

const NO_QUOTATION_MESSAGE: &str = "尚未產生報價單。";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    pub plan: TourPlan,
    pub kind: TourKind,
}

#[derive(Debug, Serialize)]
pub struct DayResponse {
    pub day_index: usize,
    pub day: DayPlan,
}

#[derive(Debug, Deserialize)]
pub struct TimelineItemRequest {
    pub activity: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageCountRequest {
    pub count: u8,
}

#[derive(Debug, Deserialize)]
pub struct CommitRequest {
    pub target: String,
    pub value: String,
}

fn day_response(plan: &TourPlan, day_index: usize) -> Result<Json<DayResponse>, AppError> {
    let day = plan
        .day(day_index)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Day index {day_index} not found")))?;
    Ok(Json(DayResponse { day_index, day }))
}

/// `data:{mime};base64,{payload}`
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

// ────────────────────────────────────────────────────────────────────────────
// Plan
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/itinerary
pub async fn handle_get_itinerary(
    State(state): State<AppState>,
) -> Result<Json<ItineraryResponse>, AppError> {
    let session = state.session.read().await;
    Ok(Json(ItineraryResponse {
        plan: session.plan()?.clone(),
        kind: session.kind,
    }))
}

/// PATCH /api/v1/itinerary
///
/// Request: `{ "field": "main_title", "value": "..." }`
pub async fn handle_update_plan(
    State(state): State<AppState>,
    Json(field): Json<PlanField>,
) -> Result<Json<TourPlan>, AppError> {
    let mut session = state.session.write().await;
    let plan = session.apply(|p| Ok(update_plan_field(p, field)))?;
    Ok(Json(plan.clone()))
}

/// POST /api/v1/itinerary/commit
///
/// Commit-on-blur binding posted by inline-editable elements.
/// Request: `{ "target": "day.0.title", "value": "..." }`
pub async fn handle_commit(
    State(state): State<AppState>,
    Json(request): Json<CommitRequest>,
) -> Result<Json<TourPlan>, AppError> {
    let target: EditTarget = request.target.parse()?;
    let mut session = state.session.write().await;
    if target.current_value(session.plan()?) == Some(request.value.as_str()) {
        debug!("Commit to {target} unchanged");
        return Ok(Json(session.plan()?.clone()));
    }
    let plan = session.apply(|p| commit_edit(p, target, &request.value))?;
    Ok(Json(plan.clone()))
}

// ────────────────────────────────────────────────────────────────────────────
// Day
// ────────────────────────────────────────────────────────────────────────────

/// PATCH /api/v1/itinerary/days/:day
///
/// Request: `{ "field": "image_position", "value": "bottom" }`
pub async fn handle_update_day(
    State(state): State<AppState>,
    Path(day_index): Path<usize>,
    Json(field): Json<DayField>,
) -> Result<Json<DayResponse>, AppError> {
    let mut session = state.session.write().await;
    let plan = session.apply(|p| update_day_field(p, day_index, field))?;
    day_response(plan, day_index)
}

/// POST /api/v1/itinerary/days/:day/timeline
pub async fn handle_add_timeline_item(
    State(state): State<AppState>,
    Path(day_index): Path<usize>,
) -> Result<Json<DayResponse>, AppError> {
    let mut session = state.session.write().await;
    let plan = session.apply(|p| add_timeline_item(p, day_index))?;
    day_response(plan, day_index)
}

/// PATCH /api/v1/itinerary/days/:day/timeline/:item
pub async fn handle_update_timeline_item(
    State(state): State<AppState>,
    Path((day_index, item_index)): Path<(usize, usize)>,
    Json(request): Json<TimelineItemRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let mut session = state.session.write().await;
    let plan =
        session.apply(|p| update_timeline_item(p, day_index, item_index, request.activity))?;
    day_response(plan, day_index)
}

/// DELETE /api/v1/itinerary/days/:day/timeline/:item
pub async fn handle_remove_timeline_item(
    State(state): State<AppState>,
    Path((day_index, item_index)): Path<(usize, usize)>,
) -> Result<Json<DayResponse>, AppError> {
    let mut session = state.session.write().await;
    let plan = session.apply(|p| remove_timeline_item(p, day_index, item_index))?;
    day_response(plan, day_index)
}

// ────────────────────────────────────────────────────────────────────────────
// Images
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/itinerary/days/:day/images
///
/// Multipart form with one or more image file fields. Files are stored inline as
/// data URIs; anything past the four-image ceiling is dropped.
pub async fn handle_upload_images(
    State(state): State<AppState>,
    Path(day_index): Path<usize>,
    mut multipart: Multipart,
) -> Result<Json<DayResponse>, AppError> {
    let mut incoming = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        let mime = field.content_type().unwrap_or("image/jpeg").to_string();
        if !mime.starts_with("image/") {
            return Err(AppError::Validation(format!("Not an image upload: {mime}")));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(e.to_string()))?;
        // surplus files are drained but not kept
        if incoming.len() < MAX_IMAGES_PER_DAY {
            incoming.push(to_data_uri(&mime, &bytes));
        }
    }
    if incoming.is_empty() {
        return Err(AppError::Validation("No image files uploaded".to_string()));
    }

    let received = incoming.len();
    let mut session = state.session.write().await;
    let plan = session.apply(|p| add_images(p, day_index, incoming))?;
    let response = day_response(plan, day_index)?;
    info!(
        "Uploaded {received} images to day index {day_index}, now storing {}",
        response.day.images.len()
    );
    Ok(response)
}

/// DELETE /api/v1/itinerary/days/:day/images/:image
pub async fn handle_remove_image(
    State(state): State<AppState>,
    Path((day_index, image_index)): Path<(usize, usize)>,
) -> Result<Json<DayResponse>, AppError> {
    let mut session = state.session.write().await;
    let plan = session.apply(|p| remove_image(p, day_index, image_index))?;
    day_response(plan, day_index)
}

/// PUT /api/v1/itinerary/days/:day/image-count
///
/// Request: `{ "count": 3 }`. Never generates images for newly exposed slots.
pub async fn handle_set_image_count(
    State(state): State<AppState>,
    Path(day_index): Path<usize>,
    Json(request): Json<ImageCountRequest>,
) -> Result<Json<DayResponse>, AppError> {
    let mut session = state.session.write().await;
    let plan = session.apply(|p| set_image_count(p, day_index, request.count))?;
    day_response(plan, day_index)
}

// ────────────────────────────────────────────────────────────────────────────
// Quotation
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/quotation
pub async fn handle_get_quotation(
    State(state): State<AppState>,
) -> Result<Json<Quotation>, AppError> {
    let session = state.session.read().await;
    session
        .quotation
        .clone()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(NO_QUOTATION_MESSAGE.to_string()))
}

/// PUT /api/v1/quotation
///
/// Request: one edit, e.g. `{ "op": "set_selling_price", "price": 32000 }`.
/// Totals and margin are recomputed after every edit.
pub async fn handle_edit_quotation(
    State(state): State<AppState>,
    Json(edit): Json<QuotationEdit>,
) -> Result<Json<Quotation>, AppError> {
    let mut session = state.session.write().await;
    let current = session
        .quotation
        .as_ref()
        .ok_or_else(|| AppError::NotFound(NO_QUOTATION_MESSAGE.to_string()))?;
    let next = current.apply(edit);
    session.quotation = Some(next.clone());
    Ok(Json(next))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_data_uri() {
        assert_eq!(to_data_uri("image/png", b"abc"), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_plan_field_request_shape() {
        let field: PlanField =
            serde_json::from_str(r#"{"field": "main_title", "value": "花東縱谷"}"#).unwrap();
        assert_eq!(field, PlanField::MainTitle("花東縱谷".to_string()));
    }

    #[test]
    fn test_day_field_request_shape() {
        let field: DayField =
            serde_json::from_str(r#"{"field": "image_position", "value": "bottom"}"#).unwrap();
        assert_eq!(
            field,
            DayField::ImagePosition(crate::document::ImagePosition::Bottom)
        );
    }
}
