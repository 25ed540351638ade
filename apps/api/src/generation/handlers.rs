//! Axum route handlers for the Generation API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::document::edit::replace_images;
use crate::document::{DayPlan, Quotation, TourKind, TourPlan};
use crate::errors::AppError;
use crate::generation::batch::{illustrate_plan, regenerate_day};
use crate::state::AppState;

pub const EMPTY_PRODUCT_NAME_MESSAGE: &str = "請輸入旅遊商品名稱";
const GENERATION_BUSY_MESSAGE: &str = "行程正在生成中，請稍候。";
const REGENERATION_BUSY_MESSAGE: &str = "這一天的圖片正在重新生成中，請稍候。";
const PLAN_REPLACED_MESSAGE: &str = "行程已被取代，結果未套用。";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Where the generation gets its extra material from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMethod {
    /// Product name only.
    #[default]
    Auto,
    /// Operator-typed requirements.
    Text,
    /// Text extracted from an uploaded file via `/api/v1/ingest`.
    File,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub kind: TourKind,
    pub product_name: String,
    #[serde(default)]
    pub input_method: InputMethod,
    #[serde(default)]
    pub extra: Option<String>,
}

impl GenerateRequest {
    /// The extra material passed to the generator; `Auto` never sends any.
    pub fn extra(&self) -> Option<&str> {
        match self.input_method {
            InputMethod::Auto => None,
            InputMethod::Text | InputMethod::File => self.extra.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub plan: TourPlan,
    pub kind: TourKind,
    /// Id of the history record written for this plan, if saving succeeded.
    pub history_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub day_index: usize,
    pub day: DayPlan,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuotationRequest {
    #[serde(default)]
    pub cost_reference: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/itinerary/generate
///
/// Drafts a plan, then fills every day's images concurrently. On success the plan
/// replaces the session's snapshot, edit mode is entered and the plan is saved to
/// history. On failure the session is untouched.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    let product_name = request.product_name.trim();
    if product_name.is_empty() {
        return Err(AppError::Validation(EMPTY_PRODUCT_NAME_MESSAGE.to_string()));
    }

    let _guard = state
        .session
        .try_begin_generation()
        .ok_or_else(|| AppError::Busy(GENERATION_BUSY_MESSAGE.to_string()))?;

    info!("Generating {:?} plan for '{}'", request.kind, product_name);
    let plan = state
        .ai
        .generate_plan(request.kind, product_name, request.extra())
        .await?;
    let plan = illustrate_plan(state.images.as_ref(), request.kind, &plan).await;

    state
        .session
        .write()
        .await
        .replace_plan(plan.clone(), request.kind, None);

    let history_id = match state.history.upsert(plan.clone(), request.kind, None).await {
        Ok(record) => Some(record.id),
        Err(e) => {
            warn!("Generated plan not saved to history: {e}");
            None
        }
    };

    Ok(Json(GenerateResponse {
        plan,
        kind: request.kind,
        history_id,
    }))
}

/// POST /api/v1/itinerary/days/:day/images/regenerate
///
/// `:day` is the 0-based day index. Requests as many images as the day declares
/// (at least one) and replaces the stored list once all have arrived. The declared
/// count is left alone.
pub async fn handle_regenerate_day(
    State(state): State<AppState>,
    Path(day_index): Path<usize>,
) -> Result<Json<RegenerateResponse>, AppError> {
    let _guard = state
        .session
        .try_begin_regeneration(day_index)
        .ok_or_else(|| AppError::Busy(REGENERATION_BUSY_MESSAGE.to_string()))?;

    let (day, kind, epoch) = {
        let session = state.session.read().await;
        let plan = session.plan()?;
        let day = plan
            .day(day_index)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Day index {day_index} not found")))?;
        (day, session.kind, session.epoch)
    };

    let images = regenerate_day(state.images.as_ref(), kind, &day)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let mut session = state.session.write().await;
    if session.epoch != epoch {
        return Err(AppError::Busy(PLAN_REPLACED_MESSAGE.to_string()));
    }
    let plan = session.apply(|p| replace_images(p, day_index, images))?;
    let day = plan
        .day(day_index)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Day index {day_index} not found")))?;

    info!("Regenerated {} images for day index {day_index}", day.images.len());
    Ok(Json(RegenerateResponse { day_index, day }))
}

/// POST /api/v1/quotation/generate
///
/// Request: `{ "cost_reference": "optional operator cost data" }`
///
/// Estimates a quotation for the current plan. The result becomes the session's
/// quotation and is written into the history record with the same title. On failure
/// the previous quotation stays.
pub async fn handle_generate_quotation(
    State(state): State<AppState>,
    Json(request): Json<QuotationRequest>,
) -> Result<Json<Quotation>, AppError> {
    let (plan, epoch) = {
        let session = state.session.read().await;
        (session.plan()?.clone(), session.epoch)
    };

    let quotation = state
        .ai
        .generate_quotation(&plan, request.cost_reference.as_deref())
        .await?;

    {
        let mut session = state.session.write().await;
        if session.epoch != epoch {
            return Err(AppError::Busy(PLAN_REPLACED_MESSAGE.to_string()));
        }
        session.quotation = Some(quotation.clone());
    }

    match state
        .history
        .attach_quotation(&plan.main_title, &quotation)
        .await
    {
        Ok(true) => {}
        Ok(false) => info!("No history record titled '{}' for quotation", plan.main_title),
        Err(e) => warn!("Quotation not saved to history: {e}"),
    }

    Ok(Json(quotation))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: InputMethod) -> GenerateRequest {
        GenerateRequest {
            kind: TourKind::Domestic,
            product_name: "花蓮三日遊".to_string(),
            input_method: method,
            extra: Some("需含太魯閣".to_string()),
        }
    }

    #[test]
    fn test_auto_input_sends_no_extra() {
        assert_eq!(request(InputMethod::Auto).extra(), None);
    }

    #[test]
    fn test_text_and_file_inputs_send_extra() {
        assert_eq!(request(InputMethod::Text).extra(), Some("需含太魯閣"));
        assert_eq!(request(InputMethod::File).extra(), Some("需含太魯閣"));
    }

    #[test]
    fn test_request_defaults() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"product_name": "京都五日"}"#).unwrap();
        assert_eq!(request.kind, TourKind::Domestic);
        assert_eq!(request.input_method, InputMethod::Auto);
    }
}
