//! Plan and quotation generation: the text-generation collaborators.
//!
//! `ItineraryAi` is the seam: handlers only see the trait, `ClaudeItineraryAi` is the
//! production backend built on `LlmClient`, and tests plug in canned responses.
//!
//! Generated output is normalized before it reaches the session: declared image counts
//! are clamped to the per-day ceiling, stored images start empty, and quotation totals
//! are recomputed from the line items.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::document::model::MAX_IMAGES_PER_DAY;
use crate::document::{Quotation, TourKind, TourPlan};
use crate::generation::prompts::{
    DOMESTIC_SYSTEM, INTERNATIONAL_SYSTEM, MARKET_RATE_INSTRUCTION, PLAN_PROMPT_TEMPLATE,
    PLAN_SCHEMA, QUOTATION_PROMPT_TEMPLATE, QUOTATION_SCHEMA, QUOTATION_SYSTEM,
};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, TRADITIONAL_CHINESE_INSTRUCTION};
use crate::llm_client::{LlmClient, LlmError};

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Text-generation collaborator. Carried in `AppState` as `Arc<dyn ItineraryAi>`.
#[async_trait]
pub trait ItineraryAi: Send + Sync {
    async fn generate_plan(
        &self,
        kind: TourKind,
        product_name: &str,
        extra: Option<&str>,
    ) -> Result<TourPlan, LlmError>;

    async fn generate_quotation(
        &self,
        plan: &TourPlan,
        cost_reference: Option<&str>,
    ) -> Result<Quotation, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Prompt building
// ────────────────────────────────────────────────────────────────────────────

fn kind_label(kind: TourKind) -> &'static str {
    match kind {
        TourKind::Domestic => "國內團體旅遊",
        TourKind::International => "國外團體旅遊",
    }
}

pub fn plan_system(kind: TourKind) -> String {
    let base = match kind {
        TourKind::Domestic => DOMESTIC_SYSTEM,
        TourKind::International => INTERNATIONAL_SYSTEM,
    };
    format!("{base}\n\n{TRADITIONAL_CHINESE_INSTRUCTION}\n\n{JSON_ONLY_SYSTEM}")
}

pub fn build_plan_prompt(kind: TourKind, product_name: &str, extra: Option<&str>) -> String {
    let extra = match extra.map(str::trim) {
        Some(text) if !text.is_empty() => format!("要求細節: {text}"),
        _ => String::new(),
    };
    PLAN_PROMPT_TEMPLATE
        .replace("{product_name}", product_name.trim())
        .replace("{kind_label}", kind_label(kind))
        .replace("{extra}", &extra)
        .replace("{schema}", PLAN_SCHEMA)
}

pub fn build_quotation_prompt(plan: &TourPlan, cost_reference: Option<&str>) -> String {
    let cost_reference = match cost_reference.map(str::trim) {
        Some(text) if !text.is_empty() => format!("參考成本資料：\n{text}"),
        _ => MARKET_RATE_INSTRUCTION.to_string(),
    };
    QUOTATION_PROMPT_TEMPLATE
        .replace("{title}", &plan.main_title)
        .replace("{day_count}", &plan.days.len().to_string())
        .replace("{highlights}", &plan.highlights.join(", "))
        .replace("{cost_reference}", &cost_reference)
        .replace("{schema}", QUOTATION_SCHEMA)
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Clamps declared image counts and clears any image references the model invented.
pub fn normalize_plan(mut plan: TourPlan) -> TourPlan {
    for day in plan.days.iter_mut() {
        let day = Arc::make_mut(day);
        day.image_count = day.image_count.min(MAX_IMAGES_PER_DAY as u8);
        day.images.clear();
    }
    plan
}

/// Recomputes total and margin from the items, keeping the suggested price.
pub fn normalize_quotation(quotation: Quotation) -> Quotation {
    Quotation::from_items(quotation.items, quotation.suggested_selling_price)
}

// ────────────────────────────────────────────────────────────────────────────
// Claude backend
// ────────────────────────────────────────────────────────────────────────────

pub struct ClaudeItineraryAi {
    llm: LlmClient,
}

impl ClaudeItineraryAi {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ItineraryAi for ClaudeItineraryAi {
    async fn generate_plan(
        &self,
        kind: TourKind,
        product_name: &str,
        extra: Option<&str>,
    ) -> Result<TourPlan, LlmError> {
        let prompt = build_plan_prompt(kind, product_name, extra);
        let plan: TourPlan = self.llm.call_json(&prompt, &plan_system(kind)).await?;
        let plan = normalize_plan(plan);
        info!(
            "Generated plan '{}' ({} days, {:?})",
            plan.main_title,
            plan.days.len(),
            kind
        );
        Ok(plan)
    }

    async fn generate_quotation(
        &self,
        plan: &TourPlan,
        cost_reference: Option<&str>,
    ) -> Result<Quotation, LlmError> {
        let prompt = build_quotation_prompt(plan, cost_reference);
        let system = format!("{QUOTATION_SYSTEM}\n\n{JSON_ONLY_SYSTEM}");
        let quotation: Quotation = self.llm.call_json(&prompt, &system).await?;
        let quotation = normalize_quotation(quotation);
        info!(
            "Generated quotation for '{}' ({} items)",
            plan.main_title,
            quotation.items.len()
        );
        Ok(quotation)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::tests::make_plan;
    use crate::document::ImagePosition;

    #[test]
    fn test_plan_prompt_includes_extra_when_given() {
        let prompt = build_plan_prompt(TourKind::Domestic, " 花蓮三日遊 ", Some("需含太魯閣"));
        assert!(prompt.contains("商品名稱: 花蓮三日遊\n"));
        assert!(prompt.contains("類型: 國內團體旅遊"));
        assert!(prompt.contains("要求細節: 需含太魯閣"));
        assert!(prompt.contains("\"imageCount\": 1"));
        assert!(!prompt.contains("{schema}"));
    }

    #[test]
    fn test_plan_prompt_omits_blank_extra() {
        let prompt = build_plan_prompt(TourKind::International, "京都五日", Some("   "));
        assert!(!prompt.contains("要求細節"));
        assert!(prompt.contains("國外團體旅遊"));
    }

    #[test]
    fn test_plan_system_differs_by_kind() {
        let domestic = plan_system(TourKind::Domestic);
        let international = plan_system(TourKind::International);
        assert!(domestic.contains("國內"));
        assert!(international.contains("航班"));
        assert!(domestic.ends_with(JSON_ONLY_SYSTEM));
    }

    #[test]
    fn test_quotation_prompt_falls_back_to_market_rates() {
        let plan = make_plan(3);
        let prompt = build_quotation_prompt(&plan, None);
        assert!(prompt.contains("標題：Hualien Coast 3 Days"));
        assert!(prompt.contains("天數：3 天"));
        assert!(prompt.contains("行程亮點：Taroko Gorge, Qingshui Cliff"));
        assert!(prompt.contains(MARKET_RATE_INSTRUCTION));

        let with_costs = build_quotation_prompt(&plan, Some("住宿 2000/晚"));
        assert!(with_costs.contains("參考成本資料：\n住宿 2000/晚"));
        assert!(!with_costs.contains(MARKET_RATE_INSTRUCTION));
    }

    #[test]
    fn test_normalize_plan_from_model_output() {
        let json = r#"{
            "mainTitle": "京都賞楓五日",
            "marketingSubtitle": "古都秋色",
            "departureInfo": "11月每週二",
            "highlights": ["清水寺"],
            "days": [
                {"day": 1, "title": "抵達", "description": "入住", "timeline": [],
                 "meals": {"breakfast": "-", "lunch": "-", "dinner": "飯店"},
                 "accommodation": "京都飯店", "imageUrl": "kyoto", "imageCount": 9,
                 "customImages": ["https://invented.example/1.jpg"]},
                {"day": 2, "title": "嵐山", "description": "竹林", "timeline": [],
                 "meals": {"breakfast": "飯店", "lunch": "湯豆腐", "dinner": "懷石"},
                 "accommodation": "京都飯店", "imageUrl": "arashiyama",
                 "imagePosition": "bottom"}
            ],
            "costIncludes": [], "costExcludes": [], "precautions": [], "suggestedItems": []
        }"#;
        let plan = normalize_plan(serde_json::from_str(json).unwrap());

        assert_eq!(plan.days[0].image_count, 4);
        assert!(plan.days[0].images.is_empty());
        assert_eq!(plan.days[0].image_position, ImagePosition::Right);
        assert_eq!(plan.days[1].image_count, 1);
        assert_eq!(plan.days[1].image_position, ImagePosition::Bottom);
    }

    #[test]
    fn test_normalize_quotation_recomputes_totals() {
        let json = r#"{
            "items": [
                {"category": "住宿", "item": "雙人房", "unitPrice": 3000, "quantity": 2, "note": ""},
                {"category": "交通", "item": "遊覽車", "unitPrice": 1500, "quantity": 1, "note": "含司機"}
            ],
            "totalCost": 1,
            "suggestedSellingPrice": 10000,
            "profitMargin": 0.99
        }"#;
        let quotation = normalize_quotation(serde_json::from_str(json).unwrap());
        assert_eq!(quotation.total_cost, 7500.0);
        assert_eq!(quotation.suggested_selling_price, 10000.0);
        assert!((quotation.profit_margin - 0.25).abs() < 1e-9);
    }
}
