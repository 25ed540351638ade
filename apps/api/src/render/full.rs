//! Full Document mode: unconstrained vertical flow for screen viewing.
//!
//! Header → quick-info bar → highlights → days → cost / precautions footer.

use crate::document::edit::EditTarget;
use crate::document::model::{TourKind, TourPlan};
use crate::render::markup::Html;
use crate::render::{write_day_block, RenderMode, RenderOptions};

pub const CONTAINER_ID: &str = "itinerary-preview-container";

/// Header badge copy for the tour kind.
pub fn header_badge(plan: &TourPlan, kind: TourKind) -> String {
    match kind {
        TourKind::Domestic => "Premium Domestic Journey".to_string(),
        TourKind::International => {
            let place = plan
                .country_city
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or("Luxury Tour");
            format!("Global Discovery | {place}")
        }
    }
}

pub fn render(plan: &TourPlan, kind: TourKind, options: &RenderOptions<'_>) -> String {
    let edit = options.editable;
    let mut html = Html::new();
    html.open_attrs("div", &[("id", CONTAINER_ID), ("class", "doc-full")]);

    if let Some(src) = options.banner_src {
        html.void("img", &[("class", "banner"), ("src", src), ("alt", "Banner")]);
    }

    // Header
    html.open("header", "hero")
        .element("span", "badge", &header_badge(plan, kind))
        .editable("h1", "title", &plan.main_title, EditTarget::MainTitle, edit)
        .editable(
            "p",
            "subtitle",
            &plan.marketing_subtitle,
            EditTarget::MarketingSubtitle,
            edit,
        )
        .close("header");

    // Quick info
    html.open("div", "quick-info")
        .open("div", "info")
        .element("span", "info-label", "Departure")
        .editable(
            "span",
            "info-value",
            &plan.departure_info,
            EditTarget::DepartureInfo,
            edit,
        )
        .close("div");
    if let Some(flight) = &plan.flight_info {
        html.open("div", "info")
            .element("span", "info-label", "Outbound")
            .editable(
                "span",
                "info-value",
                &flight.departure,
                EditTarget::FlightDeparture,
                edit,
            )
            .element("span", "info-label", "Inbound")
            .editable(
                "span",
                "info-value",
                &flight.return_flight,
                EditTarget::FlightReturn,
                edit,
            )
            .close("div");
    }
    html.close("div");

    // Highlights
    html.open("section", "highlights")
        .element("h2", "section-title", "行程特色亮點");
    for (i, highlight) in plan.highlights.iter().enumerate() {
        html.open("div", "highlight")
            .element("span", "highlight-no", &format!("{:02}", i + 1))
            .element("p", "", highlight)
            .close("div");
    }
    html.close("section");

    // Days
    html.open("section", "days")
        .element("h2", "section-title", "精選每日行程");
    for (idx, day) in plan.days.iter().enumerate() {
        write_day_block(&mut html, day, idx, RenderMode::Full, options, |h| {
            h.element("span", "day-label", &format!("DAY {}", day.day))
                .editable("h3", "day-title", &day.title, EditTarget::DayTitle(idx), edit)
                .editable(
                    "p",
                    "day-description",
                    &day.description,
                    EditTarget::DayDescription(idx),
                    edit,
                );

            h.open("div", "day-facts")
                .open("div", "meals")
                .element("span", "info-label", "Gastronomy 餐食")
                .element("p", "", &format!("早：{}", day.meals.breakfast))
                .element("p", "", &format!("午：{}", day.meals.lunch))
                .element("p", "", &format!("晚：{}", day.meals.dinner))
                .close("div")
                .open("div", "stay")
                .element("span", "info-label", "Accommodation 住宿")
                .element("p", "", &day.accommodation)
                .close("div")
                .close("div");

            h.open("ol", "timeline");
            for (i, item) in day.timeline.iter().enumerate() {
                h.editable(
                    "li",
                    "",
                    &item.activity,
                    EditTarget::TimelineActivity(idx, i),
                    edit,
                );
            }
            h.close("ol");
        });
    }
    html.close("section");

    write_terms(&mut html, plan);

    html.open("footer", "doc-footer")
        .element("p", "", "* 行程內容供參考，實際以合約及行前說明會資料為準 *")
        .element("div", "brand", "Eagle AI Studio Itinerary Engine")
        .close("footer")
        .close("div");
    html.finish()
}

fn write_terms(html: &mut Html, plan: &TourPlan) {
    html.open("section", "terms")
        .element("h3", "section-title", "費用詳情與說明");
    write_list(html, "cost-includes", "【費用包含】", &plan.cost_includes);
    write_list(html, "cost-excludes", "【費用不包含】", &plan.cost_excludes);
    html.element("h3", "section-title", "行前注意事項");
    write_list(html, "precautions", "", &plan.precautions);
    html.open("div", "suggested")
        .element("span", "info-label", "Suggested Items");
    for item in &plan.suggested_items {
        html.element("span", "chip", item);
    }
    html.close("div").close("section");
}

fn write_list(html: &mut Html, class: &str, heading: &str, items: &[String]) {
    html.open("div", class);
    if !heading.is_empty() {
        html.element("span", "list-heading", heading);
    }
    html.open("ul", "");
    for item in items {
        html.element("li", "", item);
    }
    html.close("ul").close("div");
}
