//! Summary Document mode: A4-width page flow with operator page guides.
//!
//! Guides are absolutely positioned overlays at each cumulative boundary offset and
//! are hidden in print. Day blocks are compact and never split across pages.

use std::borrow::Cow;

use crate::document::edit::EditTarget;
use crate::document::model::{DayPlan, TourPlan};
use crate::layout::page_heights::PageHeights;
use crate::render::markup::Html;
use crate::render::{write_day_block, RenderMode, RenderOptions};

pub const CONTAINER_ID: &str = "itinerary-summary-container";

/// Descriptions longer than this many characters are cut.
pub const DESCRIPTION_LIMIT: usize = 200;
/// Highlights shown in the summary bar.
pub const SUMMARY_HIGHLIGHTS: usize = 4;

/// Cuts descriptions over 200 characters to 197 characters plus `...`.
pub fn truncate_description(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= DESCRIPTION_LIMIT {
        return Cow::Borrowed(text);
    }
    let mut cut: String = text.chars().take(DESCRIPTION_LIMIT - 3).collect();
    cut.push_str("...");
    Cow::Owned(cut)
}

pub fn render(plan: &TourPlan, heights: &PageHeights, options: &RenderOptions<'_>) -> String {
    let edit = options.editable;
    let mut html = Html::new();
    html.open_attrs("div", &[("id", CONTAINER_ID), ("class", "doc-summary")]);

    if options.page_guides {
        write_page_guides(&mut html, heights);
    }

    if let Some(src) = options.banner_src {
        html.void("img", &[("class", "banner"), ("src", src), ("alt", "Banner")]);
    }

    html.open("header", "summary-header")
        .editable("h1", "title", &plan.main_title, EditTarget::MainTitle, edit)
        .editable(
            "p",
            "subtitle",
            &plan.marketing_subtitle,
            EditTarget::MarketingSubtitle,
            edit,
        )
        .open("div", "agency")
        .element("p", "agency-name", "大鷹旅遊")
        .editable(
            "p",
            "",
            &plan.departure_info,
            EditTarget::DepartureInfo,
            edit,
        )
        .close("div")
        .close("header");

    if let Some(flight) = &plan.flight_info {
        html.open("table", "flight-table")
            .raw("<thead><tr><th>類別</th><th>航班 / 交通資訊</th></tr></thead>")
            .open("tbody", "");
        flight_row(&mut html, "出發資訊", &plan.departure_info, EditTarget::DepartureInfo, edit);
        flight_row(&mut html, "去程資訊", &flight.departure, EditTarget::FlightDeparture, edit);
        flight_row(&mut html, "回程資訊", &flight.return_flight, EditTarget::FlightReturn, edit);
        html.close("tbody").close("table");
    }

    html.open("div", "highlight-bar");
    for highlight in plan.highlights.iter().take(SUMMARY_HIGHLIGHTS) {
        html.element("span", "highlight", highlight);
    }
    html.close("div");

    html.open("div", "days");
    for (idx, day) in plan.days.iter().enumerate() {
        write_day_block(&mut html, day, idx, RenderMode::Summary, options, |h| {
            write_day_text(h, day, idx, edit);
        });
    }
    html.close("div");

    html.open("footer", "summary-footer")
        .element("p", "", "* 實際行程以說明會資料為準 *")
        .element("p", "brand", "Eagle AI Itinerary")
        .close("footer")
        .close("div");
    html.finish()
}

fn write_page_guides(html: &mut Html, heights: &PageHeights) {
    html.open("div", "page-guides no-print");
    for (i, (offset, height)) in heights.offsets().iter().zip(heights.entries()).enumerate() {
        let style = format!("top: {offset}mm");
        let index = i.to_string();
        html.open_attrs(
            "div",
            &[
                ("class", "page-guide"),
                ("data-boundary", index.as_str()),
                ("style", style.as_str()),
            ],
        )
        .open("span", "guide-label")
        .element("b", "", &format!("第 {} 頁結束", i + 1))
        .text(" | ")
        .element("span", "guide-length", &format!("{height}mm"))
        .element("small", "", " (按住拖動)")
        .close("span")
        .close("div");
    }
    html.close("div");
}

fn flight_row(html: &mut Html, label: &str, value: &str, target: EditTarget, edit: bool) {
    html.open("tr", "")
        .element("td", "row-label", label)
        .editable("td", "", value, target, edit)
        .close("tr");
}

fn write_day_text(html: &mut Html, day: &DayPlan, idx: usize, edit: bool) {
    html.element("span", "day-label", &format!("DAY {}", day.day))
        .editable("h3", "day-title", &day.title, EditTarget::DayTitle(idx), edit);

    html.open("p", "route").element("b", "", "行程：");
    for (i, item) in day.timeline.iter().enumerate() {
        if i > 0 {
            html.element("span", "arrow", "→");
        }
        html.editable(
            "span",
            "",
            &item.activity,
            EditTarget::TimelineActivity(idx, i),
            edit,
        );
    }
    html.close("p");

    html.open("div", "meal-bar")
        .element("span", "", &format!("早：{}", day.meals.breakfast))
        .element("span", "", &format!("午：{}", day.meals.lunch))
        .element("span", "", &format!("晚：{}", day.meals.dinner))
        .element("span", "stay", &format!("宿：{}", day.accommodation))
        .close("div");

    // A truncated description is display-only; committing it would lose the tail.
    match truncate_description(&day.description) {
        Cow::Borrowed(full) => {
            html.editable(
                "p",
                "day-description",
                full,
                EditTarget::DayDescription(idx),
                edit,
            );
        }
        Cow::Owned(cut) => {
            html.element("p", "day-description", &cut);
        }
    }
}
