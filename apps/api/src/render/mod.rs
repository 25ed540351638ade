//! Layout Renderer: projects a TourPlan into one of two presentation modes.
//!
//! Both projections are pure functions of their inputs and return HTML fragments.
//! Page-height guides are drawn as overlays in Summary mode only; content is never
//! reflowed around them. Printed pagination is left to the avoid-break markers on
//! every day block.

pub mod full;
pub mod handlers;
pub mod markup;
pub mod summary;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::model::{DayPlan, TourKind, TourPlan};
use crate::layout::page_heights::PageHeights;
use crate::layout::placement::{
    self, AspectPolicy, ImageLayout, ImageRegion, SideOrder, ViewportClass,
};
use markup::Html;

/// Class that asks the print engine not to split an element across pages.
pub const AVOID_BREAK_CLASS: &str = "print-break-inside-avoid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Full,
    Summary,
}

impl RenderMode {
    /// Label appended to exported filenames.
    pub fn export_label(self) -> &'static str {
        match self {
            RenderMode::Full => "行程表",
            RenderMode::Summary => "A4一頁簡表",
        }
    }

    /// Side-column width cap for this mode.
    fn side_max_width(self) -> &'static str {
        match self {
            RenderMode::Full => "24rem",
            RenderMode::Summary => "150px",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderOptions<'a> {
    /// Attach commit-on-blur edit hooks.
    pub editable: bool,
    /// Draw draggable page guides (Summary mode only).
    pub page_guides: bool,
    pub viewport: ViewportClass,
    /// Header banner image, omitted when `None`.
    pub banner_src: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedDocument {
    pub mode: RenderMode,
    pub title: String,
    /// Body fragment, rooted at the mode's container element.
    pub markup: String,
}

/// Renders `plan` in `mode`. Summary mode uses `heights` for its guide overlays,
/// falling back to the default sequence.
pub fn render_document(
    plan: &TourPlan,
    kind: TourKind,
    mode: RenderMode,
    heights: Option<&PageHeights>,
    options: &RenderOptions<'_>,
) -> RenderedDocument {
    let markup = match mode {
        RenderMode::Full => full::render(plan, kind, options),
        RenderMode::Summary => {
            let fallback = PageHeights::default();
            summary::render(plan, heights.unwrap_or(&fallback), options)
        }
    };

    debug!(
        "Rendered {:?} document for '{}' ({} days, {} bytes)",
        mode,
        plan.main_title,
        plan.days.len(),
        markup.len()
    );

    RenderedDocument {
        mode,
        title: plan.main_title.clone(),
        markup,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared day block
// ────────────────────────────────────────────────────────────────────────────

/// Writes one day block: the avoid-break wrapper, the text written by `text`, and the
/// image region placed according to the resolver.
pub(crate) fn write_day_block(
    html: &mut Html,
    day: &DayPlan,
    day_index: usize,
    mode: RenderMode,
    options: &RenderOptions<'_>,
    text: impl FnOnce(&mut Html),
) {
    let layout = placement::resolve(day, day_index, mode, options.viewport);
    let class = if layout.is_side() {
        format!("day {AVOID_BREAK_CLASS}")
    } else {
        format!("day stacked {AVOID_BREAK_CLASS}")
    };
    let day_attr = day_index.to_string();
    html.open_attrs("section", &[("class", class.as_str()), ("data-day", day_attr.as_str())]);

    let images_first = matches!(
        layout.region,
        ImageRegion::Side {
            order: SideOrder::BeforeText,
            ..
        }
    );
    if images_first {
        write_images(html, &layout, mode, options);
    }

    let text_style = format!("width: {:.2}%", layout.text_width_fraction() * 100.0);
    html.open_attrs("div", &[("class", "day-text"), ("style", text_style.as_str())]);
    text(html);
    if matches!(layout.region, ImageRegion::Grid { .. }) {
        write_images(html, &layout, mode, options);
    }
    html.close("div");

    if layout.is_side() && !images_first {
        write_images(html, &layout, mode, options);
    }
    html.close("section");
}

fn write_images(
    html: &mut Html,
    layout: &ImageLayout<'_>,
    mode: RenderMode,
    options: &RenderOptions<'_>,
) {
    match &layout.region {
        ImageRegion::None => return,
        ImageRegion::Side { width_fraction, .. } => {
            let style = format!(
                "width: {:.2}%; max-width: {}",
                width_fraction * 100.0,
                mode.side_max_width()
            );
            html.open_attrs("div", &[("class", "image-side"), ("style", style.as_str())]);
        }
        ImageRegion::Grid { columns, .. } => {
            let mut class = format!("image-grid cols-{}", columns.columns_for(options.viewport));
            if columns.wide != columns.narrow && options.viewport == ViewportClass::Narrow {
                class.push_str(&format!(" wide-cols-{}", columns.wide));
            }
            html.open("div", class.as_str());
        }
    }

    // Full mode shows 16:9 on narrow screens but prints square.
    let slot_class = if layout.aspect == AspectPolicy::Video {
        "slot print-square"
    } else {
        "slot"
    };
    let style = format!("aspect-ratio: {}", layout.aspect.css_ratio());

    for slot in layout.slots() {
        let alt = format!("{} - {}", slot.caption, slot.index + 1);
        html.open_attrs("figure", &[("class", slot_class), ("style", style.as_str())])
            .void("img", &[("src", slot.src), ("alt", alt.as_str())])
            .editable(
                "figcaption",
                "",
                slot.caption,
                slot.caption_target,
                options.editable,
            )
            .close("figure");
    }
    html.close("div");
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
