//! Export Serializer: freezes a rendered mode into a self-contained printable artifact.
//!
//! Two sinks share the same frozen content and print-safe styles:
//! - `download`: a standalone HTML file with a manual print button
//! - `print`: a self-printing page driven through a [`print::PrintSurface`]

pub mod download;
pub mod handlers;
pub mod print;

use thiserror::Error;

use crate::document::quotation::Quotation;
use crate::render::markup::Html;
use crate::render::RenderMode;

/// Shown when a direct-print surface cannot be opened.
pub const PRINT_BLOCKED_GUIDANCE: &str =
    "彈出視窗被攔截，請允許此網站開啟彈出視窗，或使用「下載 HTML」後再列印。";

#[allow(dead_code)]
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Print surface was blocked")]
    SurfaceBlocked,

    #[error("Print surface failed: {0}")]
    Surface(String),
}

/// Print rules shared by both sinks. Shadows, filters, rounded corners, clip paths
/// and gradient fills are stripped because some PDF rasterizers fail on them.
pub const PRINT_SAFE_STYLES: &str = r#"
body { -webkit-print-color-adjust: exact; print-color-adjust: exact; }
@media print {
  body { background-color: white !important; margin: 0 !important; padding: 0 !important; }
  .no-print { display: none !important; }
  @page { size: A4; margin: 10mm; }
  * {
    box-shadow: none !important;
    text-shadow: none !important;
    filter: none !important;
    backdrop-filter: none !important;
    border-radius: 0 !important;
    clip-path: none !important;
    background-image: none !important;
  }
  img { border-radius: 0 !important; clip-path: none !important; }
  .slot figcaption { background: rgba(0,0,0,0.3) !important; }
  .print-break-inside-avoid { page-break-inside: avoid; break-inside: avoid; }
  #itinerary-preview-container { width: 100% !important; margin: 0 !important; padding: 20px !important; border: none !important; }
  #itinerary-summary-container { width: 210mm !important; margin: 0 auto !important; padding: 0 0 15mm 0 !important; border: none !important; }
}
"#;

/// `{title}_{label}.html` with every whitespace run in the title replaced by `_`.
pub fn export_filename(title: &str, mode: RenderMode) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut in_space = false;
    for c in title.chars() {
        if c.is_whitespace() {
            if !in_space {
                stem.push('_');
            }
            in_space = true;
        } else {
            stem.push(c);
            in_space = false;
        }
    }
    format!("{stem}_{}.html", mode.export_label())
}

/// Document `<title>` for the exported page.
pub fn export_title(title: &str, mode: RenderMode) -> String {
    match mode {
        RenderMode::Full => title.to_string(),
        RenderMode::Summary => format!("{title} - 簡表"),
    }
}

/// Quotation table appended to Full-mode exports.
pub fn quotation_table(quotation: &Quotation) -> String {
    let mut html = Html::new();
    html.open("section", "quotation print-break-inside-avoid")
        .element("h3", "section-title", "報價明細")
        .open("table", "quotation-table")
        .raw("<thead><tr><th>類別</th><th>項目</th><th>單價</th><th>數量</th><th>小計</th><th>備註</th></tr></thead>")
        .open("tbody", "");
    for item in &quotation.items {
        html.open("tr", "")
            .element("td", "", &item.category)
            .element("td", "", &item.item)
            .element("td", "num", &format_amount(item.unit_price))
            .element("td", "num", &format_amount(item.quantity))
            .element("td", "num", &format_amount(item.subtotal()))
            .element("td", "", &item.note)
            .close("tr");
    }
    html.close("tbody").close("table");
    html.open("dl", "quotation-summary")
        .element("dt", "", "總成本")
        .element("dd", "", &format_amount(quotation.total_cost))
        .element("dt", "", "建議售價")
        .element("dd", "", &format_amount(quotation.suggested_selling_price))
        .element("dt", "", "毛利率")
        .element("dd", "", &format!("{:.1}%", quotation.profit_margin * 100.0))
        .close("dl")
        .close("section");
    html.finish()
}

/// Whole numbers without decimals, everything else to two places.
fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}
