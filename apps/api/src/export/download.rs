//! Download sink: a standalone HTML document offered as a file attachment.

use bytes::Bytes;

use crate::document::quotation::Quotation;
use crate::export::{export_filename, export_title, quotation_table, PRINT_SAFE_STYLES};
use crate::render::markup::{document_shell, Html, BASE_STYLES};
use crate::render::{RenderMode, RenderedDocument};

pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A frozen, self-contained export.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Bytes,
}

impl ExportArtifact {
    /// `Content-Disposition` value carrying both an ASCII fallback and the UTF-8 name.
    pub fn content_disposition(&self) -> String {
        let fallback: String = self
            .filename
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || "._-".contains(c) { c } else { '_' })
            .collect();
        format!(
            "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
            encode_rfc5987(&self.filename)
        )
    }
}

/// Builds the download artifact. A quotation, when given, is appended to Full-mode
/// exports only.
pub fn build_download(doc: &RenderedDocument, quotation: Option<&Quotation>) -> ExportArtifact {
    let mut body = Html::new();
    let wrapper_style = match doc.mode {
        RenderMode::Full => "max-width: 64rem; margin: 0 auto;",
        RenderMode::Summary => "max-width: 210mm; margin: 0 auto;",
    };
    body.open_attrs("div", &[("style", wrapper_style)]).raw(&doc.markup);
    if let (RenderMode::Full, Some(quotation)) = (doc.mode, quotation) {
        body.raw(&quotation_table(quotation));
    }
    body.close("div");

    let button = match doc.mode {
        RenderMode::Full => "🖨️ 列印或儲存為 PDF",
        RenderMode::Summary => "🖨️ 列印 A4 簡表",
    };
    body.open("div", "print-actions no-print")
        .open_attrs("button", &[("type", "button"), ("onclick", "window.print()")])
        .text(button)
        .close("button")
        .close("div");

    let html = document_shell(
        &export_title(&doc.title, doc.mode),
        &[BASE_STYLES, PRINT_SAFE_STYLES],
        &body.finish(),
        &[],
    );

    ExportArtifact {
        filename: export_filename(&doc.title, doc.mode),
        content_type: HTML_CONTENT_TYPE,
        body: Bytes::from(html),
    }
}

fn encode_rfc5987(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || b"!#$&+-.^_`|~".contains(&byte) {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::tests::make_plan;
    use crate::document::model::TourKind;
    use crate::document::quotation::QuotationItem;
    use crate::render::{render_document, RenderOptions};

    fn rendered(mode: RenderMode) -> RenderedDocument {
        render_document(
            &make_plan(2),
            TourKind::Domestic,
            mode,
            None,
            &RenderOptions::default(),
        )
    }

    fn quotation() -> Quotation {
        Quotation::from_items(
            vec![QuotationItem {
                category: "交通".to_string(),
                item: "Coach".to_string(),
                unit_price: 8000.0,
                quantity: 1.0,
                note: String::new(),
            }],
            12000.0,
        )
    }

    fn body_text(artifact: &ExportArtifact) -> String {
        String::from_utf8(artifact.body.to_vec()).unwrap()
    }

    #[test]
    fn test_download_is_standalone_with_print_rules() {
        let artifact = build_download(&rendered(RenderMode::Full), None);
        let html = body_text(&artifact);
        assert_eq!(artifact.filename, "Hualien_Coast_3_Days_行程表.html");
        assert_eq!(artifact.content_type, HTML_CONTENT_TYPE);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("box-shadow: none !important"));
        assert!(html.contains("onclick=\"window.print()\""));
        assert!(html.contains("itinerary-preview-container"));
    }

    #[test]
    fn test_summary_download_naming() {
        let artifact = build_download(&rendered(RenderMode::Summary), None);
        assert_eq!(artifact.filename, "Hualien_Coast_3_Days_A4一頁簡表.html");
        let html = body_text(&artifact);
        assert!(html.contains("<title>Hualien Coast 3 Days - 簡表</title>"));
        assert!(html.contains("列印 A4 簡表"));
    }

    #[test]
    fn test_quotation_only_in_full_exports() {
        let q = quotation();
        assert!(body_text(&build_download(&rendered(RenderMode::Full), Some(&q))).contains("報價明細"));
        assert!(!body_text(&build_download(&rendered(RenderMode::Summary), Some(&q))).contains("報價明細"));
    }

    #[test]
    fn test_content_disposition_encodes_utf8_name() {
        let artifact = ExportArtifact {
            filename: "花蓮_行程表.html".to_string(),
            content_type: HTML_CONTENT_TYPE,
            body: Bytes::new(),
        };
        let header = artifact.content_disposition();
        assert!(header.starts_with("attachment; filename=\"______.html\""));
        assert!(header.contains("filename*=UTF-8''%E8%8A%B1%E8%93%AE_"));
    }
}
