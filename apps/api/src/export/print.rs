//! Direct print sink.
//!
//! The sequence is: open a surface, write the frozen page, wait until every image
//! has loaded or failed, let the page settle, invoke print, then close the surface
//! whether printing completed or was cancelled. A surface that cannot be opened is
//! an error carrying Download guidance, never a silent no-op.
//!
//! The settle delay is a heuristic. Surfaces with a real "render complete" signal
//! should report it from `wait_for_images` and callers can pass a zero delay.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::export::{export_title, ExportError, PRINT_BLOCKED_GUIDANCE, PRINT_SAFE_STYLES};
use crate::render::markup::{document_shell, Html, BASE_STYLES};
use crate::render::RenderedDocument;

/// Default wait between image load completion and the print call.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(2000);

#[allow(dead_code)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrintOutcome {
    Printed,
    Cancelled,
}

/// A rendering surface that can show a page and hand it to a print dialog.
#[allow(dead_code)]
#[async_trait]
pub trait PrintSurface: Send {
    /// Fails with [`ExportError::SurfaceBlocked`] when the surface cannot be opened.
    async fn open(&mut self) -> Result<(), ExportError>;
    async fn write(&mut self, page: &str) -> Result<(), ExportError>;
    /// Resolves once every embedded image has loaded or failed.
    async fn wait_for_images(&mut self);
    async fn print(&mut self) -> Result<PrintOutcome, ExportError>;
    async fn close(&mut self);
}

/// Drives `surface` through one print job.
#[allow(dead_code)]
pub async fn print_artifact<S: PrintSurface + ?Sized>(
    surface: &mut S,
    page: &str,
    settle: Duration,
) -> Result<PrintOutcome, ExportError> {
    if let Err(e) = surface.open().await {
        warn!("Print surface could not be opened: {e}");
        return Err(e);
    }

    let result = run_job(surface, page, settle).await;
    surface.close().await;

    match &result {
        Ok(outcome) => info!("Print job finished: {outcome:?}"),
        Err(e) => warn!("Print job failed: {e}"),
    }
    result
}

#[allow(dead_code)]
async fn run_job<S: PrintSurface + ?Sized>(
    surface: &mut S,
    page: &str,
    settle: Duration,
) -> Result<PrintOutcome, ExportError> {
    surface.write(page).await?;
    surface.wait_for_images().await;
    tokio::time::sleep(settle).await;
    surface.print().await
}

// ────────────────────────────────────────────────────────────────────────────
// Browser surface
// ────────────────────────────────────────────────────────────────────────────

/// Builds the self-printing page: the browser performs the same sequence as
/// [`print_artifact`] once it loads the page.
pub fn build_print_page(doc: &RenderedDocument, settle: Duration) -> String {
    let script = AUTO_PRINT_SCRIPT.replace("{settle_ms}", &settle.as_millis().to_string());
    document_shell(
        &export_title(&doc.title, doc.mode),
        &[BASE_STYLES, PRINT_SAFE_STYLES],
        &doc.markup,
        &[script.as_str()],
    )
}

/// Opens the print page in a new window, or alerts with Download guidance when
/// the window is blocked.
pub fn launcher_script(print_url: &str) -> String {
    let url = serde_json::Value::from(print_url).to_string();
    let guidance = serde_json::Value::from(PRINT_BLOCKED_GUIDANCE).to_string();
    LAUNCHER_SCRIPT
        .replace("{print_url}", &url)
        .replace("{guidance}", &guidance)
}

/// Toolbar with Download and Print actions, hidden in print.
pub fn toolbar(download_url: &str) -> String {
    let mut html = Html::new();
    html.open("nav", "toolbar no-print")
        .open_attrs("a", &[("href", download_url), ("download", "")])
        .text("下載 HTML")
        .close("a")
        .open_attrs("button", &[("type", "button"), ("id", "direct-print")])
        .text("🖨️ 直接列印")
        .close("button")
        .close("nav");
    html.finish()
}

const AUTO_PRINT_SCRIPT: &str = r#"
function waitForImages() {
  var images = Array.prototype.slice.call(document.querySelectorAll('img'));
  return Promise.all(images.map(function (img) {
    if (img.complete && img.naturalHeight !== 0) return Promise.resolve();
    return new Promise(function (resolve) { img.onload = resolve; img.onerror = resolve; });
  }));
}
window.onload = function () {
  waitForImages().then(function () {
    setTimeout(function () {
      window.stop();
      window.onafterprint = function () { window.close(); };
      window.print();
    }, {settle_ms});
  });
};
"#;

const LAUNCHER_SCRIPT: &str = r#"
(function () {
  var button = document.getElementById('direct-print');
  if (!button) return;
  button.addEventListener('click', function () {
    var surface = window.open({print_url}, '_blank');
    if (!surface) { alert({guidance}); }
  });
})();
"#;

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
