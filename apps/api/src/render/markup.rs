//! Minimal HTML writer used by both presentation modes and the export shell.
//!
//! All text and attribute values pass through `html_escape`; raw insertion is only
//! used for the static stylesheet and scripts defined in this crate.

use crate::document::edit::EditTarget;

/// Append-only HTML buffer.
#[derive(Debug, Default)]
pub struct Html {
    buf: String,
}

impl Html {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<tag class="...">`
    pub fn open(&mut self, tag: &str, class: &str) -> &mut Self {
        self.open_attrs(tag, &[("class", class)])
    }

    /// Opens `tag` with escaped attributes. Empty values are omitted.
    pub fn open_attrs(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.buf.push('<');
        self.buf.push_str(tag);
        self.push_attrs(attrs);
        self.buf.push('>');
        self
    }

    /// Self-contained element with no closing tag, e.g. `<img>`.
    pub fn void(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut Self {
        self.open_attrs(tag, attrs)
    }

    pub fn close(&mut self, tag: &str) -> &mut Self {
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push('>');
        self
    }

    pub fn text(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(&html_escape::encode_text(text));
        self
    }

    /// `<tag class="...">text</tag>`
    pub fn element(&mut self, tag: &str, class: &str, text: &str) -> &mut Self {
        self.open(tag, class).text(text).close(tag)
    }

    /// Text element bound to an edit target. With `enabled` off it renders exactly
    /// like [`Html::element`], so read-only output carries no edit hooks.
    pub fn editable(
        &mut self,
        tag: &str,
        class: &str,
        text: &str,
        target: EditTarget,
        enabled: bool,
    ) -> &mut Self {
        if !enabled {
            return self.element(tag, class, text);
        }
        let target = target.to_string();
        self.open_attrs(
            tag,
            &[
                ("class", class),
                ("contenteditable", "true"),
                ("data-edit", target.as_str()),
            ],
        )
        .text(text)
        .close(tag)
    }

    /// Inserts trusted markup verbatim.
    pub fn raw(&mut self, markup: &str) -> &mut Self {
        self.buf.push_str(markup);
        self
    }

    pub fn finish(self) -> String {
        self.buf
    }

    fn push_attrs(&mut self, attrs: &[(&str, &str)]) {
        for (name, value) in attrs.iter().filter(|(_, v)| !v.is_empty()) {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            self.buf
                .push_str(&html_escape::encode_double_quoted_attribute(value));
            self.buf.push('"');
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static assets
// ────────────────────────────────────────────────────────────────────────────

/// Screen styles for the class names emitted by the renderer.
pub const BASE_STYLES: &str = r#"
body { font-family: 'Noto Sans TC', sans-serif; color: #0f172a; margin: 0; }
.doc-full { max-width: 64rem; margin: 2rem auto; padding: 0 5mm; background: #fff; border-radius: 2.5rem; box-shadow: 0 25px 50px -12px rgba(0,0,0,.25); overflow: hidden; }
.doc-summary { position: relative; max-width: 210mm; margin: 0 auto; padding: 10mm 5mm; background: #fff; }
.banner { display: block; width: 100%; height: auto; }
.hero { background: #0f172a; color: #fff; padding: 3rem; }
.badge { display: inline-block; background: #2563eb; color: #fff; border-radius: 999px; padding: .35rem 1rem; font-size: 10px; font-weight: 900; letter-spacing: .3em; text-transform: uppercase; }
.day { display: flex; gap: 1rem; align-items: flex-start; }
.day.stacked { flex-direction: column; }
.day-text { flex: 1 1 auto; min-width: 0; }
.day-label { background: #0f172a; color: #fff; border-radius: .25rem; padding: .1rem .5rem; font-size: 10px; font-weight: 900; }
.route { color: #dc2626; font-size: 12px; font-weight: 700; }
.route .arrow { color: #fca5a5; margin: 0 .25rem; font-weight: 400; }
.meal-bar { display: flex; gap: 1rem; font-size: 12px; font-weight: 700; color: #64748b; background: #f8fafc; padding: .5rem; border-radius: .5rem; }
.image-side { flex: 0 0 auto; display: flex; flex-direction: column; gap: .5rem; }
.image-grid { display: grid; gap: .5rem; margin-top: .5rem; width: 100%; }
.cols-1 { grid-template-columns: repeat(1, 1fr); }
.cols-2 { grid-template-columns: repeat(2, 1fr); }
.cols-3 { grid-template-columns: repeat(3, 1fr); }
.cols-4 { grid-template-columns: repeat(4, 1fr); }
@media (min-width: 1024px) { .wide-cols-4 { grid-template-columns: repeat(4, 1fr); } }
.slot { position: relative; margin: 0; overflow: hidden; border-radius: .75rem; background: #f1f5f9; }
.slot img { display: block; width: 100%; height: 100%; object-fit: cover; }
.slot figcaption { position: absolute; left: 0; right: 0; bottom: 0; padding: .5rem; color: #fff; font-size: 9px; font-weight: 700; background: linear-gradient(to top, rgba(0,0,0,.6), transparent); white-space: nowrap; overflow: hidden; text-overflow: ellipsis; }
.page-guides { position: absolute; inset: 0; pointer-events: none; }
.page-guide { position: absolute; left: 0; right: 0; border-top: 2px dashed rgba(248,113,113,.5); display: flex; justify-content: center; pointer-events: auto; cursor: ns-resize; z-index: 50; }
.guide-label { transform: translateY(-50%); background: #fef2f2; color: #f87171; font-size: 10px; padding: .1rem .5rem; border-radius: 999px; }
[contenteditable="true"] { outline: none; }
[contenteditable="true"]:focus { box-shadow: 0 0 0 2px #3b82f6; border-radius: .5rem; }
@media print {
  .no-print { display: none !important; }
  .print-break-inside-avoid { page-break-inside: avoid; break-inside: avoid; }
  .wide-cols-4 { grid-template-columns: repeat(4, 1fr); }
  .print-square { aspect-ratio: 1 / 1 !important; }
}
"#;

/// Commits an inline edit when the element loses focus. Keystrokes never post.
pub const COMMIT_ON_BLUR_SCRIPT: &str = r#"
document.addEventListener('focusout', function (e) {
  var el = e.target.closest && e.target.closest('[data-edit]');
  if (!el) return;
  fetch('/api/v1/itinerary/commit', {
    method: 'POST',
    headers: { 'content-type': 'application/json' },
    body: JSON.stringify({ target: el.dataset.edit, value: el.textContent || '' })
  });
});
"#;

/// Drives the page-guide drag gesture. Listeners live for one gesture and are
/// removed on release wherever the pointer is.
pub const PAGE_GUIDE_DRAG_SCRIPT: &str = r#"
(function () {
  var container = document.querySelector('.doc-summary');
  if (!container) return;
  function post(path, body) {
    return fetch('/api/v1/page-heights/drag/' + path, {
      method: 'POST',
      headers: { 'content-type': 'application/json' },
      body: JSON.stringify(body)
    }).then(function (r) { return r.json(); });
  }
  document.querySelectorAll('.page-guide').forEach(function (guide) {
    guide.addEventListener('pointerdown', function (e) {
      e.preventDefault();
      var index = Number(guide.dataset.boundary);
      post('begin', { index: index, pointer_px: e.clientY, container_width_px: container.offsetWidth });
      function onMove(m) {
        post('move', { index: index, pointer_px: m.clientY }).then(function (state) {
          if (!state || !state.offsets) return;
          document.querySelectorAll('.page-guide').forEach(function (g, i) {
            g.style.top = state.offsets[i] + 'mm';
            var len = g.querySelector('.guide-length');
            if (len) len.textContent = state.heights[i] + 'mm';
          });
        });
      }
      function onUp() {
        window.removeEventListener('pointermove', onMove);
        window.removeEventListener('pointerup', onUp);
        post('end', {});
      }
      window.addEventListener('pointermove', onMove);
      window.addEventListener('pointerup', onUp);
    });
  });
})();
"#;

/// Wraps a body fragment in a standalone UTF-8 document.
pub fn document_shell(title: &str, styles: &[&str], body: &str, scripts: &[&str]) -> String {
    let mut html = Html::new();
    html.raw("<!DOCTYPE html>\n")
        .open_attrs("html", &[("lang", "zh-TW")])
        .raw("<head><meta charset=\"UTF-8\">")
        .raw("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")
        .element("title", "", title);
    for style in styles {
        html.raw("<style>").raw(style).raw("</style>");
    }
    html.raw("</head><body>").raw(body);
    for script in scripts {
        html.raw("<script>").raw(script).raw("</script>");
    }
    html.raw("</body>").close("html");
    html.finish()
}
