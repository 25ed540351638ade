//! Page-Break Negotiator: operator-adjustable page lengths over the Summary flow.
//!
//! The sequence only records intended page lengths. It never reflows content: printed
//! pagination comes from the avoid-break markers on day blocks and the print target's
//! page size. The boundaries drawn from this sequence are guide lines for the operator.
//!
//! # Drag state machine
//! ```text
//! Idle ──begin_drag──▶ Dragging { index, origin_px, origin_mm, px_per_mm }
//!  ▲                        │ update_drag (replaces entry `index` only)
//!  └──────end_drag──────────┘ (valid from any state)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Physical width of one A4 page.
pub const A4_WIDTH_MM: f64 = 210.0;
pub const MIN_PAGE_HEIGHT_MM: u32 = 50;
pub const MAX_PAGE_HEIGHT_MM: u32 = 600;
/// Roughly one A4 page after margins.
pub const DEFAULT_PAGE_HEIGHT_MM: u32 = 285;
pub const DEFAULT_PAGE_COUNT: usize = 5;

#[derive(Debug, Error, PartialEq)]
pub enum DragError {
    #[error("Page boundary {index} out of range (sequence has {len} entries)")]
    OutOfRange { index: usize, len: usize },

    #[error("Container width must be positive, got {0}px")]
    InvalidContainerWidth(f64),

    #[error("No drag in progress on boundary {0}")]
    NotDragging(usize),
}

/// Rounds to whole millimetres and clamps to `[50, 600]`.
pub fn clamp_height(mm: f64) -> u32 {
    let rounded = if mm.is_finite() { mm.round() } else { 0.0 };
    (rounded.max(0.0) as u32).clamp(MIN_PAGE_HEIGHT_MM, MAX_PAGE_HEIGHT_MM)
}

// ────────────────────────────────────────────────────────────────────────────
// PageHeights
// ────────────────────────────────────────────────────────────────────────────

/// Ordered page lengths in millimetres, one per boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageHeights(Vec<u32>);

impl Default for PageHeights {
    fn default() -> Self {
        PageHeights(vec![DEFAULT_PAGE_HEIGHT_MM; DEFAULT_PAGE_COUNT])
    }
}

impl PageHeights {
    pub fn new(heights: impl IntoIterator<Item = f64>) -> Self {
        PageHeights(heights.into_iter().map(clamp_height).collect())
    }

    pub fn entries(&self) -> &[u32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Distance from the document top to the end of page `index`:
    /// the sum of entries `0..=index`.
    pub fn boundary_offset(&self, index: usize) -> Option<u32> {
        (index < self.0.len()).then(|| self.0[..=index].iter().sum())
    }

    /// All boundary offsets, in order.
    pub fn offsets(&self) -> Vec<u32> {
        self.0
            .iter()
            .scan(0u32, |acc, h| {
                *acc += h;
                Some(*acc)
            })
            .collect()
    }

    /// Replaces entry `index` with a clamped value. Neighbours are not adjusted.
    pub fn set(&mut self, index: usize, mm: f64) -> Result<u32, DragError> {
        let len = self.0.len();
        let slot = self.0.get_mut(index).ok_or(DragError::OutOfRange { index, len })?;
        *slot = clamp_height(mm);
        Ok(*slot)
    }

    /// Sets every entry to the same clamped length.
    pub fn set_all_uniform(&mut self, mm: f64) {
        let value = clamp_height(mm);
        self.0.iter_mut().for_each(|h| *h = value);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Drag session
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        index: usize,
        origin_px: f64,
        origin_mm: u32,
        px_per_mm: f64,
    },
}

/// Page heights plus the drag gesture acting on them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageBreakNegotiator {
    heights: PageHeights,
    drag: DragSession,
}

impl PageBreakNegotiator {
    pub fn with_heights(heights: PageHeights) -> Self {
        PageBreakNegotiator {
            heights,
            drag: DragSession::Idle,
        }
    }

    pub fn heights(&self) -> &PageHeights {
        &self.heights
    }

    pub fn drag(&self) -> DragSession {
        self.drag
    }

    pub fn boundary_offset(&self, index: usize) -> Option<u32> {
        self.heights.boundary_offset(index)
    }

    /// Starts a drag on boundary `index`. `container_width_px` is the rendered width
    /// of the page container, used to convert pointer pixels to millimetres.
    /// A drag still open from an earlier gesture is discarded.
    pub fn begin_drag(
        &mut self,
        index: usize,
        pointer_px: f64,
        container_width_px: f64,
    ) -> Result<(), DragError> {
        if !(container_width_px.is_finite() && container_width_px > 0.0) {
            return Err(DragError::InvalidContainerWidth(container_width_px));
        }
        let origin_mm = *self.heights.entries().get(index).ok_or(DragError::OutOfRange {
            index,
            len: self.heights.len(),
        })?;

        self.drag = DragSession::Dragging {
            index,
            origin_px: pointer_px,
            origin_mm,
            px_per_mm: container_width_px / A4_WIDTH_MM,
        };
        Ok(())
    }

    /// Moves the active drag to `pointer_px` and returns the new length of the entry.
    pub fn update_drag(&mut self, index: usize, pointer_px: f64) -> Result<u32, DragError> {
        match self.drag {
            DragSession::Dragging {
                index: active,
                origin_px,
                origin_mm,
                px_per_mm,
            } if active == index => {
                let delta_mm = (pointer_px - origin_px) / px_per_mm;
                self.heights.set(index, origin_mm as f64 + delta_mm)
            }
            _ => Err(DragError::NotDragging(index)),
        }
    }

    /// Ends the gesture. Always returns to `Idle`, wherever the release happened.
    /// Returns the boundary that was being dragged, if any.
    pub fn end_drag(&mut self) -> Option<usize> {
        match std::mem::take(&mut self.drag) {
            DragSession::Dragging { index, .. } => Some(index),
            DragSession::Idle => None,
        }
    }

    pub fn set_all_uniform(&mut self, mm: f64) {
        self.heights.set_all_uniform(mm);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
