// Layout: where each day's images go, and where the Summary pages end.
// Both are pure and synchronous; the session owns their state.

pub mod handlers;
pub mod page_heights;
pub mod placement;

pub use page_heights::{PageBreakNegotiator, PageHeights};
pub use placement::ViewportClass;
