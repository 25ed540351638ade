// History: previously generated plans, persisted to a local JSON file.
// Keyed by plan title for upsert, capped at the 50 most recent.

pub mod handlers;
pub mod store;

pub use store::{HistoryError, HistoryStore, JsonFileHistory};
