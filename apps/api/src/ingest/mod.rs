// Ingest: turns operator-uploaded files into plain text for generation prompts
// (plan requirements or quotation cost data).

pub mod extract;
pub mod handlers;

pub use extract::{extract_text, ExtractError};
