// Generation: plan drafting, quotation estimation and the per-day image batch.
// Text calls go through llm_client; image calls through the ImageGenerator trait.

pub mod batch;
pub mod generator;
pub mod handlers;
pub mod images;
pub mod prompts;

pub use generator::{ClaudeItineraryAi, ItineraryAi};
pub use images::ImageGenerator;
