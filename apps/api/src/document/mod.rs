// Document model: tour plan data with its snapshot edits, plus the attached quotation.

pub mod edit;
pub mod handlers;
pub mod model;
pub mod quotation;

pub use model::{DayPlan, ImagePosition, TourKind, TourPlan};
pub use quotation::Quotation;
