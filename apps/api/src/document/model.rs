//! Tour plan data model: the canonical in-memory representation of one itinerary.
//!
//! Pure data. Mutation lives in `document::edit`, which always produces a new snapshot.
//! Days are held behind `Arc` so that an edit to one day leaves every other day
//! pointer-identical between the old and the new snapshot.
//!
//! JSON uses camelCase because the same shape is handed to the generation model as
//! its output schema.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Hard ceiling on displayed (and uploaded) images per day.
pub const MAX_IMAGES_PER_DAY: usize = 4;

/// Declared image count assumed when the generator omits one.
pub const DEFAULT_IMAGE_COUNT: u8 = 1;

// ────────────────────────────────────────────────────────────────────────────
// Enums
// ────────────────────────────────────────────────────────────────────────────

/// Domestic or international group tour. Drives prompts and header copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourKind {
    #[default]
    #[serde(alias = "DOMESTIC")]
    Domestic,
    #[serde(alias = "INTERNATIONAL")]
    International,
}

impl TourKind {
    /// Label used when building image prompts.
    pub fn image_label(self) -> &'static str {
        match self {
            TourKind::Domestic => "Taiwan",
            TourKind::International => "International",
        }
    }
}

/// Where a day's images sit relative to its text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    Left,
    #[default]
    Right,
    Bottom,
}

// ────────────────────────────────────────────────────────────────────────────
// Day
// ────────────────────────────────────────────────────────────────────────────

/// A single activity on a day's route. No timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    pub activity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meals {
    #[serde(default)]
    pub breakfast: String,
    #[serde(default)]
    pub lunch: String,
    #[serde(default)]
    pub dinner: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    /// 1-based day number. Gaps are tolerated.
    pub day: u32,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub timeline: Vec<TimelineItem>,
    #[serde(default)]
    pub meals: Meals,
    #[serde(default)]
    pub accommodation: String,
    #[serde(default)]
    pub image_position: ImagePosition,
    #[serde(default = "default_image_count")]
    pub image_count: u8,
    /// Stored image references (data URIs or remote URLs). May hold more entries than
    /// `image_count`; the surplus is kept but not displayed.
    #[serde(default, alias = "customImages")]
    pub images: Vec<String>,
    /// Seed keyword produced at generation time.
    #[serde(default, alias = "imageUrl")]
    pub image_keyword: String,
}

fn default_image_count() -> u8 {
    DEFAULT_IMAGE_COUNT
}

impl DayPlan {
    /// Number of images actually shown: `min(image_count, 4, images.len())`.
    pub fn displayed_image_count(&self) -> usize {
        (self.image_count as usize)
            .min(MAX_IMAGES_PER_DAY)
            .min(self.images.len())
    }

    /// The displayed prefix of the stored image list.
    pub fn displayed_images(&self) -> &[String] {
        &self.images[..self.displayed_image_count()]
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Plan
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightInfo {
    #[serde(default)]
    pub departure: String,
    #[serde(default, rename = "return")]
    pub return_flight: String,
}

/// Root aggregate for one itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPlan {
    pub main_title: String,
    #[serde(default)]
    pub marketing_subtitle: String,
    #[serde(default)]
    pub departure_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_info: Option<FlightInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_city: Option<String>,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub days: Vec<Arc<DayPlan>>,
    #[serde(default)]
    pub cost_includes: Vec<String>,
    #[serde(default)]
    pub cost_excludes: Vec<String>,
    #[serde(default)]
    pub precautions: Vec<String>,
    #[serde(default)]
    pub suggested_items: Vec<String>,
}

impl TourPlan {
    pub fn day(&self, index: usize) -> Option<&DayPlan> {
        self.days.get(index).map(|d| d.as_ref())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
