//! Snapshot mutations over `TourPlan`.
//!
//! Every operation borrows the current snapshot and returns a new one. Days that an
//! operation does not touch are shared (`Arc::ptr_eq` holds across snapshots); the
//! touched day is rebuilt, never mutated through a shared pointer.
//!
//! `EditTarget` is the commit-on-blur binding used by the renderer: each inline-editable
//! element carries a target string, and losing focus posts `(target, value)` back here.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::document::model::{
    DayPlan, FlightInfo, ImagePosition, Meals, TimelineItem, TourPlan, MAX_IMAGES_PER_DAY,
};

/// Activity text given to a freshly added timeline row.
pub const NEW_TIMELINE_ACTIVITY: &str = "新活動內容";

#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("Day index {index} out of range (plan has {len} days)")]
    DayOutOfRange { index: usize, len: usize },

    #[error("Timeline item {index} out of range (day has {len} items)")]
    TimelineItemOutOfRange { index: usize, len: usize },

    #[error("Image {index} out of range (day stores {len} images)")]
    ImageOutOfRange { index: usize, len: usize },

    #[error("Unknown edit target '{0}'")]
    UnknownTarget(String),
}

// ────────────────────────────────────────────────────────────────────────────
// Field updates
// ────────────────────────────────────────────────────────────────────────────

/// A plan-level field together with its new value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum PlanField {
    MainTitle(String),
    MarketingSubtitle(String),
    DepartureInfo(String),
    CountryCity(Option<String>),
    FlightInfo(Option<FlightInfo>),
    Highlights(Vec<String>),
    CostIncludes(Vec<String>),
    CostExcludes(Vec<String>),
    Precautions(Vec<String>),
    SuggestedItems(Vec<String>),
}

/// A day-level field together with its new value.
///
/// The image list and declared count are deliberately absent: they go through
/// `add_images`, `remove_image` and `set_image_count` so their invariants hold.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum DayField {
    Title(String),
    Description(String),
    Accommodation(String),
    Meals(Meals),
    ImagePosition(ImagePosition),
    ImageKeyword(String),
}

pub fn update_plan_field(plan: &TourPlan, field: PlanField) -> TourPlan {
    let mut next = plan.clone();
    match field {
        PlanField::MainTitle(v) => next.main_title = v,
        PlanField::MarketingSubtitle(v) => next.marketing_subtitle = v,
        PlanField::DepartureInfo(v) => next.departure_info = v,
        PlanField::CountryCity(v) => next.country_city = v,
        PlanField::FlightInfo(v) => next.flight_info = v,
        PlanField::Highlights(v) => next.highlights = v,
        PlanField::CostIncludes(v) => next.cost_includes = v,
        PlanField::CostExcludes(v) => next.cost_excludes = v,
        PlanField::Precautions(v) => next.precautions = v,
        PlanField::SuggestedItems(v) => next.suggested_items = v,
    }
    next
}

pub fn update_day_field(
    plan: &TourPlan,
    day_index: usize,
    field: DayField,
) -> Result<TourPlan, EditError> {
    with_day(plan, day_index, |day| match field {
        DayField::Title(v) => day.title = v,
        DayField::Description(v) => day.description = v,
        DayField::Accommodation(v) => day.accommodation = v,
        DayField::Meals(v) => day.meals = v,
        DayField::ImagePosition(v) => day.image_position = v,
        DayField::ImageKeyword(v) => day.image_keyword = v,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Timeline
// ────────────────────────────────────────────────────────────────────────────

pub fn update_timeline_item(
    plan: &TourPlan,
    day_index: usize,
    item_index: usize,
    activity: String,
) -> Result<TourPlan, EditError> {
    try_with_day(plan, day_index, |day| {
        let len = day.timeline.len();
        let item = day
            .timeline
            .get_mut(item_index)
            .ok_or(EditError::TimelineItemOutOfRange {
                index: item_index,
                len,
            })?;
        item.activity = activity;
        Ok(())
    })
}

pub fn add_timeline_item(plan: &TourPlan, day_index: usize) -> Result<TourPlan, EditError> {
    with_day(plan, day_index, |day| {
        day.timeline.push(TimelineItem {
            activity: NEW_TIMELINE_ACTIVITY.to_string(),
        })
    })
}

pub fn remove_timeline_item(
    plan: &TourPlan,
    day_index: usize,
    item_index: usize,
) -> Result<TourPlan, EditError> {
    try_with_day(plan, day_index, |day| {
        if item_index >= day.timeline.len() {
            return Err(EditError::TimelineItemOutOfRange {
                index: item_index,
                len: day.timeline.len(),
            });
        }
        day.timeline.remove(item_index);
        Ok(())
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Images
// ────────────────────────────────────────────────────────────────────────────

/// Appends uploaded images to the stored list, keeping at most four in total.
///
/// Incoming images past the remaining capacity are dropped. The declared count
/// becomes the length of the combined list.
pub fn add_images(
    plan: &TourPlan,
    day_index: usize,
    incoming: Vec<String>,
) -> Result<TourPlan, EditError> {
    with_day(plan, day_index, |day| {
        let capacity = MAX_IMAGES_PER_DAY.saturating_sub(day.images.len());
        day.images.extend(incoming.into_iter().take(capacity));
        day.images.truncate(MAX_IMAGES_PER_DAY);
        day.image_count = day.images.len() as u8;
    })
}

/// Deletes one stored image and sets the declared count to what remains.
pub fn remove_image(
    plan: &TourPlan,
    day_index: usize,
    image_index: usize,
) -> Result<TourPlan, EditError> {
    try_with_day(plan, day_index, |day| {
        if image_index >= day.images.len() {
            return Err(EditError::ImageOutOfRange {
                index: image_index,
                len: day.images.len(),
            });
        }
        day.images.remove(image_index);
        day.image_count = day.images.len() as u8;
        Ok(())
    })
}

/// Records a new declared count (clamped to 0–4). Stored references are untouched,
/// so raising the count again re-exposes previously hidden images.
pub fn set_image_count(plan: &TourPlan, day_index: usize, count: u8) -> Result<TourPlan, EditError> {
    with_day(plan, day_index, |day| {
        day.image_count = count.min(MAX_IMAGES_PER_DAY as u8);
    })
}

/// Replaces a day's stored images wholesale (regeneration). The declared count is kept.
pub fn replace_images(
    plan: &TourPlan,
    day_index: usize,
    images: Vec<String>,
) -> Result<TourPlan, EditError> {
    with_day(plan, day_index, |day| day.images = images)
}

// ────────────────────────────────────────────────────────────────────────────
// Commit-on-blur edit targets
// ────────────────────────────────────────────────────────────────────────────

/// Addressable inline-editable text in a rendered document.
///
/// String form: `plan.mainTitle`, `plan.marketingSubtitle`, `plan.departureInfo`,
/// `flight.departure`, `flight.return`, `day.{i}.title`, `day.{i}.description`,
/// `day.{i}.timeline.{j}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    MainTitle,
    MarketingSubtitle,
    DepartureInfo,
    FlightDeparture,
    FlightReturn,
    DayTitle(usize),
    DayDescription(usize),
    TimelineActivity(usize, usize),
}

impl fmt::Display for EditTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditTarget::MainTitle => write!(f, "plan.mainTitle"),
            EditTarget::MarketingSubtitle => write!(f, "plan.marketingSubtitle"),
            EditTarget::DepartureInfo => write!(f, "plan.departureInfo"),
            EditTarget::FlightDeparture => write!(f, "flight.departure"),
            EditTarget::FlightReturn => write!(f, "flight.return"),
            EditTarget::DayTitle(d) => write!(f, "day.{d}.title"),
            EditTarget::DayDescription(d) => write!(f, "day.{d}.description"),
            EditTarget::TimelineActivity(d, i) => write!(f, "day.{d}.timeline.{i}"),
        }
    }
}

impl FromStr for EditTarget {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || EditError::UnknownTarget(s.to_string());
        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            ["plan", "mainTitle"] => Ok(EditTarget::MainTitle),
            ["plan", "marketingSubtitle"] => Ok(EditTarget::MarketingSubtitle),
            ["plan", "departureInfo"] => Ok(EditTarget::DepartureInfo),
            ["flight", "departure"] => Ok(EditTarget::FlightDeparture),
            ["flight", "return"] => Ok(EditTarget::FlightReturn),
            ["day", d, "title"] => Ok(EditTarget::DayTitle(d.parse().map_err(|_| unknown())?)),
            ["day", d, "description"] => Ok(EditTarget::DayDescription(
                d.parse().map_err(|_| unknown())?,
            )),
            ["day", d, "timeline", i] => Ok(EditTarget::TimelineActivity(
                d.parse().map_err(|_| unknown())?,
                i.parse().map_err(|_| unknown())?,
            )),
            _ => Err(unknown()),
        }
    }
}

impl EditTarget {
    /// The value an editor should be seeded with, if the target exists in `plan`.
    pub fn current_value<'a>(&self, plan: &'a TourPlan) -> Option<&'a str> {
        match self {
            EditTarget::MainTitle => Some(&plan.main_title),
            EditTarget::MarketingSubtitle => Some(&plan.marketing_subtitle),
            EditTarget::DepartureInfo => Some(&plan.departure_info),
            EditTarget::FlightDeparture => plan.flight_info.as_ref().map(|f| f.departure.as_str()),
            EditTarget::FlightReturn => plan.flight_info.as_ref().map(|f| f.return_flight.as_str()),
            EditTarget::DayTitle(d) => plan.day(*d).map(|day| day.title.as_str()),
            EditTarget::DayDescription(d) => plan.day(*d).map(|day| day.description.as_str()),
            EditTarget::TimelineActivity(d, i) => plan
                .day(*d)
                .and_then(|day| day.timeline.get(*i))
                .map(|item| item.activity.as_str()),
        }
    }
}

/// Applies a committed inline edit. Image captions commit to `DayTitle`, so every
/// slot of a day edits the same title.
pub fn commit_edit(plan: &TourPlan, target: EditTarget, value: &str) -> Result<TourPlan, EditError> {
    let value = value.to_string();
    match target {
        EditTarget::MainTitle => Ok(update_plan_field(plan, PlanField::MainTitle(value))),
        EditTarget::MarketingSubtitle => {
            Ok(update_plan_field(plan, PlanField::MarketingSubtitle(value)))
        }
        EditTarget::DepartureInfo => Ok(update_plan_field(plan, PlanField::DepartureInfo(value))),
        EditTarget::FlightDeparture | EditTarget::FlightReturn => {
            let mut flight = plan.flight_info.clone().unwrap_or_default();
            if target == EditTarget::FlightDeparture {
                flight.departure = value;
            } else {
                flight.return_flight = value;
            }
            Ok(update_plan_field(plan, PlanField::FlightInfo(Some(flight))))
        }
        EditTarget::DayTitle(d) => update_day_field(plan, d, DayField::Title(value)),
        EditTarget::DayDescription(d) => update_day_field(plan, d, DayField::Description(value)),
        EditTarget::TimelineActivity(d, i) => update_timeline_item(plan, d, i, value),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ────────────────────────────────────────────────────────────────────────────

fn with_day(
    plan: &TourPlan,
    day_index: usize,
    f: impl FnOnce(&mut DayPlan),
) -> Result<TourPlan, EditError> {
    try_with_day(plan, day_index, |day| {
        f(day);
        Ok(())
    })
}

/// Rebuilds day `day_index` of a cloned plan through `f` and swaps in a fresh `Arc`.
/// Nothing is produced if `f` fails.
fn try_with_day(
    plan: &TourPlan,
    day_index: usize,
    f: impl FnOnce(&mut DayPlan) -> Result<(), EditError>,
) -> Result<TourPlan, EditError> {
    let current = plan.days.get(day_index).ok_or(EditError::DayOutOfRange {
        index: day_index,
        len: plan.days.len(),
    })?;
    let mut day = DayPlan::clone(current);
    f(&mut day)?;

    let mut next = plan.clone();
    next.days[day_index] = Arc::new(day);
    Ok(next)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::tests::{make_day, make_plan};

    fn plan_with_day(images: usize, count: u8) -> TourPlan {
        let mut plan = make_plan(2);
        plan.days[0] = Arc::new(make_day(1, images, count));
        plan
    }

    fn upload(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("data:image/png;base64,UP{i}")).collect()
    }

    // ── snapshot semantics ──────────────────────────────────────────────────

    #[test]
    fn test_day_edit_shares_untouched_days() {
        let plan = make_plan(3);
        let next = update_day_field(&plan, 1, DayField::Title("New".to_string())).unwrap();

        assert!(Arc::ptr_eq(&plan.days[0], &next.days[0]));
        assert!(Arc::ptr_eq(&plan.days[2], &next.days[2]));
        assert!(!Arc::ptr_eq(&plan.days[1], &next.days[1]));
        assert_eq!(plan.days[1].title, "Day 2 title", "old snapshot must be unchanged");
        assert_eq!(next.days[1].title, "New");
    }

    #[test]
    fn test_plan_field_update_leaves_days_shared() {
        let plan = make_plan(2);
        let next = update_plan_field(&plan, PlanField::MainTitle("Renamed".to_string()));
        assert_eq!(next.main_title, "Renamed");
        assert_eq!(plan.main_title, "Hualien Coast 3 Days");
        assert!(Arc::ptr_eq(&plan.days[0], &next.days[0]));
    }

    #[test]
    fn test_out_of_range_day_is_error() {
        let plan = make_plan(1);
        let err = update_day_field(&plan, 5, DayField::Title("x".to_string())).unwrap_err();
        assert_eq!(err, EditError::DayOutOfRange { index: 5, len: 1 });
    }

    #[test]
    fn test_plan_field_deserializes_tagged() {
        let field: PlanField =
            serde_json::from_str(r#"{"field": "departure_info", "value": "Daily"}"#).unwrap();
        assert_eq!(field, PlanField::DepartureInfo("Daily".to_string()));
    }

    // ── timeline ────────────────────────────────────────────────────────────

    #[test]
    fn test_timeline_add_update_remove() {
        let plan = make_plan(1);
        let plan = add_timeline_item(&plan, 0).unwrap();
        assert_eq!(plan.days[0].timeline.len(), 3);
        assert_eq!(plan.days[0].timeline[2].activity, NEW_TIMELINE_ACTIVITY);

        let plan = update_timeline_item(&plan, 0, 2, "Harbour".to_string()).unwrap();
        assert_eq!(plan.days[0].timeline[2].activity, "Harbour");

        let plan = remove_timeline_item(&plan, 0, 0).unwrap();
        let activities: Vec<_> = plan.days[0].timeline.iter().map(|t| t.activity.as_str()).collect();
        assert_eq!(activities, vec!["Night market", "Harbour"]);
    }

    #[test]
    fn test_remove_missing_timeline_item_is_error() {
        let plan = make_plan(1);
        assert!(matches!(
            remove_timeline_item(&plan, 0, 9),
            Err(EditError::TimelineItemOutOfRange { index: 9, len: 2 })
        ));
    }

    // ── images ──────────────────────────────────────────────────────────────

    #[test]
    fn test_add_images_fills_remaining_capacity_only() {
        let plan = plan_with_day(3, 3);
        let next = add_images(&plan, 0, upload(3)).unwrap();
        assert_eq!(next.days[0].images.len(), 4);
        assert_eq!(next.days[0].image_count, 4);
        assert_eq!(next.days[0].images[3], "data:image/png;base64,UP0");
    }

    #[test]
    fn test_add_images_at_ceiling_drops_batch() {
        let plan = plan_with_day(4, 4);
        let next = add_images(&plan, 0, upload(2)).unwrap();
        assert_eq!(next.days[0].images, plan.days[0].images);
        assert_eq!(next.days[0].image_count, 4);
    }

    #[test]
    fn test_remove_image_keeps_count_equal_to_length() {
        let plan = plan_with_day(4, 2);
        let next = remove_image(&plan, 0, 1).unwrap();
        assert_eq!(next.days[0].images.len(), 3);
        assert_eq!(next.days[0].image_count as usize, next.days[0].images.len());
        assert!(!next.days[0].images.contains(&plan.days[0].images[1]));
    }

    #[test]
    fn test_lowering_count_hides_but_keeps_references() {
        let plan = plan_with_day(3, 3);
        let lowered = set_image_count(&plan, 0, 1).unwrap();
        assert_eq!(lowered.days[0].images.len(), 3);
        assert_eq!(lowered.days[0].displayed_image_count(), 1);

        let raised = set_image_count(&lowered, 0, 3).unwrap();
        assert_eq!(raised.days[0].displayed_images(), plan.days[0].images.as_slice());
    }

    #[test]
    fn test_raising_count_past_stored_shows_nothing_extra() {
        let plan = plan_with_day(1, 1);
        let raised = set_image_count(&plan, 0, 4).unwrap();
        assert_eq!(raised.days[0].images.len(), 1, "no images are synthesized");
        assert_eq!(raised.days[0].displayed_image_count(), 1);
    }

    #[test]
    fn test_set_image_count_clamps_to_ceiling() {
        let plan = plan_with_day(2, 2);
        let next = set_image_count(&plan, 0, 9).unwrap();
        assert_eq!(next.days[0].image_count, 4);
    }

    #[test]
    fn test_displayed_count_invariant_over_mutation_sequence() {
        let mut plan = plan_with_day(0, 0);
        let steps: Vec<Box<dyn Fn(&TourPlan) -> TourPlan>> = vec![
            Box::new(|p| add_images(p, 0, upload(2)).unwrap()),
            Box::new(|p| set_image_count(p, 0, 4).unwrap()),
            Box::new(|p| add_images(p, 0, upload(5)).unwrap()),
            Box::new(|p| set_image_count(p, 0, 1).unwrap()),
            Box::new(|p| remove_image(p, 0, 3).unwrap()),
            Box::new(|p| set_image_count(p, 0, 4).unwrap()),
        ];
        for step in steps {
            plan = step(&plan);
            let day = &plan.days[0];
            let bound = (day.image_count as usize).min(4).min(day.images.len());
            assert!(day.displayed_image_count() <= bound);
        }
    }

    // ── edit targets ────────────────────────────────────────────────────────

    #[test]
    fn test_edit_target_string_form_parses_back() {
        for target in [
            EditTarget::MainTitle,
            EditTarget::FlightReturn,
            EditTarget::DayTitle(3),
            EditTarget::TimelineActivity(1, 4),
        ] {
            assert_eq!(target.to_string().parse::<EditTarget>().unwrap(), target);
        }
        assert!("day.x.title".parse::<EditTarget>().is_err());
        assert!("plan.unknown".parse::<EditTarget>().is_err());
    }

    #[test]
    fn test_caption_commit_writes_day_title() {
        let plan = make_plan(2);
        let next = commit_edit(&plan, EditTarget::DayTitle(1), "Sun Moon Lake").unwrap();
        assert_eq!(next.days[1].title, "Sun Moon Lake");
        assert_eq!(EditTarget::DayTitle(1).current_value(&next), Some("Sun Moon Lake"));
    }

    #[test]
    fn test_flight_commit_creates_missing_flight_info() {
        let plan = make_plan(1);
        let next = commit_edit(&plan, EditTarget::FlightReturn, "CI 101").unwrap();
        let flight = next.flight_info.unwrap();
        assert_eq!(flight.return_flight, "CI 101");
        assert_eq!(flight.departure, "");
    }
}
