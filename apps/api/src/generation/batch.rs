//! Per-day image batch.
//!
//! After a plan is generated every day gets its images concurrently. Within a day the
//! requests are joined with `try_join_all`; across days with `join_all`, so one day's
//! failure leaves that day with no images while its siblings keep theirs.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use tracing::{info, warn};

use crate::document::{DayPlan, TourKind, TourPlan};
use crate::generation::images::{ImageError, ImageGenerator};

/// Prompt suffixes for the images requested right after plan generation.
pub const INITIAL_VARIATIONS: [&str; 4] = [
    "wide shot",
    "closeup details",
    "vibrant scenery",
    "ambient atmosphere",
];

/// Prompt suffixes for a single day's regeneration.
pub const REGENERATE_VARIATIONS: [&str; 3] = ["scenic vista", "cultural landmark", "local vibe"];

const DESCRIPTION_CONTEXT_CHARS: usize = 150;

/// `"{label} travel, Day {n}: {title}. {first 150 chars of description}"`
pub fn day_context(kind: TourKind, day: &DayPlan) -> String {
    let description: String = day
        .description
        .chars()
        .take(DESCRIPTION_CONTEXT_CHARS)
        .collect();
    format!(
        "{} travel, Day {}: {}. {}",
        kind.image_label(),
        day.day,
        day.title,
        description
    )
}

/// One prompt per requested image. A declared count of 0 still asks for one.
pub fn image_prompts(kind: TourKind, day: &DayPlan, variations: &[&str]) -> Vec<String> {
    let context = day_context(kind, day);
    let count = day.image_count.max(1) as usize;
    (0..count)
        .map(|i| format!("{context}, {}", variations[i % variations.len()]))
        .collect()
}

/// Generates every image for one day. Fails if any single request fails.
pub async fn generate_day_images(
    generator: &dyn ImageGenerator,
    kind: TourKind,
    day: &DayPlan,
    variations: &[&str],
) -> Result<Vec<String>, ImageError> {
    let prompts = image_prompts(kind, day, variations);
    try_join_all(prompts.iter().map(|p| generator.generate(p))).await
}

/// Fills every day's stored images. Always resolves; a failed day ends up empty.
pub async fn illustrate_plan(
    generator: &dyn ImageGenerator,
    kind: TourKind,
    plan: &TourPlan,
) -> TourPlan {
    let results = join_all(
        plan.days
            .iter()
            .map(|day| generate_day_images(generator, kind, day, &INITIAL_VARIATIONS)),
    )
    .await;

    let mut next = plan.clone();
    let mut failed = 0;
    for (day, result) in next.days.iter_mut().zip(results) {
        let images = result.unwrap_or_else(|e| {
            warn!("Images for day {} failed: {e}", day.day);
            failed += 1;
            Vec::new()
        });
        Arc::make_mut(day).images = images;
    }

    info!(
        "Image batch finished: {} days, {} failed",
        next.days.len(),
        failed
    );
    next
}

/// New images for one day; the declared count is unchanged by the caller.
pub async fn regenerate_day(
    generator: &dyn ImageGenerator,
    kind: TourKind,
    day: &DayPlan,
) -> Result<Vec<String>, ImageError> {
    generate_day_images(generator, kind, day, &REGENERATE_VARIATIONS).await
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::document::model::tests::{make_day, make_plan};

    /// Echoes the prompt back as the image reference and records every call.
    #[derive(Default)]
    struct Recording {
        prompts: Mutex<Vec<String>>,
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl ImageGenerator for Recording {
        async fn generate(&self, context: &str) -> Result<String, ImageError> {
            self.prompts.lock().unwrap().push(context.to_string());
            match self.fail_on {
                Some(marker) if context.contains(marker) => Err(ImageError::NoImageData),
                _ => Ok(format!("img:{context}")),
            }
        }
    }

    #[test]
    fn test_day_context_truncates_description_by_chars() {
        let mut day = make_day(2, 0, 1);
        day.title = "太魯閣".to_string();
        day.description = "峽".repeat(400);
        let context = day_context(TourKind::Domestic, &day);
        assert!(context.starts_with("Taiwan travel, Day 2: 太魯閣. "));
        assert_eq!(context.matches('峽').count(), 150);
    }

    #[test]
    fn test_zero_count_still_requests_one_image() {
        let day = make_day(1, 0, 0);
        let prompts = image_prompts(TourKind::International, &day, &INITIAL_VARIATIONS);
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("International travel, Day 1"));
        assert!(prompts[0].ends_with(", wide shot"));
    }

    #[test]
    fn test_regenerate_variations_cycle() {
        let day = make_day(1, 0, 4);
        let prompts = image_prompts(TourKind::Domestic, &day, &REGENERATE_VARIATIONS);
        let suffixes: Vec<&str> = prompts
            .iter()
            .map(|p| p.rsplit(", ").next().unwrap())
            .collect();
        assert_eq!(
            suffixes,
            vec!["scenic vista", "cultural landmark", "local vibe", "scenic vista"]
        );
    }

    // ── Batch ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_failed_day_is_empty_and_siblings_keep_images() {
        let generator = Recording {
            fail_on: Some("Day 2:"),
            ..Default::default()
        };
        let plan = make_plan(3);
        let illustrated = illustrate_plan(&generator, TourKind::Domestic, &plan).await;

        assert_eq!(illustrated.days.len(), 3);
        assert_eq!(illustrated.days[0].images.len(), 1);
        assert!(illustrated.days[1].images.is_empty());
        assert_eq!(illustrated.days[2].images.len(), 1);
        assert!(illustrated.days[2].images[0].contains("Day 3:"));
    }

    #[tokio::test]
    async fn test_batch_replaces_existing_references() {
        let generator = Recording::default();
        let mut plan = make_plan(1);
        Arc::make_mut(&mut plan.days[0]).image_count = 2;
        let illustrated = illustrate_plan(&generator, TourKind::Domestic, &plan).await;

        let images = &illustrated.days[0].images;
        assert_eq!(images.len(), 2);
        assert!(images[0].ends_with("wide shot"));
        assert!(images[1].ends_with("closeup details"));
        // the input snapshot is untouched
        assert_eq!(plan.days[0].images, vec!["https://img.test/1/0.jpg".to_string()]);
    }

    #[tokio::test]
    async fn test_regenerate_day_propagates_failure() {
        let generator = Recording {
            fail_on: Some("local vibe"),
            ..Default::default()
        };
        let day = make_day(1, 0, 3);
        let result = regenerate_day(&generator, TourKind::Domestic, &day).await;
        assert!(result.is_err());
        assert_eq!(generator.prompts.lock().unwrap().len(), 3);
    }
}
