//! Image Placement Resolver: maps a day's position preference and displayed images
//! to a concrete slot layout for one presentation mode.
//!
//! # Rules
//! - count 0 or nothing to show → no image region, text takes the full width
//! - `bottom` → grid under the text; columns = count for 1–3, and for 4 a 2-column
//!   grid on narrow viewports and a 4-column grid on wide viewports and in print
//! - `left` / `right` → one fixed-width column before / after the text block,
//!   a quarter of the day block in Summary mode, a third in Full mode
//!
//! Every slot is captioned with the day title and commits edits back to that title.

use serde::Serialize;

use crate::document::edit::EditTarget;
use crate::document::model::{DayPlan, ImagePosition, MAX_IMAGES_PER_DAY};
use crate::render::RenderMode;

/// Side-column width as a fraction of the day block.
pub const SUMMARY_SIDE_FRACTION: f32 = 0.25;
pub const FULL_SIDE_FRACTION: f32 = 1.0 / 3.0;

/// Rendering environment width class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportClass {
    #[default]
    Narrow,
    Wide,
    Print,
}

/// Crop ratio applied to each slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectPolicy {
    /// 3:4 portrait tiles for Summary side columns.
    Portrait,
    /// 16:7 strips for the Summary bottom grid.
    Strip,
    /// 16:9 for Full mode on narrow screens.
    Video,
    /// 1:1 for Full mode on wide screens and in print.
    Square,
}

impl AspectPolicy {
    /// Value for the CSS `aspect-ratio` property.
    pub fn css_ratio(self) -> &'static str {
        match self {
            AspectPolicy::Portrait => "3 / 4",
            AspectPolicy::Strip => "16 / 7",
            AspectPolicy::Video => "16 / 9",
            AspectPolicy::Square => "1 / 1",
        }
    }
}

/// Placement of a side column in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SideOrder {
    BeforeText,
    AfterText,
}

/// Grid columns per viewport class. Only a 4-image grid differs between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridColumns {
    pub narrow: u8,
    pub wide: u8,
}

impl GridColumns {
    pub fn for_count(count: u8) -> Self {
        match count {
            4 => GridColumns { narrow: 2, wide: 4 },
            n => GridColumns {
                narrow: n.max(1),
                wide: n.max(1),
            },
        }
    }

    pub fn columns_for(self, viewport: ViewportClass) -> u8 {
        match viewport {
            ViewportClass::Narrow => self.narrow,
            ViewportClass::Wide | ViewportClass::Print => self.wide,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSlot<'a> {
    pub index: usize,
    pub src: &'a str,
    pub caption: &'a str,
    #[serde(serialize_with = "serialize_target")]
    pub caption_target: EditTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImageRegion<'a> {
    None,
    Side {
        order: SideOrder,
        width_fraction: f32,
        slots: Vec<ImageSlot<'a>>,
    },
    Grid {
        columns: GridColumns,
        slots: Vec<ImageSlot<'a>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageLayout<'a> {
    pub region: ImageRegion<'a>,
    pub aspect: AspectPolicy,
}

impl ImageLayout<'_> {
    pub fn slots(&self) -> &[ImageSlot<'_>] {
        match &self.region {
            ImageRegion::None => &[],
            ImageRegion::Side { slots, .. } | ImageRegion::Grid { slots, .. } => slots,
        }
    }

    /// Fraction of the day block left for the text.
    pub fn text_width_fraction(&self) -> f32 {
        match &self.region {
            ImageRegion::Side { width_fraction, .. } => 1.0 - width_fraction,
            _ => 1.0,
        }
    }

    pub fn is_side(&self) -> bool {
        matches!(self.region, ImageRegion::Side { .. })
    }
}

/// Resolves the image layout of day `day_index` for `mode` on `viewport`.
pub fn resolve<'a>(
    day: &'a DayPlan,
    day_index: usize,
    mode: RenderMode,
    viewport: ViewportClass,
) -> ImageLayout<'a> {
    let is_bottom = day.image_position == ImagePosition::Bottom;
    let aspect = match (mode, is_bottom) {
        (RenderMode::Summary, false) => AspectPolicy::Portrait,
        (RenderMode::Summary, true) => AspectPolicy::Strip,
        (RenderMode::Full, _) if viewport == ViewportClass::Narrow => AspectPolicy::Video,
        (RenderMode::Full, _) => AspectPolicy::Square,
    };

    let images = day.displayed_images();
    if day.image_count == 0 || images.is_empty() {
        return ImageLayout {
            region: ImageRegion::None,
            aspect,
        };
    }

    let slots: Vec<ImageSlot<'a>> = images
        .iter()
        .enumerate()
        .map(|(index, src)| ImageSlot {
            index,
            src,
            caption: &day.title,
            caption_target: EditTarget::DayTitle(day_index),
        })
        .collect();

    let region = match day.image_position {
        ImagePosition::Bottom => {
            let declared = day.image_count.min(MAX_IMAGES_PER_DAY as u8);
            ImageRegion::Grid {
                columns: GridColumns::for_count(declared),
                slots,
            }
        }
        ImagePosition::Left | ImagePosition::Right => ImageRegion::Side {
            order: if day.image_position == ImagePosition::Left {
                SideOrder::BeforeText
            } else {
                SideOrder::AfterText
            },
            width_fraction: match mode {
                RenderMode::Summary => SUMMARY_SIDE_FRACTION,
                RenderMode::Full => FULL_SIDE_FRACTION,
            },
            slots,
        },
    };

    ImageLayout { region, aspect }
}

fn serialize_target<S: serde::Serializer>(target: &EditTarget, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::tests::make_day;

    fn day(position: ImagePosition, images: usize, count: u8) -> DayPlan {
        let mut d = make_day(2, images, count);
        d.image_position = position;
        d
    }

    #[test]
    fn test_four_bottom_images_narrow_summary_is_two_column_grid() {
        let d = day(ImagePosition::Bottom, 4, 4);
        let layout = resolve(&d, 1, RenderMode::Summary, ViewportClass::Narrow);

        match &layout.region {
            ImageRegion::Grid { columns, slots } => {
                assert_eq!(columns.columns_for(ViewportClass::Narrow), 2);
                assert_eq!(slots.len(), 4);
                assert!(slots.iter().all(|s| s.caption == d.title));
                assert!(slots.iter().all(|s| s.caption_target == EditTarget::DayTitle(1)));
            }
            other => panic!("expected grid, got {other:?}"),
        }
        assert_eq!(layout.aspect, AspectPolicy::Strip);
    }

    #[test]
    fn test_four_column_grid_in_print_and_wide() {
        let columns = GridColumns::for_count(4);
        assert_eq!(columns.columns_for(ViewportClass::Print), 4);
        assert_eq!(columns.columns_for(ViewportClass::Wide), 4);
    }

    #[test]
    fn test_grid_columns_follow_count_below_four() {
        for n in 1..=3u8 {
            let d = day(ImagePosition::Bottom, n as usize, n);
            let layout = resolve(&d, 0, RenderMode::Full, ViewportClass::Narrow);
            match layout.region {
                ImageRegion::Grid { columns, .. } => {
                    assert_eq!(columns.columns_for(ViewportClass::Narrow), n);
                    assert_eq!(columns.columns_for(ViewportClass::Wide), n);
                }
                other => panic!("expected grid, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_left_is_side_column_before_text() {
        let d = day(ImagePosition::Left, 2, 2);
        let layout = resolve(&d, 0, RenderMode::Summary, ViewportClass::Narrow);
        match layout.region {
            ImageRegion::Side {
                order,
                width_fraction,
                ref slots,
            } => {
                assert_eq!(order, SideOrder::BeforeText);
                assert_eq!(width_fraction, SUMMARY_SIDE_FRACTION);
                assert_eq!(slots.len(), 2);
            }
            ref other => panic!("expected side column, got {other:?}"),
        }
        assert_eq!(layout.aspect, AspectPolicy::Portrait);
        assert!((layout.text_width_fraction() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_right_full_mode_is_third_width_after_text() {
        let d = day(ImagePosition::Right, 1, 1);
        let layout = resolve(&d, 0, RenderMode::Full, ViewportClass::Wide);
        match layout.region {
            ImageRegion::Side {
                order,
                width_fraction,
                ..
            } => {
                assert_eq!(order, SideOrder::AfterText);
                assert!((width_fraction - FULL_SIDE_FRACTION).abs() < 1e-6);
            }
            other => panic!("expected side column, got {other:?}"),
        }
        assert_eq!(layout.aspect, AspectPolicy::Square);
    }

    #[test]
    fn test_zero_count_has_no_region_regardless_of_position() {
        for position in [ImagePosition::Left, ImagePosition::Right, ImagePosition::Bottom] {
            let d = day(position, 3, 0);
            let layout = resolve(&d, 0, RenderMode::Summary, ViewportClass::Narrow);
            assert_eq!(layout.region, ImageRegion::None);
            assert_eq!(layout.text_width_fraction(), 1.0);
        }
    }

    #[test]
    fn test_no_stored_images_has_no_region() {
        let d = day(ImagePosition::Right, 0, 2);
        let layout = resolve(&d, 0, RenderMode::Full, ViewportClass::Narrow);
        assert!(layout.slots().is_empty());
        assert!(!layout.is_side());
    }

    #[test]
    fn test_hidden_images_are_not_slotted() {
        let d = day(ImagePosition::Bottom, 4, 2);
        let layout = resolve(&d, 0, RenderMode::Summary, ViewportClass::Narrow);
        assert_eq!(layout.slots().len(), 2);
        assert_eq!(layout.slots()[1].src, d.images[1]);
    }
}
