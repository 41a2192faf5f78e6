//! Row layout engine.
//!
//! Pure measurement: given a display item and the available width, compute
//! the frame of every element and the total row height. Nothing here draws,
//! performs I/O, or keeps state between calls, so `measure` may be called
//! from any thread and always returns identical frames for identical inputs.
//!
//! # Review row stacking (top to bottom)
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ [avatar 36×36]  Author Name                   │  top inset 9
//! │                 ★★★★☆                         │  +6
//! │                 [55×66] [55×66] ...           │  +10 (only with photos)
//! │                 Review text, capped at        │  +10 / +6
//! │                 max_lines lines...            │
//! │                 Показать полностью...         │  +6 (only when truncated)
//! │                 13 мая                        │  +6
//! └──────────────────────────────────────────────┘  bottom inset 9
//! ```
//!
//! The constants are load-bearing: the hosting list sizes rows from
//! [`LayoutEngine::height_for`], and any drift from what the surface draws
//! shows up as clipping or scroll jumps.

pub mod footer;
pub mod geometry;
pub mod metrics;

use crate::model::{DisplayItem, ReviewRow};
use geometry::{EdgeInsets, Point, Rect, Size};
use metrics::{MonospaceMetrics, TextMetrics, TextStyle};
use std::sync::Arc;

/// Label of the control that lifts the line cap.
pub const SHOW_MORE_TEXT: &str = "Показать полностью...";

/// Insets from the row edges to its content.
pub const INSETS: EdgeInsets = EdgeInsets::new(9.0, 12.0, 9.0, 12.0);
/// Avatar box at the top-left content origin.
pub const AVATAR_SIZE: Size = Size {
    width: 36.0,
    height: 36.0,
};
/// One photo in the horizontal strip.
pub const PHOTO_SIZE: Size = Size {
    width: 55.0,
    height: 66.0,
};
/// Horizontal gap from avatar to the text column.
pub const AVATAR_TO_USERNAME_SPACING: f64 = 10.0;
/// Vertical gap from author name to rating.
pub const USERNAME_TO_RATING_SPACING: f64 = 6.0;
/// Vertical gap after the rating.
pub const RATING_TO_TEXT_SPACING: f64 = 6.0;
/// Extra vertical gap from rating to the photo strip.
pub const RATING_TO_PHOTOS_SPACING: f64 = 10.0;
/// Horizontal gap between photos.
pub const PHOTOS_SPACING: f64 = 8.0;
/// Vertical gap from photo strip to text.
pub const PHOTOS_TO_TEXT_SPACING: f64 = 10.0;
/// Vertical gap after the review text.
pub const TEXT_TO_CREATED_SPACING: f64 = 6.0;
/// Vertical gap after the show-more control.
pub const SHOW_MORE_TO_CREATED_SPACING: f64 = 6.0;

/// Frames of every element of a review row plus the row height.
///
/// Elements that are not shown have [`Rect::ZERO`] frames.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewLayout {
    /// Avatar box at the content origin.
    pub avatar: Rect,
    /// Author name label.
    pub author_name: Rect,
    /// Rating glyph.
    pub rating: Rect,
    /// Photo strip; zero without photos.
    pub photos: Rect,
    /// Review text label, capped to the line limit.
    pub review_text: Rect,
    /// Show-more control; zero unless truncated.
    pub show_more: Rect,
    /// Creation label.
    pub created: Rect,
    /// Whether the text is truncated and the show-more control is laid out.
    pub show_more_visible: bool,
    /// Total row height.
    pub height: f64,
}

/// Computes row layouts with a given text measurer.
#[derive(Clone)]
pub struct LayoutEngine {
    metrics: Arc<dyn TextMetrics>,
}

impl std::fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutEngine").finish_non_exhaustive()
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(Arc::new(MonospaceMetrics::default()))
    }
}

impl LayoutEngine {
    /// Engine measuring text with `metrics`.
    pub fn new(metrics: Arc<dyn TextMetrics>) -> Self {
        Self { metrics }
    }

    /// The text measurer in use.
    pub fn metrics(&self) -> &dyn TextMetrics {
        self.metrics.as_ref()
    }

    /// Natural size of the show-more control.
    pub fn show_more_size(&self) -> Size {
        self.metrics
            .bounding_size(SHOW_MORE_TEXT, TextStyle::ShowMore, f64::INFINITY)
    }

    /// Row height of any display item at `max_width`.
    pub fn height_for(&self, item: &DisplayItem, max_width: f64) -> f64 {
        match item {
            DisplayItem::Review(row) => self.measure(row, max_width).height,
            DisplayItem::CountFooter(footer) => {
                footer::footer_height(self.metrics.as_ref(), footer, max_width)
            }
        }
    }

    /// Lay out a review row at `max_width`.
    pub fn measure(&self, row: &ReviewRow, max_width: f64) -> ReviewLayout {
        let metrics = self.metrics.as_ref();
        let width = max_width - INSETS.left - INSETS.right;
        let mut max_y = INSETS.top;

        let avatar = Rect::new(Point::new(INSETS.left, INSETS.top), AVATAR_SIZE);

        // Everything right of the avatar shares this column.
        let column_x = avatar.max_x() + AVATAR_TO_USERNAME_SPACING;
        let column_width = width - (column_x - INSETS.left);

        let author_name = Rect::new(
            Point::new(column_x, max_y),
            metrics.bounding_size(row.author_name(), TextStyle::Username, column_width),
        );
        max_y = author_name.max_y() + USERNAME_TO_RATING_SPACING;

        let rating = Rect::new(Point::new(column_x, max_y), row.rating().size());
        max_y = rating.max_y() + RATING_TO_TEXT_SPACING;

        let photos = if row.photos().is_empty() {
            Rect::ZERO
        } else {
            let count = row.photos().len() as f64;
            let strip_width =
                (count * (PHOTO_SIZE.width + PHOTOS_SPACING) - PHOTOS_SPACING).min(column_width);
            let frame = Rect::from_xywh(
                column_x,
                max_y + RATING_TO_PHOTOS_SPACING,
                strip_width,
                PHOTO_SIZE.height,
            );
            max_y = frame.max_y() + PHOTOS_TO_TEXT_SPACING;
            frame
        };

        let mut show_more_visible = false;
        let review_text = if row.text().is_empty() {
            Rect::ZERO
        } else {
            let line_height = metrics.line_height(TextStyle::Text);
            let bounded_height = line_height * f64::from(row.max_lines());
            let natural_height = metrics
                .bounding_size(row.text(), TextStyle::Text, width)
                .height;
            show_more_visible = row.max_lines() != 0 && natural_height > bounded_height;

            let label_height = metrics
                .bounding_size(row.text(), TextStyle::Text, column_width)
                .height;
            let height = if row.max_lines() == 0 {
                label_height
            } else {
                label_height.min(bounded_height)
            };
            let frame = Rect::from_xywh(column_x, max_y, column_width, height);
            max_y = frame.max_y() + TEXT_TO_CREATED_SPACING;
            frame
        };

        let show_more = if show_more_visible {
            let frame = Rect::new(Point::new(column_x, max_y), self.show_more_size());
            max_y = frame.max_y() + SHOW_MORE_TO_CREATED_SPACING;
            frame
        } else {
            Rect::ZERO
        };

        let created = Rect::new(
            Point::new(column_x, max_y),
            metrics.bounding_size(row.created(), TextStyle::Created, width),
        );

        ReviewLayout {
            avatar,
            author_name,
            rating,
            photos,
            review_text,
            show_more,
            created,
            show_more_visible,
            height: created.max_y() + INSETS.bottom,
        }
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
