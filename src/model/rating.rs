//! Rating glyphs.
//!
//! The feed never draws stars itself. A [`RatingRenderer`] turns the integer
//! rating into a [`RatingGlyph`] whose size feeds the layout engine and whose
//! label is what a text surface would show.

use crate::layout::geometry::Size;

/// Rendered rating: how many stars are filled and how big the glyph is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingGlyph {
    filled: u8,
    total: u8,
    size: Size,
}

impl RatingGlyph {
    /// Number of filled stars.
    pub fn filled(&self) -> u8 {
        self.filled
    }

    /// Total number of stars drawn.
    pub fn total(&self) -> u8 {
        self.total
    }

    /// Natural size of the glyph in points.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Text rendition, e.g. `★★★☆☆`.
    pub fn label(&self) -> String {
        let filled = usize::from(self.filled);
        let empty = usize::from(self.total.saturating_sub(self.filled));
        format!("{}{}", "★".repeat(filled), "☆".repeat(empty))
    }
}

/// Maps an integer rating to a glyph. Pure and synchronous.
pub trait RatingRenderer: Send + Sync {
    /// Glyph for `rating`. Out-of-range values are clamped, not rejected.
    fn glyph(&self, rating: i64) -> RatingGlyph;
}

/// Default renderer: a row of equally sized stars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StarRatingRenderer {
    star_count: u8,
    star_size: f64,
    spacing: f64,
}

impl StarRatingRenderer {
    /// Renderer drawing `star_count` square stars of `star_size` points.
    pub fn new(star_count: u8, star_size: f64, spacing: f64) -> Self {
        Self {
            star_count,
            star_size,
            spacing,
        }
    }
}

impl Default for StarRatingRenderer {
    fn default() -> Self {
        Self::new(5, 16.0, 1.0)
    }
}

impl RatingRenderer for StarRatingRenderer {
    fn glyph(&self, rating: i64) -> RatingGlyph {
        let total = self.star_count;
        // Out-of-range ratings are drawn clamped, never rejected.
        let filled = rating.clamp(0, i64::from(total)) as u8;
        let stars = f64::from(total);
        let width = if total == 0 {
            0.0
        } else {
            stars * self.star_size + (stars - 1.0) * self.spacing
        };
        RatingGlyph {
            filled,
            total,
            size: Size::new(width, self.star_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_glyph_is_84_by_16() {
        let glyph = StarRatingRenderer::default().glyph(3);
        assert_eq!(glyph.size(), Size::new(84.0, 16.0));
    }

    #[test]
    fn label_shows_filled_and_empty_stars() {
        let glyph = StarRatingRenderer::default().glyph(3);
        assert_eq!(glyph.label(), "★★★☆☆");
    }

    #[test]
    fn out_of_range_ratings_are_clamped() {
        let renderer = StarRatingRenderer::default();
        assert_eq!(renderer.glyph(9).filled(), 5);
        assert_eq!(renderer.glyph(-2).filled(), 0);
        assert_eq!(renderer.glyph(-2).label(), "☆☆☆☆☆");
    }

    #[test]
    fn size_does_not_depend_on_rating() {
        let renderer = StarRatingRenderer::default();
        assert_eq!(renderer.glyph(1).size(), renderer.glyph(5).size());
    }

    #[test]
    fn zero_stars_is_zero_width() {
        let glyph = StarRatingRenderer::new(0, 16.0, 1.0).glyph(3);
        assert_eq!(glyph.size().width, 0.0);
        assert_eq!(glyph.filled(), 0);
    }
}
