//! Text measurement.
//!
//! Fonts and text attributes belong to the rendering surface, so the layout
//! engine measures text through the [`TextMetrics`] collaborator. The default
//! [`MonospaceMetrics`] wraps greedily on spaces, counts display columns with
//! `unicode-width`, and gives every style a fixed advance and line height.

use super::geometry::Size;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// The text styles a review feed uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyle {
    /// Author full name.
    Username,
    /// Review body.
    Text,
    /// Creation label.
    Created,
    /// "Show full text" control.
    ShowMore,
    /// Footer "N reviews" label.
    ReviewCount,
}

/// Measures text for layout. Must be pure: same inputs, same size.
pub trait TextMetrics: Send + Sync {
    /// Height of one line of `style`.
    fn line_height(&self, style: TextStyle) -> f64;

    /// Natural bounds of `text` wrapped to `max_width`, with no line cap.
    ///
    /// Empty text measures as [`Size::ZERO`].
    fn bounding_size(&self, text: &str, style: TextStyle, max_width: f64) -> Size;
}

/// Advance and line height of a fixed-pitch font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Width of one display column in points.
    pub advance: f64,
    /// Height of one line in points.
    pub line_height: f64,
}

impl FontMetrics {
    /// Font with the given advance and line height.
    pub const fn new(advance: f64, line_height: f64) -> Self {
        Self {
            advance,
            line_height,
        }
    }
}

/// Fixed-pitch metrics, one font per [`TextStyle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    /// Font of [`TextStyle::Username`].
    pub username: FontMetrics,
    /// Font of [`TextStyle::Text`].
    pub text: FontMetrics,
    /// Font of [`TextStyle::Created`].
    pub created: FontMetrics,
    /// Font of [`TextStyle::ShowMore`].
    pub show_more: FontMetrics,
    /// Font of [`TextStyle::ReviewCount`].
    pub review_count: FontMetrics,
}

impl MonospaceMetrics {
    fn font(&self, style: TextStyle) -> FontMetrics {
        match style {
            TextStyle::Username => self.username,
            TextStyle::Text => self.text,
            TextStyle::Created => self.created,
            TextStyle::ShowMore => self.show_more,
            TextStyle::ReviewCount => self.review_count,
        }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            username: FontMetrics::new(8.0, 20.0),
            text: FontMetrics::new(7.0, 18.0),
            created: FontMetrics::new(6.0, 14.0),
            show_more: FontMetrics::new(7.0, 18.0),
            review_count: FontMetrics::new(7.0, 18.0),
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn line_height(&self, style: TextStyle) -> f64 {
        self.font(style).line_height
    }

    fn bounding_size(&self, text: &str, style: TextStyle, max_width: f64) -> Size {
        let font = self.font(style);
        let columns = if font.advance > 0.0 {
            // `as` saturates, so an infinite width means "never wrap".
            (max_width / font.advance).floor().max(1.0) as usize
        } else {
            usize::MAX
        };

        let lines = wrap_line_widths(text, columns);
        let Some(&widest) = lines.iter().max() else {
            return Size::ZERO;
        };
        Size::new(
            widest as f64 * font.advance,
            lines.len() as f64 * font.line_height,
        )
    }
}

/// Greedy word wrap. Returns the display width of every produced line.
///
/// Paragraphs are split on `'\n'`; an empty paragraph still occupies a line.
/// Words wider than `columns` are broken between characters. Empty input
/// produces no lines.
pub(crate) fn wrap_line_widths(text: &str, columns: usize) -> Vec<usize> {
    if text.is_empty() {
        return Vec::new();
    }
    let columns = columns.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = 0usize;
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let word_width = word.width();
            if current > 0 && current.saturating_add(1 + word_width) <= columns {
                current += 1 + word_width;
                continue;
            }
            if current > 0 {
                lines.push(current);
                current = 0;
            }
            if word_width <= columns {
                current = word_width;
            } else {
                for ch in word.chars() {
                    let ch_width = ch.width().unwrap_or(0);
                    if current > 0 && current + ch_width > columns {
                        lines.push(current);
                        current = 0;
                    }
                    current += ch_width;
                }
            }
        }
        lines.push(current);
    }

    lines
}
