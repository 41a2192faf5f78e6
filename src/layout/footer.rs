//! Count footer layout: one centered label with fixed insets.

use super::geometry::{Rect, Size};
use super::metrics::{TextMetrics, TextStyle};
use crate::model::CountFooter;

/// Left and right inset of the footer label.
pub const FOOTER_HORIZONTAL_INSET: f64 = 16.0;
/// Top and bottom inset of the footer label.
pub const FOOTER_VERTICAL_INSET: f64 = 12.0;

/// Row height of the footer at `max_width`.
pub fn footer_height(metrics: &dyn TextMetrics, footer: &CountFooter, max_width: f64) -> f64 {
    let label_width = max_width - 2.0 * FOOTER_HORIZONTAL_INSET;
    let text_height = metrics
        .bounding_size(footer.label(), TextStyle::ReviewCount, label_width)
        .height;
    text_height + 2.0 * FOOTER_VERTICAL_INSET
}

/// Frame of the footer label inside a row of `row_size`.
pub fn footer_label_frame(row_size: Size) -> Rect {
    Rect::from_xywh(
        FOOTER_HORIZONTAL_INSET,
        FOOTER_VERTICAL_INSET,
        row_size.width - 2.0 * FOOTER_HORIZONTAL_INSET,
        row_size.height - 2.0 * FOOTER_VERTICAL_INSET,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::metrics::MonospaceMetrics;

    #[test]
    fn single_line_footer_is_42_high() {
        let metrics = MonospaceMetrics::default();
        let height = footer_height(&metrics, &CountFooter::new(45), 375.0);
        assert_eq!(height, 18.0 + 24.0);
    }

    #[test]
    fn narrow_footer_wraps() {
        let metrics = MonospaceMetrics::default();
        // 70pt of label width holds 10 columns; "45 отзывов" is exactly 10.
        let height = footer_height(&metrics, &CountFooter::new(45), 70.0 + 32.0);
        assert_eq!(height, 42.0);
        let height = footer_height(&metrics, &CountFooter::new(45), 63.0 + 32.0);
        assert_eq!(height, 2.0 * 18.0 + 24.0);
    }

    #[test]
    fn label_frame_is_inset() {
        let frame = footer_label_frame(Size::new(375.0, 42.0));
        assert_eq!(frame, Rect::from_xywh(16.0, 12.0, 343.0, 18.0));
    }
}
