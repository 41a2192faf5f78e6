//! Geometry primitives in points.

/// A position in points, origin at the top-left of a row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal position, growing rightwards.
    pub x: f64,
    /// Vertical position, growing downwards.
    pub y: f64,
}

impl Point {
    /// The row origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Point at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height in points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// Empty size; what empty text measures as.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Size of `width` by `height`.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle.
///
/// [`Rect::ZERO`] is the degenerate frame used for elements that are not laid
/// out at all (no photos, no show-more control).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    /// Extent from the origin.
    pub size: Size,
}

impl Rect {
    /// The degenerate frame.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// Rectangle at `origin` with `size`.
    pub fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Rectangle from its four scalar components.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(Point::new(x, y), Size::new(width, height))
    }

    /// Right edge.
    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    /// Bottom edge.
    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// True for the degenerate frame.
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

/// Insets from the edges of a row to its content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeInsets {
    /// Inset from the top edge.
    pub top: f64,
    /// Inset from the left edge.
    pub left: f64,
    /// Inset from the bottom edge.
    pub bottom: f64,
    /// Inset from the right edge.
    pub right: f64,
}

impl EdgeInsets {
    /// Insets in top, left, bottom, right order.
    pub const fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}
