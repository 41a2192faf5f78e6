//! Display items: the units of the rendered feed.
//!
//! A feed is a sequence of [`DisplayItem`]s. Review rows carry everything the
//! layout engine and the image layer need; the count footer closes an
//! exhausted feed.

use super::identifiers::ItemId;
use super::rating::RatingGlyph;
use url::Url;

/// Line cap applied to review text until the user asks for the full text.
pub const DEFAULT_MAX_LINES: u32 = 3;

/// Reference to an image a row wants to show.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageRef {
    /// Fetch through the image cache.
    Remote(Url),
    /// Render the bundled placeholder; never fetched.
    Placeholder,
}

impl ImageRef {
    /// Parse an optional locator, falling back to the placeholder when it is
    /// absent or not an absolute URL.
    pub fn parse_or_placeholder(raw: Option<&str>) -> Self {
        raw.and_then(parse_locator)
            .map(Self::Remote)
            .unwrap_or(Self::Placeholder)
    }

    /// The locator to fetch, if any.
    pub fn url(&self) -> Option<&Url> {
        match self {
            ImageRef::Remote(url) => Some(url),
            ImageRef::Placeholder => None,
        }
    }
}

/// Parse a resource locator. Only absolute URLs qualify.
pub fn parse_locator(raw: &str) -> Option<Url> {
    Url::parse(raw).ok()
}

/// One review as shown in the feed.
///
/// Value type: the only field that ever changes is `max_lines`, and it changes
/// by replacing the whole row (see [`ReviewRow::with_max_lines`]).
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    id: ItemId,
    author_name: String,
    avatar: ImageRef,
    rating: RatingGlyph,
    photos: Vec<Url>,
    text: String,
    max_lines: u32,
    created: String,
}

impl ReviewRow {
    /// Build a row with the default line cap.
    pub fn new(
        id: ItemId,
        author_name: impl Into<String>,
        avatar: ImageRef,
        rating: RatingGlyph,
        photos: Vec<Url>,
        text: impl Into<String>,
        created: impl Into<String>,
    ) -> Self {
        Self {
            id,
            author_name: author_name.into(),
            avatar,
            rating,
            photos,
            text: text.into(),
            max_lines: DEFAULT_MAX_LINES,
            created: created.into(),
        }
    }

    /// Stable identifier for the lifetime of the row.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Formatted "First Last" author name.
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    /// Avatar locator or the placeholder.
    pub fn avatar(&self) -> &ImageRef {
        &self.avatar
    }

    /// Rendered rating glyph.
    pub fn rating(&self) -> &RatingGlyph {
        &self.rating
    }

    /// Photo locators in display order; possibly empty.
    pub fn photos(&self) -> &[Url] {
        &self.photos
    }

    /// Full review text, never truncated here.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Maximum visible text lines. `0` means unlimited.
    pub fn max_lines(&self) -> u32 {
        self.max_lines
    }

    /// True once the line cap has been lifted.
    pub fn is_expanded(&self) -> bool {
        self.max_lines == 0
    }

    /// Display-only creation label.
    pub fn created(&self) -> &str {
        &self.created
    }

    /// Copy of this row with a different line cap.
    pub fn with_max_lines(&self, max_lines: u32) -> Self {
        Self {
            max_lines,
            ..self.clone()
        }
    }
}

/// Trailing "N отзывов" footer of an exhausted feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountFooter {
    total: usize,
    label: String,
}

impl CountFooter {
    /// Footer reporting `total` reviews.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            label: format!("{total} отзывов"),
        }
    }

    /// Total number of reviews the label reports.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Text shown in the footer.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A unit of the rendered feed.
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    /// One review.
    Review(ReviewRow),
    /// Total count, shown once the feed is exhausted.
    CountFooter(CountFooter),
}

impl DisplayItem {
    /// Identifier of a review row; footers have none.
    pub fn id(&self) -> Option<ItemId> {
        match self {
            DisplayItem::Review(row) => Some(row.id()),
            DisplayItem::CountFooter(_) => None,
        }
    }

    /// The review row, unless this is the footer.
    pub fn as_review(&self) -> Option<&ReviewRow> {
        match self {
            DisplayItem::Review(row) => Some(row),
            DisplayItem::CountFooter(_) => None,
        }
    }

    /// True for the count footer.
    pub fn is_footer(&self) -> bool {
        matches!(self, DisplayItem::CountFooter(_))
    }
}
