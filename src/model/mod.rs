//! Domain model types (pure).
//!
//! Raw reviews as decoded from a page, the display items derived from them,
//! and the error taxonomy shared by the rest of the crate.

pub mod display_item;
pub mod error;
pub mod identifiers;
pub mod rating;
pub mod review;

// Re-export for convenience
pub use display_item::{
    parse_locator, CountFooter, DisplayItem, ImageRef, ReviewRow, DEFAULT_MAX_LINES,
};
pub use error::{AppError, DecodeError, FetchError, ImageError};
pub use identifiers::ItemId;
pub use rating::{RatingGlyph, RatingRenderer, StarRatingRenderer};
pub use review::{decode_page, Review, ReviewsPage};
