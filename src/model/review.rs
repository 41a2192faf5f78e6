//! Raw review entities and page decoding.
//!
//! Pages arrive as JSON with snake_case keys:
//!
//! ```json
//! {
//!   "count": 45,
//!   "items": [
//!     {
//!       "first_name": "Анна", "last_name": "Иванова",
//!       "avatar_url": "https://cdn.example/a.jpg",
//!       "rating": 5, "photos": ["https://cdn.example/p1.jpg"],
//!       "text": "Отличный магазин", "created": "13 мая"
//!     }
//!   ]
//! }
//! ```

use super::error::DecodeError;
use serde::Deserialize;

/// A review as decoded from a page payload. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Review {
    /// Author first name.
    pub first_name: String,
    /// Author last name.
    pub last_name: String,
    /// Avatar locator; may be absent or unparseable.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Star rating. Expected in 1..=5 but not validated.
    pub rating: i64,
    /// Photo locators in display order.
    #[serde(default)]
    pub photos: Option<Vec<String>>,
    /// Review body; may be empty.
    pub text: String,
    /// Creation label, display-only.
    pub created: String,
}

/// One decoded page: the reviews it carries plus the total available.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewsPage {
    /// Reviews on this page, in arrival order.
    pub items: Vec<Review>,
    /// Total number of reviews available across all pages.
    pub count: usize,
}

/// Decode a raw page payload.
///
/// # Errors
///
/// Returns [`DecodeError`] when the payload is not JSON or does not have the
/// page shape (missing `count`, wrong field types, ...).
pub fn decode_page(payload: &[u8]) -> Result<ReviewsPage, DecodeError> {
    Ok(serde_json::from_slice(payload)?)
}
