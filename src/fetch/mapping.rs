//! Review → ReviewRow mapping.

use crate::model::{parse_locator, ImageRef, ItemId, RatingRenderer, Review, ReviewRow};

/// Turn a decoded review into a display row with a fresh identifier.
///
/// Unparseable photo locators are dropped; an absent or unparseable avatar
/// becomes the placeholder.
pub fn review_to_row(review: &Review, renderer: &dyn RatingRenderer) -> ReviewRow {
    let photos = review
        .photos
        .iter()
        .flatten()
        .filter_map(|raw| parse_locator(raw))
        .collect();

    ReviewRow::new(
        ItemId::generate(),
        format!("{} {}", review.first_name, review.last_name),
        ImageRef::parse_or_placeholder(review.avatar_url.as_deref()),
        renderer.glyph(review.rating),
        photos,
        review.text.as_str(),
        review.created.as_str(),
    )
}
