//! Identifier newtypes.
//!
//! Item identifiers are opaque: they are minted once per mapped review and
//! never derived from review content, so two identical reviews on different
//! pages still get distinct rows.

use std::fmt;
use uuid::Uuid;

/// Stable identifier of a display item within the feed.
///
/// NEVER export a raw constructor; use [`ItemId::generate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Mint a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
