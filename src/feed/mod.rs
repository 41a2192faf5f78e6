//! Feed state: the ordered display items plus the pagination cursor.
//!
//! Items live in an index-addressed arena. Review rows are located by their
//! [`ItemId`] through a side index and mutated by replacing the whole value,
//! never through a long-lived reference.
//!
//! # Invariants
//! - A [`CountFooter`], if present, is the last item and there is at most one.
//! - `index[id] == i` iff `items[i]` is the review row with identifier `id`.
//! - `offset` is a multiple of `limit` and only grows.

use crate::model::{CountFooter, DisplayItem, ItemId, ReviewRow};
use std::collections::HashMap;

/// Default page size.
pub const DEFAULT_PAGE_LIMIT: usize = 20;

/// Feed contents and pagination cursor.
///
/// Exclusively owned by the fetch controller; everyone else sees `&FeedState`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    items: Vec<DisplayItem>,
    index: HashMap<ItemId, usize>,
    offset: usize,
    limit: usize,
    should_load: bool,
    is_first_loading: bool,
}

impl FeedState {
    /// Empty feed, ready to load its first page.
    ///
    /// A `limit` of zero is bumped to one so the cursor always advances.
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            offset: 0,
            limit: limit.max(1),
            should_load: true,
            is_first_loading: true,
        }
    }

    // === Read access ===

    /// Every item in display order.
    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    /// Number of items, footer included.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True before the first page lands and after a refresh.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`.
    pub fn get(&self, index: usize) -> Option<&DisplayItem> {
        self.items.get(index)
    }

    /// Number of review rows (footer excluded).
    pub fn review_count(&self) -> usize {
        self.index.len()
    }

    /// Offset of the next page to request.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Page size.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// True when it is safe to issue the next fetch.
    pub fn should_load(&self) -> bool {
        self.should_load
    }

    /// True until the first fetch of this feed has completed.
    pub fn is_first_loading(&self) -> bool {
        self.is_first_loading
    }

    /// The trailing count footer, if the feed is exhausted.
    pub fn footer(&self) -> Option<&CountFooter> {
        match self.items.last() {
            Some(DisplayItem::CountFooter(footer)) => Some(footer),
            _ => None,
        }
    }

    /// Position of the review row with this identifier.
    pub fn position_of(&self, id: ItemId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// The review row with this identifier.
    pub fn review(&self, id: ItemId) -> Option<&ReviewRow> {
        self.position_of(id)
            .and_then(|i| self.items.get(i))
            .and_then(DisplayItem::as_review)
    }

    // === Mutation (controller only) ===

    pub(crate) fn set_should_load(&mut self, should_load: bool) {
        self.should_load = should_load;
    }

    pub(crate) fn finish_first_load(&mut self) {
        self.is_first_loading = false;
    }

    /// Move the cursor forward by one page.
    pub(crate) fn advance_offset(&mut self) {
        self.offset += self.limit;
    }

    /// Remove the trailing footer, if any.
    pub(crate) fn remove_footer(&mut self) -> Option<CountFooter> {
        if matches!(self.items.last(), Some(DisplayItem::CountFooter(_))) {
            match self.items.pop() {
                Some(DisplayItem::CountFooter(footer)) => Some(footer),
                _ => None,
            }
        } else {
            None
        }
    }

    /// Append review rows in arrival order.
    ///
    /// Any footer is removed first so it stays last.
    pub(crate) fn append_reviews(&mut self, rows: impl IntoIterator<Item = ReviewRow>) {
        self.remove_footer();
        for row in rows {
            let position = self.items.len();
            self.index.insert(row.id(), position);
            self.items.push(DisplayItem::Review(row));
        }
    }

    /// Put a fresh footer at the end, replacing any existing one.
    pub(crate) fn push_footer(&mut self, footer: CountFooter) {
        self.remove_footer();
        self.items.push(DisplayItem::CountFooter(footer));
    }

    /// Replace the review row with identifier `id` by `update(row)`.
    ///
    /// Returns `false` (and changes nothing) when the identifier is unknown.
    /// The replacement keeps the identifier of the original row.
    pub(crate) fn replace_review<F>(&mut self, id: ItemId, update: F) -> bool
    where
        F: FnOnce(&ReviewRow) -> ReviewRow,
    {
        let Some(position) = self.position_of(id) else {
            return false;
        };
        let Some(DisplayItem::Review(current)) = self.items.get(position) else {
            return false;
        };
        let replacement = update(current);
        debug_assert_eq!(replacement.id(), id, "replacement must keep identity");
        self.items[position] = DisplayItem::Review(replacement);
        true
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT)
    }
}
