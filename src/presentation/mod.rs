//! Binding the feed to a list-rendering surface.
//!
//! The hosting list only ever sees [`FeedListModel`]: a count, the item at an
//! index and the height of a row at a width. [`FeedPresenter`] implements it
//! over the latest [`FeedState`] snapshot and tells the host how to reconcile
//! after each state change.

use crate::feed::FeedState;
use crate::fetch::should_load_next_page;
use crate::layout::{LayoutEngine, ReviewLayout};
use crate::model::{DisplayItem, ImageRef, ItemId};
use std::collections::HashMap;
use std::ops::Range;
use tracing::trace;

/// What a list-rendering surface needs from the feed.
pub trait FeedListModel {
    /// Number of rows, footer included.
    fn item_count(&self) -> usize;

    /// Row at `index`, if any.
    fn item_at(&self, index: usize) -> Option<&DisplayItem>;

    /// Row height at `width`; `0.0` for an index out of range.
    fn height_for(&mut self, index: usize, width: f64) -> f64;
}

/// How the host should reconcile its rendered rows with the new snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListUpdate {
    /// Rows in `range` are new; everything before is unchanged.
    Insert(Range<usize>),
    /// Nothing visible changed.
    Unchanged,
    /// Re-read every row.
    Reload,
}

/// Scroll geometry at the end of a drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Height of the visible area.
    pub viewport_height: f64,
    /// Height of all rows together.
    pub content_height: f64,
    /// Projected resting offset of the gesture.
    pub target_offset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum HeightKey {
    Review {
        id: ItemId,
        max_lines: u32,
        width: u64,
    },
    Footer {
        total: usize,
        width: u64,
    },
}

impl HeightKey {
    fn of(item: &DisplayItem, width: f64) -> Self {
        let width = width.to_bits();
        match item {
            DisplayItem::Review(row) => HeightKey::Review {
                id: row.id(),
                max_lines: row.max_lines(),
                width,
            },
            DisplayItem::CountFooter(footer) => HeightKey::Footer {
                total: footer.total(),
                width,
            },
        }
    }
}

/// Snapshot of the feed plus memoised row heights.
#[derive(Debug)]
pub struct FeedPresenter {
    layout: LayoutEngine,
    items: Vec<DisplayItem>,
    heights: HashMap<HeightKey, f64>,
    prefetch_screens: f64,
}

impl FeedPresenter {
    /// Presenter for an empty feed, prefetching `prefetch_screens` ahead.
    pub fn new(layout: LayoutEngine, prefetch_screens: f64) -> Self {
        Self {
            layout,
            items: Vec::new(),
            heights: HashMap::new(),
            prefetch_screens,
        }
    }

    /// Take a new snapshot. `appended` is the flag the controller emitted.
    pub fn apply(&mut self, state: &FeedState, appended: bool) -> ListUpdate {
        let previous = self.items.len();
        self.items = state.items().to_vec();

        if appended {
            return if self.items.len() > previous {
                ListUpdate::Insert(previous..self.items.len())
            } else {
                ListUpdate::Unchanged
            };
        }

        // Refresh hands out new identifiers; drop heights of rows that left.
        self.heights.retain(|key, _| match key {
            HeightKey::Review { id, .. } => state.position_of(*id).is_some(),
            HeightKey::Footer { .. } => true,
        });
        ListUpdate::Reload
    }

    /// Whether a drag that ended with `metrics` should request the next page.
    pub fn drag_ended(&self, metrics: ScrollMetrics) -> bool {
        should_load_next_page(
            metrics.viewport_height,
            metrics.content_height,
            metrics.target_offset,
            self.prefetch_screens,
        )
    }

    /// Sum of all row heights at `width`.
    pub fn content_height(&mut self, width: f64) -> f64 {
        (0..self.items.len()).map(|i| self.height_for(i, width)).sum()
    }

    /// Full frame layout of the review row at `index`.
    pub fn layout_at(&self, index: usize, width: f64) -> Option<ReviewLayout> {
        let row = self.items.get(index)?.as_review()?;
        Some(self.layout.measure(row, width))
    }

    /// Images the row at `index` displays: the avatar first, then photos.
    pub fn images_at(&self, index: usize) -> Vec<ImageRef> {
        let Some(row) = self.items.get(index).and_then(DisplayItem::as_review) else {
            return Vec::new();
        };
        std::iter::once(row.avatar().clone())
            .chain(row.photos().iter().cloned().map(ImageRef::Remote))
            .collect()
    }

    /// Number of memoised heights.
    pub fn cached_heights(&self) -> usize {
        self.heights.len()
    }
}

impl FeedListModel for FeedPresenter {
    fn item_count(&self) -> usize {
        self.items.len()
    }

    fn item_at(&self, index: usize) -> Option<&DisplayItem> {
        self.items.get(index)
    }

    fn height_for(&mut self, index: usize, width: f64) -> f64 {
        let Some(item) = self.items.get(index) else {
            return 0.0;
        };
        let key = HeightKey::of(item, width);
        if let Some(height) = self.heights.get(&key) {
            return *height;
        }
        let height = self.layout.height_for(item, width);
        trace!(index, width, height, "Measured row");
        self.heights.insert(key, height);
        height
    }
}
