//! Binding image requests to reusable on-screen slots.
//!
//! A slot (an avatar view, a photo cell) is reused for different rows as the
//! list scrolls. Every [`ImageSlots::assign`] bumps the slot's generation and
//! cancels the previous request, so a result that arrives for an earlier
//! assignment is never applied to the slot's current row.

use super::{CancellationToken, ImageCache, ImageFetch, SharedImage};
use crate::model::ImageRef;
use std::collections::HashMap;
use tracing::trace;

/// Identity of a reusable display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

/// Proof of one assignment of a slot. Stale once the slot is reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotTicket {
    slot: SlotId,
    generation: u64,
}

impl SlotTicket {
    /// The slot this assignment targets.
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Assignment counter; later assignments have larger values.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a slot should display right now.
#[derive(Debug, Clone)]
pub enum SlotImage {
    /// The decoded image is ready.
    Loaded(SharedImage),
    /// No image: none was set, or loading it failed.
    Placeholder,
    /// A request is in flight; [`ImageSlots::poll`] will deliver it.
    Loading,
}

impl SlotImage {
    fn from_result(result: Option<SharedImage>) -> Self {
        result.map_or(SlotImage::Placeholder, SlotImage::Loaded)
    }
}

/// A finished request for the current assignment of a slot.
///
/// `image: None` means the request failed; show the placeholder.
#[derive(Debug, Clone)]
pub struct SlotUpdate {
    /// The assignment the result belongs to. Always current when returned.
    pub ticket: SlotTicket,
    /// Decoded image, or `None` when the request failed.
    pub image: Option<SharedImage>,
}

#[derive(Debug)]
struct SlotEntry {
    generation: u64,
    cancel: CancellationToken,
    fetch: Option<ImageFetch>,
}

/// Tracks the live image request per slot.
#[derive(Debug, Default)]
pub struct ImageSlots {
    entries: HashMap<SlotId, SlotEntry>,
    next_generation: u64,
}

impl ImageSlots {
    /// No slots assigned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Point `slot` at `image`, abandoning whatever it showed before.
    ///
    /// Cache hits and placeholders resolve immediately; otherwise the slot
    /// reports [`SlotImage::Loading`] until [`ImageSlots::poll`] delivers it.
    pub fn assign(
        &mut self,
        cache: &ImageCache,
        slot: SlotId,
        image: &ImageRef,
    ) -> (SlotTicket, SlotImage) {
        self.release(slot);

        self.next_generation += 1;
        let ticket = SlotTicket {
            slot,
            generation: self.next_generation,
        };
        let cancel = CancellationToken::new();

        let (initial, fetch) = match image.url() {
            None => (SlotImage::Placeholder, None),
            Some(url) => {
                let mut fetch = cache.fetch(url, &cancel);
                match fetch.try_take() {
                    Some(result) => (SlotImage::from_result(result), None),
                    None => (SlotImage::Loading, Some(fetch)),
                }
            }
        };

        self.entries.insert(
            slot,
            SlotEntry {
                generation: ticket.generation,
                cancel,
                fetch,
            },
        );
        (ticket, initial)
    }

    /// Forget `slot` and cancel its outstanding request.
    pub fn release(&mut self, slot: SlotId) {
        if let Some(previous) = self.entries.remove(&slot) {
            if previous.fetch.is_some() {
                trace!(
                    slot = slot.0,
                    generation = previous.generation,
                    "Cancelling stale image request"
                );
            }
            previous.cancel.cancel();
        }
    }

    /// Whether `ticket` is still the slot's current assignment.
    pub fn is_current(&self, ticket: SlotTicket) -> bool {
        self.entries
            .get(&ticket.slot)
            .is_some_and(|entry| entry.generation == ticket.generation)
    }

    /// Collect results that arrived since the last poll, ordered by slot.
    pub fn poll(&mut self) -> Vec<SlotUpdate> {
        let mut updates = Vec::new();
        for (slot, entry) in &mut self.entries {
            let Some(fetch) = entry.fetch.as_mut() else {
                continue;
            };
            if let Some(image) = fetch.try_take() {
                entry.fetch = None;
                updates.push(SlotUpdate {
                    ticket: SlotTicket {
                        slot: *slot,
                        generation: entry.generation,
                    },
                    image,
                });
            }
        }
        updates.sort_by_key(|update| update.ticket.slot);
        updates
    }

    /// Number of slots still waiting on a result.
    pub fn pending(&self) -> usize {
        self.entries.values().filter(|e| e.fetch.is_some()).count()
    }
}
