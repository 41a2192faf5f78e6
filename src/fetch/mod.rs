//! Pagination state machine.
//!
//! [`FetchController`] owns the [`FeedState`] and is driven from a single
//! presentation thread:
//!
//! ```text
//! Ready --request_next--> Fetching --completion--> Ready | Exhausted
//! ```
//!
//! Pages are fetched and decoded on a background thread. Completions travel
//! back over a channel and are applied only when the owner calls
//! [`FetchController::poll`] (or [`FetchController::wait_for_page`]), so every
//! mutation of the feed happens on the owning thread.

pub mod mapping;
pub mod trigger;

pub use mapping::review_to_row;
pub use trigger::{should_load_next_page, PREFETCH_SCREENS};

use crate::feed::FeedState;
use crate::model::{decode_page, CountFooter, FetchError, ItemId, RatingRenderer, ReviewsPage};
use crate::source::DataSource;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Receives `(state, appended)` after every mutation.
pub type StateListener = Box<dyn FnMut(&FeedState, bool)>;

/// A finished page request, tagged with the refresh generation it belongs to.
struct PageCompletion {
    generation: u64,
    offset: usize,
    result: Result<ReviewsPage, FetchError>,
}

/// Owns the feed and drives pagination.
pub struct FetchController {
    source: Arc<dyn DataSource>,
    renderer: Arc<dyn RatingRenderer>,
    state: FeedState,
    listener: Option<StateListener>,
    completions_tx: Sender<PageCompletion>,
    completions_rx: Receiver<PageCompletion>,
    generation: u64,
    in_flight: bool,
    last_error: Option<FetchError>,
}

impl std::fmt::Debug for FetchController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchController")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl FetchController {
    /// Controller for an empty feed paging `source` in pages of `limit`.
    pub fn new(
        source: Arc<dyn DataSource>,
        renderer: Arc<dyn RatingRenderer>,
        limit: usize,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::channel();
        Self {
            source,
            renderer,
            state: FeedState::new(limit),
            listener: None,
            completions_tx,
            completions_rx,
            generation: 0,
            in_flight: false,
            last_error: None,
        }
    }

    /// Install the state-change listener, replacing any previous one.
    pub fn set_state_listener(&mut self, listener: impl FnMut(&FeedState, bool) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Current feed snapshot.
    pub fn state(&self) -> &FeedState {
        &self.state
    }

    /// True while a page of the current generation is outstanding.
    pub fn is_fetching(&self) -> bool {
        self.in_flight
    }

    /// The most recent page failure, if the last completion failed.
    ///
    /// Cleared by the next successful page and by [`FetchController::refresh`].
    pub fn take_error(&mut self) -> Option<FetchError> {
        self.last_error.take()
    }

    /// Issue the next page request if the feed is ready for one.
    ///
    /// Returns `false` (a no-op) while fetching or once exhausted.
    pub fn request_next(&mut self) -> bool {
        if !self.state.should_load() {
            return false;
        }
        self.state.set_should_load(false);
        self.in_flight = true;

        let offset = self.state.offset();
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let tx = self.completions_tx.clone();
        debug!(offset, limit = self.state.limit(), generation, "Requesting review page");

        let spawned = thread::Builder::new()
            .name("review-page-fetch".to_string())
            .spawn(move || {
                let result = source
                    .fetch_page(offset)
                    .and_then(|bytes| decode_page(&bytes).map_err(FetchError::from));
                // Controller gone; nothing to deliver to.
                let _ = tx.send(PageCompletion {
                    generation,
                    offset,
                    result,
                });
            });

        if let Err(err) = spawned {
            self.complete(PageCompletion {
                generation,
                offset,
                result: Err(FetchError::Spawn(err)),
            });
        }
        true
    }

    /// Apply every completion that has arrived. Non-blocking.
    ///
    /// Returns the number of completions applied; stale ones don't count.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(done) = self.completions_rx.try_recv() {
            if self.complete(done) {
                applied += 1;
            }
        }
        applied
    }

    /// Block until the outstanding page lands or `timeout` elapses.
    ///
    /// Returns `true` when nothing is outstanding afterwards.
    pub fn wait_for_page(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.in_flight {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.completions_rx.recv_timeout(remaining) {
                Ok(done) => {
                    self.complete(done);
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return false,
            }
        }
        true
    }

    /// Lift the line cap of the row with identifier `id`.
    ///
    /// Unknown identifiers are ignored. Returns whether a row was found.
    pub fn expand_text(&mut self, id: ItemId) -> bool {
        if !self.state.replace_review(id, |row| row.with_max_lines(0)) {
            debug!(%id, "Expand requested for unknown row");
            return false;
        }
        self.notify(false);
        true
    }

    /// Clear the feed, announce the empty state, and load the first page.
    ///
    /// A page still in flight from before the refresh is discarded on arrival.
    pub fn refresh(&mut self) {
        self.generation += 1;
        self.in_flight = false;
        self.last_error = None;
        self.state = FeedState::new(self.state.limit());
        debug!(generation = self.generation, "Feed refreshed");
        self.notify(false);
        self.request_next();
    }

    fn complete(&mut self, done: PageCompletion) -> bool {
        if done.generation != self.generation {
            debug!(
                offset = done.offset,
                generation = done.generation,
                current = self.generation,
                "Discarding page from before refresh"
            );
            return false;
        }
        self.in_flight = false;
        self.state.finish_first_load();

        match done.result {
            Ok(page) => {
                self.last_error = None;
                self.apply_page(page);
            }
            Err(err) => {
                warn!(offset = done.offset, error = %err, "Review page fetch failed");
                self.state.set_should_load(true);
                self.last_error = Some(err);
                self.notify(false);
            }
        }
        true
    }

    fn apply_page(&mut self, page: ReviewsPage) {
        let before = self.state.len();
        let received = page.items.len();

        self.state.remove_footer();
        let rows = page
            .items
            .iter()
            .map(|review| review_to_row(review, self.renderer.as_ref()));
        self.state.append_reviews(rows);
        self.state.advance_offset();

        let should_load = self.state.offset() < page.count;
        self.state.set_should_load(should_load);
        if !should_load {
            self.state.push_footer(CountFooter::new(page.count));
        }

        debug!(
            received,
            offset = self.state.offset(),
            total = page.count,
            exhausted = !should_load,
            "Review page applied"
        );
        let appended = self.state.len() > before;
        self.notify(appended);
    }

    fn notify(&mut self, appended: bool) {
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.state, appended);
        }
    }
}

#[cfg(test)]
#[path = "fetch_tests.rs"]
mod tests;
