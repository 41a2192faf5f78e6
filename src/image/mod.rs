//! Asynchronous image acquisition with an in-memory cache.
//!
//! # Execution contract
//!
//! - [`ImageCache::fetch`] is called on the presentation thread and never
//!   blocks. A cache hit resolves immediately; a miss is queued for the
//!   worker pool.
//! - Workers run the transport, decode, and insert into the cache **before**
//!   resolving the request.
//! - Results are consumed through the returned [`ImageFetch`] by whoever
//!   polls it, normally the presentation thread (see [`ImageSlots`]).
//! - Failures never propagate: a request resolves to `None` ("absent") and
//!   the caller renders a placeholder.
//!
//! The cache is unbounded and lives as long as the [`ImageCache`]. Concurrent
//! first-time requests for the same locator are not merged; each may hit the
//! transport, and the first decoded image to land becomes the cached one.

pub mod cancel;
pub mod slots;
pub mod transport;

pub use cancel::CancellationToken;
pub use slots::{ImageSlots, SlotId, SlotImage, SlotTicket, SlotUpdate};
pub use transport::{CachePolicy, FileTransport, HttpTransport, ImageTransport, RoutingTransport};

use crate::model::ImageError;
use std::collections::HashMap;
use std::mem;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Default number of image worker threads.
pub const DEFAULT_IMAGE_WORKERS: usize = 4;

/// A decoded RGBA8 bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl DecodedImage {
    /// Decode PNG or JPEG bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major RGBA8 pixels.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Cached images are shared, never copied.
pub type SharedImage = Arc<DecodedImage>;

/// A pending or resolved image request.
///
/// Resolves exactly once; `None` means "render the placeholder".
#[derive(Debug)]
pub struct ImageFetch {
    state: FetchState,
}

#[derive(Debug)]
enum FetchState {
    Ready(Option<SharedImage>),
    Pending(Receiver<Option<SharedImage>>),
    Taken,
}

impl ImageFetch {
    fn ready(image: Option<SharedImage>) -> Self {
        Self {
            state: FetchState::Ready(image),
        }
    }

    fn pending(rx: Receiver<Option<SharedImage>>) -> Self {
        Self {
            state: FetchState::Pending(rx),
        }
    }

    /// True while the result has not arrived yet.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, FetchState::Pending(_))
    }

    /// Take the result if it has arrived. Non-blocking.
    ///
    /// Returns `Some(result)` once, then `None` forever.
    pub fn try_take(&mut self) -> Option<Option<SharedImage>> {
        match mem::replace(&mut self.state, FetchState::Taken) {
            FetchState::Ready(image) => Some(image),
            FetchState::Pending(rx) => match rx.try_recv() {
                Ok(image) => Some(image),
                Err(TryRecvError::Empty) => {
                    self.state = FetchState::Pending(rx);
                    None
                }
                // Worker went away without answering.
                Err(TryRecvError::Disconnected) => Some(None),
            },
            FetchState::Taken => None,
        }
    }

    /// Block until the result arrives or `timeout` elapses.
    pub fn wait(self, timeout: Duration) -> Option<SharedImage> {
        match self.state {
            FetchState::Ready(image) => image,
            FetchState::Pending(rx) => match rx.recv_timeout(timeout) {
                Ok(image) => image,
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
            },
            FetchState::Taken => None,
        }
    }
}

struct Job {
    url: Url,
    cancel: CancellationToken,
    reply: Sender<Option<SharedImage>>,
}

struct Shared {
    entries: Mutex<HashMap<Url, SharedImage>>,
    transport: Arc<dyn ImageTransport>,
}

impl Shared {
    fn get(&self, url: &Url) -> Option<SharedImage> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(url).cloned()
    }

    /// First insert wins so every caller ends up with the same instance.
    fn insert(&self, url: &Url, image: SharedImage) -> SharedImage {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(url.clone()).or_insert(image))
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn load(&self, url: &Url, cancel: &CancellationToken) -> Result<SharedImage, ImageError> {
        if cancel.is_cancelled() {
            return Err(ImageError::Cancelled);
        }
        // Another worker may have landed it while this job sat in the queue.
        if let Some(hit) = self.get(url) {
            return Ok(hit);
        }
        let bytes = self.transport.fetch(url, CachePolicy::ReturnCacheElseLoad)?;
        let decoded = DecodedImage::decode(&bytes).map_err(|source| ImageError::Decode {
            url: url.to_string(),
            source,
        })?;
        Ok(self.insert(url, Arc::new(decoded)))
    }
}

fn worker_loop(shared: &Shared, jobs: &Mutex<Receiver<Job>>) {
    loop {
        let job = {
            let rx = jobs.lock().unwrap_or_else(PoisonError::into_inner);
            rx.recv()
        };
        let Ok(job) = job else {
            // Cache dropped.
            break;
        };

        let result = match shared.load(&job.url, &job.cancel) {
            Ok(image) => {
                debug!(url = %job.url, "Image loaded");
                Some(image)
            }
            Err(err) => {
                debug!(url = %job.url, error = %err, "Image unavailable");
                None
            }
        };
        // A dropped receiver means nobody is listening any more.
        let _ = job.reply.send(result);
    }
}

/// Memory cache in front of an [`ImageTransport`], backed by a worker pool.
pub struct ImageCache {
    shared: Arc<Shared>,
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("entries", &self.shared.len())
            .field("workers", &self.workers.len())
            .finish()
    }
}

impl ImageCache {
    /// Start `workers` background threads (at least one).
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::WorkerSpawn`] if a thread cannot be started.
    pub fn new(transport: Arc<dyn ImageTransport>, workers: usize) -> Result<Self, ImageError> {
        let shared = Arc::new(Shared {
            entries: Mutex::new(HashMap::new()),
            transport,
        });
        let (tx, rx) = mpsc::channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));

        let mut handles = Vec::with_capacity(workers.max(1));
        for index in 0..workers.max(1) {
            let shared = Arc::clone(&shared);
            let rx = Arc::clone(&rx);
            let handle = thread::Builder::new()
                .name(format!("image-worker-{index}"))
                .spawn(move || worker_loop(&shared, &rx))
                .map_err(ImageError::WorkerSpawn)?;
            handles.push(handle);
        }

        Ok(Self {
            shared,
            jobs: Some(tx),
            workers: handles,
        })
    }

    /// Request the image behind `url`.
    ///
    /// Hits resolve immediately without touching the transport. Misses are
    /// queued; `cancel` is checked by the worker before the transport runs.
    pub fn fetch(&self, url: &Url, cancel: &CancellationToken) -> ImageFetch {
        if let Some(hit) = self.shared.get(url) {
            trace!(%url, "Image cache hit");
            return ImageFetch::ready(Some(hit));
        }

        let (reply, rx) = mpsc::channel();
        let job = Job {
            url: url.clone(),
            cancel: cancel.clone(),
            reply,
        };
        match &self.jobs {
            Some(jobs) if jobs.send(job).is_ok() => ImageFetch::pending(rx),
            _ => ImageFetch::ready(None),
        }
    }

    /// Cached image for `url`, if any. Never queues work.
    pub fn cached(&self, url: &Url) -> Option<SharedImage> {
        self.shared.get(url)
    }

    /// Number of cached images.
    pub fn len(&self) -> usize {
        self.shared.len()
    }

    /// True when nothing is cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ImageCache {
    fn drop(&mut self) {
        // Closing the queue ends every worker loop after its current job.
        self.jobs.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "image_tests.rs"]
mod tests;
