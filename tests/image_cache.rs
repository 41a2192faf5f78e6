//! Integration tests for the image cache and slot binding.

use reviewfeed::image::{
    CachePolicy, CancellationToken, FileTransport, ImageCache, ImageSlots, ImageTransport,
    SlotId, SlotImage,
};
use reviewfeed::model::{ImageError, ImageRef};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;

const WAIT: Duration = Duration::from_secs(5);

// ===== Test Helpers =====

fn png_bytes(shade: u8) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([shade, shade, shade, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

fn url(name: &str) -> Url {
    Url::parse(&format!("https://cdn.example/{name}")).expect("valid url")
}

/// Answers every request with a PNG, counting calls per locator.
#[derive(Default)]
struct CountingTransport {
    calls: Mutex<Vec<String>>,
}

impl CountingTransport {
    fn calls_for(&self, url: &Url) -> usize {
        let calls = self.calls.lock().expect("lock");
        calls.iter().filter(|c| c.as_str() == url.as_str()).count()
    }
}

impl ImageTransport for CountingTransport {
    fn fetch(&self, url: &Url, policy: CachePolicy) -> Result<Vec<u8>, ImageError> {
        assert_eq!(policy, CachePolicy::ReturnCacheElseLoad);
        self.calls.lock().expect("lock").push(url.to_string());
        Ok(png_bytes(128))
    }
}

/// Holds requests for `slow` until released; everything else is immediate.
struct GatedTransport {
    slow: Url,
    gate: Mutex<Receiver<()>>,
    started: AtomicUsize,
}

impl GatedTransport {
    fn new(slow: Url) -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let transport = Arc::new(Self {
            slow,
            gate: Mutex::new(rx),
            started: AtomicUsize::new(0),
        });
        (transport, tx)
    }
}

impl ImageTransport for GatedTransport {
    fn fetch(&self, url: &Url, _policy: CachePolicy) -> Result<Vec<u8>, ImageError> {
        if *url == self.slow {
            self.started.fetch_add(1, Ordering::SeqCst);
            let _ = self.gate.lock().expect("lock").recv();
            return Ok(png_bytes(10));
        }
        Ok(png_bytes(250))
    }
}

fn drain(slots: &mut ImageSlots) -> Vec<reviewfeed::image::SlotUpdate> {
    let deadline = Instant::now() + WAIT;
    let mut updates = Vec::new();
    while slots.pending() > 0 && Instant::now() < deadline {
        updates.extend(slots.poll());
        std::thread::sleep(Duration::from_millis(5));
    }
    updates
}

// ===== Cache =====

#[test]
fn second_request_is_served_from_memory() {
    let transport = Arc::new(CountingTransport::default());
    let cache = ImageCache::new(transport.clone(), 2).expect("spawn workers");
    let avatar = url("avatar.png");

    let first = cache
        .fetch(&avatar, &CancellationToken::new())
        .wait(WAIT)
        .expect("loaded");
    let second = cache
        .fetch(&avatar, &CancellationToken::new())
        .wait(WAIT)
        .expect("cached");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(transport.calls_for(&avatar), 1);
    assert_eq!((first.width(), first.height()), (4, 4));
}

#[test]
fn file_locators_load_from_disk() {
    let path = std::env::temp_dir().join("reviewfeed_image_cache_file.png");
    std::fs::write(&path, png_bytes(77)).expect("write png");
    let locator = Url::from_file_path(&path).expect("absolute path");

    let cache = ImageCache::new(Arc::new(FileTransport), 1).expect("spawn workers");
    let image = cache
        .fetch(&locator, &CancellationToken::new())
        .wait(WAIT)
        .expect("loaded from disk");
    let _ = std::fs::remove_file(&path);

    assert_eq!(&image.pixels()[..4], &[77, 77, 77, 255]);
}

// ===== Slots =====

#[test]
fn hit_resolves_at_assignment() {
    let transport = Arc::new(CountingTransport::default());
    let cache = ImageCache::new(transport, 1).expect("spawn workers");
    let avatar = url("warm.png");
    cache.fetch(&avatar, &CancellationToken::new()).wait(WAIT);

    let mut slots = ImageSlots::new();
    let (_, initial) = slots.assign(&cache, SlotId(0), &ImageRef::Remote(avatar));

    assert!(matches!(initial, SlotImage::Loaded(_)));
    assert_eq!(slots.pending(), 0);
}

#[test]
fn late_result_for_reassigned_slot_is_discarded() {
    let slow = url("slow.png");
    let fast = url("fast.png");
    let (transport, release) = GatedTransport::new(slow.clone());
    let cache = ImageCache::new(transport.clone(), 2).expect("spawn workers");
    let mut slots = ImageSlots::new();

    let (stale, _) = slots.assign(&cache, SlotId(7), &ImageRef::Remote(slow.clone()));
    let deadline = Instant::now() + WAIT;
    while transport.started.load(Ordering::SeqCst) == 0 && Instant::now() < deadline {
        std::thread::yield_now();
    }

    // The row scrolled away; the slot now shows another row's image.
    let (current, _) = slots.assign(&cache, SlotId(7), &ImageRef::Remote(fast));
    release.send(()).expect("release");

    let updates = drain(&mut slots);

    assert!(!slots.is_current(stale));
    assert!(slots.is_current(current));
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].ticket, current);
    let image = updates[0].image.as_ref().expect("fast image loaded");
    assert_eq!(&image.pixels()[..4], &[250, 250, 250, 255]);

    // The slow request still completed and was cached, just not applied.
    let deadline = Instant::now() + WAIT;
    while cache.cached(&slow).is_none() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(cache.cached(&slow).is_some());
}

#[test]
fn updates_come_back_in_slot_order() {
    let transport = Arc::new(CountingTransport::default());
    let cache = ImageCache::new(transport, 4).expect("spawn workers");
    let mut slots = ImageSlots::new();

    for i in (0..6).rev() {
        slots.assign(&cache, SlotId(i), &ImageRef::Remote(url(&format!("p{i}.png"))));
    }
    let mut updates = Vec::new();
    let deadline = Instant::now() + WAIT;
    while slots.pending() > 0 && Instant::now() < deadline {
        let batch = slots.poll();
        assert!(batch.windows(2).all(|w| w[0].ticket.slot() < w[1].ticket.slot()));
        updates.extend(batch);
    }

    assert_eq!(updates.len(), 6);
    assert!(updates.iter().all(|u| u.image.is_some()));
}
