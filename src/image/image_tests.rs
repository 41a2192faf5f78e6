//! Tests for the image cache and its worker pool.

use super::*;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

// ===== Test Helpers =====

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// Serves fixed bytes and counts how often it was asked.
struct CountingTransport {
    bytes: Vec<u8>,
    calls: AtomicUsize,
}

impl CountingTransport {
    fn new(bytes: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            bytes,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageTransport for CountingTransport {
    fn fetch(&self, _url: &Url, _policy: CachePolicy) -> Result<Vec<u8>, ImageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes.clone())
    }
}

fn url(name: &str) -> Url {
    Url::parse(&format!("https://cdn.example/{name}")).expect("valid url")
}

const WAIT: Duration = Duration::from_secs(5);

// ===== Decoding =====

#[test]
fn decode_produces_rgba_pixels() {
    let decoded = DecodedImage::decode(&png_bytes(3, 2)).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (3, 2));
    assert_eq!(decoded.pixels().len(), 3 * 2 * 4);
    assert_eq!(&decoded.pixels()[..4], &[200, 10, 10, 255]);
}

#[test]
fn decode_rejects_garbage() {
    assert!(DecodedImage::decode(b"not an image").is_err());
}

// ===== Cache behavior =====

#[test]
fn miss_loads_then_hit_resolves_immediately() {
    let transport = CountingTransport::new(png_bytes(1, 1));
    let cache = ImageCache::new(transport.clone(), 2).expect("spawn workers");
    let avatar = url("avatar.png");

    let first = cache
        .fetch(&avatar, &CancellationToken::new())
        .wait(WAIT)
        .expect("first load");

    let mut second = cache.fetch(&avatar, &CancellationToken::new());
    assert!(!second.is_pending(), "hit must not queue work");
    let second = second.try_take().flatten().expect("cached image");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(transport.calls(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn cached_reports_only_landed_images() {
    let transport = CountingTransport::new(png_bytes(1, 1));
    let cache = ImageCache::new(transport, 1).expect("spawn workers");
    let photo = url("photo.png");

    assert!(cache.cached(&photo).is_none());
    cache.fetch(&photo, &CancellationToken::new()).wait(WAIT);
    assert!(cache.cached(&photo).is_some());
}

#[test]
fn cancelled_request_skips_transport() {
    let transport = CountingTransport::new(png_bytes(1, 1));
    let cache = ImageCache::new(transport.clone(), 1).expect("spawn workers");
    let token = CancellationToken::new();
    token.cancel();

    let result = cache.fetch(&url("late.png"), &token).wait(WAIT);

    assert!(result.is_none());
    assert_eq!(transport.calls(), 0);
    assert!(cache.is_empty());
}

#[test]
fn undecodable_bytes_resolve_absent_and_are_not_cached() {
    let transport = CountingTransport::new(b"<html>404</html>".to_vec());
    let cache = ImageCache::new(transport, 1).expect("spawn workers");

    let result = cache.fetch(&url("broken.png"), &CancellationToken::new()).wait(WAIT);

    assert!(result.is_none());
    assert!(cache.is_empty());
}

#[test]
fn result_is_taken_once() {
    let transport = CountingTransport::new(png_bytes(1, 1));
    let cache = ImageCache::new(transport, 1).expect("spawn workers");
    let avatar = url("once.png");
    cache.fetch(&avatar, &CancellationToken::new()).wait(WAIT);

    let mut fetch = cache.fetch(&avatar, &CancellationToken::new());
    assert!(fetch.try_take().is_some());
    assert!(fetch.try_take().is_none());
}

#[test]
fn concurrent_duplicates_converge_on_one_instance() {
    let transport = CountingTransport::new(png_bytes(2, 2));
    let cache = ImageCache::new(transport, 4).expect("spawn workers");
    let shared = url("shared.png");

    let fetches: Vec<_> = (0..8)
        .map(|_| cache.fetch(&shared, &CancellationToken::new()))
        .collect();
    let images: Vec<_> = fetches
        .into_iter()
        .map(|f| f.wait(WAIT).expect("loaded"))
        .collect();

    let canonical = cache.cached(&shared).expect("cached");
    assert!(images.iter().all(|img| Arc::ptr_eq(img, &canonical)));
    assert_eq!(cache.len(), 1);
}

#[test]
fn zero_workers_still_serves_requests() {
    let transport = CountingTransport::new(png_bytes(1, 1));
    let cache = ImageCache::new(transport, 0).expect("spawn workers");
    assert!(cache.fetch(&url("a.png"), &CancellationToken::new()).wait(WAIT).is_some());
}
