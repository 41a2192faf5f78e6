//! File-backed review source.
//!
//! Reads a whole-feed payload (`{"count": N, "items": [...]}`) from disk and
//! serves the `[offset, offset + limit)` window of its items, so a local file
//! behaves like a paged endpoint.

use super::DataSource;
use crate::model::FetchError;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Bundled payload, relative to the repository root.
pub const DEFAULT_PAYLOAD_PATH: &str = "assets/getReviews.response.json";

/// Paged reader over a JSON payload file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    limit: usize,
    latency: Option<Duration>,
}

impl FileSource {
    /// Create a source serving pages of `limit` items from `path`.
    ///
    /// The file is not touched until the first fetch; a missing file surfaces
    /// as [`FetchError::SourceUnavailable`] at that point.
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        Self {
            path: path.into(),
            limit: limit.max(1),
            latency: None,
        }
    }

    /// Sleep this long before every read, simulating a slow backend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Payload file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn resource(&self) -> String {
        self.path.display().to_string()
    }
}

impl DataSource for FileSource {
    fn fetch_page(&self, offset: usize) -> Result<Vec<u8>, FetchError> {
        if !self.path.exists() {
            return Err(FetchError::SourceUnavailable {
                resource: self.resource(),
            });
        }

        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }

        let bytes = std::fs::read(&self.path).map_err(|source| match source.kind() {
            // Deleted between the existence check and the read.
            ErrorKind::NotFound => FetchError::SourceUnavailable {
                resource: self.resource(),
            },
            _ => FetchError::Read {
                resource: self.resource(),
                source,
            },
        })?;

        debug!(path = %self.path.display(), offset, limit = self.limit, "Read review payload");
        Ok(page_window(bytes, offset, self.limit))
    }
}

/// Cut the `items` array of a payload down to one page.
///
/// Payloads that are not JSON objects with an `items` array are passed through
/// untouched; the decoder will report them.
fn page_window(bytes: Vec<u8>, offset: usize, limit: usize) -> Vec<u8> {
    let Ok(mut value) = serde_json::from_slice::<Value>(&bytes) else {
        return bytes;
    };
    let Some(items) = value.get_mut("items").and_then(Value::as_array_mut) else {
        return bytes;
    };
    let page: Vec<Value> = items.iter().skip(offset).take(limit).cloned().collect();
    *items = page;
    serde_json::to_vec(&value).unwrap_or(bytes)
}
