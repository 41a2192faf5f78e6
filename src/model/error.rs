//! Error types for reviewfeed.
//!
//! This module defines the error taxonomy using `thiserror`. Errors compose via
//! `?` and `From` conversions.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error for the command-line driver
//!   - [`FetchError`] - Page acquisition and decoding failures
//!   - [`ImageError`] - Image acquisition failures
//!   - `std::io::Error` - Output failures
//!
//! # Error Recovery Strategy
//!
//! Every feed error is **recoverable**. A [`FetchError`] leaves the already
//! loaded rows untouched and re-arms pagination so the next scroll (or an
//! explicit retry) fetches the same page again. An [`ImageError`] never
//! reaches the feed: the image cache logs it and resolves the request as
//! "absent", which the presentation layer renders as a placeholder.

use thiserror::Error;

/// Top-level error for the command-line driver.
///
/// The library itself never returns this type; it exists so `main` can use `?`
/// across configuration, logging and feed failures.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Tracing subscriber could not be installed.
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// The first page could not be fetched, so there is nothing to show.
    #[error("Failed to load reviews: {0}")]
    Fetch(#[from] FetchError),

    /// Image workers could not be started.
    #[error("Image cache error: {0}")]
    Image(#[from] ImageError),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors encountered while acquiring one page of reviews.
///
/// # Recovery
///
/// All variants take the same path through the fetch controller: items stay as
/// they are, `should_load` becomes `true` again and a state change with
/// `appended = false` is emitted.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No backing resource exists for the data source.
    ///
    /// For the file source this means the payload file is missing.
    #[error("Review source unavailable: {resource}")]
    SourceUnavailable {
        /// Human-readable name of the missing resource (path or URL).
        resource: String,
    },

    /// The resource exists but reading it failed.
    #[error("Failed to read reviews from {resource}: {source}")]
    Read {
        /// Human-readable name of the resource.
        resource: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The payload was read but does not match the expected page shape.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The background fetch worker could not be started.
    #[error("Failed to start page fetch: {0}")]
    Spawn(#[source] std::io::Error),
}

/// A page payload that could not be decoded.
///
/// Wraps the `serde_json` cause so the position of the mismatch is kept in the
/// message.
#[derive(Debug, Error)]
#[error("Malformed review page: {0}")]
pub struct DecodeError(#[from] serde_json::Error);

/// Errors encountered while acquiring an image.
///
/// Only [`ImageError::WorkerSpawn`] is ever returned to a caller. The other
/// variants are logged inside the cache and collapse to "absent".
#[derive(Debug, Error)]
pub enum ImageError {
    /// The transport could not deliver bytes for the locator.
    #[error("Image transport failed for {url}: {reason}")]
    Transport {
        /// Resource locator that failed.
        url: String,
        /// Transport-specific failure description.
        reason: String,
    },

    /// Bytes arrived but are not a decodable image.
    #[error("Image decode failed for {url}: {source}")]
    Decode {
        /// Resource locator whose bytes failed to decode.
        url: String,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },

    /// The request was cancelled before the transport was invoked.
    #[error("Image request cancelled")]
    Cancelled,

    /// A worker thread could not be spawned.
    #[error("Failed to spawn image worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}
