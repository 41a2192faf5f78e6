//! Review page sources.
//!
//! A [`DataSource`] hands back the raw bytes of one page. Decoding happens in
//! the fetch controller, so a source never needs to know the page schema.
//!
//! Sources are called from a background worker thread, hence `Send + Sync`.

use crate::model::FetchError;

pub mod file;

pub use file::FileSource;

/// External collaborator that serves raw page payloads.
pub trait DataSource: Send + Sync {
    /// Fetch the page starting at `offset`.
    ///
    /// Blocking: the fetch controller always calls this off the presentation
    /// thread.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::SourceUnavailable`] when no backing resource
    /// exists and [`FetchError::Read`] when it exists but cannot be read.
    fn fetch_page(&self, offset: usize) -> Result<Vec<u8>, FetchError>;
}

impl<T: DataSource + ?Sized> DataSource for std::sync::Arc<T> {
    fn fetch_page(&self, offset: usize) -> Result<Vec<u8>, FetchError> {
        (**self).fetch_page(offset)
    }
}
