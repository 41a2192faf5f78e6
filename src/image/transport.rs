//! Image transports: where image bytes come from.
//!
//! Transports are blocking and run on image worker threads. They never decode.

use crate::model::ImageError;
use reqwest::blocking::Client;
use reqwest::header::CACHE_CONTROL;
use url::Url;

/// How a transport should treat its own caches.
///
/// A request hint, not a guarantee. [`HttpTransport`] keeps no response cache
/// of its own: it sends the policy as a `Cache-Control` request header
/// (`max-stale` or `no-cache`), so only intermediaries between the client and
/// the origin can honour it. [`FileTransport`] always reads the file. The
/// process-lifetime cache is [`super::ImageCache`] itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Serve cached bytes when available, otherwise load.
    #[default]
    ReturnCacheElseLoad,
    /// Always go to the origin.
    ReloadIgnoringCache,
}

impl CachePolicy {
    /// `Cache-Control` value sent with HTTP requests.
    pub fn cache_control(self) -> &'static str {
        match self {
            CachePolicy::ReturnCacheElseLoad => "max-stale",
            CachePolicy::ReloadIgnoringCache => "no-cache",
        }
    }
}

/// Delivers the bytes behind a resource locator.
pub trait ImageTransport: Send + Sync {
    /// # Errors
    ///
    /// Returns [`ImageError::Transport`] when the bytes cannot be delivered.
    fn fetch(&self, url: &Url, policy: CachePolicy) -> Result<Vec<u8>, ImageError>;
}

fn transport_error(url: &Url, reason: impl ToString) -> ImageError {
    ImageError::Transport {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}

/// Reads `file://` locators from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTransport;

impl ImageTransport for FileTransport {
    fn fetch(&self, url: &Url, _policy: CachePolicy) -> Result<Vec<u8>, ImageError> {
        let path = url
            .to_file_path()
            .map_err(|()| transport_error(url, "not a local file locator"))?;
        std::fs::read(&path).map_err(|e| transport_error(url, e))
    }
}

/// Fetches `http`/`https` locators with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`ImageError::Transport`] if the TLS backend cannot be set up.
    pub fn new() -> Result<Self, ImageError> {
        let client = Client::builder()
            .user_agent(concat!("reviewfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ImageError::Transport {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl ImageTransport for HttpTransport {
    fn fetch(&self, url: &Url, policy: CachePolicy) -> Result<Vec<u8>, ImageError> {
        let response = self
            .client
            .get(url.as_str())
            .header(CACHE_CONTROL, policy.cache_control())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| transport_error(url, e))?;
        let bytes = response.bytes().map_err(|e| transport_error(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Dispatches by scheme: `file` to [`FileTransport`], `http(s)` to
/// [`HttpTransport`] when one is configured.
#[derive(Debug, Clone, Default)]
pub struct RoutingTransport {
    file: FileTransport,
    http: Option<HttpTransport>,
}

impl RoutingTransport {
    /// Router without HTTP support when `http` is `None`.
    pub fn new(http: Option<HttpTransport>) -> Self {
        Self {
            file: FileTransport,
            http,
        }
    }
}

impl ImageTransport for RoutingTransport {
    fn fetch(&self, url: &Url, policy: CachePolicy) -> Result<Vec<u8>, ImageError> {
        match (url.scheme(), &self.http) {
            ("file", _) => self.file.fetch(url, policy),
            ("http" | "https", Some(http)) => http.fetch(url, policy),
            (scheme, _) => Err(transport_error(
                url,
                format!("no transport for scheme '{scheme}'"),
            )),
        }
    }
}
