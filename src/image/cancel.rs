//! Cooperative cancellation for image requests.
//!
//! Requests carry a [`CancellationToken`] passed at call time. Cancelling is
//! best effort: a worker checks the token before it starts the transport. A
//! request already past that point still resolves, and its result is
//! discarded by whoever stopped listening.
//!
//! `cancel` and `is_cancelled` are synchronous, so the token works from the
//! plain worker threads of the image cache without an async runtime.

pub use tokio_util::sync::CancellationToken;
