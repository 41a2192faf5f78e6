//! Paginated review feed.
//!
//! Pure core: [`model`], [`feed`], [`layout`]. Impure shell: [`source`],
//! [`fetch`], [`image`], [`presentation`], plus the ambient [`config`] and
//! [`logging`] used by the `reviewfeed` driver.

pub mod config;
pub mod feed;
pub mod fetch;
pub mod image;
pub mod layout;
pub mod logging;
pub mod model;
pub mod presentation;
pub mod source;
