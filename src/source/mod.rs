//! Feed source abstraction layer.
//!
//! This module defines the [`FeedSource`] trait, the [`FeedItem`] record and
//! the [`FetchError`] every source reports.  Concrete sources live in
//! sub-modules: [`RssSource`] fetches over HTTP, [`FileSource`] reads a local
//! document.
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Define a struct (e.g. `AtomSource`) and implement [`FeedSource`] for it.
//! 3. Add `mod atom;` below and re-export your struct in the `pub use` block.
//! 4. Teach `config::FeedLocation` how to build it.
//!
//! Change detection and rate tracking only ever see `dyn FeedSource`, so
//! nothing else needs to change.

mod error;
mod feed_item;
mod file;
mod rss;

#[cfg(test)]
pub mod scripted;

pub use error::FetchError;
pub use feed_item::FeedItem;
pub use file::FileSource;
pub use rss::RssSource;

/// Trait that every feed source must implement.
///
/// The poller calls [`fetch_latest()`](FeedSource::fetch_latest) once per
/// tick, possibly from a background thread, so implementations must be
/// [`Send`].
///
/// ## Implementing a new source
///
/// ```ignore
/// pub struct MySource { /* config fields */ }
///
/// impl FeedSource for MySource {
///     fn name(&self) -> &str { "my-source" }
///
///     fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
///         // Perform HTTP / IO, then convert into FeedItem values.
///         todo!()
///     }
/// }
/// ```
pub trait FeedSource: Send {
    /// Human-readable label used in logs and the dashboard.
    fn name(&self) -> &str;

    /// Fetch the full current snapshot of the feed.
    ///
    /// Blocking implementations must bound their own I/O with a timeout so a
    /// stuck feed cannot stall the poll cycle.
    fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError>;
}
