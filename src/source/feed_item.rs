//! The record every feed source produces.
//!
//! `FeedItem` represents a single entry from any source.  Each source converts
//! its native format into `FeedItem`s so that change detection stays
//! source-agnostic.
//!
//! ## For contributors
//!
//! Change detection reads nothing but [`FeedItem::link`].  The other fields
//! exist for logging and for the dashboard's "recent arrivals" list.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A single feed entry, normalised from any data source.
///
/// ## Sorting
///
/// `FeedItem` implements [`Ord`] for **reverse-chronological** ordering:
/// newer items sort before older ones, and items without a date sort last.
/// Ties are broken on the remaining fields, so `cmp` returns `Equal` exactly
/// when `==` holds.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct FeedItem {
    /// Identity of the item within its feed.
    ///
    /// For RSS this is the `<link>` element (falling back to `<guid>`).
    pub link: String,

    /// Human-readable headline.
    pub title: String,

    /// Optional longer description or summary text.
    pub description: Option<String>,

    /// The source's own identifier, when it publishes one.
    pub guid: Option<String>,

    /// Publication timestamp, used for display ordering only.
    pub published: Option<DateTime<Utc>>,

    /// Name of the feed this came from (e.g. "WSJ World").
    pub source_name: String,
}

impl FeedItem {
    /// Minimal item carrying only an identity.
    pub fn with_link(link: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            title: String::new(),
            description: None,
            guid: None,
            published: None,
            source_name: source_name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering — reverse chronological (newest first)
// ---------------------------------------------------------------------------

impl Ord for FeedItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // `other` first so that `Some(newer) > Some(older)` gives us newest-first.
        // `None` is less than `Some(_)`, so undated items sink to the bottom.
        other
            .published
            .cmp(&self.published)
            .then_with(|| self.link.cmp(&other.link))
            .then_with(|| self.source_name.cmp(&other.source_name))
            .then_with(|| self.title.cmp(&other.title))
            .then_with(|| self.guid.cmp(&other.guid))
            .then_with(|| self.description.cmp(&other.description))
    }
}

impl PartialOrd for FeedItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
