//! Snapshot diffing: has a feed published anything since the last poll?
//!
//! A [`ChangeDetector`] remembers the links of the most recent snapshot only.
//! Links that drop out of the feed are forgotten, so memory stays bounded by
//! the feed's live item count rather than its history.  The flip side is that
//! an item which leaves the feed and later reappears counts as new again.

use std::collections::HashSet;

use crate::source::{FeedItem, FeedSource, FetchError};

/// Per-feed change detector.
pub struct ChangeDetector {
    source: Box<dyn FeedSource>,
    /// Links present in the last successfully fetched snapshot.
    seen: HashSet<String>,
}

impl ChangeDetector {
    pub fn new(source: Box<dyn FeedSource>) -> Self {
        Self {
            source,
            seen: HashSet::new(),
        }
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Fetch a snapshot and report whether it holds at least one unseen link.
    ///
    /// On a fetch error the seen set is left exactly as it was; callers treat
    /// the poll as "no change" and try again next tick.
    pub fn did_change(&mut self) -> Result<bool, FetchError> {
        Ok(!self.poll()?.is_empty())
    }

    /// Like [`did_change`](Self::did_change), but returns the newly seen items.
    pub fn poll(&mut self) -> Result<Vec<FeedItem>, FetchError> {
        let snapshot = self.source.fetch_latest()?;
        Ok(self.observe(snapshot))
    }

    /// Diff `snapshot` against the previous one and make it the new baseline.
    ///
    /// Returns the first occurrence of every link that was not in the previous
    /// snapshot, in snapshot order.  Disappearing links never count as a change.
    pub fn observe(&mut self, snapshot: Vec<FeedItem>) -> Vec<FeedItem> {
        let mut current = HashSet::with_capacity(snapshot.len());
        let mut fresh = Vec::new();

        for item in snapshot {
            // `insert` is false for a link repeated within this snapshot.
            if current.insert(item.link.clone()) && !self.seen.contains(&item.link) {
                fresh.push(item);
            }
        }

        self.seen = current;
        fresh
    }

    /// Number of links remembered from the last snapshot.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn contains(&self, link: &str) -> bool {
        self.seen.contains(link)
    }
}
