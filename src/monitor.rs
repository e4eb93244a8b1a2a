//! One monitored feed: a change detector wired to a rate tracker.

use chrono::{DateTime, Utc};

use crate::clock::Clock;
use crate::detect::ChangeDetector;
use crate::rate::{Baseline, RateTracker};
use crate::source::{FeedItem, FeedSource, FetchError};

/// Point-in-time summary of a [`FeedMonitor`], for logs and the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedStats {
    pub name: String,
    /// Links in the latest snapshot.
    pub tracked: usize,
    /// Polls that found new content.
    pub changes: u64,
    /// Intervals behind `average_secs`.
    pub samples: u64,
    pub average_secs: f64,
    pub last_change: Option<DateTime<Utc>>,
}

impl FeedStats {
    /// Statistics of a feed that has not been polled successfully yet.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracked: 0,
            changes: 0,
            samples: 0,
            average_secs: 0.0,
            last_change: None,
        }
    }
}

pub struct FeedMonitor {
    detector: ChangeDetector,
    tracker: RateTracker,
}

impl FeedMonitor {
    pub fn new(source: Box<dyn FeedSource>, baseline: Baseline) -> Self {
        Self {
            detector: ChangeDetector::new(source),
            tracker: RateTracker::new(baseline),
        }
    }

    pub fn with_clock(source: Box<dyn FeedSource>, baseline: Baseline, clock: Box<dyn Clock>) -> Self {
        Self {
            detector: ChangeDetector::new(source),
            tracker: RateTracker::with_clock(baseline, clock),
        }
    }

    pub fn name(&self) -> &str {
        self.detector.source_name()
    }

    /// Learn what the feed currently holds without counting it as an update.
    ///
    /// Run once at start-up so the first real tick only reacts to items
    /// published after the monitor started.
    pub fn prime(&mut self) -> Result<bool, FetchError> {
        self.detector.did_change()
    }

    /// Poll the feed once; signal the rate tracker if anything new appeared.
    ///
    /// Returns the new items.  Fetch errors are handed back untouched and the
    /// tracker is left alone.
    pub fn update(&mut self) -> Result<Vec<FeedItem>, FetchError> {
        let fresh = self.detector.poll()?;
        if !fresh.is_empty() {
            self.tracker.update();
        }
        Ok(fresh)
    }

    /// Mean seconds between detected updates.
    pub fn average(&self) -> f64 {
        self.tracker.average()
    }

    pub fn tracker(&self) -> &RateTracker {
        &self.tracker
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats {
            name: self.name().to_string(),
            tracked: self.detector.len(),
            changes: self.tracker.events(),
            samples: self.tracker.samples(),
            average_secs: self.tracker.average(),
            // Under `Baseline::Construction` the tracker's last event starts
            // at construction, which is not a change.
            last_change: if self.tracker.events() > 0 {
                self.tracker.last_event()
            } else {
                None
            },
        }
    }
}
