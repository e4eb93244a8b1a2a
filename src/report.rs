//! Where poll results go.
//!
//! The driver hands every outcome to a [`Reporter`] it was given at start-up.
//! Detection and rate tracking never log on their own, which keeps them free
//! of global state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use chrono::Utc;

use crate::monitor::FeedStats;
use crate::poll::PollMsg;
use crate::source::{FeedItem, FetchError};

pub trait Reporter: Send + Sync {
    /// A poll of `feed` found items that were not in the previous snapshot.
    fn new_items(&self, feed: &str, items: &[FeedItem]);

    /// A poll of `feed` failed; it will be retried next tick.
    fn fetch_failed(&self, feed: &str, error: &FetchError);

    /// A poll of one feed succeeded; `stats` reflect it.
    fn polled(&self, stats: &FeedStats);

    /// Periodic rate report for one feed.
    fn average(&self, stats: &FeedStats);

    /// Every feed has been polled for this tick.
    fn cycle_finished(&self, tick: u64, failures: usize);

    /// Whoever consumes the reports has gone away and polling can stop.
    fn is_closed(&self) -> bool {
        false
    }
}

/// Reports through `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn new_items(&self, feed: &str, items: &[FeedItem]) {
        tracing::info!(feed, new = items.len(), "found new articles");
        for item in items {
            tracing::debug!(feed, link = %item.link, title = %item.title, "new article");
        }
    }

    fn fetch_failed(&self, feed: &str, error: &FetchError) {
        if error.is_transport() {
            tracing::warn!(feed, %error, "error fetching feed");
        } else {
            tracing::error!(feed, %error, "error reading feed");
        }
    }

    fn polled(&self, stats: &FeedStats) {
        tracing::debug!(feed = %stats.name, tracked = stats.tracked, "polled");
    }

    fn average(&self, stats: &FeedStats) {
        tracing::info!(
            feed = %stats.name,
            average_secs = stats.average_secs,
            samples = stats.samples,
            "average time between updates"
        );
    }

    fn cycle_finished(&self, tick: u64, failures: usize) {
        tracing::debug!(tick, failures, "poll cycle finished");
    }
}

/// Forwards outcomes to the terminal UI, logging them as well.
///
/// A closed channel means the UI has exited; the reporter then reports
/// itself closed and later sends are dropped.
pub struct ChannelReporter {
    tx: Sender<PollMsg>,
    log: TracingReporter,
    closed: AtomicBool,
}

impl ChannelReporter {
    pub fn new(tx: Sender<PollMsg>) -> Self {
        Self {
            tx,
            log: TracingReporter,
            closed: AtomicBool::new(false),
        }
    }

    fn send(&self, msg: PollMsg) {
        if self.tx.send(msg).is_err() {
            self.closed.store(true, Ordering::Relaxed);
        }
    }
}

impl Reporter for ChannelReporter {
    fn new_items(&self, feed: &str, items: &[FeedItem]) {
        self.log.new_items(feed, items);
        self.send(PollMsg::NewItems(items.to_vec()));
    }

    fn fetch_failed(&self, feed: &str, error: &FetchError) {
        self.log.fetch_failed(feed, error);
        self.send(PollMsg::Error {
            feed: feed.to_string(),
            message: error.to_string(),
        });
    }

    fn polled(&self, stats: &FeedStats) {
        self.log.polled(stats);
        self.send(PollMsg::Polled(stats.clone()));
    }

    fn average(&self, stats: &FeedStats) {
        self.log.average(stats);
    }

    fn cycle_finished(&self, tick: u64, failures: usize) {
        self.log.cycle_finished(tick, failures);
        self.send(PollMsg::CycleFinished {
            at: Utc::now(),
            failures,
        });
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}
