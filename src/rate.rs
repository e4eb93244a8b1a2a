//! Running mean of the time between feed updates.
//!
//! Only the mean and the sample count are kept.  Each new interval `e` is
//! folded in as `avg * n/(n+1) + e/(n+1)`, so after `k` samples the value is
//! the arithmetic mean of those `k` intervals.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::clock::{Clock, SystemClock};

/// Where the first measured interval starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Baseline {
    /// Construction counts as event zero; the first update yields a sample.
    #[default]
    Construction,
    /// The first update only starts the clock; samples begin with the second.
    FirstEvent,
}

pub struct RateTracker {
    clock: Box<dyn Clock>,
    last_event: Option<DateTime<Utc>>,
    /// Mean interval in seconds.
    average: f64,
    samples: u64,
    events: u64,
}

impl RateTracker {
    pub fn new(baseline: Baseline) -> Self {
        Self::with_clock(baseline, Box::new(SystemClock))
    }

    pub fn with_clock(baseline: Baseline, clock: Box<dyn Clock>) -> Self {
        let last_event = match baseline {
            Baseline::Construction => Some(clock.now()),
            Baseline::FirstEvent => None,
        };
        Self {
            clock,
            last_event,
            average: 0.0,
            samples: 0,
            events: 0,
        }
    }

    /// Record that the feed updated now.
    pub fn update(&mut self) {
        let now = self.clock.now();
        self.events += 1;

        if let Some(last) = self.last_event {
            // A wall clock stepping backwards must not produce a negative interval.
            let elapsed = (now - last)
                .to_std()
                .map(|d| d.as_secs_f64())
                .unwrap_or(0.0);

            let n = self.samples as f64;
            self.average = self.average * (n / (n + 1.0)) + elapsed / (n + 1.0);
            self.samples += 1;
        }

        self.last_event = Some(now);
    }

    /// Mean seconds between updates; 0.0 until the first interval is measured.
    pub fn average(&self) -> f64 {
        self.average
    }

    /// Number of intervals folded into [`average`](Self::average).
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Number of [`update`](Self::update) calls.
    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn last_event(&self) -> Option<DateTime<Utc>> {
        self.last_event
    }
}
