//! The poll loop.
//!
//! Every tick polls each monitor in turn, one at a time, and hands the
//! outcomes to a [`Reporter`].  Every `report_every` ticks the running
//! averages are reported as well.
//!
//! Two drivers share [`Poller`]:
//!
//! * [`spawn`] runs it on a dedicated thread for the terminal UI, which
//!   receives [`PollMsg`]s over an [`mpsc`](std::sync::mpsc) channel.
//! * [`run`] drives it from a [`tokio`] interval for headless use and stops on
//!   Ctrl-C.  [`run_until`] is the same loop with the stop condition passed
//!   in.

use std::future::Future;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::monitor::{FeedMonitor, FeedStats};
use crate::report::Reporter;
use crate::source::FeedItem;

/// Messages sent from the poller thread to the UI thread.
#[derive(Debug)]
pub enum PollMsg {
    /// A feed published these items since its last poll.
    NewItems(Vec<FeedItem>),
    /// Fresh statistics for one feed after a successful poll.
    Polled(FeedStats),
    /// A fetch failed.
    Error { feed: String, message: String },
    /// All feeds have been polled for this tick.
    CycleFinished { at: DateTime<Utc>, failures: usize },
}

/// The monitors plus the bookkeeping both drivers need.
pub struct Poller {
    monitors: Vec<FeedMonitor>,
    reporter: Arc<dyn Reporter>,
    report_every: u64,
    tick: u64,
}

impl Poller {
    pub fn new(monitors: Vec<FeedMonitor>, reporter: Arc<dyn Reporter>, report_every: u32) -> Self {
        Self {
            monitors,
            reporter,
            report_every: u64::from(report_every.max(1)),
            tick: 0,
        }
    }

    /// Record what every feed holds right now, without counting updates.
    pub fn prime(&mut self) {
        for monitor in &mut self.monitors {
            match monitor.prime() {
                Ok(_) => {
                    let stats = monitor.stats();
                    tracing::info!(feed = %stats.name, tracked = stats.tracked, "primed");
                    self.reporter.polled(&stats);
                }
                Err(e) => self.reporter.fetch_failed(monitor.name(), &e),
            }
        }
    }

    /// Run one tick: poll every monitor, then maybe report averages.
    ///
    /// Returns the number of feeds whose fetch failed.
    pub fn tick(&mut self) -> usize {
        self.tick += 1;
        let mut failures = 0;

        for monitor in &mut self.monitors {
            match monitor.update() {
                Ok(fresh) => {
                    if !fresh.is_empty() {
                        self.reporter.new_items(monitor.name(), &fresh);
                    }
                    self.reporter.polled(&monitor.stats());
                }
                Err(e) => {
                    failures += 1;
                    self.reporter.fetch_failed(monitor.name(), &e);
                }
            }
        }

        if self.tick % self.report_every == 0 {
            for monitor in &self.monitors {
                self.reporter.average(&monitor.stats());
            }
        }

        self.reporter.cycle_finished(self.tick, failures);
        failures
    }

    pub fn monitors(&self) -> &[FeedMonitor] {
        &self.monitors
    }

    /// Nobody is listening for reports any more.
    pub fn is_closed(&self) -> bool {
        self.reporter.is_closed()
    }
}

/// Spawn the background polling thread.
///
/// The thread primes every monitor, then ticks on a fixed schedule.  A tick
/// that overruns its slot is followed immediately by the next one.  The
/// thread exits once the reporter says its consumer is gone.
pub fn spawn(mut poller: Poller, interval: Duration) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        poller.prime();
        let mut deadline = Instant::now() + interval;
        while !poller.is_closed() {
            thread::sleep(deadline.saturating_duration_since(Instant::now()));
            poller.tick();
            deadline = (deadline + interval).max(Instant::now());
        }
        tracing::debug!("report consumer gone, poll thread exiting");
    })
}

/// Poll on a [`tokio`] interval until Ctrl-C.
pub async fn run(poller: Poller, interval: Duration) -> Result<()> {
    run_until(poller, interval, async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Poll on a [`tokio`] interval until `shutdown` completes.
///
/// Prime and each tick run on the blocking pool because sources do blocking
/// I/O.  A shutdown that arrives mid-cycle lets that cycle finish, then stops
/// without starting another.
pub async fn run_until<F>(mut poller: Poller, interval: Duration, shutdown: F) -> Result<()>
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut stopping = false;

    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut cycle = tokio::task::spawn_blocking(move || {
        poller.prime();
        poller
    });

    loop {
        poller = loop {
            tokio::select! {
                biased;
                _ = &mut shutdown, if !stopping => {
                    tracing::info!("interrupted, finishing current poll");
                    stopping = true;
                }
                joined = &mut cycle => break joined?,
            }
        };

        if !stopping {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    tracing::info!("interrupted, shutting down");
                    stopping = true;
                }
                _ = ticker.tick() => {}
            }
        }
        if stopping {
            break;
        }

        cycle = tokio::task::spawn_blocking(move || {
            poller.tick();
            poller
        });
    }

    // Blocking HTTP clients must not be dropped on a runtime worker.
    tokio::task::spawn_blocking(move || drop(poller)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{mpsc, Mutex};

    use crate::clock::ManualClock;
    use crate::rate::Baseline;
    use crate::report::ChannelReporter;
    use crate::source::scripted::{items, ScriptedSource, Step};
    use crate::source::{FeedSource, FetchError};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl Recorder {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut self.0.lock().unwrap())
        }
    }

    impl Reporter for Recorder {
        fn new_items(&self, feed: &str, items: &[FeedItem]) {
            self.0.lock().unwrap().push(format!("new {feed} {}", items.len()));
        }
        fn fetch_failed(&self, feed: &str, _error: &FetchError) {
            self.0.lock().unwrap().push(format!("fail {feed}"));
        }
        fn polled(&self, _stats: &FeedStats) {}
        fn average(&self, stats: &FeedStats) {
            self.0.lock().unwrap().push(format!("avg {}", stats.name));
        }
        fn cycle_finished(&self, tick: u64, failures: usize) {
            self.0.lock().unwrap().push(format!("done {tick} {failures}"));
        }
    }

    fn poller(report_every: u32, feeds: Vec<(&str, Vec<Step>)>) -> (Poller, Arc<Recorder>, ManualClock) {
        let clock = ManualClock::new();
        let monitors = feeds
            .into_iter()
            .map(|(name, steps)| {
                FeedMonitor::with_clock(
                    Box::new(ScriptedSource::new(name, steps)),
                    Baseline::Construction,
                    Box::new(clock.clone()),
                )
            })
            .collect();
        let recorder = Arc::new(Recorder::default());
        (Poller::new(monitors, recorder.clone(), report_every), recorder, clock)
    }

    #[test]
    fn prime_does_not_report_new_items() {
        let (mut p, rec, _) = poller(2, vec![("a", vec![Step::Links(vec!["1", "2"])])]);
        p.prime();
        assert!(rec.take().is_empty());
        assert_eq!(p.monitors()[0].stats().tracked, 2);
        assert_eq!(p.monitors()[0].tracker().events(), 0);
    }

    #[test]
    fn tick_polls_every_feed_in_order() {
        let (mut p, rec, _) = poller(
            10,
            vec![
                ("a", vec![Step::Links(vec!["1"]), Step::Links(vec!["1", "2", "3"])]),
                ("b", vec![Step::Links(vec!["x"]), Step::Fail]),
            ],
        );
        p.prime();

        assert_eq!(p.tick(), 1);
        assert_eq!(rec.take(), ["new a 2", "fail b", "done 1 1"]);
    }

    #[test]
    fn averages_reported_every_nth_tick() {
        let (mut p, rec, clock) = poller(2, vec![("a", vec![]), ("b", vec![])]);
        p.prime();

        clock.advance_secs(300.0);
        p.tick();
        assert_eq!(rec.take(), ["done 1 0"]);

        clock.advance_secs(300.0);
        p.tick();
        assert_eq!(rec.take(), ["avg a", "avg b", "done 2 0"]);
    }

    #[test]
    fn failed_feed_is_retried_next_tick() {
        let (mut p, rec, _) = poller(
            5,
            vec![("a", vec![Step::Links(vec!["1"]), Step::Fail, Step::Links(vec!["1", "2"])])],
        );
        p.prime();

        p.tick();
        p.tick();
        assert_eq!(rec.take(), ["fail a", "done 1 1", "new a 1", "done 2 0"]);
    }

    // -- drivers -------------------------------------------------------------

    fn label(msg: &PollMsg) -> String {
        match msg {
            PollMsg::NewItems(batch) => format!("new {}", batch.len()),
            PollMsg::Polled(stats) => format!("polled {} {}", stats.name, stats.tracked),
            PollMsg::Error { feed, .. } => format!("fail {feed}"),
            PollMsg::CycleFinished { failures, .. } => format!("done {failures}"),
        }
    }

    fn channel_poller(steps: Vec<Step>) -> (Poller, mpsc::Receiver<PollMsg>) {
        let (tx, rx) = mpsc::channel();
        let monitor = FeedMonitor::new(Box::new(ScriptedSource::new("a", steps)), Baseline::Construction);
        (Poller::new(vec![monitor], Arc::new(ChannelReporter::new(tx)), 10), rx)
    }

    /// Takes a while to answer, like a slow server.
    struct SlowSource(Duration);

    impl FeedSource for SlowSource {
        fn name(&self) -> &str {
            "slow"
        }

        fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
            thread::sleep(self.0);
            Ok(items("slow", &["1"]))
        }
    }

    #[tokio::test]
    async fn run_until_primes_then_ticks_until_shutdown() {
        let (p, rx) = channel_poller(vec![
            Step::Links(vec!["1"]),
            Step::Links(vec!["1", "2"]),
            Step::Links(vec!["1", "2", "3"]),
        ]);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let after_two_cycles = async move {
            loop {
                {
                    let mut log = log.lock().unwrap();
                    log.extend(rx.try_iter().map(|m| label(&m)));
                    if log.iter().filter(|l| l.starts_with("done")).count() >= 2 {
                        return;
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        };

        tokio::time::timeout(
            Duration::from_secs(5),
            run_until(p, Duration::from_millis(10), after_two_cycles),
        )
        .await
        .expect("driver stops after shutdown")
        .unwrap();

        let log = seen.lock().unwrap();
        assert_eq!(
            log[..7],
            ["polled a 1", "new 1", "polled a 2", "done 0", "new 1", "polled a 3", "done 0"]
        );
    }

    #[tokio::test]
    async fn run_until_honours_shutdown_during_a_slow_poll() {
        let recorder = Arc::new(Recorder::default());
        let monitor = FeedMonitor::new(Box::new(SlowSource(Duration::from_millis(300))), Baseline::Construction);
        let p = Poller::new(vec![monitor], recorder.clone(), 1);

        // Fires while the first fetch is still blocked.
        let shutdown = tokio::time::sleep(Duration::from_millis(100));

        tokio::time::timeout(Duration::from_secs(5), run_until(p, Duration::from_millis(10), shutdown))
            .await
            .expect("a single shutdown is enough")
            .unwrap();

        assert!(recorder.take().is_empty(), "no tick starts after shutdown");
    }

    #[test]
    fn spawned_thread_reports_prime_then_ticks() {
        let (p, rx) = channel_poller(vec![Step::Links(vec!["1"]), Step::Links(vec!["1", "2"])]);
        let _handle = spawn(p, Duration::from_millis(10));

        let first: Vec<_> = (0..4)
            .map(|_| label(&rx.recv_timeout(Duration::from_secs(5)).unwrap()))
            .collect();
        assert_eq!(first, ["polled a 1", "new 1", "polled a 2", "done 0"]);
    }

    #[test]
    fn spawned_thread_exits_when_receiver_dropped() {
        let (p, rx) = channel_poller(vec![Step::Links(vec!["1"])]);
        let handle = spawn(p, Duration::from_millis(10));

        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        drop(rx);

        let waited = Instant::now();
        while !handle.is_finished() {
            assert!(waited.elapsed() < Duration::from_secs(5), "poll thread kept running");
            thread::sleep(Duration::from_millis(5));
        }
        handle.join().unwrap();
    }
}
