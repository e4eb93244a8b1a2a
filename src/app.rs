use std::collections::HashSet;

use ratatui::widgets::ListState;

use crate::monitor::FeedStats;
use crate::poll::PollMsg;
use crate::source::FeedItem;

/// How many recently arrived items the dashboard keeps.
pub const RECENT_CAP: usize = 200;

/// One line of the feed table.
#[derive(Debug, Clone)]
pub struct FeedRow {
    pub stats: FeedStats,
    pub last_error: Option<String>,
}

pub struct App {
    /// Feeds in the order they were first reported.
    pub feeds: Vec<FeedRow>,
    /// Recently arrived items, reverse-chronological.
    pub recent: Vec<FeedItem>,
    /// `(feed, link)` pairs currently in `recent`.
    seen: HashSet<(String, String)>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last poll status message.
    pub status: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            feeds: Vec::new(),
            recent: Vec::new(),
            seen: HashSet::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
        }
    }

    /// Fold one message from the poller into the dashboard state.
    pub fn apply(&mut self, msg: PollMsg) {
        match msg {
            PollMsg::NewItems(items) => {
                let count = items.len();
                if let Some(feed) = items.first().map(|i| i.source_name.clone()) {
                    self.status = format!("{count} new from {feed}");
                }
                self.merge_items(items);
            }
            PollMsg::Polled(stats) => self.upsert_stats(stats),
            PollMsg::Error { feed, message } => {
                self.status = format!("Error: {feed}: {message}");
                match self.row_mut(&feed) {
                    Some(row) => row.last_error = Some(message),
                    None => self.feeds.push(FeedRow {
                        stats: FeedStats::empty(feed),
                        last_error: Some(message),
                    }),
                }
            }
            PollMsg::CycleFinished { at, failures } => {
                let at = at.with_timezone(&chrono::Local).format("%H:%M:%S");
                self.status = match failures {
                    0 => format!("Polled at {at}"),
                    n => format!("Polled at {at}, {n} failed"),
                };
            }
        }
    }

    fn row_mut(&mut self, feed: &str) -> Option<&mut FeedRow> {
        self.feeds.iter_mut().find(|r| r.stats.name == feed)
    }

    /// Replace a feed's statistics after a successful poll, adding a row for
    /// a feed not seen before.  Clears the feed's last error.
    pub fn upsert_stats(&mut self, stats: FeedStats) {
        match self.row_mut(&stats.name) {
            Some(row) => {
                row.last_error = None;
                row.stats = stats;
            }
            None => self.feeds.push(FeedRow {
                stats,
                last_error: None,
            }),
        }
    }

    /// Merge newly arrived items, de-duplicate, re-sort and cap.
    pub fn merge_items(&mut self, new_items: Vec<FeedItem>) {
        for item in new_items {
            if self.seen.insert((item.source_name.clone(), item.link.clone())) {
                self.recent.push(item);
            }
        }
        self.recent.sort(); // uses Ord impl (reverse-chronological)

        if self.recent.len() > RECENT_CAP {
            for dropped in self.recent.drain(RECENT_CAP..) {
                self.seen.remove(&(dropped.source_name, dropped.link));
            }
        }
        if let Some(i) = self.list_state.selected() {
            self.list_state.select(Some(i.min(self.recent.len().saturating_sub(1))));
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.recent.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.recent.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.recent.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.recent.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.recent.is_empty() {
            self.list_state.select(Some(self.recent.len() - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn make_item(feed: &str, link: &str, published: Option<chrono::DateTime<Utc>>) -> FeedItem {
        FeedItem {
            title: format!("title {link}"),
            published,
            ..FeedItem::with_link(link, feed)
        }
    }

    fn sample_items() -> Vec<FeedItem> {
        vec![
            make_item("wsj", "1", Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())),
            make_item("wsj", "2", Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap())),
            make_item("nyt", "3", Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap())),
        ]
    }

    fn stats(name: &str, tracked: usize) -> FeedStats {
        FeedStats {
            tracked,
            ..FeedStats::empty(name)
        }
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let app = App::new();
        assert!(app.feeds.is_empty());
        assert!(app.recent.is_empty());
        assert!(!app.quit);
        assert!(app.list_state.selected().is_none());
    }

    // -- messages ------------------------------------------------------------

    #[test]
    fn polled_adds_then_updates_rows() {
        let mut app = App::new();
        app.apply(PollMsg::Polled(stats("wsj", 10)));
        app.apply(PollMsg::Polled(stats("nyt", 5)));
        app.apply(PollMsg::Polled(stats("wsj", 12)));

        assert_eq!(app.feeds.len(), 2);
        assert_eq!(app.feeds[0].stats.name, "wsj");
        assert_eq!(app.feeds[0].stats.tracked, 12);
    }

    #[test]
    fn error_is_kept_until_next_successful_poll() {
        let mut app = App::new();
        app.apply(PollMsg::Polled(stats("wsj", 10)));
        app.apply(PollMsg::Error {
            feed: "wsj".into(),
            message: "timed out".into(),
        });
        assert_eq!(app.feeds[0].last_error.as_deref(), Some("timed out"));
        assert_eq!(app.feeds[0].stats.tracked, 10, "stats survive a failed poll");
        assert!(app.status.contains("timed out"));

        app.apply(PollMsg::Polled(stats("wsj", 10)));
        assert!(app.feeds[0].last_error.is_none());
    }

    #[test]
    fn error_for_unknown_feed_adds_row() {
        let mut app = App::new();
        app.apply(PollMsg::Error {
            feed: "nyt".into(),
            message: "dns".into(),
        });
        assert_eq!(app.feeds.len(), 1);
        assert_eq!(app.feeds[0].stats.tracked, 0);
        assert_eq!(app.feeds[0].last_error.as_deref(), Some("dns"));
    }

    #[test]
    fn new_items_update_status() {
        let mut app = App::new();
        app.apply(PollMsg::NewItems(vec![make_item("nyt", "a", None)]));
        assert_eq!(app.status, "1 new from nyt");
        assert_eq!(app.recent.len(), 1);
    }

    #[test]
    fn cycle_finished_reports_failures() {
        let mut app = App::new();
        app.apply(PollMsg::CycleFinished {
            at: Utc::now(),
            failures: 2,
        });
        assert!(app.status.ends_with("2 failed"));
    }

    // -- merge_items ---------------------------------------------------------

    #[test]
    fn merge_items_inserts_and_sorts_reverse_chronological() {
        let mut app = App::new();
        app.merge_items(sample_items());

        assert_eq!(app.recent.len(), 3);
        assert_eq!(app.recent[0].link, "3", "newest first");
        assert_eq!(app.recent[1].link, "2");
        assert_eq!(app.recent[2].link, "1", "oldest last");
    }

    #[test]
    fn merge_items_deduplicates_per_feed() {
        let mut app = App::new();
        app.merge_items(vec![make_item("wsj", "dup", None)]);
        app.merge_items(vec![make_item("wsj", "dup", None), make_item("nyt", "dup", None)]);

        assert_eq!(app.recent.len(), 2, "same link from another feed is kept");
    }

    #[test]
    fn merge_items_caps_history() {
        let mut app = App::new();
        let items = (0..RECENT_CAP + 10)
            .map(|i| {
                let ts = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(i as i64);
                make_item("wsj", &i.to_string(), Some(ts))
            })
            .collect();
        app.merge_items(items);

        assert_eq!(app.recent.len(), RECENT_CAP);
        assert_eq!(app.seen.len(), RECENT_CAP);
        assert_eq!(app.recent[0].link, (RECENT_CAP + 9).to_string(), "oldest are dropped");
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = App::new();
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_starts_at_zero_then_clamps() {
        let mut app = App::new();
        app.merge_items(sample_items());

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(0));

        app.select_last();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_moves_up_and_clamps() {
        let mut app = App::new();
        app.merge_items(sample_items());

        app.select_last();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(1));

        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }
}
