//! RSS feed source over HTTP.
//!
//! This module shows how to implement the [`FeedSource`] trait for a concrete
//! feed format.  [`RssSource::parse_channel`] is shared with
//! [`FileSource`](super::FileSource), which reads the same format from disk.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;

use super::{FeedItem, FeedSource, FetchError};

/// An RSS feed fetched over HTTP.
///
/// Uses a blocking [`reqwest`] client with a request timeout, then parses
/// the body with the [`rss`] crate.
pub struct RssSource {
    /// The feed URL to poll.
    pub url: String,
    /// A human-readable label used in logs and the dashboard.
    pub label: String,
    client: Client,
}

impl RssSource {
    /// Create a new RSS source whose requests give up after `timeout`.
    ///
    /// # Arguments
    ///
    /// * `url` — full URL of the RSS feed (e.g.
    ///   `https://feeds.a.dj.com/rss/RSSWorldNews.xml`).
    /// * `label` — short name for this feed.
    /// * `timeout` — upper bound for connecting and reading the response.
    pub fn new(
        url: impl Into<String>,
        label: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            url: url.into(),
            label: label.into(),
            client,
        })
    }

    /// Parse an already-fetched [`rss::Channel`] into [`FeedItem`]s.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// mapping without hitting the network.  Items with neither a `<link>`
    /// nor a `<guid>` cannot be identified and are skipped.
    pub fn parse_channel(channel: &rss::Channel, label: &str) -> Vec<FeedItem> {
        channel
            .items()
            .iter()
            .filter_map(|item| {
                let guid = item.guid().map(|g| g.value().to_string());
                let link = item
                    .link()
                    .map(String::from)
                    .or_else(|| guid.clone())
                    .filter(|l| !l.trim().is_empty());

                let Some(link) = link else {
                    tracing::debug!(feed = label, title = ?item.title(), "skipping item without link or guid");
                    return None;
                };

                // Parse RFC-2822 date; gracefully degrade to None on failure.
                let published = item
                    .pub_date()
                    .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                Some(FeedItem {
                    link,
                    title: item.title().unwrap_or("(untitled)").to_string(),
                    description: item.description().map(String::from),
                    guid,
                    published,
                    source_name: label.to_string(),
                })
            })
            .collect()
    }
}

impl FeedSource for RssSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
        let response = self.client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = response.bytes()?;
        let channel = rss::Channel::read_from(body.as_ref())?;
        Ok(Self::parse_channel(&channel, &self.label))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
