//! Runtime configuration.
//!
//! Settings come from an optional TOML file, then command-line flags override
//! them.  Example file:
//!
//! ```toml
//! interval_secs = 300
//! timeout_secs = 30
//! report_every = 2
//! baseline = "first-event"
//!
//! [[feeds]]
//! name = "WSJ World"
//! url = "https://feeds.a.dj.com/rss/RSSWorldNews.xml"
//!
//! [[feeds]]
//! name = "Downloaded"
//! path = "/var/cache/feeds/local.xml"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::cli::Cli;
use crate::monitor::FeedMonitor;
use crate::rate::Baseline;
use crate::source::{FeedSource, FileSource, RssSource};

pub const DEFAULT_INTERVAL_SECS: u64 = 5 * 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REPORT_EVERY: u32 = 2;

/// Monitored when nothing else is configured.
const DEFAULT_FEEDS: [(&str, &str); 2] = [
    ("WSJ World", "https://feeds.a.dj.com/rss/RSSWorldNews.xml"),
    ("NYT Home", "https://rss.nytimes.com/services/xml/rss/nyt/HomePage.xml"),
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    pub name: String,
    pub url: Option<String>,
    pub path: Option<PathBuf>,
}

/// Where a feed is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedLocation {
    Url(String),
    File(PathBuf),
}

impl FeedConfig {
    pub fn url(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
            path: None,
        }
    }

    pub fn location(&self) -> Result<FeedLocation> {
        match (&self.url, &self.path) {
            (Some(url), None) => Ok(FeedLocation::Url(url.clone())),
            (None, Some(path)) => Ok(FeedLocation::File(path.clone())),
            (Some(_), Some(_)) => bail!("feed `{}` sets both `url` and `path`", self.name),
            (None, None) => bail!("feed `{}` needs either `url` or `path`", self.name),
        }
    }
}

/// The TOML file as written; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    interval_secs: Option<u64>,
    timeout_secs: Option<u64>,
    report_every: Option<u32>,
    baseline: Option<Baseline>,
    #[serde(default)]
    feeds: Vec<FeedConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub interval: Duration,
    pub timeout: Duration,
    pub report_every: u32,
    pub baseline: Baseline,
    pub feeds: Vec<FeedConfig>,
}

impl Config {
    /// Combine the optional config file with command-line overrides.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => read_file(path)?,
            None => FileConfig::default(),
        };
        Self::merge(file, cli)
    }

    /// Parse a TOML document with no command-line overrides.
    pub fn from_toml(s: &str) -> Result<Self> {
        let file: FileConfig = toml::from_str(s).context("parsing config")?;
        Self::merge(file, &Cli::default())
    }

    fn merge(file: FileConfig, cli: &Cli) -> Result<Self> {
        let mut feeds = file.feeds;
        for url in &cli.urls {
            feeds.push(FeedConfig::url(label_for(url), url.as_str()));
        }
        if feeds.is_empty() {
            feeds = DEFAULT_FEEDS
                .iter()
                .map(|(name, url)| FeedConfig::url(*name, *url))
                .collect();
        }

        let config = Self {
            interval: Duration::from_secs(
                cli.interval_secs
                    .or(file.interval_secs)
                    .unwrap_or(DEFAULT_INTERVAL_SECS),
            ),
            timeout: Duration::from_secs(
                cli.timeout_secs
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            report_every: cli
                .report_every
                .or(file.report_every)
                .unwrap_or(DEFAULT_REPORT_EVERY),
            baseline: cli
                .baseline
                .map(Baseline::from)
                .or(file.baseline)
                .unwrap_or_default(),
            feeds,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            bail!("interval must be at least one second");
        }
        if self.timeout.is_zero() {
            bail!("timeout must be at least one second");
        }
        if self.report_every == 0 {
            bail!("report_every must be at least 1");
        }
        let mut names = HashSet::new();
        for feed in &self.feeds {
            if feed.name.trim().is_empty() {
                bail!("feed names must not be empty");
            }
            if !names.insert(feed.name.as_str()) {
                bail!("duplicate feed name `{}`", feed.name);
            }
            feed.location()?;
        }
        Ok(())
    }

    /// Build one monitor per configured feed.
    pub fn build_monitors(&self) -> Result<Vec<FeedMonitor>> {
        self.feeds
            .iter()
            .map(|feed| {
                let source: Box<dyn FeedSource> = match feed.location()? {
                    FeedLocation::Url(url) => Box::new(
                        RssSource::new(url, feed.name.as_str(), self.timeout)
                            .with_context(|| format!("creating HTTP client for `{}`", feed.name))?,
                    ),
                    FeedLocation::File(path) => Box::new(FileSource::new(path, feed.name.as_str())),
                };
                Ok(FeedMonitor::new(source, self.baseline))
            })
            .collect()
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
}

/// Name a feed given only by URL after its host.
fn label_for(url: &str) -> String {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host = rest.split(['/', '?', '#']).next().unwrap_or(rest);
    if host.is_empty() {
        url.to_string()
    } else {
        host.to_string()
    }
}
