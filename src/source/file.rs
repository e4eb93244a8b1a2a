//! RSS read from the local filesystem.
//!
//! Handy for monitoring a feed that another tool downloads, and for running
//! the monitor offline.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use super::{FeedItem, FeedSource, FetchError, RssSource};

/// An RSS document re-read from disk on every fetch.
pub struct FileSource {
    pub path: PathBuf,
    pub label: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            label: label.into(),
        }
    }
}

impl FeedSource for FileSource {
    fn name(&self) -> &str {
        &self.label
    }

    fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
        let reader = BufReader::new(File::open(&self.path)?);
        let channel = rss::Channel::read_from(reader)?;
        Ok(RssSource::parse_channel(&channel, &self.label))
    }
}
