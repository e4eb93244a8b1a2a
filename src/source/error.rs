use thiserror::Error;

/// A feed could not be fetched or parsed.
///
/// Always recoverable: the monitor keeps its previous state and the feed is
/// tried again on the next tick.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered with status {0}")]
    Status(u16),

    #[error("invalid RSS document: {0}")]
    Parse(#[from] ::rss::Error),

    #[error("could not read feed file: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    /// Whether the failure came from the network rather than the document.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Http(_) | FetchError::Status(_))
    }
}
