//! A source that replays canned snapshots, for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{FeedItem, FeedSource, FetchError};

/// One scripted fetch result: a list of links, or a failure.
pub enum Step {
    Links(Vec<&'static str>),
    Fail,
}

/// Replays [`Step`]s in order.  Once the script runs out it keeps returning
/// the last successful snapshot.
pub struct ScriptedSource {
    name: String,
    script: Mutex<VecDeque<Step>>,
    last: Mutex<Vec<FeedItem>>,
}

impl ScriptedSource {
    pub fn new(name: &str, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(steps.into_iter().collect()),
            last: Mutex::new(Vec::new()),
        }
    }
}

/// Build a snapshot out of bare links.
pub fn items(name: &str, links: &[&str]) -> Vec<FeedItem> {
    links.iter().map(|l| FeedItem::with_link(*l, name)).collect()
}

impl FeedSource for ScriptedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_latest(&self) -> Result<Vec<FeedItem>, FetchError> {
        let step = self.script.lock().unwrap().pop_front();
        match step {
            Some(Step::Links(links)) => {
                let snapshot = items(&self.name, &links);
                *self.last.lock().unwrap() = snapshot.clone();
                Ok(snapshot)
            }
            Some(Step::Fail) => Err(FetchError::Status(503)),
            None => Ok(self.last.lock().unwrap().clone()),
        }
    }
}
