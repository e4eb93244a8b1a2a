use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::rate::Baseline;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BaselineArg {
    /// Measure the first interval from start-up
    Construction,
    /// Start measuring at the first detected update
    FirstEvent,
}

impl From<BaselineArg> for Baseline {
    fn from(arg: BaselineArg) -> Self {
        match arg {
            BaselineArg::Construction => Baseline::Construction,
            BaselineArg::FirstEvent => Baseline::FirstEvent,
        }
    }
}

/// Watch RSS feeds for new items and measure how often each one updates.
#[derive(Debug, Default, Parser)]
#[command(name = "feedrate", version)]
pub struct Cli {
    /// Feed URLs to monitor, in addition to those in the config file
    pub urls: Vec<String>,

    /// TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds between polls [default: 300]
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// HTTP timeout per fetch, in seconds [default: 30]
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Log average update intervals every N polls [default: 2]
    #[arg(long)]
    pub report_every: Option<u32>,

    /// Where the first measured interval starts
    #[arg(long, value_enum)]
    pub baseline: Option<BaselineArg>,

    /// Log to stderr instead of showing the dashboard
    #[arg(long)]
    pub headless: bool,

    /// Write logs to this file (the dashboard always logs to a file)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags_and_urls() {
        let cli = Cli::parse_from([
            "feedrate",
            "--interval-secs",
            "60",
            "--baseline",
            "first-event",
            "--headless",
            "https://example.com/rss",
        ]);
        assert_eq!(cli.interval_secs, Some(60));
        assert_eq!(cli.baseline, Some(BaselineArg::FirstEvent));
        assert!(cli.headless);
        assert_eq!(cli.urls, ["https://example.com/rss"]);
    }
}
