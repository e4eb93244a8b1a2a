//! Binary entry point: parse args, load config, pick a mode and run it.

use std::io;
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use feedrate::app::App;
use feedrate::cli::Cli;
use feedrate::config::Config;
use feedrate::poll::{self, Poller};
use feedrate::report::{ChannelReporter, TracingReporter};
use feedrate::{input, logging, ui};

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Poll until Ctrl-C, reporting through the log only.
fn run_headless(config: &Config) -> Result<()> {
    let monitors = config.build_monitors()?;
    let poller = Poller::new(monitors, Arc::new(TracingReporter), config.report_every);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;
    runtime.block_on(poll::run(poller, config.interval))
}

/// Poll on a background thread and show the dashboard.
fn run_dashboard(config: &Config) -> Result<()> {
    install_panic_hook();

    let monitors = config.build_monitors()?;
    let (tx, rx) = mpsc::channel();
    let poller = Poller::new(monitors, Arc::new(ChannelReporter::new(tx)), config.report_every);
    poll::spawn(poller, config.interval);

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();

    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain any messages from the poller.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = rx.try_recv() {
            app.apply(msg);
        }

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.headless {
        match &cli.log_file {
            Some(path) => logging::init_file(path)?,
            None => logging::init_stderr(),
        }
    } else {
        let path = cli
            .log_file
            .as_deref()
            .unwrap_or(Path::new(logging::DEFAULT_LOG_FILE));
        logging::init_file(path)?;
    }

    let config = Config::load(&cli)?;
    tracing::info!(
        feeds = config.feeds.len(),
        interval_secs = config.interval.as_secs(),
        baseline = ?config.baseline,
        "starting"
    );

    if cli.headless {
        run_headless(&config)
    } else {
        run_dashboard(&config)
    }
}
