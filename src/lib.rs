//! feedrate — watch RSS feeds for new items and measure how often they update.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ update() ┌────────────┐ poll()  ┌───────────────┐
//! │  poll.rs  │ ───────► │ monitor.rs │ ──────► │   detect.rs   │ ──► source/
//! │ (driver)  │          │            │ ──────► │    rate.rs    │
//! └───────────┘          └────────────┘ changed └───────────────┘
//!       │ Reporter
//!       ▼
//! ┌───────────┐  PollMsg   ┌──────────┐  draw()  ┌──────────┐
//! │ report.rs │ ─────────► │  app.rs  │ ───────► │  ui.rs   │
//! └───────────┘ (channel)  └──────────┘          └──────────┘
//! ```
//!
//! * **`source/`** — the `FeedSource` trait and concrete implementations
//!   (RSS over HTTP, RSS from a file).
//! * **`detect`** — diffs each snapshot against the previous one.
//! * **`rate`** — running mean of the time between detected updates.
//! * **`monitor`** — one detector plus one tracker per feed.
//! * **`poll`** — the tick loop, on a thread (dashboard) or tokio (headless).
//! * **`report`** — where outcomes go: `tracing` events and/or the dashboard.
//! * **`app`** / **`ui`** / **`input`** — dashboard state, rendering and keys.
//! * **`main`** — wires everything together: parse args, load config, pick a
//!   mode and run it.

pub mod app;
pub mod cli;
pub mod clock;
pub mod config;
pub mod detect;
pub mod input;
pub mod logging;
pub mod monitor;
pub mod poll;
pub mod rate;
pub mod report;
pub mod source;
pub mod ui;
