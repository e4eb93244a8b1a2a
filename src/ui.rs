//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a three-row split: the per-feed table, a scrollable list
//!   of recently arrived items, and a one-line status bar.
//! * Colours and styles are defined inline.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame,
};

use crate::app::App;

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    // Header row, one row per feed, two border lines.
    let table_height = app.feeds.len() as u16 + 3;
    let [table_area, list_area, status_area] = Layout::vertical([
        Constraint::Length(table_height),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_feed_table(app, frame, table_area);
    draw_recent_list(app, frame, list_area);
    draw_status_bar(app, frame, status_area);
}

/// Human-friendly rendering of a duration in seconds, e.g. `1h 02m`.
pub fn format_secs(secs: f64) -> String {
    let total = secs.round() as u64;
    let (h, m, s) = (total / 3600, total / 60 % 60, total % 60);
    match (h, m) {
        (0, 0) => format!("{s}s"),
        (0, _) => format!("{m}m {s:02}s"),
        _ => format!("{h}h {m:02}m"),
    }
}

/// Render one row per monitored feed.
fn draw_feed_table(app: &App, frame: &mut Frame, area: Rect) {
    let header = Row::new(["Feed", "Items", "Updates", "Avg interval", "Last update", "Error"])
        .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan));

    let rows = app.feeds.iter().map(|row| {
        let s = &row.stats;
        let average = if s.samples == 0 {
            "—".to_string()
        } else {
            format_secs(s.average_secs)
        };
        let last = s
            .last_change
            .map(|d| d.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".into());
        let error = row.last_error.clone().unwrap_or_default();

        Row::new([
            Cell::from(s.name.clone()),
            Cell::from(s.tracked.to_string()),
            Cell::from(s.changes.to_string()),
            Cell::from(average),
            Cell::from(last).style(Style::default().fg(Color::DarkGray)),
            Cell::from(error).style(Style::default().fg(Color::Red)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(13),
            Constraint::Length(12),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().title(" Feeds ").borders(Borders::ALL));

    frame.render_widget(table, area);
}

/// Render the scrollable list of new arrivals.
fn draw_recent_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let list_items: Vec<ListItem> = app
        .recent
        .iter()
        .map(|item| {
            let date_str = item
                .published
                .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "no date".into());

            let line = Line::from(vec![
                Span::styled(
                    format!("{:<18}", date_str),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(" "),
                Span::styled(&item.title, Style::default().fg(Color::White)),
                Span::raw("  "),
                Span::styled(
                    format!("[{}]", item.source_name),
                    Style::default().fg(Color::Cyan),
                ),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(" New arrivals ")
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} feeds", app.feeds.len()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit  ↑/↓: scroll  Home/End: jump"),
    ]));
    frame.render_widget(status, area);
}
