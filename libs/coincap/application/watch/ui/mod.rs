//! UI widgets for the watcher

pub mod assets;
pub mod watchlist;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::App;
use hypersockets::ConnectionState;

/// Draw the main UI layout
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Percentage(50), // Assets
            Constraint::Length(3),      // Pagination
            Constraint::Min(5),         // Watchlist
            Constraint::Length(3),      // Footer
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    assets::draw(frame, app, chunks[1]);
    assets::draw_pagination(frame, app, chunks[2]);
    watchlist::draw(frame, app, chunks[3]);
    draw_footer(frame, app, chunks[4]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let stream = if app.has_stream() {
        app.stream_status.label()
    } else {
        "unavailable".to_string()
    };

    let status_color = match app.stream_status.state {
        _ if app.stream_status.gave_up || !app.has_stream() => Color::Red,
        ConnectionState::Connected => Color::Green,
        _ => Color::Yellow,
    };

    let header_text = format!(
        " Stream: {} | Page: {} | Favorites: {} | Trades: {}",
        stream,
        app.state.pagination.page(),
        app.favorites_count(),
        app.watchlist_entries().len()
    );

    let header = Paragraph::new(header_text)
        .style(Style::default().fg(status_color))
        .block(Block::default().borders(Borders::ALL).title(" Coin Watch "));

    frame.render_widget(header, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let (text, color) = match (app.fetch_error(), app.status_message.as_deref()) {
        (Some(err), _) => (format!(" Error: {} | r=retry q=quit", err), Color::Red),
        (None, Some(status)) => (format!(" {}", status), Color::White),
        (None, None) => (
            " q=quit j/k=nav space=favorite n/p=page r=refresh".to_string(),
            Color::White,
        ),
    };

    let footer = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
