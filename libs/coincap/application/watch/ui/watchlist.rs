//! Watchlist table - latest trades on favorited assets

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::application::watch::App;
use crate::domain::{format_price, WatchlistEntry, WATCHLIST_CAPACITY};

pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let entries = app.watchlist_entries();
    let title = format!(" Watchlist ({}/{}) ", entries.len(), WATCHLIST_CAPACITY);
    let block = Block::default().borders(Borders::ALL).title(title);

    if entries.is_empty() {
        let text = if app.favorites_count() == 0 {
            " No favorites yet. Select an asset and press space to watch its trades."
        } else {
            " Waiting for trades on favorited assets..."
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let header = Row::new(vec![
        "Exchange",
        "Base",
        "Quote",
        "Direction",
        "Price",
        "Order Size",
        "Price (USD)",
    ])
    .style(Style::default().add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = entries.iter().map(entry_row).collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(10),
            Constraint::Length(9),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(block);

    frame.render_widget(table, area);
}

fn entry_row(entry: &WatchlistEntry) -> Row<'static> {
    let trade = &entry.trade;
    let direction_color = match trade.direction.as_str() {
        "buy" => Color::Green,
        "sell" => Color::Red,
        _ => Color::White,
    };

    Row::new(vec![
        Cell::from(trade.exchange.clone()),
        Cell::from(trade.base.clone()),
        Cell::from(trade.quote.clone()),
        Cell::from(Span::styled(
            trade.direction.clone(),
            Style::default().fg(direction_color),
        )),
        Cell::from(trade.price.to_string()),
        Cell::from(trade.volume.to_string()),
        Cell::from(format_price(Some(trade.price_usd.value()))),
    ])
}
