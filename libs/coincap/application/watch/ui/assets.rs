//! Asset table and pagination bar

use ratatui::{
    layout::{Alignment, Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::application::watch::App;

/// Draw the asset table for the current page
pub fn draw(frame: &mut Frame, app: &App, area: Rect) {
    let title = if app.state.is_loading() {
        format!(" Assets - page {} (loading...) ", app.state.pagination.page())
    } else {
        format!(" Assets - page {} ", app.state.pagination.page())
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    if let Some(err) = app.fetch_error() {
        let message = Paragraph::new(vec![
            Line::from(Span::styled(
                format!(" Failed to load assets: {}", err),
                Style::default().fg(Color::Red),
            )),
            Line::from(" Press r to retry."),
        ])
        .block(block);
        frame.render_widget(message, area);
        return;
    }

    if app.state.assets.is_empty() {
        let text = if app.state.is_loading() {
            " Loading assets..."
        } else {
            " No assets on this page."
        };
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let favorites = app.favorites.read();
    let rows: Vec<Row> = app
        .state
        .assets
        .iter()
        .map(|asset| {
            let is_favorite = favorites.is_favorite(&asset.favorite_key());
            let mark_style = if is_favorite {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            Row::new(vec![
                Cell::from(Span::styled(
                    if is_favorite { "[x]" } else { "[ ]" },
                    mark_style,
                )),
                Cell::from(asset.name.clone()),
                Cell::from(asset.symbol.clone()),
                Cell::from(Line::from(asset.display_price()).alignment(Alignment::Right)),
            ])
        })
        .collect();

    let header = Row::new(vec!["Fav", "Name", "Symbol", "Price (USD)"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(block)
    .row_highlight_style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

    let mut state = TableState::default();
    state.select(Some(app.state.selected_index));

    frame.render_stateful_widget(table, area, &mut state);
}

/// Draw previous/next controls, dimmed when disabled
pub fn draw_pagination(frame: &mut Frame, app: &App, area: Rect) {
    let pagination = &app.state.pagination;

    let line = Line::from(vec![
        button("< prev (p)", pagination.has_previous()),
        Span::raw(format!("   page {}   ", pagination.page())),
        button("next (n) >", pagination.has_next()),
    ])
    .alignment(Alignment::Center);

    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn button(label: &str, enabled: bool) -> Span<'static> {
    let style = if enabled {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    };
    Span::styled(label.to_string(), style)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::watch::state::PageResponse;
    use crate::application::watch::ui::test_support::render;
    use crate::domain::{Asset, Favorites};
    use crate::infrastructure::client::assets::AssetsClient;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::runtime::Handle;

    /// Column where `needle` starts on row `y`
    fn column_of(buffer: &ratatui::buffer::Buffer, y: u16, needle: &str) -> u16 {
        let cells: Vec<&str> = (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect();
        let first = needle.chars().next().unwrap().to_string();
        (0..cells.len())
            .find(|&start| {
                cells[start] == first
                    && needle
                        .chars()
                        .enumerate()
                        .all(|(i, c)| cells.get(start + i).map_or(false, |s| *s == c.to_string()))
            })
            .unwrap() as u16
    }

    fn app_with(names: &[(&str, &str, &str)]) -> App {
        let client = AssetsClient::new("http://127.0.0.1:9", None, Duration::from_secs(1)).unwrap();
        let mut app = App::new(
            Handle::current(),
            Arc::new(client),
            Favorites::from_keys(["ethereum"]).into_shared(),
            None,
        );
        app.state.begin_fetch();
        app.apply_page(PageResponse {
            page: 1,
            result: Ok(names
                .iter()
                .map(|(name, symbol, price)| Asset {
                    id: name.to_lowercase(),
                    name: name.to_string(),
                    symbol: symbol.to_string(),
                    price_usd: Some(price.to_string()),
                })
                .collect()),
        });
        app
    }

    #[tokio::test]
    async fn test_table_rows_and_favorite_marks() {
        let app = app_with(&[
            ("Bitcoin", "BTC", "67012.3847"),
            ("Ethereum", "ETH", "3490.1"),
        ]);

        let screen = render(&app, 100, 40);
        let bitcoin = screen.lines().find(|l| l.contains("Bitcoin")).unwrap();
        let ethereum = screen.lines().find(|l| l.contains("Ethereum")).unwrap();

        assert!(bitcoin.contains("[ ]"));
        assert!(bitcoin.contains("67012.38"));
        assert!(ethereum.contains("[x]"));
        assert!(ethereum.contains("3490.10"));
    }

    #[tokio::test]
    async fn test_pagination_buttons_dimmed_when_disabled() {
        let app = app_with(&[("Bitcoin", "BTC", "1")]);

        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal
            .draw(|frame| draw_pagination(frame, &app, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let prev_x = column_of(buffer, 1, "< prev");
        let next_x = column_of(buffer, 1, "next (n)");

        assert_eq!(buffer[(prev_x, 1)].fg, Color::DarkGray);
        assert_eq!(buffer[(next_x, 1)].fg, Color::DarkGray);
    }

    #[tokio::test]
    async fn test_next_enabled_after_full_page() {
        let names: Vec<String> = (0..25).map(|i| format!("Coin{:02}", i)).collect();
        let rows: Vec<(&str, &str, &str)> = names.iter().map(|n| (n.as_str(), "C", "1")).collect();
        let app = app_with(&rows);

        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal
            .draw(|frame| draw_pagination(frame, &app, frame.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let prev_x = column_of(buffer, 1, "< prev");
        let next_x = column_of(buffer, 1, "next (n)");

        assert_eq!(buffer[(prev_x, 1)].fg, Color::DarkGray);
        assert_eq!(buffer[(next_x, 1)].fg, Color::Cyan);
    }

    #[tokio::test]
    async fn test_error_replaces_table() {
        let mut app = app_with(&[("Bitcoin", "BTC", "1")]);
        app.state.begin_fetch();
        app.apply_page(PageResponse {
            page: 1,
            result: Err("HTTP request failed".into()),
        });

        let screen = render(&app, 100, 40);
        assert!(screen.contains("Failed to load assets: HTTP request failed"));
        assert!(screen.contains("Press r to retry."));
        assert!(!screen.contains("Bitcoin"));
    }
}
