//! Coin Watch - Terminal UI for CoinCap assets and live trades
//!
//! Browse assets a page at a time, mark favorites with space, and watch
//! the latest trades on favorited assets stream in below.

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use coincap_watch::bin_common::load_config_from_env;
use coincap_watch::coincap::application::watch::{ui, Action, App};
use coincap_watch::coincap::{init_file_tracing, WatchConfig};

fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    let config_path = load_config_from_env();
    let config = WatchConfig::load_or_default(&config_path)?;

    // Logs go to a file: anything on stdout would corrupt the alternate screen
    init_file_tracing(&config.log_file, &config.log_level)?;
    config.log();

    // Create tokio runtime
    let runtime = tokio::runtime::Runtime::new()?;

    // Initialize the app (clients, trade stream, first page request)
    let mut app = runtime.block_on(App::initialize(runtime.handle().clone(), &config))?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, config.tick_rate());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Shutdown app
    runtime.block_on(app.shutdown());

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        app.tick();

        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (not release)
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = Action::from_key(key.code) {
                        app.handle_action(action);
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
