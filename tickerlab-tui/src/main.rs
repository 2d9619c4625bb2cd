//! tickerlab TUI — terminal dashboard over the market data loader.
//!
//! Panels:
//! 1. Tickers — watchlist selection, fetch progress, loaded markers
//! 2. Prices — close-price history chart, one colored line per ticker
//! 3. Risk — daily/annualized volatility table and comparison bars
//! 4. Table — tail preview of the close and returns tables
//! 5. Help — keyboard shortcuts and notes
//!
//! Run with `--synthetic` for deterministic offline data, or `--config
//! path/to/watchlist.toml` to use a custom watchlist.

mod app;
mod input;
mod persistence;
mod theme;
mod ui;
mod worker;

use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use tickerlab_core::data::{DataProvider, MarketDataLoader, SyntheticProvider, YahooProvider};
use tickerlab_core::stats;
use tickerlab_core::watchlist::Watchlist;

use crate::app::{AppState, ErrorCategory};
use crate::worker::{WorkerCommand, WorkerResponse};

fn main() -> Result<()> {
    // Install a panic hook that restores the terminal before printing the panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    // Flags: --synthetic (offline data), --config <watchlist.toml>.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let synthetic = args.iter().any(|a| a == "--synthetic");
    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from);

    let watchlist = load_watchlist(config_path.as_deref())?;

    let provider: Arc<dyn DataProvider> = if synthetic {
        Arc::new(SyntheticProvider)
    } else {
        Arc::new(YahooProvider::new())
    };
    let loader = Arc::new(MarketDataLoader::new(
        provider,
        Duration::from_secs(watchlist.cache_ttl_secs),
    ));

    let state_path = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tickerlab")
        .join("state.json");

    // Worker channels
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();
    let worker_handle = worker::spawn_worker(loader, cmd_rx, resp_tx);

    // Build app state and apply persisted preferences.
    let mut app = AppState::new(watchlist, cmd_tx.clone(), resp_rx, state_path.clone());
    persistence::apply(&mut app, persistence::load(&state_path));

    // Kick off the initial download for the current selection.
    app.request_load();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run the main event loop
    let result = run_app(&mut terminal, &mut app);

    // Save state before exit
    let persisted = persistence::extract(&app);
    let _ = persistence::save(&state_path, &persisted);

    // Shutdown worker
    let _ = cmd_tx.send(WorkerCommand::Shutdown);
    let _ = worker_handle.join();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn load_watchlist(config_path: Option<&std::path::Path>) -> Result<Watchlist> {
    match config_path {
        Some(path) => Watchlist::from_file(path).map_err(|e| anyhow!(e)),
        None => {
            let default_path = PathBuf::from("watchlist.toml");
            if default_path.exists() {
                Watchlist::from_file(&default_path).map_err(|e| anyhow!(e))
            } else {
                Ok(Watchlist::default_oslo())
            }
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
) -> Result<()> {
    loop {
        // 1. Render
        terminal.draw(|f| ui::draw(f, app))?;

        // 2. Drain worker responses (non-blocking)
        while let Ok(resp) = app.worker_rx.try_recv() {
            handle_worker_response(app, resp);
        }

        // 3. Poll for input events (50ms timeout for ~20 FPS tick)
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                input::handle_key(app, key);
            }
        }

        // 4. Check quit
        if !app.running {
            break;
        }
    }
    Ok(())
}

fn handle_worker_response(app: &mut AppState, resp: WorkerResponse) {
    match resp {
        WorkerResponse::FetchProgress {
            ticker,
            index: _,
            total,
        } => {
            app.tickers.load_current = Some(ticker);
            app.tickers.load_total = total;
        }
        WorkerResponse::FetchTickerDone {
            ticker,
            success,
            error,
        } => {
            app.tickers.load_done += 1;
            if !success {
                if let Some(err) = error {
                    app.push_error(ErrorCategory::Network, err, ticker);
                }
            }
        }
        WorkerResponse::LoadComplete { snapshot } => {
            app.tickers.load_in_progress = false;
            app.tickers.load_current = None;
            app.volatility = stats::volatility(&snapshot.returns);

            // Requested and returned ticker sets can diverge; surface it.
            let requested = app.selected_in_order();
            let dropped: Vec<String> = requested
                .iter()
                .filter(|t| snapshot.close.column(t).is_none())
                .cloned()
                .collect();
            if dropped.is_empty() {
                app.set_status(format!(
                    "Loaded {} tickers × {} rows",
                    snapshot.close.width(),
                    snapshot.close.height()
                ));
            } else {
                app.set_warning(format!(
                    "Loaded {} of {} tickers (no data: {})",
                    snapshot.close.width(),
                    requested.len(),
                    dropped.join(", ")
                ));
            }
            app.snapshot = Some(snapshot);
        }
        WorkerResponse::LoadFailed { category, error } => {
            app.tickers.load_in_progress = false;
            app.tickers.load_current = None;
            app.push_error(ErrorCategory::from_tag(category), error, "load".into());
        }
    }
}
