//! App state persistence — JSON save/load across restarts.
//!
//! Only UI preferences persist; market data never touches disk.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::app::{AppState, Overlay, Panel};

/// Serializable subset of app state that persists across restarts.
#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedState {
    pub selected_tickers: Vec<String>,
    pub extra_tickers: Vec<String>,
    pub active_panel: Panel,
    pub welcome_dismissed: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            selected_tickers: Vec::new(),
            extra_tickers: Vec::new(),
            active_panel: Panel::Tickers,
            welcome_dismissed: false,
        }
    }
}

/// Load persisted state from disk. Returns defaults if file is missing or corrupt.
pub fn load(path: &Path) -> PersistedState {
    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
        Err(_) => PersistedState::default(),
    }
}

/// Save persisted state to disk. Creates parent directories if needed.
pub fn save(path: &Path, state: &PersistedState) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extract persisted state from AppState.
pub fn extract(app: &AppState) -> PersistedState {
    let watchlist_defaults = &tickerlab_core::watchlist::Watchlist::default_oslo().tickers;
    PersistedState {
        selected_tickers: app.selected_in_order(),
        // Symbols added via search, beyond the built-in watchlist.
        extra_tickers: app
            .tickers
            .watchlist
            .tickers
            .iter()
            .filter(|t| !watchlist_defaults.contains(t))
            .cloned()
            .collect(),
        active_panel: app.active_panel,
        welcome_dismissed: app.overlay != Overlay::Welcome,
    }
}

/// Apply persisted state to AppState.
pub fn apply(app: &mut AppState, state: PersistedState) {
    for ticker in state.extra_tickers {
        if !app.tickers.watchlist.tickers.contains(&ticker) {
            app.tickers.watchlist.tickers.push(ticker);
        }
    }
    if !state.selected_tickers.is_empty() {
        app.tickers.selected = state.selected_tickers.into_iter().collect();
    }
    app.active_panel = state.active_panel;
    if !state.welcome_dismissed {
        app.overlay = Overlay::Welcome;
    }
}
