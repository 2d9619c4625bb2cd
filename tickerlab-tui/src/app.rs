//! Application state — single-owner, main-thread only.
//!
//! All TUI state lives here. The worker thread communicates via channels.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use tickerlab_core::data::MarketSnapshot;
use tickerlab_core::stats::VolatilityStat;
use tickerlab_core::watchlist::Watchlist;

use crate::worker::{WorkerCommand, WorkerResponse};

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Tickers,
    Prices,
    Risk,
    Table,
    Help,
}

impl Panel {
    pub fn index(self) -> usize {
        match self {
            Panel::Tickers => 0,
            Panel::Prices => 1,
            Panel::Risk => 2,
            Panel::Table => 3,
            Panel::Help => 4,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Tickers),
            1 => Some(Panel::Prices),
            2 => Some(Panel::Risk),
            3 => Some(Panel::Table),
            4 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Tickers => "Tickers",
            Panel::Prices => "Prices",
            Panel::Risk => "Risk",
            Panel::Table => "Table",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % 5).unwrap()
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + 4) % 5).unwrap()
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// Error category for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Other => "ERR",
        }
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "network" => ErrorCategory::Network,
            "data" | "request" => ErrorCategory::Data,
            _ => ErrorCategory::Other,
        }
    }
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Welcome,
    ErrorHistory,
    Search,
}

/// Tickers panel state — watchlist selection and fetch progress.
#[derive(Debug)]
pub struct TickersPanelState {
    pub watchlist: Watchlist,
    pub selected: HashSet<String>,
    pub cursor: usize,
    pub load_in_progress: bool,
    pub load_current: Option<String>,
    pub load_done: usize,
    pub load_total: usize,
}

impl TickersPanelState {
    pub fn new(watchlist: Watchlist) -> Self {
        // All watchlist tickers start selected, matching the dashboard's
        // "everything shown by default" behavior.
        let selected = watchlist.tickers.iter().cloned().collect();
        Self {
            watchlist,
            selected,
            cursor: 0,
            load_in_progress: false,
            load_current: None,
            load_done: 0,
            load_total: 0,
        }
    }

    pub fn row_count(&self) -> usize {
        self.watchlist.tickers.len()
    }

    pub fn cursor_ticker(&self) -> Option<&str> {
        self.watchlist.tickers.get(self.cursor).map(|s| s.as_str())
    }

    /// Add a symbol to the watchlist (if new) and select it.
    pub fn add_symbol(&mut self, symbol: String) {
        if !self.watchlist.tickers.contains(&symbol) {
            self.watchlist.tickers.push(symbol.clone());
        }
        self.selected.insert(symbol);
    }
}

/// Top-level application state.
pub struct AppState {
    // Navigation
    pub active_panel: Panel,
    pub running: bool,

    // Data
    pub tickers: TickersPanelState,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub snapshot: Option<Arc<MarketSnapshot>>,
    pub volatility: Vec<VolatilityStat>,

    // Worker communication
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,

    // Cross-cutting
    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
    pub search_input: String,

    // Paths
    pub state_path: PathBuf,
}

impl AppState {
    pub fn new(
        watchlist: Watchlist,
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        state_path: PathBuf,
    ) -> Self {
        let start = watchlist.start;
        let end = watchlist.end;
        Self {
            active_panel: Panel::Tickers,
            running: true,
            tickers: TickersPanelState::new(watchlist),
            start,
            end,
            snapshot: None,
            volatility: Vec::new(),
            worker_tx,
            worker_rx,
            status_message: None,
            error_history: VecDeque::with_capacity(50),
            error_scroll: 0,
            overlay: Overlay::None,
            search_input: String::new(),
            state_path,
        }
    }

    /// Selected tickers in watchlist order — the order every loaded table
    /// uses for its columns.
    pub fn selected_in_order(&self) -> Vec<String> {
        self.tickers
            .watchlist
            .tickers
            .iter()
            .filter(|t| self.tickers.selected.contains(*t))
            .cloned()
            .collect()
    }

    /// Selected tickers that actually have a column in the loaded snapshot.
    /// Requested and returned sets can diverge; panels draw only this.
    pub fn available_selected(&self) -> Vec<String> {
        match &self.snapshot {
            Some(snapshot) => snapshot
                .close
                .tickers()
                .iter()
                .filter(|t| self.tickers.selected.contains(*t))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Kick off a load of the current selection on the worker.
    pub fn request_load(&mut self) {
        if self.tickers.load_in_progress {
            return;
        }
        let selection = self.selected_in_order();
        if selection.is_empty() {
            self.set_warning("Select at least one ticker first");
            return;
        }
        self.tickers.load_in_progress = true;
        self.tickers.load_current = None;
        self.tickers.load_done = 0;
        self.tickers.load_total = selection.len();
        let _ = self.worker_tx.send(WorkerCommand::Load {
            tickers: selection,
            start: self.start,
            end: self.end,
        });
        self.set_status("Downloading market data...");
    }

    /// Push an error to the history, capping at 50.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > 50 {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

/// App wired to dangling channels, for tests across the crate. Commands
/// sent to the worker go nowhere; the app ignores send errors by design.
#[cfg(test)]
pub(crate) fn test_app() -> AppState {
    let (tx, _) = std::sync::mpsc::channel();
    let (_, rx) = std::sync::mpsc::channel();
    AppState::new(Watchlist::default_oslo(), tx, rx, PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Tickers.next(), Panel::Prices);
        assert_eq!(Panel::Help.next(), Panel::Tickers);
        assert_eq!(Panel::Tickers.prev(), Panel::Help);
        assert_eq!(Panel::Prices.prev(), Panel::Tickers);
    }

    #[test]
    fn panel_from_index() {
        for i in 0..5 {
            let p = Panel::from_index(i).unwrap();
            assert_eq!(p.index(), i);
        }
        assert!(Panel::from_index(5).is_none());
    }

    #[test]
    fn error_history_caps_at_50() {
        let mut app = test_app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), 50);
        assert!(app.error_history[0].message.contains("59"));
    }

    #[test]
    fn everything_starts_selected() {
        let app = test_app();
        assert_eq!(
            app.selected_in_order(),
            Watchlist::default_oslo().tickers
        );
    }

    #[test]
    fn selection_order_follows_the_watchlist() {
        let mut app = test_app();
        app.tickers.selected.clear();
        app.tickers.selected.insert("MOWI.OL".to_string());
        app.tickers.selected.insert("EQNR.OL".to_string());
        // Watchlist order, not insertion order.
        assert_eq!(
            app.selected_in_order(),
            vec!["EQNR.OL".to_string(), "MOWI.OL".to_string()]
        );
    }

    #[test]
    fn add_symbol_appends_once_and_selects() {
        let mut app = test_app();
        let before = app.tickers.row_count();
        app.tickers.add_symbol("NHY.OL".to_string());
        app.tickers.add_symbol("NHY.OL".to_string());
        assert_eq!(app.tickers.row_count(), before + 1);
        assert!(app.tickers.selected.contains("NHY.OL"));
    }

    #[test]
    fn request_load_requires_a_selection() {
        let mut app = test_app();
        app.tickers.selected.clear();
        app.request_load();
        assert!(!app.tickers.load_in_progress);
        assert!(matches!(
            app.status_message,
            Some((_, StatusLevel::Warning))
        ));
    }

    #[test]
    fn error_category_tags() {
        assert_eq!(ErrorCategory::from_tag("network"), ErrorCategory::Network);
        assert_eq!(ErrorCategory::from_tag("data"), ErrorCategory::Data);
        assert_eq!(ErrorCategory::from_tag("request"), ErrorCategory::Data);
        assert_eq!(ErrorCategory::from_tag("bogus"), ErrorCategory::Other);
    }
}
