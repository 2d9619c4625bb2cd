//! Background worker thread — all network and normalization work runs here.
//!
//! The worker owns the process-wide `MarketDataLoader`; the TUI main thread
//! talks to it over `mpsc` channels and stays responsive during fetches.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;

use tickerlab_core::data::{DataError, LoadProgress, MarketDataLoader, MarketSnapshot};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Load {
        tickers: Vec<String>,
        start: NaiveDate,
        end: NaiveDate,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug)]
pub enum WorkerResponse {
    FetchProgress {
        ticker: String,
        index: usize,
        total: usize,
    },
    FetchTickerDone {
        ticker: String,
        success: bool,
        error: Option<String>,
    },
    LoadComplete {
        snapshot: Arc<MarketSnapshot>,
    },
    LoadFailed {
        category: &'static str,
        error: String,
    },
}

/// Spawn the background worker thread.
pub fn spawn_worker(
    loader: Arc<MarketDataLoader>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name("tickerlab-worker".into())
        .spawn(move || worker_loop(loader, rx, tx))
        .expect("failed to spawn worker thread")
}

fn worker_loop(
    loader: Arc<MarketDataLoader>,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Load {
                tickers,
                start,
                end,
            }) => handle_load(&loader, &tickers, start, end, &tx),
        }
    }
}

fn handle_load(
    loader: &MarketDataLoader,
    tickers: &[String],
    start: NaiveDate,
    end: NaiveDate,
    tx: &Sender<WorkerResponse>,
) {
    let progress = ChannelProgress {
        tx: Mutex::new(tx.clone()),
    };

    match loader.load_with_progress(tickers, start, end, Some(&progress)) {
        Ok(snapshot) => {
            let _ = tx.send(WorkerResponse::LoadComplete { snapshot });
        }
        Err(e) => {
            let _ = tx.send(WorkerResponse::LoadFailed {
                category: error_category(&e),
                error: e.to_string(),
            });
        }
    }
}

fn error_category(e: &DataError) -> &'static str {
    match e {
        DataError::SourceUnavailable(_) => "network",
        DataError::Format(_) | DataError::EmptyResult => "data",
        DataError::InvalidRequest(_) => "request",
    }
}

/// LoadProgress implementation that forwards through the response channel.
///
/// The sender sits behind a mutex because the Yahoo provider reports from
/// its per-ticker worker threads.
struct ChannelProgress {
    tx: Mutex<Sender<WorkerResponse>>,
}

impl LoadProgress for ChannelProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        let _ = self.tx.lock().unwrap().send(WorkerResponse::FetchProgress {
            ticker: ticker.to_string(),
            index,
            total,
        });
    }

    fn on_complete(
        &self,
        ticker: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        let _ = self
            .tx
            .lock()
            .unwrap()
            .send(WorkerResponse::FetchTickerDone {
                ticker: ticker.to_string(),
                success: result.is_ok(),
                error: result.as_ref().err().map(|e| e.to_string()),
            });
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}
