//! Data provider trait and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources (Yahoo Finance,
//! synthetic walks, test doubles) so the loader can swap implementations and
//! tests can count fetches.

use chrono::NaiveDate;
use thiserror::Error;

use super::table::RawPriceTable;

/// Structured error types for data operations.
///
/// All variants surface to the caller unmodified; the loader never falls
/// back to partial or fabricated data.
#[derive(Debug, Error)]
pub enum DataError {
    /// Bad arguments: empty ticker list, inverted date range. Nothing is
    /// fetched and nothing is cached.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or provider failure, including timeouts. Not retried here;
    /// retry policy belongs to the caller.
    #[error("market data source unavailable: {0}")]
    SourceUnavailable(String),

    /// The response shape exposed no recognized price field. Fatal for the
    /// call, never silently swallowed.
    #[error("unrecognized response shape: {0}")]
    Format(String),

    /// Recognized shape, but zero requested tickers survived filtering.
    #[error("no usable ticker columns in response")]
    EmptyResult,
}

/// Trait for market data sources.
///
/// A provider fetches daily, adjustment-applied price data for a batch of
/// tickers over an inclusive date range and returns it in whatever column
/// layout it natively uses. The cache layer sits above this trait —
/// providers don't know about the cache.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily price columns for the given tickers, start..=end.
    ///
    /// Tickers absent at the source are omitted from the result rather than
    /// failing the batch; a batch where every ticker fails for transport
    /// reasons is a `SourceUnavailable` error.
    fn fetch(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
        progress: Option<&dyn LoadProgress>,
    ) -> Result<RawPriceTable, DataError>;
}

/// Progress callback for multi-ticker fetches.
///
/// Implementations must be Sync: the Yahoo provider reports from its
/// per-ticker worker threads.
pub trait LoadProgress: Send + Sync {
    /// Called when starting to fetch a ticker.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called when a ticker fetch completes.
    fn on_complete(&self, ticker: &str, index: usize, total: usize, result: &Result<(), DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl LoadProgress for StdoutProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {ticker}...", index + 1, total);
    }

    fn on_complete(
        &self,
        ticker: &str,
        _index: usize,
        _total: usize,
        result: &Result<(), DataError>,
    ) {
        match result {
            Ok(()) => println!("  OK: {ticker}"),
            Err(e) => println!("  FAIL: {ticker}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nFetch complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
