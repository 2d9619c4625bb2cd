//! Yahoo Finance data provider.
//!
//! Fetches daily bars from Yahoo's v8 chart API, one sub-request per ticker
//! fanned out on rayon, and merges them onto a common date axis as a
//! ticker-major two-level table. Adjusted closes are folded into the Close
//! field so splits and dividends don't distort derived returns.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; the synthetic provider is the offline fallback.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Deserialize;

use super::provider::{DataError, DataProvider, LoadProgress};
use super::table::{ColumnLabel, RawColumn, RawPriceTable};

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Daily series for one symbol, pre-merge.
struct SymbolSeries {
    dates: Vec<NaiveDate>,
    fields: Vec<(&'static str, Vec<f64>)>,
}

/// Why a single symbol's sub-request yielded nothing.
enum SymbolFailure {
    /// The symbol is unknown at the source; dropped from the batch.
    NotFound,
    /// Transport or response-decoding trouble; the batch fails only if
    /// every symbol ends up here.
    Transport(String),
}

impl SymbolFailure {
    fn report(&self, symbol: &str) -> DataError {
        match self {
            SymbolFailure::NotFound => {
                DataError::SourceUnavailable(format!("no price data for {symbol}"))
            }
            SymbolFailure::Transport(msg) => DataError::SourceUnavailable(msg.clone()),
        }
    }
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
}

impl YahooProvider {
    /// Default provider with a 30 second request timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }

    /// Provider with an explicit per-request timeout. On timeout the fetch
    /// fails with `SourceUnavailable` instead of blocking indefinitely.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Build the chart API URL for a symbol and inclusive date range.
    fn chart_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let end_ts = end.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();
        format!(
            "https://query2.finance.yahoo.com/v8/finance/chart/{symbol}\
             ?period1={start_ts}&period2={end_ts}&interval=1d\
             &includeAdjustedClose=true"
        )
    }

    fn fetch_symbol(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<SymbolSeries, SymbolFailure> {
        let url = Self::chart_url(symbol, start, end);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| SymbolFailure::Transport(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SymbolFailure::NotFound);
        }
        if !status.is_success() {
            return Err(SymbolFailure::Transport(format!(
                "HTTP {status} for {symbol}"
            )));
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            SymbolFailure::Transport(format!("failed to parse response for {symbol}: {e}"))
        })?;

        Self::parse_chart(symbol, chart)
    }

    /// Parse the chart API response into a per-symbol series.
    fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<SymbolSeries, SymbolFailure> {
        let result = match resp.chart.result {
            Some(r) => r,
            None => {
                return Err(match resp.chart.error {
                    Some(err) if err.code == "Not Found" => SymbolFailure::NotFound,
                    Some(err) => SymbolFailure::Transport(format!(
                        "{}: {}",
                        err.code, err.description
                    )),
                    None => SymbolFailure::Transport("empty result with no error".into()),
                });
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| SymbolFailure::Transport("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| SymbolFailure::Transport(format!("no timestamps for {symbol}")))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| SymbolFailure::Transport(format!("no quote data for {symbol}")))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let n = timestamps.len();
        let mut dates = Vec::with_capacity(n);
        let mut open = Vec::with_capacity(n);
        let mut high = Vec::with_capacity(n);
        let mut low = Vec::with_capacity(n);
        let mut close = Vec::with_capacity(n);

        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| SymbolFailure::Transport(format!("invalid timestamp: {ts}")))?;

            let o = quote.open.get(i).copied().flatten();
            let h = quote.high.get(i).copied().flatten();
            let l = quote.low.get(i).copied().flatten();
            let c = quote.close.get(i).copied().flatten();
            let adj = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());

            // Skip rows where every price is None (non-trading days).
            if o.is_none() && h.is_none() && l.is_none() && c.is_none() {
                continue;
            }

            dates.push(date);
            open.push(o.unwrap_or(f64::NAN));
            high.push(h.unwrap_or(f64::NAN));
            low.push(l.unwrap_or(f64::NAN));
            // Adjusted close replaces the raw close when Yahoo supplies it.
            close.push(adj.or(c).unwrap_or(f64::NAN));
        }

        if dates.is_empty() {
            return Err(SymbolFailure::NotFound);
        }

        Ok(SymbolSeries {
            dates,
            fields: vec![
                ("Open", open),
                ("High", high),
                ("Low", low),
                ("Close", close),
            ],
        })
    }

    /// Merge per-symbol series onto the union date axis, ticker-major.
    /// Dates a symbol doesn't cover become NaN — no forward-fill.
    fn merge(order: &[String], series: HashMap<String, SymbolSeries>) -> RawPriceTable {
        let mut all_dates = BTreeSet::new();
        for s in series.values() {
            all_dates.extend(s.dates.iter().copied());
        }
        let dates: Vec<NaiveDate> = all_dates.into_iter().collect();

        let mut columns = Vec::new();
        for ticker in order {
            let Some(s) = series.get(ticker) else {
                continue;
            };
            let index: HashMap<NaiveDate, usize> = s
                .dates
                .iter()
                .enumerate()
                .map(|(i, &date)| (date, i))
                .collect();
            for (field, values) in &s.fields {
                let aligned: Vec<f64> = dates
                    .iter()
                    .map(|date| index.get(date).map_or(f64::NAN, |&i| values[i]))
                    .collect();
                columns.push(RawColumn {
                    label: ColumnLabel::nested(ticker.clone(), *field),
                    values: aligned,
                });
            }
        }

        RawPriceTable { dates, columns }
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
        progress: Option<&dyn LoadProgress>,
    ) -> Result<RawPriceTable, DataError> {
        let total = tickers.len();

        let results: Vec<(String, Result<SymbolSeries, SymbolFailure>)> = tickers
            .par_iter()
            .enumerate()
            .map(|(i, ticker)| {
                if let Some(p) = progress {
                    p.on_start(ticker, i, total);
                }
                let result = self.fetch_symbol(ticker, start, end);
                if let Some(p) = progress {
                    let outcome = match &result {
                        Ok(_) => Ok(()),
                        Err(f) => Err(f.report(ticker)),
                    };
                    p.on_complete(ticker, i, total, &outcome);
                }
                (ticker.clone(), result)
            })
            .collect();

        let mut series = HashMap::new();
        let mut first_transport: Option<String> = None;
        for (ticker, result) in results {
            match result {
                Ok(s) => {
                    series.insert(ticker, s);
                }
                Err(SymbolFailure::NotFound) => {}
                Err(SymbolFailure::Transport(msg)) => {
                    first_transport.get_or_insert(msg);
                }
            }
        }

        if let Some(p) = progress {
            p.on_batch_complete(series.len(), total - series.len(), total);
        }

        if series.is_empty() {
            if let Some(msg) = first_transport {
                return Err(DataError::SourceUnavailable(msg));
            }
            // Every symbol was unknown; the loader surfaces EmptyResult.
            return Ok(RawPriceTable::default());
        }

        Ok(Self::merge(tickers, series))
    }
}
