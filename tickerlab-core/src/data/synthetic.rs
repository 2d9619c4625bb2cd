//! Synthetic data provider — deterministic random walks for offline use.
//!
//! Each ticker gets a reproducible walk seeded from its name, so demo runs
//! and tests see stable data without network access. The response uses the
//! field-major two-level layout (fields on the outer level, tickers on the
//! inner), the mirror image of the Yahoo provider's ticker-major layout.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, LoadProgress};
use super::table::{ColumnLabel, RawColumn, RawPriceTable};

/// Offline provider generating per-ticker random walks.
pub struct SyntheticProvider;

impl SyntheticProvider {
    /// Generate the walk for one ticker over the weekday dates of the range.
    fn walk(ticker: &str, days: usize) -> (Vec<f64>, Vec<f64>) {
        // Deterministic seed from the ticker name.
        let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut opens = Vec::with_capacity(days);
        let mut closes = Vec::with_capacity(days);
        let mut price = 100.0_f64;
        for _ in 0..days {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            let open = price;
            let close = price * (1.0 + daily_return);
            opens.push(open);
            closes.push(close);
            price = close;
        }
        (opens, closes)
    }

    /// Weekday dates in start..=end.
    fn trading_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut current = start;
        while current <= end {
            let weekday = current.weekday();
            if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
                dates.push(current);
            }
            current += chrono::Duration::days(1);
        }
        dates
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
        progress: Option<&dyn LoadProgress>,
    ) -> Result<RawPriceTable, DataError> {
        let dates = Self::trading_dates(start, end);
        let total = tickers.len();

        let mut opens = Vec::with_capacity(total);
        let mut closes = Vec::with_capacity(total);
        for (i, ticker) in tickers.iter().enumerate() {
            if let Some(p) = progress {
                p.on_start(ticker, i, total);
            }
            let (open, close) = Self::walk(ticker, dates.len());
            opens.push(RawColumn {
                label: ColumnLabel::nested("Open", ticker.clone()),
                values: open,
            });
            closes.push(RawColumn {
                label: ColumnLabel::nested("Close", ticker.clone()),
                values: close,
            });
            if let Some(p) = progress {
                p.on_complete(ticker, i, total, &Ok(()));
            }
        }
        if let Some(p) = progress {
            p.on_batch_complete(total, 0, total);
        }

        let mut columns = opens;
        columns.extend(closes);
        Ok(RawPriceTable { dates, columns })
    }
}
