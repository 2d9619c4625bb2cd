//! Tabular price data — the raw provider table and the canonical per-ticker frame.
//!
//! Providers return a [`RawPriceTable`] whose column labels may be flat
//! ("Close") or two-level (ticker-major or field-major nesting), mirroring
//! the layouts real market-data services emit. Normalization reduces that to
//! a [`TickerFrame`]: one f64 column per ticker on a shared ascending date
//! axis, with NaN marking missing values (no forward-fill of price data).

use chrono::NaiveDate;

/// Label of a raw column. Flat labels carry a single field name; nested
/// labels carry a two-level (outer, inner) pair whose meaning depends on
/// the provider's grouping (ticker-major: outer = ticker, inner = field;
/// field-major: outer = field, inner = ticker).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnLabel {
    Flat(String),
    Nested { outer: String, inner: String },
}

impl ColumnLabel {
    pub fn nested(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        ColumnLabel::Nested {
            outer: outer.into(),
            inner: inner.into(),
        }
    }
}

/// A single raw column: label plus one value per table row (NaN = missing).
#[derive(Debug, Clone)]
pub struct RawColumn {
    pub label: ColumnLabel,
    pub values: Vec<f64>,
}

/// The unprocessed response from a data provider: a date axis (ascending)
/// and a set of labeled value columns, each as long as the axis.
#[derive(Debug, Clone, Default)]
pub struct RawPriceTable {
    pub dates: Vec<NaiveDate>,
    pub columns: Vec<RawColumn>,
}

impl RawPriceTable {
    pub fn height(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.columns.is_empty()
    }

    /// Deterministic BLAKE3 content hash over dates, labels, and value bits.
    ///
    /// Two loads that return byte-identical data hash identically, which is
    /// what surfaces cache hits as "same data" to callers.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for date in &self.dates {
            hasher.update(date.to_string().as_bytes());
        }
        for col in &self.columns {
            match &col.label {
                ColumnLabel::Flat(name) => {
                    hasher.update(b"flat:");
                    hasher.update(name.as_bytes());
                }
                ColumnLabel::Nested { outer, inner } => {
                    hasher.update(b"nested:");
                    hasher.update(outer.as_bytes());
                    hasher.update(b"/");
                    hasher.update(inner.as_bytes());
                }
            }
            for v in &col.values {
                hasher.update(&v.to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Canonical wide table: ascending dates, one f64 column per ticker.
///
/// Used for both close prices and daily returns. Column order is
/// significant (it follows the caller's requested ticker order).
#[derive(Debug, Clone, PartialEq)]
pub struct TickerFrame {
    dates: Vec<NaiveDate>,
    tickers: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl TickerFrame {
    /// Build a frame from parallel ticker/column vectors.
    ///
    /// Every column must match the date axis length; mismatches are a
    /// programming error in the caller, hence the panic in debug form.
    pub fn new(dates: Vec<NaiveDate>, tickers: Vec<String>, columns: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(tickers.len(), columns.len());
        debug_assert!(columns.iter().all(|c| c.len() == dates.len()));
        Self {
            dates,
            tickers,
            columns,
        }
    }

    pub fn empty() -> Self {
        Self {
            dates: Vec::new(),
            tickers: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.dates.len()
    }

    /// Number of ticker columns.
    pub fn width(&self) -> usize {
        self.tickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.tickers.is_empty()
    }

    /// Column values for a ticker, if present.
    pub fn column(&self, ticker: &str) -> Option<&[f64]> {
        self.tickers
            .iter()
            .position(|t| t == ticker)
            .map(|i| self.columns[i].as_slice())
    }

    /// Value at (row, column index). NaN for out-of-range is not provided;
    /// callers index within `height()`/`width()`.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.columns[col][row]
    }

    /// Drop rows where every column is NaN (exchange holidays that survive
    /// a multi-ticker merge, the leading returns row, and similar).
    pub fn drop_all_nan_rows(self) -> Self {
        let keep: Vec<usize> = (0..self.dates.len())
            .filter(|&row| self.columns.iter().any(|col| !col[row].is_nan()))
            .collect();
        if keep.len() == self.dates.len() {
            return self;
        }
        let dates = keep.iter().map(|&r| self.dates[r]).collect();
        let columns = self
            .columns
            .iter()
            .map(|col| keep.iter().map(|&r| col[r]).collect())
            .collect();
        Self {
            dates,
            tickers: self.tickers,
            columns,
        }
    }

    /// The last `n` rows, as (date, row values) pairs. Used for previews.
    pub fn tail(&self, n: usize) -> Vec<(NaiveDate, Vec<f64>)> {
        let start = self.height().saturating_sub(n);
        (start..self.height())
            .map(|row| {
                (
                    self.dates[row],
                    self.columns.iter().map(|col| col[row]).collect(),
                )
            })
            .collect()
    }

    /// Min/max over all finite values in the named columns. `None` when no
    /// finite value exists (empty selection or all-NaN columns).
    pub fn finite_bounds(&self, tickers: &[&str]) -> Option<(f64, f64)> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for t in tickers {
            if let Some(col) = self.column(t) {
                for &v in col {
                    if v.is_finite() {
                        min = min.min(v);
                        max = max.max(v);
                    }
                }
            }
        }
        (min <= max).then_some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn frame() -> TickerFrame {
        TickerFrame::new(
            vec![d("2024-01-02"), d("2024-01-03"), d("2024-01-04")],
            vec!["A".into(), "B".into()],
            vec![
                vec![10.0, 11.0, f64::NAN],
                vec![20.0, f64::NAN, 22.0],
            ],
        )
    }

    #[test]
    fn column_lookup() {
        let f = frame();
        assert_eq!(f.column("A").unwrap()[1], 11.0);
        assert!(f.column("B").unwrap()[1].is_nan());
        assert!(f.column("C").is_none());
    }

    #[test]
    fn drop_all_nan_rows_keeps_partial_rows() {
        let f = TickerFrame::new(
            vec![d("2024-01-02"), d("2024-01-03"), d("2024-01-04")],
            vec!["A".into(), "B".into()],
            vec![
                vec![10.0, f64::NAN, f64::NAN],
                vec![20.0, f64::NAN, 22.0],
            ],
        )
        .drop_all_nan_rows();

        // Middle row is NaN in every column and must go; the others stay.
        assert_eq!(f.height(), 2);
        assert_eq!(f.dates(), &[d("2024-01-02"), d("2024-01-04")]);
        assert!(f.column("A").unwrap()[1].is_nan());
        assert_eq!(f.column("B").unwrap()[1], 22.0);
    }

    #[test]
    fn tail_returns_last_rows() {
        let f = frame();
        let tail = f.tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].0, d("2024-01-03"));
        assert_eq!(tail[1].1[1], 22.0);
    }

    #[test]
    fn finite_bounds_skip_nan() {
        let f = frame();
        let (min, max) = f.finite_bounds(&["A", "B"]).unwrap();
        assert_eq!(min, 10.0);
        assert_eq!(max, 22.0);
        assert!(f.finite_bounds(&["C"]).is_none());
    }

    #[test]
    fn fingerprint_is_deterministic_and_label_sensitive() {
        let table = RawPriceTable {
            dates: vec![d("2024-01-02")],
            columns: vec![RawColumn {
                label: ColumnLabel::nested("A", "Close"),
                values: vec![10.0],
            }],
        };
        assert_eq!(table.fingerprint(), table.fingerprint());

        let mut relabeled = table.clone();
        relabeled.columns[0].label = ColumnLabel::nested("Close", "A");
        assert_ne!(table.fingerprint(), relabeled.fingerprint());
    }
}
