//! Watchlist configuration — ordered tickers, date range, chart colors.
//!
//! Stored as a TOML file so the ticker set and defaults can be edited
//! without rebuilding. Ticker order is significant: it fixes the column
//! order of every loaded table.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The dashboard's watchlist and per-run defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Watchlist {
    /// Tickers in display/column order.
    pub tickers: Vec<String>,
    /// Default history start date.
    pub start: NaiveDate,
    /// Default history end date (inclusive at the provider).
    pub end: NaiveDate,
    /// Cache entry lifetime in seconds.
    pub cache_ttl_secs: u64,
    /// Hex chart color per ticker (e.g. "#2f4d8e"). Tickers without an
    /// entry fall back to the theme palette.
    pub colors: BTreeMap<String, String>,
}

impl Watchlist {
    /// Load a watchlist from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("read watchlist file: {e}"))?;
        Self::from_toml(&content)
    }

    /// Parse a watchlist from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("parse watchlist TOML: {e}"))
    }

    /// Serialize the watchlist to TOML.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("serialize watchlist: {e}"))
    }

    /// Configured color for a ticker, if any.
    pub fn color(&self, ticker: &str) -> Option<&str> {
        self.colors.get(ticker).map(|s| s.as_str())
    }

    /// The built-in Oslo Børs watchlist: five large caps, five years of
    /// history, six-hour cache.
    pub fn default_oslo() -> Self {
        let mut colors = BTreeMap::new();
        colors.insert("EQNR.OL".to_string(), "#2f4d8e".to_string());
        colors.insert("DNB.OL".to_string(), "#ffa659".to_string());
        colors.insert("AKRBP.OL".to_string(), "#ff6464".to_string());
        colors.insert("ORK.OL".to_string(), "#79ffbc".to_string());
        colors.insert("MOWI.OL".to_string(), "#c180ff".to_string());

        Self {
            tickers: vec![
                "EQNR.OL".to_string(),
                "DNB.OL".to_string(),
                "AKRBP.OL".to_string(),
                "ORK.OL".to_string(),
                "MOWI.OL".to_string(),
            ],
            start: NaiveDate::from_ymd_opt(2020, 10, 15).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 10, 15).unwrap(),
            cache_ttl_secs: 6 * 60 * 60,
            colors,
        }
    }
}

impl Default for Watchlist {
    fn default() -> Self {
        Self::default_oslo()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_watchlist_matches_the_dashboard() {
        let w = Watchlist::default_oslo();
        assert_eq!(w.tickers.len(), 5);
        assert_eq!(w.tickers[0], "EQNR.OL");
        assert_eq!(w.color("MOWI.OL"), Some("#c180ff"));
        assert_eq!(w.start, NaiveDate::from_ymd_opt(2020, 10, 15).unwrap());
        assert_eq!(w.cache_ttl_secs, 21_600);
    }

    #[test]
    fn toml_roundtrip() {
        let w = Watchlist::default_oslo();
        let toml_str = w.to_toml().unwrap();
        let parsed = Watchlist::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.tickers, w.tickers);
        assert_eq!(parsed.start, w.start);
        assert_eq!(parsed.colors, w.colors);
    }

    #[test]
    fn parses_a_hand_written_file() {
        let content = r##"
            tickers = ["SPY", "QQQ"]
            start = "2022-01-01"
            end = "2024-01-01"
            cache_ttl_secs = 3600

            [colors]
            SPY = "#00ffff"
        "##;
        let w = Watchlist::from_toml(content).unwrap();
        assert_eq!(w.tickers, vec!["SPY".to_string(), "QQQ".to_string()]);
        assert_eq!(w.color("SPY"), Some("#00ffff"));
        assert_eq!(w.color("QQQ"), None);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(Watchlist::from_toml("tickers = not-a-list").is_err());
    }
}
