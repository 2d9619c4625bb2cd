//! Tickerlab Core — the market data loader behind the dashboard.
//!
//! This crate contains everything the UI layers consume:
//! - Provider abstraction with Yahoo Finance and synthetic implementations
//! - Raw-table shape classification and close-price normalization
//! - Daily returns derivation
//! - TTL-cached, single-flight memoization of loads
//! - Volatility statistics (daily / annualized standard deviation)
//! - Watchlist configuration (tickers, date range, chart colors)

pub mod data;
pub mod stats;
pub mod watchlist;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types shared with the TUI worker thread are
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<data::MarketDataLoader>();
        require_sync::<data::MarketDataLoader>();
        require_send::<data::MarketSnapshot>();
        require_sync::<data::MarketSnapshot>();
        require_send::<data::TickerFrame>();
        require_sync::<data::TickerFrame>();
        require_send::<data::RawPriceTable>();
        require_sync::<data::RawPriceTable>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<watchlist::Watchlist>();
        require_sync::<watchlist::Watchlist>();
        require_send::<stats::VolatilityStat>();
        require_sync::<stats::VolatilityStat>();
    }
}
