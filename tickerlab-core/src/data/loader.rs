//! Memoized market data loading.
//!
//! `MarketDataLoader` wraps a [`DataProvider`] with a process-wide TTL cache
//! keyed by (deduplicated tickers, start, end). Entries are immutable and
//! replaced wholesale when stale; eviction is lazy, on lookup. Concurrent
//! callers of the same cold key are single-flighted: one performs the fetch,
//! the rest block on the store's condvar and receive the same snapshot.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime};

use super::normalize::{daily_returns, normalize};
use super::provider::{DataError, DataProvider, LoadProgress};
use super::table::{RawPriceTable, TickerFrame};

/// Default entry lifetime: six hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(6 * 60 * 60);

/// Cache key: normalized ticker list (deduplicated, order preserved) plus
/// the date range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RequestKey {
    tickers: Vec<String>,
    start: NaiveDate,
    end: NaiveDate,
}

/// One fully materialized load result.
///
/// Immutable once published; `fingerprint` is the BLAKE3 content hash of
/// the raw table, so byte-identical cache hits are observable to callers.
#[derive(Debug)]
pub struct MarketSnapshot {
    pub raw: RawPriceTable,
    pub close: TickerFrame,
    pub returns: TickerFrame,
    pub fingerprint: String,
    pub fetched_at: NaiveDateTime,
}

enum Slot {
    /// A fetch for this key is running; waiters block on the condvar.
    InFlight,
    Ready {
        snapshot: Arc<MarketSnapshot>,
        created_at: Instant,
    },
}

/// TTL-cached loader over a data provider.
pub struct MarketDataLoader {
    provider: Arc<dyn DataProvider>,
    ttl: Duration,
    store: Mutex<HashMap<RequestKey, Slot>>,
    publish: Condvar,
}

impl MarketDataLoader {
    pub fn new(provider: Arc<dyn DataProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            store: Mutex::new(HashMap::new()),
            publish: Condvar::new(),
        }
    }

    pub fn with_default_ttl(provider: Arc<dyn DataProvider>) -> Self {
        Self::new(provider, DEFAULT_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Load (raw, close, returns) for the tickers over start..end.
    ///
    /// Returns a cached snapshot when a fresh entry exists; otherwise fetches
    /// from the provider, normalizes, and publishes a new entry. Duplicate
    /// tickers collapse to their first occurrence before the key is formed.
    pub fn load(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<MarketSnapshot>, DataError> {
        self.load_with_progress(tickers, start, end, None)
    }

    /// `load` with a per-ticker progress callback, forwarded to the provider
    /// on cache miss. Cache hits report nothing — there is no fetch.
    pub fn load_with_progress(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
        progress: Option<&dyn LoadProgress>,
    ) -> Result<Arc<MarketSnapshot>, DataError> {
        if tickers.is_empty() {
            return Err(DataError::InvalidRequest("ticker list is empty".into()));
        }
        if start >= end {
            return Err(DataError::InvalidRequest(format!(
                "start {start} is not before end {end}"
            )));
        }

        let deduped = dedup_preserving_order(tickers);
        let key = RequestKey {
            tickers: deduped.clone(),
            start,
            end,
        };

        // Become the leader for this key, take a fresh hit, or wait out a
        // peer's in-flight fetch.
        enum Action {
            Hit(Arc<MarketSnapshot>),
            Lead,
            Wait,
        }

        let mut guard = self.store.lock().unwrap();
        loop {
            let action = match guard.get(&key) {
                Some(Slot::Ready {
                    snapshot,
                    created_at,
                }) if created_at.elapsed() < self.ttl => Action::Hit(Arc::clone(snapshot)),
                Some(Slot::InFlight) => Action::Wait,
                // Missing, or stale and due for wholesale replacement.
                _ => Action::Lead,
            };
            match action {
                Action::Hit(snapshot) => return Ok(snapshot),
                Action::Wait => guard = self.publish.wait(guard).unwrap(),
                Action::Lead => {
                    guard.insert(key.clone(), Slot::InFlight);
                    break;
                }
            }
        }
        drop(guard);

        // Fetch and normalize outside the lock; the entry is built in full
        // before publication so readers never see a partial value.
        let result = self.fetch_snapshot(&deduped, start, end, progress);

        let mut guard = self.store.lock().unwrap();
        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                guard.insert(
                    key,
                    Slot::Ready {
                        snapshot: Arc::clone(&snapshot),
                        created_at: Instant::now(),
                    },
                );
                self.publish.notify_all();
                Ok(snapshot)
            }
            Err(e) => {
                // A failed fetch caches nothing; a waiter may take over as
                // the next leader.
                guard.remove(&key);
                self.publish.notify_all();
                Err(e)
            }
        }
    }

    fn fetch_snapshot(
        &self,
        tickers: &[String],
        start: NaiveDate,
        end: NaiveDate,
        progress: Option<&dyn LoadProgress>,
    ) -> Result<MarketSnapshot, DataError> {
        let raw = self.provider.fetch(tickers, start, end, progress)?;
        let close = normalize(&raw, tickers)?;
        let returns = daily_returns(&close);
        let fingerprint = raw.fingerprint();
        Ok(MarketSnapshot {
            raw,
            close,
            returns,
            fingerprint,
            fetched_at: chrono::Local::now().naive_local(),
        })
    }

    /// Number of live (non-stale) cache entries. In-flight fetches count.
    pub fn cached_entries(&self) -> usize {
        let guard = self.store.lock().unwrap();
        guard
            .values()
            .filter(|slot| match slot {
                Slot::InFlight => true,
                Slot::Ready { created_at, .. } => created_at.elapsed() < self.ttl,
            })
            .count()
    }
}

/// Collapse duplicate tickers to their first occurrence, preserving order.
fn dedup_preserving_order(tickers: &[String]) -> Vec<String> {
    let mut seen = Vec::with_capacity(tickers.len());
    for t in tickers {
        if !seen.contains(t) {
            seen.push(t.clone());
        }
    }
    seen
}
