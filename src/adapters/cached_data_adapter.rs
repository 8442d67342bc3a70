//! Time-boxed cache in front of any price data port.
//!
//! Successful fetches are kept for `ttl`; failures are never cached so a pair
//! that was down on one refresh is retried on the next.

use crate::domain::currency::InstrumentPair;
use crate::domain::error::StrengthError;
use crate::domain::price_series::PriceSeries;
use crate::ports::data_port::PriceDataPort;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct CachedDataAdapter<P> {
    inner: P,
    ttl: Duration,
    entries: Mutex<HashMap<InstrumentPair, (Instant, PriceSeries)>>,
}

impl<P: PriceDataPort> CachedDataAdapter<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Drop every cached entry.
    pub fn invalidate(&self) {
        self.entries.lock().clear();
    }

    pub fn cached_len(&self) -> usize {
        self.entries.lock().len()
    }
}

impl<P: PriceDataPort> PriceDataPort for CachedDataAdapter<P> {
    fn fetch_series(&self, pair: &InstrumentPair) -> Result<PriceSeries, StrengthError> {
        if let Some((fetched_at, series)) = self.entries.lock().get(pair) {
            if fetched_at.elapsed() < self.ttl {
                tracing::trace!(%pair, "cache hit");
                return Ok(series.clone());
            }
        }

        let series = self.inner.fetch_series(pair)?;
        self.entries.lock().insert(*pair, (Instant::now(), series.clone()));
        Ok(series)
    }

    fn list_pairs(&self) -> Result<Vec<InstrumentPair>, StrengthError> {
        self.inner.list_pairs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price_series::PriceBar;
    use chrono::NaiveDate;
    use std::cell::Cell;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingPort {
        calls: Cell<usize>,
        fail: bool,
    }

    impl CountingPort {
        fn new(fail: bool) -> Self {
            Self {
                calls: Cell::new(0),
                fail,
            }
        }
    }

    impl PriceDataPort for CountingPort {
        fn fetch_series(&self, pair: &InstrumentPair) -> Result<PriceSeries, StrengthError> {
            self.calls.set(self.calls.get() + 1);
            if self.fail {
                return Err(StrengthError::Data {
                    reason: "feed down".into(),
                });
            }
            let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            PriceSeries::new(*pair, vec![PriceBar::from_close(ts, 1.0 + self.calls.get() as f64)])
        }

        fn list_pairs(&self) -> Result<Vec<InstrumentPair>, StrengthError> {
            Ok(vec![InstrumentPair::parse("EUR_USD").unwrap()])
        }
    }

    fn eur_usd() -> InstrumentPair {
        InstrumentPair::parse("EUR_USD").unwrap()
    }

    #[test]
    fn serves_from_cache_within_ttl() {
        let cache = CachedDataAdapter::new(CountingPort::new(false), Duration::from_secs(300));

        let first = cache.fetch_series(&eur_usd()).unwrap();
        let second = cache.fetch_series(&eur_usd()).unwrap();

        assert_eq!(cache.inner().calls.get(), 1);
        assert_eq!(first, second);
        assert_eq!(cache.cached_len(), 1);
    }

    #[test]
    fn zero_ttl_always_refetches() {
        let cache = CachedDataAdapter::new(CountingPort::new(false), Duration::ZERO);

        let first = cache.fetch_series(&eur_usd()).unwrap();
        let second = cache.fetch_series(&eur_usd()).unwrap();

        assert_eq!(cache.inner().calls.get(), 2);
        assert_ne!(first.closes(), second.closes());
    }

    #[test]
    fn expired_entries_are_refetched() {
        let cache = CachedDataAdapter::new(CountingPort::new(false), Duration::from_millis(20));
        cache.fetch_series(&eur_usd()).unwrap();
        std::thread::sleep(Duration::from_millis(40));
        cache.fetch_series(&eur_usd()).unwrap();
        assert_eq!(cache.inner().calls.get(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = CachedDataAdapter::new(CountingPort::new(true), Duration::from_secs(300));
        assert!(cache.fetch_series(&eur_usd()).is_err());
        assert!(cache.fetch_series(&eur_usd()).is_err());
        assert_eq!(cache.inner().calls.get(), 2);
        assert_eq!(cache.cached_len(), 0);
    }

    #[test]
    fn invalidate_clears_entries() {
        let cache = CachedDataAdapter::new(CountingPort::new(false), Duration::from_secs(300));
        cache.fetch_series(&eur_usd()).unwrap();
        cache.invalidate();
        cache.fetch_series(&eur_usd()).unwrap();
        assert_eq!(cache.inner().calls.get(), 2);
        assert_eq!(cache.list_pairs().unwrap().len(), 1);
        assert_eq!(cache.ttl(), Duration::from_secs(300));
    }

    struct AtomicPort {
        calls: AtomicUsize,
    }

    impl PriceDataPort for AtomicPort {
        fn fetch_series(&self, pair: &InstrumentPair) -> Result<PriceSeries, StrengthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let ts = NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            PriceSeries::new(*pair, vec![PriceBar::from_close(ts, 1.1)])
        }

        fn list_pairs(&self) -> Result<Vec<InstrumentPair>, StrengthError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn shared_between_threads() {
        let cache = CachedDataAdapter::new(
            AtomicPort {
                calls: AtomicUsize::new(0),
            },
            Duration::from_secs(300),
        );
        cache.fetch_series(&eur_usd()).unwrap();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let series = cache.fetch_series(&eur_usd()).unwrap();
                    assert_eq!(series.closes(), vec![1.1]);
                });
            }
        });

        assert_eq!(cache.inner().calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached_len(), 1);
    }
}
