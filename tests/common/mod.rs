#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fxstrength::domain::currency::InstrumentPair;
use fxstrength::domain::error::StrengthError;
pub use fxstrength::domain::price_series::{PriceBar, PriceSeries};
use fxstrength::ports::data_port::PriceDataPort;
use std::cell::Cell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<InstrumentPair, PriceSeries>,
    pub errors: HashMap<InstrumentPair, String>,
    pub fetches: Cell<usize>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            fetches: Cell::new(0),
        }
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.data.insert(series.pair(), series);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(pair(symbol), reason.to_string());
        self
    }
}

impl PriceDataPort for MockDataPort {
    fn fetch_series(&self, pair: &InstrumentPair) -> Result<PriceSeries, StrengthError> {
        self.fetches.set(self.fetches.get() + 1);
        if let Some(reason) = self.errors.get(pair) {
            return Err(StrengthError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(pair)
            .cloned()
            .ok_or_else(|| StrengthError::PairUnavailable {
                pair: pair.symbol(),
            })
    }

    fn list_pairs(&self) -> Result<Vec<InstrumentPair>, StrengthError> {
        let mut pairs: Vec<_> = self.data.keys().copied().collect();
        pairs.sort();
        Ok(pairs)
    }
}

pub fn pair(symbol: &str) -> InstrumentPair {
    InstrumentPair::parse(symbol).unwrap()
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Hourly close-only series starting at `start_time()`.
pub fn make_series(symbol: &str, closes: &[f64]) -> PriceSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::from_close(start_time() + Duration::hours(i as i64), c))
        .collect();
    PriceSeries::new(pair(symbol), bars).unwrap()
}

pub fn rising(start: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start * (1.0 + 0.001 * i as f64)).collect()
}

pub fn falling(start: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| start * (1.0 - 0.001 * i as f64)).collect()
}

pub fn flat(price: f64, n: usize) -> Vec<f64> {
    vec![price; n]
}

/// Deterministic up/down walk so RSI lands strictly inside (0, 100).
pub fn zigzag(start: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let step = if i % 3 == 0 { -0.002 } else { 0.0015 };
            start * (1.0 + step * (i as f64).sqrt())
        })
        .collect()
}

/// `timestamp,close` CSV body for a series of closes.
pub fn csv_body(closes: &[f64]) -> String {
    let mut body = String::from("timestamp,close\n");
    for (i, c) in closes.iter().enumerate() {
        let ts = start_time() + Duration::hours(i as i64);
        body.push_str(&format!("{},{}\n", ts.format("%Y-%m-%d %H:%M:%S"), c));
    }
    body
}
