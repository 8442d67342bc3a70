//! Price bars and validated per-pair price series.

use crate::domain::currency::InstrumentPair;
use crate::domain::error::StrengthError;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    /// Bar with every price set to `close`, for sources that only carry closes.
    pub fn from_close(timestamp: NaiveDateTime, close: f64) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    /// Quote of the inverse pair. High and low swap under the reciprocal.
    pub fn reciprocal(&self) -> Self {
        Self {
            timestamp: self.timestamp,
            open: 1.0 / self.open,
            high: 1.0 / self.low,
            low: 1.0 / self.high,
            close: 1.0 / self.close,
        }
    }

    fn prices(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }
}

/// Chronological bars for one pair: non-empty, strictly increasing timestamps,
/// every price finite and positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pair: InstrumentPair,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(pair: InstrumentPair, bars: Vec<PriceBar>) -> Result<Self, StrengthError> {
        let invalid = |reason: String| StrengthError::InvalidSeries {
            symbol: pair.symbol(),
            reason,
        };

        if bars.is_empty() {
            return Err(invalid("series is empty".into()));
        }

        for (i, bar) in bars.iter().enumerate() {
            if bar.prices().iter().any(|p| !p.is_finite() || *p <= 0.0) {
                return Err(invalid(format!(
                    "non-positive or non-finite price at {}",
                    bar.timestamp
                )));
            }
            if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
                return Err(invalid(format!(
                    "timestamps not strictly increasing at {}",
                    bar.timestamp
                )));
            }
        }

        Ok(Self { pair, bars })
    }

    pub(crate) fn from_validated(pair: InstrumentPair, bars: Vec<PriceBar>) -> Self {
        Self { pair, bars }
    }

    pub fn pair(&self) -> InstrumentPair {
        self.pair
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.bars.iter().map(|b| b.timestamp)
    }

    /// The same history quoted as the inverse pair.
    pub fn inverted(&self) -> Self {
        Self {
            pair: self.pair.inverse(),
            bars: self.bars.iter().map(PriceBar::reciprocal).collect(),
        }
    }
}
