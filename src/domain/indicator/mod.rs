//! Indicator series shared by the RSI, smoothing and strength stages.
//!
//! - `IndicatorPoint`: one timestamped value plus a validity flag
//! - `IndicatorType`: indicator identity and parameters
//! - `IndicatorSeries`: a time series of points on the price matrix timeline
//!
//! Points inside a warm-up window carry `valid = false` and a NaN value.

pub mod rsi;
pub mod sma;

use chrono::NaiveDateTime;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

impl IndicatorPoint {
    pub fn defined(timestamp: NaiveDateTime, value: f64) -> Self {
        Self {
            timestamp,
            valid: true,
            value,
        }
    }

    pub fn undefined(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            valid: false,
            value: f64::NAN,
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.valid.then_some(self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Rsi(usize),
    Sma(usize),
    /// Unsmoothed 0..10 score from RSI of the given period.
    RawStrength(usize),
    Strength { period: usize, smoothing: usize },
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.values.get(index).and_then(IndicatorPoint::value)
    }

    /// Last point's value, if the series is non-empty and past warm-up.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().and_then(IndicatorPoint::value)
    }

    /// The point before the last one.
    pub fn previous(&self) -> Option<f64> {
        self.values
            .len()
            .checked_sub(2)
            .and_then(|i| self.value_at(i))
    }

    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(|p| p.valid)
    }

    pub fn with_type(self, indicator_type: IndicatorType) -> Self {
        Self {
            indicator_type,
            values: self.values,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Sma(window) => write!(f, "SMA({})", window),
            IndicatorType::RawStrength(period) => write!(f, "RAW_STRENGTH({})", period),
            IndicatorType::Strength { period, smoothing } => {
                write!(f, "STRENGTH({},{})", period, smoothing)
            }
        }
    }
}
