//! RSI (Relative Strength Index) over a pair's closing prices.
//!
//! Uses Wilder's smoothing (alpha = 1/n) for average gain/loss:
//! - First average: simple mean of the first n gains/losses
//! - Subsequent: avg = prev_avg + (current - prev_avg) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100
//! If avg_loss == 0 and avg_gain == 0 (no movement): RSI = 50
//!
//! Warmup: first n points are invalid (need n price changes for the first average).

use crate::domain::error::StrengthError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::price_series::PriceSeries;

pub const MIN_RSI_PERIOD: usize = 1;
pub const MAX_RSI_PERIOD: usize = 100;

pub fn calculate_rsi(series: &PriceSeries, period: usize) -> Result<IndicatorSeries, StrengthError> {
    if !(MIN_RSI_PERIOD..=MAX_RSI_PERIOD).contains(&period) {
        return Err(StrengthError::ConfigInvalid {
            section: "meter".into(),
            key: "rsi_period".into(),
            reason: format!(
                "rsi_period must be between {} and {}, got {}",
                MIN_RSI_PERIOD, MAX_RSI_PERIOD, period
            ),
        });
    }

    let bars = series.bars();
    let mut values = Vec::with_capacity(bars.len());
    if let Some(first) = bars.first() {
        values.push(IndicatorPoint::undefined(first.timestamp));
    }

    let alpha = 1.0 / period as f64;
    let mut sum_gain = 0.0;
    let mut sum_loss = 0.0;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for (i, pair) in bars.windows(2).enumerate() {
        let change = pair[1].close - pair[0].close;
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };
        let timestamp = pair[1].timestamp;

        if i < period - 1 {
            sum_gain += gain;
            sum_loss += loss;
            values.push(IndicatorPoint::undefined(timestamp));
        } else if i == period - 1 {
            avg_gain = (sum_gain + gain) / period as f64;
            avg_loss = (sum_loss + loss) / period as f64;
            values.push(IndicatorPoint::defined(timestamp, rsi_from_averages(avg_gain, avg_loss)));
        } else {
            avg_gain += alpha * (gain - avg_gain);
            avg_loss += alpha * (loss - avg_loss);
            values.push(IndicatorPoint::defined(timestamp, rsi_from_averages(avg_gain, avg_loss)));
        }
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Rsi(period),
        values,
    })
}

pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 { 50.0 } else { 100.0 }
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
