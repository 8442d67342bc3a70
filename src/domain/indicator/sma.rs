//! Trailing simple moving average over an indicator series.
//!
//! SMA(w)[i] = (x[i-w+1] + ... + x[i]) / w
//! Warmup: first (w-1) points are invalid, as is any point whose window
//! holds an invalid input. Window 1 is the identity.

use crate::domain::error::StrengthError;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};

pub const MIN_SMOOTHING: usize = 1;
pub const MAX_SMOOTHING: usize = 10;

pub fn smooth(points: &[IndicatorPoint], window: usize) -> Result<IndicatorSeries, StrengthError> {
    if !(MIN_SMOOTHING..=MAX_SMOOTHING).contains(&window) {
        return Err(StrengthError::ConfigInvalid {
            section: "meter".into(),
            key: "smoothing".into(),
            reason: format!(
                "smoothing must be between {} and {}, got {}",
                MIN_SMOOTHING, MAX_SMOOTHING, window
            ),
        });
    }

    let mut values = Vec::with_capacity(points.len());
    let warmup = window - 1;

    for i in 0..points.len() {
        let timestamp = points[i].timestamp;
        let span = if i >= warmup {
            Some(&points[i - warmup..=i])
        } else {
            None
        };

        let point = match span {
            Some(span) if span.iter().all(|p| p.valid) => {
                let mean = span.iter().map(|p| p.value).sum::<f64>() / window as f64;
                IndicatorPoint::defined(timestamp, mean)
            }
            _ => IndicatorPoint::undefined(timestamp),
        };
        values.push(point);
    }

    Ok(IndicatorSeries {
        indicator_type: IndicatorType::Sma(window),
        values,
    })
}
