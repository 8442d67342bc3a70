//! Per-currency strength aggregation.
//!
//! For a currency C and each opponent O, the (C, O) pair is resolved (direct or
//! inverted) and its RSI normalised to [-1, 1] via (RSI - 50) / 50. The mean over
//! resolved opponents is rescaled to [0, 10] via (mean + 1) * 5 and smoothed with
//! a trailing SMA.
//!
//! Opponents that cannot be resolved are skipped and excluded from the mean.
//! With no resolved opponent at all the raw score is the neutral 5.0 and the
//! result reports `opponents_used() == 0`.

use crate::domain::config::StrengthConfig;
use crate::domain::currency::Currency;
use crate::domain::error::StrengthError;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::smooth;
use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::pair_resolver::{Orientation, QuoteTable, resolve_pair};
use crate::domain::price_matrix::PriceMatrix;

pub const NEUTRAL_SCORE: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct ResolvedOpponent {
    pub opponent: Currency,
    pub orientation: Orientation,
    pub rsi: IndicatorSeries,
}

#[derive(Debug)]
pub struct SkippedOpponent {
    pub opponent: Currency,
    pub reason: StrengthError,
}

#[derive(Debug)]
pub struct CurrencyStrength {
    pub currency: Currency,
    pub resolved: Vec<ResolvedOpponent>,
    pub skipped: Vec<SkippedOpponent>,
    /// Unsmoothed score per timestamp.
    pub raw: IndicatorSeries,
    /// Emitted strength series.
    pub smoothed: IndicatorSeries,
}

impl CurrencyStrength {
    pub fn opponents_used(&self) -> usize {
        self.resolved.len()
    }

    pub fn opponents_possible(&self) -> usize {
        self.resolved.len() + self.skipped.len()
    }

    pub fn has_opponents(&self) -> bool {
        !self.resolved.is_empty()
    }

    pub fn is_reduced_confidence(&self) -> bool {
        !self.skipped.is_empty()
    }

    pub fn latest(&self) -> Option<f64> {
        self.smoothed.latest()
    }

    pub fn previous(&self) -> Option<f64> {
        self.smoothed.previous()
    }
}

/// Map an RSI value in [0, 100] to [-1, 1].
pub fn normalize_rsi(rsi: f64) -> f64 {
    ((rsi - 50.0) / 50.0).clamp(-1.0, 1.0)
}

/// Map a mean in [-1, 1] to a score in [0, 10].
pub fn rescale(mean: f64) -> f64 {
    (mean + 1.0) * 5.0
}

pub fn compute_currency_strength(
    currency: Currency,
    config: &StrengthConfig,
    quotes: &QuoteTable,
    matrix: &PriceMatrix,
) -> Result<CurrencyStrength, StrengthError> {
    let mut resolved = Vec::new();
    let mut skipped = Vec::new();

    for opponent in config.opponents(currency) {
        let outcome = resolve_pair(quotes, matrix, currency, opponent)
            .and_then(|pair| Ok((pair.orientation, calculate_rsi(&pair.series, config.rsi_period)?)));

        match outcome {
            Ok((orientation, rsi)) => {
                tracing::debug!(%currency, %opponent, %orientation, "opponent resolved");
                resolved.push(ResolvedOpponent {
                    opponent,
                    orientation,
                    rsi,
                });
            }
            Err(reason) if reason.is_market_data() => {
                tracing::debug!(%currency, %opponent, %reason, "opponent skipped");
                skipped.push(SkippedOpponent { opponent, reason });
            }
            Err(e) => return Err(e),
        }
    }

    let raw = aggregate(matrix, &resolved, config.rsi_period);
    let smoothed = smooth(&raw.values, config.smoothing)?.with_type(IndicatorType::Strength {
        period: config.rsi_period,
        smoothing: config.smoothing,
    });

    Ok(CurrencyStrength {
        currency,
        resolved,
        skipped,
        raw,
        smoothed,
    })
}

fn aggregate(matrix: &PriceMatrix, resolved: &[ResolvedOpponent], period: usize) -> IndicatorSeries {
    let values = matrix
        .timeline()
        .iter()
        .enumerate()
        .map(|(i, &timestamp)| {
            if resolved.is_empty() {
                return IndicatorPoint::defined(timestamp, NEUTRAL_SCORE);
            }
            let normalized: Option<Vec<f64>> = resolved
                .iter()
                .map(|r| r.rsi.value_at(i).map(normalize_rsi))
                .collect();
            match normalized {
                Some(values) => {
                    let mean = values.iter().sum::<f64>() / values.len() as f64;
                    IndicatorPoint::defined(timestamp, rescale(mean))
                }
                None => IndicatorPoint::undefined(timestamp),
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::RawStrength(period),
        values,
    }
}
