//! Strength engine: price matrix in, per-currency strength series out.
//!
//! Stateless. Each call recomputes everything from the supplied matrix and may
//! run concurrently with other calls on independent inputs.

use crate::domain::config::StrengthConfig;
use crate::domain::currency::Currency;
use crate::domain::error::StrengthError;
use crate::domain::pair_resolver::QuoteTable;
use crate::domain::price_matrix::PriceMatrix;
use crate::domain::ranking::{Snapshot, build_snapshot};
use crate::domain::strength::{CurrencyStrength, compute_currency_strength};
use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct StrengthEngine {
    config: StrengthConfig,
    quotes: QuoteTable,
}

impl StrengthEngine {
    pub fn new(config: StrengthConfig, quotes: QuoteTable) -> Result<Self, StrengthError> {
        config.validate()?;
        Ok(Self { config, quotes })
    }

    pub fn config(&self) -> &StrengthConfig {
        &self.config
    }

    pub fn quotes(&self) -> &QuoteTable {
        &self.quotes
    }

    /// Never fails for missing market data; missing pairs only lower the
    /// opponent count of the affected currencies.
    pub fn compute(&self, matrix: &PriceMatrix) -> Result<StrengthReport, StrengthError> {
        if matrix.len() < self.config.min_samples() {
            tracing::warn!(
                samples = matrix.len(),
                minimum = self.config.min_samples(),
                "price history shorter than warm-up"
            );
        }

        let currencies = self
            .config
            .currencies
            .iter()
            .map(|&c| compute_currency_strength(c, &self.config, &self.quotes, matrix))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StrengthReport {
            timeline: matrix.timeline().to_vec(),
            currencies,
            config: self.config.clone(),
        })
    }
}

#[derive(Debug)]
pub struct StrengthReport {
    pub timeline: Vec<NaiveDateTime>,
    /// In configured currency order.
    pub currencies: Vec<CurrencyStrength>,
    pub config: StrengthConfig,
}

impl StrengthReport {
    pub fn get(&self, currency: Currency) -> Option<&CurrencyStrength> {
        self.currencies.iter().find(|s| s.currency == currency)
    }

    pub fn latest_timestamp(&self) -> Option<NaiveDateTime> {
        self.timeline.last().copied()
    }

    pub fn latest_scores(&self) -> Vec<(Currency, Option<f64>)> {
        self.currencies
            .iter()
            .map(|s| (s.currency, s.latest()))
            .collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        build_snapshot(&self.currencies, self.latest_timestamp(), &self.config.alerts)
    }

    /// Currencies whose score could not be computed, as `InsufficientData` errors.
    pub fn insufficient_data(&self) -> Vec<StrengthError> {
        self.snapshot()
            .insufficient
            .into_iter()
            .map(|i| StrengthError::InsufficientData {
                currency: i.currency.to_string(),
                reason: i.reason.to_string(),
            })
            .collect()
    }
}
