//! Meter configuration and its validation.
//!
//! Missing keys fall back to defaults; present but out-of-range values are
//! rejected so a typo never silently changes the computation.

use crate::domain::currency::{Currency, DEFAULT_CURRENCIES, parse_currencies};
use crate::domain::error::StrengthError;
use crate::domain::indicator::rsi::{MAX_RSI_PERIOD, MIN_RSI_PERIOD};
use crate::domain::indicator::sma::{MAX_SMOOTHING, MIN_SMOOTHING};
use crate::domain::pair_resolver::QuoteTable;
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_SMOOTHING: usize = 3;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Per-currency strong alert when score > this.
    pub strong_above: f64,
    /// Per-currency weak alert when score < this.
    pub weak_below: f64,
    /// Divergence alert when max - min > this.
    pub divergence_above: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            strong_above: 8.0,
            weak_below: 2.0,
            divergence_above: 6.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrengthConfig {
    pub currencies: Vec<Currency>,
    pub rsi_period: usize,
    pub smoothing: usize,
    pub alerts: AlertThresholds,
}

impl Default for StrengthConfig {
    fn default() -> Self {
        Self {
            currencies: DEFAULT_CURRENCIES.to_vec(),
            rsi_period: DEFAULT_RSI_PERIOD,
            smoothing: DEFAULT_SMOOTHING,
            alerts: AlertThresholds::default(),
        }
    }
}

impl StrengthConfig {
    pub fn new(
        currencies: Vec<Currency>,
        rsi_period: usize,
        smoothing: usize,
    ) -> Result<Self, StrengthError> {
        let config = Self {
            currencies,
            rsi_period,
            smoothing,
            alerts: AlertThresholds::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_alerts(mut self, alerts: AlertThresholds) -> Result<Self, StrengthError> {
        self.alerts = alerts;
        self.validate()?;
        Ok(self)
    }

    /// Every configured currency except `currency`, in configured order.
    pub fn opponents(&self, currency: Currency) -> impl Iterator<Item = Currency> + '_ {
        self.currencies.iter().copied().filter(move |c| *c != currency)
    }

    /// Samples needed for two smoothed points (a latest value and a velocity).
    pub fn min_samples(&self) -> usize {
        self.rsi_period + self.smoothing + 1
    }

    pub fn validate(&self) -> Result<(), StrengthError> {
        validate_currencies(&self.currencies)?;
        validate_range("rsi_period", self.rsi_period, MIN_RSI_PERIOD, MAX_RSI_PERIOD)?;
        validate_range("smoothing", self.smoothing, MIN_SMOOTHING, MAX_SMOOTHING)?;
        validate_alerts(&self.alerts)?;
        Ok(())
    }

    pub fn from_port(config: &dyn ConfigPort) -> Result<Self, StrengthError> {
        let currencies = match config.get_string("meter", "currencies") {
            Some(list) if !list.trim().is_empty() => parse_currencies(&list)?,
            _ => DEFAULT_CURRENCIES.to_vec(),
        };
        let rsi_period = read_usize(config, "meter", "rsi_period", DEFAULT_RSI_PERIOD)?;
        let smoothing = read_usize(config, "meter", "smoothing", DEFAULT_SMOOTHING)?;

        let defaults = AlertThresholds::default();
        let alerts = AlertThresholds {
            strong_above: read_f64(config, "alerts", "strong_above", defaults.strong_above)?,
            weak_below: read_f64(config, "alerts", "weak_below", defaults.weak_below)?,
            divergence_above: read_f64(
                config,
                "alerts",
                "divergence_above",
                defaults.divergence_above,
            )?,
        };

        let config = Self {
            currencies,
            rsi_period,
            smoothing,
            alerts,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Quote table from `[pairs] quoted`, or the OANDA table when absent.
pub fn quote_table_from_port(config: &dyn ConfigPort) -> Result<QuoteTable, StrengthError> {
    let symbols = config.get_list("pairs", "quoted");
    if symbols.is_empty() {
        return Ok(QuoteTable::oanda());
    }
    QuoteTable::from_symbols(&symbols)
}

pub fn cache_ttl_from_port(config: &dyn ConfigPort) -> Result<Duration, StrengthError> {
    let secs = read_parsed(
        config,
        "data",
        "cache_ttl_secs",
        DEFAULT_CACHE_TTL_SECS,
        "a whole number of seconds",
    )?;
    Ok(Duration::from_secs(secs))
}

fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, StrengthError> {
    read_parsed(config, section, key, default, "a positive integer")
}

fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, StrengthError> {
    let value = read_parsed(config, section, key, default, "a number")?;
    if !value.is_finite() {
        return Err(StrengthError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected a finite number, got {value}"),
        });
    }
    Ok(value)
}

/// Missing or blank keys take `default`; anything else must parse.
fn read_parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, StrengthError> {
    let raw = match config.get_string(section, key) {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Ok(default),
    };
    raw.trim()
        .parse::<T>()
        .map_err(|_| StrengthError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("expected {expected}, got {:?}", raw),
        })
}

fn validate_currencies(currencies: &[Currency]) -> Result<(), StrengthError> {
    if currencies.len() < 2 {
        return Err(StrengthError::ConfigInvalid {
            section: "meter".to_string(),
            key: "currencies".to_string(),
            reason: "at least two currencies are required".to_string(),
        });
    }
    for (i, c) in currencies.iter().enumerate() {
        if currencies[..i].contains(c) {
            return Err(StrengthError::ConfigInvalid {
                section: "meter".to_string(),
                key: "currencies".to_string(),
                reason: format!("duplicate currency {c}"),
            });
        }
    }
    Ok(())
}

fn validate_range(key: &str, value: usize, min: usize, max: usize) -> Result<(), StrengthError> {
    if value < min || value > max {
        return Err(StrengthError::ConfigInvalid {
            section: "meter".to_string(),
            key: key.to_string(),
            reason: format!("{key} must be between {min} and {max}, got {value}"),
        });
    }
    Ok(())
}

fn validate_alerts(alerts: &AlertThresholds) -> Result<(), StrengthError> {
    let checks = [
        ("strong_above", alerts.strong_above),
        ("weak_below", alerts.weak_below),
        ("divergence_above", alerts.divergence_above),
    ];
    for (key, value) in checks {
        if !(0.0..=10.0).contains(&value) {
            return Err(StrengthError::ConfigInvalid {
                section: "alerts".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be between 0 and 10"),
            });
        }
    }
    if alerts.weak_below >= alerts.strong_above {
        return Err(StrengthError::ConfigInvalid {
            section: "alerts".to_string(),
            key: "weak_below".to_string(),
            reason: "weak_below must be less than strong_above".to_string(),
        });
    }
    Ok(())
}
