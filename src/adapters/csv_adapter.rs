//! CSV directory data adapter.
//!
//! One file per quoted pair, `<BASE>_<QUOTE>.csv`, with a header row and either
//! `timestamp,open,high,low,close` or `timestamp,close` columns. Timestamps are
//! `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.

use crate::domain::currency::InstrumentPair;
use crate::domain::error::StrengthError;
use crate::domain::price_series::{PriceBar, PriceSeries};
use crate::ports::data_port::PriceDataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, pair: &InstrumentPair) -> PathBuf {
        self.base_path.join(format!("{}.csv", pair.symbol()))
    }
}

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn parse_price(record: &csv::StringRecord, index: usize, column: &str) -> Result<f64, StrengthError> {
    record
        .get(index)
        .ok_or_else(|| StrengthError::Data {
            reason: format!("missing {} column", column),
        })?
        .trim()
        .parse()
        .map_err(|e| StrengthError::Data {
            reason: format!("invalid {} value: {}", column, e),
        })
}

impl PriceDataPort for CsvAdapter {
    fn fetch_series(&self, pair: &InstrumentPair) -> Result<PriceSeries, StrengthError> {
        let path = self.csv_path(pair);
        let content = fs::read_to_string(&path).map_err(|e| StrengthError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| StrengthError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let ts_str = record.get(0).ok_or_else(|| StrengthError::Data {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(ts_str).ok_or_else(|| StrengthError::Data {
                reason: format!("invalid timestamp {:?}", ts_str),
            })?;

            let bar = if record.len() == 2 {
                PriceBar::from_close(timestamp, parse_price(&record, 1, "close")?)
            } else {
                PriceBar {
                    timestamp,
                    open: parse_price(&record, 1, "open")?,
                    high: parse_price(&record, 2, "high")?,
                    low: parse_price(&record, 3, "low")?,
                    close: parse_price(&record, 4, "close")?,
                }
            };
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.timestamp);
        PriceSeries::new(*pair, bars)
    }

    fn list_pairs(&self) -> Result<Vec<InstrumentPair>, StrengthError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| StrengthError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut pairs = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| StrengthError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(stem) = name_str.strip_suffix(".csv") {
                match InstrumentPair::parse(stem) {
                    Ok(pair) => pairs.push(pair),
                    Err(_) => tracing::debug!(file = %name_str, "ignoring non-pair csv file"),
                }
            }
        }

        pairs.sort();
        Ok(pairs)
    }
}
