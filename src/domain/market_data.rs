//! Best-effort batch fetch of every quoted pair the meter needs.
//!
//! Each pair is fetched independently; a failing pair is logged and skipped so
//! one bad feed never aborts the refresh.

use crate::domain::currency::{Currency, InstrumentPair};
use crate::domain::error::StrengthError;
use crate::domain::pair_resolver::QuoteTable;
use crate::domain::price_matrix::PriceMatrix;
use crate::ports::data_port::PriceDataPort;

#[derive(Debug)]
pub struct SkippedPair {
    pub pair: InstrumentPair,
    pub reason: StrengthError,
}

#[derive(Debug)]
pub struct MarketFetch {
    pub matrix: PriceMatrix,
    pub fetched: Vec<InstrumentPair>,
    pub skipped: Vec<SkippedPair>,
}

pub fn fetch_price_matrix(
    data_port: &dyn PriceDataPort,
    quotes: &QuoteTable,
    currencies: &[Currency],
) -> Result<MarketFetch, StrengthError> {
    let mut series = Vec::new();
    let mut fetched = Vec::new();
    let mut skipped = Vec::new();

    for pair in quotes.pairs_within(currencies) {
        match data_port.fetch_series(&pair) {
            Ok(s) => {
                fetched.push(pair);
                series.push(s);
            }
            Err(reason) => {
                tracing::warn!(pair = %pair, %reason, "skipping pair");
                skipped.push(SkippedPair { pair, reason });
            }
        }
    }

    if series.is_empty() && !skipped.is_empty() {
        return Err(StrengthError::Data {
            reason: format!("no price data for any of {} quoted pairs", skipped.len()),
        });
    }

    Ok(MarketFetch {
        matrix: PriceMatrix::align(series),
        fetched,
        skipped,
    })
}
