//! Price data port: the fetch collaborator that supplies per-pair history.

use crate::domain::currency::InstrumentPair;
use crate::domain::error::StrengthError;
use crate::domain::price_series::PriceSeries;

pub trait PriceDataPort {
    /// History of one directly quoted pair, oldest first.
    fn fetch_series(&self, pair: &InstrumentPair) -> Result<PriceSeries, StrengthError>;

    /// Pairs this source can serve.
    fn list_pairs(&self) -> Result<Vec<InstrumentPair>, StrengthError>;
}
