//! Quoted-pair table and direct/inverted pair resolution.
//!
//! A requested (base, quote) pair is served from the canonical series when the
//! broker quotes `BASE_QUOTE`, from the reciprocal of `QUOTE_BASE` otherwise,
//! and is unavailable when neither is quoted or the quoted series was not
//! supplied.

use crate::domain::currency::{Currency, InstrumentPair};
use crate::domain::error::StrengthError;
use crate::domain::price_matrix::PriceMatrix;
use crate::domain::price_series::PriceSeries;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

/// OANDA majors and crosses over the default eight currencies.
pub const OANDA_PAIRS: [&str; 28] = [
    "EUR_USD", "GBP_USD", "USD_JPY", "USD_CHF", "AUD_USD", "USD_CAD", "NZD_USD", "EUR_GBP",
    "EUR_JPY", "EUR_CHF", "EUR_CAD", "EUR_AUD", "EUR_NZD", "GBP_JPY", "GBP_CHF", "GBP_CAD",
    "GBP_AUD", "GBP_NZD", "AUD_JPY", "AUD_CAD", "AUD_CHF", "AUD_NZD", "CAD_JPY", "CAD_CHF",
    "NZD_JPY", "NZD_CAD", "NZD_CHF", "CHF_JPY",
];

/// Set of pairs the data source quotes directly. Never holds both `A_B` and `B_A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteTable {
    pairs: HashSet<InstrumentPair>,
}

impl QuoteTable {
    pub fn new(pairs: impl IntoIterator<Item = InstrumentPair>) -> Result<Self, StrengthError> {
        let mut set = HashSet::new();
        for pair in pairs {
            if set.contains(&pair.inverse()) {
                return Err(StrengthError::ConflictingQuotes {
                    pair: pair.symbol(),
                });
            }
            set.insert(pair);
        }
        Ok(Self { pairs: set })
    }

    /// Parse a list of symbols such as `["EUR_USD", "USDJPY"]`.
    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Result<Self, StrengthError> {
        let pairs = symbols
            .iter()
            .map(|s| InstrumentPair::parse(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(pairs)
    }

    pub fn oanda() -> Self {
        let pairs = OANDA_PAIRS
            .iter()
            .filter_map(|s| InstrumentPair::parse(s).ok())
            .collect();
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn contains(&self, pair: &InstrumentPair) -> bool {
        self.pairs.contains(pair)
    }

    pub fn orientation(&self, base: Currency, quote: Currency) -> Option<Orientation> {
        let requested = InstrumentPair { base, quote };
        if self.pairs.contains(&requested) {
            Some(Orientation::Direct)
        } else if self.pairs.contains(&requested.inverse()) {
            Some(Orientation::Inverted)
        } else {
            None
        }
    }

    /// Quoted pairs whose two currencies are both in `currencies`, sorted by symbol.
    pub fn pairs_within(&self, currencies: &[Currency]) -> Vec<InstrumentPair> {
        let mut pairs: Vec<_> = self
            .pairs
            .iter()
            .filter(|p| currencies.contains(&p.base) && currencies.contains(&p.quote))
            .copied()
            .collect();
        pairs.sort();
        pairs
    }
}

impl Default for QuoteTable {
    fn default() -> Self {
        Self::oanda()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Direct,
    Inverted,
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Direct => write!(f, "direct"),
            Orientation::Inverted => write!(f, "inverted"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedPair<'a> {
    pub requested: InstrumentPair,
    pub orientation: Orientation,
    pub series: Cow<'a, PriceSeries>,
}

pub fn resolve_pair<'a>(
    quotes: &QuoteTable,
    matrix: &'a PriceMatrix,
    base: Currency,
    quote: Currency,
) -> Result<ResolvedPair<'a>, StrengthError> {
    let requested = InstrumentPair::new(base, quote)?;
    let unavailable = || StrengthError::PairUnavailable {
        pair: requested.symbol(),
    };

    let orientation = quotes.orientation(base, quote).ok_or_else(unavailable)?;
    let series = match orientation {
        Orientation::Direct => Cow::Borrowed(matrix.get(&requested).ok_or_else(unavailable)?),
        Orientation::Inverted => Cow::Owned(
            matrix
                .get(&requested.inverse())
                .ok_or_else(unavailable)?
                .inverted(),
        ),
    };

    Ok(ResolvedPair {
        requested,
        orientation,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::currency::{CHF, DEFAULT_CURRENCIES, EUR, GBP, JPY, USD};
    use crate::domain::price_series::PriceBar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn matrix_with(pair: &str, closes: &[f64]) -> PriceMatrix {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::from_close(start + chrono::Duration::days(i as i64), c))
            .collect();
        let series = PriceSeries::new(InstrumentPair::parse(pair).unwrap(), bars).unwrap();
        PriceMatrix::align(vec![series])
    }

    #[test]
    fn oanda_table_covers_every_default_pairing_once() {
        let table = QuoteTable::oanda();
        assert_eq!(table.len(), 28);
        for a in DEFAULT_CURRENCIES {
            for b in DEFAULT_CURRENCIES {
                if a != b {
                    assert!(table.orientation(a, b).is_some(), "{a}/{b} unresolvable");
                }
            }
        }
        assert!(QuoteTable::new(table.pairs_within(&DEFAULT_CURRENCIES)).is_ok());
    }

    #[test]
    fn table_rejects_both_orientations() {
        let err = QuoteTable::from_symbols(&["EUR_USD", "USD_EUR"]).unwrap_err();
        assert!(matches!(err, StrengthError::ConflictingQuotes { pair } if pair == "USD_EUR"));
    }

    #[test]
    fn orientation_lookup() {
        let table = QuoteTable::from_symbols(&["EUR_USD"]).unwrap();
        assert_eq!(table.orientation(EUR, USD), Some(Orientation::Direct));
        assert_eq!(table.orientation(USD, EUR), Some(Orientation::Inverted));
        assert_eq!(table.orientation(EUR, GBP), None);
    }

    #[test]
    fn pairs_within_filters_by_currency_set() {
        let table = QuoteTable::oanda();
        let pairs = table.pairs_within(&[USD, EUR, JPY]);
        let symbols: Vec<_> = pairs.iter().map(|p| p.symbol()).collect();
        assert_eq!(symbols, vec!["EUR_JPY", "EUR_USD", "USD_JPY"]);
    }

    #[test]
    fn resolve_direct_borrows_series() {
        let matrix = matrix_with("EUR_USD", &[1.10, 1.20]);
        let table = QuoteTable::from_symbols(&["EUR_USD"]).unwrap();
        let resolved = resolve_pair(&table, &matrix, EUR, USD).unwrap();
        assert_eq!(resolved.orientation, Orientation::Direct);
        assert!(matches!(resolved.series, Cow::Borrowed(_)));
        assert_eq!(resolved.series.closes(), vec![1.10, 1.20]);
    }

    #[test]
    fn resolve_inverse_takes_reciprocal() {
        let matrix = matrix_with("EUR_USD", &[1.25, 2.0]);
        let table = QuoteTable::from_symbols(&["EUR_USD"]).unwrap();
        let resolved = resolve_pair(&table, &matrix, USD, EUR).unwrap();
        assert_eq!(resolved.orientation, Orientation::Inverted);
        assert_eq!(resolved.series.pair().symbol(), "USD_EUR");
        let closes = resolved.series.closes();
        assert_relative_eq!(closes[0], 0.8);
        assert_relative_eq!(closes[1], 0.5);
    }

    #[test]
    fn resolve_unquoted_pair_is_unavailable() {
        let matrix = matrix_with("EUR_USD", &[1.1]);
        let table = QuoteTable::from_symbols(&["EUR_USD"]).unwrap();
        let err = resolve_pair(&table, &matrix, EUR, CHF).unwrap_err();
        assert!(matches!(err, StrengthError::PairUnavailable { pair } if pair == "EUR_CHF"));
    }

    #[test]
    fn resolve_quoted_pair_without_data_is_unavailable() {
        let matrix = matrix_with("EUR_USD", &[1.1]);
        let table = QuoteTable::oanda();
        let err = resolve_pair(&table, &matrix, GBP, EUR).unwrap_err();
        assert!(matches!(err, StrengthError::PairUnavailable { pair } if pair == "GBP_EUR"));
    }

    #[test]
    fn resolve_same_currency_is_rejected() {
        let matrix = PriceMatrix::default();
        let err = resolve_pair(&QuoteTable::oanda(), &matrix, USD, USD).unwrap_err();
        assert!(matches!(err, StrengthError::SamePair { .. }));
    }
}
