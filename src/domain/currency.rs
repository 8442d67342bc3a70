//! Currency codes and ordered instrument pairs.

use crate::domain::error::StrengthError;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A three-letter ISO-style currency code, stored upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Currency([u8; 3]);

pub const USD: Currency = Currency(*b"USD");
pub const EUR: Currency = Currency(*b"EUR");
pub const GBP: Currency = Currency(*b"GBP");
pub const JPY: Currency = Currency(*b"JPY");
pub const AUD: Currency = Currency(*b"AUD");
pub const CAD: Currency = Currency(*b"CAD");
pub const NZD: Currency = Currency(*b"NZD");
pub const CHF: Currency = Currency(*b"CHF");

/// Default configured set, in display order.
pub const DEFAULT_CURRENCIES: [Currency; 8] = [USD, EUR, GBP, JPY, AUD, CAD, NZD, CHF];

impl Currency {
    pub fn parse(input: &str) -> Result<Self, StrengthError> {
        let trimmed = input.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(StrengthError::InvalidCurrency {
                value: input.to_string(),
            });
        }
        Ok(Currency([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
            bytes[2].to_ascii_uppercase(),
        ]))
    }

    pub fn as_str(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }
}

impl FromStr for Currency {
    type Err = StrengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::parse(s)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma-separated currency list, rejecting empty tokens and duplicates.
pub fn parse_currencies(input: &str) -> Result<Vec<Currency>, StrengthError> {
    let mut currencies = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        if token.trim().is_empty() {
            return Err(StrengthError::InvalidCurrency {
                value: String::new(),
            });
        }
        let currency = Currency::parse(token)?;
        if !seen.insert(currency) {
            return Err(StrengthError::ConfigInvalid {
                section: "meter".into(),
                key: "currencies".into(),
                reason: format!("duplicate currency {currency}"),
            });
        }
        currencies.push(currency);
    }

    Ok(currencies)
}

/// An ordered (base, quote) pair; its price is units of quote per one base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrumentPair {
    pub base: Currency,
    pub quote: Currency,
}

impl InstrumentPair {
    pub fn new(base: Currency, quote: Currency) -> Result<Self, StrengthError> {
        if base == quote {
            return Err(StrengthError::SamePair {
                currency: base.to_string(),
            });
        }
        Ok(Self { base, quote })
    }

    /// Accepts `EUR_USD`, `EUR/USD` and `EURUSD`.
    pub fn parse(input: &str) -> Result<Self, StrengthError> {
        let trimmed = input.trim();
        let (base, quote) = if let Some((b, q)) = trimmed.split_once(['_', '/']) {
            (b, q)
        } else if trimmed.len() == 6 && trimmed.is_ascii() {
            trimmed.split_at(3)
        } else {
            return Err(StrengthError::InvalidCurrency {
                value: input.to_string(),
            });
        };
        Self::new(Currency::parse(base)?, Currency::parse(quote)?)
    }

    pub fn symbol(&self) -> String {
        format!("{}_{}", self.base, self.quote)
    }

    pub fn inverse(&self) -> Self {
        Self {
            base: self.quote,
            quote: self.base,
        }
    }

    pub fn involves(&self, currency: Currency) -> bool {
        self.base == currency || self.quote == currency
    }
}

impl FromStr for InstrumentPair {
    type Err = StrengthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstrumentPair::parse(s)
    }
}

impl fmt::Display for InstrumentPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.base, self.quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalises_case() {
        assert_eq!(Currency::parse("usd").unwrap(), USD);
        assert_eq!(Currency::parse(" Eur ").unwrap(), EUR);
        assert_eq!(USD.as_str(), "USD");
    }

    #[test]
    fn parse_rejects_bad_codes() {
        assert!(Currency::parse("US").is_err());
        assert!(Currency::parse("USDX").is_err());
        assert!(Currency::parse("U5D").is_err());
        assert!(Currency::parse("").is_err());
    }

    #[test]
    fn parse_currencies_keeps_order() {
        let list = parse_currencies("usd, EUR,gbp").unwrap();
        assert_eq!(list, vec![USD, EUR, GBP]);
    }

    #[test]
    fn parse_currencies_rejects_duplicates_and_empty_tokens() {
        assert!(matches!(
            parse_currencies("USD,EUR,usd"),
            Err(StrengthError::ConfigInvalid { .. })
        ));
        assert!(matches!(
            parse_currencies("USD,,EUR"),
            Err(StrengthError::InvalidCurrency { .. })
        ));
    }

    #[test]
    fn pair_parse_formats() {
        let expected = InstrumentPair::new(EUR, USD).unwrap();
        assert_eq!(InstrumentPair::parse("EUR_USD").unwrap(), expected);
        assert_eq!(InstrumentPair::parse("eur/usd").unwrap(), expected);
        assert_eq!(InstrumentPair::parse("EURUSD").unwrap(), expected);
        assert!(InstrumentPair::parse("EURUS").is_err());
    }

    #[test]
    fn pair_requires_distinct_currencies() {
        assert!(matches!(
            InstrumentPair::new(USD, USD),
            Err(StrengthError::SamePair { .. })
        ));
    }

    #[test]
    fn pair_symbol_and_inverse() {
        let pair = InstrumentPair::new(GBP, JPY).unwrap();
        assert_eq!(pair.symbol(), "GBP_JPY");
        assert_eq!(pair.to_string(), "GBP_JPY");
        assert_eq!(pair.inverse().symbol(), "JPY_GBP");
        assert_eq!(pair.inverse().inverse(), pair);
        assert!(pair.involves(JPY));
        assert!(!pair.involves(USD));
    }
}
