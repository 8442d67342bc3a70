//! Domain error taxonomy for the strength meter.
//!
//! Market-data failures (`PairUnavailable`, `InvalidSeries`, `InsufficientData`)
//! are recovered locally by the engine; the rest are configuration or I/O
//! problems surfaced to the caller.

/// Top-level error type for fxstrength.
#[derive(Debug, thiserror::Error)]
pub enum StrengthError {
    #[error("pair {pair} unavailable: no direct or inverse quote")]
    PairUnavailable { pair: String },

    #[error("invalid price series for {symbol}: {reason}")]
    InvalidSeries { symbol: String, reason: String },

    #[error("insufficient data for {currency}: {reason}")]
    InsufficientData { currency: String, reason: String },

    #[error("invalid currency code {value:?} (expected three ASCII letters)")]
    InvalidCurrency { value: String },

    #[error("pair must use two distinct currencies, got {currency}/{currency}")]
    SamePair { currency: String },

    #[error("both {pair} and its inverse are listed as quoted pairs")]
    ConflictingQuotes { pair: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data source error: {reason}")]
    Data { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StrengthError {
    /// True for failures that only reduce the opponent count of a currency.
    pub fn is_market_data(&self) -> bool {
        matches!(
            self,
            StrengthError::PairUnavailable { .. }
                | StrengthError::InvalidSeries { .. }
                | StrengthError::InsufficientData { .. }
        )
    }

    /// Process exit status: 1 I/O, 2 configuration, 3 data source, 5 market data.
    pub fn exit_code(&self) -> u8 {
        match self {
            StrengthError::Io(_) => 1,
            StrengthError::ConfigParse { .. }
            | StrengthError::ConfigMissing { .. }
            | StrengthError::ConfigInvalid { .. }
            | StrengthError::InvalidCurrency { .. }
            | StrengthError::SamePair { .. }
            | StrengthError::ConflictingQuotes { .. } => 2,
            StrengthError::Data { .. } => 3,
            StrengthError::PairUnavailable { .. }
            | StrengthError::InvalidSeries { .. }
            | StrengthError::InsufficientData { .. } => 5,
        }
    }
}

impl From<&StrengthError> for std::process::ExitCode {
    fn from(err: &StrengthError) -> Self {
        std::process::ExitCode::from(err.exit_code())
    }
}
