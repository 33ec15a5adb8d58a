//! Domain error types.

/// Top-level error type for setupscan.
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
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

    #[error("connection failure: {reason}")]
    Connection { reason: String },

    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    #[error("unknown symbol: {symbol}")]
    UnknownSymbol { symbol: String },

    #[error("invalid selection: {reason}")]
    InvalidSelection { reason: String },

    #[error("scanner cannot {action} while {state}")]
    InvalidState { action: String, state: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScannerError> for std::process::ExitCode {
    fn from(err: &ScannerError) -> Self {
        let code: u8 = match err {
            ScannerError::Io(_) => 1,
            ScannerError::ConfigParse { .. }
            | ScannerError::ConfigMissing { .. }
            | ScannerError::ConfigInvalid { .. } => 2,
            ScannerError::Connection { .. }
            | ScannerError::DataUnavailable { .. }
            | ScannerError::UnknownSymbol { .. } => 3,
            ScannerError::InvalidSelection { .. } | ScannerError::InvalidState { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

/// Why a symbol produced no opportunity in a cycle.
///
/// Never fatal: the symbol is simply absent from that cycle's result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientBars { bars: usize, minimum: usize },

    #[error("{0} undefined")]
    ComputeUndefined(String),

    #[error("unknown symbol")]
    UnknownSymbol,

    #[error("neutral bias")]
    NeutralBias,
}

impl From<ScannerError> for SkipReason {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::UnknownSymbol { .. } => SkipReason::UnknownSymbol,
            ScannerError::DataUnavailable { reason, .. } => SkipReason::DataUnavailable(reason),
            other => SkipReason::DataUnavailable(other.to_string()),
        }
    }
}
