/// Domain-specific error types for the pricing core.
/// Request and market-data failures abort a pricing cycle.
/// Failures inside one model are reported against that model only.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("market data error: {0}")]
    DataFetch(String),

    #[error("insufficient price history: {len} observation(s), need at least 2")]
    InsufficientHistory { len: usize },

    #[error("domain error: {0}")]
    Domain(String),

    #[error("invalid option type: {0} (expected 'call' or 'put')")]
    InvalidOptionType(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("model computation error: {0}")]
    Model(String),
}

impl EngineError {
    /// Stable snake_case tag for structured error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DataFetch(_) => "data_fetch",
            Self::InsufficientHistory { .. } => "insufficient_history",
            Self::Domain(_) => "domain",
            Self::InvalidOptionType(_) => "invalid_option_type",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Config(_) => "config",
            Self::Parse(_) => "parse",
            Self::Model(_) => "model",
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Parse(e.to_string())
    }
}

impl From<std::io::Error> for EngineError {
    fn from(e: std::io::Error) -> Self {
        EngineError::DataFetch(e.to_string())
    }
}

impl From<chrono::ParseError> for EngineError {
    fn from(e: chrono::ParseError) -> Self {
        EngineError::InvalidRequest(format!("date: {e}"))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
