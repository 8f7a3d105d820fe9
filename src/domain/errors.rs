use thiserror::Error;

/// Every way a single tickerbar invocation can fail.
///
/// None of these are retried: the status bar re-invokes on its own schedule.
#[derive(Debug, Error)]
pub enum TickerError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("credential error: {reason}")]
    Credential { reason: String },

    #[error("network error for {symbol}: {reason}")]
    Network { symbol: String, reason: String },

    #[error("unexpected response shape for {symbol}: {reason}")]
    DataShape { symbol: String, reason: String },

    #[error("reference value for {symbol} is zero, cannot compute percent change")]
    DivisionGuard { symbol: String },
}

impl TickerError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn credential(reason: impl Into<String>) -> Self {
        Self::Credential {
            reason: reason.into(),
        }
    }

    pub fn network(symbol: &str, reason: impl Into<String>) -> Self {
        Self::Network {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    pub fn data_shape(symbol: &str, reason: impl Into<String>) -> Self {
        Self::DataShape {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit code reported to the status-bar host.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration { .. } => 2,
            Self::Credential { .. } => 3,
            Self::Network { .. } => 4,
            Self::DataShape { .. } => 5,
            Self::DivisionGuard { .. } => 6,
        }
    }
}

pub type Result<T, E = TickerError> = std::result::Result<T, E>;
