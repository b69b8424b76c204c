use common::error::ApiError;
use common::market_url::MarketUrlError;
use thiserror::Error;

/// Request-level failure taxonomy. Per-wallet upstream problems never surface here.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid market data: {0}")]
    InvalidMarketData(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("upstream rate limit hit ({0}); retry later")]
    RateLimited(String),

    #[error("upstream error: {0}")]
    Upstream(String),

    #[error("analysis timed out after {0}s")]
    Timeout(u64),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidMarketData(_) => "invalid_market_data",
            Self::NotFound(_) => "not_found",
            Self::RateLimited(_) => "rate_limited",
            Self::Upstream(_) => "upstream",
            Self::Timeout(_) => "timeout",
        }
    }
}

impl From<ApiError> for AnalysisError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::NotFound(what) => Self::NotFound(what),
            ApiError::RateLimited { endpoint } => Self::RateLimited(endpoint.to_string()),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl From<MarketUrlError> for AnalysisError {
    fn from(e: MarketUrlError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}
