use thiserror::Error;

/// Failure talking to a Polymarket API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("rate limited by {endpoint}")]
    RateLimited { endpoint: &'static str },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: &'static str, status: u16 },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid API base URL {0}")]
    InvalidBaseUrl(String),
}

/// Coarse error class used as a metrics label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    NotFound,
    RateLimited,
    Status,
    Transport,
    Decode,
    Config,
}

impl ApiErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::Status => "status",
            Self::Transport => "transport",
            Self::Decode => "decode",
            Self::Config => "config",
        }
    }
}

impl ApiError {
    pub fn kind(&self) -> ApiErrorKind {
        match self {
            Self::NotFound(_) => ApiErrorKind::NotFound,
            Self::RateLimited { .. } => ApiErrorKind::RateLimited,
            Self::Status { .. } => ApiErrorKind::Status,
            Self::Transport { .. } => ApiErrorKind::Transport,
            Self::Decode { .. } => ApiErrorKind::Decode,
            Self::InvalidBaseUrl(_) => ApiErrorKind::Config,
        }
    }

    /// Map a non-success HTTP status onto the taxonomy.
    pub fn from_status(endpoint: &'static str, status: u16, what: &str) -> Self {
        match status {
            404 => Self::NotFound(what.to_string()),
            429 => Self::RateLimited { endpoint },
            _ => Self::Status { endpoint, status },
        }
    }
}
