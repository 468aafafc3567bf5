// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbSnpError>;

#[derive(Error, Debug)]
pub enum DbSnpError {
    /// Caller error caught by local validation. No request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport failure, timeout, non-2xx status or an unreadable body.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// NCBI signalled throttling (HTTP 429 or an equivalent error body).
    #[error("Rate limited by NCBI: {0}")]
    RateLimited(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbSnpError {
    /// Stable machine-readable kind, used in tool error payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            DbSnpError::InvalidArgument(_) => "invalid_argument",
            DbSnpError::UpstreamUnavailable(_) => "upstream_unavailable",
            DbSnpError::RateLimited(_) => "rate_limited",
            DbSnpError::Config(_) => "config",
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, DbSnpError::RateLimited(_))
    }
}

impl From<reqwest::Error> for DbSnpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            DbSnpError::UpstreamUnavailable(format!("request timed out: {}", e))
        } else {
            DbSnpError::UpstreamUnavailable(e.to_string())
        }
    }
}
