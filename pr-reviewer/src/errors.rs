//! Crate-wide error hierarchy for pr-reviewer.
//!
//! Goals:
//! - Single root `Error` for all public functions.
//! - Host-aware mapping (401→Unauthorized, 429→RateLimited, 5xx→Server, etc.).
//! - No dynamic dispatch, ergonomic `?` via `From` impls.

use thiserror::Error;

/// Convenient alias for crate-wide results.
pub type ReviewResult<T> = Result<T, Error>;

/// Root error type for the pr-reviewer crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Pull-request host (GitHub) related failure.
    #[error(transparent)]
    Host(#[from] HostError),

    /// Unified diff parsing failure.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Configuration problems (missing env vars, bad repository slug, etc.).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Language-model service failure.
    #[error("llm error: {0}")]
    Llm(#[from] llm_service::error_handler::LlmError),
}

/// Detailed host-specific error used inside the git-host layer.
#[derive(Debug, Error)]
pub enum HostError {
    /// Unauthorized (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden (HTTP 403).
    #[error("forbidden")]
    Forbidden,

    /// Not found (HTTP 404).
    #[error("not found")]
    NotFound,

    /// Rate limited (HTTP 429).
    #[error("rate limited")]
    RateLimited { retry_after_secs: Option<u64> },

    /// Gateway/Server error (HTTP 5xx).
    #[error("server error: status {0}")]
    Server(u16),

    /// Other HTTP status (4xx/3xx) not covered above.
    #[error("http status error: {0}")]
    HttpStatus(u16),

    /// Timeout at transport level.
    #[error("timeout")]
    Timeout,

    /// Network/transport failure without status (DNS/connect/reset).
    #[error("network error: {0}")]
    Network(String),

    /// JSON deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Unexpected/invalid shape of a host response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Unified diff parser errors.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid hunk header: {0}")]
    InvalidHunkHeader(String),

    /// A chunk arrived without any parsed hunk header; position math would
    /// have to guess, so the chunk's whole batch is rejected.
    #[error("chunk has no hunk header")]
    MissingHunkContext,
}

/// Configuration and setup errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value in {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        reason: &'static str,
    },
}

// ===== Conversions for `?` ergonomics =====

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Host(HostError::from(e))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Host(HostError::Serde(e))
    }
}

impl From<reqwest::Error> for HostError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            return HostError::Timeout;
        }
        if let Some(status) = e.status() {
            let code = status.as_u16();
            return match code {
                401 => HostError::Unauthorized,
                403 => HostError::Forbidden,
                404 => HostError::NotFound,
                429 => HostError::RateLimited { retry_after_secs: None },
                500..=599 => HostError::Server(code),
                _ => HostError::HttpStatus(code),
            };
        }
        HostError::Network(e.to_string())
    }
}
