//! Unified error handling for `llm-service`.
//!
//! One top-level error type [`LlmError`] for the whole crate, with
//! domain-specific sub-enums ([`ConfigError`], [`ProviderError`]). Small
//! helpers for reading environment variables return the unified
//! [`Result<T>`] alias so callers can use `?` everywhere.

use reqwest::StatusCode;
use thiserror::Error;

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Top-level error for the `llm-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LlmError {
    /// Configuration/validation errors (startup time).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Provider-side failures (bad status, undecodable payload, empty reply).
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Underlying HTTP transport error.
    #[error("llm transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),
}

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (limits, timeouts).
    #[error("invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// Unsupported provider in `LLM_KIND`.
    #[error("unsupported llm provider: {0}")]
    UnsupportedProvider(String),

    /// Value had the wrong format (e.g. endpoint without a scheme).
    #[error("invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },
}

/// Provider-side failures observed while talking to an inference backend.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-2xx HTTP status from the provider.
    #[error("llm http status {status} from {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("llm response decode failed: {0}")]
    Decode(String),

    /// Provider returned a well-formed but empty completion.
    #[error("llm returned no completion choices")]
    EmptyCompletion,
}

/// Reads a required environment variable, rejecting empty values.
pub fn must_env(var: &'static str) -> Result<String> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(var).into()),
    }
}

/// Reads an optional `u32` environment variable.
pub fn env_opt_u32(var: &'static str) -> Result<Option<u32>> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => v
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber { var, reason: "expected u32" }.into()),
        _ => Ok(None),
    }
}

/// Trims an error body down to a log-friendly snippet.
pub fn make_snippet(body: &str) -> String {
    const MAX: usize = 240;
    let s = body.trim();
    if s.chars().count() <= MAX {
        return s.to_string();
    }
    s.chars().take(MAX).collect::<String>() + "…"
}
