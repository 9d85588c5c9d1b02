//! Default LLM configs loaded strictly from environment variables.
//!
//! Convenience constructors for [`LlmModelConfig`], grouped by provider.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`       = provider kind (`openai` or `ollama`, default `openai`)
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY` = API key (mandatory)
//! - `OPENAI_MODEL`   = model name (mandatory)
//! - `OPENAI_URL`     = endpoint base (default `https://api.openai.com`)
//!
//! Ollama-specific:
//! - `OLLAMA_URL`   = endpoint (default `http://127.0.0.1:11434`)
//! - `OLLAMA_MODEL` = model name (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ConfigError, Result, env_opt_u32, must_env},
};

/// Resolves the provider kind from `LLM_KIND`.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for unknown values.
pub fn provider_from_env() -> Result<LlmProvider> {
    let kind = std::env::var("LLM_KIND").unwrap_or_else(|_| "openai".into());
    match kind.trim().to_ascii_lowercase().as_str() {
        "openai" | "chatgpt" => Ok(LlmProvider::OpenAi),
        "ollama" => Ok(LlmProvider::Ollama),
        other => Err(ConfigError::UnsupportedProvider(other.to_string()).into()),
    }
}

/// Constructs a config for the configured provider (`LLM_KIND`).
pub fn config_from_env() -> Result<LlmModelConfig> {
    match provider_from_env()? {
        LlmProvider::OpenAi => config_openai(),
        LlmProvider::Ollama => config_ollama(),
    }
}

/// Constructs an **OpenAI** chat config.
///
/// # Env
/// - `OPENAI_API_KEY` (required)
/// - `OPENAI_MODEL` (required)
/// - `OPENAI_URL` (optional)
/// - `LLM_MAX_TOKENS` (optional)
///
/// # Defaults
/// - `temperature = Some(0.2)`
/// - `timeout_secs = Some(120)`
pub fn config_openai() -> Result<LlmModelConfig> {
    let api_key = must_env("OPENAI_API_KEY")?;
    let model = must_env("OPENAI_MODEL")?;
    let endpoint =
        std::env::var("OPENAI_URL").unwrap_or_else(|_| "https://api.openai.com".to_string());
    if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
        return Err(ConfigError::InvalidFormat {
            var: "OPENAI_URL",
            reason: "must start with http:// or https://",
        }
        .into());
    }
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAi,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens,
        temperature: Some(0.2),
        timeout_secs: Some(120),
    })
}

/// Constructs an **Ollama** generate config.
///
/// # Env
/// - `OLLAMA_MODEL` (required)
/// - `OLLAMA_URL` (optional)
/// - `LLM_MAX_TOKENS` (optional)
///
/// # Defaults
/// - `temperature = Some(0.2)`
/// - `timeout_secs = Some(600)` (local models can be slow to load)
pub fn config_ollama() -> Result<LlmModelConfig> {
    let endpoint =
        std::env::var("OLLAMA_URL").unwrap_or_else(|_| "http://127.0.0.1:11434".to_string());
    let model = must_env("OLLAMA_MODEL")?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        api_key: None,
        max_tokens,
        temperature: Some(0.2),
        timeout_secs: Some(600),
    })
}
