//! Ollama service for local text generation.
//!
//! Minimal, non-streaming wrapper around:
//! - POST {endpoint}/api/generate
//!
//! System text, when provided, is passed through the request's `system`
//! field so prompts stay identical across providers.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::{LlmModelConfig, LlmProvider},
    error_handler::{ConfigError, LlmError, ProviderError, make_snippet},
};

/// Thin client for a local Ollama runtime.
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - [`ConfigError::UnsupportedProvider`] if `cfg.provider` is not Ollama
    /// - [`LlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, LlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(ConfigError::UnsupportedProvider(format!("{:?}", cfg.provider)).into());
        }

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(600));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;

        let url_generate = format!("{}/api/generate", cfg.endpoint.trim_end_matches('/'));

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            "OllamaService initialized"
        );

        Ok(Self { client, cfg, url_generate })
    }

    /// Performs a non-streaming generate request, returning plain text.
    ///
    /// # Errors
    /// - [`ProviderError::HttpStatus`] for non-2xx responses
    /// - [`LlmError::HttpTransport`] for client/network failures
    /// - [`ProviderError::Decode`] if the JSON cannot be parsed
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        let started = Instant::now();

        #[derive(Debug, Serialize)]
        struct Req<'a> {
            model: &'a str,
            prompt: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            system: Option<&'a str>,
            stream: bool,
        }
        #[derive(Debug, Deserialize)]
        struct Resp {
            response: String,
        }

        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            "POST {}", self.url_generate
        );

        let resp = self
            .client
            .post(&self.url_generate)
            .json(&Req {
                model: &self.cfg.model,
                prompt,
                system,
                stream: false,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_generate.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "Ollama generate returned non-success status"
            );
            return Err(ProviderError::HttpStatus { status, url, snippet }.into());
        }

        let body: Resp = resp
            .json()
            .await
            .map_err(|e| ProviderError::Decode(format!("serde error: {e}; expected `response`")))?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            "generate completed"
        );

        Ok(body.response)
    }
}
