//! Thin LLM client layer shared by the review pipeline.
//!
//! - Enum dispatch over concrete provider services (no `async-trait`, no
//!   `Box<dyn …>`); plain `async fn` everywhere.
//! - Construct once from env (`LlmService::from_env`) and pass by reference.
//! - Unified error type in [`error_handler`].

pub mod config;
pub mod error_handler;
pub mod services;

use config::{LlmModelConfig, LlmProvider, config_from_env};
use error_handler::LlmError;
use services::{ollama_service::OllamaService, open_ai_service::OpenAiService};

/// Concrete LLM client (enum-dispatch over providers).
#[derive(Debug)]
pub enum LlmService {
    OpenAi(OpenAiService),
    Ollama(OllamaService),
}

impl LlmService {
    /// Constructs a concrete service from a full model config.
    pub fn from_config(cfg: LlmModelConfig) -> Result<Self, LlmError> {
        Ok(match cfg.provider {
            LlmProvider::OpenAi => Self::OpenAi(OpenAiService::new(cfg)?),
            LlmProvider::Ollama => Self::Ollama(OllamaService::new(cfg)?),
        })
    }

    /// Constructs the service selected by `LLM_KIND` and its provider vars.
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_config(config_from_env()?)
    }

    /// Single non-streaming completion: optional system text plus a prompt.
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, LlmError> {
        match self {
            Self::OpenAi(s) => s.generate(prompt, system).await,
            Self::Ollama(s) => s.generate(prompt, system).await,
        }
    }
}
