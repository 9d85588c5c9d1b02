use crate::config::llm_provider::LlmProvider;

/// Configuration for an LLM model invocation.
///
/// Carries both general and provider-specific parameters; extend as needed
/// when new backends or sampling knobs are supported.
#[derive(Debug, Clone)]
pub struct LlmModelConfig {
    /// The LLM provider/backend (OpenAI or Ollama).
    pub provider: LlmProvider,

    /// Model identifier string (e.g. `"gpt-4o-mini"`, `"qwen3:14b"`).
    pub model: String,

    /// Inference endpoint (remote API URL or local server).
    pub endpoint: String,

    /// Optional API key for providers that require authentication.
    pub api_key: Option<String>,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature (0.0 = deterministic).
    pub temperature: Option<f32>,

    /// Optional request timeout in seconds.
    pub timeout_secs: Option<u64>,
}
