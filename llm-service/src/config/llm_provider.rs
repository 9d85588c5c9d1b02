/// Backend used for large language model inference.
///
/// Distinguishes between the OpenAI chat API and a local Ollama runtime.
/// Adding more providers later (Anthropic, Mistral API, …) means extending
/// this enum and the matching service in `services/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// OpenAI chat-completions API.
    OpenAi,
    /// Local Ollama runtime.
    Ollama,
}
