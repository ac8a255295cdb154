use crate::config::llm_provider::LlmProvider;

/// Configuration for one model invocation profile.
///
/// - `provider`: which backend serves the model.
/// - `model`: model identifier (e.g. `"llama-3.3-70b-versatile"`, `"all-minilm"`).
/// - `endpoint`: base URL; service clients append their own paths.
/// - `api_key`: bearer key for providers that need one.
/// - `max_tokens`: output-token ceiling (chat only).
/// - `temperature` / `top_p`: sampling knobs (chat only).
/// - `timeout_secs`: request timeout; `None` means no client-side timeout.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}
