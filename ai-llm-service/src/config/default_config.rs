//! Default model configs loaded from environment variables.
//!
//! Two roles are supported:
//!
//! - **Chat**      → the review model (OpenAI-compatible chat completion, Groq by default)
//! - **Embedding** → the text embedding model (Ollama `all-minilm` by default, 384 dims)
//!
//! # Environment variables
//!
//! Chat:
//! - `GROQ_API_KEY`  = bearer key (mandatory)
//! - `LLM_ENDPOINT`  = base URL (default `https://api.groq.com/openai`)
//! - `LLM_MODEL`     = model id (default `llama-3.3-70b-versatile`)
//! - `LLM_TIMEOUT_SECS` = optional request timeout (unset: none)
//!
//! Embedding:
//! - `EMBEDDING_PROVIDER` = `ollama` (default) or `openai`
//! - `EMBEDDING_URL`      = base URL (default `http://localhost:11434`)
//! - `EMBEDDING_MODEL`    = model id (default `all-minilm`)
//! - `EMBEDDING_API_KEY`  = bearer key, only for `openai`

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, ConfigError, env_opt_u32, env_or, must_env, opt_env, validate_http_endpoint,
    },
};

/// Fixed sampling temperature for reviews.
pub const REVIEW_TEMPERATURE: f32 = 0.1;

/// Fixed output-token ceiling for reviews.
pub const REVIEW_MAX_TOKENS: u32 = 2000;

pub const DEFAULT_CHAT_ENDPOINT: &str = "https://api.groq.com/openai";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_EMBEDDING_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";

/// Constructs the chat (review) profile.
///
/// # Errors
/// - [`ConfigError::MissingVar`] if `GROQ_API_KEY` is unset
/// - [`ConfigError::InvalidFormat`] if `LLM_ENDPOINT` has no http(s) scheme
pub fn config_chat_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let api_key = must_env("GROQ_API_KEY")?;
    let endpoint = env_or("LLM_ENDPOINT", DEFAULT_CHAT_ENDPOINT);
    validate_http_endpoint("LLM_ENDPOINT", &endpoint)?;
    let model = env_or("LLM_MODEL", DEFAULT_CHAT_MODEL);
    let timeout_secs = env_opt_u32("LLM_TIMEOUT_SECS")?.map(u64::from);

    Ok(LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens: Some(REVIEW_MAX_TOKENS),
        temperature: Some(REVIEW_TEMPERATURE),
        top_p: None,
        timeout_secs,
    })
}

/// Constructs the embedding profile.
///
/// # Errors
/// - [`ConfigError::UnsupportedProvider`] for an unknown `EMBEDDING_PROVIDER`
/// - [`ConfigError::InvalidFormat`] if `EMBEDDING_URL` has no http(s) scheme
pub fn config_embedding_from_env() -> Result<LlmModelConfig, AiLlmError> {
    let provider = match opt_env("EMBEDDING_PROVIDER") {
        Some(name) => LlmProvider::parse(&name).ok_or(ConfigError::UnsupportedProvider(name))?,
        None => LlmProvider::Ollama,
    };
    let endpoint = env_or("EMBEDDING_URL", DEFAULT_EMBEDDING_ENDPOINT);
    validate_http_endpoint("EMBEDDING_URL", &endpoint)?;
    let model = env_or("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL);

    Ok(LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key: opt_env("EMBEDDING_API_KEY"),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: None,
    })
}
