//! Shared LLM access: one chat profile (review model) and one embedding profile.
//!
//! Clients are built once at startup and reused for every request.

use tracing::info;

use crate::{
    config::{
        default_config::{config_chat_from_env, config_embedding_from_env},
        llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
};

/// Embedding backend selected by the embedding profile.
#[derive(Debug)]
enum EmbeddingClient {
    Ollama(OllamaService),
    OpenAI(OpenAiService),
}

/// Chat and embedding clients behind their profiles.
#[derive(Debug)]
pub struct LlmServiceProfiles {
    chat_cfg: LlmModelConfig,
    embedding_cfg: LlmModelConfig,
    chat: OpenAiService,
    embedding: EmbeddingClient,
}

impl LlmServiceProfiles {
    /// Builds both clients from explicit configs.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if either client rejects its config.
    pub fn new(chat: LlmModelConfig, embedding: LlmModelConfig) -> Result<Self, AiLlmError> {
        let chat_client = OpenAiService::new(chat.clone())?;
        let embedding_client = match embedding.provider {
            LlmProvider::Ollama => EmbeddingClient::Ollama(OllamaService::new(embedding.clone())?),
            LlmProvider::OpenAI => EmbeddingClient::OpenAI(OpenAiService::new(embedding.clone())?),
        };

        info!(
            chat_model = %chat.model,
            embedding_provider = %embedding.provider,
            embedding_model = %embedding.model,
            "LLM profiles ready"
        );

        Ok(Self {
            chat_cfg: chat,
            embedding_cfg: embedding,
            chat: chat_client,
            embedding: embedding_client,
        })
    }

    /// Builds both profiles from environment variables.
    pub fn from_env() -> Result<Self, AiLlmError> {
        Self::new(config_chat_from_env()?, config_embedding_from_env()?)
    }

    /// Runs one chat completion on the review model.
    pub async fn chat(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        self.chat.generate(prompt, system).await
    }

    /// Embeds `input` with the embedding profile.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match &self.embedding {
            EmbeddingClient::Ollama(cli) => cli.embeddings(input).await,
            EmbeddingClient::OpenAI(cli) => cli.embeddings(input).await,
        }
    }

    /// Returns the `(chat, embedding)` configs.
    pub fn profiles(&self) -> (&LlmModelConfig, &LlmModelConfig) {
        (&self.chat_cfg, &self.embedding_cfg)
    }
}
