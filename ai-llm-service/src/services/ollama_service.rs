//! Ollama embeddings client.
//!
//! Only `POST {endpoint}/api/embeddings` is used; the review model itself is
//! reached through the OpenAI-compatible client.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
    },
};

/// Thin client for a local or remote Ollama daemon.
#[derive(Debug)]
pub struct OllamaService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_embeddings: String,
}

impl OllamaService {
    /// Creates a new [`OllamaService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not Ollama
    /// - `InvalidEndpoint` if `cfg.endpoint` has no http(s) scheme
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Ollama {
            return Err(err(ProviderErrorKind::InvalidProvider));
        }

        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(err(ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone())));
        }

        let mut builder = reqwest::Client::builder().gzip(true).brotli(true);
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let url_embeddings = format!("{}/api/embeddings", endpoint.trim_end_matches('/'));

        Ok(Self {
            client,
            cfg,
            url_embeddings,
        })
    }

    /// Retrieves one embedding vector for `input`.
    ///
    /// Body is `{ "model", "prompt" }`; the response carries `{ "embedding": [...] }`.
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let started = Instant::now();
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            prompt: input,
        };

        debug!(model = %self.cfg.model, input_len = input.len(), "POST {}", self.url_embeddings);

        let resp = self
            .client
            .post(&self.url_embeddings)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);
            error!(
                %status,
                url = %self.url_embeddings,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "Ollama /api/embeddings returned non-success status"
            );
            return Err(err(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url: self.url_embeddings.clone(),
                snippet,
            })));
        }

        let out: EmbeddingsResponse = resp.json().await.map_err(|e| {
            err(ProviderErrorKind::Decode(format!(
                "serde error: {e}; expected `{{ embedding: number[] }}`"
            )))
        })?;

        if out.embedding.is_empty() {
            return Err(err(ProviderErrorKind::Decode(
                "empty `embedding` in response".into(),
            )));
        }

        debug!(
            dim = out.embedding.len(),
            latency_ms = started.elapsed().as_millis(),
            "ollama embeddings completed"
        );

        Ok(out.embedding)
    }
}

fn err(kind: ProviderErrorKind) -> AiLlmError {
    ProviderError::new(Provider::Ollama, kind).into()
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: "all-minilm".into(),
            endpoint: endpoint.into(),
            api_key: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: None,
        }
    }

    #[tokio::test]
    async fn posts_model_and_prompt() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/api/embeddings")
            .match_body(Matcher::Json(json!({"model": "all-minilm", "prompt": "let x = 1;"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"embedding":[0.1,0.2,0.3]}"#)
            .create_async()
            .await;

        let svc = OllamaService::new(cfg(&server.url())).unwrap();
        let v = svc.embeddings("let x = 1;").await.unwrap();
        assert_eq!(v.len(), 3);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn empty_embedding_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let svc = OllamaService::new(cfg(&server.url())).unwrap();
        assert!(svc.embeddings("x").await.is_err());
    }

    #[tokio::test]
    async fn server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/api/embeddings")
            .with_status(500)
            .with_body("model not found")
            .create_async()
            .await;

        let svc = OllamaService::new(cfg(&server.url())).unwrap();
        let e = svc.embeddings("x").await.unwrap_err();
        assert!(e.to_string().contains("500"));
    }

    #[test]
    fn rejects_openai_config() {
        let mut c = cfg("http://localhost:11434");
        c.provider = LlmProvider::OpenAI;
        assert!(OllamaService::new(c).is_err());
    }
}
