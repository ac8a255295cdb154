//! Client for OpenAI-compatible REST APIs (Groq, OpenAI, local gateways).
//!
//! Endpoints are derived from `LlmModelConfig::endpoint`:
//! - POST {endpoint}/v1/chat/completions  (non-streaming)
//! - POST {endpoint}/v1/embeddings
//!
//! Groq exposes the same surface under `https://api.groq.com/openai`, so the
//! review model is reached through this client as well.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, error, info};

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        AiLlmError, HttpError, Provider, ProviderError, ProviderErrorKind, make_snippet,
    },
};

/// Thin client for an OpenAI-compatible API.
///
/// Keeps a preconfigured `reqwest::Client` with the bearer header installed.
#[derive(Debug)]
pub struct OpenAiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_chat: String,
    url_embeddings: String,
}

impl OpenAiService {
    /// Creates a new [`OpenAiService`] from the given config.
    ///
    /// # Errors
    /// - `InvalidProvider` if `cfg.provider` is not OpenAI
    /// - `MissingApiKey` if `cfg.api_key` is `None`
    /// - `InvalidEndpoint` if `cfg.endpoint` has no http(s) scheme
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::OpenAI {
            return Err(err(ProviderErrorKind::InvalidProvider));
        }
        if cfg.model.trim().is_empty() {
            return Err(crate::error_handler::ConfigError::EmptyModel.into());
        }

        let api_key = cfg
            .api_key
            .clone()
            .ok_or_else(|| err(ProviderErrorKind::MissingApiKey))?;

        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(err(ProviderErrorKind::InvalidEndpoint(cfg.endpoint.clone())));
        }

        let mut headers = header::HeaderMap::new();
        let bearer = header::HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| err(ProviderErrorKind::Decode(format!("invalid API key header: {e}"))))?;
        headers.insert(header::AUTHORIZATION, bearer);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // No timeout unless one is configured: a slow model stalls the caller.
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = cfg.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        let base = endpoint.trim_end_matches('/');
        let url_chat = format!("{base}/v1/chat/completions");
        let url_embeddings = format!("{base}/v1/embeddings");

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = ?cfg.timeout_secs,
            "OpenAiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
            url_embeddings,
        })
    }

    /// Performs one non-streaming chat completion.
    ///
    /// Messages are an optional system message followed by the user `prompt`.
    /// `temperature`, `top_p` and `max_tokens` come from the config.
    ///
    /// # Errors
    /// - `HttpStatus` for non-2xx responses
    /// - `Decode` if the JSON cannot be parsed
    /// - `EmptyChoices` if no choice carries content
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = ChatCompletionRequest::from_cfg(&self.cfg, prompt, system);

        debug!(
            model = %self.cfg.model,
            prompt_len = prompt.len(),
            has_system = system.is_some(),
            "POST {}", self.url_chat
        );

        let out: ChatCompletionResponse = self
            .post_json(&self.url_chat, &body, "choices[0].message.content", started)
            .await?;

        let content = out
            .choices
            .into_iter()
            .find_map(|c| c.message.content)
            .ok_or_else(|| err(ProviderErrorKind::EmptyChoices))?;

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            response_len = content.len(),
            "chat completion completed"
        );

        Ok(content)
    }

    /// Retrieves a single embeddings vector.
    ///
    /// # Errors
    /// - `HttpStatus` for non-2xx responses
    /// - `Decode` if the JSON cannot be parsed or `data` is empty
    pub async fn embeddings(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        let started = Instant::now();
        let body = EmbeddingsRequest {
            model: &self.cfg.model,
            input,
        };

        debug!(
            model = %self.cfg.model,
            input_len = input.len(),
            "POST {}", self.url_embeddings
        );

        let out: EmbeddingsResponse = self
            .post_json(&self.url_embeddings, &body, "data[0].embedding", started)
            .await?;

        let first = out.data.into_iter().next().ok_or_else(|| {
            err(ProviderErrorKind::Decode(
                "empty `data` in embeddings response".into(),
            ))
        })?;

        debug!(
            model = %self.cfg.model,
            dim = first.embedding.len(),
            latency_ms = started.elapsed().as_millis(),
            "embeddings completed"
        );

        Ok(first.embedding)
    }

    async fn post_json<B, T>(
        &self,
        url: &str,
        body: &B,
        expected: &'static str,
        started: Instant,
    ) -> Result<T, AiLlmError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let resp = self.client.post(url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "OpenAI-compatible endpoint returned non-success status"
            );

            return Err(err(ProviderErrorKind::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet,
            })));
        }

        resp.json::<T>().await.map_err(|e| {
            error!(
                error = %e,
                %url,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "failed to decode response"
            );
            err(ProviderErrorKind::Decode(format!(
                "serde error: {e}; expected `{expected}`"
            )))
        })
    }
}

fn err(kind: ProviderErrorKind) -> AiLlmError {
    ProviderError::new(Provider::OpenAI, kind).into()
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    fn from_cfg(cfg: &'a LlmModelConfig, prompt: &'a str, system: Option<&'a str>) -> Self {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system {
            messages.push(ChatMessage {
                role: "system",
                content: sys,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        Self {
            model: &cfg.model,
            messages,
            temperature: cfg.temperature,
            top_p: cfg.top_p,
            max_tokens: cfg.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageOut,
}

#[derive(Debug, Deserialize)]
struct ChatMessageOut {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn cfg(endpoint: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::OpenAI,
            model: "llama-3.3-70b-versatile".into(),
            endpoint: endpoint.into(),
            api_key: Some("gsk_test".into()),
            max_tokens: Some(2000),
            temperature: Some(0.1),
            top_p: None,
            timeout_secs: None,
        }
    }

    #[test]
    fn rejects_missing_key_and_wrong_provider() {
        let mut c = cfg("https://api.groq.com/openai");
        c.api_key = None;
        assert!(OpenAiService::new(c).is_err());

        let mut c = cfg("https://api.groq.com/openai");
        c.provider = LlmProvider::Ollama;
        assert!(OpenAiService::new(c).is_err());

        assert!(OpenAiService::new(cfg("api.groq.com")).is_err());
    }

    #[tokio::test]
    async fn generate_sends_system_and_user_messages() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer gsk_test")
            .match_body(Matcher::PartialJson(json!({
                "model": "llama-3.3-70b-versatile",
                "max_tokens": 2000,
                "messages": [
                    {"role": "system", "content": "be strict"},
                    {"role": "user", "content": "review this"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"{\"severity\":\"low\"}"}}]}"#)
            .create_async()
            .await;

        let svc = OpenAiService::new(cfg(&server.url())).unwrap();
        let out = svc.generate("review this", Some("be strict")).await.unwrap();
        assert_eq!(out, r#"{"severity":"low"}"#);
        m.assert_async().await;
    }

    #[tokio::test]
    async fn generate_maps_http_status() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let svc = OpenAiService::new(cfg(&server.url())).unwrap();
        let e = svc.generate("x", None).await.unwrap_err();
        match e {
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::HttpStatus(h),
                ..
            }) => {
                assert_eq!(h.status.as_u16(), 429);
                assert_eq!(h.snippet, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn generate_without_choices_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let svc = OpenAiService::new(cfg(&server.url())).unwrap();
        let e = svc.generate("x", None).await.unwrap_err();
        assert!(matches!(
            e,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::EmptyChoices,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn embeddings_returns_first_vector() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/v1/embeddings")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":[{"embedding":[0.5,0.25]}]}"#)
            .create_async()
            .await;

        let svc = OpenAiService::new(cfg(&server.url())).unwrap();
        assert_eq!(svc.embeddings("fn main() {}").await.unwrap(), vec![0.5, 0.25]);
    }
}
