use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::service_profiles::LlmServiceProfiles;

use crate::errors::RagError;

/// Provider interface for embedding generation.
///
/// Async because real providers perform HTTP requests.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>>;
}

/// Embeddings from the shared LLM service, checked against the collection size.
#[derive(Clone)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: usize,
}

impl LlmEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: usize) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
        Box::pin(async move {
            let v = self.svc.embed(text).await?;
            if v.len() != self.dim {
                return Err(RagError::VectorSizeMismatch {
                    got: v.len(),
                    want: self.dim,
                });
            }
            Ok(v)
        })
    }
}
