//! Unified error types for the crate.

use ai_llm_service::error_handler::AiLlmError;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The vector store is not configured (no URL/API key).
    #[error("Qdrant not configured")]
    Unconfigured,

    /// Mismatch between the embedding size and the collection size.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Embedding model call failed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// Payload stored in the collection did not have the expected shape.
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<AiLlmError> for RagError {
    fn from(e: AiLlmError) -> Self {
        RagError::Embedding(e.to_string())
    }
}

impl From<qdrant_client::QdrantError> for RagError {
    fn from(e: qdrant_client::QdrantError) -> Self {
        RagError::Qdrant(e.to_string())
    }
}
