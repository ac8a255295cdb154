//! Vector store configuration.

use crate::errors::RagError;

/// Dimension of `all-minilm` embeddings.
pub const EMBEDDING_DIM: usize = 384;

/// Files longer than this (in chars) are not embedded.
pub const MAX_EMBED_CHARS: usize = 50_000;

/// Content prefix kept in the point payload (chars).
pub const STORED_CONTENT_CHARS: usize = 10_000;

/// Vector space of a collection. Distance is always cosine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
}

impl Default for VectorSpace {
    fn default() -> Self {
        Self { size: EMBEDDING_DIM }
    }
}

/// Connection settings for Qdrant.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant endpoint, e.g. `https://xyz.cloud.qdrant.io:6334`.
    pub qdrant_url: String,
    /// API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Vector space used for every per-repository collection.
    pub space: VectorSpace,
}

impl RagConfig {
    /// Reads `QDRANT_URL` and `QDRANT_API_KEY`.
    ///
    /// Returns `None` unless both are set; the store then runs unconfigured.
    pub fn from_env() -> Option<Self> {
        let url = std::env::var("QDRANT_URL").ok().filter(|v| !v.trim().is_empty())?;
        let key = std::env::var("QDRANT_API_KEY").ok().filter(|v| !v.trim().is_empty())?;
        Some(Self {
            qdrant_url: url,
            qdrant_api_key: Some(key),
            space: VectorSpace::default(),
        })
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.space.size == 0 {
            return Err(RagError::Config("vector size must be > 0".into()));
        }
        Ok(())
    }
}
