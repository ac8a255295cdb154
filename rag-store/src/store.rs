//! Embedding store backends behind one enum (no trait objects).
//!
//! An unconfigured store never raises on reads: searches come back empty so
//! reviews still run without retrieval context.

use tracing::{debug, warn};

use crate::config::VectorSpace;
use crate::errors::RagError;
use crate::in_memory::InMemoryStore;
use crate::qdrant_facade::QdrantFacade;
use crate::record::{EmbedPoint, SearchHit};

#[derive(Debug)]
pub enum EmbeddingStore {
    Qdrant(QdrantFacade),
    InMemory(InMemoryStore),
    Unconfigured,
}

impl EmbeddingStore {
    pub fn is_configured(&self) -> bool {
        !matches!(self, EmbeddingStore::Unconfigured)
    }

    /// Idempotent: creates the collection only when absent.
    pub async fn ensure_collection(&self, name: &str, space: &VectorSpace) -> Result<(), RagError> {
        match self {
            EmbeddingStore::Qdrant(q) => q.ensure_collection(name, space).await,
            EmbeddingStore::InMemory(m) => {
                m.ensure_collection(name, space).await;
                Ok(())
            }
            EmbeddingStore::Unconfigured => Err(RagError::Unconfigured),
        }
    }

    /// Point count of an existing collection, `None` when it is missing.
    pub async fn points_count(&self, name: &str) -> Result<Option<u64>, RagError> {
        match self {
            EmbeddingStore::Qdrant(q) => q.points_count(name).await,
            EmbeddingStore::InMemory(m) => Ok(m.points_count(name).await),
            EmbeddingStore::Unconfigured => Err(RagError::Unconfigured),
        }
    }

    /// Upserts all points in one call, overwriting points with the same id.
    /// Returns how many were sent.
    pub async fn upsert_points(&self, name: &str, points: Vec<EmbedPoint>) -> Result<usize, RagError> {
        match self {
            EmbeddingStore::Qdrant(q) => q.upsert_points(name, points).await,
            EmbeddingStore::InMemory(m) => m.upsert_points(name, points).await,
            EmbeddingStore::Unconfigured => Err(RagError::Unconfigured),
        }
    }

    /// Nearest neighbours, best first. Empty when unconfigured, when the
    /// collection is missing, or on any backend failure (logged).
    pub async fn search(&self, name: &str, vector: Vec<f32>, limit: u64) -> Vec<SearchHit> {
        let res = match self {
            EmbeddingStore::Qdrant(q) => q.search(name, vector, limit).await,
            EmbeddingStore::InMemory(m) => m.search(name, &vector, limit).await,
            EmbeddingStore::Unconfigured => {
                debug!("search skipped: store not configured");
                return Vec::new();
            }
        };

        res.unwrap_or_else(|e| {
            warn!(collection = name, error = %e, "vector search failed");
            Vec::new()
        })
    }
}
