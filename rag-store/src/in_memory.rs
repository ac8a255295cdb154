//! In-process vector store for development and tests.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::VectorSpace;
use crate::errors::RagError;
use crate::record::{EmbedPoint, FilePayload, SearchHit};

#[derive(Debug)]
struct Collection {
    space: VectorSpace,
    points: HashMap<Uuid, (Vec<f32>, FilePayload)>,
}

/// Collections kept in a map, searched by brute force.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn ensure_collection(&self, name: &str, space: &VectorSpace) {
        let mut guard = self.collections.write().await;
        guard.entry(name.to_string()).or_insert_with(|| Collection {
            space: *space,
            points: HashMap::new(),
        });
    }

    pub async fn points_count(&self, name: &str) -> Option<u64> {
        let guard = self.collections.read().await;
        guard.get(name).map(|c| c.points.len() as u64)
    }

    pub async fn upsert_points(&self, name: &str, points: Vec<EmbedPoint>) -> Result<usize, RagError> {
        let mut guard = self.collections.write().await;
        let collection = guard
            .get_mut(name)
            .ok_or_else(|| RagError::Qdrant(format!("collection '{name}' not found")))?;

        let count = points.len();
        for p in points {
            if p.vector.len() != collection.space.size {
                return Err(RagError::VectorSizeMismatch {
                    got: p.vector.len(),
                    want: collection.space.size,
                });
            }
            collection.points.insert(p.id, (p.vector, p.payload));
        }
        Ok(count)
    }

    pub async fn search(&self, name: &str, vector: &[f32], limit: u64) -> Result<Vec<SearchHit>, RagError> {
        let guard = self.collections.read().await;
        let collection = guard
            .get(name)
            .ok_or_else(|| RagError::Qdrant(format!("collection '{name}' not found")))?;

        let mut hits: Vec<SearchHit> = collection
            .points
            .values()
            .map(|(v, payload)| SearchHit {
                payload: payload.clone(),
                score: cosine(vector, v),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit as usize);
        Ok(hits)
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 { 0.0 } else { dot / (na * nb) }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::record::point_id;

    #[test]
    fn cosine_similarity_bounds() {
        assert!((cosine(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 0.0]), 0.0);
    }

    fn point(path: &str, content: &str, vector: Vec<f32>) -> EmbedPoint {
        EmbedPoint {
            id: point_id("acme/api", path),
            vector,
            payload: FilePayload {
                repo: "acme/api".into(),
                path: path.into(),
                content: content.into(),
                language: "rust".into(),
                size: content.chars().count() as u64,
            },
        }
    }

    #[tokio::test]
    async fn upsert_overwrites_same_point_id() {
        let store = InMemoryStore::new();
        store.ensure_collection("repo_acme_api", &VectorSpace { size: 2 }).await;

        store
            .upsert_points("repo_acme_api", vec![point("src/lib.rs", "old", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert_points("repo_acme_api", vec![point("src/lib.rs", "new", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.points_count("repo_acme_api").await, Some(1));
        let hits = store.search("repo_acme_api", &[0.0, 1.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload.content, "new");
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_dimension() {
        let store = InMemoryStore::new();
        store.ensure_collection("repo_acme_api", &VectorSpace { size: 2 }).await;

        let err = store
            .upsert_points("repo_acme_api", vec![point("a.rs", "x", vec![1.0, 0.0, 0.0])])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::VectorSizeMismatch { got: 3, want: 2 }));
    }
}
