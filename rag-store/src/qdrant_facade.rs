//! Thin adapter around `qdrant-client` to isolate API usage.
//!
//! Collections are addressed per call since every repository has its own.

use std::collections::HashMap;

use qdrant_client::Qdrant;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    Value as QValue, VectorParamsBuilder, value::Kind,
};
use tracing::{debug, info};

use crate::config::{RagConfig, VectorSpace};
use crate::errors::RagError;
use crate::record::{EmbedPoint, FilePayload, SearchHit};

/// A facade over the Qdrant client.
pub struct QdrantFacade {
    client: Qdrant,
}

impl std::fmt::Debug for QdrantFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantFacade").finish_non_exhaustive()
    }
}

impl QdrantFacade {
    /// Creates a new facade from the given configuration.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        cfg.validate()?;

        let mut builder = Qdrant::from_url(&cfg.qdrant_url);
        if let Some(key) = &cfg.qdrant_api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder.build()?;

        Ok(Self { client })
    }

    /// Creates the collection unless it already exists.
    pub async fn ensure_collection(&self, name: &str, space: &VectorSpace) -> Result<(), RagError> {
        if self.client.collection_exists(name).await? {
            debug!("Collection '{}' already exists, updating", name);
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(name)
                    .vectors_config(VectorParamsBuilder::new(space.size as u64, Distance::Cosine)),
            )
            .await?;

        info!(
            "Collection '{}' created (size={}, distance=cosine)",
            name, space.size
        );
        Ok(())
    }

    /// Number of points in the collection, `None` if it does not exist.
    pub async fn points_count(&self, name: &str) -> Result<Option<u64>, RagError> {
        if !self.client.collection_exists(name).await? {
            return Ok(None);
        }
        let info = self.client.collection_info(name).await?;
        Ok(Some(
            info.result.and_then(|r| r.points_count).unwrap_or_default(),
        ))
    }

    /// Upserts a batch of points in a single request.
    pub async fn upsert_points(&self, name: &str, points: Vec<EmbedPoint>) -> Result<usize, RagError> {
        if points.is_empty() {
            debug!("No points provided for upsert");
            return Ok(0);
        }

        let count = points.len();
        let points: Vec<PointStruct> = points.into_iter().map(to_point_struct).collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(name, points).wait(true))
            .await?;

        info!("Upserted {} points into collection '{}'", count, name);
        Ok(count)
    }

    /// Nearest neighbours of `vector`, best first.
    pub async fn search(
        &self,
        name: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<SearchHit>, RagError> {
        let res = self
            .client
            .search_points(SearchPointsBuilder::new(name, vector, limit).with_payload(true))
            .await?;

        let mut out = Vec::with_capacity(res.result.len());
        for r in res.result {
            let payload: FilePayload = serde_json::from_value(qpayload_to_json(r.payload))?;
            out.push(SearchHit {
                payload,
                score: r.score,
            });
        }

        debug!("Search in '{}' returned {} hits", name, out.len());
        Ok(out)
    }
}

fn to_point_struct(p: EmbedPoint) -> PointStruct {
    let FilePayload {
        repo,
        path,
        content,
        language,
        size,
    } = p.payload;

    let mut payload: HashMap<String, QValue> = HashMap::with_capacity(5);
    payload.insert("repo".into(), QValue::from(repo));
    payload.insert("path".into(), QValue::from(path));
    payload.insert("content".into(), QValue::from(content));
    payload.insert("language".into(), QValue::from(language));
    payload.insert("size".into(), QValue::from(size as i64));

    PointStruct::new(p.id.to_string(), p.vector, payload)
}

/// Converts a Qdrant payload into JSON.
///
/// Nested structs and lists are not used by this crate and map to `Null`.
fn qpayload_to_json(p: HashMap<String, QValue>) -> serde_json::Value {
    let mut m = serde_json::Map::new();
    for (k, v) in p {
        let j = match v.kind {
            Some(Kind::StringValue(s)) => serde_json::Value::String(s),
            Some(Kind::IntegerValue(i)) => serde_json::Value::Number(i.into()),
            Some(Kind::DoubleValue(f)) => serde_json::json!(f),
            Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
            _ => serde_json::Value::Null,
        };
        m.insert(k, j);
    }
    serde_json::Value::Object(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_through_qdrant_values() {
        let point = EmbedPoint {
            id: crate::record::point_id("acme/api", "src/lib.rs"),
            vector: vec![0.0; 4],
            payload: FilePayload {
                repo: "acme/api".into(),
                path: "src/lib.rs".into(),
                content: "pub fn x() {}".into(),
                language: "rust".into(),
                size: 13,
            },
        };
        let expected = point.payload.clone();
        let ps = to_point_struct(point);
        let back: FilePayload = serde_json::from_value(qpayload_to_json(ps.payload)).unwrap();
        assert_eq!(back, expected);
    }
}
