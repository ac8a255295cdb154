//! Per-repository code embeddings over Qdrant.
//!
//! - embed a repository's source files into its own collection
//! - retrieve similar files as extra context for a PR review
//! - report whether a repository has been embedded

mod config;
mod embed;
mod errors;
mod in_memory;
mod ingest;
mod qdrant_facade;
mod record;
mod retrieve;
mod store;

use std::sync::Arc;

pub use config::{EMBEDDING_DIM, RagConfig, VectorSpace};
pub use embed::{EmbeddingsProvider, LlmEmbedder};
pub use errors::RagError;
pub use in_memory::InMemoryStore;
pub use ingest::EmbedReport;
pub use qdrant_facade::QdrantFacade;
pub use record::{EmbedPoint, FilePayload, SearchHit, collection_name, point_id};
pub use store::EmbeddingStore;

use git_context_engine::{CodeChange, RepoFile};
use serde::Serialize;
use tracing::{info, warn};

/// Whether a repository collection exists and how many vectors it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddingStatus {
    pub embedded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vectors: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// High-level facade wiring a store backend and an embedding provider.
pub struct RagStore {
    store: EmbeddingStore,
    provider: Arc<dyn EmbeddingsProvider>,
    space: VectorSpace,
}

impl RagStore {
    pub fn new(store: EmbeddingStore, provider: Arc<dyn EmbeddingsProvider>, space: VectorSpace) -> Self {
        Self {
            store,
            provider,
            space,
        }
    }

    /// Qdrant when `cfg` is present and the client builds, unconfigured otherwise.
    pub fn from_config(cfg: Option<RagConfig>, provider: Arc<dyn EmbeddingsProvider>) -> Self {
        let Some(cfg) = cfg else {
            info!("Qdrant not configured; reviews run without retrieval context");
            return Self::new(EmbeddingStore::Unconfigured, provider, VectorSpace::default());
        };

        match QdrantFacade::new(&cfg) {
            Ok(q) => {
                info!(url = %cfg.qdrant_url, "Qdrant store ready");
                Self::new(EmbeddingStore::Qdrant(q), provider, cfg.space)
            }
            Err(e) => {
                warn!(error = %e, "Qdrant client init failed; running unconfigured");
                Self::new(EmbeddingStore::Unconfigured, provider, cfg.space)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_configured()
    }

    pub fn store(&self) -> &EmbeddingStore {
        &self.store
    }

    /// See [`ingest::embed_repository`].
    pub async fn embed_repository(&self, repo: &str, files: &[RepoFile]) -> EmbedReport {
        ingest::embed_repository(&self.store, self.provider.as_ref(), &self.space, repo, files).await
    }

    /// See [`retrieve::get_context`].
    pub async fn get_context(&self, repo: &str, changes: &[CodeChange]) -> String {
        retrieve::get_context(&self.store, self.provider.as_ref(), repo, changes).await
    }

    pub async fn embedding_status(&self, repo: &str) -> EmbeddingStatus {
        if !self.store.is_configured() {
            return EmbeddingStatus {
                embedded: false,
                collection: None,
                vectors: None,
                reason: Some("Qdrant not configured".into()),
            };
        }

        let collection = collection_name(repo);
        let vectors = match self.store.points_count(&collection).await {
            Ok(v) => v,
            Err(e) => {
                warn!(collection = %collection, error = %e, "collection lookup failed");
                None
            }
        };

        EmbeddingStatus {
            embedded: vectors.is_some(),
            collection: Some(collection),
            vectors,
            reason: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git_context_engine::Language;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Maps text to one of two axes so similarity is predictable.
    #[derive(Default)]
    struct AxisEmbedder {
        calls: AtomicUsize,
    }

    impl EmbeddingsProvider for AxisEmbedder {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, RagError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                if text.contains("query") {
                    Ok(vec![1.0, 0.0, 0.0, 0.0])
                } else if text.contains("render") {
                    Ok(vec![0.0, 1.0, 0.0, 0.0])
                } else {
                    Ok(vec![0.6, 0.8, 0.0, 0.0])
                }
            })
        }
    }

    fn space() -> VectorSpace {
        VectorSpace { size: 4 }
    }

    fn in_memory(embedder: Arc<AxisEmbedder>) -> RagStore {
        RagStore::new(EmbeddingStore::InMemory(InMemoryStore::new()), embedder, space())
    }

    fn file(path: &str, content: &str) -> RepoFile {
        RepoFile {
            path: path.into(),
            content: content.into(),
            language: git_context_engine::detect_language(path),
        }
    }

    fn change(filename: &str, patch: &str) -> CodeChange {
        CodeChange {
            filename: filename.into(),
            patch: patch.into(),
            additions: 1,
            deletions: 0,
            language: Language::Python,
        }
    }

    #[tokio::test]
    async fn embed_repository_skips_empty_and_oversized_files() {
        let embedder = Arc::new(AxisEmbedder::default());
        let rag = in_memory(embedder.clone());
        let files = vec![
            file("src/db.py", "def query(): pass"),
            file("src/empty.py", ""),
            file("src/huge.py", &"x".repeat(50_001)),
            file("src/view.js", "function render() {}"),
        ];

        let report = rag.embed_repository("acme/api", &files).await;
        assert_eq!(
            report,
            EmbedReport::Success {
                collection: "repo_acme_api".into(),
                files_embedded: 2
            }
        );
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn re_embedding_overwrites_points() {
        let rag = in_memory(Arc::new(AxisEmbedder::default()));
        let files = vec![file("src/db.py", "def query(): pass")];

        rag.embed_repository("acme/api", &files).await;
        rag.embed_repository("acme/api", &files).await;

        let status = rag.embedding_status("acme/api").await;
        assert!(status.embedded);
        assert_eq!(status.vectors, Some(1));
    }

    #[tokio::test]
    async fn stored_content_is_truncated_but_size_is_original() {
        let rag = in_memory(Arc::new(AxisEmbedder::default()));
        let content = format!("query {}", "y".repeat(20_000));
        rag.embed_repository("acme/api", &[file("src/big.py", &content)]).await;

        let hits = rag
            .store()
            .search("repo_acme_api", vec![1.0, 0.0, 0.0, 0.0], 1)
            .await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].payload.content.chars().count(), 10_000);
        assert_eq!(hits[0].payload.size, content.chars().count() as u64);
        assert_eq!(hits[0].payload.language, "python");
    }

    #[tokio::test]
    async fn unconfigured_store_reports_errors_and_empty_context() {
        let embedder = Arc::new(AxisEmbedder::default());
        let rag = RagStore::new(EmbeddingStore::Unconfigured, embedder.clone(), space());

        let report = rag.embed_repository("acme/api", &[file("a.py", "query")]).await;
        assert_eq!(
            report,
            EmbedReport::Error {
                message: "Qdrant not configured".into()
            }
        );

        let status = rag.embedding_status("acme/api").await;
        assert!(!status.embedded);
        assert_eq!(status.reason.as_deref(), Some("Qdrant not configured"));

        let ctx = rag.get_context("acme/api", &[change("a.py", "query")]).await;
        assert!(ctx.is_empty());
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn status_for_missing_collection_names_it() {
        let rag = in_memory(Arc::new(AxisEmbedder::default()));
        let status = rag.embedding_status("acme/other").await;
        assert!(!status.embedded);
        assert_eq!(status.collection.as_deref(), Some("repo_acme_other"));
        assert_eq!(status.vectors, None);
    }

    #[tokio::test]
    async fn context_lists_nearest_files_per_change() {
        let embedder = Arc::new(AxisEmbedder::default());
        let rag = in_memory(embedder.clone());
        rag.embed_repository(
            "acme/api",
            &[
                file("src/db.py", "def query():\n    return 1"),
                file("src/view.js", "function render() {}"),
                file("src/mixed.py", "misc"),
            ],
        )
        .await;

        let ctx = rag
            .get_context("acme/api", &[change("src/new_db.py", "+ query(x)")])
            .await;

        let lines: Vec<&str> = ctx.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], "### Similar patterns in src/new_db.py:");
        assert_eq!(lines[2], "- src/db.py (similarity: 1.00)");
        assert_eq!(lines[3], "  Context: def query():     return 1...");
        assert_eq!(lines[4], "- src/mixed.py (similarity: 0.60)");
        assert_eq!(lines.len(), 6);
    }

    #[tokio::test]
    async fn empty_changes_never_touch_the_store() {
        let embedder = Arc::new(AxisEmbedder::default());
        let rag = in_memory(embedder.clone());
        assert_eq!(rag.get_context("acme/api", &[]).await, "");
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn context_only_queries_first_three_changes() {
        let embedder = Arc::new(AxisEmbedder::default());
        let rag = in_memory(embedder.clone());
        let changes: Vec<CodeChange> = (0..5).map(|i| change(&format!("f{i}.py"), "query")).collect();
        rag.get_context("acme/api", &changes).await;
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
    }
}
