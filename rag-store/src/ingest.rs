//! Repository embedding: one vector per source file, one batch upsert per run.

use git_context_engine::RepoFile;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::{MAX_EMBED_CHARS, STORED_CONTENT_CHARS, VectorSpace};
use crate::embed::EmbeddingsProvider;
use crate::record::{EmbedPoint, FilePayload, collection_name, point_id, prefix_chars};
use crate::store::EmbeddingStore;

/// Result of one repository embedding run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmbedReport {
    Success {
        collection: String,
        files_embedded: usize,
    },
    Error {
        message: String,
    },
}

/// Embeds `files` into the repository collection.
///
/// Files are processed one at a time. Empty files and files over
/// [`MAX_EMBED_CHARS`] are skipped; the first embedding or store failure ends
/// the run with an error report.
pub async fn embed_repository(
    store: &EmbeddingStore,
    provider: &dyn EmbeddingsProvider,
    space: &VectorSpace,
    repo: &str,
    files: &[RepoFile],
) -> EmbedReport {
    if !store.is_configured() {
        return EmbedReport::Error {
            message: "Qdrant not configured".into(),
        };
    }

    let collection = collection_name(repo);
    info!(repo, collection = %collection, files = files.len(), "embedding repository");

    if let Err(e) = store.ensure_collection(&collection, space).await {
        error!(collection = %collection, error = %e, "failed to prepare collection");
        return EmbedReport::Error {
            message: e.to_string(),
        };
    }

    let mut points = Vec::new();
    for (idx, file) in files.iter().enumerate() {
        let size = file.content.chars().count();
        if size == 0 || size > MAX_EMBED_CHARS {
            debug!(path = %file.path, size, "skipping file");
            continue;
        }

        let vector = match provider.embed(&file.content).await {
            Ok(v) => v,
            Err(e) => {
                error!(path = %file.path, error = %e, "embedding failed");
                return EmbedReport::Error {
                    message: e.to_string(),
                };
            }
        };

        points.push(EmbedPoint {
            id: point_id(repo, &file.path),
            vector,
            payload: FilePayload {
                repo: repo.to_string(),
                path: file.path.clone(),
                content: prefix_chars(&file.content, STORED_CONTENT_CHARS).to_string(),
                language: file.language.to_string(),
                size: size as u64,
            },
        });

        if (idx + 1) % 10 == 0 {
            info!("Embedded {}/{} files", idx + 1, files.len());
        }
    }

    let files_embedded = points.len();
    if files_embedded > 0 {
        if let Err(e) = store.upsert_points(&collection, points).await {
            error!(collection = %collection, error = %e, "upsert failed");
            return EmbedReport::Error {
                message: e.to_string(),
            };
        }
    }

    info!(collection = %collection, files_embedded, "repository embedded");
    EmbedReport::Success {
        collection,
        files_embedded,
    }
}
