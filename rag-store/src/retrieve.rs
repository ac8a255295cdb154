//! Similar-code context for review prompts. Best effort: failures yield less
//! context, never an error.

use git_context_engine::CodeChange;
use tracing::{debug, warn};

use crate::embed::EmbeddingsProvider;
use crate::record::{collection_name, prefix_chars};
use crate::store::EmbeddingStore;

/// Changes used as queries.
const MAX_QUERY_CHANGES: usize = 3;
/// Patch prefix embedded as the query (chars).
const QUERY_PATCH_CHARS: usize = 1000;
/// Hits per change.
const HITS_PER_CHANGE: u64 = 2;
/// Content preview per hit (chars).
const PREVIEW_CHARS: usize = 200;

/// Formats nearest files for the first few changes; empty when nothing matched.
pub async fn get_context(
    store: &EmbeddingStore,
    provider: &dyn EmbeddingsProvider,
    repo: &str,
    changes: &[CodeChange],
) -> String {
    if changes.is_empty() || !store.is_configured() {
        return String::new();
    }

    let collection = collection_name(repo);
    let mut parts: Vec<String> = Vec::new();

    for change in changes.iter().take(MAX_QUERY_CHANGES) {
        let query = prefix_chars(&change.patch, QUERY_PATCH_CHARS);
        let vector = match provider.embed(query).await {
            Ok(v) => v,
            Err(e) => {
                warn!(file = %change.filename, error = %e, "query embedding failed");
                continue;
            }
        };

        let hits = store.search(&collection, vector, HITS_PER_CHANGE).await;
        if hits.is_empty() {
            continue;
        }

        parts.push(format!("\n### Similar patterns in {}:", change.filename));
        for hit in hits {
            parts.push(format!(
                "- {} (similarity: {:.2})",
                hit.payload.path, hit.score
            ));
            let preview = prefix_chars(&hit.payload.content, PREVIEW_CHARS).replace('\n', " ");
            parts.push(format!("  Context: {preview}..."));
        }
    }

    debug!(repo, fragments = parts.len(), "retrieval context built");
    parts.join("\n")
}
