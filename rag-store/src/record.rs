//! Core data models: stored payloads, points, hits and naming rules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload stored next to each file vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilePayload {
    pub repo: String,
    pub path: String,
    /// Content prefix (at most 10000 chars).
    pub content: String,
    pub language: String,
    /// Length of the full original content, in chars.
    pub size: u64,
}

/// One vector ready to be upserted.
#[derive(Clone, Debug)]
pub struct EmbedPoint {
    pub id: Uuid,
    pub vector: Vec<f32>,
    pub payload: FilePayload,
}

/// A nearest-neighbour hit.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub payload: FilePayload,
    pub score: f32,
}

/// Collection holding one repository: `repo_` + name with `/` and `-` mapped to `_`.
pub fn collection_name(repo: &str) -> String {
    let safe: String = repo
        .chars()
        .map(|c| if c == '/' || c == '-' { '_' } else { c })
        .collect();
    format!("repo_{safe}")
}

/// Deterministic point id for `(repo, path)`: UUIDv5 of `"repo:path"`.
pub fn point_id(repo: &str, path: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("{repo}:{path}").as_bytes())
}

/// First `max` chars of `s`.
pub(crate) fn prefix_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_name_normalizes_separators() {
        assert_eq!(collection_name("octo-org/my-repo"), "repo_octo_org_my_repo");
        assert_eq!(collection_name("a/b"), "repo_a_b");
    }

    #[test]
    fn point_id_is_deterministic() {
        let a = point_id("acme/api", "src/lib.rs");
        let b = point_id("acme/api", "src/lib.rs");
        assert_eq!(a, b);
        assert_ne!(a, point_id("acme/api", "src/main.rs"));
        assert_ne!(a, point_id("acme/web", "src/lib.rs"));
    }

    #[test]
    fn prefix_respects_char_boundaries() {
        assert_eq!(prefix_chars("héllo", 2), "hé");
        assert_eq!(prefix_chars("abc", 10), "abc");
        assert_eq!(prefix_chars("", 3), "");
    }
}
