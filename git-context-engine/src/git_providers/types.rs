//! Data model shared by the review and retrieval stages.

use serde::{Deserialize, Serialize};

use crate::classify::Language;

/// One changed, reviewable file of a pull request.
///
/// Produced by the diff fetcher and only kept in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeChange {
    pub filename: String,
    /// Unified diff text as returned by the hosting API.
    pub patch: String,
    pub additions: u32,
    pub deletions: u32,
    pub language: Language,
}

/// A repository file selected for embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoFile {
    pub path: String,
    pub content: String,
    pub language: Language,
}

/// Identity of a GitHub account, as returned by `GET /user`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubAccount {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}
