//! GitHub access for the review pipeline: file classification, PR diffs,
//! repository contents, PR comments and the OAuth web flow.

pub mod classify;
pub mod errors;
pub mod git_providers;

pub use classify::{Language, classify_for_embedding, classify_for_review, detect_language};
pub use errors::{GitContextEngineError, GitContextEngineResult};
pub use git_providers::{
    BoxFuture, CodeChange, GitHubAccount, ProviderConfig, PullRequestHost, RepoFile,
    github::GitHubClient, github_oauth::GitHubOAuth,
};
