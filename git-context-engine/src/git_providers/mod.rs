//! Hosting provider access (GitHub).
//!
//! The pipeline talks to the host through [`PullRequestHost`], a small
//! boxed-future trait without async-trait, so tests can swap in fakes.

pub mod github;
pub mod github_oauth;
pub mod types;

pub use types::*;

use std::{future::Future, pin::Pin};

use tracing::debug;

use crate::errors::{GitContextEngineConfigError, GitContextEngineResult};
use crate::git_providers::github::GitHubClient;

/// Default public GitHub REST base.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Sent on every GitHub request; the REST API answers 403 without one.
pub const USER_AGENT: &str = "codeassure/0.1";

/// Owned future returned by [`PullRequestHost`] methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Runtime configuration for the hosting API client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// API base, e.g. "https://api.github.com".
    pub base_api: String,
    /// Personal access token used for reads and comments.
    pub token: String,
}

impl ProviderConfig {
    /// Reads `GITHUB_API_BASE` (optional) and `GITHUB_TOKEN` (required).
    pub fn from_env() -> GitContextEngineResult<Self> {
        let token = std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GitContextEngineConfigError::MissingToken)?;
        let base_api = std::env::var("GITHUB_API_BASE")
            .ok()
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GITHUB_API.to_string());

        if !(base_api.starts_with("http://") || base_api.starts_with("https://")) {
            return Err(GitContextEngineConfigError::InvalidBaseUrl(base_api).into());
        }

        Ok(Self { base_api, token })
    }
}

/// HTTP client shared by the GitHub clients, carrying [`USER_AGENT`].
pub(crate) fn http_client() -> GitContextEngineResult<reqwest::Client> {
    Ok(reqwest::Client::builder().user_agent(USER_AGENT).build()?)
}

impl GitHubClient {
    /// Constructs a client from configuration.
    pub fn from_config(cfg: &ProviderConfig) -> GitContextEngineResult<Self> {
        debug!("Initializing GitHub client: base_api={}", cfg.base_api);
        Ok(GitHubClient::new(http_client()?, cfg.base_api.clone(), &cfg.token))
    }
}

/// Operations the review pipeline needs from the hosting provider.
pub trait PullRequestHost: Send + Sync {
    /// Reviewable changes of a PR; empty on any failure.
    fn fetch_changes<'a>(&'a self, repo: &'a str, pr_number: u64) -> BoxFuture<'a, Vec<CodeChange>>;

    /// Posts a top-level comment on the PR.
    fn post_comment<'a>(
        &'a self,
        repo: &'a str,
        pr_number: u64,
        body: &'a str,
    ) -> BoxFuture<'a, GitContextEngineResult<()>>;
}

impl PullRequestHost for GitHubClient {
    fn fetch_changes<'a>(&'a self, repo: &'a str, pr_number: u64) -> BoxFuture<'a, Vec<CodeChange>> {
        Box::pin(GitHubClient::fetch_changes(self, repo, pr_number))
    }

    fn post_comment<'a>(
        &'a self,
        repo: &'a str,
        pr_number: u64,
        body: &'a str,
    ) -> BoxFuture<'a, GitContextEngineResult<()>> {
        Box::pin(self.post_issue_comment(repo, pr_number, body))
    }
}
