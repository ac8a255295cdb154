//! GitHub provider (REST v3) for PR diffs, repository contents and comments.
//!
//! Endpoints used:
//!   * GET  /repos/{owner}/{repo}/pulls/{number}/files
//!   * GET  /repos/{owner}/{repo}/git/trees/{ref}?recursive=1
//!   * GET  /repos/{owner}/{repo}/contents/{path}?ref={ref}
//!   * POST /repos/{owner}/{repo}/issues/{number}/comments

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::classify::{classify_for_embedding, classify_for_review, detect_language};
use crate::errors::{GitContextEngineError, GitContextEngineResult};
use crate::git_providers::types::{CodeChange, RepoFile};

/// Page size for the PR files listing (GitHub maximum).
const FILES_PER_PAGE: usize = 100;

/// GitHub stops listing PR files after 3000 entries (30 pages of 100).
const MAX_FILE_PAGES: u32 = 30;

/// GitHub HTTP client wrapper.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_api: String,
    auth: String,
}

impl GitHubClient {
    /// Constructs a GitHub client with a shared HTTP instance and a PAT.
    pub fn new(http: Client, base_api: impl Into<String>, token: &str) -> Self {
        let base_api = base_api.into().trim_end_matches('/').to_string();
        debug!("Creating GitHubClient with base_api={}", base_api);
        Self {
            http,
            base_api,
            auth: format!("Bearer {token}"),
        }
    }

    /// Changed, reviewable files of a pull request.
    ///
    /// Any API failure is logged and yields an empty list; callers treat that
    /// as "no changes".
    pub async fn fetch_changes(&self, repo: &str, pr_number: u64) -> Vec<CodeChange> {
        match self.try_fetch_changes(repo, pr_number).await {
            Ok(changes) => changes,
            Err(e) => {
                error!(repo, pr = pr_number, error = %e, "failed to fetch PR changes");
                Vec::new()
            }
        }
    }

    /// Same as [`Self::fetch_changes`] but surfaces the failure.
    pub async fn try_fetch_changes(
        &self,
        repo: &str,
        pr_number: u64,
    ) -> GitContextEngineResult<Vec<CodeChange>> {
        let (owner, name) = split_owner_repo(repo)?;
        let url = format!(
            "{}/repos/{}/{}/pulls/{}/files",
            self.base_api, owner, name, pr_number
        );

        let mut changes = Vec::new();
        let mut skipped = 0usize;

        for page in 1..=MAX_FILE_PAGES {
            debug!("GitHub list PR files: {} page={}", url, page);
            let files: Vec<GitHubPrFile> = self
                .http
                .get(&url)
                .query(&[("per_page", FILES_PER_PAGE.to_string()), ("page", page.to_string())])
                .header("Authorization", &self.auth)
                .header("Accept", "application/vnd.github+json")
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;

            let last_page = files.len() < FILES_PER_PAGE;

            for f in files {
                if !classify_for_review(&f.filename) {
                    skipped += 1;
                    continue;
                }
                // renames, binaries and oversized diffs come without a patch
                let Some(patch) = f.patch.filter(|p| !p.is_empty()) else {
                    skipped += 1;
                    continue;
                };
                changes.push(CodeChange {
                    language: detect_language(&f.filename),
                    filename: f.filename,
                    patch,
                    additions: f.additions,
                    deletions: f.deletions,
                });
            }

            if last_page {
                break;
            }
        }

        info!(repo, pr = pr_number, files = changes.len(), skipped, "fetched PR changes");
        Ok(changes)
    }

    /// Embeddable source files of the repository at its default branch.
    ///
    /// Failure to list the tree is logged and yields an empty list. Files that
    /// cannot be fetched or are not valid UTF-8 are skipped.
    pub async fn fetch_repo_files(&self, repo: &str) -> Vec<RepoFile> {
        let paths = match self.list_tree(repo, "HEAD").await {
            Ok(paths) => paths,
            Err(e) => {
                error!(repo, error = %e, "failed to list repository tree");
                return Vec::new();
            }
        };

        let candidates: Vec<String> = paths
            .into_iter()
            .filter(|p| classify_for_embedding(p))
            .collect();
        info!(repo, candidates = candidates.len(), "repository tree listed");

        let mut files = Vec::with_capacity(candidates.len());
        for path in candidates {
            let bytes = match self.get_file_raw(repo, &path, "HEAD").await {
                Ok(Some(bytes)) => bytes,
                Ok(None) => continue,
                Err(e) => {
                    warn!(repo, path = %path, error = %e, "failed to fetch file contents");
                    continue;
                }
            };
            let Ok(content) = String::from_utf8(bytes) else {
                debug!(path = %path, "skipping non UTF-8 file");
                continue;
            };
            files.push(RepoFile {
                language: detect_language(&path),
                path,
                content,
            });
        }

        files
    }

    /// Blob paths of the repository tree at `git_ref` (recursive).
    pub async fn list_tree(&self, repo: &str, git_ref: &str) -> GitContextEngineResult<Vec<String>> {
        let (owner, name) = split_owner_repo(repo)?;
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}",
            self.base_api,
            owner,
            name,
            urlencoding::encode(git_ref)
        );
        debug!("GitHub list_tree: {}", url);

        let tree: GitHubTree = self
            .http
            .get(&url)
            .query(&[("recursive", "1")])
            .header("Authorization", &self.auth)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if tree.truncated {
            warn!(repo, "repository tree listing was truncated by GitHub");
        }

        Ok(tree
            .tree
            .into_iter()
            .filter(|e| e.kind == "blob")
            .map(|e| e.path)
            .collect())
    }

    /// Fetches raw file bytes at a specific ref in the repository.
    ///
    /// Returns `Ok(None)` if the file does not exist at the given ref (404).
    pub async fn get_file_raw(
        &self,
        repo: &str,
        repo_relative_path: &str,
        git_ref: &str,
    ) -> GitContextEngineResult<Option<Vec<u8>>> {
        let (owner, name) = split_owner_repo(repo)?;
        let encoded_path = repo_relative_path
            .split('/')
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_api, owner, name, encoded_path
        );
        debug!("GitHub get_file_raw: url={}, ref={}", url, git_ref);

        let resp = self
            .http
            .get(url)
            .query(&[("ref", git_ref)])
            .header("Authorization", &self.auth)
            .header("Accept", "application/vnd.github.v3.raw")
            .send()
            .await?;

        if resp.status().as_u16() == 404 {
            debug!("GitHub file not found at given ref");
            return Ok(None);
        }

        let bytes = resp.error_for_status()?.bytes().await?;
        Ok(Some(bytes.to_vec()))
    }

    /// Posts a top-level comment on a pull request (issue comments API).
    pub async fn post_issue_comment(
        &self,
        repo: &str,
        pr_number: u64,
        body: &str,
    ) -> GitContextEngineResult<()> {
        let (owner, name) = split_owner_repo(repo)?;
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_api, owner, name, pr_number
        );
        debug!("GitHub post_issue_comment: url={}, len={}", url, body.len());

        self.http
            .post(url)
            .header("Authorization", &self.auth)
            .header("Accept", "application/vnd.github+json")
            .json(&GitHubCommentCreate { body })
            .send()
            .await?
            .error_for_status()?;

        info!(repo, pr = pr_number, "posted review comment");
        Ok(())
    }
}

/// Splits "owner/repo" into components or returns a validation error.
pub fn split_owner_repo(project: &str) -> GitContextEngineResult<(&str, &str)> {
    let mut parts = project.split('/');
    let owner = parts.next().unwrap_or("").trim();
    let repo = parts.next().unwrap_or("").trim();

    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(GitContextEngineError::Validation(format!(
            "invalid GitHub repository '{}', expected 'owner/repo'",
            project
        )));
    }

    Ok((owner, repo))
}

#[derive(Debug, Deserialize)]
struct GitHubPrFile {
    filename: String,
    #[serde(default)]
    additions: u32,
    #[serde(default)]
    deletions: u32,
    #[serde(default)]
    patch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubTree {
    tree: Vec<GitHubTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct GitHubTreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
struct GitHubCommentCreate<'a> {
    body: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Language;
    use mockito::Matcher;

    fn client(server: &mockito::Server) -> GitHubClient {
        GitHubClient::new(Client::new(), server.url(), "ghp_test")
    }

    #[test]
    fn owner_repo_validation() {
        assert_eq!(split_owner_repo("acme/api").unwrap(), ("acme", "api"));
        assert!(split_owner_repo("acme").is_err());
        assert!(split_owner_repo("a/b/c").is_err());
        assert!(split_owner_repo("/b").is_err());
    }

    #[tokio::test]
    async fn fetch_changes_filters_and_maps_files() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("GET", "/repos/acme/api/pulls/7/files")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("per_page".into(), "100".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .match_header("authorization", "Bearer ghp_test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"filename":"src/db.py","additions":3,"deletions":1,"patch":"@@ -1 +1,3 @@\n+x"},
                    {"filename":"README.md","additions":1,"deletions":0,"patch":"+doc"},
                    {"filename":"src/moved.rs","additions":0,"deletions":0}
                ]"#,
            )
            .create_async()
            .await;

        let changes = client(&server).fetch_changes("acme/api", 7).await;
        m.assert_async().await;

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].filename, "src/db.py");
        assert_eq!(changes[0].additions, 3);
        assert_eq!(changes[0].deletions, 1);
        assert_eq!(changes[0].language, Language::Python);
    }

    #[tokio::test]
    async fn fetch_changes_is_empty_on_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/repos/acme/api/pulls/7/files")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let gh = client(&server);
        assert!(gh.fetch_changes("acme/api", 7).await.is_empty());

        let err = gh.try_fetch_changes("acme/api", 7).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn fetch_repo_files_walks_tree_and_reads_sources() {
        let mut server = mockito::Server::new_async().await;
        let _tree = server
            .mock("GET", "/repos/acme/api/git/trees/HEAD")
            .match_query(Matcher::UrlEncoded("recursive".into(), "1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"tree":[
                    {"path":"src","type":"tree"},
                    {"path":"src/main.rs","type":"blob"},
                    {"path":"README.md","type":"blob"},
                    {"path":"node_modules/x/index.js","type":"blob"},
                    {"path":"src/gone.rs","type":"blob"}
                ],"truncated":false}"#,
            )
            .create_async()
            .await;
        let _main = server
            .mock("GET", "/repos/acme/api/contents/src/main.rs")
            .match_query(Matcher::UrlEncoded("ref".into(), "HEAD".into()))
            .match_header("accept", "application/vnd.github.v3.raw")
            .with_status(200)
            .with_body("fn main() {}")
            .create_async()
            .await;
        let _gone = server
            .mock("GET", "/repos/acme/api/contents/src/gone.rs")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let files = client(&server).fetch_repo_files("acme/api").await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "src/main.rs");
        assert_eq!(files[0].content, "fn main() {}");
        assert_eq!(files[0].language, Language::Rust);
    }

    #[tokio::test]
    async fn post_issue_comment_sends_body() {
        let mut server = mockito::Server::new_async().await;
        let m = server
            .mock("POST", "/repos/acme/api/issues/7/comments")
            .match_body(Matcher::Json(serde_json::json!({"body": "## Review"})))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        client(&server)
            .post_issue_comment("acme/api", 7, "## Review")
            .await
            .unwrap();
        m.assert_async().await;
    }
}
