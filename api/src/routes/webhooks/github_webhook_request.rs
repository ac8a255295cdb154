use serde::Deserialize;

/// Fields of a GitHub `pull_request` delivery used to start an analysis.
#[derive(Debug, Deserialize)]
pub struct PullRequestEvent {
    pub repository: Repository,
    pub pull_request: PullRequest,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub html_url: String,
    pub base: CommitRef,
    pub head: CommitRef,
}

#[derive(Debug, Deserialize)]
pub struct CommitRef {
    pub sha: String,
}
