use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use pr_reviewer::PullRequestTask;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{core::app_state::AppState, error_handler::AppResult, routes::spawn_analysis};

#[derive(Debug, Deserialize)]
pub struct ManualReviewQuery {
    pub repo: String,
    pub pr_number: u64,
    /// Session token; attributes the review to its user when valid.
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManualReviewResponse {
    pub status: &'static str,
    pub message: String,
    pub pr_url: String,
}

/// Starts an analysis for `repo#pr_number` without a webhook delivery.
///
/// Commit shas are placeholders; the analysis does not read them.
pub async fn manual_review(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ManualReviewQuery>, QueryRejection>,
) -> AppResult<Json<ManualReviewResponse>> {
    let Query(q) = query?;

    let task = PullRequestTask {
        pr_url: format!("https://github.com/{}/pull/{}", q.repo, q.pr_number),
        repo: q.repo,
        pr_number: q.pr_number,
        base_sha: "main".into(),
        head_sha: "branch".into(),
        user_id: state.optional_user_id(q.token.as_deref()),
    };
    info!(repo = %task.repo, pr = task.pr_number, user_id = ?task.user_id, "manual review requested");

    let response = ManualReviewResponse {
        status: "processing",
        message: format!("Analyzing {}#{}", task.repo, task.pr_number),
        pr_url: task.pr_url.clone(),
    };
    spawn_analysis(&state, task);
    Ok(Json(response))
}
