pub mod auth;
pub mod embeddings;
pub mod health;
pub mod manual_review;
pub mod reviews;
pub mod webhooks;

use std::sync::Arc;

use pr_reviewer::PullRequestTask;
use tracing::info;

use crate::core::app_state::AppState;

/// Runs one analysis in the background; the outcome is only logged.
pub(crate) fn spawn_analysis(state: &AppState, task: PullRequestTask) {
    let pipeline = Arc::clone(&state.pipeline);
    tokio::spawn(async move {
        let outcome = pipeline.analyze_pr(&task).await;
        info!(repo = %task.repo, pr = task.pr_number, ?outcome, "analysis finished");
    });
}
