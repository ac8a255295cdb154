use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use pr_reviewer::PullRequestTask;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::{spawn_analysis, webhooks::github_webhook_request::PullRequestEvent},
};

/// PR actions that start an analysis.
const TRACKED_ACTIONS: [&str; 2] = ["opened", "synchronize"];

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WebhookResponse {
    Ignored { reason: String },
    Processing { pr: u64 },
}

#[derive(Debug, Serialize)]
pub struct WebhookTestResponse {
    pub message: &'static str,
}

/// GitHub webhook receiver.
///
/// Only `opened` and `synchronize` deliveries of PR events are analysed; the
/// analysis runs in the background and the delivery is acknowledged at once.
pub async fn github_webhook(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<WebhookResponse>> {
    let Json(payload) = payload?;

    if payload.get("pull_request").is_none() {
        debug!("webhook ignored: not a PR event");
        return Ok(Json(WebhookResponse::Ignored {
            reason: "not a PR event".into(),
        }));
    }

    let action = payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or("none")
        .to_owned();
    if !TRACKED_ACTIONS.contains(&action.as_str()) {
        debug!(%action, "webhook ignored: action not tracked");
        return Ok(Json(WebhookResponse::Ignored {
            reason: format!("action '{action}' not tracked"),
        }));
    }

    let event: PullRequestEvent = serde_json::from_value(payload)
        .map_err(|e| AppError::BadRequest(format!("malformed pull_request event: {e}")))?;

    let task = PullRequestTask {
        repo: event.repository.full_name,
        pr_number: event.pull_request.number,
        pr_url: event.pull_request.html_url,
        base_sha: event.pull_request.base.sha,
        head_sha: event.pull_request.head.sha,
        user_id: None,
    };
    info!(repo = %task.repo, pr = task.pr_number, %action, "webhook accepted");

    let pr = task.pr_number;
    spawn_analysis(&state, task);
    Ok(Json(WebhookResponse::Processing { pr }))
}

pub async fn webhook_test() -> Json<WebhookTestResponse> {
    Json(WebhookTestResponse {
        message: "Webhook endpoint is working",
    })
}
