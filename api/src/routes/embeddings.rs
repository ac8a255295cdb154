use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use rag_store::EmbeddingStatus;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{core::app_state::AppState, error_handler::AppResult};

#[derive(Debug, Deserialize)]
pub struct RepoQuery {
    pub repo: String,
}

#[derive(Debug, Serialize)]
pub struct EmbedRepositoryResponse {
    pub status: &'static str,
    pub message: String,
    pub note: &'static str,
}

/// Starts a background job that discovers and embeds every source file of `repo`.
pub async fn embed_repository(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RepoQuery>, QueryRejection>,
) -> AppResult<Json<EmbedRepositoryResponse>> {
    let Query(RepoQuery { repo }) = query?;
    let message = format!("Embedding repository: {repo}");

    let github = state.github.clone();
    let rag = state.rag.clone();
    tokio::spawn(async move {
        info!(%repo, "repository embedding started");
        let files = github.fetch_repo_files(&repo).await;
        let report = rag.embed_repository(&repo, &files).await;
        info!(%repo, ?report, "repository embedding finished");
    });

    Ok(Json(EmbedRepositoryResponse {
        status: "processing",
        message,
        note: "This may take a few minutes. Future reviews will use this context.",
    }))
}

pub async fn embedding_status(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RepoQuery>, QueryRejection>,
) -> AppResult<Json<EmbeddingStatus>> {
    let Query(RepoQuery { repo }) = query?;
    Ok(Json(state.rag.embedding_status(&repo).await))
}
