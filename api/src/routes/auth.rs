//! GitHub OAuth login and session-token endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    response::Redirect,
};
use git_context_engine::{GitContextEngineError, GitHubOAuth, errors::GitContextEngineProviderError};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub avatar_url: Option<String>,
    pub github_id: i64,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: &'static str,
}

fn oauth(state: &AppState) -> AppResult<&GitHubOAuth> {
    state
        .oauth
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("GitHub OAuth is not configured".into()))
}

/// Sends the browser to GitHub's consent page.
pub async fn login(State(state): State<Arc<AppState>>) -> AppResult<Redirect> {
    Ok(Redirect::temporary(&oauth(&state)?.authorize_url()))
}

/// Completes the OAuth flow and hands a session token to the dashboard.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CallbackQuery>, QueryRejection>,
) -> AppResult<Redirect> {
    let Query(CallbackQuery { code }) = query?;
    let oauth = oauth(&state)?;

    let access_token = oauth.exchange_code(&code).await.map_err(|e| match e {
        GitContextEngineError::Provider(GitContextEngineProviderError::InvalidResponse(reason)) => {
            AppError::BadRequest(reason)
        }
        other => AppError::Upstream(other.to_string()),
    })?;

    let account = oauth
        .fetch_account(&access_token)
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let user = state.store.upsert_user(&account, &access_token).await?;
    let jwt = state.jwt.issue(user.id, &user.username)?;
    info!(user_id = user.id, username = %user.username, "login completed");

    Ok(Redirect::temporary(&format!(
        "{}/auth/callback?token={jwt}",
        state.config.frontend_url
    )))
}

/// Profile of the token's user.
pub async fn me(
    State(state): State<Arc<AppState>>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> AppResult<Json<MeResponse>> {
    let Query(TokenQuery { token }) = query?;

    let user_id = state
        .jwt
        .verify(&token)
        .and_then(|claims| claims.user_id())
        .map_err(|e| {
            warn!(error = %e, "session token rejected");
            AppError::Unauthorized("Invalid or expired token".into())
        })?;

    let user = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(Json(MeResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        avatar_url: user.avatar_url,
        github_id: user.github_id,
    }))
}

/// Tokens are stateless; the client just drops its copy.
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        message: "Logged out successfully",
    })
}
