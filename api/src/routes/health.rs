use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::app_state::AppState;

pub const APP_NAME: &str = "CodeAssure";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub status: &'static str,
    pub app: &'static str,
    pub message: &'static str,
    pub docs: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app: &'static str,
}

/// Whether the credentials the review pipeline needs look real.
#[derive(Debug, Serialize)]
pub struct ServicesHealthResponse {
    pub groq_configured: bool,
    pub github_configured: bool,
}

pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "running",
        app: APP_NAME,
        message: "AI Code Review Assistant",
        docs: "/docs",
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        app: APP_NAME,
    })
}

pub async fn services_health(State(state): State<Arc<AppState>>) -> Json<ServicesHealthResponse> {
    Json(ServicesHealthResponse {
        groq_configured: state.config.llm_configured,
        github_configured: state.config.github_configured,
    })
}
