use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use review_store::Review;
use serde::{Deserialize, Serialize};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
    pub count: usize,
}

/// The caller's reviews when `token` is valid, everyone's otherwise.
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ReviewsQuery>, QueryRejection>,
) -> AppResult<Json<ReviewsResponse>> {
    let Query(q) = query?;
    let user_id = state.optional_user_id(q.token.as_deref());

    let reviews = state.store.list_reviews(user_id).await?;
    Ok(Json(ReviewsResponse {
        count: reviews.len(),
        reviews,
    }))
}

pub async fn get_review(
    State(state): State<Arc<AppState>>,
    Path(review_id): Path<i64>,
) -> AppResult<Json<Review>> {
    state
        .store
        .get_review(review_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Review not found".into()))
}
