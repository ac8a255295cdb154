use std::{error::Error, sync::Arc};

mod core;
mod error_handler;
mod routes;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post},
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::{
    core::{app_state::AppState, config::DEFAULT_FRONTEND_URL},
    error_handler::AppError,
    routes::{auth, embeddings, health, manual_review, reviews, webhooks::github_webhook_route},
};

pub async fn start() -> Result<(), Box<dyn Error>> {
    let state = Arc::new(AppState::from_env().await?);
    let host_url = state.config.api_address.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, "CodeAssure API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.frontend_url);

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/api/webhooks/github", post(github_webhook_route::github_webhook))
        .route("/api/webhooks/test", get(github_webhook_route::webhook_test))
        .route("/api/test/manual-review", post(manual_review::manual_review))
        .route("/api/test/health", get(health::services_health))
        .route("/api/embeddings/embed-repository", post(embeddings::embed_repository))
        .route("/api/embeddings/embedding-status", get(embeddings::embedding_status))
        .route("/api/reviews", get(reviews::list_reviews))
        .route("/api/reviews/{review_id}", get(reviews::get_review))
        .route("/api/auth/login", get(auth::login))
        .route("/api/auth/callback", get(auth::callback))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/logout", post(auth::logout))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Credentialed CORS for the dashboard origin only.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    let origin = HeaderValue::from_str(frontend_url).unwrap_or_else(|_| {
        warn!(frontend_url, "FRONTEND_URL is not a valid origin; using default");
        HeaderValue::from_static(DEFAULT_FRONTEND_URL)
    });

    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
