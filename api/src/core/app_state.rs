use std::sync::Arc;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use git_context_engine::{GitHubClient, GitHubOAuth, ProviderConfig};
use pr_reviewer::Pipeline;
use rag_store::{EMBEDDING_DIM, EmbeddingsProvider, LlmEmbedder, RagConfig, RagStore};
use review_store::{AuthConfig, JwtManager, ReviewStore};
use tracing::info;

use crate::core::config::{AppConfig, GITHUB_WEB_BASE};
use crate::error_handler::AppError;

/// Shared state for all HTTP handlers. Every client is built once here.
pub struct AppState {
    pub config: AppConfig,
    pub pipeline: Arc<Pipeline>,
    pub rag: Arc<RagStore>,
    /// Repository discovery for embedding jobs.
    pub github: Arc<GitHubClient>,
    pub store: ReviewStore,
    pub jwt: JwtManager,
    pub oauth: Option<GitHubOAuth>,
}

impl AppState {
    /// Wires every collaborator from environment variables.
    pub async fn from_env() -> Result<Self, AppError> {
        let config = AppConfig::from_env();

        let llm = Arc::new(LlmServiceProfiles::from_env().map_err(startup)?);

        let provider_cfg = ProviderConfig::from_env().map_err(startup)?;
        let github = Arc::new(GitHubClient::from_config(&provider_cfg).map_err(startup)?);

        let embedder: Arc<dyn EmbeddingsProvider> =
            Arc::new(LlmEmbedder::new(llm.clone(), EMBEDDING_DIM));
        let rag = Arc::new(RagStore::from_config(RagConfig::from_env(), embedder));

        let store = ReviewStore::open(&config.database_url).await?;
        let jwt = JwtManager::new(&AuthConfig::from_env()?);

        let oauth = config
            .oauth
            .as_ref()
            .map(|o| {
                GitHubOAuth::build(
                    GITHUB_WEB_BASE,
                    provider_cfg.base_api.as_str(),
                    o.client_id.as_str(),
                    o.client_secret.as_str(),
                    o.redirect_uri.as_str(),
                )
            })
            .transpose()
            .map_err(startup)?;
        if oauth.is_none() {
            info!("GitHub OAuth not configured; login routes disabled");
        }

        let pipeline = Arc::new(Pipeline::new(github.clone(), rag.clone(), llm, store.clone()));

        Ok(Self {
            config,
            pipeline,
            rag,
            github,
            store,
            jwt,
            oauth,
        })
    }

    /// User id carried by `token`, or `None` when absent or invalid.
    pub fn optional_user_id(&self, token: Option<&str>) -> Option<i64> {
        let token = token.filter(|t| !t.trim().is_empty())?;
        self.jwt.verify(token).ok()?.user_id().ok()
    }
}

fn startup(e: impl std::fmt::Display) -> AppError {
    AppError::Startup(e.to_string())
}
