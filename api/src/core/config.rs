//! HTTP-layer settings read from the environment once at startup.

use std::env;

pub const DEFAULT_API_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_DATABASE_URL: &str = "codeassure.db";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8000/api/auth/callback";
pub const GITHUB_WEB_BASE: &str = "https://github.com";

/// GitHub OAuth app credentials. Absent when the client id or secret is unset.
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

impl OAuthConfig {
    pub fn from_env() -> Option<Self> {
        let client_id = non_empty("GITHUB_CLIENT_ID")?;
        let client_secret = non_empty("GITHUB_CLIENT_SECRET")?;
        Some(Self {
            client_id,
            client_secret,
            redirect_uri: non_empty("GITHUB_REDIRECT_URI")
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_address: String,
    pub database_url: String,
    /// Dashboard origin; also the OAuth landing page.
    pub frontend_url: String,
    pub llm_configured: bool,
    pub github_configured: bool,
    pub oauth: Option<OAuthConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            api_address: non_empty("API_ADDRESS").unwrap_or_else(|| DEFAULT_API_ADDRESS.into()),
            database_url: non_empty("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
            frontend_url: non_empty("FRONTEND_URL")
                .unwrap_or_else(|| DEFAULT_FRONTEND_URL.into())
                .trim_end_matches('/')
                .to_string(),
            llm_configured: is_real_secret(env::var("GROQ_API_KEY").ok(), "your_groq_api_key_here"),
            github_configured: is_real_secret(env::var("GITHUB_TOKEN").ok(), "your_github_token_here"),
            oauth: OAuthConfig::from_env(),
        }
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Set, non-empty and not the `.env.example` placeholder.
pub fn is_real_secret(value: Option<String>, placeholder: &str) -> bool {
    value.is_some_and(|v| !v.trim().is_empty() && v != placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_not_secrets() {
        assert!(!is_real_secret(None, "x"));
        assert!(!is_real_secret(Some("".into()), "x"));
        assert!(!is_real_secret(Some("your_groq_api_key_here".into()), "your_groq_api_key_here"));
        assert!(is_real_secret(Some("gsk_123".into()), "your_groq_api_key_here"));
    }
}
