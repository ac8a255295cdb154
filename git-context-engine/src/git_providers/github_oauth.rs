//! GitHub OAuth web flow: authorize URL, code exchange and account lookup.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::errors::{GitContextEngineProviderError, GitContextEngineResult};
use crate::git_providers::http_client;
use crate::git_providers::types::GitHubAccount;

/// Scopes requested at login.
const OAUTH_SCOPES: &str = "repo,read:user,user:email";

/// OAuth app credentials plus the two GitHub hosts involved.
#[derive(Debug, Clone)]
pub struct GitHubOAuth {
    http: Client,
    /// Web host serving `/login/oauth/*`, e.g. `https://github.com`.
    web_base: String,
    /// REST API base, e.g. `https://api.github.com`.
    api_base: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GitHubOAuth {
    pub fn new(
        http: Client,
        web_base: impl Into<String>,
        api_base: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            http,
            web_base: web_base.into().trim_end_matches('/').to_string(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Same as [`GitHubOAuth::new`] over a client that sends the user agent.
    pub fn build(
        web_base: impl Into<String>,
        api_base: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> GitContextEngineResult<Self> {
        Ok(Self::new(http_client()?, web_base, api_base, client_id, client_secret, redirect_uri))
    }

    /// URL the browser is redirected to for consent.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}/login/oauth/authorize?client_id={}&redirect_uri={}&scope={}",
            self.web_base,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
        )
    }

    /// Exchanges the callback `code` for a user access token.
    ///
    /// GitHub reports bad codes with `200 {"error", "error_description"}`;
    /// those surface as `InvalidResponse` carrying the description.
    pub async fn exchange_code(&self, code: &str) -> GitContextEngineResult<String> {
        let url = format!("{}/login/oauth/access_token", self.web_base);
        debug!("GitHub OAuth exchange: {}", url);

        let resp: TokenResponse = self
            .http
            .post(url)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = resp.error {
            let reason = resp.error_description.unwrap_or(err);
            warn!(%reason, "GitHub OAuth code exchange rejected");
            return Err(GitContextEngineProviderError::InvalidResponse(reason).into());
        }

        resp.access_token.ok_or_else(|| {
            GitContextEngineProviderError::InvalidResponse("OAuth failed".into()).into()
        })
    }

    /// Profile of the token owner, with the primary email filled in.
    pub async fn fetch_account(&self, access_token: &str) -> GitContextEngineResult<GitHubAccount> {
        let auth = format!("Bearer {access_token}");

        let mut account: GitHubAccount = self
            .http
            .get(format!("{}/user", self.api_base))
            .header("Authorization", &auth)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let emails: Vec<GitHubEmail> = self
            .http
            .get(format!("{}/user/emails", self.api_base))
            .header("Authorization", &auth)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        account.email = emails.into_iter().find(|e| e.primary).map(|e| e.email);
        Ok(account)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GitHubEmail {
    email: String,
    #[serde(default)]
    primary: bool,
}
