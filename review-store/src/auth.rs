//! Signed session tokens handed to the dashboard after login.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{StoreError, StoreResult};

/// Seven days.
pub const DEFAULT_EXPIRE_MINUTES: i64 = 10_080;

/// Token signing settings.
#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expire_minutes: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"***")
            .field("expire_minutes", &self.expire_minutes)
            .finish()
    }
}

impl AuthConfig {
    /// Reads `JWT_SECRET_KEY` (required) and `ACCESS_TOKEN_EXPIRE_MINUTES`.
    pub fn from_env() -> StoreResult<Self> {
        let secret = std::env::var("JWT_SECRET_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or(StoreError::MissingVar("JWT_SECRET_KEY"))?;

        let expire_minutes = match std::env::var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Ok(raw) => raw.trim().parse::<i64>().map_err(|_| StoreError::InvalidNumber {
                var: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: raw,
            })?,
            Err(_) => DEFAULT_EXPIRE_MINUTES,
        };

        Ok(Self {
            secret,
            expire_minutes,
        })
    }
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a decimal string.
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

impl Claims {
    pub fn new(user_id: i64, username: impl Into<String>, expires_in_minutes: i64) -> Self {
        let exp = (chrono::Utc::now() + chrono::Duration::minutes(expires_in_minutes)).timestamp();
        Self {
            sub: user_id.to_string(),
            username: username.into(),
            exp: exp.max(0) as usize,
        }
    }

    pub fn user_id(&self) -> StoreResult<i64> {
        self.sub
            .parse()
            .map_err(|_| StoreError::InvalidSubject(self.sub.clone()))
    }
}

/// Issues and verifies HS256 tokens.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expire_minutes: i64,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("expire_minutes", &self.expire_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    pub fn new(cfg: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            expire_minutes: cfg.expire_minutes,
        }
    }

    pub fn issue(&self, user_id: i64, username: &str) -> StoreResult<String> {
        let claims = Claims::new(user_id, username, self.expire_minutes);
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Decodes a token; bad signatures and expired tokens are errors.
    pub fn verify(&self, token: &str) -> StoreResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .inspect_err(|e| debug!(error = %e, "token rejected"))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(secret: &str, minutes: i64) -> JwtManager {
        JwtManager::new(&AuthConfig {
            secret: secret.into(),
            expire_minutes: minutes,
        })
    }

    #[test]
    fn issued_token_verifies() {
        let jwt = manager("s3cret", DEFAULT_EXPIRE_MINUTES);
        let token = jwt.issue(12, "octo").unwrap();
        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.username, "octo");
        assert_eq!(claims.user_id().unwrap(), 12);
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = manager("one", 60).issue(1, "a").unwrap();
        assert!(manager("two", 60).verify(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = manager("s3cret", -120);
        let token = jwt.issue(1, "a").unwrap();
        assert!(jwt.verify(&token).is_err());
    }

    #[test]
    fn garbage_subject_is_an_error() {
        let claims = Claims {
            sub: "abc".into(),
            username: "a".into(),
            exp: 0,
        };
        assert!(matches!(claims.user_id(), Err(StoreError::InvalidSubject(_))));
    }
}
