//! Service-account credentials for the Analytics Reporting API.
//!
//! Signs an RS256 JWT with the key file's private key and trades it for a
//! bearer token at the key's `token_uri`. The token is reused until shortly
//! before it expires.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::BotError;

pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The subset of a Google service-account JSON key the bot uses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// # Errors
    ///
    /// Returns `BotError::ConfigError` if the key file is unreadable or malformed.
    pub fn from_file(path: &Path) -> Result<Self, BotError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            BotError::ConfigError(format!("cannot read key file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            BotError::ConfigError(format!("invalid key file {}: {}", path.display(), e))
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    scope: String,
    http: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    #[must_use]
    pub fn new(key: ServiceAccountKey, http: Client) -> Self {
        Self {
            key,
            scope: ANALYTICS_READONLY_SCOPE.to_string(),
            http,
            cached: Mutex::new(None),
        }
    }

    /// Signs the bearer-grant assertion issued at `issued_at` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns `BotError::AuthError` if the private key cannot sign.
    pub fn build_assertion(&self, issued_at: i64) -> Result<String, BotError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.key.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();
        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;

        Ok(encode(&header, &claims, &signing_key)?)
    }

    /// Returns a bearer token, exchanging a fresh assertion when needed.
    ///
    /// # Errors
    ///
    /// Returns `BotError::AuthError` if Google rejects the assertion.
    pub async fn access_token(&self) -> Result<String, BotError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let assertion = self.build_assertion(chrono::Utc::now().timestamp())?;
        let resp = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BotError::AuthError(format!(
                "token exchange returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = resp.json().await?;
        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(3600));
        debug!("Obtained analytics access token valid for {:?}", lifetime);

        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(token.access_token)
    }
}
