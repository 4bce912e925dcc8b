//! OAuth credential provider
//!
//! Loads a stored user token (access + refresh token plus client secrets)
//! and refreshes it on demand against the Google token endpoint. Refresh is
//! single-flight: the token state sits behind an async mutex, so concurrent
//! callers of [`TokenProvider::bearer`] never race a double refresh. A
//! refreshed token is written back to the store file, matching how the
//! original authorization flow maintains it.
//!
//! Acquiring the token in the first place (browser consent flow) is out of
//! scope; the file is provisioned externally.

use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{GoogleError, Result};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Skew applied when checking expiry, so a token is refreshed slightly early
const EXPIRY_SKEW_SECS: i64 = 60;

/// Stored OAuth token, in the shape the Google authorization flow writes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// Current access token
    pub token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Access-token expiry, RFC 3339
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl StoredToken {
    /// True when the access token is missing, expired, or about to expire
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        if self.token.is_empty() {
            return true;
        }
        match self.expiry {
            Some(expiry) => now + Duration::seconds(EXPIRY_SKEW_SECS) >= expiry,
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

/// Process-wide credential provider with refresh-on-demand
pub struct TokenProvider {
    http: Client,
    token_path: PathBuf,
    state: Mutex<StoredToken>,
}

impl TokenProvider {
    /// Load the stored token from a file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let token_path = path.into();
        let content = std::fs::read_to_string(&token_path).map_err(|e| {
            GoogleError::TokenStore(format!(
                "Failed to read token file {}: {}",
                token_path.display(),
                e
            ))
        })?;
        let token: StoredToken = serde_json::from_str(&content)
            .map_err(|e| GoogleError::TokenStore(format!("Invalid token file: {}", e)))?;

        if token.refresh_token.is_empty() {
            return Err(GoogleError::TokenStore(
                "Token file has no refresh token".to_string(),
            ));
        }

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        info!("Credential store loaded from {}", token_path.display());

        Ok(Self {
            http,
            token_path,
            state: Mutex::new(token),
        })
    }

    /// Get a valid bearer token, refreshing first if expired.
    pub async fn bearer(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        if state.needs_refresh(Utc::now()) {
            debug!("Access token expired, refreshing");
            self.refresh(&mut state).await?;
        }

        Ok(state.token.clone())
    }

    /// Exchange the refresh token for a new access token and persist it.
    async fn refresh(&self, state: &mut StoredToken) -> Result<()> {
        let params = [
            ("client_id", state.client_id.as_str()),
            ("client_secret", state.client_secret.as_str()),
            ("refresh_token", state.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http
            .post(&state.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GoogleError::Connection(e.to_string()))?;

        if !status.is_success() {
            warn!("Token refresh failed: {} - {}", status, body);
            return Err(GoogleError::Auth(format!(
                "Token refresh failed ({}): {}",
                status, body
            )));
        }

        let refreshed: RefreshResponse = serde_json::from_str(&body)
            .map_err(|e| GoogleError::Auth(format!("Invalid token response: {}", e)))?;

        state.token = refreshed.access_token;
        state.expiry = Some(Utc::now() + Duration::seconds(refreshed.expires_in));

        // Persist so the next process start reuses the fresh token
        if let Err(e) = std::fs::write(&self.token_path, serde_json::to_string_pretty(&*state)?) {
            warn!("Failed to persist refreshed token: {}", e);
        }

        info!("Access token refreshed");
        Ok(())
    }
}
