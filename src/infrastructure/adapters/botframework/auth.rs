//! Client-credentials access tokens for the Bot Framework connector

use std::time::{Duration, Instant};

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::infrastructure::config::CredentialsConfig;

/// Tokens are refreshed this long before they expire
const REFRESH_SKEW: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct CachedAccessToken {
    pub token: Secret<String>,
    pub expires_at: Instant,
}

impl CachedAccessToken {
    fn is_valid(&self) -> bool {
        self.expires_at > Instant::now() + REFRESH_SKEW
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<u64>,
}

/// Return a cached token, or fetch a new one from the login endpoint
pub async fn get_access_token(
    client: &reqwest::Client,
    credentials: &CredentialsConfig,
    cache: &Mutex<Option<CachedAccessToken>>,
) -> Result<Secret<String>, BotError> {
    let mut guard = cache.lock().await;
    if let Some(token) = guard.as_ref().filter(|t| t.is_valid()) {
        return Ok(token.token.clone());
    }

    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", credentials.app_id.as_str()),
        ("client_secret", credentials.app_password.expose_secret().as_str()),
        ("scope", credentials.oauth_scope.as_str()),
    ];

    let response = client
        .post(credentials.token_url())
        .form(&form)
        .send()
        .await
        .map_err(|e| BotError::Network(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(BotError::Network(format!("Token request failed ({}): {}", status, body)));
    }

    let body: TokenResponse = response
        .json()
        .await
        .map_err(|e| BotError::Network(format!("Invalid token response: {}", e)))?;

    let ttl = body.expires_in.unwrap_or(3600).max(120);
    let cached = CachedAccessToken {
        token: Secret::new(body.access_token),
        expires_at: Instant::now() + Duration::from_secs(ttl),
    };
    let token = cached.token.clone();
    *guard = Some(cached);

    tracing::debug!("Fetched connector access token (expires in {}s)", ttl);
    Ok(token)
}
