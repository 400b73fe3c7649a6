//! Validation of the bearer tokens the Bot Framework channel service attaches
//! to inbound activities

use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::application::errors::BotError;
use crate::infrastructure::config::CredentialsConfig;

/// Signing keys are refetched after this long
const KEYS_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Allowed clock skew when checking `exp` / `nbf`
const CLOCK_SKEW_SECS: u64 = 300;

#[derive(Debug, Deserialize)]
struct OpenIdMetadata {
    jwks_uri: String,
}

#[derive(Debug, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    #[serde(default)]
    kid: Option<String>,
    n: String,
    e: String,
}

struct CachedKeys {
    keys: Vec<Jwk>,
    fetched_at: Instant,
}

/// Claims the channel service puts in its tokens
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelClaims {
    #[serde(default, rename = "serviceurl")]
    pub service_url: Option<String>,
}

/// Checks RS256 channel tokens against the published OpenID signing keys
pub struct TokenValidator {
    client: reqwest::Client,
    metadata_url: String,
    issuer: String,
    audience: String,
    keys: Mutex<Option<CachedKeys>>,
}

impl TokenValidator {
    pub fn new(client: reqwest::Client, credentials: &CredentialsConfig) -> Self {
        Self {
            client,
            metadata_url: credentials.openid_metadata_url.clone(),
            issuer: credentials.token_issuer.clone(),
            audience: credentials.app_id.clone(),
            keys: Mutex::new(None),
        }
    }

    /// Verify signature, issuer, audience and lifetime of a channel token
    pub async fn validate(&self, token: &str) -> Result<ChannelClaims, BotError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| BotError::Auth(format!("Malformed token: {}", e)))?;
        if header.alg != Algorithm::RS256 {
            return Err(BotError::Auth(format!("Unsupported token algorithm {:?}", header.alg)));
        }
        let kid = header
            .kid
            .ok_or_else(|| BotError::Auth("Token has no key id".to_string()))?;

        let jwk = match self.find_key(&kid, false).await? {
            Some(jwk) => jwk,
            // Key rotation: refresh once before giving up
            None => self
                .find_key(&kid, true)
                .await?
                .ok_or_else(|| BotError::Auth(format!("Unknown signing key {}", kid)))?,
        };

        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
            .map_err(|e| BotError::Network(format!("Invalid signing key {}: {}", kid, e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let data = jsonwebtoken::decode::<ChannelClaims>(token, &key, &validation)
            .map_err(|e| BotError::Auth(format!("Token rejected: {}", e)))?;
        Ok(data.claims)
    }

    async fn find_key(&self, kid: &str, force_refresh: bool) -> Result<Option<Jwk>, BotError> {
        let mut cache = self.keys.lock().await;
        let stale = cache
            .as_ref()
            .map_or(true, |c| c.fetched_at.elapsed() > KEYS_TTL);

        if force_refresh || stale {
            let keys = self.fetch_keys().await?;
            tracing::debug!("Loaded {} channel signing keys", keys.len());
            *cache = Some(CachedKeys {
                keys,
                fetched_at: Instant::now(),
            });
        }

        Ok(cache
            .as_ref()
            .and_then(|c| c.keys.iter().find(|k| k.kid.as_deref() == Some(kid)))
            .cloned())
    }

    async fn fetch_keys(&self) -> Result<Vec<Jwk>, BotError> {
        let metadata: OpenIdMetadata = self.get_json(&self.metadata_url).await?;
        let set: JwkSet = self.get_json(&metadata.jwks_uri).await?;
        Ok(set.keys)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, BotError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "OpenID request to {} failed: {}",
                url,
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| BotError::Network(format!("Invalid OpenID document from {}: {}", url, e)))
    }
}
