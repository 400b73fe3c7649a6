//! Bot Framework adapter

pub mod auth;
pub mod jwt;

use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::ExposeSecret;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::domain::entities::Activity;
use crate::domain::traits::ChannelAdapter;
use crate::application::errors::BotError;
use crate::infrastructure::config::CredentialsConfig;
use auth::{get_access_token, CachedAccessToken};
use jwt::TokenValidator;

/// Sends replies through the Bot Framework connector REST API
pub struct BotFrameworkAdapter {
    client: Client,
    credentials: CredentialsConfig,
    token_cache: Mutex<Option<CachedAccessToken>>,
    validator: TokenValidator,
}

#[derive(Deserialize)]
struct ResourceResponse {
    #[serde(default)]
    id: Option<String>,
}

impl BotFrameworkAdapter {
    pub fn new(credentials: CredentialsConfig) -> Self {
        let client = Client::new();
        Self {
            validator: TokenValidator::new(client.clone(), &credentials),
            client,
            credentials,
            token_cache: Mutex::new(None),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.credentials.is_anonymous()
    }

    /// Connector URL for posting an activity into a conversation
    fn activities_url(service_url: &str, conversation_id: &str) -> String {
        format!(
            "{}/v3/conversations/{}/activities",
            service_url.trim_end_matches('/'),
            urlencoding::encode(conversation_id)
        )
    }

    /// The access token only ever goes to connector hosts we trust
    fn check_service_url(&self, service_url: &str) -> Result<(), BotError> {
        let url = Url::parse(service_url)
            .map_err(|e| BotError::Parse(format!("Invalid serviceUrl {}: {}", service_url, e)))?;
        let host = url.host_str().unwrap_or_default();

        if self.credentials.is_trusted_host(host) {
            Ok(())
        } else {
            tracing::warn!("Refusing to send to untrusted service host {}", host);
            Err(BotError::PermissionDenied(format!("Untrusted serviceUrl host: {}", host)))
        }
    }
}

#[async_trait]
impl ChannelAdapter for BotFrameworkAdapter {
    fn name(&self) -> &str {
        "botframework"
    }

    async fn authenticate(&self, auth_header: Option<&str>) -> Result<(), BotError> {
        if self.is_anonymous() {
            return Ok(());
        }

        let token = auth_header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .unwrap_or_default();
        if token.is_empty() {
            tracing::warn!("Rejected activity without a bearer token");
            return Err(BotError::Auth("Missing bearer token".to_string()));
        }

        match self.validator.validate(token).await {
            Ok(claims) => {
                tracing::debug!("Channel token accepted (serviceurl: {:?})", claims.service_url);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Rejected activity: {}", e);
                Err(e)
            }
        }
    }

    async fn send_activity(&self, activity: &Activity) -> Result<String, BotError> {
        let service_url = activity
            .service_url
            .as_deref()
            .ok_or_else(|| BotError::Parse("Activity has no serviceUrl".to_string()))?;
        let conversation_id = activity
            .conversation_id()
            .ok_or_else(|| BotError::Parse("Activity has no conversation id".to_string()))?;

        let url = Self::activities_url(service_url, conversation_id);
        tracing::debug!("Sending to {}: {:?}", conversation_id, activity.text);

        let mut request = self.client.post(&url).json(activity);
        if !self.is_anonymous() {
            self.check_service_url(service_url)?;
            let token = get_access_token(&self.client, &self.credentials, &self.token_cache).await?;
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BotError::Network(format!("Connector error ({}): {}", status, body)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(String::new());
        }
        let resource: ResourceResponse = serde_json::from_str(&body)
            .map_err(|e| BotError::Network(format!("Invalid connector response: {}", e)))?;

        Ok(resource.id.unwrap_or_default())
    }
}
