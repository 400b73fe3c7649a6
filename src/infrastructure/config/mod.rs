//! Configuration management

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub server: ServerConfig,
    pub bot: BotConfig,
    pub credentials: CredentialsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
}

/// Bot Framework app registration. An empty app id runs without auth (emulator mode).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CredentialsConfig {
    pub app_id: String,
    #[serde(serialize_with = "serialize_secret")]
    pub app_password: Secret<String>,
    pub oauth_tenant: String,
    pub oauth_scope: String,
    pub login_endpoint: String,
    /// OpenID document listing the keys that sign inbound channel tokens
    pub openid_metadata_url: String,
    pub token_issuer: String,
    /// Extra connector hosts allowed to receive the bot's access token
    pub trusted_service_hosts: Vec<String>,
}

/// Connector hosts operated by the Bot Framework; subdomains included
const BUILTIN_TRUSTED_HOSTS: &[&str] = &["botframework.com", "smba.trafficmanager.net"];

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3978,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "echo-bot".to_string(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            app_password: Secret::new(String::new()),
            oauth_tenant: "botframework.com".to_string(),
            oauth_scope: "https://api.botframework.com/.default".to_string(),
            login_endpoint: "https://login.microsoftonline.com".to_string(),
            openid_metadata_url: "https://login.botframework.com/v1/.well-known/openidconfiguration"
                .to_string(),
            token_issuer: "https://api.botframework.com".to_string(),
            trusted_service_hosts: Vec::new(),
        }
    }
}

impl CredentialsConfig {
    pub fn is_anonymous(&self) -> bool {
        self.app_id.is_empty()
    }

    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_endpoint.trim_end_matches('/'),
            self.oauth_tenant
        )
    }

    /// Whether `host` may receive the bot's connector access token
    pub fn is_trusted_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        BUILTIN_TRUSTED_HOSTS
            .iter()
            .copied()
            .chain(self.trusted_service_hosts.iter().map(String::as_str))
            .map(|trusted| trusted.trim_start_matches("*.").to_ascii_lowercase())
            .any(|trusted| host == trusted || host.ends_with(&format!(".{}", trusted)))
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(app_id) = lookup("MICROSOFT_APP_ID") {
            self.credentials.app_id = app_id;
        }

        if let Some(password) = lookup("MICROSOFT_APP_PASSWORD") {
            self.credentials.app_password = Secret::new(password);
        }

        if let Some(host) = lookup("BOT_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("BOT_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidValue(format!("BOT_PORT: {}", port)))?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::MissingField("server.host".to_string()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port must be non-zero".to_string()));
        }
        if self.credentials.is_anonymous() && !self.credentials.app_password.expose_secret().is_empty() {
            return Err(ConfigError::MissingField("credentials.app-id".to_string()));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_listen_on_local_port_3978_anonymously() {
        let config = Config::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:3978");
        assert!(config.credentials.is_anonymous());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config = Config::from_yaml(
            "server:\n  port: 8080\ncredentials:\n  app-id: abc\n  app-password: s3cret\n",
        )
        .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.credentials.app_id, "abc");
        assert_eq!(config.credentials.app_password.expose_secret(), "s3cret");
        assert_eq!(config.credentials.oauth_tenant, "botframework.com");
    }

    #[test]
    fn yaml_round_trip_keeps_password() {
        let mut config = Config::default();
        config.credentials.app_password = Secret::new("pw".to_string());
        let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed.credentials.app_password.expose_secret(), "pw");
    }

    #[test]
    fn debug_output_redacts_password() {
        let mut config = Config::default();
        config.credentials.app_password = Secret::new("hunter2".to_string());
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn env_overrides_credentials_and_address() {
        let mut config = Config::default();
        config
            .apply_overrides(env(&[
                ("MICROSOFT_APP_ID", "app"),
                ("MICROSOFT_APP_PASSWORD", "pw"),
                ("BOT_HOST", "0.0.0.0"),
                ("BOT_PORT", "4000"),
            ]))
            .unwrap();

        assert_eq!(config.credentials.app_id, "app");
        assert_eq!(config.credentials.app_password.expose_secret(), "pw");
        assert_eq!(config.bind_addr(), "0.0.0.0:4000");
    }

    #[test]
    fn invalid_port_env_is_rejected() {
        let mut config = Config::default();
        let err = config.apply_overrides(env(&[("BOT_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.host = " ".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.credentials.app_password = Secret::new("orphan".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn trusted_hosts_cover_bot_framework_and_configured_hosts() {
        let mut creds = CredentialsConfig::default();
        assert!(creds.is_trusted_host("smba.trafficmanager.net"));
        assert!(creds.is_trusted_host("europe.webchat.botframework.com"));
        assert!(creds.is_trusted_host("BotFramework.com"));
        assert!(!creds.is_trusted_host("botframework.com.evil.example"));
        assert!(!creds.is_trusted_host("evilbotframework.com"));
        assert!(!creds.is_trusted_host("127.0.0.1"));

        creds.trusted_service_hosts = vec!["*.gov.teams.microsoft.us".into(), "127.0.0.1".into()];
        assert!(creds.is_trusted_host("smba.gov.teams.microsoft.us"));
        assert!(creds.is_trusted_host("127.0.0.1"));
    }

    #[test]
    fn trusted_hosts_load_from_yaml() {
        let config = Config::from_yaml(
            "credentials:\n  trusted-service-hosts:\n    - connector.internal\n",
        )
        .unwrap();
        assert!(config.credentials.is_trusted_host("connector.internal"));
        assert_eq!(config.credentials.token_issuer, "https://api.botframework.com");
    }

    #[test]
    fn token_url_uses_tenant() {
        let mut creds = CredentialsConfig::default();
        creds.login_endpoint = "http://127.0.0.1:9000/".to_string();
        assert_eq!(
            creds.token_url(),
            "http://127.0.0.1:9000/botframework.com/oauth2/v2.0/token"
        );
    }
}
