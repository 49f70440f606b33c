//! Configuration for the sending client and the webhook receiver.
//!
//! Values come from the environment (and a `.env` file in development) with
//! the `MAIL_LANE` prefix; nested keys are separated by `__`, e.g.
//! `MAIL_LANE__RECEIVER__WEBHOOK_SECRET` or `MAIL_LANE__CLIENT__API_KEY`.

use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use thiserror::Error;

const ENV_PREFIX: &str = "MAIL_LANE";
pub const MAX_RECENT_EVENTS: usize = 10_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub receiver: ReceiverConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env_source(None)
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_env_source(Some(vars))
    }

    fn from_env_source(vars: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .source(vars),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiverConfig {
    #[serde(default)]
    pub webhook_secret: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// How many accepted events `GET /events` can return.
    #[serde(default = "default_recent_events")]
    pub recent_events: usize,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}
fn default_recent_events() -> usize {
    50
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            webhook_secret: String::new(),
            host: default_host(),
            port: default_port(),
            recent_events: default_recent_events(),
        }
    }
}

impl ReceiverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.webhook_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("MAIL_LANE__RECEIVER__WEBHOOK_SECRET"));
        }
        if self.recent_events == 0 || self.recent_events > MAX_RECENT_EVENTS {
            return Err(ConfigError::Invalid {
                field: "recent_events",
                reason: format!("must be between 1 and {MAX_RECENT_EVENTS}"),
            });
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                field: "host",
                reason: format!("{e}"),
            })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.mail-lane.dev".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Point the client somewhere else (a sandbox or a test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired("MAIL_LANE__CLIENT__API_KEY"));
        }
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ConfigError::Invalid {
                field: "base_url",
                reason: format!("not an http(s) URL: {}", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_vars(HashMap::new()).unwrap();
        assert_eq!(config.receiver.host, "127.0.0.1");
        assert_eq!(config.receiver.port, 8080);
        assert_eq!(config.receiver.recent_events, 50);
        assert_eq!(config.client.base_url, "https://api.mail-lane.dev");
        assert_eq!(config.client.timeout_secs, 30);
    }

    #[test]
    fn reads_prefixed_nested_values() {
        let config = AppConfig::from_vars(vars(&[
            ("MAIL_LANE__RECEIVER__WEBHOOK_SECRET", "whsec_env"),
            ("MAIL_LANE__RECEIVER__PORT", "9000"),
            ("MAIL_LANE__CLIENT__API_KEY", "ml_key"),
        ]))
        .unwrap();
        assert_eq!(config.receiver.webhook_secret, "whsec_env");
        assert_eq!(config.receiver.port, 9000);
        assert_eq!(config.client.api_key, "ml_key");
        assert!(config.receiver.validate().is_ok());
        assert!(config.client.validate().is_ok());
    }

    #[test]
    fn receiver_requires_secret() {
        let err = ReceiverConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }

    #[test]
    fn receiver_rejects_empty_history_and_bad_host() {
        let config = ReceiverConfig {
            webhook_secret: "s".into(),
            recent_events: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "recent_events", .. })
        ));

        let config = ReceiverConfig {
            webhook_secret: "s".into(),
            host: "not a host".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "host", .. })
        ));
    }

    #[test]
    fn receiver_bounds_event_history() {
        let at_limit = ReceiverConfig {
            webhook_secret: "s".into(),
            recent_events: MAX_RECENT_EVENTS,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        let config = AppConfig::from_vars(vars(&[
            ("MAIL_LANE__RECEIVER__WEBHOOK_SECRET", "s"),
            ("MAIL_LANE__RECEIVER__RECENT_EVENTS", "10001"),
        ]))
        .unwrap();
        assert!(matches!(
            config.receiver.validate(),
            Err(ConfigError::Invalid { field: "recent_events", .. })
        ));

        let huge = ReceiverConfig {
            webhook_secret: "s".into(),
            recent_events: usize::MAX,
            ..Default::default()
        };
        assert!(matches!(
            huge.validate(),
            Err(ConfigError::Invalid { field: "recent_events", .. })
        ));
    }

    #[test]
    fn client_validation() {
        assert!(matches!(
            ClientConfig::default().validate(),
            Err(ConfigError::MissingRequired(_))
        ));
        assert!(ClientConfig::new("key")
            .with_base_url("ftp://example.com")
            .validate()
            .is_err());
        assert!(ClientConfig::new("key").validate().is_ok());
    }
}
