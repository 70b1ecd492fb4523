//! Process configuration, read once at startup from the environment
//! (a `.env` file is loaded by `main` through dotenvy before this runs).

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PUBLIC_DIR: &str = "public";
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("N8N_WEBHOOK_URL environment variable is not set")]
    MissingWebhookUrl,
    #[error("N8N_WEBHOOK_URL is not a valid URL: {0}")]
    InvalidWebhookUrl(String),
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Base n8n webhook URL; the user message is appended as `?message=`.
    pub webhook_url: String,
    pub port: u16,
    /// Directory for the activity store. `None` disables activity logging.
    pub log_dir: Option<PathBuf>,
    /// Key expected in `x-admin-key`. Admin routes are closed without it.
    pub admin_key: Option<String>,
    pub public_dir: PathBuf,
    pub webhook_timeout: Duration,
}

impl Config {
    /// Config with defaults for everything except the webhook URL.
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            port: DEFAULT_PORT,
            log_dir: None,
            admin_key: None,
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            webhook_timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let webhook_url = var("N8N_WEBHOOK_URL").ok_or(ConfigError::MissingWebhookUrl)?;
        Url::parse(&webhook_url).map_err(|e| ConfigError::InvalidWebhookUrl(e.to_string()))?;

        let mut config = Self::new(webhook_url);

        if let Some(port) = var("PORT") {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::InvalidNumber { name: "PORT", value: port })?;
        }
        if let Some(secs) = var("WEBHOOK_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::InvalidNumber {
                name: "WEBHOOK_TIMEOUT_SECS",
                value: secs,
            })?;
            config.webhook_timeout = Duration::from_secs(secs);
        }
        config.log_dir = var("LOG_DIR").map(PathBuf::from);
        config.admin_key = var("ADMIN_KEY");
        if let Some(dir) = var("PUBLIC_DIR") {
            config.public_dir = PathBuf::from(dir);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_webhook_url_is_fatal() {
        let err = Config::from_lookup(lookup(&[("PORT", "8080")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingWebhookUrl));

        let err = Config::from_lookup(lookup(&[("N8N_WEBHOOK_URL", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingWebhookUrl));
    }

    #[test]
    fn invalid_webhook_url_is_rejected() {
        let err = Config::from_lookup(lookup(&[("N8N_WEBHOOK_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWebhookUrl(_)));
    }

    #[test]
    fn defaults_apply() {
        let config =
            Config::from_lookup(lookup(&[("N8N_WEBHOOK_URL", "http://localhost:5678/webhook/chat")]))
                .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.webhook_timeout, Duration::from_secs(30));
        assert!(config.log_dir.is_none());
        assert!(config.admin_key.is_none());
        assert_eq!(config.public_dir, PathBuf::from("public"));
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            ("N8N_WEBHOOK_URL", "http://localhost:5678/webhook/chat"),
            ("PORT", "8080"),
            ("LOG_DIR", "/tmp/relay"),
            ("ADMIN_KEY", "s3cret"),
            ("WEBHOOK_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/relay")));
        assert_eq!(config.admin_key.as_deref(), Some("s3cret"));
        assert_eq!(config.webhook_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("N8N_WEBHOOK_URL", "http://localhost:5678/webhook/chat"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { name: "PORT", .. }));
    }
}
