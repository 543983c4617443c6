use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub webhook_secret: Option<String>,
    pub n8n_webhook_url: Option<String>,
    pub notifier_timeout_secs: u64,
    pub integration_rps: u32,
    pub public_rps: u32,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_source(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let log_format = match optional("LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            server_address: get_env(&lookup, "SERVER_ADDRESS")?,
            database_url: optional("DATABASE_URL"),
            jwt_secret: get_env(&lookup, "JWT_SECRET")?,
            webhook_secret: optional("WEBHOOK_SECRET"),
            n8n_webhook_url: optional("N8N_WEBHOOK_URL"),
            notifier_timeout_secs: get_env_parse_or(&lookup, "NOTIFIER_TIMEOUT_SECS", 10)?,
            integration_rps: get_env_parse_or(&lookup, "INTEGRATION_RPS", 100)?,
            public_rps: get_env_parse_or(&lookup, "PUBLIC_RPS", 20)?,
            log_format,
        })
    }
}

fn get_env<F>(lookup: &F, name: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        None => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn applies_defaults_for_optional_keys() {
        let config = Config::from_source(source(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
        ]))
        .expect("config");

        assert_eq!(config.database_url, None);
        assert_eq!(config.n8n_webhook_url, None);
        assert_eq!(config.notifier_timeout_secs, 10);
        assert_eq!(config.public_rps, 20);
        assert_eq!(config.integration_rps, 100);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn blank_optional_values_are_treated_as_unset() {
        let config = Config::from_source(source(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("N8N_WEBHOOK_URL", "   "),
            ("LOG_FORMAT", "json"),
        ]))
        .expect("config");

        assert_eq!(config.n8n_webhook_url, None);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn missing_required_key_is_a_config_error() {
        let err = Config::from_source(source(&[("SERVER_ADDRESS", "127.0.0.1:8080")]))
            .expect_err("jwt secret is required");
        assert!(matches!(err, Error::Config(msg) if msg.contains("JWT_SECRET")));
    }

    #[test]
    fn invalid_number_is_reported() {
        let err = Config::from_source(source(&[
            ("SERVER_ADDRESS", "127.0.0.1:8080"),
            ("JWT_SECRET", "secret"),
            ("PUBLIC_RPS", "lots"),
        ]))
        .expect_err("rps must be numeric");
        assert!(matches!(err, Error::Config(msg) if msg.contains("PUBLIC_RPS")));
    }
}
