use std::{env, fmt::Display, str::FromStr, time::Duration};

use reqwest::Url;
use tracing::{info, warn};

use crate::error::ConfigError;

const DEFAULT_STORAGE_URL: &str = "https://firebasestorage.googleapis.com/v0";
const DEFAULT_TIMEOUT_SECS: &str = "30";

/// Endpoints and credentials for the external collaborators
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the listing REST API
    pub api_url: Url,
    /// Object store REST root
    pub storage_url: Url,
    pub storage_bucket: String,
    /// Session token sent as the `access_token` cookie
    pub access_token: Option<String>,
    pub http_timeout: Duration,
}

impl Config {
    /// Load from the environment, reading `.env` first if present
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            info!("No .env file loaded: {e}");
        }

        let api_url = parse_url("HOSTEL_API_URL", &require("HOSTEL_API_URL")?)?;
        let storage_url = parse_url(
            "HOSTEL_STORAGE_URL",
            &or_default("HOSTEL_STORAGE_URL", DEFAULT_STORAGE_URL),
        )?;
        let storage_bucket = require("HOSTEL_STORAGE_BUCKET")?;
        let access_token = env::var("HOSTEL_ACCESS_TOKEN").ok().filter(|t| !t.is_empty());
        let timeout_secs: u64 = try_load("HOSTEL_HTTP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self {
            api_url,
            storage_url,
            storage_bucket,
            access_token,
            http_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn require(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
        ConfigError::Missing(key)
    })
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    or_default(key, default)
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            message: e.to_string(),
        })
}

/// Parses a base URL, forcing a trailing slash so relative paths join under it
pub(crate) fn parse_url(key: &'static str, raw: &str) -> Result<Url, ConfigError> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base).map_err(|e| ConfigError::Invalid {
        key,
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_adds_trailing_slash() {
        let url = parse_url("HOSTEL_API_URL", "https://api.example.com/api").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api/");
        assert_eq!(
            url.join("listing/create").unwrap().as_str(),
            "https://api.example.com/api/listing/create"
        );
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        let err = parse_url("HOSTEL_API_URL", "not a url").unwrap_err();
        assert!(err.to_string().contains("HOSTEL_API_URL"));
    }
}
