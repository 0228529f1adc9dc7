//! Client configuration
//!
//! Reads config from env vars (after loading `.env` via dotenvy):
//!   CALC_API_URL              - API base URL (default: http://localhost:8000)
//!   CALC_TOKEN_FILE           - durable token file (default: .calc_client/session.json)
//!   CALC_REQUEST_TIMEOUT_SECS - optional per-request timeout
//!   CALC_LIST_LIMIT           - page size for list fetches (default: 100)

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{ClientError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TOKEN_FILE: &str = ".calc_client/session.json";
pub const DEFAULT_LIST_LIMIT: u32 = 100;

/// How long a notice stays visible
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the calculation API
    pub base_url: Url,
    /// File backing the durable token store
    pub token_path: PathBuf,
    /// Auto-dismiss delay for notices
    pub notice_ttl: Duration,
    /// Per-request timeout; `None` leaves the HTTP stack defaults in place
    pub request_timeout: Option<Duration>,
    /// `limit` sent with list fetches
    pub list_limit: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            token_path: PathBuf::from(DEFAULT_TOKEN_FILE),
            notice_ttl: NOTICE_TTL,
            request_timeout: None,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ClientConfig {
    /// Load from the process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to load .env file: {}", e);
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("CALC_API_URL") {
            config.base_url = parse_base_url(&raw)?;
        }
        if let Some(raw) = lookup("CALC_TOKEN_FILE") {
            if raw.trim().is_empty() {
                return Err(ClientError::Config("CALC_TOKEN_FILE is empty".into()));
            }
            config.token_path = PathBuf::from(raw);
        }
        if let Some(raw) = lookup("CALC_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("CALC_REQUEST_TIMEOUT_SECS is not a number: {}", raw))
            })?;
            config.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(raw) = lookup("CALC_LIST_LIMIT") {
            config.list_limit = raw.trim().parse().map_err(|_| {
                ClientError::Config(format!("CALC_LIST_LIMIT is not a number: {}", raw))
            })?;
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, raw: &str) -> Result<Self> {
        self.base_url = parse_base_url(raw)?;
        Ok(self)
    }

    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Absolute URL for an API path such as `/calculations/3`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path)
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ClientError::Config(format!("invalid API URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ClientError::Config(format!(
            "unsupported URL scheme '{}' in {}",
            other, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.token_path, PathBuf::from(DEFAULT_TOKEN_FILE));
        assert_eq!(config.notice_ttl, Duration::from_secs(5));
        assert_eq!(config.request_timeout, None);
        assert_eq!(config.list_limit, 100);
    }

    #[test]
    fn env_values_override_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("CALC_API_URL", "https://calc.example.com/api/"),
            ("CALC_TOKEN_FILE", "/tmp/calc.json"),
            ("CALC_REQUEST_TIMEOUT_SECS", "15"),
            ("CALC_LIST_LIMIT", "25"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint("/calculations"), "https://calc.example.com/api/calculations");
        assert_eq!(config.token_path, PathBuf::from("/tmp/calc.json"));
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.list_limit, 25);
    }

    #[test]
    fn zero_timeout_means_no_timeout() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[("CALC_REQUEST_TIMEOUT_SECS", "0")])).unwrap();
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn invalid_values_are_config_errors() {
        for pairs in [
            [("CALC_API_URL", "not a url")],
            [("CALC_API_URL", "ftp://example.com")],
            [("CALC_LIST_LIMIT", "lots")],
            [("CALC_REQUEST_TIMEOUT_SECS", "-1")],
        ] {
            let err = ClientConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(matches!(err, ClientError::Config(_)), "{:?}", err);
        }
    }
}
