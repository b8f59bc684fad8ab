//! Client configuration parsed from environment variables.

use std::path::PathBuf;

use crate::routes::guard::RoutePolicy;
use crate::state::credentials::TOKEN_STORAGE_KEY;

pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {var} is required")]
    Missing { var: &'static str },

    #[error("{var} must be a valid URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },

    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },

    #[error("HTTP client build failed: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the marketplace API, without a trailing slash.
    pub api_url: String,
    pub environment: String,
    pub route_policy: RoutePolicy,
    pub timeouts: HttpTimeouts,
    /// Durable credential slot for native front ends.
    pub token_file: PathBuf,
}

impl ClientConfig {
    /// Config with defaults for everything except the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if `api_url` does not parse.
    pub fn new(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            environment: DEFAULT_ENVIRONMENT.to_owned(),
            route_policy: RoutePolicy::default(),
            timeouts: HttpTimeouts::default(),
            token_file: default_token_file(None),
        })
    }

    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `MARKET_API_URL`
    ///
    /// Optional:
    /// - `MARKET_ENV`: default `development`
    /// - `MARKET_ROUTE_POLICY`: `guest_browsing` (default) or `login_required`
    /// - `MARKET_REQUEST_TIMEOUT_SECS`: default 30
    /// - `MARKET_CONNECT_TIMEOUT_SECS`: default 10
    /// - `MARKET_TOKEN_FILE`: default `$HOME/.market/token`
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is missing or malformed, or if the
    /// route policy is not recognized.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] but reads values through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get("MARKET_API_URL").ok_or(ConfigError::Missing { var: "MARKET_API_URL" })?;
        let api_url = parse_api_url(&raw_url)?;
        let environment = get("MARKET_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_owned());
        let route_policy = match get("MARKET_ROUTE_POLICY") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { var: "MARKET_ROUTE_POLICY", value: raw.clone() })?,
            None => RoutePolicy::default(),
        };
        let timeouts = HttpTimeouts {
            request_secs: parse_u64(get("MARKET_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(get("MARKET_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let token_file = get("MARKET_TOKEN_FILE").map_or_else(|| default_token_file(get("HOME")), PathBuf::from);

        Ok(Self { api_url, environment, route_policy, timeouts, token_file })
    }

    /// Join an API path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }
}

fn parse_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidUrl { var: "MARKET_API_URL", reason: e.to_string() })?;
    Ok(trimmed.trim_end_matches('/').to_owned())
}

fn parse_u64(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok()).unwrap_or(default)
}

fn default_token_file(home: Option<String>) -> PathBuf {
    let base = home.map_or_else(|| PathBuf::from("."), PathBuf::from);
    base.join(".market").join(TOKEN_STORAGE_KEY)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
