//! Dashboard configuration parsed from environment variables.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use crate::net::frame_client::ReconnectPolicy;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_RECONNECT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_RECONNECT_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_CALENDAR_MAX_RESULTS: u32 = 10;
pub const DEFAULT_STARRED_MAX_RESULTS: u32 = 10;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The base URL does not use an `http`/`https` scheme.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// HTTP origin of the assistant backend, without trailing slash.
    pub base_url: String,
    /// WebSocket event endpoint.
    pub ws_url: String,
    pub reconnect: ReconnectPolicy,
    pub calendar_max_results: u32,
    pub starred_max_results: u32,
    /// Calendars hidden from the calendar view at startup.
    pub hidden_calendars: BTreeSet<String>,
    pub request_timeout: Duration,
    /// Optional override for the embedded slash-command catalog.
    pub commands_path: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            ws_url: "ws://localhost:8000/ws".to_owned(),
            reconnect: ReconnectPolicy::default(),
            calendar_max_results: DEFAULT_CALENDAR_MAX_RESULTS,
            starred_max_results: DEFAULT_STARRED_MAX_RESULTS,
            hidden_calendars: BTreeSet::new(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            commands_path: None,
        }
    }
}

impl DashboardConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `DASHBOARD_BASE_URL`: default `http://localhost:8000`
    /// - `DASHBOARD_WS_URL`: default derived from the base URL + `/ws`
    /// - `DASHBOARD_RECONNECT_MAX_ATTEMPTS`: default 5
    /// - `DASHBOARD_RECONNECT_BASE_DELAY_MS`: default 1000
    /// - `DASHBOARD_CALENDAR_MAX_RESULTS`: default 10
    /// - `DASHBOARD_STARRED_MAX_RESULTS`: default 10
    /// - `DASHBOARD_HIDDEN_CALENDARS`: comma-separated calendar ids
    /// - `DASHBOARD_REQUEST_TIMEOUT_SECS`: default 30
    /// - `DASHBOARD_COMMANDS_PATH`: JSON command catalog override
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the base URL is not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the base URL is not http(s).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base_url = normalize_base_url(&get("DASHBOARD_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()))?;
        let ws_url = match get("DASHBOARD_WS_URL") {
            Some(url) => url.trim().to_owned(),
            None => ws_url_from_base(&base_url)?,
        };
        let reconnect = ReconnectPolicy {
            max_attempts: parse_or(get("DASHBOARD_RECONNECT_MAX_ATTEMPTS"), DEFAULT_RECONNECT_MAX_ATTEMPTS),
            base_delay: Duration::from_millis(parse_or(
                get("DASHBOARD_RECONNECT_BASE_DELAY_MS"),
                DEFAULT_RECONNECT_BASE_DELAY_MS,
            )),
        };
        let hidden_calendars = get("DASHBOARD_HIDDEN_CALENDARS")
            .map(|raw| parse_calendar_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            base_url,
            ws_url,
            reconnect,
            calendar_max_results: parse_or(get("DASHBOARD_CALENDAR_MAX_RESULTS"), DEFAULT_CALENDAR_MAX_RESULTS),
            starred_max_results: parse_or(get("DASHBOARD_STARRED_MAX_RESULTS"), DEFAULT_STARRED_MAX_RESULTS),
            hidden_calendars,
            request_timeout: Duration::from_secs(parse_or(
                get("DASHBOARD_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )),
            commands_path: get("DASHBOARD_COMMANDS_PATH").map(PathBuf::from),
        })
    }

    /// Point the config at another backend, re-deriving the WS endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the base URL is not http(s).
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(base_url)?;
        self.ws_url = ws_url_from_base(&self.base_url)?;
        Ok(self)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
    }
}

/// Convert an http(s) origin into the matching `ws(s)://…/ws` endpoint.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for non-http(s) input.
pub fn ws_url_from_base(base_url: &str) -> Result<String, ConfigError> {
    let base = base_url.trim_end_matches('/');
    if let Some(rest) = base.strip_prefix("https://") {
        Ok(format!("wss://{rest}/ws"))
    } else if let Some(rest) = base.strip_prefix("http://") {
        Ok(format!("ws://{rest}/ws"))
    } else {
        Err(ConfigError::InvalidBaseUrl(base_url.to_owned()))
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

fn parse_calendar_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
