//! Client configuration.

use dotenvy::dotenv;
use std::env;
use std::time::Duration;

use crate::error::{NotesError, Result};

/// Configuration injected into the API client and the note store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the notes API, without the `/api/notes` suffix.
    pub api_base_url: String,
    /// Enables title search on the derived view.
    pub enable_search: bool,
    /// Enables creation-date sorting on the derived view.
    pub enable_sort: bool,
    /// Per-request timeout. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a config for the given API base URL with search and sort enabled.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            enable_search: true,
            enable_sort: true,
            request_timeout: None,
        }
    }

    pub fn with_search(mut self, enabled: bool) -> Self {
        self.enable_search = enabled;
        self
    }

    pub fn with_sort(mut self, enabled: bool) -> Self {
        self.enable_sort = enabled;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from a variable lookup.
    ///
    /// - `NOTES_API_URL` (required)
    /// - `NOTES_ENABLE_SEARCH`, `NOTES_ENABLE_SORT` (default `true`)
    /// - `NOTES_REQUEST_TIMEOUT_SECS` (optional)
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("NOTES_API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| NotesError::Config("NOTES_API_URL must be set".into()))?;

        let mut config = Self::new(api_base_url.trim());
        config.validate()?;

        if let Some(value) = lookup("NOTES_ENABLE_SEARCH") {
            config.enable_search = parse_flag("NOTES_ENABLE_SEARCH", &value)?;
        }
        if let Some(value) = lookup("NOTES_ENABLE_SORT") {
            config.enable_sort = parse_flag("NOTES_ENABLE_SORT", &value)?;
        }
        if let Some(value) = lookup("NOTES_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = value.trim().parse().map_err(|_| {
                NotesError::Config(format!(
                    "NOTES_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    value
                ))
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            NotesError::Config(format!("invalid API base URL '{}': {}", self.api_base_url, e))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(NotesError::Config(format!(
                "API base URL must use http or https, got '{}'",
                other
            ))),
        }
    }
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(NotesError::Config(format!(
            "{} must be true or false, got '{}'",
            name, value
        ))),
    }
}
