//! Enhancer configuration.
//!
//! Where the metadata endpoint lives, which fields to request and how long
//! the scheduler's quiet window is.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::FetchError;

/// Default quiet window before a coalesced pass runs.
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Fields requested from the metadata endpoint when none are configured.
pub const DEFAULT_FIELDS: [&str; 2] = ["Path", "MediaSources"];

fn default_fields() -> Vec<String> {
    DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect()
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

/// Configuration shared by the fetcher, orchestrator and scheduler.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnhancerConfig {
    /// API base, e.g. `https://media.example.org`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Session token sent as the `X-Emby-Token` compatibility header.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            fields: default_fields(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

impl EnhancerConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Base URL with any trailing slash removed.
    ///
    /// Fails with `InvalidArgument` when no base is configured.
    pub fn api_base(&self) -> Result<String, FetchError> {
        match self.base_url.as_deref().map(str::trim) {
            Some(base) if !base.is_empty() => Ok(base.trim_end_matches('/').to_string()),
            _ => Err(FetchError::InvalidArgument("baseUrl required".to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), FetchError> {
        self.api_base().map(|_| ())
    }

    /// Quiet window, with zero falling back to the default.
    pub fn debounce(&self) -> Duration {
        let ms = if self.debounce_ms == 0 {
            DEFAULT_DEBOUNCE_MS
        } else {
            self.debounce_ms
        };
        Duration::from_millis(ms)
    }
}

/// Derive the API base from the page location.
///
/// The web client is usually served under `/web`, but the API lives at the
/// origin either way.
pub fn infer_base_url(location: &str) -> Result<String, FetchError> {
    let parsed = Url::parse(location)
        .map_err(|e| FetchError::InvalidArgument(format!("bad location {location}: {e}")))?;
    let origin = parsed.origin();
    if !origin.is_tuple() {
        return Err(FetchError::InvalidArgument(format!(
            "location has no origin: {location}"
        )));
    }
    Ok(origin.ascii_serialization())
}
