//! Error types.
//!
//! `FetchError` is the taxonomy surfaced by the metadata fetcher. It is
//! `Clone` because one in-flight fetch hands the same outcome to every
//! caller waiting on it.

use thiserror::Error;

/// Failure to resolve item metadata (or to run an item action).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// A required input was missing (empty item id, no base endpoint).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No credential could be located.
    #[error("no access token available: {0}")]
    Auth(String),

    /// The server answered with a non-success status.
    #[error("request failed with status {status}")]
    Transport { status: u16 },

    /// The request never produced a response (connect, TLS, timeout).
    #[error("request failed: {0}")]
    Network(String),

    /// The response body could not be parsed.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Status code carried by a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { status } => Some(*status),
            _ => None,
        }
    }
}

/// Failure to read or apply a settings blob.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings blob is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("settings blob must be a JSON object")]
    NotAnObject,
}

/// Failure of an entire enhancement pass.
///
/// Per-card failures never surface here; they end up as the card's
/// errored state instead.
#[derive(Debug, Clone, Error)]
pub enum PassError {
    #[error("pass configuration rejected: {0}")]
    Config(#[from] FetchError),
}
