//! Error types used throughout the client layers

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for marketlink infrastructure plumbing.
///
/// Caller-facing request failures are reported as
/// [`ErrorRecord`](crate::ErrorRecord); this type covers everything around
/// them (storage backends, configuration, serialization).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum MarketlinkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for MarketlinkError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for marketlink operations
pub type Result<T> = std::result::Result<T, MarketlinkError>;
