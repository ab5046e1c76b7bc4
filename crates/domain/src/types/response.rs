//! Normalized request outcomes
//!
//! Every call made through the client ends in exactly one of two shapes:
//! a [`ResponseEnvelope`] on logical success or an [`ErrorRecord`] on
//! failure, whatever error format the backend used.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::{
    NETWORK_ERROR_MESSAGE, STATUS_NETWORK_FAILURE, STATUS_REQUEST_TIMEOUT, TIMEOUT_MESSAGE,
};
use crate::errors::MarketlinkError;
use crate::impl_domain_str_conversions;

/// Successful result wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T = Value> {
    pub data: Option<T>,
    pub status: u16,
    pub message: Option<String>,
}

impl<T> ResponseEnvelope<T> {
    #[must_use]
    pub const fn new(data: Option<T>, status: u16, message: Option<String>) -> Self {
        Self { data, status, message }
    }

    /// Transform the payload while keeping status and message.
    pub fn map<U, F: FnOnce(T) -> Option<U>>(self, f: F) -> ResponseEnvelope<U> {
        ResponseEnvelope { data: self.data.and_then(f), status: self.status, message: self.message }
    }
}

/// Failure taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The cancellation guard fired
    Timeout,
    /// Transport failed before receiving a response
    Network,
    /// 5xx response
    Server,
    /// 4xx response other than 401
    Client,
    /// 401 response, eligible for a refresh exchange
    AuthExpired,
    /// Refresh exchange failed or no refresh token was available
    AuthFailed,
    /// Failure raised locally before any transport call
    #[default]
    Internal,
}

impl_domain_str_conversions!(ErrorKind {
    Timeout => "timeout",
    Network => "network",
    Server => "server",
    Client => "client",
    AuthExpired => "auth_expired",
    AuthFailed => "auth_failed",
    Internal => "internal",
});

impl ErrorKind {
    /// Classify a non-2xx transport status.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            401 => Self::AuthExpired,
            500..=599 => Self::Server,
            _ => Self::Client,
        }
    }
}

/// Normalized failure surfaced to every caller.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{message} (status {status})")]
pub struct ErrorRecord {
    /// Single human-readable message
    pub message: String,
    /// Transport status (synthetic for timeouts and network failures)
    pub status: u16,
    /// Full backend error body, keyed by field name
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub kind: ErrorKind,
}

impl ErrorRecord {
    /// Error derived from a backend response.
    #[must_use]
    pub fn from_response(status: u16, message: impl Into<String>, details: Map<String, Value>) -> Self {
        Self { message: message.into(), status, details, kind: ErrorKind::from_status(status) }
    }

    /// The cancellation guard aborted the call.
    #[must_use]
    pub fn timeout() -> Self {
        Self {
            message: TIMEOUT_MESSAGE.to_string(),
            status: STATUS_REQUEST_TIMEOUT,
            details: Map::new(),
            kind: ErrorKind::Timeout,
        }
    }

    /// The transport failed before a response arrived.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            message: if message.is_empty() { NETWORK_ERROR_MESSAGE.to_string() } else { message },
            status: STATUS_NETWORK_FAILURE,
            details: Map::new(),
            kind: ErrorKind::Network,
        }
    }

    /// A local failure that never reached the transport.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: STATUS_NETWORK_FAILURE,
            details: Map::new(),
            kind: ErrorKind::Internal,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.kind, ErrorKind::AuthExpired | ErrorKind::AuthFailed)
    }

    /// Diagnostics recorded for a single field.
    #[must_use]
    pub fn field_errors(&self, field: &str) -> Vec<String> {
        self.details.get(field).map(diagnostics).unwrap_or_default()
    }

    /// Message suited for display, preferring backend diagnostics over the
    /// summary message: `detail`, then `non_field_errors`, then the first
    /// field diagnostic, then `message`.
    #[must_use]
    pub fn display_message(&self) -> String {
        if let Some(detail) = self.details.get("detail").and_then(Value::as_str) {
            return detail.to_string();
        }
        if let Some(first) = self.field_errors("non_field_errors").into_iter().next() {
            return first;
        }
        self.details
            .values()
            .flat_map(diagnostics)
            .next()
            .unwrap_or_else(|| self.message.clone())
    }
}

impl From<MarketlinkError> for ErrorRecord {
    fn from(err: MarketlinkError) -> Self {
        Self::internal(err.to_string())
    }
}

fn diagnostics(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => Vec::new(),
    }
}
