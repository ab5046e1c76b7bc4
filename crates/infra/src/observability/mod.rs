//! Structured logging setup
//!
//! The client only emits `tracing` events; hosts that have no subscriber of
//! their own call [`init_tracing`] once at startup.
//!
//! Environment variables:
//! - `RUST_LOG`: filter directive (default: `info`)
//! - `LOG_FORMAT`: `json` or `pretty` (default: `pretty`)

use std::str::FromStr;

use marketlink_domain::{MarketlinkError, Result};
use tracing_subscriber::EnvFilter;

pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
const DEFAULT_FILTER: &str = "info";

/// Output format of the fmt subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = MarketlinkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(MarketlinkError::Config(format!("Unknown log format: {other}"))),
        }
    }
}

impl LogFormat {
    /// Format named by `LOG_FORMAT`, pretty when unset or unknown.
    pub fn from_env() -> Self {
        std::env::var(ENV_LOG_FORMAT).ok().and_then(|raw| raw.parse().ok()).unwrap_or_default()
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns `MarketlinkError::Config` when a global subscriber is already
/// installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    };

    installed
        .map_err(|err| MarketlinkError::Config(format!("Failed to install tracing subscriber: {err}")))
}
