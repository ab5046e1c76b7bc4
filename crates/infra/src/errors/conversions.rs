//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use marketlink_domain::{ErrorRecord, MarketlinkError};
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InfraError(pub MarketlinkError);

impl From<InfraError> for MarketlinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<MarketlinkError> for InfraError {
    fn from(value: MarketlinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoMarketlinkError {
    fn into_marketlink(self) -> MarketlinkError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → MarketlinkError */
/* -------------------------------------------------------------------------- */

impl IntoMarketlinkError for KeyringError {
    fn into_marketlink(self) -> MarketlinkError {
        use KeyringError::{Ambiguous, BadEncoding, Invalid, NoEntry, NoStorageAccess, PlatformFailure, TooLong};

        let description = self.to_string();

        match self {
            NoEntry => MarketlinkError::Storage("keychain entry not found".into()),
            BadEncoding(_) => {
                MarketlinkError::Storage("credential in keychain is not valid UTF-8".into())
            }
            TooLong(name, limit) => MarketlinkError::Storage(format!(
                "keychain attribute '{name}' exceeds platform limit ({limit})"
            )),
            Invalid(attr, reason) => {
                MarketlinkError::Storage(format!("keychain attribute '{attr}' is invalid: {reason}"))
            }
            Ambiguous(entries) => MarketlinkError::Storage(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => {
                MarketlinkError::Storage(format!("keychain platform error: {err}"))
            }
            NoStorageAccess(err) => {
                MarketlinkError::Storage(format!("unable to access secure storage: {err}"))
            }
            _ => MarketlinkError::Storage(description),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_marketlink())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → MarketlinkError */
/* -------------------------------------------------------------------------- */

impl IntoMarketlinkError for std::io::Error {
    fn into_marketlink(self) -> MarketlinkError {
        MarketlinkError::Storage(format!("credential file I/O failed: {self}"))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_marketlink())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → MarketlinkError / ErrorRecord */
/* -------------------------------------------------------------------------- */

impl IntoMarketlinkError for HttpError {
    fn into_marketlink(self) -> MarketlinkError {
        if self.is_builder() {
            return MarketlinkError::Config(format!("invalid HTTP client setup: {self}"));
        }
        if self.is_timeout() {
            return MarketlinkError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return MarketlinkError::Network("HTTP connection failure".into());
        }

        MarketlinkError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_marketlink())
    }
}

/// Map a transport failure onto the caller-facing error.
///
/// Timeouts raised by reqwest itself are reported like the cancellation
/// guard; everything else is a network failure with status 500.
pub fn transport_error(err: &HttpError) -> ErrorRecord {
    if err.is_timeout() {
        return ErrorRecord::timeout();
    }
    if err.is_builder() {
        return ErrorRecord::internal(format!("invalid request: {err}"));
    }
    ErrorRecord::network(err.to_string())
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
