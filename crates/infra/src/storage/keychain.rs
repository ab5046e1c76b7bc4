//! Platform keychain credential store
//!
//! Each credential is a separate keychain entry under one service name,
//! with the storage key as the account.

use async_trait::async_trait;
use keyring::Entry;
use marketlink_core::CredentialStore;
use marketlink_domain::{CredentialKey, MarketlinkError, Result};
use tracing::debug;

use crate::errors::InfraError;

/// Default keychain service name.
pub const DEFAULT_SERVICE: &str = "marketlink.session";

/// Credential store backed by the platform keychain (Keychain Access,
/// Credential Manager or the Secret Service API).
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    service: String,
}

impl KeychainCredentialStore {
    /// Store keeping one keychain entry per key under `service`.
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    /// Keychain service name.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: CredentialKey) -> Result<Entry> {
        Entry::new(&self.service, key.storage_key()).map_err(|err| InfraError::from(err).into())
    }
}

impl Default for KeychainCredentialStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

#[async_trait]
impl CredentialStore for KeychainCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(MarketlinkError::from(InfraError::from(err))),
        }
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<()> {
        debug!(service = %self.service, key = %key, "Storing credential in keychain");
        self.entry(key)?.set_password(&value).map_err(|err| InfraError::from(err).into())
    }

    async fn remove(&self, key: CredentialKey) -> Result<()> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(MarketlinkError::from(InfraError::from(err))),
        }
    }
}
