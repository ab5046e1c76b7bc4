//! Test doubles for the session ports

use std::collections::HashMap;

use async_trait::async_trait;
use marketlink_domain::{CredentialKey, ErrorRecord, RefreshedTokens, Result};
use parking_lot::Mutex;

use crate::session::ports::{CredentialStore, Navigator, TokenExchange};

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<CredentialKey, String>>,
}

impl MemoryStore {
    pub fn seed(&self, key: CredentialKey, value: &str) {
        self.values.lock().insert(key, value.to_string());
    }

    pub fn value(&self, key: CredentialKey) -> Option<String> {
        self.values.lock().get(&key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        Ok(self.value(key))
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<()> {
        self.values.lock().insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: CredentialKey) -> Result<()> {
        self.values.lock().remove(&key);
        Ok(())
    }
}

#[derive(Debug)]
pub struct RecordingNavigator {
    location: Mutex<String>,
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn at(location: &str) -> Self {
        Self { location: Mutex::new(location.to_string()), redirects: Mutex::new(Vec::new()) }
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn current_location(&self) -> String {
        self.location.lock().clone()
    }

    fn redirect(&self, location: &str) {
        *self.location.lock() = location.to_string();
        self.redirects.lock().push(location.to_string());
    }
}

/// Exchange answering every call with the same scripted result.
#[derive(Debug)]
pub struct ScriptedExchange {
    result: std::result::Result<RefreshedTokens, ErrorRecord>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedExchange {
    pub fn succeeding(tokens: RefreshedTokens) -> Self {
        Self { result: Ok(tokens), seen: Mutex::new(Vec::new()) }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            result: Err(ErrorRecord::from_response(status, "Token is invalid", Default::default())),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Refresh tokens received, in call order.
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl TokenExchange for ScriptedExchange {
    async fn exchange(&self, refresh_token: &str) -> std::result::Result<RefreshedTokens, ErrorRecord> {
        self.seen.lock().push(refresh_token.to_string());
        tokio::task::yield_now().await;
        self.result.clone()
    }
}
