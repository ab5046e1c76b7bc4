//! File-backed credential store
//!
//! Credentials live in one JSON object keyed by storage key. Every write
//! goes to a sibling `.tmp` file that is synced and renamed over the
//! original, so a crash never leaves a half-written document behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use marketlink_core::CredentialStore;
use marketlink_domain::{CredentialKey, MarketlinkError, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

use crate::errors::InfraError;

type Document = BTreeMap<String, String>;

/// Credential store persisted as a JSON file.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Store backed by the JSON document at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Result<Document> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(err) => return Err(InfraError::from(err).into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(document) => Ok(document),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Credential file is corrupt, starting empty");
                Ok(Document::new())
            }
        }
    }

    async fn write_document(&self, document: &Document) -> Result<()> {
        if document.is_empty() {
            return match fs::remove_file(&self.path).await {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(InfraError::from(err).into()),
            };
        }

        let data = serde_json::to_vec_pretty(document)
            .map_err(|err| MarketlinkError::Serialization(err.to_string()))?;
        let temp_path = self.path.with_extension("tmp");

        if let Some(parent) = temp_path.parent() {
            fs::create_dir_all(parent).await.map_err(InfraError::from)?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(InfraError::from)?;
        file.write_all(&data).await.map_err(InfraError::from)?;
        file.sync_all().await.map_err(InfraError::from)?;
        drop(file);

        fs::rename(&temp_path, &self.path).await.map_err(InfraError::from)?;
        debug!(path = %self.path.display(), entries = document.len(), "Credentials persisted");
        Ok(())
    }

    async fn update<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Document) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await?;
        apply(&mut document);
        self.write_document(&document).await
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_document().await?.remove(key.storage_key()))
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<()> {
        self.update(|document| {
            document.insert(key.storage_key().to_string(), value);
        })
        .await
    }

    async fn remove(&self, key: CredentialKey) -> Result<()> {
        self.update(|document| {
            document.remove(key.storage_key());
        })
        .await
    }

    #[instrument(skip_all, fields(count = entries.len()))]
    async fn set_many(&self, entries: Vec<(CredentialKey, String)>) -> Result<()> {
        self.update(|document| {
            for (key, value) in entries {
                document.insert(key.storage_key().to_string(), value);
            }
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.update(|document| {
            for key in CredentialKey::ALL {
                document.remove(key.storage_key());
            }
        })
        .await
    }
}
