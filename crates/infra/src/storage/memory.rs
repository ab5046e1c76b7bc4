//! In-memory credential store

use std::collections::HashMap;

use async_trait::async_trait;
use marketlink_core::CredentialStore;
use marketlink_domain::{CredentialKey, Result};
use parking_lot::RwLock;

/// Credential store held in process memory.
///
/// Multi-key writes happen under one lock so readers never see a token
/// pair from two different refreshes.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<CredentialKey, String>>,
}

impl MemoryCredentialStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: CredentialKey) -> Result<Option<String>> {
        Ok(self.values.read().get(&key).cloned())
    }

    async fn set(&self, key: CredentialKey, value: String) -> Result<()> {
        self.values.write().insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: CredentialKey) -> Result<()> {
        self.values.write().remove(&key);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(CredentialKey, String)>) -> Result<()> {
        let mut values = self.values.write();
        values.extend(entries);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.values.write().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use marketlink_domain::User;

    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.get(CredentialKey::AccessToken).await.unwrap(), None);

        store.set(CredentialKey::AccessToken, "abc".to_string()).await.unwrap();
        assert_eq!(store.get(CredentialKey::AccessToken).await.unwrap().as_deref(), Some("abc"));

        store.remove(CredentialKey::AccessToken).await.unwrap();
        store.remove(CredentialKey::AccessToken).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_state_and_clear() {
        let store = MemoryCredentialStore::new();
        let user = User { id: 9, email: "sam@example.com".to_string(), ..User::default() };
        store
            .set_many(vec![
                (CredentialKey::AccessToken, "access".to_string()),
                (CredentialKey::RefreshToken, "refresh".to_string()),
                (CredentialKey::User, serde_json::to_string(&user).unwrap()),
            ])
            .await
            .unwrap();
        assert_eq!(store.len(), 3);

        let state = store.load_state().await.unwrap();
        assert_eq!(state.access_token.as_deref(), Some("access"));
        assert_eq!(state.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(state.cached_user, Some(user));

        store.clear().await.unwrap();
        assert!(store.load_state().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_user_is_reported_absent() {
        let store = MemoryCredentialStore::new();
        store.set(CredentialKey::User, "{not json".to_string()).await.unwrap();

        let state = store.load_state().await.unwrap();
        assert!(state.cached_user.is_none());
    }
}
