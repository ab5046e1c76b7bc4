//! Port interfaces for session state
//!
//! These traits define the boundaries between the client policy and the
//! infrastructure that persists credentials, moves the application to a new
//! location and talks to the refresh endpoint.

use async_trait::async_trait;
use marketlink_domain::{
    CredentialKey, CredentialState, ErrorRecord, RefreshedTokens, Result, User,
};
use tracing::warn;

/// Key/value persistence for the session credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read a value, `None` when absent.
    async fn get(&self, key: CredentialKey) -> Result<Option<String>>;

    /// Overwrite a value.
    async fn set(&self, key: CredentialKey, value: String) -> Result<()>;

    /// Remove a value. Removing an absent key is not an error.
    async fn remove(&self, key: CredentialKey) -> Result<()>;

    /// Write several values.
    ///
    /// Backends that can write in one step override this so readers never
    /// observe a half-written token pair.
    async fn set_many(&self, entries: Vec<(CredentialKey, String)>) -> Result<()> {
        for (key, value) in entries {
            self.set(key, value).await?;
        }
        Ok(())
    }

    /// Remove every credential.
    async fn clear(&self) -> Result<()> {
        for key in CredentialKey::ALL {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Snapshot of all credentials.
    ///
    /// A cached user that no longer decodes is reported as absent.
    async fn load_state(&self) -> Result<CredentialState> {
        let access_token = self.get(CredentialKey::AccessToken).await?;
        let refresh_token = self.get(CredentialKey::RefreshToken).await?;
        let cached_user = match self.get(CredentialKey::User).await? {
            Some(raw) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(err) => {
                    warn!(error = %err, "Discarding cached user that failed to decode");
                    None
                }
            },
            None => None,
        };
        Ok(CredentialState { access_token, refresh_token, cached_user })
    }
}

/// Location control of the host application.
pub trait Navigator: Send + Sync {
    /// Location the application currently shows.
    fn current_location(&self) -> String;

    /// Move the application to `location`.
    fn redirect(&self, location: &str);
}

/// Trades a refresh token for a new access token.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// Perform the exchange. Any failure means the session cannot continue.
    async fn exchange(&self, refresh_token: &str) -> std::result::Result<RefreshedTokens, ErrorRecord>;
}
