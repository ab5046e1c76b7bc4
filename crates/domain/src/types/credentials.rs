//! Session credential types

use serde::{Deserialize, Serialize};

use crate::constants::{STORAGE_KEY_ACCESS_TOKEN, STORAGE_KEY_REFRESH_TOKEN, STORAGE_KEY_USER};
use crate::impl_domain_str_conversions;
use crate::types::auth::User;

/// Keys of the persistent credential storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKey {
    AccessToken,
    RefreshToken,
    User,
}

impl_domain_str_conversions!(CredentialKey {
    AccessToken => "access_token",
    RefreshToken => "refresh_token",
    User => "user",
});

impl CredentialKey {
    /// All keys, in the order they are cleared.
    pub const ALL: [Self; 3] = [Self::AccessToken, Self::RefreshToken, Self::User];

    /// Storage key as persisted by the backends.
    #[must_use]
    pub const fn storage_key(&self) -> &'static str {
        match self {
            Self::AccessToken => STORAGE_KEY_ACCESS_TOKEN,
            Self::RefreshToken => STORAGE_KEY_REFRESH_TOKEN,
            Self::User => STORAGE_KEY_USER,
        }
    }
}

/// Snapshot of the session credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CredentialState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub cached_user: Option<User>,
}

impl CredentialState {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.cached_user.is_none()
    }
}

/// Token pair returned by login flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
}

/// Response of the refresh exchange: `{ access, refresh? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshedTokens {
    pub access: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

/// Body of the refresh exchange: `{ refresh }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}
