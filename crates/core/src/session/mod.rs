//! Session continuity: credential ports, refresh and auth failure handling

pub mod auth_failure;
pub mod ports;
pub mod refresh;

pub use auth_failure::AuthFailureHandler;
pub use ports::{CredentialStore, Navigator, TokenExchange};
pub use refresh::{refresh_applies, RefreshCoordinator, RefreshState};
