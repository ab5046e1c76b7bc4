//! # Marketlink Core
//!
//! Client policy layer - no network or storage code.
//!
//! This crate contains:
//! - Port interfaces for credential storage, navigation and the refresh
//!   exchange
//! - Header building, response normalization and the retry policy
//! - Token refresh coordination and auth failure handling
//!
//! ## Architecture Principles
//! - Only depends on `marketlink-common` and `marketlink-domain`
//! - All I/O goes through the traits in [`session::ports`]

pub mod request;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use request::{build_headers, normalize, RawResponse, RequestHeaders, TransientFailurePolicy};
pub use session::{
    refresh_applies, AuthFailureHandler, CredentialStore, Navigator, RefreshCoordinator,
    RefreshState, TokenExchange,
};
