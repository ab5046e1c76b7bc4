//! Marketplace API client
//!
//! - `client`: request executor (headers, timeout guard, retries,
//!   refresh-and-replay on 401)
//! - `refresh`: HTTP exchange of a refresh token for an access token
//! - `auth`: session flows that write the credential store

pub mod auth;
pub mod client;
pub mod refresh;

pub use auth::AuthApi;
pub use client::{ApiClient, ApiClientBuilder};
pub use refresh::HttpTokenExchange;
