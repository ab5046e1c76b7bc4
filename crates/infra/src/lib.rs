//! # Marketlink Infrastructure
//!
//! Infrastructure implementations of the core session ports and the
//! request executor built on them.
//!
//! This crate contains:
//! - HTTP transport (reqwest) with the per-call cancellation guard
//! - The API client and the authentication flows
//! - Credential stores (memory, JSON file, platform keychain)
//! - Configuration loading and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `marketlink-core`
//! - Depends on `marketlink-common`, `marketlink-domain` and `marketlink-core`
//! - Contains all "impure" code (I/O, network, keychain)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod navigation;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use api::{ApiClient, ApiClientBuilder, AuthApi, HttpTokenExchange};
pub use errors::InfraError;
pub use http::{HttpClient, HttpClientBuilder};
pub use navigation::InMemoryNavigator;
pub use observability::{init_tracing, LogFormat};
pub use storage::{FileCredentialStore, KeychainCredentialStore, MemoryCredentialStore};
