//! Credential store backends
//!
//! - `memory`: process-local store for tests and ephemeral sessions
//! - `file`: JSON document on disk, rewritten atomically
//! - `keychain`: platform keychain, one entry per credential

pub mod file;
pub mod keychain;
pub mod memory;

pub use file::FileCredentialStore;
pub use keychain::KeychainCredentialStore;
pub use memory::MemoryCredentialStore;
