//! # Marketlink Domain
//!
//! Request, response and session types for the Marketlink API client.
//!
//! This crate contains:
//! - Request descriptors and the normalized response/error shapes
//! - Credential, auth payload and session event types
//! - Client configuration and default constants
//! - Path templating and query string helpers
//!
//! ## Architecture
//! - No dependencies on other Marketlink crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::{build_query_string, build_url};
