//! Modular common utilities shared across Marketlink crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: serialization helpers and retry primitives
//! - `runtime`: async infrastructure (event bus)
//! - `observability`: tracing (enabled by `runtime`)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod resilience;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod events;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use events::EventBus;
#[cfg(feature = "foundation")]
pub use resilience::{BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryDecision, RetryPolicy};
#[cfg(feature = "foundation")]
pub use utils::serde::duration_millis;
