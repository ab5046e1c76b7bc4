//! Common utility functions
//!
//! - **[`serde`]**: Serialization helpers for durations

pub mod serde;

pub use self::serde::duration_millis;
