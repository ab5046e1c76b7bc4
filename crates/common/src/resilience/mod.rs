//! Resilience patterns for transient failures
//!
//! Generic retry primitives: a [`RetryPolicy`] decides *whether* to try
//! again, a [`BackoffStrategy`] decides *how long* to wait. The request
//! executor drives the loop itself so it can interleave token refresh with
//! transport retries.

pub mod retry;

pub use retry::{BackoffStrategy, RetryConfig, RetryConfigBuilder, RetryDecision, RetryPolicy};
