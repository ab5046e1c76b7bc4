//! Retry decisions and backoff delays
//!
//! Attempts are numbered from 1. `delay_for(n)` is the pause taken after
//! attempt `n` failed and before attempt `n + 1` starts.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::serde::duration_millis;

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Decide what to do after `attempt` failed with `error`.
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the configured backoff delay
    Retry,
    /// Retry after a custom delay
    RetryAfter(Duration),
    /// Surface the error
    Stop,
}

impl RetryDecision {
    #[must_use]
    pub const fn is_retry(&self) -> bool {
        !matches!(self, Self::Stop)
    }
}

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Same delay before every retry
    Fixed {
        #[serde(with = "duration_millis")]
        delay: Duration,
    },
    /// `step * attempt`: 1x after the first failure, 2x after the second
    Linear {
        #[serde(with = "duration_millis")]
        step: Duration,
    },
}

impl BackoffStrategy {
    /// Delay to wait after `attempt` failed.
    #[must_use]
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => *delay,
            Self::Linear { step } => step.saturating_mul(attempt.max(1)),
        }
    }
}

/// Invalid retry configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid retry configuration: {message}")]
pub struct InvalidRetryConfig {
    pub message: String,
}

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::linear(3, Duration::from_secs(1))
    }
}

impl RetryConfig {
    /// Linear backoff with `step * attempt` delays.
    #[must_use]
    pub const fn linear(max_attempts: u32, step: Duration) -> Self {
        Self { max_attempts, backoff: BackoffStrategy::Linear { step } }
    }

    #[must_use]
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// Whether another attempt may follow `attempt`.
    #[must_use]
    pub const fn allows_another(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay to use for `decision` after `attempt` failed, `None` to stop.
    #[must_use]
    pub fn delay_for(&self, decision: &RetryDecision, attempt: u32) -> Option<Duration> {
        if !self.allows_another(attempt) {
            return None;
        }
        match decision {
            RetryDecision::Retry => Some(self.backoff.calculate_delay(attempt)),
            RetryDecision::RetryAfter(delay) => Some(*delay),
            RetryDecision::Stop => None,
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error when `max_attempts` is zero.
    pub fn validate(&self) -> Result<(), InvalidRetryConfig> {
        if self.max_attempts == 0 {
            return Err(InvalidRetryConfig {
                message: "max_attempts must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for [`RetryConfig`]
#[derive(Debug, Default)]
pub struct RetryConfigBuilder {
    config: RetryConfig,
}

impl RetryConfigBuilder {
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn fixed_backoff(mut self, delay: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Fixed { delay };
        self
    }

    #[must_use]
    pub fn linear_backoff(mut self, step: Duration) -> Self {
        self.config.backoff = BackoffStrategy::Linear { step };
        self
    }

    /// # Errors
    ///
    /// Returns an error when the configuration is invalid.
    pub fn build(self) -> Result<RetryConfig, InvalidRetryConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
