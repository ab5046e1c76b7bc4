//! Retry Policy for transport failures

use marketlink_common::{RetryDecision, RetryPolicy};
use marketlink_domain::{ErrorKind, ErrorRecord};

/// Retries timeouts, network failures and 5xx responses.
///
/// 4xx responses (including the 401 handled by refresh) and local failures
/// are surfaced immediately. The attempt ceiling is enforced by the caller's
/// [`marketlink_common::RetryConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransientFailurePolicy;

impl TransientFailurePolicy {
    /// Timeout, network and 5xx failures.
    pub const fn is_transient(error: &ErrorRecord) -> bool {
        matches!(error.kind, ErrorKind::Timeout | ErrorKind::Network | ErrorKind::Server)
    }
}

impl RetryPolicy<ErrorRecord> for TransientFailurePolicy {
    fn should_retry(&self, error: &ErrorRecord, _attempt: u32) -> RetryDecision {
        if Self::is_transient(error) {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}
