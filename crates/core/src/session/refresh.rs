//! Token refresh coordination
//!
//! A request that fails with 401 moves through
//! `Active -> RefreshAttempted -> {Replayed | Failed}`. The executor owns the
//! per-request state; the coordinator owns the exchange itself and
//! serialises it so concurrent 401s share one exchange.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use marketlink_domain::{CredentialKey, ErrorRecord, RequestDescriptor};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::auth_failure::AuthFailureHandler;
use super::ports::{CredentialStore, TokenExchange};

/// Refresh progress of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No refresh attempted yet
    Active,
    /// Exchange in progress
    RefreshAttempted,
    /// New credentials stored, the request may be replayed once
    Replayed,
    /// Session purged, the original 401 is surfaced
    Failed,
}

impl RefreshState {
    /// Whether a refresh may still be attempted.
    pub const fn can_refresh(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Whether `error` for `descriptor` triggers the refresh path: a 401 on an
/// authenticated request at its first attempt.
pub fn refresh_applies(error: &ErrorRecord, descriptor: &RequestDescriptor) -> bool {
    error.status == 401 && descriptor.require_auth && descriptor.is_first_attempt()
}

/// Single-flight refresh exchange shared by every request of a client.
pub struct RefreshCoordinator {
    store: Arc<dyn CredentialStore>,
    exchange: Arc<dyn TokenExchange>,
    failure_handler: Arc<AuthFailureHandler>,
    gate: Mutex<()>,
    /// Bumped every time an exchange ends in `Failed`
    failures: AtomicU64,
}

impl RefreshCoordinator {
    /// Coordinator over the shared store, exchange and failure handler.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        exchange: Arc<dyn TokenExchange>,
        failure_handler: Arc<AuthFailureHandler>,
    ) -> Self {
        Self {
            store,
            exchange,
            failure_handler,
            gate: Mutex::new(()),
            failures: AtomicU64::new(0),
        }
    }

    /// Failure generation to read alongside the access token a request is
    /// sent with, and to hand back to [`RefreshCoordinator::recover`].
    pub fn failure_generation(&self) -> u64 {
        self.failures.load(Ordering::Acquire)
    }

    /// Recover from a 401 received by a request sent with `sent_token`.
    ///
    /// `seen_generation` is the [`failure_generation`] observed when the
    /// request was sent. A failure recorded after that point already purged
    /// the session this request belonged to, so it fails without another
    /// purge. Any other recovery runs the exchange, and the failure handler
    /// when it fails.
    ///
    /// Returns [`RefreshState::Replayed`] when the store now holds a usable
    /// access token and [`RefreshState::Failed`] once the session has been
    /// purged.
    ///
    /// [`failure_generation`]: RefreshCoordinator::failure_generation
    #[instrument(skip_all, fields(had_token = sent_token.is_some(), seen_generation = seen_generation))]
    pub async fn recover(&self, sent_token: Option<&str>, seen_generation: u64) -> RefreshState {
        let _gate = self.gate.lock().await;

        let current = match self.store.get(CredentialKey::AccessToken).await {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Failed to read access token before refresh");
                None
            }
        };

        // Another request refreshed while this one waited
        if current.is_some() && current.as_deref() != sent_token {
            debug!("Access token changed since the request was sent, replaying");
            return RefreshState::Replayed;
        }

        // A refresh failed while this request was in flight
        if current.is_none() && self.failure_generation() > seen_generation {
            debug!("Session already purged by a concurrent refresh failure");
            return RefreshState::Failed;
        }

        let state = self.exchange_stored_token().await;
        if state == RefreshState::Failed {
            self.failures.fetch_add(1, Ordering::AcqRel);
        }
        state
    }

    async fn exchange_stored_token(&self) -> RefreshState {
        let refresh_token = match self.store.get(CredentialKey::RefreshToken).await {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                info!("No refresh token available");
                self.failure_handler.handle().await;
                return RefreshState::Failed;
            }
            Err(err) => {
                warn!(error = %err, "Failed to read refresh token");
                self.failure_handler.handle().await;
                return RefreshState::Failed;
            }
        };

        let tokens = match self.exchange.exchange(&refresh_token).await {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(status = err.status, message = %err.message, "Token refresh failed");
                self.failure_handler.handle().await;
                return RefreshState::Failed;
            }
        };

        let mut entries = vec![(CredentialKey::AccessToken, tokens.access)];
        if let Some(refresh) = tokens.refresh {
            entries.push((CredentialKey::RefreshToken, refresh));
        }

        match self.store.set_many(entries).await {
            Ok(()) => {
                info!("Access token refreshed");
                RefreshState::Replayed
            }
            Err(err) => {
                warn!(error = %err, "Failed to store refreshed tokens");
                self.failure_handler.handle().await;
                RefreshState::Failed
            }
        }
    }
}
