//! Terminal handling of unrecoverable authentication failures

use std::sync::Arc;

use marketlink_common::EventBus;
use marketlink_domain::SessionEvent;
use tracing::{error, info};

use super::ports::{CredentialStore, Navigator};

/// Purges the session, sends the application to its safe location and
/// broadcasts `auth:logout`.
pub struct AuthFailureHandler {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    events: EventBus<SessionEvent>,
    safe_location: String,
}

impl AuthFailureHandler {
    /// Handler redirecting to `safe_location` after a purge.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
        events: EventBus<SessionEvent>,
        safe_location: impl Into<String>,
    ) -> Self {
        Self { store, navigator, events, safe_location: safe_location.into() }
    }

    /// Location users are sent to after a purge.
    pub fn safe_location(&self) -> &str {
        &self.safe_location
    }

    /// Run the purge. Storage failures are logged, the redirect and the
    /// broadcast still happen.
    pub async fn handle(&self) {
        if let Err(err) = self.store.clear().await {
            error!(error = %err, "Failed to clear credentials after auth failure");
        }

        // Redirecting from the safe location itself would loop
        if self.navigator.current_location() != self.safe_location {
            self.navigator.redirect(&self.safe_location);
        }

        let delivered = self.events.publish(SessionEvent::Logout);
        info!(subscribers = delivered, "Session ended after authentication failure");
    }
}
