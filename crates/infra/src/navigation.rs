//! Navigator for hosts without a routing layer of their own

use marketlink_core::Navigator;
use parking_lot::RwLock;
use tracing::info;

/// Tracks the current location in memory and records every redirect.
///
/// Headless hosts (CLIs, background workers, tests) use this in place of a
/// UI router; the recorded history tells them a session ended.
#[derive(Debug)]
pub struct InMemoryNavigator {
    state: RwLock<NavigationState>,
}

#[derive(Debug)]
struct NavigationState {
    location: String,
    history: Vec<String>,
}

impl InMemoryNavigator {
    /// Navigator starting at `location`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(NavigationState { location: location.into(), history: Vec::new() }),
        }
    }

    /// Move without recording a redirect, as a user navigating would.
    pub fn visit(&self, location: impl Into<String>) {
        self.state.write().location = location.into();
    }

    /// Redirects issued so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.state.read().history.clone()
    }
}

impl Navigator for InMemoryNavigator {
    fn current_location(&self) -> String {
        self.state.read().location.clone()
    }

    fn redirect(&self, location: &str) {
        let mut state = self.state.write();
        info!(from = %state.location, to = %location, "Redirecting");
        state.location = location.to_string();
        state.history.push(location.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_updates_location_and_history() {
        let navigator = InMemoryNavigator::new("/ads/42");
        navigator.redirect("/");

        assert_eq!(navigator.current_location(), "/");
        assert_eq!(navigator.history(), vec!["/".to_string()]);
    }

    #[test]
    fn test_visit_is_not_recorded() {
        let navigator = InMemoryNavigator::new("/");
        navigator.visit("/profile");

        assert_eq!(navigator.current_location(), "/profile");
        assert!(navigator.history().is_empty());
    }
}
