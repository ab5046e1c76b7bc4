//! Session lifecycle notifications

use serde::{Deserialize, Serialize};

use crate::constants::{EVENT_AUTH_LOGIN, EVENT_AUTH_LOGOUT};
use crate::types::auth::User;

/// Broadcast to every subscriber when the session starts or ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "user")]
pub enum SessionEvent {
    #[serde(rename = "auth:login")]
    Login(User),
    #[serde(rename = "auth:logout")]
    Logout,
}

impl SessionEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Login(_) => EVENT_AUTH_LOGIN,
            Self::Logout => EVENT_AUTH_LOGOUT,
        }
    }

    #[must_use]
    pub const fn is_logout(&self) -> bool {
        matches!(self, Self::Logout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(SessionEvent::Logout.name(), "auth:logout");
        assert_eq!(SessionEvent::Login(User::default()).name(), "auth:login");
    }

    #[test]
    fn test_logout_wire_format() {
        let json = serde_json::to_value(SessionEvent::Logout).unwrap();
        assert_eq!(json["event"], "auth:logout");
    }
}
