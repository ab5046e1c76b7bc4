//! Client constants
//!
//! Centralized location for the defaults of the reference configuration,
//! the persistent storage keys and the broadcast event names.

// Reference configuration
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;
pub const DEFAULT_SAFE_LOCATION: &str = "/";

// Persistent storage keys (cleared together on auth failure)
pub const STORAGE_KEY_ACCESS_TOKEN: &str = "access_token";
pub const STORAGE_KEY_REFRESH_TOKEN: &str = "refresh_token";
pub const STORAGE_KEY_USER: &str = "user";

// Broadcast event names
pub const EVENT_AUTH_LOGIN: &str = "auth:login";
pub const EVENT_AUTH_LOGOUT: &str = "auth:logout";

// Synthetic statuses for failures that never produced a response
pub const STATUS_REQUEST_TIMEOUT: u16 = 408;
pub const STATUS_NETWORK_FAILURE: u16 = 500;

pub const TIMEOUT_MESSAGE: &str = "Request timeout";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error";

/// Authentication endpoints of the marketplace backend.
pub mod auth_endpoints {
    pub const REGISTER: &str = "/api/auth/register/";
    pub const LOGIN: &str = "/api/auth/login/";
    pub const LOGOUT: &str = "/api/auth/logout/";
    pub const GOOGLE_LOGIN: &str = "/api/auth/google-login/";
    pub const VERIFY_EMAIL: &str = "/api/auth/verify-email/";
    pub const RESEND_VERIFICATION: &str = "/api/auth/verify-email/resend/";
    pub const PROFILE: &str = "/api/auth/profile/";
    pub const PROFILE_UPDATE: &str = "/api/auth/profile/update/";
    pub const FORGOT_PASSWORD: &str = "/api/auth/password/forgot/";
    pub const RESET_PASSWORD: &str = "/api/auth/password/reset/";
    pub const CHANGE_PASSWORD: &str = "/api/auth/password/change/";
    pub const DELETE_ACCOUNT: &str = "/api/auth/delete-account/";
    pub const REFRESH_TOKEN: &str = "/api/auth/token/refresh/";
}
