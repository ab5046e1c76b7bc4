//! Session flows over the authentication endpoints
//!
//! These are the only writers of the credential store besides the refresh
//! coordinator and the auth failure handler.

use std::sync::Arc;

use marketlink_domain::constants::auth_endpoints;
use marketlink_domain::{
    AuthTokens, ChangePasswordRequest, CredentialKey, CredentialState, EmailRequest,
    EmailVerificationRequest, ErrorRecord, GoogleLoginRequest, LoginRequest, LoginResponse,
    MessageResponse, ProfileUpdateResponse, RegisterRequest, RegisterResponse, RequestBody,
    ResetPasswordRequest, ResponseEnvelope, SessionEvent, User,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use super::client::ApiClient;

const EMAIL_VERIFIED: &str = "Email verified successfully";
const VERIFICATION_SENT: &str = "Verification email sent";
const RESET_CODE_SENT: &str = "Password reset code sent to your email";
const PASSWORD_RESET: &str = "Password reset successful";
const PASSWORD_CHANGED: &str = "Password changed successfully";

/// Authentication flows built on [`ApiClient`].
#[derive(Clone)]
pub struct AuthApi {
    client: Arc<ApiClient>,
}

impl AuthApi {
    /// Session flows sharing `client`'s store and event bus.
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Create an account. Tokens are not stored until the email is verified.
    #[instrument(skip_all)]
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ErrorRecord> {
        let envelope = self.client.post(auth_endpoints::REGISTER, json_body(request)?, false).await?;
        require_data(envelope, "Registration failed")
    }

    /// Log in with email and password, storing the session.
    #[instrument(skip_all)]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ErrorRecord> {
        let envelope = self.client.post(auth_endpoints::LOGIN, json_body(request)?, false).await?;
        let response: LoginResponse = require_data(envelope, "Login failed")?;
        self.store_session(&response.tokens, &response.user).await?;
        Ok(response)
    }

    /// Log in with a Google ID token, storing the session.
    #[instrument(skip_all)]
    pub async fn google_login(&self, request: &GoogleLoginRequest) -> Result<LoginResponse, ErrorRecord> {
        let envelope =
            self.client.post(auth_endpoints::GOOGLE_LOGIN, json_body(request)?, false).await?;
        let response: LoginResponse = require_data(envelope, "Google login failed")?;
        self.store_session(&response.tokens, &response.user).await?;
        Ok(response)
    }

    /// Confirm the email address with the emailed code.
    pub async fn verify_email(&self, request: &EmailVerificationRequest) -> Result<MessageResponse, ErrorRecord> {
        let envelope =
            self.client.post(auth_endpoints::VERIFY_EMAIL, json_body(request)?, false).await?;
        Ok(message_or(envelope, EMAIL_VERIFIED))
    }

    /// Send the verification code again.
    pub async fn resend_verification(&self, request: &EmailRequest) -> Result<MessageResponse, ErrorRecord> {
        let envelope =
            self.client.post(auth_endpoints::RESEND_VERIFICATION, json_body(request)?, false).await?;
        Ok(message_or(envelope, VERIFICATION_SENT))
    }

    /// Fetch the profile and refresh the cached user.
    #[instrument(skip_all)]
    pub async fn get_profile(&self) -> Result<User, ErrorRecord> {
        let envelope = self.client.get(auth_endpoints::PROFILE, true).await?;
        let user: User = require_data(envelope, "Failed to get user profile")?;
        self.cache_user(&user).await?;
        Ok(user)
    }

    /// Update the profile from a JSON patch or a multipart form (avatar
    /// upload). The cached user is replaced and `auth:login` is broadcast.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, changes: impl Into<RequestBody>) -> Result<User, ErrorRecord> {
        let envelope = self.client.put(auth_endpoints::PROFILE_UPDATE, changes, true).await?;
        let response: ProfileUpdateResponse = require_data(envelope, "Failed to update user profile")?;

        self.cache_user(&response.user).await?;
        self.client.events().publish(SessionEvent::Login(response.user.clone()));
        Ok(response.user)
    }

    /// Email a password reset code.
    pub async fn forgot_password(&self, request: &EmailRequest) -> Result<MessageResponse, ErrorRecord> {
        let envelope =
            self.client.post(auth_endpoints::FORGOT_PASSWORD, json_body(request)?, false).await?;
        Ok(message_or(envelope, RESET_CODE_SENT))
    }

    /// Set a new password using the emailed reset code.
    pub async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<MessageResponse, ErrorRecord> {
        let envelope =
            self.client.post(auth_endpoints::RESET_PASSWORD, json_body(request)?, false).await?;
        Ok(message_or(envelope, PASSWORD_RESET))
    }

    /// Change the password of the logged-in user.
    ///
    /// The backend names the old password `current_password`.
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<MessageResponse, ErrorRecord> {
        let body = RequestBody::Json(json!({
            "current_password": request.old_password,
            "new_password": request.new_password,
            "confirm_password": request.confirm_password,
        }));
        let envelope = self.client.put(auth_endpoints::CHANGE_PASSWORD, body, true).await?;
        Ok(message_or(envelope, PASSWORD_CHANGED))
    }

    /// Delete the account, then log out locally.
    #[instrument(skip_all)]
    pub async fn delete_account(&self) -> Result<(), ErrorRecord> {
        let _: ResponseEnvelope<Value> = self.client.delete(auth_endpoints::DELETE_ACCOUNT, true).await?;
        self.logout().await;
        info!("Account deleted");
        Ok(())
    }

    /// End the session.
    ///
    /// The backend is told to blacklist the refresh token when one exists;
    /// a failure there does not stop the local logout.
    #[instrument(skip_all)]
    pub async fn logout(&self) {
        let store = self.client.store();

        match store.get(CredentialKey::RefreshToken).await {
            Ok(Some(refresh_token)) if !refresh_token.is_empty() => {
                let body = RequestBody::Json(json!({ "refresh_token": refresh_token }));
                if let Err(err) =
                    self.client.post::<Value>(auth_endpoints::LOGOUT, body, true).await
                {
                    warn!(status = err.status, message = %err.message, "Backend logout failed, continuing with local logout");
                }
            }
            Ok(_) => {}
            Err(err) => warn!(error = %err, "Failed to read refresh token during logout"),
        }

        if let Err(err) = store.clear().await {
            warn!(error = %err, "Failed to clear credentials during logout");
        }
        self.client.events().publish(SessionEvent::Logout);
        info!("User logged out");
    }

    /// Access token and cached user both present.
    pub async fn is_authenticated(&self) -> bool {
        match self.client.store().load_state().await {
            Ok(state) => state.access_token.is_some_and(|token| !token.is_empty()) && state.cached_user.is_some(),
            Err(err) => {
                warn!(error = %err, "Failed to read credentials");
                false
            }
        }
    }

    /// Cached user, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.credential_state().await.cached_user
    }

    /// Snapshot of the stored credentials; empty when the store fails.
    pub async fn credential_state(&self) -> CredentialState {
        self.client.store().load_state().await.unwrap_or_else(|err| {
            warn!(error = %err, "Failed to read credentials");
            CredentialState::default()
        })
    }

    async fn store_session(&self, tokens: &AuthTokens, user: &User) -> Result<(), ErrorRecord> {
        let user_json = serde_json::to_string(user).map_err(|err| {
            ErrorRecord::internal(format!("Failed to store authentication data: {err}"))
        })?;
        self.client
            .store()
            .set_many(vec![
                (CredentialKey::AccessToken, tokens.access.clone()),
                (CredentialKey::RefreshToken, tokens.refresh.clone()),
                (CredentialKey::User, user_json),
            ])
            .await
            .map_err(|err| ErrorRecord::internal(format!("Failed to store authentication data: {err}")))?;

        self.client.events().publish(SessionEvent::Login(user.clone()));
        info!(user_id = user.id, "Session stored");
        Ok(())
    }

    async fn cache_user(&self, user: &User) -> Result<(), ErrorRecord> {
        let user_json = serde_json::to_string(user)
            .map_err(|err| ErrorRecord::internal(format!("Failed to cache user: {err}")))?;
        self.client
            .store()
            .set(CredentialKey::User, user_json)
            .await
            .map_err(|err| ErrorRecord::internal(format!("Failed to cache user: {err}")))
    }
}

fn json_body<T: Serialize>(payload: &T) -> Result<RequestBody, ErrorRecord> {
    Ok(RequestBody::json(payload)?)
}

fn require_data<T>(envelope: ResponseEnvelope<T>, context: &str) -> Result<T, ErrorRecord> {
    let status = envelope.status;
    envelope.data.ok_or_else(|| ErrorRecord {
        status,
        ..ErrorRecord::internal(format!("{context}: No data received"))
    })
}

fn message_or(envelope: ResponseEnvelope<MessageResponse>, default: &str) -> MessageResponse {
    envelope.data.unwrap_or_else(|| MessageResponse { message: default.to_string() })
}
