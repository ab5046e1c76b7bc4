//! Domain types shared by the request pipeline and the auth flows

pub mod auth;
pub mod credentials;
pub mod events;
pub mod request;
pub mod response;

pub use auth::{
    ChangePasswordRequest, EmailRequest, EmailVerificationRequest, GoogleLoginRequest,
    LoginRequest, LoginResponse, MessageResponse, ProfileUpdateResponse, RegisterRequest,
    RegisterResponse, ResetPasswordRequest, User,
};
pub use credentials::{AuthTokens, CredentialKey, CredentialState, RefreshRequest, RefreshedTokens};
pub use events::SessionEvent;
pub use request::{FormPart, HttpMethod, MultipartForm, RequestBody, RequestDescriptor};
pub use response::{ErrorKind, ErrorRecord, ResponseEnvelope};
