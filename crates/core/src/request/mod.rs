//! Request pipeline policy: headers, normalization and retries

pub mod headers;
pub mod normalizer;
pub mod retry;

pub use headers::{build_headers, RequestHeaders};
pub use normalizer::{derive_message, normalize, ErrorBody, MessageRule, RawResponse, MESSAGE_RULES};
pub use retry::TransientFailurePolicy;
