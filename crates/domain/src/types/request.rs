//! Request descriptors
//!
//! A [`RequestDescriptor`] describes one logical call; each retry or replay
//! is a fresh descriptor produced by [`RequestDescriptor::next_attempt`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{MarketlinkError, Result};

/// HTTP methods supported by the marketplace backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// Plain text field
    Text { name: String, value: String },
    /// File upload
    File { name: String, file_name: String, mime_type: Option<String>, bytes: Vec<u8> },
}

impl FormPart {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// Multipart form body.
///
/// Parts are kept as owned bytes so the same form can be re-encoded for
/// every attempt of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    parts: Vec<FormPart>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text { name: name.into(), value: value.into() });
        self
    }

    /// Add a file field
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime_type: mime_type.map(str::to_string),
            bytes: bytes.into(),
        });
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// Structured JSON body
    Json(Value),
    /// Multipart form; the transport sets the content type and boundary
    Multipart(MultipartForm),
}

impl RequestBody {
    /// Serialize any value into a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `MarketlinkError::Serialization` if the value cannot be
    /// represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| MarketlinkError::Serialization(format!("Failed to serialize body: {e}")))
    }

    #[must_use]
    pub const fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<MultipartForm> for RequestBody {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

/// Immutable description of one HTTP call attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub path: String,
    pub method: HttpMethod,
    pub body: RequestBody,
    pub require_auth: bool,
    /// 1-based attempt number
    pub attempt: u32,
}

impl RequestDescriptor {
    /// Create the first attempt of a request.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            body: RequestBody::Empty,
            require_auth: true,
            attempt: 1,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_auth(mut self, require_auth: bool) -> Self {
        self.require_auth = require_auth;
        self
    }

    /// The same request, one attempt later.
    #[must_use]
    pub fn next_attempt(&self) -> Self {
        Self { attempt: self.attempt.saturating_add(1), ..self.clone() }
    }

    #[must_use]
    pub const fn is_first_attempt(&self) -> bool {
        self.attempt <= 1
    }
}
