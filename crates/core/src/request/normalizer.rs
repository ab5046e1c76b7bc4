//! Response Normalizer
//!
//! Turns a raw transport response into a [`ResponseEnvelope`] or an
//! [`ErrorRecord`]. Bodies are read defensively: a body that claims JSON but
//! does not parse never raises, it becomes an empty structure on success and
//! an `{error: rawText}` detail map on failure.

use marketlink_domain::{ErrorRecord, ResponseEnvelope};
use serde_json::{Map, Value};
use tracing::debug;

use super::headers::APPLICATION_JSON;

/// Response as received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Raw response from `status`, its content type and body bytes.
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self { status, content_type: content_type.map(str::to_string), body: body.into() }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|value| value.to_ascii_lowercase().contains(APPLICATION_JSON))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ParsedBody {
    Empty,
    Structured(Value),
    Text(String),
    /// Claimed JSON but failed to parse
    Malformed(String),
}

fn parse_body(raw: &RawResponse) -> ParsedBody {
    let text = String::from_utf8_lossy(&raw.body).into_owned();
    if text.trim().is_empty() {
        return ParsedBody::Empty;
    }
    if !raw.is_json() {
        return ParsedBody::Text(text);
    }
    match serde_json::from_str(&text) {
        Ok(value) => ParsedBody::Structured(value),
        Err(err) => {
            debug!(status = raw.status, error = %err, "Response body is not valid JSON");
            ParsedBody::Malformed(text)
        }
    }
}

/// Classify a raw response.
///
/// # Errors
///
/// Any status outside 200-299 yields an [`ErrorRecord`] whose message is
/// derived through [`MESSAGE_RULES`].
pub fn normalize(raw: &RawResponse) -> Result<ResponseEnvelope<Value>, ErrorRecord> {
    let body = parse_body(raw);

    if raw.is_success() {
        return Ok(success_envelope(raw.status, body));
    }

    let (fields, text) = match &body {
        ParsedBody::Empty => (Map::new(), None),
        ParsedBody::Structured(Value::Object(map)) => (map.clone(), None),
        ParsedBody::Structured(other) => (single_error(other.clone()), None),
        ParsedBody::Text(text) => (Map::new(), Some(text.as_str())),
        ParsedBody::Malformed(_) => (Map::new(), None),
    };

    let message = derive_message(&ErrorBody { status: raw.status, fields: &fields, text });

    let details = match body {
        ParsedBody::Text(text) | ParsedBody::Malformed(text) => single_error(Value::String(text)),
        _ => fields,
    };

    Err(ErrorRecord::from_response(raw.status, message, details))
}

fn success_envelope(status: u16, body: ParsedBody) -> ResponseEnvelope<Value> {
    match body {
        ParsedBody::Empty => ResponseEnvelope::new(None, status, None),
        ParsedBody::Structured(value) => {
            let message = value.get("message").and_then(Value::as_str).map(str::to_string);
            ResponseEnvelope::new(Some(value), status, message)
        }
        ParsedBody::Text(text) => ResponseEnvelope::new(Some(Value::String(text)), status, None),
        ParsedBody::Malformed(_) => {
            ResponseEnvelope::new(Some(Value::Object(Map::new())), status, None)
        }
    }
}

fn single_error(value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("error".to_string(), value);
    map
}

/// Failure body as seen by the message rules.
#[derive(Debug, Clone, Copy)]
pub struct ErrorBody<'a> {
    pub status: u16,
    /// Structured fields; empty for text and malformed bodies
    pub fields: &'a Map<String, Value>,
    /// Plain-text body, when the response was not structured
    pub text: Option<&'a str>,
}

/// One step of the message precedence chain.
pub struct MessageRule {
    pub name: &'static str,
    pub applies: fn(&ErrorBody<'_>) -> bool,
    pub extract: fn(&ErrorBody<'_>) -> Option<String>,
}

impl std::fmt::Debug for MessageRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageRule").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Message precedence, first rule that applies and yields a message wins.
pub const MESSAGE_RULES: &[MessageRule] = &[
    MessageRule {
        name: "non_field_errors",
        applies: |body| body.fields.contains_key("non_field_errors"),
        extract: |body| first_diagnostic(body.fields.get("non_field_errors")),
    },
    MessageRule {
        name: "email",
        applies: |body| body.fields.get("email").is_some_and(Value::is_array),
        extract: |body| first_diagnostic(body.fields.get("email")),
    },
    MessageRule {
        name: "password",
        applies: |body| body.fields.get("password").is_some_and(Value::is_array),
        extract: |body| first_diagnostic(body.fields.get("password")),
    },
    MessageRule {
        name: "error",
        applies: |body| body.fields.contains_key("error"),
        extract: |body| first_diagnostic(body.fields.get("error")),
    },
    MessageRule {
        name: "detail",
        applies: |body| body.fields.contains_key("detail"),
        extract: |body| first_diagnostic(body.fields.get("detail")),
    },
    MessageRule {
        name: "message",
        applies: |body| body.fields.contains_key("message"),
        extract: |body| first_diagnostic(body.fields.get("message")),
    },
    MessageRule {
        name: "any_field",
        applies: |body| !body.fields.is_empty(),
        extract: |body| body.fields.values().find_map(|value| first_diagnostic(Some(value))),
    },
    MessageRule {
        name: "raw_text",
        applies: |body| body.text.is_some_and(is_readable_text),
        extract: |body| body.text.map(|text| text.trim().to_string()),
    },
];

/// Single human-readable message for a failure body.
pub fn derive_message(body: &ErrorBody<'_>) -> String {
    MESSAGE_RULES
        .iter()
        .filter(|rule| (rule.applies)(body))
        .find_map(|rule| (rule.extract)(body))
        .unwrap_or_else(|| format!("Request failed with status {}", body.status))
}

fn first_diagnostic(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Array(items) => items.iter().find_map(|item| first_diagnostic(Some(item))),
        _ => None,
    }
}

// HTML error pages are not messages
fn is_readable_text(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !trimmed.starts_with('<')
}
