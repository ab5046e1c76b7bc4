//! Header Builder

use marketlink_domain::RequestBody;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";
pub const AUTHORIZATION: &str = "Authorization";
pub const APPLICATION_JSON: &str = "application/json";

/// Ordered header set of one attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    entries: Vec<(&'static str, String)>,
}

impl RequestHeaders {
    /// Value of `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Headers in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(key, value)| (*key, value.as_str()))
    }

    fn push(&mut self, name: &'static str, value: String) {
        self.entries.push((name, value));
    }
}

/// Build the headers for one attempt.
///
/// `Content-Type` is left to the transport for multipart bodies so it can
/// add the boundary. The bearer token is only attached when the request
/// requires auth and a non-empty token is present.
pub fn build_headers(require_auth: bool, body: &RequestBody, access_token: Option<&str>) -> RequestHeaders {
    let mut headers = RequestHeaders::default();

    if !body.is_multipart() {
        headers.push(CONTENT_TYPE, APPLICATION_JSON.to_string());
    }
    headers.push(ACCEPT, APPLICATION_JSON.to_string());

    if require_auth {
        if let Some(token) = access_token.filter(|token| !token.trim().is_empty()) {
            headers.push(AUTHORIZATION, format!("Bearer {token}"));
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use marketlink_domain::MultipartForm;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_json_request_with_token() {
        let headers = build_headers(true, &RequestBody::Json(json!({"a": 1})), Some("abc"));
        assert_eq!(headers.get("content-type"), Some(APPLICATION_JSON));
        assert_eq!(headers.get(ACCEPT), Some(APPLICATION_JSON));
        assert_eq!(headers.get(AUTHORIZATION), Some("Bearer abc"));
    }

    #[test]
    fn test_public_request_never_carries_token() {
        let headers = build_headers(false, &RequestBody::Empty, Some("abc"));
        assert!(!headers.contains(AUTHORIZATION));
    }

    #[test]
    fn test_missing_or_blank_token_is_not_sent() {
        assert!(!build_headers(true, &RequestBody::Empty, None).contains(AUTHORIZATION));
        assert!(!build_headers(true, &RequestBody::Empty, Some("")).contains(AUTHORIZATION));
    }

    #[test]
    fn test_multipart_omits_content_type_only() {
        let body = RequestBody::Multipart(MultipartForm::new().text("title", "Bike"));
        let headers = build_headers(true, &body, Some("abc"));
        assert!(!headers.contains(CONTENT_TYPE));
        assert_eq!(headers.get(ACCEPT), Some(APPLICATION_JSON));
        assert_eq!(headers.get(AUTHORIZATION), Some("Bearer abc"));
    }
}
