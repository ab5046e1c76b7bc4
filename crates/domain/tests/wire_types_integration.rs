//! Integration tests for the wire types shared by every client layer
//!
//! Covers the shapes callers see when they render backend failures and
//! build marketplace URLs.

use std::collections::HashMap;

use marketlink_domain::{
    build_query_string, build_url, ErrorKind, ErrorRecord, LoginResponse, SessionEvent,
};
use serde_json::{json, Map, Value};

fn details(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// A registration form rejected with per-field diagnostics
#[test]
fn test_field_errors_render_for_forms() {
    let record = ErrorRecord::from_response(
        400,
        "Enter a valid email address.",
        details(json!({
            "email": ["Enter a valid email address."],
            "password": ["This password is too short.", "This password is too common."]
        })),
    );

    assert_eq!(record.kind, ErrorKind::Client);
    assert_eq!(record.field_errors("password").len(), 2);
    assert!(record.field_errors("phone").is_empty());
    assert_eq!(record.display_message(), "Enter a valid email address.");
}

/// `detail` wins over everything else when rendering
#[test]
fn test_display_message_prefers_detail() {
    let record = ErrorRecord::from_response(
        403,
        "Forbidden",
        details(json!({"detail": "You do not own this ad.", "non_field_errors": ["x"]})),
    );
    assert_eq!(record.display_message(), "You do not own this ad.");
}

#[test]
fn test_login_payload_decodes() {
    let payload = json!({
        "user": {"id": 12, "email": "noor@example.com", "first_name": "Noor", "city": "Baku"},
        "tokens": {"access": "a", "refresh": "r"},
        "message": "Login successful"
    });

    let response: LoginResponse = serde_json::from_value(payload).unwrap();
    assert_eq!(response.user.id, 12);
    assert_eq!(response.user.extra.get("city"), Some(&json!("Baku")));
    assert_eq!(response.tokens.refresh, "r");
}

#[test]
fn test_session_event_wire_names() {
    let logout = serde_json::to_value(SessionEvent::Logout).unwrap();
    assert_eq!(logout, json!({"event": "auth:logout"}));
    assert!(SessionEvent::Logout.is_logout());
}

/// Ad detail URL with a search query appended
#[test]
fn test_ad_listing_url() {
    let mut params = HashMap::new();
    params.insert("category", "home & garden".to_string());
    let path = build_url("/api/categories/:category/ads/", &params);
    assert_eq!(path, "/api/categories/home%20%26%20garden/ads/");

    let query = build_query_string([
        ("search", &json!("sofa")),
        ("page", &json!(2)),
        ("condition", &json!("")),
    ]);
    assert_eq!(query, "?search=sofa&page=2");
}
