//! Serialization roundtrip tests for respcache-core types.

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use respcache_core::CachedResponse;

fn sample() -> CachedResponse {
    CachedResponse::new(200)
        .with_header("Content-Type", "application/json")
        .with_header("Vary", "Accept")
        .with_header("Vary", "Accept-Encoding")
        .with_body(br#"{"ok":true}"#.to_vec())
        .with_request("GET", "https://example.com/api/items?page=2")
        .with_cached_at(Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap())
}

#[test]
fn test_cached_response_roundtrip() {
    let resp = sample();

    let json = serde_json::to_vec(&resp).expect("serialize");
    let parsed: CachedResponse = serde_json::from_slice(&json).expect("deserialize");

    assert_eq!(resp, parsed);
}

#[test]
fn test_binary_body_roundtrip() {
    let body: Vec<u8> = (0..=255u8).collect();
    let resp = CachedResponse::new(206).with_body(body.clone());

    let json = serde_json::to_string(&resp).expect("serialize");
    let parsed: CachedResponse = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(parsed.body, body);
    assert_eq!(parsed.status, 206);
}

#[test]
fn test_wire_shape() {
    let json = serde_json::to_value(sample()).expect("serialize");

    assert_eq!(json["status"], 200);
    assert_eq!(json["headers"]["Vary"][1], "Accept-Encoding");
    assert_eq!(json["request_method"], "GET");
    assert_eq!(json["cached_at"], "2024-05-01T12:30:00Z");
}

#[test]
fn test_optional_fields_default() {
    let json = r#"{"status":304,"cached_at":"2024-05-01T12:30:00Z"}"#;
    let parsed: CachedResponse = serde_json::from_str(json).expect("deserialize");

    assert_eq!(parsed.status, 304);
    assert!(parsed.headers.is_empty());
    assert!(parsed.body.is_empty());
    assert_eq!(parsed.request_uri, "");
}

#[test]
fn test_missing_status_is_rejected() {
    let json = r#"{"cached_at":"2024-05-01T12:30:00Z"}"#;
    assert!(serde_json::from_str::<CachedResponse>(json).is_err());
}
