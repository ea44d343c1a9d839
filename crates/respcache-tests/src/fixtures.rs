//! Test fixtures for creating sample responses.

use chrono::{DateTime, TimeZone, Utc};
use respcache_core::CachedResponse;

fn captured_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Factory for creating test responses. Each call yields an equal value.
pub struct ResponseFixture;

impl ResponseFixture {
    /// The smallest useful response: `200`, one header, body `hi`.
    pub fn simple() -> CachedResponse {
        CachedResponse::new(200)
            .with_header("X", "1")
            .with_body("hi")
            .with_cached_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    /// A response carrying repeated headers and metadata.
    pub fn with_repeated_headers() -> CachedResponse {
        CachedResponse::new(200)
            .with_header("Cache-Control", "max-age=60")
            .with_header("Set-Cookie", "session=abc")
            .with_header("Set-Cookie", "theme=dark")
            .with_header("Vary", "Accept-Encoding")
            .with_body(r#"{"items":[1,2,3]}"#)
            .with_request("GET", "https://api.example.com/items")
            .with_cached_at(Utc.with_ymd_and_hms(2024, 6, 15, 8, 0, 0).unwrap())
    }

    /// A response whose body is arbitrary binary data.
    pub fn binary(len: usize) -> CachedResponse {
        let body: Vec<u8> = (0..len).map(|i| (i * 31 % 256) as u8).collect();
        CachedResponse::new(200)
            .with_header("Content-Type", "application/octet-stream")
            .with_body(body)
            .with_request("GET", "https://cdn.example.com/blob.bin")
            .with_cached_at(captured_at())
    }

    /// An empty-bodied redirect.
    pub fn redirect() -> CachedResponse {
        CachedResponse::new(301)
            .with_header("Location", "https://example.com/new")
            .with_request("GET", "https://example.com/old")
            .with_cached_at(captured_at())
    }

    /// A simple response tagged with a distinct body.
    pub fn numbered(n: usize) -> CachedResponse {
        CachedResponse::new(200)
            .with_body(format!("response-{}", n))
            .with_cached_at(captured_at())
    }
}
