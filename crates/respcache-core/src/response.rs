//! Cached response entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A captured HTTP response as persisted by a cache backend.
///
/// Values are immutable once stored: updating an entry means calling
/// `set` again with a complete replacement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers. A name maps to every value it appeared with, in order.
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,
    /// Raw body bytes.
    #[serde(default, with = "body_encoding")]
    pub body: Vec<u8>,
    /// Method of the request that produced this response.
    #[serde(default)]
    pub request_method: String,
    /// URI of the request that produced this response.
    #[serde(default)]
    pub request_uri: String,
    /// When the response was captured.
    pub cached_at: DateTime<Utc>,
}

impl CachedResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
            request_method: String::new(),
            request_uri: String::new(),
            cached_at: Utc::now(),
        }
    }

    /// Append a header value, keeping earlier values for the same name.
    ///
    /// Names match case-insensitively; the first spelling seen is kept.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let key = self
            .headers
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&name))
            .cloned()
            .unwrap_or(name);
        self.headers.entry(key).or_default().push(value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_request(mut self, method: impl Into<String>, uri: impl Into<String>) -> Self {
        self.request_method = method.into();
        self.request_uri = uri.into();
        self
    }

    pub fn with_cached_at(mut self, cached_at: DateTime<Utc>) -> Self {
        self.cached_at = cached_at;
        self
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of a header, matched case-insensitively.
    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_slice())
    }
}

/// Bodies travel as base64 text so the JSON document stays valid UTF-8.
mod body_encoding {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_headers_keep_order() {
        let resp = CachedResponse::new(200)
            .with_header("Set-Cookie", "a=1")
            .with_header("Set-Cookie", "b=2");

        assert_eq!(
            resp.header_values("set-cookie"),
            Some(&["a=1".to_string(), "b=2".to_string()][..])
        );
        assert_eq!(resp.header("SET-COOKIE"), Some("a=1"));
        assert_eq!(resp.header("etag"), None);
    }

    #[test]
    fn test_header_names_merge_case_insensitively() {
        let resp = CachedResponse::new(200)
            .with_header("Vary", "Accept")
            .with_header("vary", "Accept-Encoding");

        assert_eq!(resp.headers.len(), 1);
        assert_eq!(
            resp.header_values("VARY"),
            Some(&["Accept".to_string(), "Accept-Encoding".to_string()][..])
        );
        assert!(resp.headers.contains_key("Vary"));
    }

    #[test]
    fn test_body_is_base64_in_json() {
        let resp = CachedResponse::new(200).with_body("hi");
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["body"], "aGk=");
    }

    #[test]
    fn test_rejects_non_base64_body() {
        let json = r#"{"status":200,"body":"%%%","cached_at":"2024-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<CachedResponse>(json).is_err());
    }
}
