//! Storage port for cached responses.
//!
//! The HTTP caching layer only ever talks to [`CacheInteractor`]; which
//! store sits behind it is decided once, at construction time.

use crate::Result;
use crate::response::CachedResponse;
use async_trait::async_trait;
use std::sync::Arc;

/// Origin reported by the in-process backend.
pub const ORIGIN_IN_MEMORY: &str = "inmemory";

/// Origin reported by the Redis backend.
pub const ORIGIN_REDIS: &str = "redis";

/// Storage backend for cached HTTP responses.
#[async_trait]
pub trait CacheInteractor: Send + Sync {
    /// Store `value` under `key`, replacing any previous entry.
    async fn set(&self, key: &str, value: &CachedResponse) -> Result<()>;

    /// Fetch the entry for `key`.
    ///
    /// Returns `Error::CacheMissed` when nothing live is stored and
    /// `Error::InvalidCachedResponse` when the stored bytes cannot be decoded.
    async fn get(&self, key: &str) -> Result<CachedResponse>;

    /// Remove the entry for `key`. Deleting a missing key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove every entry held by the backend.
    async fn flush(&self) -> Result<()>;

    /// Backend kind, for diagnostics only.
    fn origin(&self) -> &'static str;
}

#[async_trait]
impl<T: CacheInteractor + ?Sized> CacheInteractor for Arc<T> {
    async fn set(&self, key: &str, value: &CachedResponse) -> Result<()> {
        (**self).set(key, value).await
    }

    async fn get(&self, key: &str) -> Result<CachedResponse> {
        (**self).get(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key).await
    }

    async fn flush(&self) -> Result<()> {
        (**self).flush().await
    }

    fn origin(&self) -> &'static str {
        (**self).origin()
    }
}
