//! Error types for respcache.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Lookup outcomes
    #[error("Cache missed")]
    CacheMissed,

    #[error("Invalid cached response")]
    InvalidCachedResponse,

    // Storage path failures
    #[error("Storage internal error: {0}")]
    StorageInternal(String),

    // Construction-time failures, never returned by per-call operations
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether no live entry exists for the key.
    pub fn is_cache_missed(&self) -> bool {
        matches!(self, Error::CacheMissed)
    }

    /// Whether an entry existed but could not be decoded.
    pub fn is_invalid(&self) -> bool {
        matches!(self, Error::InvalidCachedResponse)
    }

    /// Whether the caller should go back to the origin server.
    ///
    /// Both a miss and an undecodable entry mean the same thing to an
    /// HTTP caching layer: there is nothing usable in the store.
    pub fn must_refetch(&self) -> bool {
        self.is_cache_missed() || self.is_invalid()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::StorageInternal(format!("serialization failed: {}", err))
    }
}
