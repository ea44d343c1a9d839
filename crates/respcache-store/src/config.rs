//! Backend configuration.

use crate::compression::{CompressionParams, CompressionProvider};
use respcache_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default item bound for the in-memory backend.
pub const DEFAULT_MAX_ITEMS: u64 = 100;

/// Eviction policy derived from the in-memory configuration.
///
/// Both variants admit every write; the least recently used entry makes room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eviction {
    /// Capacity-bounded, no time bound.
    Lru,
    /// Capacity-bounded with a time-to-live.
    LruWithTtl { ttl: Duration },
}

/// Whole milliseconds in `duration`, rounding a partial millisecond up.
pub(crate) fn whole_millis(duration: Duration) -> u64 {
    let mut millis = duration.as_millis();
    if duration.subsec_nanos() % 1_000_000 != 0 {
        millis += 1;
    }
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Configuration for the in-process backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InMemoryConfig {
    /// Maximum number of cached responses.
    #[serde(default = "default_max_items")]
    pub max_items: u64,
    /// Entry lifetime in milliseconds; zero disables time-based expiry.
    #[serde(default)]
    pub expiry_ms: u64,
}

fn default_max_items() -> u64 {
    DEFAULT_MAX_ITEMS
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self {
            max_items: default_max_items(),
            expiry_ms: 0,
        }
    }
}

impl InMemoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the item bound.
    pub fn with_max_items(mut self, max_items: u64) -> Self {
        self.max_items = max_items;
        self
    }

    /// Set the entry lifetime.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry_ms = whole_millis(expiry);
        self
    }

    pub fn expiry(&self) -> Option<Duration> {
        (self.expiry_ms > 0).then(|| Duration::from_millis(self.expiry_ms))
    }

    pub fn eviction(&self) -> Eviction {
        match self.expiry() {
            Some(ttl) => Eviction::LruWithTtl { ttl },
            None => Eviction::Lru,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_items == 0 {
            return Err(Error::Configuration(
                "in-memory cache needs room for at least one item".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the Redis backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedisConfig {
    /// Server address as `host:port`.
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Password for `AUTH`.
    #[serde(default)]
    pub password: Option<String>,
    /// Logical database index.
    #[serde(default)]
    pub db: i64,
    /// Entry lifetime in milliseconds; zero keeps entries until deleted or flushed.
    #[serde(default)]
    pub expiry_ms: u64,
    /// Upper bound for a single round trip.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    /// Codec applied to stored payloads.
    #[serde(default)]
    pub compression: CompressionProvider,
    /// Codec level; provider default when unset.
    #[serde(default)]
    pub compression_level: Option<i32>,
}

fn default_addr() -> String {
    "127.0.0.1:6379".to_string()
}

fn default_operation_timeout_ms() -> u64 {
    5_000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            password: None,
            db: 0,
            expiry_ms: 0,
            operation_timeout_ms: default_operation_timeout_ms(),
            compression: CompressionProvider::default(),
            compression_level: None,
        }
    }
}

impl RedisConfig {
    /// Create a config for a single server address.
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry_ms = whole_millis(expiry);
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout_ms = whole_millis(timeout);
        self
    }

    pub fn with_compression(mut self, provider: CompressionProvider, level: Option<i32>) -> Self {
        self.compression = provider;
        self.compression_level = level;
        self
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_millis(self.expiry_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn compression_params(&self) -> CompressionParams {
        CompressionParams {
            level: self.compression_level,
        }
    }

    /// Render the `redis://` connection URL, percent-encoding the password.
    pub fn connection_url(&self) -> Result<String> {
        let mut url = url::Url::parse(&format!("redis://{}", self.addr))
            .map_err(|e| Error::Configuration(format!("invalid redis address {}: {}", self.addr, e)))?;

        if url.host_str().is_none_or(str::is_empty) {
            return Err(Error::Configuration(format!(
                "redis address {} has no host",
                self.addr
            )));
        }
        if url.path() != "" && url.path() != "/" {
            return Err(Error::Configuration(format!(
                "redis address {} must not contain a path",
                self.addr
            )));
        }
        if self.db < 0 {
            return Err(Error::Configuration(format!(
                "redis database index {} is negative",
                self.db
            )));
        }

        if let Some(password) = &self.password {
            url.set_password(Some(password))
                .map_err(|_| Error::Configuration("cannot attach redis password".to_string()))?;
        }
        url.set_path(&format!("/{}", self.db));

        Ok(url.to_string())
    }
}

/// Which backend to build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    InMemory(InMemoryConfig),
    Redis(RedisConfig),
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::InMemory(InMemoryConfig::default())
    }
}
