//! Test context providing access to test infrastructure.

use crate::containers::RedisContainer;
use redis::aio::ConnectionManager;
use respcache_store::{RedisCache, RedisConfig};
use std::time::Duration;

/// Test context with a Redis server running.
///
/// Drop this to stop the container.
pub struct TestContext {
    pub redis: RedisContainer,
    pub cache: RedisCache,
    raw: ConnectionManager,
}

impl TestContext {
    /// Start Redis and connect a cache with no expiry.
    pub async fn redis() -> anyhow::Result<Self> {
        Self::redis_with(|config| config).await
    }

    /// Start Redis and connect a cache whose entries expire after `expiry`.
    pub async fn redis_with_expiry(expiry: Duration) -> anyhow::Result<Self> {
        Self::redis_with(|config| config.with_expiry(expiry)).await
    }

    /// Start Redis and connect a cache built from an adjusted config.
    pub async fn redis_with(
        configure: impl FnOnce(RedisConfig) -> RedisConfig,
    ) -> anyhow::Result<Self> {
        crate::init_test_logging();

        let container = RedisContainer::start().await?;
        let config = configure(RedisConfig::new(container.addr()));

        let client = redis::Client::open(config.connection_url()?)?;
        let raw = ConnectionManager::new(client).await?;
        let cache = RedisCache::connect(config).await?;

        Ok(Self {
            redis: container,
            cache,
            raw,
        })
    }

    /// A connection that bypasses the cache, for planting or inspecting raw values.
    pub fn raw_connection(&self) -> ConnectionManager {
        self.raw.clone()
    }

    pub fn redis_addr(&self) -> &str {
        self.redis.addr()
    }
}
