//! In-process cache backend.

use crate::config::{DEFAULT_MAX_ITEMS, Eviction, InMemoryConfig};
use crate::health::{HealthCheck, HealthStatus};
use crate::metrics::CacheMetrics;
use async_trait::async_trait;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use respcache_core::{CacheInteractor, CachedResponse, Error, ORIGIN_IN_MEMORY, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Bounded in-process store for cached responses.
///
/// Entries are held as values, so nothing is serialized. Every write is
/// admitted; once the bound is reached the least recently used entry is
/// evicted. With an expiry configured, anything older than the expiry is
/// dropped as well.
#[derive(Clone)]
pub struct InMemoryCache {
    cache: Cache<String, CachedResponse>,
    metrics: Arc<CacheMetrics>,
}

impl InMemoryCache {
    pub fn new(config: &InMemoryConfig) -> Result<Self> {
        config.validate()?;

        let builder = Cache::builder()
            .max_capacity(config.max_items)
            .eviction_policy(EvictionPolicy::lru());
        let cache = match config.eviction() {
            Eviction::Lru => builder.build(),
            Eviction::LruWithTtl { ttl } => builder.time_to_live(ttl).build(),
        };

        info!(
            "In-memory cache ready (max_items={}, eviction={:?})",
            config.max_items,
            config.eviction()
        );

        Ok(Self {
            cache,
            metrics: CacheMetrics::new(),
        })
    }

    /// Number of entries, including ones awaiting eviction bookkeeping.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Apply pending evictions and expirations now.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    pub fn health_check(&self) -> HealthCheck {
        HealthCheck::new(ORIGIN_IN_MEMORY, HealthStatus::Healthy, 0, &self.metrics)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(DEFAULT_MAX_ITEMS)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
            metrics: CacheMetrics::new(),
        }
    }
}

#[async_trait]
impl CacheInteractor for InMemoryCache {
    async fn set(&self, key: &str, value: &CachedResponse) -> Result<()> {
        let size = value.body.len() as u64;
        self.cache.insert(key.to_string(), value.clone());
        self.metrics.record_set(size);
        debug!("Stored {} in memory", key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<CachedResponse> {
        match self.cache.get(key) {
            Some(value) => {
                self.metrics.record_hit(value.body.len() as u64);
                debug!("Memory hit for {}", key);
                Ok(value)
            }
            None => {
                self.metrics.record_miss();
                debug!("Memory miss for {}", key);
                Err(Error::CacheMissed)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.cache.invalidate(key);
        self.metrics.record_delete();
        debug!("Deleted {} from memory", key);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        self.cache.invalidate_all();
        self.metrics.record_flush();
        debug!("Flushed in-memory cache");
        Ok(())
    }

    fn origin(&self) -> &'static str {
        ORIGIN_IN_MEMORY
    }
}
