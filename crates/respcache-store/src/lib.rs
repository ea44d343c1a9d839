//! Storage backends for respcache.
//!
//! Two implementations of [`respcache_core::CacheInteractor`]: a bounded
//! in-process store and a Redis store with compressed payloads.

pub mod backend;
pub mod compression;
pub mod config;
pub mod health;
pub mod inmem;
pub mod metrics;
pub mod redis_cache;
pub mod settings;

pub use backend::connect_backend;
pub use compression::{CompressionEngine, CompressionError, CompressionParams, CompressionProvider};
pub use crate::config::{BackendConfig, DEFAULT_MAX_ITEMS, Eviction, InMemoryConfig, RedisConfig};
pub use health::{HealthCheck, HealthStatus};
pub use inmem::InMemoryCache;
pub use metrics::{CacheMetrics, MetricsSnapshot};
pub use redis_cache::{RedisCache, decode_entry, encode_entry};
pub use settings::StoreSettings;
