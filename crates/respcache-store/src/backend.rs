//! Backend construction.

use crate::config::BackendConfig;
use crate::inmem::InMemoryCache;
use crate::redis_cache::RedisCache;
use respcache_core::{CacheInteractor, Result};
use std::sync::Arc;
use tracing::info;

/// Build the configured backend once, ready to hand to the caching layer.
pub async fn connect_backend(config: &BackendConfig) -> Result<Arc<dyn CacheInteractor>> {
    let backend: Arc<dyn CacheInteractor> = match config {
        BackendConfig::InMemory(config) => Arc::new(InMemoryCache::new(config)?),
        BackendConfig::Redis(config) => Arc::new(RedisCache::connect(config.clone()).await?),
    };
    info!("Cache backend initialized ({})", backend.origin());
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::CompressionProvider;
    use crate::config::{InMemoryConfig, RedisConfig};
    use respcache_core::{CachedResponse, Error};

    #[tokio::test]
    async fn test_default_backend_is_in_memory() {
        let backend = connect_backend(&BackendConfig::default()).await.unwrap();
        assert_eq!(backend.origin(), "inmemory");

        let value = CachedResponse::new(200).with_body("hi");
        backend.set("a", &value).await.unwrap();
        assert_eq!(backend.get("a").await.unwrap(), value);
    }

    #[tokio::test]
    async fn test_invalid_in_memory_config() {
        let config = BackendConfig::InMemory(InMemoryConfig::new().with_max_items(0));
        assert!(matches!(
            connect_backend(&config).await,
            Err(Error::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_invalid_redis_compression() {
        let config = BackendConfig::Redis(
            RedisConfig::new("127.0.0.1:1").with_compression(CompressionProvider::Lz4, Some(4)),
        );
        assert!(matches!(
            connect_backend(&config).await,
            Err(Error::Configuration(_))
        ));
    }
}
