//! Redis-backed cache with compressed payloads.
//!
//! Each entry is stored as `compress(json(CachedResponse))` under the exact
//! cache key, with no framing. A payload that fails to decompress is treated
//! as unusable: the key is deleted and the lookup reports
//! `Error::InvalidCachedResponse`, so the next lookup is a plain miss.

use crate::compression::{CompressionEngine, CompressionProvider};
use crate::config::{RedisConfig, whole_millis};
use crate::health::{HealthCheck, HealthStatus};
use crate::metrics::{CacheMetrics, LatencyTimer};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, RedisResult};
use respcache_core::{CacheInteractor, CachedResponse, Error, ORIGIN_REDIS, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Serialize and compress a response into its stored form.
pub fn encode_entry(engine: &CompressionEngine, value: &CachedResponse) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(value)?;
    engine
        .compress(&json)
        .map_err(|e| Error::StorageInternal(e.to_string()))
}

/// Decompress and deserialize a stored payload.
///
/// Bytes that do not decompress yield `Error::InvalidCachedResponse`; a
/// payload that decompresses but is not a valid response yields
/// `Error::StorageInternal`. Without a codec there is no decompression step
/// to reject malformed bytes, so a payload that does not parse is invalid.
pub fn decode_entry(engine: &CompressionEngine, raw: &[u8]) -> Result<CachedResponse> {
    let json = engine.decompress(raw).map_err(|e| {
        debug!("Stored payload failed to decompress: {}", e);
        Error::InvalidCachedResponse
    })?;
    match serde_json::from_slice(&json) {
        Ok(value) => Ok(value),
        Err(e) if engine.provider() == CompressionProvider::None => {
            debug!("Uncompressed payload failed to parse: {}", e);
            Err(Error::InvalidCachedResponse)
        }
        Err(e) => Err(e.into()),
    }
}

fn set_command(key: &str, payload: &[u8], expiry: Duration) -> redis::Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(payload);
    if !expiry.is_zero() {
        cmd.arg("PX").arg(whole_millis(expiry));
    }
    cmd
}

/// Cache backend over a shared Redis connection.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    engine: CompressionEngine,
    expiry: Duration,
    operation_timeout: Option<Duration>,
    metrics: Arc<CacheMetrics>,
}

impl RedisCache {
    /// Build the compression engine and connect to the configured server.
    ///
    /// An unusable compression setup is reported before any network I/O.
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let engine = CompressionEngine::new(config.compression, config.compression_params())?;
        let url = config.connection_url()?;

        info!(
            "Connecting to Redis at {} (db {}, compression {})",
            config.addr,
            config.db,
            engine.provider()
        );

        let client = redis::Client::open(url)
            .map_err(|e| Error::Configuration(format!("Invalid Redis connection info: {}", e)))?;

        let timeout = config.operation_timeout();
        let connecting = ConnectionManager::new(client);
        let connected = if timeout.is_zero() {
            connecting.await
        } else {
            tokio::time::timeout(timeout, connecting).await.map_err(|_| {
                Error::Configuration(format!("Timed out connecting to Redis at {}", config.addr))
            })?
        };
        let conn = connected
            .map_err(|e| Error::Configuration(format!("Failed to connect to Redis: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self::new(conn, config.expiry(), engine).with_operation_timeout(timeout))
    }

    /// Wrap an existing connection. A zero `expiry` keeps entries until
    /// they are deleted or flushed.
    pub fn new(conn: ConnectionManager, expiry: Duration, engine: CompressionEngine) -> Self {
        Self {
            conn,
            engine,
            expiry,
            operation_timeout: Some(DEFAULT_OPERATION_TIMEOUT),
            metrics: CacheMetrics::new(),
        }
    }

    /// Bound every round trip; zero disables the bound.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    pub fn engine(&self) -> &CompressionEngine {
        &self.engine
    }

    pub fn metrics(&self) -> &Arc<CacheMetrics> {
        &self.metrics
    }

    /// Round-trip a PING to the server.
    pub async fn health_check(&self) -> HealthCheck {
        let timer = LatencyTimer::start();
        let mut conn = self.conn.clone();
        let status = match self
            .run::<String, _>("PING", redis::cmd("PING").query_async(&mut conn))
            .await
        {
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy {
                reason: e.to_string(),
            },
        };
        HealthCheck::new(ORIGIN_REDIS, status, timer.elapsed_ms(), &self.metrics)
    }

    /// Drive one Redis call, translating transport failures and timeouts.
    async fn run<T, F>(&self, op: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        let outcome = match self.operation_timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    self.metrics.record_error();
                    warn!("Redis {} timed out after {:?}", op, limit);
                    return Err(Error::StorageInternal(format!(
                        "{} timed out after {:?}",
                        op, limit
                    )));
                }
            },
            None => call.await,
        };

        outcome.map_err(|e| {
            self.metrics.record_error();
            error!("Redis {} failed: {}", op, e);
            Error::StorageInternal(format!("{} failed: {}", op, e))
        })
    }
}

#[async_trait]
impl CacheInteractor for RedisCache {
    async fn set(&self, key: &str, value: &CachedResponse) -> Result<()> {
        let payload = encode_entry(&self.engine, value).inspect_err(|_| {
            self.metrics.record_error();
        })?;

        let cmd = set_command(key, &payload, self.expiry);
        let mut conn = self.conn.clone();
        let _: () = self.run("SET", cmd.query_async(&mut conn)).await?;

        self.metrics.record_set(payload.len() as u64);
        debug!("Stored {} ({} bytes)", key, payload.len());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<CachedResponse> {
        let mut conn = self.conn.clone();
        let raw: Option<Vec<u8>> = self.run("GET", conn.get(key)).await?;

        let Some(raw) = raw else {
            self.metrics.record_miss();
            debug!("Redis miss for {}", key);
            return Err(Error::CacheMissed);
        };

        match decode_entry(&self.engine, &raw) {
            Ok(value) => {
                self.metrics.record_hit(raw.len() as u64);
                debug!("Redis hit for {}", key);
                Ok(value)
            }
            Err(Error::InvalidCachedResponse) => {
                self.metrics.record_invalid();
                warn!("Purging undecodable entry {}", key);
                let purged: Result<i64> = self.run("DEL", conn.del(key)).await;
                if let Err(e) = purged {
                    warn!("Could not purge {}: {}", key, e);
                }
                Err(Error::InvalidCachedResponse)
            }
            Err(e) => {
                self.metrics.record_error();
                error!("Entry {} decompressed but did not decode: {}", key, e);
                Err(e)
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let removed: i64 = self.run("DEL", conn.del(key)).await?;
        self.metrics.record_delete();
        debug!("Deleted {} ({} removed)", key, removed);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = self
            .run("FLUSHDB", redis::cmd("FLUSHDB").query_async(&mut conn))
            .await?;
        self.metrics.record_flush();
        info!("Flushed Redis database");
        Ok(())
    }

    fn origin(&self) -> &'static str {
        ORIGIN_REDIS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::CompressionParams;

    fn sample() -> CachedResponse {
        CachedResponse::new(200)
            .with_header("X", "1")
            .with_body("hi")
            .with_request("GET", "https://example.com/a")
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let engine = CompressionEngine::default();
        let stored = encode_entry(&engine, &sample()).unwrap();
        assert_eq!(decode_entry(&engine, &stored).unwrap(), sample());
    }

    #[test]
    fn test_stored_form_is_compressed_json() {
        let engine = CompressionEngine::default();
        let stored = encode_entry(&engine, &sample()).unwrap();

        let json = engine.decompress(&stored).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["status"], 200);
        assert_ne!(stored, json);
    }

    #[test]
    fn test_uncompressed_legacy_payload_is_invalid() {
        let engine = CompressionEngine::default();
        let legacy = serde_json::to_vec(&sample()).unwrap();
        assert!(matches!(
            decode_entry(&engine, &legacy),
            Err(Error::InvalidCachedResponse)
        ));
    }

    #[test]
    fn test_garbage_is_invalid() {
        let engine = CompressionEngine::default();
        assert!(matches!(
            decode_entry(&engine, b"\x00\x01garbage"),
            Err(Error::InvalidCachedResponse)
        ));
    }

    #[test]
    fn test_compressed_non_response_is_storage_internal() {
        let engine = CompressionEngine::default();
        let stored = engine.compress(b"[1,2,3]").unwrap();
        assert!(matches!(
            decode_entry(&engine, &stored),
            Err(Error::StorageInternal(_))
        ));
    }

    #[test]
    fn test_codec_mismatch_is_invalid() {
        let gzip =
            CompressionEngine::new(CompressionProvider::Gzip, CompressionParams::default()).unwrap();
        let stored = encode_entry(&gzip, &sample()).unwrap();
        assert!(matches!(
            decode_entry(&CompressionEngine::default(), &stored),
            Err(Error::InvalidCachedResponse)
        ));
    }

    #[test]
    fn test_uncompressed_garbage_is_invalid() {
        let none =
            CompressionEngine::new(CompressionProvider::None, CompressionParams::default()).unwrap();
        assert!(matches!(
            decode_entry(&none, b"\x00\x01garbage"),
            Err(Error::InvalidCachedResponse)
        ));

        let stored = encode_entry(&none, &sample()).unwrap();
        assert_eq!(decode_entry(&none, &stored).unwrap(), sample());
    }

    fn simple_args(cmd: &redis::Cmd) -> Vec<Vec<u8>> {
        cmd.args_iter()
            .filter_map(|arg| match arg {
                redis::Arg::Simple(bytes) => Some(bytes.to_vec()),
                redis::Arg::Cursor => None,
            })
            .collect()
    }

    #[test]
    fn test_set_command_expiry() {
        let args = simple_args(&set_command("k", b"v", Duration::ZERO));
        assert_eq!(args, vec![b"SET".to_vec(), b"k".to_vec(), b"v".to_vec()]);

        let args = simple_args(&set_command("k", b"v", Duration::from_millis(1500)));
        assert_eq!(&args[3..], &[b"PX".to_vec(), b"1500".to_vec()]);

        // A sub-millisecond expiry must never become `PX 0`.
        let args = simple_args(&set_command("k", b"v", Duration::from_micros(500)));
        assert_eq!(&args[3..], &[b"PX".to_vec(), b"1".to_vec()]);
    }

    #[tokio::test]
    async fn test_connect_rejects_bad_compression_before_io() {
        // Nothing listens on this port; the engine check must fail first.
        let config = RedisConfig::new("127.0.0.1:1")
            .with_compression(CompressionProvider::Zstd, Some(99));
        let result = RedisCache::connect(config).await;
        assert!(matches!(result, Err(Error::Configuration(msg)) if msg.contains("level")));
    }

    #[tokio::test]
    #[ignore] // Requires Redis server
    async fn test_connect() {
        let cache = RedisCache::connect(RedisConfig::default()).await.unwrap();
        assert!(cache.health_check().await.status.is_healthy());
    }
}
