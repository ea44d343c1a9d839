//! Counters for cache backend observability.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Operation counters shared by a backend.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    /// Lookups that returned an entry.
    pub hits: AtomicU64,
    /// Lookups that found nothing live.
    pub misses: AtomicU64,
    /// Lookups that found an undecodable entry.
    pub invalid_entries: AtomicU64,
    /// Successful writes.
    pub sets: AtomicU64,
    /// Successful deletes.
    pub deletes: AtomicU64,
    /// Successful flushes.
    pub flushes: AtomicU64,
    /// Operations that failed with a storage error.
    pub errors: AtomicU64,
    /// Payload bytes written to the store.
    pub bytes_written: AtomicU64,
    /// Payload bytes read from the store.
    pub bytes_read: AtomicU64,
}

impl CacheMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn record_hit(&self, bytes: u64) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_invalid(&self) {
        self.invalid_entries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set(&self, bytes: u64) {
        self.sets.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_flush(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of current metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalid_entries: self.invalid_entries.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub invalid_entries: u64,
    pub sets: u64,
    pub deletes: u64,
    pub flushes: u64,
    pub errors: u64,
    pub bytes_written: u64,
    pub bytes_read: u64,
}

impl MetricsSnapshot {
    /// Fraction of lookups served from the cache.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses + self.invalid_entries;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

/// Timer for measuring operation latency.
pub struct LatencyTimer {
    start: Instant,
}

impl LatencyTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_counts() {
        let metrics = CacheMetrics::new();
        metrics.record_set(120);
        metrics.record_hit(120);
        metrics.record_miss();
        metrics.record_invalid();
        metrics.record_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.sets, 1);
        assert_eq!(snapshot.bytes_written, 120);
        assert_eq!(snapshot.bytes_read, 120);
        assert_eq!(snapshot.errors, 1);
        assert!((snapshot.hit_ratio() - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_hit_ratio() {
        assert_eq!(MetricsSnapshot::default().hit_ratio(), 0.0);
    }
}
