//! Health reporting for cache backends.

use crate::metrics::{CacheMetrics, MetricsSnapshot};

/// Health status of a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Reachable and answering.
    Healthy,
    /// Not usable.
    Unhealthy { reason: String },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Health check result with details.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub status: HealthStatus,
    pub origin: &'static str,
    pub latency_ms: u64,
    pub metrics: MetricsSnapshot,
}

impl HealthCheck {
    pub fn new(
        origin: &'static str,
        status: HealthStatus,
        latency_ms: u64,
        metrics: &CacheMetrics,
    ) -> Self {
        Self {
            status,
            origin,
            latency_ms,
            metrics: metrics.snapshot(),
        }
    }
}
