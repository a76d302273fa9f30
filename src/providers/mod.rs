//! Provider boundary: the uniform fetch interface every data source
//! implements, plus the per-provider call counters the collector keeps.
//!
//! Providers catch their own failures and return errors only from their
//! boundary; the collector contains anything that still escapes and
//! records the outcome of every fetch attempt, including timeouts the
//! provider itself never sees.

pub mod client;
pub mod dexscreener;

use crate::types::RawRecord;
use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Per-provider call counters for the run report
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProviderStats {
    pub calls: u64,
    pub successes: u64,
    pub failures: u64,
    pub total_latency_ms: f64,
}

/// Tracks call outcomes for one provider. Owned by the collector so
/// failures and timeouts at the fetch boundary are counted too.
#[derive(Default)]
pub struct ProviderStatsTracker {
    inner: Mutex<ProviderStats>,
}

impl ProviderStatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, success: bool, latency_ms: f64) {
        let mut stats = self.inner.lock().await;
        stats.calls += 1;
        if success {
            stats.successes += 1;
        } else {
            stats.failures += 1;
        }
        stats.total_latency_ms += latency_ms;
    }

    pub async fn snapshot(&self) -> ProviderStats {
        self.inner.lock().await.clone()
    }
}

/// Uniform fetch capability per data source.
#[async_trait]
pub trait TokenDataProvider: Send + Sync {
    /// Stable provider identifier, used as the platform key in records.
    fn id(&self) -> &str;

    /// Bulk/trending pull. A payload spanning multiple token addresses
    /// must already be exploded into one record per address.
    async fn fetch(&self) -> Result<Vec<RawRecord>>;

    /// Targeted lookup for pricing-style providers. Optional; the
    /// default returns nothing.
    async fn fetch_batch(&self, _addresses: &[String]) -> Result<HashMap<String, RawRecord>> {
        Ok(HashMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stats_tracker_accumulates() {
        let tracker = ProviderStatsTracker::new();
        tracker.record(true, 120.0).await;
        tracker.record(false, 30.0).await;

        let stats = tracker.snapshot().await;
        assert_eq!(stats.calls, 2);
        assert_eq!(stats.successes, 1);
        assert_eq!(stats.failures, 1);
        assert!((stats.total_latency_ms - 150.0).abs() < f64::EPSILON);
    }
}
