//! Data collector: concurrent fan-out over all configured providers
//! with per-provider failure isolation.
//!
//! One slow or broken provider never blocks or fails the others; its
//! slot in the result map is simply an empty list. The collector keeps
//! the call counters itself, so a fetch that errors or times out is
//! still counted against the provider that caused it. Provider-level
//! responses are written through the cache and reused within TTL.

use crate::cache::{AnalysisCache, NS_PROVIDER_RESPONSE};
use crate::config::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::logger::{self, LogTag};
use crate::providers::{ProviderStats, ProviderStatsTracker, TokenDataProvider};
use crate::types::RawRecord;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;

pub struct DataCollector {
    providers: Vec<Arc<dyn TokenDataProvider>>,
    trackers: HashMap<String, ProviderStatsTracker>,
    cache: Arc<AnalysisCache>,
    config: AnalysisConfig,
}

impl DataCollector {
    pub fn new(
        providers: Vec<Arc<dyn TokenDataProvider>>,
        cache: Arc<AnalysisCache>,
        config: AnalysisConfig,
    ) -> Self {
        let trackers = providers
            .iter()
            .map(|p| (p.id().to_string(), ProviderStatsTracker::new()))
            .collect();
        Self {
            providers,
            trackers,
            cache,
            config,
        }
    }

    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    /// Fetch from every provider concurrently. Failures and timeouts
    /// are contained per provider and produce an empty list; every
    /// attempted fetch is counted, a cache hit is not.
    pub async fn collect_all(&self) -> HashMap<String, Vec<RawRecord>> {
        let fetches = self.providers.iter().map(|provider| {
            let provider = Arc::clone(provider);
            let tracker = self.trackers.get(provider.id());
            let cache = Arc::clone(&self.cache);
            let fetch_timeout = self.config.provider_timeout;
            async move {
                let id = provider.id().to_string();

                if let Some(cached) = cache.get(NS_PROVIDER_RESPONSE, &id, None) {
                    if let Ok(records) = serde_json::from_value::<Vec<RawRecord>>(cached) {
                        logger::debug(
                            LogTag::Collector,
                            &format!("Using cached response for '{}' ({} records)", id, records.len()),
                        );
                        return (id, records);
                    }
                }

                let start = Instant::now();
                match timeout(fetch_timeout, provider.fetch()).await {
                    Ok(Ok(records)) => {
                        let elapsed = start.elapsed();
                        if let Some(t) = tracker {
                            t.record(true, elapsed.as_millis() as f64).await;
                        }
                        logger::info(
                            LogTag::Collector,
                            &format!(
                                "Provider '{}' returned {} records in {}ms",
                                id,
                                records.len(),
                                elapsed.as_millis()
                            ),
                        );
                        if let Ok(value) = serde_json::to_value(&records) {
                            cache.set(NS_PROVIDER_RESPONSE, &id, value, None);
                        }
                        (id, records)
                    }
                    Ok(Err(e)) => {
                        if let Some(t) = tracker {
                            t.record(false, start.elapsed().as_millis() as f64).await;
                        }
                        let err = AnalysisError::ProviderUnavailable {
                            provider: id.clone(),
                            reason: e.to_string(),
                        };
                        logger::warning(
                            LogTag::Collector,
                            &format!("{} - continuing without it", err),
                        );
                        (id, Vec::new())
                    }
                    Err(_) => {
                        if let Some(t) = tracker {
                            t.record(false, fetch_timeout.as_millis() as f64).await;
                        }
                        let err = AnalysisError::ProviderUnavailable {
                            provider: id.clone(),
                            reason: format!("timed out after {}ms", fetch_timeout.as_millis()),
                        };
                        logger::warning(
                            LogTag::Collector,
                            &format!("{} - continuing without it", err),
                        );
                        (id, Vec::new())
                    }
                }
            }
        });

        join_all(fetches).await.into_iter().collect()
    }

    /// Per-provider call statistics, keyed by provider id. Counts every
    /// fetch attempt made through [`DataCollector::collect_all`].
    pub async fn call_statistics(&self) -> HashMap<String, ProviderStats> {
        let mut out = HashMap::new();
        for (id, tracker) in &self.trackers {
            out.insert(id.clone(), tracker.snapshot().await);
        }
        out
    }
}
