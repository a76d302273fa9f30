//! Namespaced in-memory cache with read-time TTL enforcement.
//!
//! Thread-safe behind an `RwLock`; writes to the same key are
//! last-write-wins. Expired entries count as misses and are overwritten
//! by the next write. Hit/miss accounting feeds the run report.

pub mod config;

pub use config::{
    CachePolicy, NS_EXCLUSIONS, NS_PROVIDER_RESPONSE, NS_SYMBOLS, NS_TOKEN_DATA,
};

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

struct CacheEntry {
    value: Value,
    written_at: Instant,
}

/// Cache counters for the run report
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStatistics {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate_percent: f64,
    pub estimated_cost_savings: f64,
}

#[derive(Default)]
struct Counters {
    hits: u64,
    misses: u64,
    savings: f64,
}

/// Namespaced TTL cache shared across pipeline stages
pub struct AnalysisCache {
    entries: RwLock<HashMap<(String, String, Option<String>), CacheEntry>>,
    policies: RwLock<HashMap<String, CachePolicy>>,
    counters: RwLock<Counters>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            policies: RwLock::new(HashMap::new()),
            counters: RwLock::new(Counters::default()),
        }
    }

    /// Override the policy for a namespace (defaults come from
    /// [`CachePolicy::for_namespace`]).
    pub fn set_policy(&self, namespace: &str, policy: CachePolicy) {
        self.policies
            .write()
            .unwrap()
            .insert(namespace.to_string(), policy);
    }

    fn policy(&self, namespace: &str) -> CachePolicy {
        self.policies
            .read()
            .unwrap()
            .get(namespace)
            .cloned()
            .unwrap_or_else(|| CachePolicy::for_namespace(namespace))
    }

    /// Get a value; expired or missing entries return `None` and count
    /// as a miss. Expired entries are removed so the next write starts
    /// fresh.
    pub fn get(&self, namespace: &str, key: &str, sub_key: Option<&str>) -> Option<Value> {
        let policy = self.policy(namespace);
        let full_key = (
            namespace.to_string(),
            key.to_string(),
            sub_key.map(str::to_string),
        );

        let mut entries = self.entries.write().unwrap();
        if let Some(entry) = entries.get(&full_key) {
            if entry.written_at.elapsed() <= policy.ttl {
                let value = entry.value.clone();
                let mut counters = self.counters.write().unwrap();
                counters.hits += 1;
                counters.savings += policy.avoided_call_cost;
                return Some(value);
            }
            entries.remove(&full_key);
        }

        self.counters.write().unwrap().misses += 1;
        None
    }

    /// Insert a value; last write wins.
    pub fn set(&self, namespace: &str, key: &str, value: Value, sub_key: Option<&str>) {
        let full_key = (
            namespace.to_string(),
            key.to_string(),
            sub_key.map(str::to_string),
        );
        self.entries.write().unwrap().insert(
            full_key,
            CacheEntry {
                value,
                written_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn statistics(&self) -> CacheStatistics {
        let counters = self.counters.read().unwrap();
        let total = counters.hits + counters.misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            counters.hits as f64 / total as f64 * 100.0
        };
        CacheStatistics {
            hits: counters.hits,
            misses: counters.misses,
            hit_rate_percent: hit_rate,
            estimated_cost_savings: counters.savings,
        }
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}
