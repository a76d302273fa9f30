/// Cache TTL policy per namespace
///
/// TTLs tuned per data kind:
/// - Token data: medium, re-merged each stage within a run
/// - Provider responses: short, upstream feeds refresh quickly
/// - Symbols: long, identity changes rarely
/// - Exclusions: loaded once per run, kept a while
use std::time::Duration;

pub const NS_TOKEN_DATA: &str = "token_data";
pub const NS_PROVIDER_RESPONSE: &str = "provider_response";
pub const NS_SYMBOLS: &str = "symbols";
pub const NS_EXCLUSIONS: &str = "exclusions";

#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// Time-to-live, enforced at read time
    pub ttl: Duration,
    /// Estimated cost of the upstream call a hit avoids, in USD
    pub avoided_call_cost: f64,
}

impl CachePolicy {
    pub fn token_data() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            avoided_call_cost: 0.002,
        }
    }

    pub fn provider_response() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            avoided_call_cost: 0.005,
        }
    }

    pub fn symbols() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            avoided_call_cost: 0.002,
        }
    }

    pub fn exclusions() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            avoided_call_cost: 0.001,
        }
    }

    pub fn custom(ttl_secs: u64, avoided_call_cost: f64) -> Self {
        Self {
            ttl: Duration::from_secs(ttl_secs),
            avoided_call_cost,
        }
    }

    /// Policy for a namespace; unknown namespaces get the token-data policy.
    pub fn for_namespace(namespace: &str) -> Self {
        match namespace {
            NS_PROVIDER_RESPONSE => Self::provider_response(),
            NS_SYMBOLS => Self::symbols(),
            NS_EXCLUSIONS => Self::exclusions(),
            _ => Self::token_data(),
        }
    }
}
