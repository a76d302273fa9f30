//! Core record types shared across the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Attribute keys providers write into [`RawRecord::attributes`].
///
/// Adapters normalize their payloads onto these keys so the normalizer
/// and scorer never branch on provider identity.
pub mod attr {
    pub const SYMBOL: &str = "symbol";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const VOLUME_24H: &str = "volume_24h";
    pub const LIQUIDITY_USD: &str = "liquidity_usd";
    pub const PRICE_CHANGE_24H: &str = "price_change_24h";
    pub const BOOST_AMOUNT: &str = "boost_amount";
    pub const SENTIMENT_RATIO: &str = "sentiment_ratio";
    pub const SECURITY_SCORE: &str = "security_score";
    pub const SMART_MONEY_SCORE: &str = "smart_money_score";
    pub const WHALE_CONCENTRATION: &str = "whale_concentration";
    pub const AGE_HOURS: &str = "age_hours";
    pub const BASE_PAIRED: &str = "base_paired";
}

/// One provider's view of one token. Write-once per provider per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRecord {
    pub provider_id: String,
    pub token_address: String,
    pub attributes: Map<String, Value>,
    pub fetched_at: DateTime<Utc>,
}

impl RawRecord {
    pub fn new(provider_id: &str, token_address: &str, attributes: Map<String, Value>) -> Self {
        Self {
            provider_id: provider_id.to_string(),
            token_address: token_address.to_string(),
            attributes,
            fetched_at: Utc::now(),
        }
    }
}

/// Aggregate per-token record, keyed by canonical address.
///
/// Created on first sighting by the normalizer and mutated additively
/// (platform union, per-provider attribute merge) until the analysis
/// phase completes; downstream components treat it as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenRecord {
    pub address: String,
    /// Provider ids that reported this token. Grows monotonically.
    pub platforms: BTreeSet<String>,
    /// Last-write-wins per provider; fields within a provider accumulate.
    pub per_platform_data: BTreeMap<String, Map<String, Value>>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    /// Derived; recomputed whenever scoring runs.
    pub score: f64,
    #[serde(skip)]
    pub needs_symbol_resolution: bool,
}

impl TokenRecord {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            platforms: BTreeSet::new(),
            per_platform_data: BTreeMap::new(),
            symbol: None,
            name: None,
            score: 0.0,
            needs_symbol_resolution: false,
        }
    }

    pub fn platform_count(&self) -> usize {
        self.platforms.len()
    }

    /// Look up a numeric attribute across all providers, first match wins
    /// in provider-id order (BTreeMap iteration is deterministic).
    pub fn numeric_attr(&self, key: &str) -> Option<f64> {
        self.per_platform_data
            .values()
            .find_map(|attrs| attrs.get(key).and_then(Value::as_f64))
    }

    /// Largest numeric value reported for an attribute across providers.
    pub fn max_numeric_attr(&self, key: &str) -> Option<f64> {
        self.per_platform_data
            .values()
            .filter_map(|attrs| attrs.get(key).and_then(Value::as_f64))
            .fold(None, |acc, v| match acc {
                Some(best) if best >= v => Some(best),
                _ => Some(v),
            })
    }

    /// String attribute from a specific provider.
    pub fn provider_str_attr(&self, provider: &str, key: &str) -> Option<&str> {
        self.per_platform_data
            .get(provider)
            .and_then(|attrs| attrs.get(key))
            .and_then(Value::as_str)
    }
}

/// Promotional boost tier, classified from the raw boost amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoostTier {
    Golden,
    Platinum,
    Gold,
    Silver,
    Bronze,
    Basic,
}

impl BoostTier {
    pub fn from_amount(amount: f64) -> Self {
        if amount >= 500.0 {
            BoostTier::Golden
        } else if amount >= 100.0 {
            BoostTier::Platinum
        } else if amount >= 50.0 {
            BoostTier::Gold
        } else if amount >= 20.0 {
            BoostTier::Silver
        } else if amount >= 5.0 {
            BoostTier::Bronze
        } else {
            BoostTier::Basic
        }
    }

    pub fn is_golden(&self) -> bool {
        matches!(self, BoostTier::Golden)
    }
}

/// Normalized (0.0-1.0) scoring inputs, derived per token per scoring
/// pass from `per_platform_data`. Never persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactorValues {
    pub volume_momentum: f64,
    pub liquidity: f64,
    pub smart_money_score: f64,
    pub security_score: f64,
    pub price_momentum: f64,
    pub cross_platform_validation: f64,
    pub whale_concentration: f64,
    pub age_factor: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boost_tier_boundaries() {
        assert_eq!(BoostTier::from_amount(499.0), BoostTier::Platinum);
        assert_eq!(BoostTier::from_amount(500.0), BoostTier::Golden);
        assert_eq!(BoostTier::from_amount(100.0), BoostTier::Platinum);
        assert_eq!(BoostTier::from_amount(99.9), BoostTier::Gold);
        assert_eq!(BoostTier::from_amount(20.0), BoostTier::Silver);
        assert_eq!(BoostTier::from_amount(5.0), BoostTier::Bronze);
        assert_eq!(BoostTier::from_amount(4.9), BoostTier::Basic);
        assert_eq!(BoostTier::from_amount(0.0), BoostTier::Basic);
    }

    #[test]
    fn max_numeric_attr_across_providers() {
        let mut token = TokenRecord::new("MintAAAA");
        let mut a = Map::new();
        a.insert(attr::VOLUME_24H.into(), 100_000.0.into());
        let mut b = Map::new();
        b.insert(attr::VOLUME_24H.into(), 250_000.0.into());
        token.per_platform_data.insert("dexscreener".into(), a);
        token.per_platform_data.insert("geckoterminal".into(), b);

        assert_eq!(token.max_numeric_attr(attr::VOLUME_24H), Some(250_000.0));
    }
}
