//! DexScreener provider adapter.
//!
//! Reference implementation of [`TokenDataProvider`] against the public
//! DexScreener API (https://docs.dexscreener.com/api/reference).
//!
//! Endpoints used:
//! 1. /token-boosts/latest/v1 - promoted tokens with boost amounts
//! 2. /token-profiles/latest/v1 - newest token profiles
//! 3. /tokens/v1/{chainId}/{tokenAddresses} - batch pair lookup (up to 30)
//!
//! Every payload is flattened onto the canonical attribute keys in
//! [`crate::types::attr`]; a pair spanning two token roles is exploded
//! into one record per address.

use super::client::{HttpClient, RateLimiter};
use super::TokenDataProvider;
use crate::logger::{self, LogTag};
use crate::types::{attr, RawRecord};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";
const DEFAULT_CHAIN_ID: &str = "solana";
const MAX_TOKENS_PER_REQUEST: usize = 30;

/// Request timeout in seconds - DexScreener is fast, 10s is sufficient
pub const TIMEOUT_SECS: u64 = 10;

/// Rate limits per endpoint (requests per minute)
pub const RATE_LIMIT_LATEST_BOOSTS_PER_MINUTE: usize = 60;
pub const RATE_LIMIT_LATEST_PROFILES_PER_MINUTE: usize = 60;
pub const RATE_LIMIT_TOKEN_BATCH_PER_MINUTE: usize = 300;

#[derive(Debug, Deserialize)]
struct TokenBoost {
    #[serde(rename = "tokenAddress")]
    token_address: String,
    #[serde(rename = "chainId")]
    chain_id: Option<String>,
    amount: Option<f64>,
    #[serde(rename = "totalAmount")]
    total_amount: Option<f64>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenProfile {
    #[serde(rename = "tokenAddress")]
    token_address: String,
    #[serde(rename = "chainId")]
    chain_id: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PairToken {
    address: String,
    symbol: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PairVolume {
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PairLiquidity {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PairPriceChange {
    h24: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PairRaw {
    #[serde(rename = "baseToken")]
    base_token: PairToken,
    #[serde(rename = "quoteToken")]
    quote_token: Option<PairToken>,
    volume: Option<PairVolume>,
    liquidity: Option<PairLiquidity>,
    #[serde(rename = "priceChange")]
    price_change: Option<PairPriceChange>,
    #[serde(rename = "pairCreatedAt")]
    pair_created_at: Option<i64>,
}

/// DexScreener boost/profile/pair provider
pub struct DexScreenerProvider {
    http: HttpClient,
    enabled: bool,
    limiter_latest_boosts: RateLimiter,
    limiter_latest_profiles: RateLimiter,
    limiter_token_batch: RateLimiter,
}

impl DexScreenerProvider {
    pub fn new(enabled: bool, timeout_seconds: u64) -> Result<Self> {
        Ok(Self {
            http: HttpClient::new(timeout_seconds)?,
            enabled,
            limiter_latest_boosts: RateLimiter::new(RATE_LIMIT_LATEST_BOOSTS_PER_MINUTE),
            limiter_latest_profiles: RateLimiter::new(RATE_LIMIT_LATEST_PROFILES_PER_MINUTE),
            limiter_token_batch: RateLimiter::new(RATE_LIMIT_TOKEN_BATCH_PER_MINUTE),
        })
    }

    async fn get_json<T>(&self, endpoint: &str, limiter: &RateLimiter) -> Result<T>
    where
        T: DeserializeOwned,
    {
        if !self.enabled {
            return Err(anyhow!("DexScreener client disabled via configuration"));
        }

        let url = format!("{}/{}", DEXSCREENER_BASE_URL, endpoint);
        let guard = limiter.acquire().await?;
        let response_result = self
            .http
            .client()
            .get(&url)
            .timeout(self.http.timeout())
            .send()
            .await;
        drop(guard);

        let response = response_result.map_err(|e| anyhow!("request failed: {}", e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("DexScreener API error {}: {}", status, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| anyhow!("failed to parse response: {}", e))
    }

    fn boost_to_record(&self, boost: TokenBoost) -> RawRecord {
        let mut attributes = Map::new();
        let amount = boost.amount.or(boost.total_amount).unwrap_or(0.0);
        attributes.insert(attr::BOOST_AMOUNT.into(), Value::from(amount));
        if let Some(desc) = boost.description {
            attributes.insert(attr::DESCRIPTION.into(), Value::from(desc));
        }
        RawRecord::new(self.id(), &boost.token_address, attributes)
    }

    fn profile_to_record(&self, profile: TokenProfile) -> RawRecord {
        let mut attributes = Map::new();
        if let Some(desc) = profile.description {
            attributes.insert(attr::DESCRIPTION.into(), Value::from(desc));
        }
        RawRecord::new(self.id(), &profile.token_address, attributes)
    }

    /// Explode one pair into a record per token role it references.
    fn pair_to_records(&self, pair: PairRaw) -> Vec<RawRecord> {
        let mut shared = Map::new();
        if let Some(vol) = pair.volume.as_ref().and_then(|v| v.h24) {
            shared.insert(attr::VOLUME_24H.into(), Value::from(vol));
        }
        if let Some(liq) = pair.liquidity.as_ref().and_then(|l| l.usd) {
            shared.insert(attr::LIQUIDITY_USD.into(), Value::from(liq));
        }
        if let Some(chg) = pair.price_change.as_ref().and_then(|p| p.h24) {
            shared.insert(attr::PRICE_CHANGE_24H.into(), Value::from(chg));
        }
        if let Some(created_ms) = pair.pair_created_at {
            let age_hours = (chrono::Utc::now().timestamp_millis() - created_ms) as f64
                / (1000.0 * 3600.0);
            if age_hours.is_finite() && age_hours >= 0.0 {
                shared.insert(attr::AGE_HOURS.into(), Value::from(age_hours));
            }
        }

        let mut records = Vec::new();

        let mut base_attrs = shared.clone();
        if let Some(symbol) = pair.base_token.symbol {
            base_attrs.insert(attr::SYMBOL.into(), Value::from(symbol));
        }
        if let Some(name) = pair.base_token.name {
            base_attrs.insert(attr::NAME.into(), Value::from(name));
        }
        base_attrs.insert(attr::BASE_PAIRED.into(), Value::from(true));
        records.push(RawRecord::new(self.id(), &pair.base_token.address, base_attrs));

        if let Some(quote) = pair.quote_token {
            let mut quote_attrs = shared;
            if let Some(symbol) = quote.symbol {
                quote_attrs.insert(attr::SYMBOL.into(), Value::from(symbol));
            }
            if let Some(name) = quote.name {
                quote_attrs.insert(attr::NAME.into(), Value::from(name));
            }
            records.push(RawRecord::new(self.id(), &quote.address, quote_attrs));
        }

        records
    }
}

#[async_trait]
impl TokenDataProvider for DexScreenerProvider {
    fn id(&self) -> &str {
        "dexscreener"
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();

        logger::debug(LogTag::Api, "[DEXSCREENER] Fetching latest boosted tokens");
        match self
            .get_json::<Vec<TokenBoost>>("token-boosts/latest/v1", &self.limiter_latest_boosts)
            .await
        {
            Ok(boosts) => {
                records.extend(
                    boosts
                        .into_iter()
                        .filter(|b| b.chain_id.as_deref().unwrap_or(DEFAULT_CHAIN_ID) == DEFAULT_CHAIN_ID)
                        .map(|b| self.boost_to_record(b)),
                );
            }
            Err(e) => {
                logger::warning(LogTag::Api, &format!("[DEXSCREENER] boosts fetch failed: {}", e));
            }
        }

        logger::debug(LogTag::Api, "[DEXSCREENER] Fetching latest token profiles");
        match self
            .get_json::<Vec<TokenProfile>>("token-profiles/latest/v1", &self.limiter_latest_profiles)
            .await
        {
            Ok(profiles) => {
                records.extend(
                    profiles
                        .into_iter()
                        .filter(|p| p.chain_id.as_deref().unwrap_or(DEFAULT_CHAIN_ID) == DEFAULT_CHAIN_ID)
                        .map(|p| self.profile_to_record(p)),
                );
            }
            Err(e) => {
                logger::warning(LogTag::Api, &format!("[DEXSCREENER] profiles fetch failed: {}", e));
            }
        }

        if records.is_empty() {
            return Err(anyhow!("no data from any DexScreener endpoint"));
        }
        Ok(records)
    }

    async fn fetch_batch(&self, addresses: &[String]) -> Result<HashMap<String, RawRecord>> {
        if addresses.is_empty() {
            return Ok(HashMap::new());
        }
        if addresses.len() > MAX_TOKENS_PER_REQUEST {
            return Err(anyhow!(
                "too many addresses: {} (max {})",
                addresses.len(),
                MAX_TOKENS_PER_REQUEST
            ));
        }

        let endpoint = format!("tokens/v1/{}/{}", DEFAULT_CHAIN_ID, addresses.join(","));
        logger::debug(
            LogTag::Api,
            &format!("[DEXSCREENER] Fetching batch: {} addresses", addresses.len()),
        );

        let pairs: Vec<PairRaw> = self.get_json(&endpoint, &self.limiter_token_batch).await?;

        let mut out = HashMap::new();
        for pair in pairs {
            for record in self.pair_to_records(pair) {
                // One record per address; first (most liquid) pair wins
                out.entry(record.token_address.clone()).or_insert(record);
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl crate::resolver::SymbolLookup for DexScreenerProvider {
    async fn lookup(&self, address: &str) -> Result<Option<crate::resolver::TokenIdentity>> {
        let records = self.fetch_batch(&[address.to_string()]).await?;
        let record = match records.get(address) {
            Some(r) => r,
            None => return Ok(None),
        };
        let symbol = match record.attributes.get(attr::SYMBOL).and_then(Value::as_str) {
            Some(s) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Ok(None),
        };
        Ok(Some(crate::resolver::TokenIdentity {
            symbol,
            name: record
                .attributes
                .get(attr::NAME)
                .and_then(Value::as_str)
                .map(str::to_string),
        }))
    }
}
