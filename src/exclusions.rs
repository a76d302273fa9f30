//! Registry of token addresses that are always discarded during
//! normalization: the wrapped native asset and major stablecoins.
//!
//! Loaded once per run from an external source; falls back to a minimal
//! hardcoded set if the source is unavailable so normalization never
//! fails for lack of exclusions.

use crate::logger::{self, LogTag};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;

/// Wrapped SOL
pub const WRAPPED_SOL: &str = "So11111111111111111111111111111111111111112";
/// USDC
pub const USDC: &str = "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v";
/// USDT
pub const USDT: &str = "Es9vMFrzaCERmJfrF4H2FYD4KCoNkY11McCe8BenwNYB";

/// Collaborator supplying the canonical stable/wrapped-asset list.
#[async_trait]
pub trait ExclusionSource: Send + Sync {
    async fn get_excluded_addresses(&self) -> Result<HashSet<String>>;
}

pub struct ExclusionRegistry {
    addresses: HashSet<String>,
}

impl ExclusionRegistry {
    /// Load from the external source, falling back to the minimal
    /// hardcoded set on any failure.
    pub async fn load(source: &dyn ExclusionSource) -> Self {
        match source.get_excluded_addresses().await {
            Ok(addresses) if !addresses.is_empty() => {
                logger::info(
                    LogTag::Normalizer,
                    &format!("Loaded {} excluded addresses", addresses.len()),
                );
                Self { addresses }
            }
            Ok(_) => {
                logger::warning(
                    LogTag::Normalizer,
                    "Exclusion source returned empty set - using minimal fallback",
                );
                Self::fallback()
            }
            Err(e) => {
                logger::warning(
                    LogTag::Normalizer,
                    &format!("Exclusion source unavailable ({}) - using minimal fallback", e),
                );
                Self::fallback()
            }
        }
    }

    /// Minimal hardcoded set: wrapped native asset plus two major stablecoins.
    pub fn fallback() -> Self {
        let addresses = [WRAPPED_SOL, USDC, USDT]
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self { addresses }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.addresses.contains(address)
    }

    pub fn all(&self) -> &HashSet<String> {
        &self.addresses
    }
}
