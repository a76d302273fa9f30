//! Symbol resolver: best-effort batched backfill of missing display
//! symbols via a lookup collaborator.
//!
//! Batches run strictly sequentially with a pause in between to bound
//! outbound request pressure; lookups within a batch run concurrently.
//! Failures are skipped silently and never abort the pipeline. A token
//! is attempted at most once per run.

use crate::cache::{AnalysisCache, NS_SYMBOLS};
use crate::config::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::logger::{self, LogTag};
use crate::types::TokenRecord;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::time::{sleep, timeout};

/// Resolved display identity for a token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenIdentity {
    pub symbol: String,
    pub name: Option<String>,
}

/// Collaborator performing the actual symbol lookup.
#[async_trait]
pub trait SymbolLookup: Send + Sync {
    async fn lookup(&self, address: &str) -> Result<Option<TokenIdentity>>;
}

pub struct SymbolResolver {
    lookup: Arc<dyn SymbolLookup>,
    cache: Arc<AnalysisCache>,
    config: AnalysisConfig,
}

impl SymbolResolver {
    pub fn new(
        lookup: Arc<dyn SymbolLookup>,
        cache: Arc<AnalysisCache>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            lookup,
            cache,
            config,
        }
    }

    /// Resolve every token flagged `needs_symbol_resolution`. Returns
    /// the number of symbols filled in. Safe to call with nothing to do.
    pub async fn resolve(&self, tokens: &mut BTreeMap<String, TokenRecord>) -> usize {
        let pending: Vec<String> = tokens
            .values()
            .filter(|t| t.needs_symbol_resolution)
            .map(|t| t.address.clone())
            .collect();

        if pending.is_empty() {
            return 0;
        }

        logger::info(
            LogTag::Resolver,
            &format!("Resolving symbols for {} tokens", pending.len()),
        );

        let batch_size = self.config.resolver_batch_size.max(1);
        let mut resolved = 0usize;

        for (batch_index, batch) in pending.chunks(batch_size).enumerate() {
            if batch_index > 0 {
                sleep(self.config.resolver_batch_pause).await;
            }

            let lookups = batch.iter().map(|address| {
                let address = address.clone();
                async move {
                    let identity = self.lookup_one(&address).await;
                    (address, identity)
                }
            });

            for (address, identity) in join_all(lookups).await {
                let token = match tokens.get_mut(&address) {
                    Some(t) => t,
                    None => continue,
                };
                // Attempted once per run regardless of outcome
                token.needs_symbol_resolution = false;

                if let Some(identity) = identity {
                    token.symbol = Some(identity.symbol);
                    if token.name.is_none() {
                        token.name = identity.name;
                    }
                    resolved += 1;
                }
            }
        }

        logger::info(
            LogTag::Resolver,
            &format!("Resolved {}/{} symbols", resolved, pending.len()),
        );
        resolved
    }

    async fn lookup_one(&self, address: &str) -> Option<TokenIdentity> {
        if let Some(cached) = self.cache.get(NS_SYMBOLS, address, None) {
            if let Ok(identity) = serde_json::from_value::<TokenIdentity>(cached) {
                return Some(identity);
            }
        }

        let result = timeout(self.config.resolver_timeout, self.lookup.lookup(address)).await;

        let identity = match result {
            Ok(Ok(Some(identity))) => identity,
            Ok(Ok(None)) => return None,
            Ok(Err(e)) => {
                let err = AnalysisError::ResolutionFailure {
                    address: address.to_string(),
                    reason: e.to_string(),
                };
                logger::debug(LogTag::Resolver, &err.to_string());
                return None;
            }
            Err(_) => {
                let err = AnalysisError::ResolutionFailure {
                    address: address.to_string(),
                    reason: "lookup timed out".to_string(),
                };
                logger::debug(LogTag::Resolver, &err.to_string());
                return None;
            }
        };

        let symbol = identity.symbol.trim();
        if symbol.is_empty() || symbol.eq_ignore_ascii_case("unknown") {
            return None;
        }

        let identity = TokenIdentity {
            symbol: symbol.to_string(),
            name: identity.name,
        };
        if let Ok(value) = serde_json::to_value(&identity) {
            self.cache.set(NS_SYMBOLS, address, value, None);
        }
        Some(identity)
    }
}
