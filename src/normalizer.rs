//! Normalizer: folds raw per-provider records into one aggregate
//! [`TokenRecord`] per canonical address.
//!
//! The merge is commutative and idempotent: the same record processed
//! twice, or providers processed in any order, yield the same final
//! record. Excluded addresses never produce a record.

use crate::cache::{AnalysisCache, NS_TOKEN_DATA};
use crate::config::AnalysisConfig;
use crate::errors::AnalysisError;
use crate::exclusions::ExclusionRegistry;
use crate::logger::{self, LogTag};
use crate::types::{attr, RawRecord, TokenRecord};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Display-field extraction order: most authoritative market source
/// first, then secondary/narrative sources.
const SYMBOL_PRIORITY: &[&str] = &["dexscreener", "geckoterminal", "jupiter", "rugcheck"];

pub struct Normalizer<'a> {
    exclusions: &'a ExclusionRegistry,
    cache: Arc<AnalysisCache>,
    config: AnalysisConfig,
}

impl<'a> Normalizer<'a> {
    pub fn new(
        exclusions: &'a ExclusionRegistry,
        cache: Arc<AnalysisCache>,
        config: AnalysisConfig,
    ) -> Self {
        Self {
            exclusions,
            cache,
            config,
        }
    }

    /// Merge all collected records into aggregate token records.
    pub fn normalize(
        &self,
        collected: &HashMap<String, Vec<RawRecord>>,
    ) -> BTreeMap<String, TokenRecord> {
        let mut tokens: BTreeMap<String, TokenRecord> = BTreeMap::new();
        let mut dropped_excluded = 0usize;
        let mut dropped_malformed = 0usize;

        for records in collected.values() {
            for record in records {
                let address = match canonical_address(&record.token_address) {
                    Some(a) => a,
                    None => {
                        dropped_malformed += 1;
                        let err = AnalysisError::MalformedRecord {
                            address: record.token_address.clone(),
                            reason: format!("empty address from '{}'", record.provider_id),
                        };
                        logger::warning(LogTag::Normalizer, &format!("Skipping: {}", err));
                        continue;
                    }
                };

                if self.exclusions.contains(&address) {
                    dropped_excluded += 1;
                    continue;
                }

                let token = tokens
                    .entry(address.clone())
                    .or_insert_with(|| TokenRecord::new(&address));

                token.platforms.insert(record.provider_id.clone());
                let platform_attrs = token
                    .per_platform_data
                    .entry(record.provider_id.clone())
                    .or_default();
                // Shallow merge: fields from multiple records accumulate
                for (key, value) in &record.attributes {
                    platform_attrs.insert(key.clone(), value.clone());
                }

                self.cache.set(
                    NS_TOKEN_DATA,
                    &address,
                    Value::Object(platform_attrs.clone()),
                    Some(&record.provider_id),
                );
            }
        }

        if self.config.require_base_pair {
            tokens.retain(|_, token| {
                token.per_platform_data.values().any(|attrs| {
                    attrs.get(attr::BASE_PAIRED).and_then(Value::as_bool) == Some(true)
                })
            });
        }

        for token in tokens.values_mut() {
            extract_display_fields(token);
        }

        logger::info(
            LogTag::Normalizer,
            &format!(
                "Normalized {} tokens ({} excluded, {} malformed)",
                tokens.len(),
                dropped_excluded,
                dropped_malformed
            ),
        );

        tokens
    }
}

/// Canonicalize an address: trim whitespace, preserve case. Empty
/// input is malformed.
fn canonical_address(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Fill `symbol`/`name` from the fixed provider priority order, then a
/// description heuristic. Sets the resolution flag if nothing usable
/// was found.
fn extract_display_fields(token: &mut TokenRecord) {
    for provider in SYMBOL_PRIORITY {
        if let Some(attrs) = token.per_platform_data.get(*provider) {
            if token.symbol.is_none() {
                if let Some(symbol) = attrs.get(attr::SYMBOL).and_then(Value::as_str) {
                    if is_usable_symbol(symbol) {
                        token.symbol = Some(symbol.to_string());
                    }
                }
            }
            if token.name.is_none() {
                if let Some(name) = attrs.get(attr::NAME).and_then(Value::as_str) {
                    if !name.trim().is_empty() {
                        token.name = Some(name.trim().to_string());
                    }
                }
            }
        }
    }

    // Any remaining provider not in the priority list
    if token.symbol.is_none() {
        for attrs in token.per_platform_data.values() {
            if let Some(symbol) = attrs.get(attr::SYMBOL).and_then(Value::as_str) {
                if is_usable_symbol(symbol) {
                    token.symbol = Some(symbol.to_string());
                    break;
                }
            }
        }
    }

    // Last resort: first word of a narrative description
    if token.symbol.is_none() {
        for attrs in token.per_platform_data.values() {
            if let Some(desc) = attrs.get(attr::DESCRIPTION).and_then(Value::as_str) {
                if let Some(candidate) = symbol_from_description(desc) {
                    token.symbol = Some(candidate);
                    break;
                }
            }
        }
    }

    token.needs_symbol_resolution = token.symbol.is_none();
}

fn is_usable_symbol(symbol: &str) -> bool {
    let s = symbol.trim();
    !s.is_empty() && !s.eq_ignore_ascii_case("unknown")
}

/// Heuristic: take the first word of the description if it looks like
/// a ticker (short, alphanumeric after stripping a leading '$').
fn symbol_from_description(description: &str) -> Option<String> {
    let first = description.split_whitespace().next()?;
    let cleaned: String = first
        .trim_start_matches('$')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if cleaned.is_empty() || cleaned.len() > 10 {
        return None;
    }
    Some(cleaned.to_uppercase())
}
