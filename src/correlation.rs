//! Cross-provider correlation analysis: co-occurrence statistics and
//! effectiveness rankings over the scored token set.
//!
//! Malformed entries are skipped with a warning; one bad token never
//! aborts the pass.

use crate::logger::{self, LogTag};
use crate::types::{attr, BoostTier, TokenRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Compact per-token view used in rankings
#[derive(Debug, Clone, Serialize)]
pub struct TokenSummary {
    pub address: String,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub score: f64,
    pub platforms: Vec<String>,
    pub boost_tier: BoostTier,
}

impl TokenSummary {
    fn from_record(token: &TokenRecord) -> Self {
        Self {
            address: token.address.clone(),
            symbol: token.symbol.clone(),
            name: token.name.clone(),
            score: token.score,
            platforms: token.platforms.iter().cloned().collect(),
            boost_tier: BoostTier::from_amount(
                token.max_numeric_attr(attr::BOOST_AMOUNT).unwrap_or(0.0),
            ),
        }
    }
}

/// Per-provider effectiveness
#[derive(Debug, Clone, Serialize)]
pub struct PlatformAnalysis {
    pub token_count: usize,
    pub avg_score: f64,
    pub high_conviction_rate: f64,
    pub top_tokens: Vec<TokenSummary>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct CorrelationReport {
    pub total_tokens: usize,
    /// platform count -> number of tokens seen on exactly that many platforms
    pub platform_distribution: BTreeMap<usize, usize>,
    /// All tokens, sorted by score descending
    pub all_tokens: Vec<TokenSummary>,
    /// Tokens reported by more than one provider, sorted by score descending
    pub multi_platform_tokens: Vec<TokenSummary>,
    /// Tokens at or above the high-conviction threshold
    pub high_conviction_tokens: Vec<TokenSummary>,
    /// Symmetric co-occurrence counts per unordered provider pair
    pub correlation_matrix: BTreeMap<String, BTreeMap<String, u64>>,
    pub platform_analysis: BTreeMap<String, PlatformAnalysis>,
}

pub struct CorrelationAnalyzer {
    high_conviction_threshold: f64,
    top_tokens_per_platform: usize,
}

impl CorrelationAnalyzer {
    pub fn new(high_conviction_threshold: f64, top_tokens_per_platform: usize) -> Self {
        Self {
            high_conviction_threshold,
            top_tokens_per_platform,
        }
    }

    pub fn analyze(&self, tokens: &BTreeMap<String, TokenRecord>) -> CorrelationReport {
        let mut report = CorrelationReport::default();
        let mut per_platform: BTreeMap<String, Vec<TokenSummary>> = BTreeMap::new();

        for token in tokens.values() {
            if let Some(reason) = malformed_reason(token) {
                logger::warning(
                    LogTag::Correlation,
                    &format!("Skipping malformed token entry '{}': {}", token.address, reason),
                );
                continue;
            }

            let summary = TokenSummary::from_record(token);
            report.total_tokens += 1;
            *report
                .platform_distribution
                .entry(token.platform_count())
                .or_insert(0) += 1;

            let platforms: Vec<&String> = token.platforms.iter().collect();
            for (i, a) in platforms.iter().enumerate() {
                for b in platforms.iter().skip(i + 1) {
                    *report
                        .correlation_matrix
                        .entry((*a).clone())
                        .or_default()
                        .entry((*b).clone())
                        .or_insert(0) += 1;
                    *report
                        .correlation_matrix
                        .entry((*b).clone())
                        .or_default()
                        .entry((*a).clone())
                        .or_insert(0) += 1;
                }
            }

            for platform in &token.platforms {
                per_platform
                    .entry(platform.clone())
                    .or_default()
                    .push(summary.clone());
            }

            if token.platform_count() > 1 {
                report.multi_platform_tokens.push(summary.clone());
            }
            if token.score >= self.high_conviction_threshold {
                report.high_conviction_tokens.push(summary.clone());
            }
            report.all_tokens.push(summary);
        }

        sort_by_score_desc(&mut report.all_tokens);
        sort_by_score_desc(&mut report.multi_platform_tokens);
        sort_by_score_desc(&mut report.high_conviction_tokens);

        for (platform, mut summaries) in per_platform {
            sort_by_score_desc(&mut summaries);
            let token_count = summaries.len();
            let avg_score = summaries.iter().map(|s| s.score).sum::<f64>() / token_count as f64;
            let high_count = summaries
                .iter()
                .filter(|s| s.score >= self.high_conviction_threshold)
                .count();
            summaries.truncate(self.top_tokens_per_platform);

            report.platform_analysis.insert(
                platform,
                PlatformAnalysis {
                    token_count,
                    avg_score,
                    high_conviction_rate: high_count as f64 / token_count as f64,
                    top_tokens: summaries,
                },
            );
        }

        logger::info(
            LogTag::Correlation,
            &format!(
                "Analyzed {} tokens: {} multi-platform, {} high conviction",
                report.total_tokens,
                report.multi_platform_tokens.len(),
                report.high_conviction_tokens.len()
            ),
        );

        report
    }
}

fn malformed_reason(token: &TokenRecord) -> Option<&'static str> {
    if token.address.trim().is_empty() {
        return Some("empty address");
    }
    if token.platforms.is_empty() {
        return Some("no reporting platforms");
    }
    if !token.score.is_finite() {
        return Some("non-finite score");
    }
    None
}

fn sort_by_score_desc(summaries: &mut [TokenSummary]) {
    summaries.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.address.cmp(&b.address))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(address: &str, platforms: &[&str], score: f64) -> TokenRecord {
        let mut t = TokenRecord::new(address);
        for p in platforms {
            t.platforms.insert(p.to_string());
            t.per_platform_data.insert(p.to_string(), Default::default());
        }
        t.score = score;
        t
    }

    fn analyze(tokens: Vec<TokenRecord>) -> CorrelationReport {
        let map: BTreeMap<String, TokenRecord> =
            tokens.into_iter().map(|t| (t.address.clone(), t)).collect();
        CorrelationAnalyzer::new(50.0, 5).analyze(&map)
    }

    #[test]
    fn histogram_counts_platform_cardinality() {
        let report = analyze(vec![
            token("MintAAAA", &["a"], 10.0),
            token("MintBBBB", &["a", "b"], 20.0),
            token("MintCCCC", &["a", "b"], 30.0),
        ]);
        assert_eq!(report.platform_distribution[&1], 1);
        assert_eq!(report.platform_distribution[&2], 2);
        assert_eq!(report.total_tokens, 3);
    }

    #[test]
    fn matrix_is_symmetric_and_counts_pairs_once_per_token() {
        let report = analyze(vec![
            token("MintAAAA", &["a", "b", "c"], 10.0),
            token("MintBBBB", &["a", "b"], 20.0),
        ]);
        assert_eq!(report.correlation_matrix["a"]["b"], 2);
        assert_eq!(report.correlation_matrix["b"]["a"], 2);
        assert_eq!(report.correlation_matrix["a"]["c"], 1);
        assert_eq!(report.correlation_matrix["c"]["a"], 1);
        assert!(report.correlation_matrix["a"].get("a").is_none());
    }

    #[test]
    fn rankings_are_sorted_descending() {
        let report = analyze(vec![
            token("MintAAAA", &["a", "b"], 30.0),
            token("MintBBBB", &["a", "b"], 80.0),
            token("MintCCCC", &["a", "b"], 55.0),
        ]);
        let scores: Vec<f64> = report.all_tokens.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![80.0, 55.0, 30.0]);
        assert_eq!(report.multi_platform_tokens.len(), 3);
        assert_eq!(report.high_conviction_tokens.len(), 2);
    }

    #[test]
    fn single_platform_tokens_are_not_multi_platform() {
        let report = analyze(vec![token("MintAAAA", &["a"], 90.0)]);
        assert!(report.multi_platform_tokens.is_empty());
        assert_eq!(report.high_conviction_tokens.len(), 1);
    }

    #[test]
    fn platform_analysis_aggregates_per_provider() {
        let report = analyze(vec![
            token("MintAAAA", &["a"], 40.0),
            token("MintBBBB", &["a"], 60.0),
        ]);
        let analysis = &report.platform_analysis["a"];
        assert_eq!(analysis.token_count, 2);
        assert!((analysis.avg_score - 50.0).abs() < f64::EPSILON);
        assert!((analysis.high_conviction_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(analysis.top_tokens[0].address, "MintBBBB");
    }

    #[test]
    fn top_tokens_are_truncated() {
        let tokens: Vec<TokenRecord> = (0..10)
            .map(|i| token(&format!("Mint{:04}", i), &["a"], i as f64))
            .collect();
        let map: BTreeMap<String, TokenRecord> =
            tokens.into_iter().map(|t| (t.address.clone(), t)).collect();
        let report = CorrelationAnalyzer::new(50.0, 3).analyze(&map);
        assert_eq!(report.platform_analysis["a"].top_tokens.len(), 3);
        assert_eq!(report.platform_analysis["a"].token_count, 10);
    }

    #[test]
    fn malformed_entries_are_skipped_not_fatal() {
        let mut no_platforms = TokenRecord::new("MintAAAA");
        no_platforms.score = 10.0;
        let mut nan_score = token("MintBBBB", &["a"], 0.0);
        nan_score.score = f64::NAN;

        let report = analyze(vec![
            no_platforms,
            nan_score,
            token("MintCCCC", &["a"], 42.0),
        ]);
        assert_eq!(report.total_tokens, 1);
        assert_eq!(report.all_tokens[0].address, "MintCCCC");
    }

    #[test]
    fn empty_input_produces_empty_report() {
        let report = analyze(vec![]);
        assert_eq!(report.total_tokens, 0);
        assert!(report.all_tokens.is_empty());
        assert!(report.platform_analysis.is_empty());
    }
}
