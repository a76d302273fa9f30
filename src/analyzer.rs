//! Pipeline orchestrator: collect, normalize, resolve, score,
//! correlate, and render one analysis run into a [`RunReport`].
//!
//! The report schema is identical in both scoring modes and always
//! valid: recoverable failures only shrink the data, and a run-level
//! failure is carried in the `error` field with cache statistics
//! intact rather than raised to the caller.

use crate::cache::{AnalysisCache, CacheStatistics};
use crate::collector::DataCollector;
use crate::config::AnalysisConfig;
use crate::correlation::{CorrelationAnalyzer, CorrelationReport};
use crate::errors::AnalysisError;
use crate::exclusions::{ExclusionRegistry, ExclusionSource};
use crate::insights;
use crate::logger::{self, LogTag};
use crate::normalizer::Normalizer;
use crate::providers::{ProviderStats, TokenDataProvider};
use crate::resolver::{SymbolLookup, SymbolResolver};
use crate::scoring::{ScoringEngine, ScoringMode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::timeout;

/// Externally visible run artifact. Schema is stable across scoring
/// modes; only the score values differ.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,
    pub execution_time_seconds: f64,
    pub scoring_mode: ScoringMode,
    pub platform_data_counts: BTreeMap<String, usize>,
    pub correlations: CorrelationReport,
    pub insights: Vec<String>,
    pub cache_statistics: CacheStatistics,
    pub provider_statistics: BTreeMap<String, ProviderStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct PipelineOutput {
    platform_data_counts: BTreeMap<String, usize>,
    correlations: CorrelationReport,
    scoring_mode: ScoringMode,
    insights: Vec<String>,
}

pub struct ConvictionAnalyzer {
    collector: DataCollector,
    exclusion_source: Arc<dyn ExclusionSource>,
    symbol_lookup: Arc<dyn SymbolLookup>,
    cache: Arc<AnalysisCache>,
    config: AnalysisConfig,
}

impl ConvictionAnalyzer {
    pub fn new(
        providers: Vec<Arc<dyn TokenDataProvider>>,
        exclusion_source: Arc<dyn ExclusionSource>,
        symbol_lookup: Arc<dyn SymbolLookup>,
        config: AnalysisConfig,
    ) -> Self {
        let cache = Arc::new(AnalysisCache::new());
        let collector = DataCollector::new(providers, Arc::clone(&cache), config.clone());
        Self {
            collector,
            exclusion_source,
            symbol_lookup,
            cache,
            config,
        }
    }

    /// Execute one full analysis run. Never returns an error; failures
    /// surface through the report.
    pub async fn run(&self) -> RunReport {
        let started = Instant::now();
        let timestamp = Utc::now();
        logger::info(LogTag::Analyzer, "Starting conviction analysis run");

        let outcome = match self.config.run_timeout {
            Some(deadline) => match timeout(deadline, self.run_pipeline()).await {
                Ok(result) => result,
                Err(_) => {
                    logger::warning(
                        LogTag::Analyzer,
                        &format!(
                            "Run deadline of {}s exceeded - returning partial results",
                            deadline.as_secs_f64()
                        ),
                    );
                    Err(AnalysisError::pipeline("run", "deadline exceeded"))
                }
            },
            None => self.run_pipeline().await,
        };

        let provider_statistics: BTreeMap<String, ProviderStats> = self
            .collector
            .call_statistics()
            .await
            .into_iter()
            .collect();

        let report = match outcome {
            Ok(output) => RunReport {
                timestamp,
                execution_time_seconds: started.elapsed().as_secs_f64(),
                scoring_mode: output.scoring_mode,
                platform_data_counts: output.platform_data_counts,
                correlations: output.correlations,
                insights: output.insights,
                cache_statistics: self.cache.statistics(),
                provider_statistics,
                error: None,
            },
            Err(e) => {
                logger::error(LogTag::Analyzer, &format!("Run failed: {}", e));
                RunReport {
                    timestamp,
                    execution_time_seconds: started.elapsed().as_secs_f64(),
                    scoring_mode: ScoringMode::Linear,
                    platform_data_counts: BTreeMap::new(),
                    correlations: CorrelationReport::default(),
                    insights: Vec::new(),
                    cache_statistics: self.cache.statistics(),
                    provider_statistics,
                    error: Some(e.to_string()),
                }
            }
        };

        logger::debug(
            LogTag::Cache,
            &format!(
                "{} hits / {} misses ({:.1}%), ~${:.2} in provider calls avoided",
                report.cache_statistics.hits,
                report.cache_statistics.misses,
                report.cache_statistics.hit_rate_percent,
                report.cache_statistics.estimated_cost_savings
            ),
        );
        logger::info(
            LogTag::Analyzer,
            &format!(
                "Run finished in {:.2}s: {} tokens, {} high conviction",
                report.execution_time_seconds,
                report.correlations.total_tokens,
                report.correlations.high_conviction_tokens.len()
            ),
        );
        report
    }

    async fn run_pipeline(&self) -> Result<PipelineOutput, AnalysisError> {
        let exclusions = ExclusionRegistry::load(self.exclusion_source.as_ref()).await;

        let collected = self.collector.collect_all().await;
        let platform_data_counts: BTreeMap<String, usize> = collected
            .iter()
            .map(|(id, records)| (id.clone(), records.len()))
            .collect();

        let normalizer = Normalizer::new(&exclusions, Arc::clone(&self.cache), self.config.clone());
        let mut tokens = normalizer.normalize(&collected);

        let resolver = SymbolResolver::new(
            Arc::clone(&self.symbol_lookup),
            Arc::clone(&self.cache),
            self.config.clone(),
        );
        resolver.resolve(&mut tokens).await;

        let engine = ScoringEngine::new(self.config.force_linear_scoring);
        let scoring_mode = engine.score_all(&mut tokens);

        let correlations = CorrelationAnalyzer::new(
            self.config.high_conviction_threshold,
            self.config.top_tokens_per_platform,
        )
        .analyze(&tokens);

        let insights = insights::generate(&correlations, &self.cache.statistics());

        Ok(PipelineOutput {
            platform_data_counts,
            correlations,
            scoring_mode,
            insights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::TokenIdentity;
    use crate::types::{attr, RawRecord};
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};
    use std::collections::HashSet;
    use std::time::Duration;

    struct SyntheticProvider {
        id: String,
        records: Vec<(String, Vec<(&'static str, Value)>)>,
    }

    impl SyntheticProvider {
        fn new(id: &str, records: Vec<(&str, Vec<(&'static str, Value)>)>) -> Arc<Self> {
            Arc::new(Self {
                id: id.to_string(),
                records: records
                    .into_iter()
                    .map(|(a, attrs)| (a.to_string(), attrs))
                    .collect(),
            })
        }
    }

    #[async_trait]
    impl TokenDataProvider for SyntheticProvider {
        fn id(&self) -> &str {
            &self.id
        }

        async fn fetch(&self) -> Result<Vec<RawRecord>> {
            Ok(self
                .records
                .iter()
                .map(|(address, attrs)| {
                    let mut map = Map::new();
                    for (k, v) in attrs {
                        map.insert(k.to_string(), v.clone());
                    }
                    RawRecord::new(&self.id, address, map)
                })
                .collect())
        }
    }

    struct SlowProvider;

    #[async_trait]
    impl TokenDataProvider for SlowProvider {
        fn id(&self) -> &str {
            "slow"
        }

        async fn fetch(&self) -> Result<Vec<RawRecord>> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }
    }

    struct StaticExclusions;

    #[async_trait]
    impl ExclusionSource for StaticExclusions {
        async fn get_excluded_addresses(&self) -> Result<HashSet<String>> {
            Ok(["ExcludedMint".to_string()].into_iter().collect())
        }
    }

    struct NoLookup;

    #[async_trait]
    impl SymbolLookup for NoLookup {
        async fn lookup(&self, _address: &str) -> Result<Option<TokenIdentity>> {
            Ok(None)
        }
    }

    fn golden_scenario_providers() -> Vec<Arc<dyn TokenDataProvider>> {
        vec![
            SyntheticProvider::new(
                "dexscreener",
                vec![(
                    "MintAAAA",
                    vec![
                        (attr::BOOST_AMOUNT, json!(500.0)),
                        (attr::VOLUME_24H, json!(2_000_000.0)),
                    ],
                )],
            ),
            SyntheticProvider::new(
                "trendwatch",
                vec![("MintAAAA", vec![(attr::SENTIMENT_RATIO, json!(0.9))])],
            ),
            SyntheticProvider::new("rugcheck", vec![("MintAAAA", vec![])]),
        ]
    }

    fn linear_config() -> AnalysisConfig {
        AnalysisConfig {
            force_linear_scoring: true,
            resolver_batch_pause: Duration::from_millis(1),
            ..AnalysisConfig::default()
        }
    }

    #[tokio::test]
    async fn documented_linear_scenario_end_to_end() {
        let analyzer = ConvictionAnalyzer::new(
            golden_scenario_providers(),
            Arc::new(StaticExclusions),
            Arc::new(NoLookup),
            linear_config(),
        );
        let report = analyzer.run().await;

        assert!(report.error.is_none());
        assert_eq!(report.scoring_mode, ScoringMode::Linear);
        assert_eq!(report.correlations.total_tokens, 1);

        // (3-1)*8 + 15 + 10 + 8 = 49: just below the threshold
        let top = &report.correlations.all_tokens[0];
        assert!((top.score - 49.0).abs() < f64::EPSILON);
        assert!(report.correlations.high_conviction_tokens.is_empty());
        assert_eq!(report.correlations.multi_platform_tokens.len(), 1);
        assert_eq!(report.platform_data_counts["dexscreener"], 1);
        assert_eq!(report.provider_statistics["dexscreener"].calls, 1);
        assert_eq!(report.provider_statistics["dexscreener"].successes, 1);
    }

    #[tokio::test]
    async fn fourth_provider_crosses_the_conviction_threshold() {
        let mut providers = golden_scenario_providers();
        providers.push(SyntheticProvider::new(
            "geckoterminal",
            vec![("MintAAAA", vec![])],
        ));

        let analyzer = ConvictionAnalyzer::new(
            providers,
            Arc::new(StaticExclusions),
            Arc::new(NoLookup),
            linear_config(),
        );
        let report = analyzer.run().await;

        // (4-1)*8 + 15 + 10 + 8 = 57
        let top = &report.correlations.all_tokens[0];
        assert!((top.score - 57.0).abs() < f64::EPSILON);
        assert_eq!(report.correlations.high_conviction_tokens.len(), 1);
        assert_eq!(
            report.correlations.high_conviction_tokens[0].address,
            "MintAAAA"
        );
    }

    #[tokio::test]
    async fn excluded_addresses_never_reach_the_report() {
        let providers: Vec<Arc<dyn TokenDataProvider>> = vec![SyntheticProvider::new(
            "dexscreener",
            vec![("ExcludedMint", vec![]), ("MintAAAA", vec![])],
        )];
        let analyzer = ConvictionAnalyzer::new(
            providers,
            Arc::new(StaticExclusions),
            Arc::new(NoLookup),
            linear_config(),
        );
        let report = analyzer.run().await;

        assert_eq!(report.correlations.total_tokens, 1);
        assert!(report
            .correlations
            .all_tokens
            .iter()
            .all(|t| t.address != "ExcludedMint"));
    }

    #[tokio::test]
    async fn schema_is_stable_across_scoring_modes() {
        let linear = ConvictionAnalyzer::new(
            golden_scenario_providers(),
            Arc::new(StaticExclusions),
            Arc::new(NoLookup),
            linear_config(),
        );
        let interaction = ConvictionAnalyzer::new(
            golden_scenario_providers(),
            Arc::new(StaticExclusions),
            Arc::new(NoLookup),
            AnalysisConfig {
                force_linear_scoring: false,
                resolver_batch_pause: Duration::from_millis(1),
                ..AnalysisConfig::default()
            },
        );

        let a = serde_json::to_value(linear.run().await).unwrap();
        let b = serde_json::to_value(interaction.run().await).unwrap();

        let keys = |v: &Value| -> Vec<String> {
            v.as_object().unwrap().keys().cloned().collect()
        };
        assert_eq!(keys(&a), keys(&b));
        assert_eq!(
            keys(&a["correlations"]),
            keys(&b["correlations"])
        );
        assert_ne!(a["scoring_mode"], b["scoring_mode"]);
    }

    #[tokio::test]
    async fn run_deadline_returns_partial_report_with_error() {
        let providers: Vec<Arc<dyn TokenDataProvider>> = vec![Arc::new(SlowProvider)];
        let config = AnalysisConfig {
            run_timeout: Some(Duration::from_millis(50)),
            provider_timeout: Duration::from_secs(60),
            force_linear_scoring: true,
            ..AnalysisConfig::default()
        };
        let analyzer = ConvictionAnalyzer::new(
            providers,
            Arc::new(StaticExclusions),
            Arc::new(NoLookup),
            config,
        );
        let report = analyzer.run().await;

        assert!(report.error.is_some());
        assert_eq!(report.correlations.total_tokens, 0);
        // Schema still valid and serializable
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("cache_statistics").is_some());
    }
}
