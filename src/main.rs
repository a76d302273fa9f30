//! One-shot runner: builds the pipeline with the reference provider,
//! executes a single analysis run, and prints the JSON report.

use anyhow::Result;
use async_trait::async_trait;
use convictionbot::analyzer::ConvictionAnalyzer;
use convictionbot::config::AnalysisConfig;
use convictionbot::exclusions::ExclusionSource;
use convictionbot::logger;
use convictionbot::providers::dexscreener::{DexScreenerProvider, TIMEOUT_SECS};
use convictionbot::providers::TokenDataProvider;
use std::collections::HashSet;
use std::sync::Arc;

/// No remote exclusion feed configured; the registry falls back to the
/// built-in wrapped-asset and stablecoin set.
struct NoRemoteExclusions;

#[async_trait]
impl ExclusionSource for NoRemoteExclusions {
    async fn get_excluded_addresses(&self) -> Result<HashSet<String>> {
        Ok(HashSet::new())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init(std::env::args().any(|a| a == "--debug"));

    let dexscreener = Arc::new(DexScreenerProvider::new(true, TIMEOUT_SECS)?);
    let providers: Vec<Arc<dyn TokenDataProvider>> = vec![dexscreener.clone()];

    let analyzer = ConvictionAnalyzer::new(
        providers,
        Arc::new(NoRemoteExclusions),
        dexscreener,
        AnalysisConfig::default(),
    );

    let report = analyzer.run().await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
