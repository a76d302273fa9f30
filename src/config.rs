//! Pipeline configuration.
//!
//! All behavior toggles live here and are passed into components at
//! construction. Nothing reads module-level flags.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Only keep tokens that a provider reports as paired with the native
    /// base asset. Off by default.
    pub require_base_pair: bool,

    /// Per-provider fetch timeout.
    pub provider_timeout: Duration,

    /// Overall run deadline. Exceeding it returns partial results.
    pub run_timeout: Option<Duration>,

    /// Symbol resolver: addresses per concurrent batch.
    pub resolver_batch_size: usize,

    /// Symbol resolver: pause between batches.
    pub resolver_batch_pause: Duration,

    /// Per-lookup timeout in the symbol resolver.
    pub resolver_timeout: Duration,

    /// Score at or above which a token is shortlisted as high conviction.
    /// Applied consistently to the shortlist and per-provider rates.
    pub high_conviction_threshold: f64,

    /// Tokens listed per provider in the platform analysis.
    pub top_tokens_per_platform: usize,

    /// Force the linear scorer instead of trying the interaction model.
    pub force_linear_scoring: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            require_base_pair: false,
            provider_timeout: Duration::from_secs(15),
            run_timeout: Some(Duration::from_secs(120)),
            resolver_batch_size: 5,
            resolver_batch_pause: Duration::from_millis(500),
            resolver_timeout: Duration::from_secs(8),
            high_conviction_threshold: 50.0,
            top_tokens_per_platform: 5,
            force_linear_scoring: false,
        }
    }
}
