//! Structured error taxonomy for the analysis pipeline.
//!
//! Every variant here is recovered locally except [`AnalysisError::Pipeline`],
//! which is surfaced through the run report's `error` field rather than
//! propagated to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A single data source failed or timed out. Isolated per provider;
    /// the run continues with empty data for that provider.
    #[error("provider '{provider}' unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    /// A raw record or merged attribute map had an unexpected shape.
    /// The offending token or field is skipped with a warning.
    #[error("malformed record for '{address}': {reason}")]
    MalformedRecord { address: String, reason: String },

    /// The interaction scorer could not run; the pipeline falls back to
    /// the linear scorer and flags the degradation.
    #[error("interaction scoring degraded: {0}")]
    ScoringDegraded(String),

    /// A symbol lookup failed. The token keeps its unresolved symbol and
    /// is not retried within the same run.
    #[error("symbol resolution failed for '{address}': {reason}")]
    ResolutionFailure { address: String, reason: String },

    /// Catastrophic failure inside the normalizer or correlation analyzer.
    /// Reported via the run output's `error` field with partial statistics.
    #[error("pipeline error in {stage}: {reason}")]
    Pipeline { stage: String, reason: String },
}

impl AnalysisError {
    pub fn pipeline(stage: &str, reason: impl std::fmt::Display) -> Self {
        Self::Pipeline {
            stage: stage.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Failure modes specific to score computation
#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("factor derivation failed: {0}")]
    FactorDerivation(String),

    #[error("non-finite score produced")]
    NonFinite,
}
