//! Composite conviction scoring.
//!
//! Two strategies behind one trait: the interaction model (preferred)
//! and an additive linear fallback. The engine tries the interaction
//! model and degrades to the fallback with an explicit log line; the
//! active mode is observable in the run report.

pub mod interaction;
pub mod linear;

pub use interaction::InteractionScorer;
pub use linear::LinearScorer;

use crate::errors::{AnalysisError, ScoringError};
use crate::logger::{self, LogTag};
use crate::types::TokenRecord;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    Interaction,
    Linear,
}

/// One scoring strategy. Implementations must be deterministic for a
/// given token's contents.
pub trait ConvictionScorer: Send + Sync {
    fn mode(&self) -> ScoringMode;
    fn score(&self, token: &TokenRecord) -> Result<f64, ScoringError>;
}

/// Selects the interaction model at startup and falls back to the
/// linear table only when the model fails, never silently.
pub struct ScoringEngine {
    primary: Box<dyn ConvictionScorer>,
    fallback: LinearScorer,
    force_fallback: bool,
}

impl ScoringEngine {
    pub fn new(force_linear: bool) -> Self {
        Self {
            primary: Box::new(InteractionScorer::new()),
            fallback: LinearScorer::new(),
            force_fallback: force_linear,
        }
    }

    #[cfg(test)]
    fn with_primary(primary: Box<dyn ConvictionScorer>) -> Self {
        Self {
            primary,
            fallback: LinearScorer::new(),
            force_fallback: false,
        }
    }

    /// Score every token in place. Returns the mode that produced the
    /// final scores; a single interaction failure degrades the whole
    /// run so the reported mode stays honest.
    pub fn score_all(&self, tokens: &mut BTreeMap<String, TokenRecord>) -> ScoringMode {
        if self.force_fallback {
            logger::info(LogTag::Scoring, "Linear scoring forced by configuration");
            self.apply_fallback(tokens);
            return ScoringMode::Linear;
        }

        let mut scored: Vec<(String, f64)> = Vec::with_capacity(tokens.len());
        let mut degraded = None;
        for (address, token) in tokens.iter() {
            match self.primary.score(token) {
                Ok(score) => scored.push((address.clone(), score)),
                Err(e) => {
                    degraded = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = degraded {
            let err = AnalysisError::ScoringDegraded(e.to_string());
            logger::warning(
                LogTag::Scoring,
                &format!("{} - falling back to linear mode", err),
            );
            self.apply_fallback(tokens);
            return ScoringMode::Linear;
        }

        for (address, score) in scored {
            if let Some(token) = tokens.get_mut(&address) {
                token.score = score;
            }
        }
        logger::info(
            LogTag::Scoring,
            &format!("Scored {} tokens (interaction mode)", tokens.len()),
        );
        self.primary.mode()
    }

    fn apply_fallback(&self, tokens: &mut BTreeMap<String, TokenRecord>) {
        for token in tokens.values_mut() {
            token.score = self.fallback.linear_score(token);
        }
        logger::info(
            LogTag::Scoring,
            &format!("Scored {} tokens (linear mode)", tokens.len()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenScorer;

    impl ConvictionScorer for BrokenScorer {
        fn mode(&self) -> ScoringMode {
            ScoringMode::Interaction
        }

        fn score(&self, _token: &TokenRecord) -> Result<f64, ScoringError> {
            Err(ScoringError::NonFinite)
        }
    }

    #[test]
    fn interaction_mode_when_primary_succeeds() {
        let engine = ScoringEngine::new(false);
        let mut tokens = BTreeMap::new();
        tokens.insert("MintAAAA".to_string(), TokenRecord::new("MintAAAA"));

        assert_eq!(engine.score_all(&mut tokens), ScoringMode::Interaction);
    }

    #[test]
    fn primary_failure_degrades_to_linear() {
        let engine = ScoringEngine::with_primary(Box::new(BrokenScorer));
        let mut tokens = BTreeMap::new();
        tokens.insert("MintAAAA".to_string(), TokenRecord::new("MintAAAA"));

        assert_eq!(engine.score_all(&mut tokens), ScoringMode::Linear);
        assert!(tokens["MintAAAA"].score >= 0.0);
    }

    #[test]
    fn garbage_field_on_one_token_does_not_degrade_the_run() {
        use crate::types::attr;
        use serde_json::{json, Map};

        let mut bad = TokenRecord::new("MintAAAA");
        bad.platforms.insert("a".to_string());
        let mut attrs = Map::new();
        attrs.insert(attr::LIQUIDITY_USD.to_string(), json!(-1.0));
        bad.per_platform_data.insert("a".to_string(), attrs);

        let mut tokens = BTreeMap::new();
        tokens.insert("MintAAAA".to_string(), bad);
        tokens.insert("MintBBBB".to_string(), TokenRecord::new("MintBBBB"));

        let engine = ScoringEngine::new(false);
        assert_eq!(engine.score_all(&mut tokens), ScoringMode::Interaction);
        assert!(tokens.values().all(|t| t.score.is_finite()));
    }

    #[test]
    fn forced_linear_never_touches_the_primary() {
        let engine = ScoringEngine::new(true);
        let mut tokens = BTreeMap::new();
        tokens.insert("MintAAAA".to_string(), TokenRecord::new("MintAAAA"));

        assert_eq!(engine.score_all(&mut tokens), ScoringMode::Linear);
    }
}
