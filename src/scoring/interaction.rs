//! Interaction-based conviction model (Mode A).
//!
//! Derives normalized factor values from the merged per-provider data,
//! then combines them through a weighted base plus pairwise interaction
//! terms: synergy boosts reinforce clusters of strong signals, and
//! contradiction penalties dampen inconsistent ones (high volume on
//! thin liquidity, hot price action on weak security). Deliberately not
//! a plain weighted sum. Output is clamped to [0, 100].
//!
//! A negative or non-finite field from one provider is malformed data,
//! not a model failure: the field is zeroed with a warning and the pass
//! continues in interaction mode.

use super::{ConvictionScorer, ScoringMode};
use crate::errors::{AnalysisError, ScoringError};
use crate::logger::{self, LogTag};
use crate::types::{attr, FactorValues, TokenRecord};

/// Normalization scales for raw magnitudes
const VOLUME_NORM_USD: f64 = 5_000_000.0;
const LIQUIDITY_NORM_USD: f64 = 1_000_000.0;
const PLATFORM_NORM: f64 = 5.0;

/// Age decay: full weight at listing, floor after 30 days
const AGE_FULL_DECAY_HOURS: f64 = 720.0;
const AGE_FLOOR: f64 = 0.2;

/// Neutral value for factors a token carries no data for
const NEUTRAL: f64 = 0.5;

/// Base factor weights (sum to 1.0)
const W_VOLUME: f64 = 0.18;
const W_LIQUIDITY: f64 = 0.14;
const W_SMART_MONEY: f64 = 0.14;
const W_SECURITY: f64 = 0.12;
const W_PRICE: f64 = 0.12;
const W_CROSS_PLATFORM: f64 = 0.16;
const W_WHALE: f64 = 0.07;
const W_AGE: f64 = 0.07;

/// Interaction term coefficients
const SYNERGY_VOLUME_VALIDATION: f64 = 0.12;
const SYNERGY_SMART_SECURITY: f64 = 0.10;
const SYNERGY_VOLUME_PRICE: f64 = 0.08;
const PENALTY_THIN_LIQUIDITY: f64 = 0.15;
const PENALTY_INSECURE_PUMP: f64 = 0.10;

pub struct InteractionScorer;

impl InteractionScorer {
    pub fn new() -> Self {
        Self
    }

    /// Derive normalized 0-1 factors from the merged provider data.
    /// Malformed fields are zeroed with a warning, never fatal.
    pub fn derive_factors(&self, token: &TokenRecord) -> Result<FactorValues, ScoringError> {
        let volume = checked_magnitude(token, attr::VOLUME_24H);
        let liquidity = checked_magnitude(token, attr::LIQUIDITY_USD);

        let price_change = checked_attr(token, attr::PRICE_CHANGE_24H)
            .unwrap_or(0.0)
            .clamp(-50.0, 100.0);

        let age_factor = match token.numeric_attr(attr::AGE_HOURS) {
            Some(age) if age >= 0.0 => {
                let decayed = age.min(AGE_FULL_DECAY_HOURS) / AGE_FULL_DECAY_HOURS;
                1.0 - (1.0 - AGE_FLOOR) * decayed
            }
            _ => NEUTRAL,
        };

        let factors = FactorValues {
            volume_momentum: (volume / VOLUME_NORM_USD).min(1.0),
            liquidity: (liquidity / LIQUIDITY_NORM_USD).min(1.0),
            smart_money_score: checked_attr(token, attr::SMART_MONEY_SCORE)
                .unwrap_or(NEUTRAL)
                .clamp(0.0, 1.0),
            security_score: checked_attr(token, attr::SECURITY_SCORE)
                .unwrap_or(NEUTRAL)
                .clamp(0.0, 1.0),
            price_momentum: (price_change + 50.0) / 150.0,
            cross_platform_validation: (token.platform_count() as f64 / PLATFORM_NORM).min(1.0),
            whale_concentration: checked_attr(token, attr::WHALE_CONCENTRATION)
                .unwrap_or(NEUTRAL)
                .clamp(0.0, 1.0),
            age_factor,
        };

        Ok(factors)
    }

    fn combine(&self, f: &FactorValues) -> f64 {
        let base = W_VOLUME * f.volume_momentum
            + W_LIQUIDITY * f.liquidity
            + W_SMART_MONEY * f.smart_money_score
            + W_SECURITY * f.security_score
            + W_PRICE * f.price_momentum
            + W_CROSS_PLATFORM * f.cross_platform_validation
            + W_WHALE * (1.0 - f.whale_concentration)
            + W_AGE * f.age_factor;

        let synergy = SYNERGY_VOLUME_VALIDATION * f.volume_momentum * f.cross_platform_validation
            + SYNERGY_SMART_SECURITY * f.smart_money_score * f.security_score
            + SYNERGY_VOLUME_PRICE * f.volume_momentum * f.price_momentum;

        let mut contradiction = 0.0;
        if f.volume_momentum > 0.6 && f.liquidity < 0.4 {
            contradiction += PENALTY_THIN_LIQUIDITY * f.volume_momentum * (1.0 - f.liquidity);
        }
        if f.price_momentum > 0.7 && f.security_score < 0.3 {
            contradiction += PENALTY_INSECURE_PUMP * f.price_momentum * (1.0 - f.security_score);
        }

        (base + synergy - contradiction).clamp(0.0, 1.0) * 100.0
    }
}

impl Default for InteractionScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Numeric attribute lookup that treats a non-finite value as absent.
fn checked_attr(token: &TokenRecord, key: &str) -> Option<f64> {
    let value = token.max_numeric_attr(key)?;
    if value.is_finite() {
        return Some(value);
    }
    warn_malformed(token, key, value);
    None
}

/// Non-negative magnitude lookup; missing, non-finite, and negative
/// values all read as 0.0.
fn checked_magnitude(token: &TokenRecord, key: &str) -> f64 {
    match checked_attr(token, key) {
        Some(value) if value >= 0.0 => value,
        Some(value) => {
            warn_malformed(token, key, value);
            0.0
        }
        None => 0.0,
    }
}

fn warn_malformed(token: &TokenRecord, key: &str, value: f64) {
    let err = AnalysisError::MalformedRecord {
        address: token.address.clone(),
        reason: format!("unusable {} value {}", key, value),
    };
    logger::warning(LogTag::Scoring, &format!("Skipping field: {}", err));
}

impl ConvictionScorer for InteractionScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Interaction
    }

    fn score(&self, token: &TokenRecord) -> Result<f64, ScoringError> {
        let factors = self.derive_factors(token)?;
        let score = self.combine(&factors);
        if !score.is_finite() {
            return Err(ScoringError::NonFinite);
        }
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};

    fn token_with(platforms: &[&str], attrs: &[(&str, Value)]) -> TokenRecord {
        let mut token = TokenRecord::new("MintAAAA");
        for (i, platform) in platforms.iter().enumerate() {
            token.platforms.insert(platform.to_string());
            let mut map = Map::new();
            if i == 0 {
                for (k, v) in attrs {
                    map.insert(k.to_string(), v.clone());
                }
            }
            token.per_platform_data.insert(platform.to_string(), map);
        }
        token
    }

    #[test]
    fn score_is_bounded() {
        let scorer = InteractionScorer::new();

        let maxed = token_with(
            &["a", "b", "c", "d", "e", "f"],
            &[
                (attr::VOLUME_24H, json!(50_000_000.0)),
                (attr::LIQUIDITY_USD, json!(10_000_000.0)),
                (attr::PRICE_CHANGE_24H, json!(500.0)),
                (attr::SMART_MONEY_SCORE, json!(1.0)),
                (attr::SECURITY_SCORE, json!(1.0)),
                (attr::WHALE_CONCENTRATION, json!(0.0)),
                (attr::AGE_HOURS, json!(1.0)),
            ],
        );
        let high = scorer.score(&maxed).unwrap();
        assert!(high <= 100.0);
        assert!(high > 80.0);

        let empty = TokenRecord::new("MintBBBB");
        let low = scorer.score(&empty).unwrap();
        assert!(low >= 0.0);
        assert!(low < high);
    }

    #[test]
    fn deterministic_for_same_contents() {
        let scorer = InteractionScorer::new();
        let token = token_with(
            &["dexscreener"],
            &[(attr::VOLUME_24H, json!(1_000_000.0))],
        );
        assert_eq!(scorer.score(&token).unwrap(), scorer.score(&token).unwrap());
    }

    #[test]
    fn thin_liquidity_dampens_high_volume() {
        let scorer = InteractionScorer::new();

        let backed = token_with(
            &["dexscreener"],
            &[
                (attr::VOLUME_24H, json!(4_000_000.0)),
                (attr::LIQUIDITY_USD, json!(900_000.0)),
            ],
        );
        let thin = token_with(
            &["dexscreener"],
            &[
                (attr::VOLUME_24H, json!(4_000_000.0)),
                (attr::LIQUIDITY_USD, json!(20_000.0)),
            ],
        );

        let backed_score = scorer.score(&backed).unwrap();
        let thin_score = scorer.score(&thin).unwrap();
        // Contradiction penalty on top of the lost liquidity weight
        assert!(backed_score - thin_score > W_LIQUIDITY * 100.0 * 0.8);
    }

    #[test]
    fn cross_platform_synergy_rewards_validated_volume() {
        let scorer = InteractionScorer::new();
        let attrs = [
            (attr::VOLUME_24H, json!(5_000_000.0)),
            (attr::LIQUIDITY_USD, json!(1_000_000.0)),
        ];

        let single = token_with(&["a"], &attrs);
        let multi = token_with(&["a", "b", "c", "d", "e"], &attrs);

        let single_f = scorer.derive_factors(&single).unwrap();
        let multi_f = scorer.derive_factors(&multi).unwrap();
        let base_gap =
            W_CROSS_PLATFORM * (multi_f.cross_platform_validation - single_f.cross_platform_validation);

        let gap = (scorer.score(&multi).unwrap() - scorer.score(&single).unwrap()) / 100.0;
        assert!(gap > base_gap + 1e-9);
    }

    #[test]
    fn negative_magnitude_is_zeroed_not_fatal() {
        let scorer = InteractionScorer::new();
        let garbage = token_with(&["a"], &[(attr::VOLUME_24H, json!(-5.0))]);
        let clean = token_with(&["a"], &[]);

        let score = scorer.score(&garbage).unwrap();
        assert_eq!(score, scorer.score(&clean).unwrap());

        let factors = scorer.derive_factors(&garbage).unwrap();
        assert_eq!(factors.volume_momentum, 0.0);
    }

    #[test]
    fn factors_are_normalized() {
        let scorer = InteractionScorer::new();
        let token = token_with(
            &["a", "b", "c", "d", "e", "f", "g"],
            &[
                (attr::VOLUME_24H, json!(99_000_000.0)),
                (attr::LIQUIDITY_USD, json!(50_000_000.0)),
                (attr::PRICE_CHANGE_24H, json!(10_000.0)),
            ],
        );
        let f = scorer.derive_factors(&token).unwrap();
        assert_eq!(f.volume_momentum, 1.0);
        assert_eq!(f.liquidity, 1.0);
        assert_eq!(f.price_momentum, 1.0);
        assert_eq!(f.cross_platform_validation, 1.0);
    }
}
