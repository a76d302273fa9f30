//! Linear fallback scorer (Mode B).
//!
//! Additive table of independently computed, independently capped
//! bonuses. Used only when the interaction model cannot run; the
//! degraded mode is flagged by the engine, never silent.
//!
//! Bonus table:
//! - Platform: 0 below 2 platforms, else (count - 1) x 8
//! - Golden ticker (boost >= 500): +15, exclusive with the tier ladder
//! - Promotional intensity: boost >= 200/100/50/20/5/>0 -> 12/10/8/6/4/2
//! - Sentiment ratio >= 0.8/0.6/0.4 -> +10/+6/+3
//! - 24h volume >= $1M/$500K/$100K/$50K -> +8/+6/+4/+2
//! - 24h price change >= 50/20/10/5% -> +8/+5/+3/+1

use super::{ConvictionScorer, ScoringMode};
use crate::errors::ScoringError;
use crate::types::{attr, BoostTier, TokenRecord};

const PLATFORM_BONUS_STEP: f64 = 8.0;
const GOLDEN_TICKER_BONUS: f64 = 15.0;

pub struct LinearScorer;

impl LinearScorer {
    pub fn new() -> Self {
        Self
    }

    /// Infallible scoring path; always >= 0.
    pub fn linear_score(&self, token: &TokenRecord) -> f64 {
        platform_bonus(token.platform_count())
            + boost_bonus(token.max_numeric_attr(attr::BOOST_AMOUNT).unwrap_or(0.0))
            + sentiment_bonus(token.max_numeric_attr(attr::SENTIMENT_RATIO).unwrap_or(0.0))
            + volume_bonus(token.max_numeric_attr(attr::VOLUME_24H).unwrap_or(0.0))
            + price_change_bonus(token.max_numeric_attr(attr::PRICE_CHANGE_24H).unwrap_or(0.0))
    }
}

impl Default for LinearScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvictionScorer for LinearScorer {
    fn mode(&self) -> ScoringMode {
        ScoringMode::Linear
    }

    fn score(&self, token: &TokenRecord) -> Result<f64, ScoringError> {
        Ok(self.linear_score(token))
    }
}

fn platform_bonus(count: usize) -> f64 {
    if count < 2 {
        0.0
    } else {
        (count as f64 - 1.0) * PLATFORM_BONUS_STEP
    }
}

/// Golden ticker bonus is exclusive with the intensity ladder to avoid
/// double counting a single boost.
fn boost_bonus(amount: f64) -> f64 {
    if BoostTier::from_amount(amount).is_golden() {
        return GOLDEN_TICKER_BONUS;
    }
    if amount >= 200.0 {
        12.0
    } else if amount >= 100.0 {
        10.0
    } else if amount >= 50.0 {
        8.0
    } else if amount >= 20.0 {
        6.0
    } else if amount >= 5.0 {
        4.0
    } else if amount > 0.0 {
        2.0
    } else {
        0.0
    }
}

fn sentiment_bonus(ratio: f64) -> f64 {
    if ratio >= 0.8 {
        10.0
    } else if ratio >= 0.6 {
        6.0
    } else if ratio >= 0.4 {
        3.0
    } else {
        0.0
    }
}

fn volume_bonus(volume: f64) -> f64 {
    if volume >= 1_000_000.0 {
        8.0
    } else if volume >= 500_000.0 {
        6.0
    } else if volume >= 100_000.0 {
        4.0
    } else if volume >= 50_000.0 {
        2.0
    } else {
        0.0
    }
}

fn price_change_bonus(change: f64) -> f64 {
    if change >= 50.0 {
        8.0
    } else if change >= 20.0 {
        5.0
    } else if change >= 10.0 {
        3.0
    } else if change >= 5.0 {
        1.0
    } else {
        0.0
    }
}
