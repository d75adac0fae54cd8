//! Sentiment Scorer.
//!
//! Bounded polarity ratio over the filtered tokens:
//! `(positive - negative) / (positive + negative)`, or `0.0` when the entry
//! contains no polarity words at all.

use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;
use crate::error::{EngineError, EngineResult};

/// Sentiment above this is reported as positive, below its negation as negative.
pub const EMOTIONAL_STATE_THRESHOLD: f32 = 0.3;

/// Coarse reading of the sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalState {
    Positive,
    Neutral,
    Negative,
}

impl EmotionalState {
    pub fn from_score(score: f32) -> Self {
        if score > EMOTIONAL_STATE_THRESHOLD {
            EmotionalState::Positive
        } else if score < -EMOTIONAL_STATE_THRESHOLD {
            EmotionalState::Negative
        } else {
            EmotionalState::Neutral
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            EmotionalState::Positive => "You're expressing positive emotions. That's wonderful!",
            EmotionalState::Neutral => "Your emotions seem balanced or mixed.",
            EmotionalState::Negative => {
                "Your emotions seem quite negative. It's normal to have difficult days."
            }
        }
    }
}

/// Counts behind a sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub negative: usize,
    pub score: f32,
}

/// Score `tokens` against the polarity lists.
pub fn score_sentiment(tokens: &[String], lexicon: &Lexicon) -> SentimentBreakdown {
    let positive = tokens.iter().filter(|t| lexicon.is_positive(t)).count();
    let negative = tokens.iter().filter(|t| lexicon.is_negative(t)).count();

    let total = positive + negative;
    let score = if total == 0 {
        0.0
    } else {
        (positive as f32 - negative as f32) / total as f32
    };

    SentimentBreakdown {
        positive,
        negative,
        score,
    }
}

/// Accept a sentiment value only if it is finite and within [-1, 1].
pub fn validate_sentiment(value: f32) -> EngineResult<f32> {
    if value.is_finite() && (-1.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::invalid_output(
            "sentiment",
            format!("score {} outside [-1, 1]", value),
        ))
    }
}
