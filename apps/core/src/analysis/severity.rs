//! Severity ("homesickness level") calculation.
//!
//! ```text
//! density  = keyword_hits / max(1, token_count / 10)
//! raw      = density * 3 + (1 - sentiment) * 5
//! severity = clamp(round(raw), 1, 10)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

pub const MIN_SEVERITY: u8 = 1;
pub const MAX_SEVERITY: u8 = 10;

const DENSITY_WEIGHT: f32 = 3.0;
const SENTIMENT_WEIGHT: f32 = 5.0;

/// Keyword hits per ten tokens. Short entries count as ten tokens long.
pub fn keyword_density(keyword_hit_count: usize, token_count: usize) -> f32 {
    let per_ten = (token_count as f32 / 10.0).max(1.0);
    keyword_hit_count as f32 / per_ten
}

/// Combine keyword density and sentiment into a 1-10 level.
///
/// Out-of-range or non-finite sentiment is treated as neutral; the result is
/// always clamped, never an error.
pub fn compute_severity(keyword_hit_count: usize, token_count: usize, sentiment: f32) -> u8 {
    let sentiment = if sentiment.is_finite() {
        sentiment.clamp(-1.0, 1.0)
    } else {
        0.0
    };

    let density = keyword_density(keyword_hit_count, token_count);
    let raw = density * DENSITY_WEIGHT + (1.0 - sentiment) * SENTIMENT_WEIGHT;

    raw.round().clamp(MIN_SEVERITY as f32, MAX_SEVERITY as f32) as u8
}

/// Accept a level only if it is within 1..=10.
pub fn validate_severity(level: i64) -> EngineResult<u8> {
    if (MIN_SEVERITY as i64..=MAX_SEVERITY as i64).contains(&level) {
        Ok(level as u8)
    } else {
        Err(EngineError::invalid_output(
            "severity",
            format!("level {} outside 1..=10", level),
        ))
    }
}

/// Display band of a severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityBand {
    /// 1-3
    Minimal,
    /// 4-6
    Moderate,
    /// 7-10
    Significant,
}

impl SeverityBand {
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=3 => SeverityBand::Minimal,
            4..=6 => SeverityBand::Moderate,
            _ => SeverityBand::Significant,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "minimal" | "low" => Some(SeverityBand::Minimal),
            "moderate" | "medium" => Some(SeverityBand::Moderate),
            "significant" | "high" | "severe" => Some(SeverityBand::Significant),
            _ => None,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SeverityBand::Minimal => "You're managing well with minimal homesickness.",
            SeverityBand::Moderate => {
                "You're experiencing moderate homesickness, which is common for international students."
            }
            SeverityBand::Significant => {
                "You're experiencing significant homesickness. The strategies below may help."
            }
        }
    }
}
