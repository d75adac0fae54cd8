//! Analysis Result - output structure of one analysis call.
//!
//! Created fresh per call and handed to the caller; the engine keeps nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::Strategy;
use super::sentiment::EmotionalState;
use super::severity::SeverityBand;
use super::themes::{KeywordHit, ThemeScores};

/// Where the sentiment/severity values came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Local deterministic algorithm
    Local,
    /// External analysis provider
    ExternalProvider,
}

/// Complete result of one analysis call
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// Unique analysis identifier
    pub id: Uuid,

    /// Sentiment in [-1, 1]
    pub sentiment_score: f32,

    /// Coarse reading of the sentiment
    pub emotional_state: EmotionalState,

    /// Homesickness level in 1..=10
    pub severity_level: u8,

    /// Display band of the level
    pub severity_band: SeverityBand,

    /// Detected themes with relevance weights (never empty)
    pub themes: ThemeScores,

    /// Up to 10 keywords, most relevant first
    pub keywords: Vec<String>,

    /// Homesickness-lexicon tokens found in the entry
    pub keyword_hits: Vec<KeywordHit>,

    /// 2 to 5 recommended strategies
    pub strategies: Vec<Strategy>,

    pub provenance: Provenance,

    /// Input length in characters
    pub text_length: usize,

    /// Number of filtered tokens
    pub token_count: usize,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,

    /// Timestamp of analysis
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Get a summary for logging. Never includes the entry text.
    pub fn summary(&self) -> String {
        format!(
            "Sentiment: {:.2} ({:?}), Level: {}/10, Themes: [{}], Keywords: {}, Strategies: {}, Source: {:?}",
            self.sentiment_score,
            self.emotional_state,
            self.severity_level,
            self.theme_names().join(", "),
            self.keywords.len(),
            self.strategies.len(),
            self.provenance
        )
    }

    /// Theme names, most relevant first
    pub fn theme_names(&self) -> Vec<String> {
        self.themes.tags().iter().map(|t| t.label().to_string()).collect()
    }

    /// Caller-facing JSON shape
    pub fn to_response(&self) -> AnalysisResponse {
        AnalysisResponse {
            sentiment_score: self.sentiment_score,
            homesickness_level: self.severity_level,
            severity_level: self.severity_level,
            emotional_state: self.emotional_state,
            severity_band: self.severity_band,
            message: self.severity_band.message().to_string(),
            keywords: self.keywords.clone(),
            themes: self.theme_names(),
            strategies: self.strategies.iter().map(StrategyView::from).collect(),
            provenance: self.provenance,
        }
    }
}

/// JSON object returned to the surrounding request handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub sentiment_score: f32,
    pub homesickness_level: u8,
    pub severity_level: u8,
    pub emotional_state: EmotionalState,
    pub severity_band: SeverityBand,
    pub message: String,
    pub keywords: Vec<String>,
    pub themes: Vec<String>,
    pub strategies: Vec<StrategyView>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyView {
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
}

impl From<&Strategy> for StrategyView {
    fn from(strategy: &Strategy) -> Self {
        Self {
            title: strategy.title.clone(),
            description: strategy.description.clone(),
            steps: strategy.steps.clone(),
        }
    }
}
