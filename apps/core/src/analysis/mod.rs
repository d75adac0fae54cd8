//! # Analysis Module
//!
//! Turns one journal entry into a sentiment score, a homesickness level,
//! themes, keywords and a short list of coping strategies.
//!
//! ## Components
//! - `lexicon`: word lists and the catalog loader
//! - `catalog`: strategies grouped by theme
//! - `tokenizer`: normalization into filtered tokens
//! - `sentiment`: polarity ratio
//! - `themes`: theme relevance and keyword extraction
//! - `severity`: 1-10 homesickness level
//! - `strategies`: bounded, de-duplicated strategy selection
//! - `provider`: optional external sentiment provider
//! - `fallback`: per-step default table
//! - `result`: output data structures
//! - `analyzer`: main orchestrator

pub mod analyzer;
pub mod catalog;
pub mod fallback;
pub mod lexicon;
pub mod provider;
pub mod result;
pub mod sentiment;
pub mod severity;
pub mod strategies;
pub mod themes;
pub mod tokenizer;

// Re-export main types for convenience
pub use analyzer::WellnessAnalyzer;
pub use catalog::{default_strategies, CatalogKey, Strategy, StrategyCatalog};
pub use lexicon::{Lexicon, LexiconStore, ThemeTag};
pub use provider::{parse_reply, LlmSentimentProvider, ProviderAssessment, SentimentProvider};
pub use result::{AnalysisResponse, AnalysisResult, Provenance, StrategyView};
pub use sentiment::{score_sentiment, EmotionalState, SentimentBreakdown};
pub use severity::{compute_severity, SeverityBand};
pub use strategies::StrategySelector;
pub use themes::{Extraction, KeywordHit, ThemeExtractor, ThemeMatchMode, ThemeScores};
pub use tokenizer::{decode_entry, Tokenizer};
