//! Wellness Analyzer - main orchestrator of the analysis engine.
//!
//! Runs tokenizer, sentiment, theme extraction, severity and strategy
//! selection for one entry and always produces a result. An external provider,
//! if configured, is consulted first under a timeout; anything it gets wrong
//! is dropped in favour of the local algorithm.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::catalog::Strategy;
use super::fallback::{self, Step};
use super::lexicon::{Lexicon, LexiconStore};
use super::provider::{LlmSentimentProvider, ProviderAssessment, SentimentProvider};
use super::result::{AnalysisResult, Provenance};
use super::sentiment::{score_sentiment, validate_sentiment, EmotionalState};
use super::severity::{compute_severity, validate_severity, SeverityBand};
use super::strategies::StrategySelector;
use super::themes::{ThemeExtractor, ThemeMatchMode};
use super::tokenizer::Tokenizer;
use crate::config::{EngineConfig, DEFAULT_PROVIDER_TIMEOUT_MS};
use crate::error::{EngineError, EngineResult};

/// Analysis engine. Immutable after construction; share it behind an `Arc`.
pub struct WellnessAnalyzer {
    lexicon: Arc<Lexicon>,
    tokenizer: Tokenizer,
    extractor: ThemeExtractor,
    selector: StrategySelector,
    provider: Option<Arc<dyn SentimentProvider>>,
    provider_timeout: Duration,
}

impl Default for WellnessAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl WellnessAnalyzer {
    /// Local-only analyzer over the compiled-in lexicon and catalog
    pub fn new() -> Self {
        Self::from_store(LexiconStore::builtin(true), ThemeMatchMode::Frequency)
    }

    pub fn from_store(store: LexiconStore, mode: ThemeMatchMode) -> Self {
        let lemmatize = store.lexicon.lemmatizes();
        Self {
            lexicon: Arc::new(store.lexicon),
            tokenizer: Tokenizer::new(lemmatize),
            extractor: ThemeExtractor::new(mode),
            selector: StrategySelector::new(Arc::new(store.catalog)),
            provider: None,
            provider_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
        }
    }

    /// Build everything the configuration asks for. Never fails: a bad catalog
    /// or provider setting falls back to the built-in / local behaviour.
    pub fn from_config(config: &EngineConfig) -> Self {
        let store = LexiconStore::load_or_builtin(config.catalog_path.as_deref(), config.lemmatize);
        let analyzer = Self::from_store(store, config.theme_mode);

        let Some(provider_config) = &config.provider else {
            return analyzer;
        };

        match LlmSentimentProvider::new(&provider_config.url, provider_config.auth_token.clone()) {
            Ok(provider) => {
                info!(
                    url = %provider_config.url,
                    timeout_ms = provider_config.timeout_ms,
                    "External provider enabled"
                );
                analyzer.with_provider(Arc::new(provider), provider_config.timeout())
            }
            Err(e) => {
                warn!("{}; running without external provider", e);
                analyzer
            }
        }
    }

    pub fn with_provider(
        mut self,
        provider: Arc<dyn SentimentProvider>,
        provider_timeout: Duration,
    ) -> Self {
        self.provider = Some(provider);
        self.provider_timeout = provider_timeout;
        self
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Analyze with the local algorithm only.
    pub fn analyze_local(&self, text: &str) -> AnalysisResult {
        self.analyze_local_with_rng(text, &mut StdRng::from_entropy())
    }

    pub fn analyze_local_with_rng<R: Rng + ?Sized>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> AnalysisResult {
        self.compose(text, None, rng, Instant::now())
    }

    /// Analyze, consulting the external provider when one is configured.
    pub async fn analyze(&self, text: &str) -> AnalysisResult {
        let mut rng = StdRng::from_entropy();
        self.analyze_with_rng(text, &mut rng).await
    }

    pub async fn analyze_with_rng<R: Rng + ?Sized>(
        &self,
        text: &str,
        rng: &mut R,
    ) -> AnalysisResult {
        let start = Instant::now();
        let assessment = self.consult_provider(text).await;
        self.compose(text, assessment, rng, start)
    }

    /// Re-run strategy selection for an entry with a previously computed
    /// level. An out-of-range level is replaced by the default.
    pub fn select_strategies_for(&self, text: &str, severity: i64) -> Vec<Strategy> {
        self.select_strategies_for_with_rng(text, severity, &mut StdRng::from_entropy())
    }

    pub fn select_strategies_for_with_rng<R: Rng + ?Sized>(
        &self,
        text: &str,
        severity: i64,
        rng: &mut R,
    ) -> Vec<Strategy> {
        let tokens = self.tokenizer.normalize(text, &self.lexicon);
        let themes = self.extractor.detect_themes(&tokens, text, &self.lexicon);
        let themes = fallback::themes(Ok(themes));
        let breakdown = score_sentiment(&tokens, &self.lexicon);
        let sentiment = fallback::sentiment(validate_sentiment(breakdown.score));
        let severity = fallback::severity(validate_severity(severity));

        self.selector.select(&themes, severity, sentiment, rng)
    }

    async fn consult_provider(&self, text: &str) -> Option<ProviderAssessment> {
        let provider = self.provider.as_ref()?;
        if text.trim().is_empty() {
            return None;
        }

        let result = assess_within(provider.as_ref(), text, self.provider_timeout).await;
        let assessment = fallback::recover(Step::Provider, result.map(Some), || None);
        if assessment.is_some() {
            debug!(provider = provider.name(), "Adopted provider assessment");
        }
        assessment
    }

    fn local_severity(&self, hit_count: usize, token_count: usize, sentiment: f32) -> u8 {
        let level = compute_severity(hit_count, token_count, sentiment);
        fallback::severity(validate_severity(level as i64))
    }

    fn compose<R: Rng + ?Sized>(
        &self,
        text: &str,
        assessment: Option<ProviderAssessment>,
        rng: &mut R,
        start: Instant,
    ) -> AnalysisResult {
        let tokens = self.tokenizer.normalize(text, &self.lexicon);
        let extraction = self.extractor.extract(&tokens, text, &self.lexicon);
        let hit_count = extraction.homesickness_hit_count();

        let (sentiment, severity, provenance) = match assessment {
            Some(assessment) => {
                let sentiment = assessment.sentiment();
                let severity = assessment
                    .severity()
                    .unwrap_or_else(|| self.local_severity(hit_count, tokens.len(), sentiment));
                (sentiment, severity, Provenance::ExternalProvider)
            }
            None => {
                let breakdown = score_sentiment(&tokens, &self.lexicon);
                let sentiment = fallback::sentiment(validate_sentiment(breakdown.score));
                let severity = self.local_severity(hit_count, tokens.len(), sentiment);
                (sentiment, severity, Provenance::Local)
            }
        };

        let themes = fallback::themes(Ok(extraction.themes));
        let strategies = self.selector.select(&themes, severity, sentiment, rng);

        let result = AnalysisResult {
            id: Uuid::new_v4(),
            sentiment_score: sentiment,
            emotional_state: EmotionalState::from_score(sentiment),
            severity_level: severity,
            severity_band: SeverityBand::from_level(severity),
            themes,
            keywords: extraction.keywords,
            keyword_hits: extraction.hits,
            strategies,
            provenance,
            text_length: text.chars().count(),
            token_count: tokens.len(),
            processing_time_ms: start.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        };

        info!(analysis_id = %result.id, "{}", result.summary());
        result
    }
}

/// Ask `provider` for an assessment, giving up after `limit`.
async fn assess_within(
    provider: &dyn SentimentProvider,
    text: &str,
    limit: Duration,
) -> EngineResult<ProviderAssessment> {
    match timeout(limit, provider.assess(text)).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::ProviderTimeout(limit)),
    }
}
