//! Strategy Selector.
//!
//! Picks a bounded, de-duplicated list of strategies for a set of ranked
//! themes. Randomness is always injected so callers can pin a seed.

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::debug;

use super::catalog::{default_strategies, Strategy, StrategyCatalog};
use super::fallback;
use super::lexicon::ThemeTag;
use super::severity::SeverityBand;
use super::themes::ThemeScores;
use crate::error::{EngineError, EngineResult};

/// Sentiment below this adds a grounding strategy.
pub const STRONGLY_NEGATIVE: f32 = -0.5;
pub const MIN_STRATEGIES: usize = 2;
pub const TARGET_STRATEGIES: usize = 3;
pub const MAX_STRATEGIES: usize = 5;
const MAX_THEMES: usize = 3;

#[derive(Debug, Clone)]
pub struct StrategySelector {
    catalog: Arc<StrategyCatalog>,
}

impl StrategySelector {
    pub fn new(catalog: Arc<StrategyCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &StrategyCatalog {
        &self.catalog
    }

    /// Themes a selection will draw from, in priority order.
    pub fn plan(themes: &ThemeScores) -> Vec<ThemeTag> {
        let mut plan: Vec<ThemeTag> = themes.tags().into_iter().take(MAX_THEMES).collect();
        if plan.len() < MAX_THEMES && !plan.contains(&ThemeTag::General) {
            plan.push(ThemeTag::General);
        }
        plan
    }

    /// Select from the catalog only. Fails on an empty catalog; may return
    /// fewer than [`MIN_STRATEGIES`] when the catalog is sparse.
    pub fn try_select<R: Rng + ?Sized>(
        &self,
        themes: &ThemeScores,
        severity: u8,
        sentiment: f32,
        rng: &mut R,
    ) -> EngineResult<Vec<Strategy>> {
        if self.catalog.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }

        let band = SeverityBand::from_level(severity);
        let mut selected: Vec<Strategy> = Vec::with_capacity(MAX_STRATEGIES);

        for theme in Self::plan(themes) {
            if let Some(strategy) = draw(self.catalog.bucket(theme), band, &selected, rng) {
                selected.push(strategy);
            }
        }

        if sentiment < STRONGLY_NEGATIVE && selected.len() < MAX_STRATEGIES {
            if let Some(strategy) = draw(self.catalog.grounding(), band, &selected, rng) {
                selected.push(strategy);
            }
        }

        while selected.len() < TARGET_STRATEGIES {
            match draw(self.catalog.bucket(ThemeTag::General), band, &selected, rng) {
                Some(strategy) => selected.push(strategy),
                None => break,
            }
        }

        // Keep priority order, never reshuffle
        selected.truncate(MAX_STRATEGIES);
        Ok(selected)
    }

    /// Total selection: always between [`MIN_STRATEGIES`] and
    /// [`MAX_STRATEGIES`] unique strategies.
    pub fn select<R: Rng + ?Sized>(
        &self,
        themes: &ThemeScores,
        severity: u8,
        sentiment: f32,
        rng: &mut R,
    ) -> Vec<Strategy> {
        let selected = fallback::strategies(self.try_select(themes, severity, sentiment, rng));
        top_up(selected)
    }
}

/// Pick one strategy from `bucket` that is not yet selected, preferring those
/// that suit `band`.
fn draw<R: Rng + ?Sized>(
    bucket: &[Strategy],
    band: SeverityBand,
    selected: &[Strategy],
    rng: &mut R,
) -> Option<Strategy> {
    let fresh: Vec<&Strategy> = bucket
        .iter()
        .filter(|s| !selected.iter().any(|chosen| chosen.id == s.id))
        .collect();

    let suited: Vec<&Strategy> = fresh.iter().copied().filter(|s| s.suits(band)).collect();
    let pool = if suited.is_empty() { &fresh } else { &suited };

    pool.choose(rng).map(|s| (*s).clone())
}

/// Fill up to the minimum from the built-in defaults.
fn top_up(mut selected: Vec<Strategy>) -> Vec<Strategy> {
    if selected.len() >= MIN_STRATEGIES {
        return selected;
    }

    debug!(selected = selected.len(), "Topping up strategies from defaults");
    for strategy in default_strategies() {
        if selected.len() >= MIN_STRATEGIES {
            break;
        }
        if !selected.iter().any(|s| s.id == strategy.id) {
            selected.push(strategy);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::catalog::CatalogKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn selector() -> StrategySelector {
        StrategySelector::new(Arc::new(StrategyCatalog::builtin()))
    }

    fn scores(entries: &[(ThemeTag, usize)]) -> ThemeScores {
        let mut scores = ThemeScores::new();
        for (theme, weight) in entries {
            scores.insert(*theme, *weight);
        }
        scores
    }

    fn ids(strategies: &[Strategy]) -> Vec<String> {
        strategies.iter().map(|s| s.id.clone()).collect()
    }

    #[test]
    fn test_plan_appends_general() {
        let plan = StrategySelector::plan(&scores(&[(ThemeTag::Family, 2), (ThemeTag::Social, 1)]));
        assert_eq!(plan, vec![ThemeTag::Family, ThemeTag::Social, ThemeTag::General]);

        let plan = StrategySelector::plan(&scores(&[
            (ThemeTag::Family, 4),
            (ThemeTag::Social, 3),
            (ThemeTag::Academic, 2),
            (ThemeTag::Food, 1),
        ]));
        assert_eq!(plan, vec![ThemeTag::Family, ThemeTag::Social, ThemeTag::Academic]);
    }

    #[test]
    fn test_one_per_theme_in_priority_order() {
        let selector = selector();
        let mut rng = StdRng::seed_from_u64(7);
        let themes = scores(&[(ThemeTag::Family, 2), (ThemeTag::Social, 1)]);

        let selected = selector.select(&themes, 5, 0.0, &mut rng);

        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].themes, vec![ThemeTag::Family]);
        assert_eq!(selected[1].themes, vec![ThemeTag::Social]);
        assert_eq!(selected[2].themes, vec![ThemeTag::General]);
    }

    #[test]
    fn test_grounding_on_strong_negative() {
        let selector = selector();
        let mut rng = StdRng::seed_from_u64(1);
        let themes = scores(&[(ThemeTag::Family, 2), (ThemeTag::Social, 1)]);

        let selected = selector.select(&themes, 9, -0.8, &mut rng);
        assert_eq!(selected.len(), 4);
        assert!(selected[3].themes.is_empty());

        // -0.5 itself is not strongly negative
        let selected = selector.select(&themes, 9, -0.5, &mut rng);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_single_grounding_strategy() {
        let mut catalog = StrategyCatalog::builtin();
        for i in 0..3 {
            catalog.push(
                CatalogKey::Grounding,
                Strategy::new(None, format!("Grounding {}", i), "", ["Breathe"]),
            );
        }
        let selector = StrategySelector::new(Arc::new(catalog));
        let themes = scores(&[
            (ThemeTag::Family, 3),
            (ThemeTag::Social, 2),
            (ThemeTag::Academic, 1),
        ]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selected = selector.select(&themes, 10, -1.0, &mut rng);
            assert!(selected.len() <= MAX_STRATEGIES);
            assert_eq!(selected.len(), 4);
        }
    }

    #[test]
    fn test_no_duplicates_across_buckets() {
        // Same title filed under two themes
        let mut catalog = StrategyCatalog::empty();
        let shared = |theme| Strategy::new(Some(theme), "Walk Outside", "", ["Go"]);
        catalog.push(CatalogKey::Theme(ThemeTag::Family), shared(ThemeTag::Family));
        catalog.push(CatalogKey::Theme(ThemeTag::General), shared(ThemeTag::General));
        let selector = StrategySelector::new(Arc::new(catalog));

        let mut rng = StdRng::seed_from_u64(3);
        let selected = selector.select(&scores(&[(ThemeTag::Family, 1)]), 5, 0.0, &mut rng);

        let unique: HashSet<String> = ids(&selected).into_iter().collect();
        assert_eq!(unique.len(), selected.len());
        assert!(selected.len() >= MIN_STRATEGIES);
        assert_eq!(selected[0].id, "walk-outside");
    }

    #[test]
    fn test_empty_catalog_uses_defaults() {
        let selector = StrategySelector::new(Arc::new(StrategyCatalog::empty()));
        let mut rng = StdRng::seed_from_u64(0);

        assert!(matches!(
            selector.try_select(&ThemeScores::general(), 5, 0.0, &mut rng),
            Err(EngineError::EmptyCatalog)
        ));

        let selected = selector.select(&ThemeScores::general(), 5, 0.0, &mut rng);
        assert_eq!(ids(&selected), ids(&default_strategies()));
    }

    #[test]
    fn test_band_preference() {
        let mut catalog = StrategyCatalog::empty();
        catalog.push(
            CatalogKey::Theme(ThemeTag::General),
            Strategy::new(Some(ThemeTag::General), "Heavy", "", ["a"])
                .with_band(SeverityBand::Significant),
        );
        catalog.push(
            CatalogKey::Theme(ThemeTag::General),
            Strategy::new(Some(ThemeTag::General), "Light", "", ["a"])
                .with_band(SeverityBand::Minimal),
        );
        let selector = StrategySelector::new(Arc::new(catalog));

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let selected = selector.select(&ThemeScores::general(), 9, 0.0, &mut rng);
            assert_eq!(selected[0].id, "heavy");
            // Bucket exhausted after the off-band strategy
            assert_eq!(ids(&selected), vec!["heavy", "light"]);
        }
    }

    #[test]
    fn test_seeded_selection_is_repeatable() {
        let selector = selector();
        let themes = scores(&[(ThemeTag::Food, 1), (ThemeTag::Cultural, 1)]);

        let a = selector.select(&themes, 4, 0.2, &mut StdRng::seed_from_u64(42));
        let b = selector.select(&themes, 4, 0.2, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
