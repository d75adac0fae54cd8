//! Analysis Engine Tests
//!
//! End-to-end properties of the local pipeline: value bounds, cardinality,
//! de-duplication, determinism under a fixed seed, and the reference entries.

use crate::analysis::{
    compute_severity, decode_entry, LexiconStore, Provenance, Strategy, StrategyCatalog,
    ThemeMatchMode, ThemeTag, WellnessAnalyzer,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// Test Fixtures
// ============================================================================

const ENTRIES: &[&str] = &[
    "",
    "   ",
    "I miss my family and feel so lonely and far from home",
    "I made new friends today and tried a great local restaurant",
    "The weather is cold and grey, nothing like home. I can't find the spices my mom cooks with.",
    "Exams next week. I'm stressed, tired and overwhelmed by assignments and lectures.",
    "Had a wonderful weekend! Went hiking with my roommate, felt calm and grateful.",
    "I don't know who I am anymore, I can't fit in anywhere and I feel like a foreigner.",
    "2024 2025 !!! ???",
    "Je suis très content aujourd'hui, merci beaucoup",
    "home home home home home home home home home home home home home home home",
];

fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn ids(strategies: &[Strategy]) -> Vec<&str> {
    strategies.iter().map(|s| s.id.as_str()).collect()
}

#[cfg(test)]
mod property_tests {
    use super::*;

    #[test]
    fn test_values_always_in_range() {
        let analyzer = WellnessAnalyzer::new();

        for (i, entry) in ENTRIES.iter().enumerate() {
            let result = analyzer.analyze_local_with_rng(entry, &mut seeded(i as u64));

            assert!(
                (-1.0..=1.0).contains(&result.sentiment_score),
                "sentiment out of range for '{}'",
                entry
            );
            assert!(
                (1..=10).contains(&result.severity_level),
                "severity out of range for '{}'",
                entry
            );
            assert!(!result.themes.is_empty(), "empty themes for '{}'", entry);
        }
    }

    #[test]
    fn test_cardinality_and_no_duplicates() {
        let analyzer = WellnessAnalyzer::new();

        for seed in 0..25 {
            for entry in ENTRIES {
                let result = analyzer.analyze_local_with_rng(entry, &mut seeded(seed));

                assert!(
                    (2..=5).contains(&result.strategies.len()),
                    "{} strategies for '{}'",
                    result.strategies.len(),
                    entry
                );
                assert!(result.keywords.len() <= 10);

                let unique: HashSet<&str> = ids(&result.strategies).into_iter().collect();
                assert_eq!(unique.len(), result.strategies.len(), "duplicate for '{}'", entry);

                let titles: HashSet<&str> =
                    result.strategies.iter().map(|s| s.title.as_str()).collect();
                assert_eq!(titles.len(), result.strategies.len());
            }
        }
    }

    #[test]
    fn test_idempotent_with_fixed_seed() {
        let analyzer = WellnessAnalyzer::new();

        for entry in ENTRIES {
            let first = analyzer.analyze_local_with_rng(entry, &mut seeded(11));
            let second = analyzer.analyze_local_with_rng(entry, &mut seeded(11));

            assert_eq!(first.to_response(), second.to_response());
            assert_eq!(ids(&first.strategies), ids(&second.strategies));
            assert_eq!(first.keyword_hits, second.keyword_hits);
        }
    }

    #[test]
    fn test_severity_monotonic_in_sentiment() {
        for hits in [0usize, 1, 3] {
            for tokens in [0usize, 8, 25] {
                let mut previous = compute_severity(hits, tokens, 0.0);
                for step in 1..=10 {
                    let level = compute_severity(hits, tokens, -(step as f32) / 10.0);
                    assert!(level >= previous);
                    previous = level;
                }
            }
        }
    }

    #[test]
    fn test_keywords_never_repeat() {
        let analyzer = WellnessAnalyzer::new();
        let result = analyzer.analyze_local(ENTRIES[10]);

        assert_eq!(result.keywords, vec!["home"]);
        assert_eq!(result.keyword_hits.len(), 1);
        assert_eq!(result.keyword_hits[0].frequency, 15);
        assert_eq!(result.severity_level, 10);
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_empty_entry() {
        let analyzer = WellnessAnalyzer::new();
        let result = analyzer.analyze_local_with_rng("", &mut seeded(0));

        assert_eq!(result.sentiment_score, 0.0);
        assert_eq!(result.severity_level, 5);
        assert_eq!(result.themes.tags(), vec![ThemeTag::General]);
        assert!(result.strategies.len() >= 2);
        assert!(result.keywords.is_empty());
        assert_eq!(result.provenance, Provenance::Local);
    }

    #[test]
    fn test_undecodable_entry_runs_full_pipeline() {
        let analyzer = WellnessAnalyzer::new();
        let text = decode_entry(&[0xc3, 0x28, 0xff, 0xfe, 0xa0, 0xa1]);
        let result = analyzer.analyze_local_with_rng(&text, &mut seeded(5));

        assert_eq!(result.token_count, 0);
        assert_eq!(result.sentiment_score, 0.0);
        assert_eq!(result.severity_level, 5);
        assert_eq!(result.themes.tags(), vec![ThemeTag::General]);
        assert!((2..=5).contains(&result.strategies.len()));
    }

    #[test]
    fn test_partly_undecodable_entry_keeps_words() {
        let analyzer = WellnessAnalyzer::new();
        let text = decode_entry(b"I miss home \xff\xfe lonely");
        let result = analyzer.analyze_local_with_rng(&text, &mut seeded(1));
        let clean = analyzer.analyze_local_with_rng("I miss home lonely", &mut seeded(1));

        assert_eq!(result.sentiment_score, clean.sentiment_score);
        assert_eq!(result.severity_level, clean.severity_level);
        assert_eq!(result.keywords, clean.keywords);
        assert_eq!(result.themes.tags(), clean.themes.tags());
    }

    #[test]
    fn test_homesick_entry() {
        let analyzer = WellnessAnalyzer::new();
        let result = analyzer.analyze_local_with_rng(ENTRIES[2], &mut seeded(3));

        for keyword in ["miss", "family", "lonely", "far", "home"] {
            assert!(result.keywords.contains(&keyword.to_string()), "missing {}", keyword);
        }
        assert_eq!(result.keyword_hits.len(), 5);
        assert!(result.themes.contains(ThemeTag::Family));
        assert!(result.themes.contains(ThemeTag::Social));
        assert!(result.sentiment_score < 0.0);
        assert!(result.severity_level >= 6);

        // Strongly negative: Family, Social, General, then grounding
        assert_eq!(result.strategies.len(), 4);
        assert_eq!(result.strategies[0].themes, vec![ThemeTag::Family]);
        assert!(result.strategies[3].themes.is_empty());
    }

    #[test]
    fn test_positive_entry() {
        let analyzer = WellnessAnalyzer::new();
        let result = analyzer.analyze_local_with_rng(ENTRIES[3], &mut seeded(5));

        assert!(result.sentiment_score > 0.0);
        assert!(result.severity_level <= 4);
        assert!(result.themes.contains(ThemeTag::Social));
        assert!(result.themes.contains(ThemeTag::Food));
        assert!(result.strategies.len() >= 2);
    }

    #[test]
    fn test_identity_phrases() {
        let analyzer = WellnessAnalyzer::new();
        let result = analyzer.analyze_local(ENTRIES[7]);

        assert!(result.themes.contains(ThemeTag::Identity));
    }

    #[test]
    fn test_numbers_only() {
        let analyzer = WellnessAnalyzer::new();
        let result = analyzer.analyze_local(ENTRIES[8]);

        assert_eq!(result.token_count, 0);
        assert_eq!(result.severity_level, 5);
        assert_eq!(result.themes.tags(), vec![ThemeTag::General]);
    }

    #[test]
    fn test_presence_mode() {
        let analyzer =
            WellnessAnalyzer::from_store(LexiconStore::builtin(true), ThemeMatchMode::Presence);
        let result = analyzer.analyze_local(ENTRIES[2]);

        assert_eq!(result.themes.weight(ThemeTag::Family), Some(1));
        assert_eq!(result.themes.weight(ThemeTag::Social), Some(1));
    }

    #[test]
    fn test_without_lemmatization() {
        let analyzer =
            WellnessAnalyzer::from_store(LexiconStore::builtin(false), ThemeMatchMode::Frequency);
        let result = analyzer.analyze_local("My parents call every sunday");

        // "parents" no longer reduces to the listed "parent"
        assert!(!result.themes.contains(ThemeTag::Family));
    }

    #[test]
    fn test_empty_catalog_still_recommends() {
        let store = LexiconStore {
            catalog: StrategyCatalog::empty(),
            ..LexiconStore::builtin(true)
        };
        let analyzer = WellnessAnalyzer::from_store(store, ThemeMatchMode::Frequency);
        let result = analyzer.analyze_local(ENTRIES[2]);

        assert_eq!(
            ids(&result.strategies),
            vec!["connect-with-others", "practice-self-care", "explore-your-new-home"]
        );
    }
}

#[cfg(test)]
mod concurrency_tests {
    use super::*;

    #[test]
    fn test_shared_analyzer_across_threads() {
        let analyzer = Arc::new(WellnessAnalyzer::new());
        let expected = analyzer.analyze_local_with_rng(ENTRIES[4], &mut seeded(99)).to_response();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let analyzer = Arc::clone(&analyzer);
                let expected = expected.clone();
                scope.spawn(move || {
                    let result = analyzer.analyze_local_with_rng(ENTRIES[4], &mut seeded(99));
                    assert_eq!(result.to_response(), expected);
                });
            }
        });
    }

    #[tokio::test]
    async fn test_concurrent_async_calls() {
        let analyzer = Arc::new(WellnessAnalyzer::new());

        let handles: Vec<_> = ENTRIES
            .iter()
            .map(|entry| {
                let analyzer = Arc::clone(&analyzer);
                let entry = entry.to_string();
                tokio::spawn(async move { analyzer.analyze(&entry).await })
            })
            .collect();

        for handle in handles {
            let result = handle.await.unwrap();
            assert!((2..=5).contains(&result.strategies.len()));
            assert_eq!(result.provenance, Provenance::Local);
        }
    }
}
