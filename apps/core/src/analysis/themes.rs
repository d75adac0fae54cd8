//! Theme & Keyword Extraction.
//!
//! Maps the filtered tokens onto the fixed theme set and picks out the
//! keywords worth showing back to the user. Homesickness-lexicon words always
//! win a keyword slot over merely frequent words.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::lexicon::{Lexicon, ThemeTag};
use super::tokenizer::plain_words;

/// How theme relevance is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMatchMode {
    /// Count every matching token occurrence (plus phrase occurrences).
    #[default]
    Frequency,
    /// Boolean membership: substring scan of the lowercase raw text,
    /// every matched theme weighs 1.
    Presence,
}

impl ThemeMatchMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "frequency" => Some(ThemeMatchMode::Frequency),
            "presence" => Some(ThemeMatchMode::Presence),
            _ => None,
        }
    }
}

/// Theme → relevance weight.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeScores(BTreeMap<ThemeTag, usize>);

impl ThemeScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fallback theme set: `General` with no supporting evidence.
    pub fn general() -> Self {
        let mut scores = Self::new();
        scores.insert(ThemeTag::General, 0);
        scores
    }

    pub fn insert(&mut self, theme: ThemeTag, weight: usize) {
        self.0.insert(theme, weight);
    }

    pub fn weight(&self, theme: ThemeTag) -> Option<usize> {
        self.0.get(&theme).copied()
    }

    pub fn contains(&self, theme: ThemeTag) -> bool {
        self.0.contains_key(&theme)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Themes by weight, descending. Equal weights keep `ThemeTag` order.
    pub fn ranked(&self) -> Vec<(ThemeTag, usize)> {
        let mut ranked: Vec<(ThemeTag, usize)> = self.0.iter().map(|(t, w)| (*t, *w)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    pub fn tags(&self) -> Vec<ThemeTag> {
        self.ranked().into_iter().map(|(theme, _)| theme).collect()
    }

    /// Never hand an empty theme set to the selector.
    pub fn or_general(self) -> Self {
        if self.is_empty() {
            Self::general()
        } else {
            self
        }
    }
}

/// A homesickness-lexicon token found in the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordHit {
    pub token: String,
    pub theme: Option<ThemeTag>,
    pub frequency: usize,
}

/// Output of one extraction pass.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub themes: ThemeScores,
    pub keywords: Vec<String>,
    pub hits: Vec<KeywordHit>,
}

impl Extraction {
    /// Total homesickness-keyword occurrences (drives keyword density).
    pub fn homesickness_hit_count(&self) -> usize {
        self.hits.iter().map(|h| h.frequency).sum()
    }
}

/// Theme and keyword extractor
#[derive(Debug, Clone)]
pub struct ThemeExtractor {
    mode: ThemeMatchMode,
    max_keywords: usize,
    candidate_pool: usize,
    min_keyword_len: usize,
}

impl Default for ThemeExtractor {
    fn default() -> Self {
        Self::new(ThemeMatchMode::Frequency)
    }
}

impl ThemeExtractor {
    pub fn new(mode: ThemeMatchMode) -> Self {
        Self::with_limits(mode, 10, 15, 3)
    }

    /// * `max_keywords` - hard cap on returned keywords
    /// * `candidate_pool` - how many frequent words are considered at all
    /// * `min_keyword_len` - minimum characters for a frequent word to qualify
    pub fn with_limits(
        mode: ThemeMatchMode,
        max_keywords: usize,
        candidate_pool: usize,
        min_keyword_len: usize,
    ) -> Self {
        Self {
            mode,
            max_keywords,
            candidate_pool,
            min_keyword_len,
        }
    }

    pub fn mode(&self) -> ThemeMatchMode {
        self.mode
    }

    pub fn detect_themes(
        &self,
        tokens: &[String],
        raw_text: &str,
        lexicon: &Lexicon,
    ) -> ThemeScores {
        match self.mode {
            ThemeMatchMode::Frequency => self.themes_by_frequency(tokens, raw_text, lexicon),
            ThemeMatchMode::Presence => self.themes_by_presence(raw_text, lexicon),
        }
    }

    fn themes_by_frequency(
        &self,
        tokens: &[String],
        raw_text: &str,
        lexicon: &Lexicon,
    ) -> ThemeScores {
        let mut scores = ThemeScores::new();
        let mut words: Option<Vec<String>> = None;

        for (theme, keywords) in lexicon.themes() {
            let mut count = tokens.iter().filter(|t| keywords.contains_word(t)).count();

            if !keywords.phrases().is_empty() {
                let words = words.get_or_insert_with(|| plain_words(raw_text));
                count += keywords
                    .phrases()
                    .iter()
                    .map(|phrase| count_phrase(words, phrase))
                    .sum::<usize>();
            }

            if count > 0 {
                scores.insert(theme, count);
            }
        }

        scores
    }

    fn themes_by_presence(&self, raw_text: &str, lexicon: &Lexicon) -> ThemeScores {
        let lowered = raw_text.to_lowercase();
        let mut scores = ThemeScores::new();

        for (theme, keywords) in lexicon.themes() {
            let found = keywords.words().any(|w| lowered.contains(w))
                || keywords.phrases().iter().any(|p| lowered.contains(p.as_str()));
            if found {
                scores.insert(theme, 1);
            }
        }

        scores
    }

    /// Top keywords plus the homesickness hits they were chosen from.
    pub fn extract_keywords(
        &self,
        tokens: &[String],
        lexicon: &Lexicon,
    ) -> (Vec<String>, Vec<KeywordHit>) {
        // Frequencies in first-seen order
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for token in tokens {
            let i = *index.entry(token.as_str()).or_insert_with(|| {
                counts.push((token.as_str(), 0));
                counts.len() - 1
            });
            counts[i].1 += 1;
        }

        let hits: Vec<KeywordHit> = counts
            .iter()
            .filter(|(word, _)| lexicon.is_homesickness_keyword(word))
            .map(|(word, frequency)| KeywordHit {
                token: word.to_string(),
                theme: lexicon.theme_of(word),
                frequency: *frequency,
            })
            .collect();

        // Stable sort keeps first-seen order among equal frequencies
        let mut ranked = counts;
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let mut chosen: HashSet<&str> = HashSet::new();
        for (word, _) in &ranked {
            if chosen.len() >= self.max_keywords {
                break;
            }
            if lexicon.is_homesickness_keyword(word) {
                chosen.insert(*word);
            }
        }
        for (word, _) in ranked
            .iter()
            .filter(|(word, _)| word.chars().count() >= self.min_keyword_len)
            .take(self.candidate_pool)
        {
            if chosen.len() >= self.max_keywords {
                break;
            }
            chosen.insert(*word);
        }

        let keywords = ranked
            .iter()
            .filter(|(word, _)| chosen.contains(word))
            .map(|(word, _)| word.to_string())
            .collect();

        (keywords, hits)
    }

    pub fn extract(&self, tokens: &[String], raw_text: &str, lexicon: &Lexicon) -> Extraction {
        let themes = self.detect_themes(tokens, raw_text, lexicon);
        let (keywords, hits) = self.extract_keywords(tokens, lexicon);

        Extraction {
            themes,
            keywords,
            hits,
        }
    }
}

fn count_phrase(words: &[String], phrase: &str) -> usize {
    let parts: Vec<&str> = phrase.split_whitespace().collect();
    if parts.is_empty() {
        return 0;
    }
    words
        .windows(parts.len())
        .filter(|window| window.iter().zip(&parts).all(|(w, p)| w == p))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_frequency_themes() {
        let lexicon = Lexicon::builtin(true);
        let extractor = ThemeExtractor::default();

        let toks = tokens(&["miss", "family", "feel", "lonely", "far", "home"]);
        let themes = extractor.detect_themes(&toks, "", &lexicon);

        assert_eq!(themes.weight(ThemeTag::Family), Some(2));
        assert_eq!(themes.weight(ThemeTag::Social), Some(1));
        assert!(!themes.contains(ThemeTag::Academic));
        assert_eq!(themes.tags()[0], ThemeTag::Family);
    }

    #[test]
    fn test_phrases_survive_stopword_removal() {
        let lexicon = Lexicon::builtin(true);
        let extractor = ThemeExtractor::default();

        let text = "I don't know who I am here, I can't fit in";
        let themes = extractor.detect_themes(&[], text, &lexicon);
        assert_eq!(themes.weight(ThemeTag::Identity), Some(2));
    }

    #[test]
    fn test_presence_mode_is_boolean() {
        let lexicon = Lexicon::builtin(true);
        let extractor = ThemeExtractor::new(ThemeMatchMode::Presence);

        let text = "My parents and my brother and my sister";
        let themes = extractor.detect_themes(&[], text, &lexicon);
        assert_eq!(themes.weight(ThemeTag::Family), Some(1));

        // Substring matching is coarse on purpose
        let themes = extractor.detect_themes(&[], "Homework again", &lexicon);
        assert!(themes.contains(ThemeTag::Family));
    }

    #[test]
    fn test_or_general() {
        assert_eq!(ThemeScores::new().or_general().tags(), vec![ThemeTag::General]);

        let mut scores = ThemeScores::new();
        scores.insert(ThemeTag::Food, 2);
        assert_eq!(scores.or_general().tags(), vec![ThemeTag::Food]);
    }

    #[test]
    fn test_ranking_ties_follow_theme_order() {
        let mut scores = ThemeScores::new();
        scores.insert(ThemeTag::Social, 1);
        scores.insert(ThemeTag::Family, 1);
        scores.insert(ThemeTag::Academic, 3);

        assert_eq!(
            scores.tags(),
            vec![ThemeTag::Academic, ThemeTag::Family, ThemeTag::Social]
        );
    }

    #[test]
    fn test_keywords_stable_order() {
        let lexicon = Lexicon::builtin(true);
        let extractor = ThemeExtractor::default();

        let toks = tokens(&["lonely", "home", "home", "family", "family", "campus"]);
        let (keywords, hits) = extractor.extract_keywords(&toks, &lexicon);

        assert_eq!(keywords, vec!["home", "family", "lonely", "campus"]);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].token, "lonely");
        assert_eq!(hits[0].theme, Some(ThemeTag::Social));
        assert_eq!(hits.iter().map(|h| h.frequency).sum::<usize>(), 5);
    }

    #[test]
    fn test_homesickness_keywords_take_priority() {
        let lexicon = Lexicon::builtin(true);
        let extractor = ThemeExtractor::default();

        let generic = [
            "apple", "banana", "cherry", "grape", "lemon", "mango", "melon", "olive", "peach",
            "pear", "plum", "kiwi",
        ];
        let mut toks = Vec::new();
        for word in generic {
            toks.push(word.to_string());
            toks.push(word.to_string());
        }
        toks.push("nostalgia".to_string());

        let (keywords, _) = extractor.extract_keywords(&toks, &lexicon);
        assert_eq!(keywords.len(), 10);
        assert!(keywords.contains(&"nostalgia".to_string()));
        assert_eq!(keywords[0], "apple");
    }

    #[test]
    fn test_short_words_skipped_unless_homesick() {
        let lexicon = Lexicon::builtin(true);
        let extractor = ThemeExtractor::default();

        let (keywords, _) = extractor.extract_keywords(&tokens(&["ok", "go", "far"]), &lexicon);
        assert_eq!(keywords, vec!["far"]);
    }

    #[test]
    fn test_empty_tokens() {
        let lexicon = Lexicon::builtin(true);
        let extraction = ThemeExtractor::default().extract(&[], "", &lexicon);

        assert!(extraction.themes.is_empty());
        assert!(extraction.keywords.is_empty());
        assert_eq!(extraction.homesickness_hit_count(), 0);
    }
}
