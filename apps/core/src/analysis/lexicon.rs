//! Lexicon Store.
//!
//! Static word lists the rest of the engine reads from: stopwords, polarity
//! lists, the homesickness lexicon and one keyword set per theme.
//! Built once per process (optionally overlaid by a JSON catalog file) and
//! shared read-only behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::catalog::{CatalogKey, StrategyCatalog, StrategyRecord};
use super::tokenizer::lemmatize;
use crate::error::{EngineError, EngineResult};

/// Fixed semantic categories used to bucket keywords and strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeTag {
    Family,
    Food,
    Cultural,
    Social,
    Academic,
    Environment,
    Identity,
    General,
}

impl ThemeTag {
    /// Every theme, in tie-break order.
    pub const ALL: [ThemeTag; 8] = [
        ThemeTag::Family,
        ThemeTag::Food,
        ThemeTag::Cultural,
        ThemeTag::Social,
        ThemeTag::Academic,
        ThemeTag::Environment,
        ThemeTag::Identity,
        ThemeTag::General,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ThemeTag::Family => "Family",
            ThemeTag::Food => "Food",
            ThemeTag::Cultural => "Cultural",
            ThemeTag::Social => "Social",
            ThemeTag::Academic => "Academic",
            ThemeTag::Environment => "Environment",
            ThemeTag::Identity => "Identity",
            ThemeTag::General => "General",
        }
    }

    /// Parse a theme name as written in catalog files. Accepts the historical
    /// long names ("Family Separation", "academics", ...) as well.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_lowercase();
        let first = key.split_whitespace().next().unwrap_or("");
        match first {
            "family" => Some(ThemeTag::Family),
            "food" => Some(ThemeTag::Food),
            "cultural" | "culture" => Some(ThemeTag::Cultural),
            "social" => Some(ThemeTag::Social),
            "academic" | "academics" => Some(ThemeTag::Academic),
            "environment" => Some(ThemeTag::Environment),
            "identity" => Some(ThemeTag::Identity),
            "general" => Some(ThemeTag::General),
            _ => None,
        }
    }
}

impl fmt::Display for ThemeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// English stopwords
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
    "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
    "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "is", "are", "was", "were", "be",
    "been", "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an",
    "the", "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by",
    "for", "with", "about", "against", "between", "into", "through", "during", "before",
    "after", "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over",
    "under", "again", "further", "then", "once", "here", "there", "when", "where", "why",
    "how", "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
    "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will",
    "just", "don", "should", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren",
    "couldn", "didn", "doesn", "hadn", "hasn", "haven", "isn", "ma", "mightn", "mustn",
    "needn", "shan", "shouldn", "wasn", "weren", "won", "wouldn",
];

const POSITIVE_WORDS: &[&str] = &[
    "happy", "good", "great", "excellent", "better", "improvement", "enjoy", "hope",
    "positive", "progress", "excited", "comfortable", "confident", "grateful", "thankful",
    "opportunity", "friend", "connection", "learn", "grow", "adapt", "overcome", "success",
    "achieve", "manage", "cope", "love", "glad", "fun", "calm", "proud", "relaxed",
    "wonderful", "welcome",
];

const NEGATIVE_WORDS: &[&str] = &[
    "sad", "bad", "terrible", "worse", "difficult", "hard", "struggle", "lonely", "alone",
    "homesick", "homesickness", "miss", "upset", "anxious", "worry", "stressed", "confused",
    "lost", "frustrated", "overwhelmed", "tired", "exhausted", "depressed", "disconnected",
    "isolated", "afraid", "scared", "cry", "hate", "unhappy", "awful", "empty",
];

/// Words that count as direct homesickness evidence for the severity score.
const HOMESICKNESS_KEYWORDS: &[&str] = &[
    "home", "miss", "family", "friend", "lonely", "alone", "culture", "different", "strange",
    "food", "language", "weather", "adapt", "adjust", "struggle", "lost", "confused",
    "isolation", "far", "distance", "custom", "tradition", "unfamiliar", "belong", "comfort",
    "routine", "nostalgia", "homesick", "homesickness",
];

const FAMILY_KEYWORDS: &[&str] = &[
    "family", "parent", "mom", "dad", "mother", "father", "sibling", "brother", "sister",
    "relative", "grandparent", "grandma", "grandpa", "home",
];

const FOOD_KEYWORDS: &[&str] = &[
    "food", "cuisine", "dish", "meal", "restaurant", "cook", "cooking", "taste", "flavor",
    "snack", "spice",
];

const CULTURAL_KEYWORDS: &[&str] = &[
    "culture", "cultural", "tradition", "custom", "language", "celebration", "festival",
    "holiday", "accent", "different", "adapt", "adjust",
];

const SOCIAL_KEYWORDS: &[&str] = &[
    "friend", "social", "lonely", "loneliness", "alone", "isolation", "isolated", "connect",
    "connection", "relationship", "party", "talk", "belong",
];

const ACADEMIC_KEYWORDS: &[&str] = &[
    "class", "course", "study", "school", "professor", "grade", "exam", "assignment",
    "lecture", "academic", "university", "homework", "deadline",
];

const ENVIRONMENT_KEYWORDS: &[&str] = &[
    "weather", "climate", "environment", "landscape", "nature", "city", "place",
    "neighborhood", "rain", "cold",
];

const IDENTITY_KEYWORDS: &[&str] = &[
    "identity", "self", "myself", "who i am", "belong", "fit in", "change", "different",
    "foreigner", "international",
];

/// Keyword set for one theme.
///
/// Single words are matched against tokens. Entries that contain whitespace
/// or are themselves stopwords can never survive tokenization, so they are kept
/// as phrases and matched against the flattened raw text instead.
#[derive(Debug, Clone, Default)]
pub struct ThemeKeywords {
    words: HashSet<String>,
    phrases: Vec<String>,
}

impl ThemeKeywords {
    fn build<S: AsRef<str>>(
        entries: &[S],
        stopwords: &HashSet<String>,
        lemmatize_words: bool,
    ) -> Self {
        let mut words = HashSet::new();
        let mut phrases = Vec::new();

        for entry in entries {
            let entry = entry.as_ref().trim().to_lowercase();
            if entry.is_empty() {
                continue;
            }
            if entry.contains(char::is_whitespace) || stopwords.contains(&entry) {
                let phrase = entry.split_whitespace().collect::<Vec<_>>().join(" ");
                if !phrases.contains(&phrase) {
                    phrases.push(phrase);
                }
            } else if lemmatize_words {
                words.insert(lemmatize(&entry));
            } else {
                words.insert(entry);
            }
        }

        Self { words, phrases }
    }

    pub fn contains_word(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.phrases.is_empty()
    }
}

/// Read-only word lists.
#[derive(Debug, Clone)]
pub struct Lexicon {
    stopwords: HashSet<String>,
    positive: HashSet<String>,
    negative: HashSet<String>,
    homesickness: HashSet<String>,
    themes: BTreeMap<ThemeTag, ThemeKeywords>,
    lemmatize: bool,
}

impl Lexicon {
    /// Compiled-in lexicon. `lemmatize` must match the tokenizer setting so
    /// that list entries and tokens are reduced the same way.
    pub fn builtin(lemmatize: bool) -> Self {
        let stopwords: HashSet<String> = STOPWORDS.iter().map(|s| s.to_string()).collect();

        let mut themes = BTreeMap::new();
        for (theme, entries) in [
            (ThemeTag::Family, FAMILY_KEYWORDS),
            (ThemeTag::Food, FOOD_KEYWORDS),
            (ThemeTag::Cultural, CULTURAL_KEYWORDS),
            (ThemeTag::Social, SOCIAL_KEYWORDS),
            (ThemeTag::Academic, ACADEMIC_KEYWORDS),
            (ThemeTag::Environment, ENVIRONMENT_KEYWORDS),
            (ThemeTag::Identity, IDENTITY_KEYWORDS),
        ] {
            themes.insert(theme, ThemeKeywords::build(entries, &stopwords, lemmatize));
        }

        Self {
            positive: term_set(POSITIVE_WORDS, lemmatize),
            negative: term_set(NEGATIVE_WORDS, lemmatize),
            homesickness: term_set(HOMESICKNESS_KEYWORDS, lemmatize),
            stopwords,
            themes,
            lemmatize,
        }
    }

    /// Replace the keyword set of one theme.
    pub fn set_theme_keywords<S: AsRef<str>>(&mut self, theme: ThemeTag, entries: &[S]) {
        let keywords = ThemeKeywords::build(entries, &self.stopwords, self.lemmatize);
        self.themes.insert(theme, keywords);
    }

    pub fn lemmatizes(&self) -> bool {
        self.lemmatize
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    pub fn is_positive(&self, token: &str) -> bool {
        self.positive.contains(token)
    }

    pub fn is_negative(&self, token: &str) -> bool {
        self.negative.contains(token)
    }

    pub fn is_homesickness_keyword(&self, token: &str) -> bool {
        self.homesickness.contains(token)
    }

    pub fn theme_keywords(&self, theme: ThemeTag) -> Option<&ThemeKeywords> {
        self.themes.get(&theme)
    }

    /// Themes with a non-empty keyword set, in `ThemeTag` order.
    pub fn themes(&self) -> impl Iterator<Item = (ThemeTag, &ThemeKeywords)> {
        self.themes
            .iter()
            .filter(|(_, keywords)| !keywords.is_empty())
            .map(|(theme, keywords)| (*theme, keywords))
    }

    /// First theme (in `ThemeTag` order) whose word set contains `token`.
    pub fn theme_of(&self, token: &str) -> Option<ThemeTag> {
        self.themes()
            .find(|(_, keywords)| keywords.contains_word(token))
            .map(|(theme, _)| theme)
    }
}

fn term_set(words: &[&str], lemmatize_words: bool) -> HashSet<String> {
    words
        .iter()
        .map(|w| if lemmatize_words { lemmatize(w) } else { w.to_string() })
        .collect()
}

/// One theme section of the catalog file.
#[derive(Debug, Deserialize)]
struct ThemeSection {
    #[serde(default)]
    keywords: Option<Vec<String>>,
    #[serde(default)]
    strategies: Option<Vec<StrategyRecord>>,
}

/// Lexicon plus strategy catalog: the process-wide configuration the
/// analyzer is built from.
#[derive(Debug, Clone)]
pub struct LexiconStore {
    pub lexicon: Lexicon,
    pub catalog: StrategyCatalog,
}

impl LexiconStore {
    pub fn builtin(lemmatize: bool) -> Self {
        Self {
            lexicon: Lexicon::builtin(lemmatize),
            catalog: StrategyCatalog::builtin(),
        }
    }

    /// Overlay a catalog file on top of the compiled-in defaults.
    ///
    /// Sections present in the file replace the keywords and/or strategies of
    /// that theme; everything else keeps its default.
    pub fn from_file(path: &Path, lemmatize: bool) -> EngineResult<Self> {
        if !path.exists() {
            return Err(EngineError::ConfigurationMissing(path.to_path_buf()));
        }

        let raw = fs::read_to_string(path)?;
        // Sorted by name so aliases of one theme resolve the same way every run
        let sections: BTreeMap<String, ThemeSection> = serde_json::from_str(&raw).map_err(|e| {
            EngineError::ConfigurationInvalid(format!("{}: {}", path.display(), e))
        })?;

        let mut store = Self::builtin(lemmatize);
        let mut seen = HashSet::new();

        for (name, section) in sections {
            let Some(key) = CatalogKey::from_name(&name) else {
                warn!(section = %name, "Ignoring unknown catalog section");
                continue;
            };
            if !seen.insert(key) {
                warn!(section = %name, key = ?key, "Ignoring duplicate catalog section");
                continue;
            }

            if let (CatalogKey::Theme(theme), Some(keywords)) = (key, section.keywords.as_ref()) {
                store.lexicon.set_theme_keywords(theme, keywords.as_slice());
            }

            if let Some(records) = section.strategies {
                store.catalog.replace_bucket(key, records);
            }
        }

        info!(
            path = %path.display(),
            sections = seen.len(),
            strategies = store.catalog.len(),
            "Loaded lexicon catalog"
        );

        Ok(store)
    }

    /// Load the catalog file if one is configured, falling back to the
    /// compiled-in defaults on any problem.
    pub fn load_or_builtin(path: Option<&Path>, lemmatize: bool) -> Self {
        let Some(path) = path else {
            return Self::builtin(lemmatize);
        };

        match Self::from_file(path, lemmatize) {
            Ok(store) => store,
            Err(e @ EngineError::ConfigurationMissing(_)) => {
                debug!("{}; using compiled-in lexicon", e);
                Self::builtin(lemmatize)
            }
            Err(e) => {
                warn!("{}; using compiled-in lexicon", e);
                Self::builtin(lemmatize)
            }
        }
    }
}
