//! Tokenizer / Normalizer.
//!
//! Lowercases text, keeps only letter/digit runs, drops stopwords and purely
//! numeric tokens, and optionally reduces plural forms to their singular.
//! Never fails: when the pattern splitter cannot be built it degrades to
//! plain whitespace splitting.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::warn;

use super::lexicon::Lexicon;

/// Letter/digit runs in any script.
pub const DEFAULT_TOKEN_PATTERN: &str = r"[\p{L}\p{N}]+";

static DEFAULT_SPLITTER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(DEFAULT_TOKEN_PATTERN).ok());

#[derive(Debug, Clone)]
enum Splitter {
    Pattern(Regex),
    Whitespace,
}

/// Turns raw text into a filtered token sequence.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    splitter: Splitter,
    lemmatize: bool,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Tokenizer {
    /// Tokenizer using the default letter/digit pattern.
    pub fn new(lemmatize: bool) -> Self {
        let splitter = match DEFAULT_SPLITTER.as_ref() {
            Some(re) => Splitter::Pattern(re.clone()),
            None => {
                warn!("Default token pattern unavailable, falling back to whitespace splitting");
                Splitter::Whitespace
            }
        };
        Self { splitter, lemmatize }
    }

    /// Tokenizer with a custom token pattern. An invalid pattern degrades to
    /// whitespace splitting rather than failing.
    pub fn with_pattern(pattern: &str, lemmatize: bool) -> Self {
        let splitter = match Regex::new(pattern) {
            Ok(re) => Splitter::Pattern(re),
            Err(e) => {
                warn!(error = %e, "Invalid token pattern, falling back to whitespace splitting");
                Splitter::Whitespace
            }
        };
        Self { splitter, lemmatize }
    }

    /// Tokenizer that only splits on whitespace after stripping punctuation.
    pub fn whitespace(lemmatize: bool) -> Self {
        Self {
            splitter: Splitter::Whitespace,
            lemmatize,
        }
    }

    /// True when running on the whitespace fallback.
    pub fn is_degraded(&self) -> bool {
        matches!(self.splitter, Splitter::Whitespace)
    }

    pub fn lemmatizes(&self) -> bool {
        self.lemmatize
    }

    fn split(&self, lowered: &str) -> Vec<String> {
        match &self.splitter {
            Splitter::Pattern(re) => re
                .find_iter(lowered)
                .map(|m| m.as_str().chars().filter(|c| c.is_alphanumeric()).collect::<String>())
                .filter(|w| !w.is_empty())
                .collect(),
            Splitter::Whitespace => strip_punctuation(lowered)
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Normalize `text` into tokens. Empty or whitespace-only input yields an
    /// empty sequence.
    pub fn normalize(&self, text: &str, lexicon: &Lexicon) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![];
        }

        self.split(&text.to_lowercase())
            .into_iter()
            .filter(|w| !w.chars().all(char::is_numeric))
            .filter(|w| !lexicon.is_stopword(w))
            .map(|w| if self.lemmatize { lemmatize(&w) } else { w })
            .collect()
    }
}

/// Decode raw entry bytes. Invalid UTF-8 sequences become U+FFFD, which the
/// splitter treats as a separator, so an undecodable entry normalizes to no
/// tokens instead of failing.
pub fn decode_entry(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if let Cow::Owned(_) = text {
        warn!(bytes = bytes.len(), "Entry is not valid UTF-8; undecodable bytes replaced");
    }
    text.into_owned()
}

/// Lowercased words of `text` with nothing removed. Used for phrase matching,
/// where stopwords ("who i am") must survive.
pub fn plain_words(text: &str) -> Vec<String> {
    strip_punctuation(&text.to_lowercase())
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn strip_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect()
}

/// Reduce an English plural to its singular form.
///
/// Deliberately small: only the regular noun plurals are handled
/// ("friends", "families", "classes", "churches"). Words of three characters
/// or fewer and words ending in -ss/-us/-is are left alone.
pub fn lemmatize(word: &str) -> String {
    let len = word.chars().count();
    if len <= 3 || !word.ends_with('s') {
        return word.to_string();
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("ies") {
        if len > 4 {
            return format!("{}y", stem);
        }
    }
    if let Some(stem) = word.strip_suffix("es") {
        if ["ss", "x", "ch", "sh", "z"].iter().any(|end| stem.ends_with(end)) {
            return stem.to_string();
        }
    }
    word[..word.len() - 1].to_string()
}
