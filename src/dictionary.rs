//! Misspelling classification against a layered dictionary.
//!
//! A word is checked against, in order: the minimum length, the user
//! dictionary, the built-in exception list, and finally the dictionary engine.
//! The engine is external; anything implementing [`Dictionary`] can be used.

use crate::config::SettingsSnapshot;
use crate::exceptions::is_builtin_exception;
use crate::words::decompose;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::Path;

/// Words shorter than this are never reported
pub const MIN_WORD_LENGTH: usize = 4;

/// Errors raised by dictionary engines
#[derive(Debug, thiserror::Error)]
pub enum DictionaryError {
    /// The engine could not answer for a word
    #[error("Dictionary engine failed on '{word}': {reason}")]
    Engine { word: String, reason: String },

    /// Failed to read word data
    #[error("Failed to read dictionary at {path}: {source}")]
    IoError { source: io::Error, path: String },
}

/// A spelling dictionary engine
pub trait Dictionary {
    /// Whether `word` is spelled correctly, exactly as given (case matters)
    fn check(&self, word: &str) -> Result<bool, DictionaryError>;

    /// Short name for diagnostics
    fn name(&self) -> &str {
        "dictionary"
    }
}

impl<D: Dictionary + ?Sized> Dictionary for Box<D> {
    fn check(&self, word: &str) -> Result<bool, DictionaryError> {
        (**self).check(word)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Accepts every word. Stands in when no word data is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl Dictionary for AcceptAll {
    fn check(&self, _word: &str) -> Result<bool, DictionaryError> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "accept-all"
    }
}

/// Exact-match dictionary backed by a word list.
///
/// Reads plain one-word-per-line lists and Hunspell `.dic` files (the leading
/// entry count is skipped and `/FLAGS` suffixes are stripped). Affix rules are
/// not expanded.
#[derive(Debug, Clone, Default)]
pub struct WordListDictionary {
    words: HashSet<String>,
}

impl WordListDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse word list content
    pub fn parse(content: &str) -> Self {
        let mut lines = content.lines().map(str::trim).peekable();

        // Hunspell .dic files start with an approximate entry count
        if lines.peek().is_some_and(|first| !first.is_empty() && first.chars().all(|c| c.is_ascii_digit())) {
            lines.next();
        }

        let words = lines
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            // Drop `/FLAGS` and tab-separated morphological fields
            .filter_map(|line| line.split(['/', '\t']).next())
            .map(str::trim_end)
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect();

        Self { words }
    }

    pub fn load(path: &Path) -> Result<Self, DictionaryError> {
        let content = fs::read_to_string(path).map_err(|source| DictionaryError::IoError {
            source,
            path: path.display().to_string(),
        })?;
        let dictionary = Self::parse(&content);
        log::debug!("Loaded {} words from {}", dictionary.len(), path.display());
        Ok(dictionary)
    }

    pub fn insert(&mut self, word: impl Into<String>) {
        self.words.insert(word.into());
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Dictionary for WordListDictionary {
    /// Exact match, plus Hunspell's casing rules: a lowercase entry also
    /// accepts its Capitalized and ALLCAPS forms, a Capitalized entry its
    /// ALLCAPS form.
    fn check(&self, word: &str) -> Result<bool, DictionaryError> {
        if self.words.contains(word) {
            return Ok(true);
        }
        let accepted = match Casing::of(word) {
            Casing::Capitalized => self.words.contains(&word.to_lowercase()),
            Casing::AllCaps => {
                let lower = word.to_lowercase();
                self.words.contains(&lower) || self.words.contains(&capitalize(&lower))
            }
            Casing::Other => false,
        };
        Ok(accepted)
    }

    fn name(&self) -> &str {
        "word-list"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Casing {
    Capitalized,
    AllCaps,
    Other,
}

impl Casing {
    fn of(word: &str) -> Self {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return Casing::Other;
        };
        let rest = chars.as_str();
        if !first.is_uppercase() {
            Casing::Other
        } else if !rest.is_empty() && !rest.chars().any(char::is_lowercase) {
            Casing::AllCaps
        } else if !rest.chars().any(char::is_uppercase) {
            Casing::Capitalized
        } else {
            Casing::Other
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Decides whether words and tokens are misspelled for one settings snapshot
pub struct Classifier<'a> {
    dictionary: &'a dyn Dictionary,
    settings: &'a SettingsSnapshot,
}

impl<'a> Classifier<'a> {
    pub fn new(dictionary: &'a dyn Dictionary, settings: &'a SettingsSnapshot) -> Self {
        Self { dictionary, settings }
    }

    /// Whether a single word is misspelled
    pub fn is_misspelled(&self, word: &str) -> bool {
        if word.len() < MIN_WORD_LENGTH {
            return false;
        }
        if self.settings.accepts_user_word(word) {
            return false;
        }
        if is_builtin_exception(word) {
            return false;
        }

        // Degraded engines fail open: a broken dictionary must not flood the page
        match self.accepted_by_engine(word) {
            Ok(true) => false,
            Ok(false) => {
                log::debug!("Misspelled: {word}");
                true
            }
            Err(e) => {
                log::warn!("{} could not check '{word}', treating it as correct: {e}", self.dictionary.name());
                false
            }
        }
    }

    fn accepted_by_engine(&self, word: &str) -> Result<bool, DictionaryError> {
        if self.dictionary.check(word)? {
            return Ok(true);
        }
        // Acronyms: the engine's casing rules may reject "Http" but accept "HTTP"
        self.dictionary.check(&word.to_uppercase())
    }

    /// Whether any word of `token` is misspelled
    pub fn is_flagged(&self, token: &str) -> bool {
        decompose(token).iter().any(|word| self.is_misspelled(word))
    }
}
