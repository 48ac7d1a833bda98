use std::collections::BTreeSet;

use crate::error::{Result, SearchError};

/// Split text on runs of the space character. Leading, trailing and repeated
/// spaces never produce empty words.
pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split(' ').filter(|w| !w.is_empty()).collect()
}

/// A word is valid when it holds no ASCII control characters.
pub fn is_valid_word(word: &str) -> bool {
    !word.chars().any(|c| (c as u32) < 0x20)
}

#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    /// Build a stop-word set, dropping empties and duplicates. Fails if any
    /// word carries a control character.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() { continue; }
            if !is_valid_word(word) {
                return Err(SearchError::invalid_argument(format!("stop word {word:?} contains control characters")));
            }
            set.insert(word.to_string());
        }
        Ok(Self { words: set })
    }

    pub fn contains(&self, word: &str) -> bool { self.words.contains(word) }

    pub fn len(&self) -> usize { self.words.len() }

    pub fn is_empty(&self) -> bool { self.words.is_empty() }
}

/// Tokenize document text into indexable words. Every token is validated
/// before anything is returned, so callers can commit all-or-nothing.
pub fn tokenize<'a>(text: &'a str, stop_words: &StopWords) -> Result<Vec<&'a str>> {
    let words = split_into_words(text);
    if let Some(bad) = words.iter().find(|w| !is_valid_word(w)) {
        return Err(SearchError::invalid_argument(format!("word {bad:?} contains control characters")));
    }
    Ok(words.into_iter().filter(|w| !stop_words.contains(w)).collect())
}
