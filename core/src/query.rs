use crate::error::{Result, SearchError};
use crate::tokenizer::{is_valid_word, split_into_words, StopWords};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWord<'a> {
    pub text: &'a str,
    pub is_minus: bool,
    pub is_stop: bool,
}

/// Parsed query. Words borrow from the raw query string; stop words never
/// appear in either list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'a> {
    pub plus_words: Vec<&'a str>,
    pub minus_words: Vec<&'a str>,
}

impl Query<'_> {
    pub fn is_empty(&self) -> bool { self.plus_words.is_empty() && self.minus_words.is_empty() }

    /// Sort and deduplicate both word lists.
    pub fn normalize(&mut self) {
        for words in [&mut self.plus_words, &mut self.minus_words] {
            words.sort_unstable();
            words.dedup();
        }
    }
}

pub struct QueryParser<'s> {
    stop_words: &'s StopWords,
}

impl<'s> QueryParser<'s> {
    pub fn new(stop_words: &'s StopWords) -> Self { Self { stop_words } }

    pub fn parse_word<'a>(&self, word: &'a str) -> Result<QueryWord<'a>> {
        if !is_valid_word(word) {
            return Err(SearchError::invalid_argument(format!("query word {word:?} contains control characters")));
        }
        let (text, is_minus) = match word.strip_prefix('-') {
            Some(rest) => {
                if rest.is_empty() || rest.starts_with('-') {
                    return Err(SearchError::invalid_argument(format!("malformed minus word {word:?}")));
                }
                (rest, true)
            }
            None => (word, false),
        };
        Ok(QueryWord { text, is_minus, is_stop: self.stop_words.contains(text) })
    }

    /// Parse with sorted, deduplicated word lists. Iteration order is
    /// deterministic, which the sequential scorer relies on.
    pub fn parse<'a>(&self, raw_query: &'a str) -> Result<Query<'a>> {
        let mut query = self.parse_unsorted(raw_query)?;
        query.normalize();
        Ok(query)
    }

    /// Parse without sorting or deduplicating. Used by the parallel paths,
    /// which dedup only where it matters.
    pub fn parse_unsorted<'a>(&self, raw_query: &'a str) -> Result<Query<'a>> {
        let mut query = Query::default();
        for word in split_into_words(raw_query) {
            let qw = self.parse_word(word)?;
            if qw.is_stop { continue; }
            if qw.is_minus {
                query.minus_words.push(qw.text);
            } else {
                query.plus_words.push(qw.text);
            }
        }
        Ok(query)
    }
}
