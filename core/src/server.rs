use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::SearchConfig;
use crate::document::{average_rating, Document, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::index::{DocumentIds, IndexStore};
use crate::query::{Query, QueryParser};
use crate::relevance::{ExecutionPolicy, RelevanceEngine};
use crate::tokenizer::{split_into_words, tokenize, StopWords};
use crate::DocId;

/// In-memory TF-IDF search server.
///
/// Mutations (`add_document`, `remove_document*`) take `&mut self`; queries
/// take `&self` and may run concurrently with each other. Callers that need
/// queries alongside mutation from other threads must wrap the server in
/// their own lock.
pub struct SearchServer {
    stop_words: StopWords,
    index: IndexStore,
    engine: RelevanceEngine,
}

impl SearchServer {
    /// Build a server from a space-separated stop-word string.
    pub fn new(stop_words_text: &str) -> Result<Self> {
        Self::from_stop_words(split_into_words(stop_words_text))
    }

    pub fn from_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let config = SearchConfig::default().with_stop_words(stop_words.into_iter().map(|w| w.as_ref().to_string()));
        Self::with_config(config)
    }

    pub fn with_config(config: SearchConfig) -> Result<Self> {
        let stop_words = StopWords::new(&config.stop_words)?;
        let engine = RelevanceEngine::new(&config)?;
        Ok(Self { stop_words, index: IndexStore::new(), engine })
    }

    /// Index a document. Nothing is written unless the id and every token are
    /// valid.
    pub fn add_document(&mut self, id: DocId, text: &str, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        let words = tokenize(text, &self.stop_words)?;
        self.index.add_document(id, &words, average_rating(ratings), status)?;
        debug!(doc_id = id, word_count = words.len(), ?status, "document added");
        Ok(())
    }

    /// No-op for unknown ids.
    pub fn remove_document(&mut self, id: DocId) { self.remove_document_policy(ExecutionPolicy::Sequential, id) }

    pub fn remove_document_policy(&mut self, policy: ExecutionPolicy, id: DocId) {
        let removed = match policy {
            ExecutionPolicy::Sequential => self.index.remove_document(id),
            ExecutionPolicy::Parallel => {
                let index = &mut self.index;
                self.engine.pool().install(|| index.remove_document_parallel(id))
            }
        };
        if removed {
            debug!(doc_id = id, ?policy, "document removed");
        }
    }

    /// Top documents with status `Actual`.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_policy(ExecutionPolicy::Sequential, raw_query)
    }

    pub fn find_top_documents_by_status(&self, raw_query: &str, status: DocumentStatus) -> Result<Vec<Document>> {
        self.find_top_documents_by_status_policy(ExecutionPolicy::Sequential, raw_query, status)
    }

    /// The predicate must be `Sync` even here: both execution strategies
    /// share one predicate type, so a closure over a `Cell` is rejected.
    pub fn find_top_documents_with<P>(&self, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        self.find_top_documents_with_policy(ExecutionPolicy::Sequential, raw_query, predicate)
    }

    pub fn find_top_documents_policy(&self, policy: ExecutionPolicy, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_by_status_policy(policy, raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_by_status_policy(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_with_policy(policy, raw_query, move |_, doc_status, _| doc_status == status)
    }

    pub fn find_top_documents_with_policy<P>(&self, policy: ExecutionPolicy, raw_query: &str, predicate: P) -> Result<Vec<Document>>
    where
        P: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
    {
        let query = self.parse_query(policy, raw_query)?;
        let results = self.engine.find_top(&self.index, &query, policy, &predicate);
        debug!(query = raw_query, ?policy, results = results.len(), "query evaluated");
        Ok(results)
    }

    /// Plus words of the query found in document `id`, sorted, plus the
    /// document's status. Any matching minus word empties the list.
    pub fn match_document<'q>(&self, raw_query: &'q str, id: DocId) -> Result<(Vec<&'q str>, DocumentStatus)> {
        self.match_document_policy(ExecutionPolicy::Sequential, raw_query, id)
    }

    pub fn match_document_policy<'q>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &'q str,
        id: DocId,
    ) -> Result<(Vec<&'q str>, DocumentStatus)> {
        let query = self.parse_query(policy, raw_query)?;
        let status = self.index.document(id).ok_or(SearchError::OutOfRange(id))?.status;
        let has_word = |word: &&str| self.index.document_has_word(id, word);

        let matched = match policy {
            ExecutionPolicy::Sequential => {
                if query.minus_words.iter().any(has_word) {
                    Vec::new()
                } else {
                    query.plus_words.iter().copied().filter(has_word).collect()
                }
            }
            ExecutionPolicy::Parallel => self.engine.pool().install(|| {
                if query.minus_words.par_iter().any(has_word) {
                    return Vec::new();
                }
                let mut words: Vec<&str> = query.plus_words.par_iter().copied().filter(has_word).collect();
                words.par_sort_unstable();
                words.dedup();
                words
            }),
        };
        Ok((matched, status))
    }

    /// Empty for unknown ids.
    pub fn word_frequencies(&self, id: DocId) -> BTreeMap<&str, f64> { self.index.word_frequencies(id) }

    pub fn document_count(&self) -> usize { self.index.document_count() }

    /// Stored ids in ascending order.
    pub fn document_ids(&self) -> DocumentIds<'_> { self.index.document_ids() }

    pub fn stop_words(&self) -> &StopWords { &self.stop_words }

    fn parse_query<'q>(&self, policy: ExecutionPolicy, raw_query: &'q str) -> Result<Query<'q>> {
        let parser = QueryParser::new(&self.stop_words);
        match policy {
            ExecutionPolicy::Sequential => parser.parse(raw_query),
            ExecutionPolicy::Parallel => parser.parse_unsorted(raw_query),
        }
    }
}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocId;
    type IntoIter = DocumentIds<'a>;

    fn into_iter(self) -> Self::IntoIter { self.document_ids() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_words_are_not_indexed() {
        let mut server = SearchServer::new("").unwrap();
        server.add_document(42, "cat in the city", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
        let found = server.find_top_documents("in").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 42);

        let mut server = SearchServer::new("in the").unwrap();
        server.add_document(42, "cat in the city", DocumentStatus::Actual, &[1, 2, 3]).unwrap();
        assert!(server.find_top_documents("in").unwrap().is_empty());
    }

    #[test]
    fn failed_add_leaves_index_untouched() {
        let mut server = SearchServer::new("").unwrap();
        let err = server.add_document(1, "большой пёс скво\x12рец", DocumentStatus::Actual, &[1]);
        assert!(matches!(err, Err(SearchError::InvalidArgument(_))));
        assert_eq!(server.document_count(), 0);
        assert!(server.find_top_documents("большой").unwrap().is_empty());
        assert!(server.word_frequencies(1).is_empty());
    }

    #[test]
    fn bad_stop_words_are_rejected() {
        assert!(matches!(SearchServer::new("и в\x03"), Err(SearchError::InvalidArgument(_))));
    }

    #[test]
    fn match_unknown_document_is_out_of_range() {
        let server = SearchServer::new("").unwrap();
        assert!(matches!(server.match_document("cat", 3), Err(SearchError::OutOfRange(3))));
    }

    #[test]
    fn match_validates_query_before_id() {
        let server = SearchServer::new("").unwrap();
        for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::Parallel] {
            assert!(matches!(server.match_document_policy(policy, "cat --dog", 3), Err(SearchError::InvalidArgument(_))));
            assert!(matches!(server.match_document_policy(policy, "cat -dog", 3), Err(SearchError::OutOfRange(3))));
        }
    }

    #[test]
    fn parallel_match_dedups_words() {
        let mut server = SearchServer::new("").unwrap();
        server.add_document(1, "white cat walking around", DocumentStatus::Irrelevant, &[]).unwrap();
        let (words, status) = server.match_document_policy(ExecutionPolicy::Parallel, "walking cat cat dog", 1).unwrap();
        assert_eq!(words, vec!["cat", "walking"]);
        assert_eq!(status, DocumentStatus::Irrelevant);
    }

    #[test]
    fn iteration_follows_id_order() {
        let mut server = SearchServer::new("").unwrap();
        for id in [9, 2, 5] {
            server.add_document(id, "x", DocumentStatus::Actual, &[]).unwrap();
        }
        let ids: Vec<DocId> = (&server).into_iter().collect();
        assert_eq!(ids, vec![2, 5, 9]);
    }
}
