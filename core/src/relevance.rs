//! TF-IDF scoring and ranking.
//!
//! Both execution strategies implement [`Scorer`]. The sequential scorer sums
//! in a fixed order and is fully deterministic; the parallel scorer fans the
//! plus-word and minus-word passes out on a rayon pool and accumulates into a
//! [`ConcurrentScoreMap`], so relevances may differ from the sequential ones
//! in the last bits.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::concurrent_map::ConcurrentScoreMap;
use crate::config::SearchConfig;
use crate::document::{Document, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::index::IndexStore;
use crate::query::Query;
use crate::DocId;

/// Filter applied to every candidate: `(id, status, rating) -> keep`.
pub type DocumentPredicate<'p> = &'p (dyn Fn(DocId, DocumentStatus, i32) -> bool + Sync);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}

/// `ln(N / df)`. Only meaningful for words present in the index.
pub fn inverse_document_frequency(document_count: usize, containing: usize) -> f64 {
    (document_count as f64 / containing as f64).ln()
}

pub trait Scorer {
    /// Unranked relevance of every document matching the query and predicate.
    fn score(&self, store: &IndexStore, query: &Query<'_>, predicate: DocumentPredicate<'_>) -> Vec<Document>;
}

pub struct SequentialScorer;

impl Scorer for SequentialScorer {
    fn score(&self, store: &IndexStore, query: &Query<'_>, predicate: DocumentPredicate<'_>) -> Vec<Document> {
        let mut scores: BTreeMap<DocId, f64> = BTreeMap::new();
        for word in &query.plus_words {
            let Some(postings) = store.postings(word) else { continue };
            let idf = inverse_document_frequency(store.document_count(), postings.len());
            for (&id, &tf) in postings {
                let Some(data) = store.document(id) else { continue };
                if predicate(id, data.status, data.rating) {
                    *scores.entry(id).or_insert(0.0) += tf * idf;
                }
            }
        }
        for word in &query.minus_words {
            let Some(postings) = store.postings(word) else { continue };
            for id in postings.keys() {
                scores.remove(id);
            }
        }
        collect_documents(store, scores)
    }
}

pub struct ParallelScorer<'a> {
    pool: &'a ThreadPool,
    shard_count: usize,
}

impl<'a> ParallelScorer<'a> {
    pub fn new(pool: &'a ThreadPool, shard_count: usize) -> Self { Self { pool, shard_count } }
}

impl Scorer for ParallelScorer<'_> {
    fn score(&self, store: &IndexStore, query: &Query<'_>, predicate: DocumentPredicate<'_>) -> Vec<Document> {
        self.pool.install(|| {
            // Repeated plus words would be counted twice.
            let mut plus_words = query.plus_words.clone();
            plus_words.par_sort_unstable();
            plus_words.dedup();

            let scores: ConcurrentScoreMap<DocId, f64> = ConcurrentScoreMap::new(self.shard_count);
            plus_words.par_iter().for_each(|word| {
                let Some(postings) = store.postings(word) else { return };
                let idf = inverse_document_frequency(store.document_count(), postings.len());
                for (&id, &tf) in postings {
                    let Some(data) = store.document(id) else { continue };
                    if predicate(id, data.status, data.rating) {
                        *scores.access(id) += tf * idf;
                    }
                }
            });
            query.minus_words.par_iter().for_each(|word| {
                let Some(postings) = store.postings(word) else { return };
                for id in postings.keys() {
                    scores.erase(*id);
                }
            });
            collect_documents(store, scores.into_map())
        })
    }
}

fn collect_documents(store: &IndexStore, scores: BTreeMap<DocId, f64>) -> Vec<Document> {
    scores
        .into_iter()
        .filter_map(|(id, relevance)| store.document(id).map(|data| Document::new(id, relevance, data.rating)))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranking {
    pub max_results: usize,
    pub epsilon: f64,
}

impl Ranking {
    /// Sort by relevance descending. Documents whose relevance is within
    /// `epsilon` of the head of their group are ordered by rating descending,
    /// then by id. Keeps at most `max_results`.
    pub fn rank(&self, mut docs: Vec<Document>) -> Vec<Document> {
        docs.sort_by(|a, b| b.relevance.total_cmp(&a.relevance).then(a.id.cmp(&b.id)));
        let mut start = 0;
        while start < docs.len() {
            let head = docs[start].relevance;
            let end = docs[start + 1..]
                .iter()
                .position(|d| (head - d.relevance).abs() >= self.epsilon)
                .map_or(docs.len(), |n| start + 1 + n);
            docs[start..end].sort_by(by_rating_desc);
            start = end;
        }
        docs.truncate(self.max_results);
        docs
    }
}

// Inside a group relevances differ only by summation noise, which varies
// between strategies.
fn by_rating_desc(a: &Document, b: &Document) -> Ordering { b.rating.cmp(&a.rating).then(a.id.cmp(&b.id)) }

/// Scoring half of the engine: owns the worker pool and ranking limits.
pub struct RelevanceEngine {
    ranking: Ranking,
    pool: ThreadPool,
    shard_count: usize,
}

impl RelevanceEngine {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads())
            .thread_name(|i| format!("search-worker-{i}"))
            .build()
            .map_err(|e| SearchError::ThreadPool(format!("failed to build scoring pool: {e}")))?;
        Ok(Self {
            ranking: Ranking { max_results: config.max_results, epsilon: config.relevance_epsilon },
            pool,
            shard_count: config.shard_count(),
        })
    }

    pub fn pool(&self) -> &ThreadPool { &self.pool }

    pub fn ranking(&self) -> Ranking { self.ranking }

    pub fn find_top(
        &self,
        store: &IndexStore,
        query: &Query<'_>,
        policy: ExecutionPolicy,
        predicate: DocumentPredicate<'_>,
    ) -> Vec<Document> {
        let scored = match policy {
            ExecutionPolicy::Sequential => SequentialScorer.score(store, query, predicate),
            ExecutionPolicy::Parallel => ParallelScorer::new(&self.pool, self.shard_count).score(store, query, predicate),
        };
        self.ranking.rank(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId, relevance: f64, rating: i32) -> Document { Document::new(id, relevance, rating) }

    fn ids(docs: &[Document]) -> Vec<DocId> { docs.iter().map(|d| d.id).collect() }

    #[test]
    fn idf_is_natural_log_ratio() {
        assert!((inverse_document_frequency(4, 1) - 4f64.ln()).abs() < 1e-12);
        assert_eq!(inverse_document_frequency(3, 3), 0.0);
    }

    #[test]
    fn rank_breaks_near_ties_by_rating() {
        let ranking = Ranking { max_results: 5, epsilon: 1e-6 };
        let ranked = ranking.rank(vec![doc(0, 0.5, 1), doc(1, 0.5 + 1e-8, -3), doc(2, 0.9, 0), doc(3, 0.5, 7)]);
        assert_eq!(ids(&ranked), vec![2, 3, 0, 1]);
    }

    #[test]
    fn near_ties_with_equal_rating_order_by_id() {
        let ranking = Ranking { max_results: 5, epsilon: 1e-6 };
        let ranked = ranking.rank(vec![doc(4, 0.3, 2), doc(9, 0.3 + 1e-12, 2), doc(1, 0.3 - 1e-12, 2)]);
        assert_eq!(ids(&ranked), vec![1, 4, 9]);
    }

    #[test]
    fn rank_truncates() {
        let ranking = Ranking { max_results: 5, epsilon: 1e-6 };
        let docs = (0..8).map(|i| doc(i, i as f64, 0)).collect();
        assert_eq!(ids(&ranking.rank(docs)), vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn scorers_agree() {
        let mut store = IndexStore::new();
        store.add_document(0, &["белый", "кот", "модный", "ошейник"], 2, DocumentStatus::Actual).unwrap();
        store.add_document(1, &["пушистый", "кот", "пушистый", "хвост"], 5, DocumentStatus::Actual).unwrap();
        store.add_document(2, &["ухоженный", "пёс", "выразительные", "глаза"], -1, DocumentStatus::Actual).unwrap();
        let query = Query { plus_words: vec!["пушистый", "ухоженный", "кот", "кот"], minus_words: vec!["ошейник"] };
        let mut sorted = query.clone();
        sorted.normalize();
        let accept = |_: DocId, _: DocumentStatus, _: i32| true;

        let pool = ThreadPoolBuilder::new().num_threads(2).build().unwrap();
        let seq = SequentialScorer.score(&store, &sorted, &accept);
        let par = ParallelScorer::new(&pool, 3).score(&store, &query, &accept);
        assert_eq!(ids(&seq), vec![1, 2]);
        assert_eq!(ids(&seq), ids(&par));
        for (a, b) in seq.iter().zip(&par) {
            assert!((a.relevance - b.relevance).abs() < 1e-12);
        }
    }
}
