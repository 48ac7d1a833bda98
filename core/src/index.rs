use rayon::prelude::*;
use std::collections::{btree_map, BTreeMap};

use crate::document::{DocumentData, DocumentStatus};
use crate::error::{Result, SearchError};
use crate::interner::{WordId, WordInterner};
use crate::DocId;

/// doc -> term frequency, ascending by doc id.
pub type PostingList = BTreeMap<DocId, f64>;

pub type DocumentIds<'a> = std::iter::Copied<btree_map::Keys<'a, DocId, DocumentData>>;

/// In-memory inverted index with a reverse map for O(document length) removal.
///
/// Posting lists are addressed by `WordId`, so the forward index is a dense
/// vector. When a word's last posting goes, the word is released from the
/// interner and its slot is reused by the next new word.
#[derive(Debug, Default)]
pub struct IndexStore {
    interner: WordInterner,
    postings: Vec<PostingList>,
    doc_words: BTreeMap<DocId, BTreeMap<WordId, f64>>,
    docs: BTreeMap<DocId, DocumentData>,
}

impl IndexStore {
    pub fn new() -> Self { Self::default() }

    /// Index an already validated and stop-word filtered token list. The id is
    /// checked before anything is written.
    pub fn add_document(&mut self, id: DocId, words: &[&str], rating: i32, status: DocumentStatus) -> Result<()> {
        if id < 0 {
            return Err(SearchError::invalid_argument(format!("document id {id} is negative")));
        }
        if self.docs.contains_key(&id) {
            return Err(SearchError::invalid_argument(format!("document id {id} already exists")));
        }

        let inv_word_count = 1.0 / words.len() as f64;
        let mut freqs: BTreeMap<WordId, f64> = BTreeMap::new();
        for word in words {
            let wid = self.interner.intern(word);
            *freqs.entry(wid).or_insert(0.0) += inv_word_count;
        }
        for (&wid, &tf) in &freqs {
            let slot = wid.index();
            if self.postings.len() <= slot { self.postings.resize_with(slot + 1, PostingList::new); }
            self.postings[slot].insert(id, tf);
        }
        self.doc_words.insert(id, freqs);
        self.docs.insert(id, DocumentData { rating, status });
        Ok(())
    }

    /// Returns false when the id was not indexed.
    pub fn remove_document(&mut self, id: DocId) -> bool {
        let Some(words) = self.doc_words.remove(&id) else { return false };
        for &wid in words.keys() {
            if let Some(list) = self.postings.get_mut(wid.index()) {
                list.remove(&id);
                if list.is_empty() { self.interner.release(wid); }
            }
        }
        self.docs.remove(&id);
        true
    }

    /// Same as [`remove_document`](Self::remove_document), but erases the
    /// document's postings with a rayon parallel-for over its words.
    pub fn remove_document_parallel(&mut self, id: DocId) -> bool {
        let Some(words) = self.doc_words.remove(&id) else { return false };
        let lists = select_disjoint_mut(&mut self.postings, words.keys().map(|w| w.index()));
        let emptied: Vec<WordId> = words
            .keys()
            .copied()
            .zip(lists)
            .collect::<Vec<_>>()
            .into_par_iter()
            .filter_map(|(wid, list)| {
                list.remove(&id);
                list.is_empty().then_some(wid)
            })
            .collect();
        for wid in emptied {
            self.interner.release(wid);
        }
        self.docs.remove(&id);
        true
    }

    /// Posting list for `word`, or `None` if no document contains it.
    pub fn postings(&self, word: &str) -> Option<&PostingList> {
        let wid = self.interner.get(word)?;
        self.postings.get(wid.index()).filter(|list| !list.is_empty())
    }

    /// Whether document `id` contains `word`, answered from the reverse map.
    pub fn document_has_word(&self, id: DocId, word: &str) -> bool {
        match (self.interner.get(word), self.doc_words.get(&id)) {
            (Some(wid), Some(words)) => words.contains_key(&wid),
            _ => false,
        }
    }

    /// Word frequencies of a document, ordered by word. Empty for unknown ids.
    pub fn word_frequencies(&self, id: DocId) -> BTreeMap<&str, f64> {
        self.doc_words
            .get(&id)
            .map(|words| words.iter().map(|(&wid, &tf)| (self.interner.resolve(wid), tf)).collect())
            .unwrap_or_default()
    }

    pub fn document(&self, id: DocId) -> Option<&DocumentData> { self.docs.get(&id) }

    pub fn document_count(&self) -> usize { self.docs.len() }

    /// Stored ids in ascending order.
    pub fn document_ids(&self) -> DocumentIds<'_> { self.docs.keys().copied() }

    /// Number of distinct words currently present in at least one document.
    pub fn vocabulary_size(&self) -> usize { self.postings.iter().filter(|l| !l.is_empty()).count() }
}

/// Borrow the elements at strictly ascending `indices` as disjoint `&mut`s.
/// Out-of-range indices end the selection.
fn select_disjoint_mut<T>(mut slice: &mut [T], indices: impl Iterator<Item = usize>) -> Vec<&mut T> {
    let mut out = Vec::new();
    let mut offset = 0;
    for idx in indices {
        let rest = std::mem::take(&mut slice);
        let Some(skip) = idx.checked_sub(offset) else { break };
        if skip >= rest.len() { break; }
        let (_, tail) = rest.split_at_mut(skip);
        let Some((item, tail)) = tail.split_first_mut() else { break };
        out.push(item);
        slice = tail;
        offset = idx + 1;
    }
    out
}
