use std::collections::HashMap;
use std::sync::Arc;

/// Handle to a word owned by a [`WordInterner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordId(u32);

impl WordId {
    pub(crate) fn index(self) -> usize { self.0 as usize }
}

/// Owns each distinct indexed word exactly once. Index structures hold
/// `WordId`s and resolve them here only when words are reported back.
/// Released ids go on a free list and are handed out again by `intern`.
#[derive(Debug, Default)]
pub struct WordInterner {
    ids: HashMap<Arc<str>, WordId>,
    words: Vec<Option<Arc<str>>>,
    free: Vec<WordId>,
}

impl WordInterner {
    pub fn new() -> Self { Self::default() }

    pub fn intern(&mut self, word: &str) -> WordId {
        if let Some(&id) = self.ids.get(word) {
            return id;
        }
        let owned: Arc<str> = Arc::from(word);
        let id = match self.free.pop() {
            Some(id) => {
                self.words[id.index()] = Some(Arc::clone(&owned));
                id
            }
            None => {
                self.words.push(Some(Arc::clone(&owned)));
                WordId((self.words.len() - 1) as u32)
            }
        };
        self.ids.insert(owned, id);
        id
    }

    /// Drop the word behind `id`; the id may be returned by a later `intern`.
    pub fn release(&mut self, id: WordId) {
        let Some(word) = self.words.get_mut(id.index()).and_then(Option::take) else { return };
        self.ids.remove(&*word);
        self.free.push(id);
    }

    pub fn get(&self, word: &str) -> Option<WordId> { self.ids.get(word).copied() }

    /// Empty string for released ids.
    pub fn resolve(&self, id: WordId) -> &str { self.words.get(id.index()).and_then(Option::as_deref).unwrap_or("") }

    /// Live words.
    pub fn len(&self) -> usize { self.ids.len() }

    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    /// Slots allocated so far, live or free.
    pub fn capacity(&self) -> usize { self.words.len() }
}
