use std::collections::{BTreeSet, HashSet};
use tracing::info;

use crate::server::SearchServer;
use crate::DocId;

/// Remove documents whose set of indexed words equals that of a document with
/// a smaller id. Returns the removed ids in ascending order.
pub fn remove_duplicates(server: &mut SearchServer) -> Vec<DocId> {
    let mut seen: HashSet<BTreeSet<String>> = HashSet::new();
    let mut duplicates = Vec::new();
    for id in server.document_ids() {
        let words: BTreeSet<String> = server.word_frequencies(id).into_keys().map(str::to_owned).collect();
        if !seen.insert(words) {
            duplicates.push(id);
        }
    }
    for &id in &duplicates {
        info!(doc_id = id, "found duplicate document");
        server.remove_document(id);
    }
    duplicates
}
