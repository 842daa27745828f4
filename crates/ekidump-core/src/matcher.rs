use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::warn;

use crate::document::Document;
use crate::index::IndexEntry;

/// Picks, in entry order, the decoded document for each entry expected in a block.
///
/// An entry whose id is absent from the block yields nothing. When a block
/// repeats an id, its first occurrence is kept.
#[must_use]
pub fn match_records(documents: Vec<Document>, entries: &[&IndexEntry]) -> Vec<Document> {
    let mut by_id: HashMap<u64, Document> = HashMap::with_capacity(documents.len());
    for document in documents {
        if let Entry::Vacant(slot) = by_id.entry(document.id) {
            slot.insert(document);
        }
    }

    let mut matched = Vec::with_capacity(entries.len());
    for entry in entries {
        match by_id.remove(&entry.id) {
            Some(document) => matched.push(document),
            None => warn!(
                id = entry.id,
                title = %entry.title,
                block_offset = entry.block_offset,
                "indexed page missing from its block"
            ),
        }
    }
    matched
}
