use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::selection::TitleSelector;
use crate::source::open_index_stream;

mod builder;

pub use builder::{IndexBuilder, build_index};


/// Compressed length of an archive block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSpan {
    Bounded(u64),
    /// No later offset was seen; the block runs to the end of the archive.
    /// It is read as a single bzip2 stream, leaving the dump footer unread.
    ToEnd,
}

impl BlockSpan {
    #[must_use]
    pub const fn length(self) -> Option<u64> {
        match self {
            Self::Bounded(length) => Some(length),
            Self::ToEnd => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: u64,
    pub title: Arc<str>,
    pub block_offset: u64,
}

/// Read-only directory from selected index entries to the archive blocks holding them.
///
/// Every block key in `entries_by_block` has a matching `block_spans` key once
/// the builder finishes. Lookup maps point into `entries` instead of copying.
#[derive(Debug, Default)]
pub struct IndexDirectory {
    entries: Vec<IndexEntry>,
    entries_by_block: BTreeMap<u64, Vec<usize>>,
    block_spans: HashMap<u64, BlockSpan>,
    entry_by_id: HashMap<u64, usize>,
    entry_by_title: HashMap<Arc<str>, usize>,
}

/// One archive block to fetch, with the entries expected inside it.
#[derive(Debug, Clone)]
pub struct IndexedBlock<'a> {
    pub offset: u64,
    pub span: BlockSpan,
    pub entries: Vec<&'a IndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSummary {
    pub entry_count: usize,
    pub block_count: usize,
    pub blocks: Vec<BlockSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub offset: u64,
    /// `None` when the block extends to the end of the archive.
    pub length: Option<u64>,
    pub entries: Vec<EntrySummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub id: u64,
    pub title: String,
}

impl IndexDirectory {
    /// Scans the index file at `path`, keeping titles accepted by `selector`.
    pub fn load(path: &Path, selector: &TitleSelector) -> Result<Self> {
        let reader = open_index_stream(path)?;
        build_index(reader, |title| selector.matches(title))
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.entries_by_block.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn block_offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries_by_block.keys().copied()
    }

    #[must_use]
    pub fn block_span(&self, offset: u64) -> Option<BlockSpan> {
        self.block_spans.get(&offset).copied()
    }

    /// Entries of one block, in index-stream order.
    pub fn entries_in_block(&self, offset: u64) -> impl Iterator<Item = &IndexEntry> + '_ {
        self.entries_by_block
            .get(&offset)
            .into_iter()
            .flatten()
            .map(|position| &self.entries[*position])
    }

    #[must_use]
    pub fn entry_by_id(&self, id: u64) -> Option<&IndexEntry> {
        self.entry_by_id
            .get(&id)
            .map(|position| &self.entries[*position])
    }

    #[must_use]
    pub fn entry_by_title(&self, title: &str) -> Option<&IndexEntry> {
        self.entry_by_title
            .get(title)
            .map(|position| &self.entries[*position])
    }

    /// The set of blocks to fetch. Callers must not rely on the iteration order.
    pub fn blocks(&self) -> impl Iterator<Item = IndexedBlock<'_>> + '_ {
        self.entries_by_block
            .iter()
            .map(|(offset, positions)| {
                let span = self.block_spans.get(offset).copied();
                debug_assert!(span.is_some(), "block {offset} has entries but no span");
                IndexedBlock {
                    offset: *offset,
                    span: span.unwrap_or(BlockSpan::ToEnd),
                    entries: positions
                        .iter()
                        .map(|position| &self.entries[*position])
                        .collect(),
                }
            })
    }

    #[must_use]
    pub fn summary(&self) -> IndexSummary {
        IndexSummary {
            entry_count: self.entry_count(),
            block_count: self.block_count(),
            blocks: self
                .blocks()
                .map(|block| BlockSummary {
                    offset: block.offset,
                    length: block.span.length(),
                    entries: block
                        .entries
                        .iter()
                        .map(|entry| EntrySummary {
                            id: entry.id,
                            title: entry.title.to_string(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn push_entry(&mut self, entry: IndexEntry) {
        let position = self.entries.len();
        self.entries_by_block
            .entry(entry.block_offset)
            .or_default()
            .push(position);
        self.entry_by_id.insert(entry.id, position);
        self.entry_by_title.insert(entry.title.clone(), position);
        self.entries.push(entry);
    }

    fn set_span(&mut self, offset: u64, span: BlockSpan) {
        self.block_spans.insert(offset, span);
    }

    fn has_span_for_every_block(&self) -> bool {
        self.entries_by_block
            .keys()
            .all(|offset| self.block_spans.contains_key(offset))
    }
}
