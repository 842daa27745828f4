// Public fallible APIs in this crate share one concrete error contract (`EkiError`).
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type"
)]

pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod index;
pub mod matcher;
pub mod pipeline;
pub mod selection;
pub(crate) mod source;
pub mod stations;
pub mod tsv;

pub use config::ExtractConfig;
pub use document::{Document, decode_documents};
pub use error::{EkiError, Result};
pub use fetch::{ArchiveReader, fetch_documents};
pub use index::{BlockSpan, IndexDirectory, IndexEntry, IndexSummary, build_index};
pub use matcher::match_records;
pub use pipeline::Extraction;
pub use selection::TitleSelector;
pub use source::open_index_stream;
pub use stations::{Station, StationExtractor, uniquify};
pub use tsv::write_tsv;
