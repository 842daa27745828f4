use std::io::BufRead;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{EkiError, Result};

use super::{BlockSpan, IndexDirectory, IndexEntry};

const FIELD_DELIMITER: u8 = b':';

/// Single-pass scanner turning `offset:id:title` lines into an [`IndexDirectory`].
///
/// Block lengths are not stored in the index; a block's length is known once
/// a strictly greater offset shows up. Until then the open block is `ToEnd`.
pub struct IndexBuilder<F> {
    select: F,
    directory: IndexDirectory,
    open_offset: Option<u64>,
    previous_offset: Option<u64>,
    line_no: u64,
}

impl<F> IndexBuilder<F>
where
    F: Fn(&[u8]) -> bool,
{
    pub fn new(select: F) -> Self {
        Self {
            select,
            directory: IndexDirectory::default(),
            open_offset: None,
            previous_offset: None,
            line_no: 0,
        }
    }

    pub fn push_line(&mut self, raw: &[u8]) -> Result<()> {
        self.line_no += 1;
        let line = trim_line_ending(raw);
        if line.is_empty() {
            return Ok(());
        }

        let mut fields = line.splitn(3, |byte| *byte == FIELD_DELIMITER);
        let (Some(offset_field), Some(id_field), Some(title)) =
            (fields.next(), fields.next(), fields.next())
        else {
            return Err(EkiError::malformed(
                self.line_no,
                "expected three `:`-separated fields (offset:id:title)",
            ));
        };

        let offset = parse_number(offset_field).ok_or_else(|| {
            EkiError::malformed(
                self.line_no,
                format!("non-numeric offset {:?}", String::from_utf8_lossy(offset_field)),
            )
        })?;
        if let Some(previous) = self.previous_offset {
            if offset < previous {
                return Err(EkiError::malformed(
                    self.line_no,
                    format!("offset {offset} is smaller than preceding offset {previous}"),
                ));
            }
        }
        self.previous_offset = Some(offset);

        if let Some(open) = self.open_offset {
            if offset > open {
                debug!(offset = open, length = offset - open, "closed index block");
                self.directory
                    .set_span(open, BlockSpan::Bounded(offset - open));
                self.open_offset = None;
            }
        }

        if !(self.select)(title) {
            return Ok(());
        }

        let id = parse_number(id_field).ok_or_else(|| {
            EkiError::malformed(
                self.line_no,
                format!("non-numeric id {:?}", String::from_utf8_lossy(id_field)),
            )
        })?;
        let title = std::str::from_utf8(title).map_err(|err| {
            EkiError::malformed(self.line_no, format!("title is not valid UTF-8: {err}"))
        })?;
        if self.directory.entry_by_id(id).is_some() {
            return Err(EkiError::malformed(
                self.line_no,
                format!("duplicate id {id}"),
            ));
        }
        if self.directory.entry_by_title(title).is_some() {
            return Err(EkiError::malformed(
                self.line_no,
                format!("duplicate title {title:?}"),
            ));
        }

        self.directory.push_entry(IndexEntry {
            id,
            title: Arc::from(title),
            block_offset: offset,
        });
        if self.open_offset != Some(offset) {
            self.directory.set_span(offset, BlockSpan::ToEnd);
            self.open_offset = Some(offset);
        }
        Ok(())
    }

    #[must_use]
    pub fn finish(self) -> IndexDirectory {
        debug_assert!(
            self.directory.has_span_for_every_block(),
            "every indexed block must carry a span"
        );
        info!(
            lines = self.line_no,
            entries = self.directory.entry_count(),
            blocks = self.directory.block_count(),
            "index directory built"
        );
        self.directory
    }
}

/// Reads the whole index stream. Any malformed line aborts the build.
pub fn build_index<R, F>(mut reader: R, select: F) -> Result<IndexDirectory>
where
    R: BufRead,
    F: Fn(&[u8]) -> bool,
{
    let mut builder = IndexBuilder::new(select);
    let mut line = Vec::with_capacity(256);
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        builder.push_line(&line)?;
    }
    Ok(builder.finish())
}

fn trim_line_ending(raw: &[u8]) -> &[u8] {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    raw.strip_suffix(b"\r").unwrap_or(raw)
}

fn parse_number(field: &[u8]) -> Option<u64> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}
