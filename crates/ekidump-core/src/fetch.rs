use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use bzip2::bufread::{BzDecoder, MultiBzDecoder};
use rayon::prelude::*;
use tracing::debug;

use crate::document::{Document, decode_documents};
use crate::error::{EkiError, Result};
use crate::index::{BlockSpan, IndexDirectory, IndexedBlock};
use crate::matcher::match_records;

/// Handle on the multistream archive. Every block read opens its own file
/// descriptor, so reads from different workers never share a cursor.
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    path: PathBuf,
    len: u64,
}

impl ArchiveReader {
    pub fn open(path: &Path) -> Result<Self> {
        let file = crate::source::open_input(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            path: path.to_path_buf(),
            len,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Decompresses the block starting at `offset` into memory.
    ///
    /// A bounded block must decode completely within its byte range. A `ToEnd`
    /// block is decoded as one bzip2 stream so that later streams (the dump
    /// footer) are left untouched.
    pub fn read_block(&self, offset: u64, span: BlockSpan) -> Result<Vec<u8>> {
        let decompress_error = |message: String| EkiError::Decompress { offset, message };
        if offset >= self.len {
            return Err(decompress_error(format!(
                "offset is past the end of the archive ({} bytes)",
                self.len
            )));
        }

        let mut file = crate::source::open_input(&self.path)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut raw = Vec::new();
        let decoded = match span {
            BlockSpan::Bounded(length) => {
                MultiBzDecoder::new(BufReader::new(file.take(length))).read_to_end(&mut raw)
            }
            BlockSpan::ToEnd => BzDecoder::new(BufReader::new(file)).read_to_end(&mut raw),
        };
        decoded.map_err(|err| decompress_error(err.to_string()))?;
        if raw.is_empty() {
            return Err(decompress_error("block decompressed to zero bytes".to_string()));
        }
        Ok(raw)
    }

    /// Decompresses, decodes and matches one indexed block.
    pub fn fetch_block(&self, block: &IndexedBlock<'_>) -> Result<Vec<Document>> {
        let raw = self.read_block(block.offset, block.span)?;
        let documents = decode_documents(&raw).map_err(|err| err.at_block(block.offset))?;
        let decoded = documents.len();
        let matched = match_records(documents, &block.entries);
        debug!(
            offset = block.offset,
            length = ?block.span.length(),
            raw_bytes = raw.len(),
            decoded,
            matched = matched.len(),
            "fetched block"
        );
        Ok(matched)
    }
}

/// Fetches every block of `directory` and returns the matched documents.
///
/// Blocks are independent and run on the rayon pool; the first failing block
/// fails the whole call. Output order across blocks is unspecified.
pub fn fetch_documents(
    archive: &ArchiveReader,
    directory: &IndexDirectory,
    workers: Option<usize>,
) -> Result<Vec<Document>> {
    let blocks = directory.blocks().collect::<Vec<_>>();
    if blocks.is_empty() {
        return Ok(Vec::new());
    }

    let per_block = match workers {
        Some(1) => blocks
            .iter()
            .map(|block| archive.fetch_block(block))
            .collect::<Result<Vec<_>>>()?,
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|err| EkiError::Validation(format!("cannot start block workers: {err}")))?
            .install(|| fetch_parallel(archive, &blocks))?,
        None => fetch_parallel(archive, &blocks)?,
    };
    Ok(per_block.into_iter().flatten().collect())
}

fn fetch_parallel(
    archive: &ArchiveReader,
    blocks: &[IndexedBlock<'_>],
) -> Result<Vec<Vec<Document>>> {
    blocks
        .par_iter()
        .map(|block| archive.fetch_block(block))
        .collect()
}
