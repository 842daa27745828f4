use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use bzip2::bufread::MultiBzDecoder;

use crate::error::{EkiError, Result};

const BZIP2_MAGIC: &[u8] = b"BZh";

pub(crate) fn open_input(path: &Path) -> Result<File> {
    File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => EkiError::NotFound(path.display().to_string()),
        _ => EkiError::Io(err),
    })
}

/// Opens the index as a line reader, decoding bzip2 when the file carries its magic.
///
/// Dump indexes ship as a concatenation of bzip2 streams, so every stream
/// is decoded rather than only the first one.
pub fn open_index_stream(path: &Path) -> Result<Box<dyn BufRead + Send>> {
    let mut reader = BufReader::new(open_input(path)?);
    let compressed = reader.fill_buf()?.starts_with(BZIP2_MAGIC);
    if compressed {
        return Ok(Box::new(BufReader::new(MultiBzDecoder::new(reader))));
    }
    Ok(Box::new(reader))
}
