use thiserror::Error;

pub type Result<T> = std::result::Result<T, EkiError>;

#[derive(Debug, Error)]
pub enum EkiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed index line {line}: {message}")]
    MalformedIndexLine { line: u64, message: String },

    #[error("decompression failed for block at offset {offset}: {message}")]
    Decompress { offset: u64, message: String },

    #[error("document decode failed{}: {message}", block_label(.offset))]
    Decode {
        offset: Option<u64>,
        message: String,
    },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

fn block_label(offset: &Option<u64>) -> String {
    offset
        .map(|value| format!(" for block at offset {value}"))
        .unwrap_or_default()
}

impl EkiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::MalformedIndexLine { .. } => "MALFORMED_INDEX_LINE",
            Self::Decompress { .. } => "DECOMPRESS_FAILED",
            Self::Decode { .. } => "DECODE_FAILED",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Regex(_) => "REGEX_ERROR",
            Self::Csv(_) => "CSV_ERROR",
        }
    }

    pub(crate) fn malformed(line: u64, message: impl Into<String>) -> Self {
        Self::MalformedIndexLine {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            offset: None,
            message: message.into(),
        }
    }

    /// Attaches the archive offset of the block being decoded.
    pub(crate) fn at_block(self, block_offset: u64) -> Self {
        match self {
            Self::Decode { message, .. } => Self::Decode {
                offset: Some(block_offset),
                message,
            },
            other => other,
        }
    }
}
