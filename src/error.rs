//! Error types for the hwp2md library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hwp2md operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Protection schemes that prevent a document from being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protection {
    /// Password encryption
    Encrypted,
    /// DRM protection
    Drm,
    /// Distribution document (body stored only in encrypted `ViewText`)
    Distribution,
}

impl std::fmt::Display for Protection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protection::Encrypted => write!(f, "encrypted"),
            Protection::Drm => write!(f, "DRM-protected"),
            Protection::Distribution => write!(f, "distribution-restricted"),
        }
    }
}

/// Main error type for the hwp2md library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input path does not exist or is not a regular file.
    #[error("File not found: {}", .0.display())]
    NotAFile(PathBuf),

    /// The input is not a compound-file container.
    #[error("Not an OLE compound file: {0}")]
    NotAContainer(String),

    /// A named stream is missing from the container.
    #[error("Stream not found: {0}")]
    StreamNotFound(String),

    /// The FileHeader stream is shorter than 256 bytes.
    #[error("FileHeader too small: {len} bytes, expected 256")]
    FileHeaderTooSmall { len: usize },

    /// The FileHeader signature does not match.
    #[error("Invalid HWP signature: {0:?}")]
    InvalidSignature(String),

    /// The document uses a protection scheme that is not supported.
    #[error("Unsupported protection: document is {0}")]
    UnsupportedProtection(Protection),

    /// The file format is not recognized.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not handled by this crate.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Both zlib and raw deflate decoding failed.
    #[error("Decompression error: {0}")]
    Decompression(String),

    /// A record header or payload could not be decoded.
    #[error("Record parsing error at offset {offset}: {message}")]
    RecordParse { offset: u64, message: String },

    /// Invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A body section failed to decode.
    #[error("Failed to parse section {name}: {source}")]
    Section {
        name: String,
        #[source]
        source: Box<Error>,
    },

    /// A deadline imposed by the caller elapsed.
    #[error("Parsing timed out")]
    Timeout,
}

impl Error {
    /// Returns true for errors caused by document protection.
    pub fn is_protection(&self) -> bool {
        match self {
            Error::UnsupportedProtection(_) => true,
            Error::Section { source, .. } => source.is_protection(),
            _ => false,
        }
    }
}
