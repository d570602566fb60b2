//! Format detection for HWP documents.

use crate::error::{Error, Result};
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

/// Magic bytes for OLE Compound File (HWP 5.x)
const OLE_MAGIC: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Magic bytes for ZIP archive (HWPX)
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Document format types known to the detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// HWP 5.0+ binary format (OLE container)
    Hwp5,
    /// HWPX XML-based format (ZIP container)
    Hwpx,
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatType::Hwp5 => write!(f, "HWP 5.0"),
            FormatType::Hwpx => write!(f, "HWPX"),
        }
    }
}

/// Detect document format from a file path.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::NotAFile(path.to_path_buf()));
    }
    let mut file = std::fs::File::open(path)?;
    detect_format(&mut file)
}

/// Detect document format from a reader.
///
/// The reader is rewound to the start afterwards.
pub fn detect_format<R: Read + Seek>(reader: &mut R) -> Result<FormatType> {
    let mut buffer = [0u8; 8];

    reader.seek(SeekFrom::Start(0))?;
    let mut filled = 0;
    while filled < buffer.len() {
        let n = reader.read(&mut buffer[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    reader.seek(SeekFrom::Start(0))?;

    detect_format_from_bytes(&buffer[..filled])
}

/// Detect document format from bytes.
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if data.len() < 8 {
        return Err(Error::InvalidData("Data too small".into()));
    }

    if data[..8] == OLE_MAGIC {
        return Ok(FormatType::Hwp5);
    }

    if data[..4] == ZIP_MAGIC {
        return Ok(FormatType::Hwpx);
    }

    Err(Error::UnknownFormat)
}

/// Guess the document format from a file extension.
pub fn detect_format_from_extension(path: impl AsRef<Path>) -> Option<FormatType> {
    let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "hwp" | "hwp5" => Some(FormatType::Hwp5),
        "hwpx" => Some(FormatType::Hwpx),
        _ => None,
    }
}
