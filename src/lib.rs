//! # hwp2md
//!
//! Decoder for HWP 5.0 binary documents (Hangul Word Processor) into an
//! intermediate representation that Markdown renderers consume.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hwp2md::{parse_file, ParseOptions};
//!
//! fn main() -> hwp2md::Result<()> {
//!     let document = parse_file("document.hwp", &ParseOptions::default())?;
//!     println!("{}", document.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `hwp5` (default): HWP 5.0 binary format support
//! - `cli` (default): the `hwp2md` driver binary
//! - `async`: worker-thread parsing with deadlines on Tokio

pub mod detect;
pub mod error;
pub mod ir;
pub mod parse_options;

#[cfg(feature = "hwp5")]
pub mod hwp5;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use detect::{detect_format, detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Protection, Result};
pub use ir::Document;
pub use parse_options::{ErrorMode, ParseOptions};

use std::io::{Read, Seek};
use std::path::Path;

/// Parses a document from a file path.
///
/// HWPX (the XML sibling format) is recognized but not decoded here.
///
/// # Example
///
/// ```no_run
/// use hwp2md::{parse_file, ParseOptions};
///
/// let options = ParseOptions::new().with_image_dir("./images");
/// let document = parse_file("example.hwp", &options)?;
/// println!("Paragraphs: {}", document.paragraph_count());
/// # Ok::<(), hwp2md::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Document> {
    let path = path.as_ref();
    let format = detect_format_from_path(path)?;

    match format {
        #[cfg(feature = "hwp5")]
        FormatType::Hwp5 => {
            let mut parser = hwp5::Hwp5Parser::open(path, options.clone())?;
            let document = parser.parse();
            parser.close();
            document
        }
        #[allow(unreachable_patterns)]
        _ => Err(Error::UnsupportedFormat(format.to_string())),
    }
}

/// Parses a document from a reader.
pub fn parse_reader<R: Read + Seek + Send + Sync + 'static>(mut reader: R, options: &ParseOptions) -> Result<Document> {
    let format = detect_format(&mut reader)?;

    match format {
        #[cfg(feature = "hwp5")]
        FormatType::Hwp5 => {
            let mut parser = hwp5::Hwp5Parser::from_reader(reader, options.clone())?;
            parser.parse()
        }
        #[allow(unreachable_patterns)]
        _ => Err(Error::UnsupportedFormat(format.to_string())),
    }
}

/// Parses a document from bytes.
pub fn parse_bytes(data: &[u8], options: &ParseOptions) -> Result<Document> {
    parse_reader(std::io::Cursor::new(data.to_vec()), options)
}

/// Extracts plain text from a document file.
pub fn extract_text(path: impl AsRef<Path>) -> Result<String> {
    let document = parse_file(path, &ParseOptions::default())?;
    Ok(document.plain_text())
}
