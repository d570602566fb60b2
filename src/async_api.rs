//! Async API for non-blocking document processing.
//!
//! Parsing is CPU-bound and synchronous, so these helpers run it on Tokio's
//! blocking pool. Enable the `async` feature to use them:
//!
//! ```toml
//! [dependencies]
//! hwp2md = { version = "0.1", features = ["async"] }
//! ```

use crate::error::{Error, Result};
use crate::ir::Document;
use crate::{FormatType, ParseOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

fn join_error(e: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(e.to_string()))
}

/// Asynchronously parses a document from a file path.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> hwp2md::Result<()> {
/// let options = hwp2md::ParseOptions::default();
/// let document = hwp2md::async_api::parse_file("document.hwp", &options).await?;
/// println!("Paragraphs: {}", document.paragraph_count());
/// # Ok(())
/// # }
/// ```
pub async fn parse_file(path: impl AsRef<Path>, options: &ParseOptions) -> Result<Document> {
    let path: PathBuf = path.as_ref().to_path_buf();
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::parse_file(&path, &options))
        .await
        .map_err(join_error)?
}

/// Parses a file, giving up once `timeout` elapses.
///
/// The worker is not interrupted; its result is discarded.
pub async fn parse_file_with_timeout(
    path: impl AsRef<Path>,
    options: &ParseOptions,
    timeout: Duration,
) -> Result<Document> {
    tokio::time::timeout(timeout, parse_file(path, options))
        .await
        .map_err(|_| Error::Timeout)?
}

/// Asynchronously parses a document from bytes.
pub async fn parse_bytes(data: Vec<u8>, options: &ParseOptions) -> Result<Document> {
    let options = options.clone();
    tokio::task::spawn_blocking(move || crate::parse_bytes(&data, &options))
        .await
        .map_err(join_error)?
}

/// Asynchronously parses a document from an async reader.
pub async fn parse_reader<R: AsyncRead + Unpin>(mut reader: R, options: &ParseOptions) -> Result<Document> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).await?;
    parse_bytes(data, options).await
}

/// Asynchronously detects the format of a file.
pub async fn detect_format(path: impl AsRef<Path>) -> Result<FormatType> {
    let data = fs::read(path).await?;
    crate::detect_format_from_bytes(&data)
}
