//! Parsing options for document extraction.

use std::path::PathBuf;

/// Options for controlling document parsing behavior.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// How to handle section-level parsing errors.
    pub error_mode: ErrorMode,

    /// Whether to resolve picture controls into image blocks.
    pub extract_images: bool,

    /// Directory that receives extracted image files.
    ///
    /// Only consulted when `extract_images` is set.
    pub image_dir: Option<PathBuf>,
}

impl ParseOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables image extraction.
    pub fn with_images(mut self, extract: bool) -> Self {
        self.extract_images = extract;
        self
    }

    /// Sets the directory for extracted images (implies image extraction).
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_images = true;
        self.image_dir = Some(dir.into());
        self
    }

    /// Sets lenient error handling (skip invalid sections).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Sets strict error handling (fail on any error).
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Returns true if section errors should be skipped.
    pub fn is_lenient(&self) -> bool {
        matches!(self.error_mode, ErrorMode::Lenient)
    }
}

/// How to handle parsing errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the whole document on the first section error.
    #[default]
    Strict,
    /// Log and skip sections that fail to decode.
    Lenient,
}
