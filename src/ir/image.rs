//! Image references.

use super::is_zero;
use serde::{Deserialize, Serialize};

/// An image reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Resource identifier (`BINxxxx`)
    pub id: String,
    /// Path of the extracted file
    #[serde(skip_serializing_if = "String::is_empty")]
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub orig_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alt: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub caption: String,
    /// Width in pixels
    #[serde(skip_serializing_if = "is_zero")]
    pub width: u32,
    /// Height in pixels
    #[serde(skip_serializing_if = "is_zero")]
    pub height: u32,
    /// Lowercase file extension (png, jpg, ...)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub format: String,
    /// Raw image bytes, never serialized
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl Image {
    /// Creates a new image reference.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Returns true if raw bytes were loaded.
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }
}
