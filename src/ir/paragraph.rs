//! Paragraph and text run definitions.

use super::is_zero;
use serde::{Deserialize, Serialize};

/// A text paragraph with style hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Plain text of the paragraph
    pub text: String,
    /// Styled runs, present only when formatting varies
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runs: Vec<Run>,
    /// Paragraph-level style hints
    #[serde(default)]
    pub style: ParagraphStyle,
}

impl Paragraph {
    /// Creates a paragraph with plain text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Adds a styled run.
    pub fn push_run(&mut self, text: impl Into<String>, style: TextStyle) {
        self.runs.push(Run {
            text: text.into(),
            style,
        });
    }

    /// Sets the heading level, clamped to 0..=6.
    pub fn set_heading(&mut self, level: u8) {
        self.style.heading_level = level.min(6);
    }

    /// Returns true if the paragraph has no text content.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.runs.is_empty()
    }
}

/// A run of text sharing one character style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
}

/// Paragraph-level styling hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParagraphStyle {
    /// 0 = normal paragraph, 1-6 = heading
    #[serde(skip_serializing_if = "is_zero")]
    pub heading_level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    /// Indent level
    #[serde(skip_serializing_if = "is_zero")]
    pub indent: u32,
    /// Blockquote hint
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_quote: bool,
}

/// Character-level styling hints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextStyle {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub italic: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub underline: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub strikethrough: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub superscript: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub subscript: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub code: bool,
    /// Hyperlink target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl TextStyle {
    /// Returns true if this style has any formatting.
    pub fn has_formatting(&self) -> bool {
        self.bold
            || self.italic
            || self.underline
            || self.strikethrough
            || self.superscript
            || self.subscript
            || self.code
            || self.link.is_some()
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}
