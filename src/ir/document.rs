//! Document root and block union.

use super::{Image, List, Paragraph, Table, IR_VERSION};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A complete document in intermediate form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// IR schema version
    pub version: String,
    /// Document metadata
    #[serde(default)]
    pub metadata: Metadata,
    /// Content blocks in reading order
    #[serde(default)]
    pub content: Vec<Block>,
    /// Pre-rendered Markdown supplied by an external converter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_markdown: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a new empty document with the current IR version.
    pub fn new() -> Self {
        Self {
            version: IR_VERSION.to_string(),
            metadata: Metadata::default(),
            content: Vec::new(),
            raw_markdown: None,
        }
    }

    /// Appends a paragraph block.
    pub fn push_paragraph(&mut self, paragraph: Paragraph) {
        self.content.push(Block::Paragraph { paragraph });
    }

    /// Appends a table block.
    pub fn push_table(&mut self, table: Table) {
        self.content.push(Block::Table { table });
    }

    /// Appends an image block.
    pub fn push_image(&mut self, image: Image) {
        self.content.push(Block::Image { image });
    }

    /// Appends a list block.
    pub fn push_list(&mut self, list: List) {
        self.content.push(Block::List { list });
    }

    /// Returns the number of paragraph blocks.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Returns an iterator over all paragraph blocks.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.content.iter().filter_map(Block::as_paragraph)
    }

    /// Returns an iterator over all table blocks.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.content.iter().filter_map(Block::as_table)
    }

    /// Returns an iterator over all image blocks.
    pub fn images(&self) -> impl Iterator<Item = &Image> {
        self.content.iter().filter_map(|b| match b {
            Block::Image { image } => Some(image),
            _ => None,
        })
    }

    /// Returns the plain text content of the entire document.
    pub fn plain_text(&self) -> String {
        let mut result = Vec::new();
        for block in &self.content {
            match block {
                Block::Paragraph { paragraph } => result.push(paragraph.text.clone()),
                Block::Table { table } => result.push(table.plain_text()),
                Block::List { list } => result.push(list.plain_text()),
                Block::Image { .. } => {}
            }
        }
        result.join("\n")
    }

    /// Serializes the document to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidData(e.to_string()))
    }

    /// Deserializes a document from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidData(e.to_string()))
    }
}

/// Document metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub keywords: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Producing application and format version
    #[serde(skip_serializing_if = "String::is_empty")]
    pub creator: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub modified: String,
}

/// A block-level content element.
///
/// Serialized as `{"type": "<kind>", "<kind>": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Paragraph { paragraph: Paragraph },
    Table { table: Table },
    Image { image: Image },
    List { list: List },
}

impl Block {
    /// Returns the paragraph if this block is one.
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Block::Paragraph { paragraph } => Some(paragraph),
            _ => None,
        }
    }

    /// Returns the table if this block is one.
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Block::Table { table } => Some(table),
            _ => None,
        }
    }

    /// Returns the list if this block is one.
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Block::List { list } => Some(list),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert_eq!(doc.version, "1.0");
        assert!(doc.content.is_empty());
        assert!(doc.raw_markdown.is_none());
    }

    #[test]
    fn test_block_tagging() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::new("Hello, World!"));
        doc.push_image(Image::new("BIN0001"));

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["content"][0]["type"], "paragraph");
        assert_eq!(value["content"][0]["paragraph"]["text"], "Hello, World!");
        assert_eq!(value["content"][1]["type"], "image");
        assert_eq!(value["content"][1]["image"]["id"], "BIN0001");
    }

    #[test]
    fn test_empty_fields_omitted() {
        let mut doc = Document::new();
        doc.metadata.title = "제목".into();
        doc.push_paragraph(Paragraph::new("본문"));

        let json = serde_json::to_string(&doc).unwrap();
        assert!(json.contains("\"title\":\"제목\""));
        assert!(!json.contains("author"));
        assert!(!json.contains("raw_markdown"));
        assert!(!json.contains("runs"));
        assert!(!json.contains("heading_level"));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut doc = Document::new();
        doc.metadata.author = "Test Author".into();
        let mut p = Paragraph::new("Test paragraph");
        p.set_heading(1);
        doc.push_paragraph(p);
        let mut table = Table::new(2, 2);
        table.set_cell(0, 0, "A");
        doc.push_table(table);

        let restored = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_plain_text() {
        let mut doc = Document::new();
        doc.push_paragraph(Paragraph::new("첫 문단"));
        let mut list = List::new(false);
        list.push_item("항목");
        doc.push_list(list);
        assert_eq!(doc.plain_text(), "첫 문단\n항목");
        assert_eq!(doc.paragraph_count(), 1);
    }
}
