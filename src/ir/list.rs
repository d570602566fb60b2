//! Ordered and unordered lists.

use super::is_zero;
use serde::{Deserialize, Serialize};

/// A list block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct List {
    /// Numbered (true) or bulleted (false)
    pub ordered: bool,
    #[serde(default)]
    pub items: Vec<ListItem>,
    /// Starting number for ordered lists
    #[serde(default, skip_serializing_if = "is_zero")]
    pub start: u32,
}

/// A list item with optional nested children.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub level: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ListItem>,
}

impl List {
    /// Creates an empty list.
    pub fn new(ordered: bool) -> Self {
        Self {
            ordered,
            items: Vec::new(),
            start: 1,
        }
    }

    /// Adds a top-level item.
    pub fn push_item(&mut self, text: impl Into<String>) {
        self.items.push(ListItem {
            text: text.into(),
            ..Default::default()
        });
    }

    /// Adds an item at `level`, nesting it under the most recent item of
    /// the level above. Missing parents are attached to the deepest
    /// available ancestor.
    pub fn push_item_at(&mut self, text: impl Into<String>, level: u32) {
        let item = ListItem {
            text: text.into(),
            level,
            children: Vec::new(),
        };
        let mut siblings = &mut self.items;
        let mut depth = 0;
        while depth < level {
            match siblings.last() {
                Some(last) if last.level < level => {}
                _ => break,
            }
            let parent = siblings.len() - 1;
            siblings = &mut siblings[parent].children;
            depth += 1;
        }
        siblings.push(item);
    }

    /// Returns true if the list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns item text one per line, depth-first.
    pub fn plain_text(&self) -> String {
        fn collect(items: &[ListItem], out: &mut Vec<String>) {
            for item in items {
                out.push(item.text.clone());
                collect(&item.children, out);
            }
        }
        let mut lines = Vec::new();
        collect(&self.items, &mut lines);
        lines.join("\n")
    }
}
