//! Table structures.

use super::{is_zero, Alignment};
use serde::{Deserialize, Serialize};

/// A table region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub rows: usize,
    pub cols: usize,
    /// Row-major grid of `rows × cols` cells
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<Vec<Cell>>,
    /// Fallback text (tab/newline separated)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub caption: String,
    /// First row is a header
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_header: bool,
}

impl Table {
    /// Creates a table of 1×1 cells with the specified dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![vec![Cell::new(""); cols]; rows],
            ..Default::default()
        }
    }

    /// Sets the text of a cell; out-of-range positions are ignored.
    pub fn set_cell(&mut self, row: usize, col: usize, text: impl Into<String>) {
        if let Some(cell) = self.get_cell_mut(row, col) {
            cell.text = text.into();
        }
    }

    /// Gets a cell at the specified position.
    pub fn get_cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.cells.get(row).and_then(|r| r.get(col))
    }

    /// Gets a mutable cell at the specified position.
    pub fn get_cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(row).and_then(|r| r.get_mut(col))
    }

    /// Marks the first row as a header row.
    pub fn set_header_row(&mut self) {
        self.has_header = true;
        if let Some(first) = self.cells.first_mut() {
            for cell in first {
                cell.style.is_header = true;
            }
        }
    }

    /// Returns true if any cell spans more than one slot.
    pub fn has_merged_cells(&self) -> bool {
        self.cells
            .iter()
            .flatten()
            .any(|cell| cell.row_span > 1 || cell.col_span > 1)
    }

    /// Returns origin-cell text row by row, cells separated by ` | `.
    pub fn plain_text(&self) -> String {
        if self.cells.is_empty() {
            return self.raw_text.clone();
        }
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .filter(|cell| !cell.is_covered())
                    .map(|cell| cell.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    /// Rows spanned; 0 marks a slot covered by another cell's span
    #[serde(default, skip_serializing_if = "is_zero")]
    pub row_span: u32,
    /// Columns spanned; 0 marks a slot covered by another cell's span
    #[serde(default, skip_serializing_if = "is_zero")]
    pub col_span: u32,
    #[serde(default)]
    pub style: CellStyle,
}

impl Cell {
    /// Creates a 1×1 origin cell.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            row_span: 1,
            col_span: 1,
            style: CellStyle::default(),
        }
    }

    /// Creates a placeholder for a slot covered by another cell's span.
    pub fn covered() -> Self {
        Self {
            text: String::new(),
            row_span: 0,
            col_span: 0,
            style: CellStyle::default(),
        }
    }

    /// Returns true if this slot belongs to another cell's span.
    pub fn is_covered(&self) -> bool {
        self.row_span == 0 && self.col_span == 0
    }
}

/// Cell-level styling hints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellStyle {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_header: bool,
}
