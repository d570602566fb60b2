//! BodyText section reconstruction for HWP 5.0.
//!
//! Records in a section stream are flat; structure is recovered by comparing
//! `level` values. A construct started at level L is closed by the next
//! record that can start a sibling or ancestor construct at a level <= L.
//! Three mutually recursive scans (paragraph, table, cell) apply that rule.

use super::control::{self, ctrl_id, CellProps, ObjectSize, TableProps};
use super::record::{read_records, read_u16, read_u32, read_u8, Record, TagId};
use super::text::{self, ControlInfo};
use crate::error::Result;

/// A reconstructed body section.
#[derive(Debug, Clone, Default)]
pub struct Section {
    /// Paragraphs, tables and images in document order
    pub blocks: Vec<SectionBlock>,
}

impl Section {
    /// Iterates over top-level paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            SectionBlock::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    /// Iterates over top-level tables.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            SectionBlock::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Iterates over image references.
    pub fn images(&self) -> impl Iterator<Item = &ImageRef> {
        self.blocks.iter().filter_map(|b| match b {
            SectionBlock::Image(i) => Some(i),
            _ => None,
        })
    }
}

/// A top-level construct of a section.
#[derive(Debug, Clone)]
pub enum SectionBlock {
    Paragraph(Paragraph),
    Table(Table),
    Image(ImageRef),
}

/// A paragraph with its decoded text and style references.
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    pub text: String,
    /// Inline objects anchored in `text`
    pub controls: Vec<ControlInfo>,
    /// (position in code units, char shape id) pairs
    pub char_shapes: Vec<(u32, u32)>,
    /// Raw PARA_TEXT payload, kept for run splitting
    pub raw_text: Vec<u8>,
    pub header: ParaHeader,
}

impl Paragraph {
    /// Char shape id in effect at the start of the paragraph.
    pub fn char_shape_id(&self) -> u32 {
        self.char_shapes.first().map_or(0, |&(_, id)| id)
    }

    pub fn para_shape_id(&self) -> u16 {
        self.header.para_shape_id
    }

    pub fn style_id(&self) -> u8 {
        self.header.style_id
    }

    /// Returns true if the text is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// PARA_HEADER fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParaHeader {
    /// Length of the paragraph text in code units
    pub text_len: u32,
    pub control_mask: u32,
    pub para_shape_id: u16,
    pub style_id: u8,
    pub division_type: u8,
    pub char_shape_count: u16,
    pub range_tag_count: u16,
    pub line_align_count: u16,
    pub instance_id: u32,
}

impl ParaHeader {
    /// Parses a PARA_HEADER payload. Fields beyond a short payload keep
    /// their defaults.
    pub fn parse(data: &[u8]) -> Self {
        Self {
            text_len: read_u32(data, 0).map_or(0, |v| v & 0x7FFF_FFFF),
            control_mask: read_u32(data, 4).unwrap_or(0),
            para_shape_id: read_u16(data, 8).unwrap_or(0),
            style_id: read_u8(data, 10).unwrap_or(0),
            division_type: read_u8(data, 11).unwrap_or(0),
            char_shape_count: read_u16(data, 12).unwrap_or(0),
            range_tag_count: read_u16(data, 14).unwrap_or(0),
            line_align_count: read_u16(data, 16).unwrap_or(0),
            instance_id: read_u32(data, 18).unwrap_or(0),
        }
    }
}

/// A reconstructed table with a complete `rows × cols` grid.
#[derive(Debug, Clone)]
pub struct Table {
    pub props: TableProps,
    pub rows: usize,
    pub cols: usize,
    /// Row-major grid; span-covered slots have zero spans
    pub cells: Vec<Vec<TableCell>>,
    /// Caption paragraphs
    pub caption: Vec<Paragraph>,
}

impl Table {
    /// The first row is treated as a header when there is more than one row.
    pub fn has_header(&self) -> bool {
        self.rows > 1
    }

    /// Returns origin cells in reading order.
    pub fn origin_cells(&self) -> impl Iterator<Item = &TableCell> {
        self.cells.iter().flatten().filter(|c| !c.is_covered())
    }
}

/// A table cell.
#[derive(Debug, Clone, Default)]
pub struct TableCell {
    pub row: usize,
    pub col: usize,
    /// Rows spanned; 0 for span-covered slots
    pub row_span: usize,
    /// Columns spanned; 0 for span-covered slots
    pub col_span: usize,
    /// Declared width in HWPUNIT
    pub width: u32,
    /// Declared height in HWPUNIT
    pub height: u32,
    pub paragraphs: Vec<Paragraph>,
    /// Tables nested inside the cell
    pub tables: Vec<Table>,
}

impl TableCell {
    fn covered(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            ..Default::default()
        }
    }

    fn empty(row: usize, col: usize) -> Self {
        Self {
            row,
            col,
            row_span: 1,
            col_span: 1,
            ..Default::default()
        }
    }

    /// Returns true if this slot is covered by another cell's span.
    pub fn is_covered(&self) -> bool {
        self.row_span == 0 && self.col_span == 0
    }

    /// Trimmed, non-empty paragraph texts joined by newlines.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A picture reference found in a drawing object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRef {
    pub bin_data_id: u16,
    /// Width in HWPUNIT
    pub width: u32,
    /// Height in HWPUNIT
    pub height: u32,
}

/// Parses a decompressed section stream.
pub fn parse_section(data: &[u8], extract_images: bool) -> Result<Section> {
    let records = read_records(data)?;
    log::debug!("section: {} records", records.len());
    Ok(SectionParser::new(&records, extract_images).parse())
}

/// Returns true for records that belong to the paragraph body itself.
fn is_paragraph_data(tag: TagId) -> bool {
    matches!(
        tag,
        TagId::ParaText | TagId::ParaCharShape | TagId::ParaLineSeg | TagId::ParaRangeTag
    )
}

/// Scans a section's record list.
pub struct SectionParser<'a> {
    records: &'a [Record],
    extract_images: bool,
}

impl<'a> SectionParser<'a> {
    pub fn new(records: &'a [Record], extract_images: bool) -> Self {
        Self {
            records,
            extract_images,
        }
    }

    /// Reconstructs the section.
    pub fn parse(&self) -> Section {
        let mut section = Section::default();
        let mut i = 0;

        while i < self.records.len() {
            let record = &self.records[i];
            match record.tag() {
                TagId::ParaHeader if record.level() == 0 => {
                    let (paragraph, nested, next) = self.scan_paragraph(i, false);
                    if !paragraph.is_blank() {
                        section.blocks.push(SectionBlock::Paragraph(paragraph));
                    }
                    section.blocks.extend(nested);
                    i = next;
                }
                TagId::CtrlHeader if record.level() <= 1 && control::is_ctrl(record, ctrl_id::TBL) => {
                    let (table, next) = self.scan_table(i);
                    section.blocks.extend(table.map(SectionBlock::Table));
                    i = next;
                }
                TagId::CtrlHeader
                    if self.extract_images
                        && record.level() <= 1
                        && control::is_ctrl(record, ctrl_id::GSO) =>
                {
                    // Orphan drawing objects: nested tables are not reached
                    // by the top-level walk either
                    let (image, _, next) = self.scan_image(i);
                    section.blocks.extend(image.map(SectionBlock::Image));
                    i = next;
                }
                _ => i += 1,
            }
        }

        section
    }

    /// Scans a paragraph starting at a PARA_HEADER.
    ///
    /// Returns the paragraph, the tables/images anchored inside it and the
    /// index of the first record after it.
    fn scan_paragraph(&self, start: usize, in_cell: bool) -> (Paragraph, Vec<SectionBlock>, usize) {
        let header = &self.records[start];
        let start_level = header.level();
        let mut paragraph = Paragraph {
            header: ParaHeader::parse(header.data()),
            ..Default::default()
        };
        let mut nested = Vec::new();
        let mut has_text = false;
        let mut has_shapes = false;
        let mut i = start + 1;

        while i < self.records.len() {
            let record = &self.records[i];
            // Paragraph children sit one level deeper. A PARA_HEADER, or any
            // structural record (LIST_HEADER of the next cell, TABLE, ...),
            // at or above the paragraph's level closes it.
            if record.level() <= start_level && !is_paragraph_data(record.tag()) {
                break;
            }

            match record.tag() {
                TagId::ParaText if !has_text => {
                    let (text, controls) = text::decode_text_with_controls(record.data());
                    paragraph.text = text;
                    paragraph.controls = controls;
                    paragraph.raw_text = record.data().to_vec();
                    has_text = true;
                }
                TagId::ParaCharShape if !has_shapes => {
                    paragraph.char_shapes = parse_char_shape_runs(record.data());
                    has_shapes = true;
                }
                TagId::CtrlHeader if control::is_ctrl(record, ctrl_id::TBL) => {
                    let (table, next) = self.scan_table(i);
                    nested.extend(table.map(SectionBlock::Table));
                    i = next;
                    continue;
                }
                TagId::CtrlHeader
                    if self.extract_images
                        && !in_cell
                        && control::is_ctrl(record, ctrl_id::GSO) =>
                {
                    let (image, tables, next) = self.scan_image(i);
                    nested.extend(image.map(SectionBlock::Image));
                    nested.extend(tables);
                    i = next;
                    continue;
                }
                _ => {}
            }
            i += 1;
        }

        (paragraph, nested, i)
    }

    /// Scans a table starting at its CTRL_HEADER.
    fn scan_table(&self, start: usize) -> (Option<Table>, usize) {
        let table_level = self.records[start].level();
        let mut props = None;
        let mut cells = Vec::new();
        let mut caption = Vec::new();
        let mut i = start + 1;

        while i < self.records.len() {
            let record = &self.records[i];
            // TABLE and cell LIST_HEADERs sit one level deeper than the
            // table's CTRL_HEADER.
            if record.level() <= table_level {
                break;
            }

            match record.tag() {
                TagId::Table if props.is_none() => {
                    props = TableProps::parse(record.data());
                }
                TagId::ListHeader => {
                    let (cell, next) = self.scan_cell(i);
                    // List headers before the TABLE record hold the caption
                    if props.is_none() {
                        caption.extend(cell.paragraphs);
                    } else {
                        cells.push(cell);
                    }
                    i = next;
                    continue;
                }
                _ => {}
            }
            i += 1;
        }

        let table = props.and_then(|props| build_table(props, cells, caption));
        (table, i)
    }

    /// Scans a cell starting at its LIST_HEADER.
    fn scan_cell(&self, start: usize) -> (TableCell, usize) {
        let list_header = &self.records[start];
        let cell_level = list_header.level();
        let props = CellProps::parse(list_header.data());

        let mut cell = TableCell {
            row: props.row as usize,
            col: props.col as usize,
            row_span: props.row_span as usize,
            col_span: props.col_span as usize,
            width: props.width,
            height: props.height,
            ..Default::default()
        };
        let mut i = start + 1;

        while i < self.records.len() {
            let record = &self.records[i];
            // Cell paragraphs share the LIST_HEADER's level. The next
            // LIST_HEADER at that level starts another cell; anything above
            // it belongs to the enclosing table or paragraph.
            let level = record.level();
            if level < cell_level || (level == cell_level && record.tag() != TagId::ParaHeader) {
                break;
            }
            if record.tag() == TagId::ParaHeader {
                let (paragraph, nested, next) = self.scan_paragraph(i, true);
                cell.paragraphs.push(paragraph);
                cell.tables.extend(nested.into_iter().filter_map(|b| match b {
                    SectionBlock::Table(t) => Some(t),
                    _ => None,
                }));
                i = next;
                continue;
            }
            i += 1;
        }

        (cell, i)
    }

    /// Scans a drawing object for a picture reference.
    ///
    /// Tables inside the object's text boxes are returned alongside, the
    /// same ones the paragraph scan finds when images are not extracted.
    fn scan_image(&self, start: usize) -> (Option<ImageRef>, Vec<SectionBlock>, usize) {
        let ctrl = &self.records[start];
        let size = ObjectSize::parse(ctrl).unwrap_or_default();
        let mut bin_data_id = None;
        let mut tables = Vec::new();
        let mut i = start + 1;

        while i < self.records.len() && self.records[i].level() > ctrl.level() {
            let record = &self.records[i];
            match record.tag() {
                TagId::ShapeComponentPicture if bin_data_id.is_none() => {
                    bin_data_id = control::picture_bin_data_id(record);
                }
                TagId::CtrlHeader if control::is_ctrl(record, ctrl_id::TBL) => {
                    let (table, next) = self.scan_table(i);
                    tables.extend(table.map(SectionBlock::Table));
                    i = next;
                    continue;
                }
                _ => {}
            }
            i += 1;
        }

        let image = bin_data_id.map(|id| ImageRef {
            bin_data_id: id,
            width: size.width,
            height: size.height,
        });
        (image, tables, i)
    }
}

/// Parses PARA_CHAR_SHAPE: pairs of (position: u32, char_shape_id: u32).
fn parse_char_shape_runs(data: &[u8]) -> Vec<(u32, u32)> {
    data.chunks_exact(8)
        .filter_map(|pair| Some((read_u32(pair, 0)?, read_u32(pair, 4)?)))
        .collect()
}

/// Grid slots always allowed regardless of the cell count.
const MIN_SLOT_LIMIT: usize = 4096;

/// Grid slots allowed per decoded cell beyond `MIN_SLOT_LIMIT`.
const SLOTS_PER_CELL: usize = 64;

/// Places cells into the grid; degenerate tables yield `None`.
fn build_table(props: TableProps, cells: Vec<TableCell>, caption: Vec<Paragraph>) -> Option<Table> {
    let (rows, cols) = (props.rows as usize, props.cols as usize);
    if rows == 0 || cols == 0 || cells.is_empty() {
        log::debug!(
            "dropping degenerate table {}x{} with {} cells",
            rows,
            cols,
            cells.len()
        );
        return None;
    }

    let limit = cells.len().saturating_mul(SLOTS_PER_CELL).max(MIN_SLOT_LIMIT);
    if rows * cols > limit {
        log::debug!(
            "dropping oversized table {}x{} with {} cells",
            rows,
            cols,
            cells.len()
        );
        return None;
    }

    Some(Table {
        props,
        rows,
        cols,
        cells: place_cells(rows, cols, cells),
        caption,
    })
}

/// Places cells row-major into a `rows × cols` grid, skipping slots already
/// covered by an earlier span. Covered slots get zero-span placeholders and
/// slots left over at the end get empty 1×1 cells.
pub(crate) fn place_cells(rows: usize, cols: usize, cells: Vec<TableCell>) -> Vec<Vec<TableCell>> {
    let mut arena: Vec<Option<TableCell>> = vec![None; rows * cols];
    let mut cursor = 0;

    for mut cell in cells {
        while cursor < arena.len() && arena[cursor].is_some() {
            cursor += 1;
        }
        if cursor == arena.len() {
            log::debug!("table grid full, dropping extra cells");
            break;
        }

        let (row, col) = (cursor / cols, cursor % cols);
        let row_end = (row + cell.row_span.max(1)).min(rows);
        let col_end = (col + cell.col_span.max(1)).min(cols);
        cell.row = row;
        cell.col = col;
        cell.row_span = row_end - row;
        cell.col_span = col_end - col;

        for r in row..row_end {
            for c in col..col_end {
                if (r, c) != (row, col) && arena[r * cols + c].is_none() {
                    arena[r * cols + c] = Some(TableCell::covered(r, c));
                }
            }
        }
        arena[cursor] = Some(cell);
    }

    let mut grid: Vec<Vec<TableCell>> = Vec::with_capacity(rows);
    for (index, slot) in arena.into_iter().enumerate() {
        if index % cols == 0 {
            grid.push(Vec::with_capacity(cols));
        }
        let cell = slot.unwrap_or_else(|| TableCell::empty(index / cols, index % cols));
        if let Some(row) = grid.last_mut() {
            row.push(cell);
        }
    }
    grid
}
