//! Conversion of reconstructed sections into the intermediate representation.

use super::container::{stream, Hwp5Container};
use super::control::hwpunit_to_px;
use super::docinfo::{CharShape, DocInfo, HeadKind, ParaAlignment, ParaShape};
use super::record::decompress_stream;
use super::section::{self, ImageRef, Section, SectionBlock};
use super::text;
use crate::error::Result;
use crate::ir::{self, Alignment, Cell, Document, Image, List, TextStyle};
use std::fs;
use std::path::Path;

/// Left margin per indent level, in HWPUNIT (20pt).
const INDENT_STEP: i32 = 2000;

/// Where image bytes come from and where they go.
pub(crate) struct ImageSource<'a> {
    pub container: &'a Hwp5Container,
    pub compressed: bool,
    pub dir: Option<&'a Path>,
}

impl ImageSource<'_> {
    /// Reads a BinData stream, inflating it when the document is compressed.
    ///
    /// Undecodable payloads are returned as stored.
    pub fn load(&self, id: u16, extension: &str) -> Result<Vec<u8>> {
        let raw = self.container.read_bin_data(id, extension)?;
        if !self.compressed {
            return Ok(raw);
        }
        match decompress_stream(&raw) {
            Ok(data) => Ok(data),
            Err(e) => {
                log::debug!("{}/BIN{id:04X}: keeping stored bytes ({e})", stream::BIN_DATA);
                Ok(raw)
            }
        }
    }
}

/// Accumulates IR blocks section by section.
pub(crate) struct Assembler<'a> {
    doc_info: &'a DocInfo,
    images: Option<ImageSource<'a>>,
    document: Document,
    list: Option<List>,
}

impl<'a> Assembler<'a> {
    pub fn new(doc_info: &'a DocInfo, images: Option<ImageSource<'a>>) -> Self {
        Self {
            doc_info,
            images,
            document: Document::new(),
            list: None,
        }
    }

    /// Appends the blocks of one section in document order.
    pub fn push_section(&mut self, section: &Section) {
        for block in &section.blocks {
            match block {
                SectionBlock::Paragraph(paragraph) => self.push_paragraph(paragraph),
                SectionBlock::Table(table) => {
                    self.flush_list();
                    self.document.push_table(convert_table(table));
                }
                SectionBlock::Image(image) => {
                    self.flush_list();
                    let image = self.convert_image(image);
                    self.document.push_image(image);
                }
            }
        }
        self.flush_list();
    }

    pub fn finish(mut self) -> Document {
        self.flush_list();
        self.document
    }

    fn flush_list(&mut self) {
        if let Some(list) = self.list.take() {
            if !list.is_empty() {
                self.document.push_list(list);
            }
        }
    }

    fn push_paragraph(&mut self, paragraph: &section::Paragraph) {
        let text = paragraph.text.trim();
        if text.is_empty() {
            return;
        }

        let doc_info = self.doc_info;
        let shape = doc_info.para_shape(paragraph.para_shape_id() as u32);

        if let Some(shape) = shape {
            let ordered = match shape.head_kind() {
                HeadKind::Numbering => Some(true),
                HeadKind::Bullet => Some(false),
                _ => None,
            };
            if let Some(ordered) = ordered {
                if self.list.as_ref().is_some_and(|l| l.ordered != ordered) {
                    self.flush_list();
                }
                self.list
                    .get_or_insert_with(|| List::new(ordered))
                    .push_item_at(text, shape.head_level() as u32);
                return;
            }
        }

        self.flush_list();
        let converted = convert_paragraph(doc_info, paragraph, shape);
        self.document.push_paragraph(converted);
    }

    fn convert_image(&self, image: &ImageRef) -> Image {
        let mut out = Image::new(format!("BIN{:04X}", image.bin_data_id));
        out.width = hwpunit_to_px(image.width);
        out.height = hwpunit_to_px(image.height);

        let info = self.doc_info.bin_data(image.bin_data_id);
        let extension = info.map_or("", |b| b.extension.as_str());
        out.format = extension.to_ascii_lowercase();
        if let Some(name) = info.and_then(|b| b.storage_name()) {
            out.orig_name = name;
        }

        let Some(source) = &self.images else {
            return out;
        };

        let data = match source.load(image.bin_data_id, extension) {
            Ok(data) => data,
            Err(e) => {
                log::warn!("image {}: {e}", out.id);
                return out;
            }
        };

        match source.dir {
            Some(dir) => {
                let name = if out.orig_name.is_empty() {
                    out.id.clone()
                } else {
                    out.orig_name.clone()
                };
                match write_image(dir, &name, &data) {
                    Ok(path) => out.path = path,
                    Err(e) => log::warn!("image {}: failed to write to {}: {e}", out.id, dir.display()),
                }
            }
            None => out.data = data,
        }

        out
    }
}

/// Writes image bytes into `dir`, creating it if needed.
pub(crate) fn write_image(dir: &Path, name: &str, data: &[u8]) -> Result<String> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, data)?;
    Ok(path.to_string_lossy().into_owned())
}

fn convert_paragraph(
    doc_info: &DocInfo,
    paragraph: &section::Paragraph,
    shape: Option<&ParaShape>,
) -> ir::Paragraph {
    let mut out = ir::Paragraph::new(paragraph.text.trim());

    if let Some(shape) = shape {
        out.style.alignment = Some(convert_alignment(shape.alignment()));
        out.style.indent = (shape.left_margin / INDENT_STEP).max(0) as u32;
        if shape.head_kind() == HeadKind::Outline {
            out.set_heading((shape.head_level() + 1).min(6));
        }
    }

    if out.style.heading_level == 0 {
        if let Some(level) = doc_info
            .style(paragraph.style_id() as u32)
            .and_then(|s| s.outline_level())
        {
            out.set_heading(level);
        }
    }

    let mut runs: Vec<(String, TextStyle)> = text::decode_runs(&paragraph.raw_text, &paragraph.char_shapes)
        .into_iter()
        .map(|(text, id)| {
            let style = doc_info.char_shape(id).map(text_style).unwrap_or_default();
            (text, style)
        })
        .collect();
    trim_runs(&mut runs);
    if runs.iter().any(|(_, style)| style.has_formatting()) {
        for (text, style) in runs {
            out.push_run(text, style);
        }
    }

    out
}

/// Trims runs the way the paragraph text is trimmed and drops empty ones.
fn trim_runs(runs: &mut Vec<(String, TextStyle)>) {
    for (text, _) in runs.iter_mut() {
        *text = text.trim_start().to_string();
        if !text.is_empty() {
            break;
        }
    }
    for (text, _) in runs.iter_mut().rev() {
        *text = text.trim_end().to_string();
        if !text.is_empty() {
            break;
        }
    }
    runs.retain(|(text, _)| !text.is_empty());
}

fn text_style(shape: &CharShape) -> TextStyle {
    TextStyle {
        bold: shape.is_bold(),
        italic: shape.is_italic(),
        underline: shape.is_underline(),
        strikethrough: shape.is_strikethrough(),
        superscript: shape.is_superscript(),
        subscript: shape.is_subscript(),
        ..Default::default()
    }
}

fn convert_alignment(alignment: ParaAlignment) -> Alignment {
    match alignment {
        ParaAlignment::Left => Alignment::Left,
        ParaAlignment::Center => Alignment::Center,
        ParaAlignment::Right => Alignment::Right,
        ParaAlignment::Justify | ParaAlignment::Distribute | ParaAlignment::Divide => {
            Alignment::Justify
        }
    }
}

fn convert_table(table: &section::Table) -> ir::Table {
    let mut out = ir::Table::new(table.rows, table.cols);

    for (r, row) in table.cells.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            let Some(slot) = out.get_cell_mut(r, c) else {
                continue;
            };
            *slot = if cell.is_covered() {
                Cell::covered()
            } else {
                let mut converted = Cell::new(cell_text(cell));
                converted.row_span = cell.row_span as u32;
                converted.col_span = cell.col_span as u32;
                converted
            };
        }
    }

    out.caption = table
        .caption
        .iter()
        .map(|p| p.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    if table.has_header() {
        out.set_header_row();
    }
    out
}

/// Cell paragraphs followed by nested tables flattened row by row.
fn cell_text(cell: &section::TableCell) -> String {
    let mut parts = vec![cell.text()];
    parts.extend(cell.tables.iter().map(flatten_table));
    parts.retain(|p| !p.is_empty());
    parts.join("\n")
}

fn flatten_table(table: &section::Table) -> String {
    table
        .cells
        .iter()
        .map(|row| {
            row.iter()
                .filter(|c| !c.is_covered())
                .map(cell_text)
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .filter(|line| !line.trim_matches(|c| c == ' ' || c == '|').is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
