//! In-memory HWP 5.0 document builder for integration tests.

#![allow(dead_code)]

use cfb::CompoundFile;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Cursor, Write};
use std::path::Path;

pub mod tag {
    pub const BIN_DATA: u16 = 18;
    pub const CHAR_SHAPE: u16 = 21;
    pub const PARA_SHAPE: u16 = 25;
    pub const STYLE: u16 = 26;
    pub const PARA_HEADER: u16 = 66;
    pub const PARA_TEXT: u16 = 67;
    pub const PARA_CHAR_SHAPE: u16 = 68;
    pub const PARA_LINE_SEG: u16 = 69;
    pub const CTRL_HEADER: u16 = 71;
    pub const LIST_HEADER: u16 = 72;
    pub const SHAPE_COMPONENT: u16 = 76;
    pub const TABLE: u16 = 77;
    pub const SHAPE_COMPONENT_PICTURE: u16 = 85;
}

pub const COMPRESSED: u32 = 1 << 0;
pub const ENCRYPTED: u32 = 1 << 1;
pub const DISTRIBUTION: u32 = 1 << 2;
pub const DRM: u32 = 1 << 4;

/// Encodes one record with its packed header.
pub fn record(tag: u16, level: u16, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let size = payload.len().min(0xFFF) as u32;
    let header = u32::from(tag) | (u32::from(level) << 10) | (size << 20);
    out.extend_from_slice(&header.to_le_bytes());
    if size == 0xFFF {
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(payload);
    out
}

pub fn utf16(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

/// Length-prefixed UTF-16LE string as stored in DocInfo records.
pub fn hwp_string(text: &str) -> Vec<u8> {
    let mut out = (text.encode_utf16().count() as u16).to_le_bytes().to_vec();
    out.extend(utf16(text));
    out
}

/// An inline control (code + 4-byte id + 8 reserved bytes + code).
pub fn inline_control(code: u16, id: &[u8; 4]) -> Vec<u8> {
    let mut out = code.to_le_bytes().to_vec();
    out.extend_from_slice(id);
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&code.to_le_bytes());
    out
}

pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn file_header(properties: u32) -> Vec<u8> {
    let mut data = vec![0u8; 256];
    data[..17].copy_from_slice(b"HWP Document File");
    // 5.1.0.1 stored as [revision, build, minor, major]
    data[32..36].copy_from_slice(&[1, 0, 1, 5]);
    data[36..40].copy_from_slice(&properties.to_le_bytes());
    data
}

/// PARA_HEADER payload.
pub fn para_header(text_units: u32, para_shape_id: u16, style_id: u8) -> Vec<u8> {
    let mut data = vec![0u8; 22];
    data[0..4].copy_from_slice(&text_units.to_le_bytes());
    data[8..10].copy_from_slice(&para_shape_id.to_le_bytes());
    data[10] = style_id;
    data
}

/// CHAR_SHAPE payload with the given attribute bits.
pub fn char_shape(attributes: u32) -> Vec<u8> {
    let mut data = vec![0u8; 72];
    data[42..46].copy_from_slice(&1000u32.to_le_bytes());
    data[46..50].copy_from_slice(&attributes.to_le_bytes());
    data
}

/// PARA_SHAPE payload with the given first attribute word.
pub fn para_shape(attributes1: u32) -> Vec<u8> {
    let mut data = vec![0u8; 54];
    data[0..4].copy_from_slice(&attributes1.to_le_bytes());
    data
}

pub fn style(name: &str, english: &str) -> Vec<u8> {
    let mut data = hwp_string(name);
    data.extend(hwp_string(english));
    data.extend_from_slice(&[0, 0, 0x12, 0x04, 0, 0, 0, 0]);
    data
}

/// Embedded BIN_DATA payload.
pub fn bin_data(id: u16, extension: &str) -> Vec<u8> {
    let mut data = 1u16.to_le_bytes().to_vec();
    data.extend_from_slice(&id.to_le_bytes());
    data.extend(hwp_string(extension));
    data
}

/// Records for a body paragraph at `level` holding `text`.
pub fn paragraph(level: u16, text: &str) -> Vec<u8> {
    paragraph_with_shape(level, text, 0, 0)
}

pub fn paragraph_with_shape(level: u16, text: &str, para_shape_id: u16, style_id: u8) -> Vec<u8> {
    let mut body = utf16(text);
    body.extend_from_slice(&0x0Du16.to_le_bytes());
    let units = (body.len() / 2) as u32;

    let mut out = record(tag::PARA_HEADER, level, &para_header(units, para_shape_id, style_id));
    out.extend(record(tag::PARA_TEXT, level + 1, &body));
    out.extend(record(tag::PARA_CHAR_SHAPE, level + 1, &[0u8; 8]));
    out.extend(record(tag::PARA_LINE_SEG, level + 1, &[0u8; 36]));
    out
}

/// Cell LIST_HEADER payload.
pub fn cell_header(col: u16, row: u16, col_span: u16, row_span: u16) -> Vec<u8> {
    let mut data = vec![0u8; 32];
    data[0..2].copy_from_slice(&1u16.to_le_bytes());
    data[8..10].copy_from_slice(&col.to_le_bytes());
    data[10..12].copy_from_slice(&row.to_le_bytes());
    data[12..14].copy_from_slice(&col_span.to_le_bytes());
    data[14..16].copy_from_slice(&row_span.to_le_bytes());
    data[16..20].copy_from_slice(&3000u32.to_le_bytes());
    data[20..24].copy_from_slice(&1000u32.to_le_bytes());
    data
}

pub fn table_record(rows: u16, cols: u16) -> Vec<u8> {
    let mut data = vec![0u8; 22];
    data[4..6].copy_from_slice(&rows.to_le_bytes());
    data[6..8].copy_from_slice(&cols.to_le_bytes());
    data
}

/// A table control at `level` with cells given as (col, row, colspan, rowspan, text).
pub fn table(level: u16, rows: u16, cols: u16, cells: &[(u16, u16, u16, u16, &str)]) -> Vec<u8> {
    let mut ctrl = b" lbt".to_vec();
    ctrl.resize(46, 0);
    let mut out = record(tag::CTRL_HEADER, level, &ctrl);
    out.extend(record(tag::TABLE, level + 1, &table_record(rows, cols)));
    for &(col, row, col_span, row_span, text) in cells {
        out.extend(record(tag::LIST_HEADER, level + 1, &cell_header(col, row, col_span, row_span)));
        out.extend(paragraph(level + 1, text));
    }
    out
}

/// A drawing object at `level` whose picture references `bin_id`.
pub fn picture(level: u16, bin_id: u16, width: u32, height: u32) -> Vec<u8> {
    let mut ctrl = b" osg".to_vec();
    ctrl.resize(46, 0);
    ctrl[16..20].copy_from_slice(&width.to_le_bytes());
    ctrl[20..24].copy_from_slice(&height.to_le_bytes());
    let mut pic = vec![0u8; 80];
    pic[71..73].copy_from_slice(&bin_id.to_le_bytes());

    let mut out = record(tag::CTRL_HEADER, level, &ctrl);
    out.extend(record(tag::SHAPE_COMPONENT, level + 1, &[0u8; 40]));
    out.extend(record(tag::SHAPE_COMPONENT_PICTURE, level + 2, &pic));
    out
}

/// Builds a compound file holding an HWP 5.0 document.
pub struct HwpBuilder {
    properties: u32,
    doc_info: Vec<u8>,
    sections: Vec<(String, Vec<u8>)>,
    streams: Vec<(String, Vec<u8>)>,
}

impl HwpBuilder {
    pub fn new(properties: u32) -> Self {
        Self {
            properties,
            doc_info: Vec::new(),
            sections: Vec::new(),
            streams: Vec::new(),
        }
    }

    pub fn doc_info(mut self, records: Vec<u8>) -> Self {
        self.doc_info = records;
        self
    }

    /// Adds `BodyText/SectionN` with the next free number.
    pub fn section(mut self, records: Vec<u8>) -> Self {
        let name = format!("/BodyText/Section{}", self.sections.len());
        self.sections.push((name, records));
        self
    }

    /// Adds a stream stored exactly as given.
    pub fn raw_stream(mut self, path: &str, data: Vec<u8>) -> Self {
        self.streams.push((path.to_string(), data));
        self
    }

    /// Adds a BinData stream, compressed when the document is.
    pub fn bin(mut self, name: &str, data: &[u8]) -> Self {
        let stored = self.encode(data);
        self.streams.push((format!("/BinData/{name}"), stored));
        self
    }

    fn encode(&self, data: &[u8]) -> Vec<u8> {
        if self.properties & COMPRESSED != 0 {
            deflate(data)
        } else {
            data.to_vec()
        }
    }

    pub fn build(self) -> Vec<u8> {
        let mut streams = vec![
            ("/FileHeader".to_string(), file_header(self.properties)),
            ("/DocInfo".to_string(), self.encode(&self.doc_info)),
        ];
        for (name, records) in &self.sections {
            streams.push((name.clone(), self.encode(records)));
        }
        streams.extend(self.streams);
        compound_file(&streams)
    }
}

/// Writes streams into a fresh compound file.
pub fn compound_file(streams: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut comp = CompoundFile::create(Cursor::new(Vec::new())).unwrap();
    for (path, data) in streams {
        let path = Path::new(path);
        if let Some(parent) = path.parent() {
            if parent != Path::new("/") && !comp.exists(parent) {
                comp.create_storage_all(parent).unwrap();
            }
        }
        let mut stream = comp.create_stream(path).unwrap();
        stream.write_all(data).unwrap();
    }
    comp.flush().unwrap();
    comp.into_inner().into_inner()
}
