//! Record parsing for HWP 5.0 streams.
//!
//! DocInfo and BodyText streams are flat sequences of TLV records with a
//! packed 4-byte header. Nesting is expressed only through the `level` field.

use crate::error::{Error, Result};
use flate2::read::{DeflateDecoder, ZlibDecoder};
use std::io::Read;

/// Tag IDs for HWP 5.0 records.
/// Based on HWPTAG_BEGIN = 0x10 (16)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagId {
    // DocInfo tags (0x10 - 0x31)
    DocumentProperties,
    IdMappings,
    BinData,
    FaceName,
    BorderFill,
    CharShape,
    TabDef,
    Numbering,
    Bullet,
    ParaShape,
    Style,
    DocData,
    DistributeDocData,
    CompatibleDocument,
    LayoutCompatibility,
    TrackChange,
    MemoShape,
    ForbiddenChar,

    // BodyText tags (0x42 = 66+)
    ParaHeader,
    ParaText,
    ParaCharShape,
    ParaLineSeg,
    ParaRangeTag,
    CtrlHeader,
    ListHeader,
    PageDef,
    FootnoteShape,
    PageBorderFill,

    // Extended control tags (0x4C = 76+)
    ShapeComponent,
    Table,
    ShapeComponentLine,
    ShapeComponentRectangle,
    ShapeComponentEllipse,
    ShapeComponentArc,
    ShapeComponentPolygon,
    ShapeComponentCurve,
    ShapeComponentOle,
    ShapeComponentPicture,
    ShapeComponentContainer,
    CtrlData,
    EqEdit,

    /// Tag not known to this decoder
    Unknown(u16),
}

impl From<u16> for TagId {
    fn from(value: u16) -> Self {
        match value {
            16 => TagId::DocumentProperties,
            17 => TagId::IdMappings,
            18 => TagId::BinData,
            19 => TagId::FaceName,
            20 => TagId::BorderFill,
            21 => TagId::CharShape,
            22 => TagId::TabDef,
            23 => TagId::Numbering,
            24 => TagId::Bullet,
            25 => TagId::ParaShape,
            26 => TagId::Style,
            27 => TagId::DocData,
            28 => TagId::DistributeDocData,
            30 => TagId::CompatibleDocument,
            31 => TagId::LayoutCompatibility,
            32 => TagId::TrackChange,
            34 => TagId::MemoShape,
            35 => TagId::ForbiddenChar,
            66 => TagId::ParaHeader,
            67 => TagId::ParaText,
            68 => TagId::ParaCharShape,
            69 => TagId::ParaLineSeg,
            70 => TagId::ParaRangeTag,
            71 => TagId::CtrlHeader,
            72 => TagId::ListHeader,
            73 => TagId::PageDef,
            74 => TagId::FootnoteShape,
            75 => TagId::PageBorderFill,
            76 => TagId::ShapeComponent,
            77 => TagId::Table,
            78 => TagId::ShapeComponentLine,
            79 => TagId::ShapeComponentRectangle,
            80 => TagId::ShapeComponentEllipse,
            81 => TagId::ShapeComponentArc,
            82 => TagId::ShapeComponentPolygon,
            83 => TagId::ShapeComponentCurve,
            84 => TagId::ShapeComponentOle,
            85 => TagId::ShapeComponentPicture,
            86 => TagId::ShapeComponentContainer,
            87 => TagId::CtrlData,
            88 => TagId::EqEdit,
            other => TagId::Unknown(other),
        }
    }
}

impl TagId {
    /// Returns the symbolic HWPTAG name.
    pub fn name(&self) -> String {
        let name = match self {
            TagId::DocumentProperties => "DOCUMENT_PROPERTIES",
            TagId::IdMappings => "ID_MAPPINGS",
            TagId::BinData => "BIN_DATA",
            TagId::FaceName => "FACE_NAME",
            TagId::BorderFill => "BORDER_FILL",
            TagId::CharShape => "CHAR_SHAPE",
            TagId::TabDef => "TAB_DEF",
            TagId::Numbering => "NUMBERING",
            TagId::Bullet => "BULLET",
            TagId::ParaShape => "PARA_SHAPE",
            TagId::Style => "STYLE",
            TagId::DocData => "DOC_DATA",
            TagId::DistributeDocData => "DISTRIBUTE_DOC_DATA",
            TagId::CompatibleDocument => "COMPATIBLE_DOCUMENT",
            TagId::LayoutCompatibility => "LAYOUT_COMPATIBILITY",
            TagId::TrackChange => "TRACK_CHANGE",
            TagId::MemoShape => "MEMO_SHAPE",
            TagId::ForbiddenChar => "FORBIDDEN_CHAR",
            TagId::ParaHeader => "PARA_HEADER",
            TagId::ParaText => "PARA_TEXT",
            TagId::ParaCharShape => "PARA_CHAR_SHAPE",
            TagId::ParaLineSeg => "PARA_LINE_SEG",
            TagId::ParaRangeTag => "PARA_RANGE_TAG",
            TagId::CtrlHeader => "CTRL_HEADER",
            TagId::ListHeader => "LIST_HEADER",
            TagId::PageDef => "PAGE_DEF",
            TagId::FootnoteShape => "FOOTNOTE_SHAPE",
            TagId::PageBorderFill => "PAGE_BORDER_FILL",
            TagId::ShapeComponent => "SHAPE_COMPONENT",
            TagId::Table => "TABLE",
            TagId::ShapeComponentLine => "SHAPE_COMPONENT_LINE",
            TagId::ShapeComponentRectangle => "SHAPE_COMPONENT_RECTANGLE",
            TagId::ShapeComponentEllipse => "SHAPE_COMPONENT_ELLIPSE",
            TagId::ShapeComponentArc => "SHAPE_COMPONENT_ARC",
            TagId::ShapeComponentPolygon => "SHAPE_COMPONENT_POLYGON",
            TagId::ShapeComponentCurve => "SHAPE_COMPONENT_CURVE",
            TagId::ShapeComponentOle => "SHAPE_COMPONENT_OLE",
            TagId::ShapeComponentPicture => "SHAPE_COMPONENT_PICTURE",
            TagId::ShapeComponentContainer => "SHAPE_COMPONENT_CONTAINER",
            TagId::CtrlData => "CTRL_DATA",
            TagId::EqEdit => "EQEDIT",
            TagId::Unknown(raw) => return format!("UNKNOWN(0x{raw:04X})"),
        };
        name.to_string()
    }
}

/// Record header structure.
///
/// Layout (32 bits little-endian):
/// - Bits 0-9: Tag ID (0-1023)
/// - Bits 10-19: Level (nesting depth)
/// - Bits 20-31: Size (0-4095, or 0xFFF for extended)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Tag ID identifying the record type
    pub tag_id: u16,
    /// Nesting level
    pub level: u16,
    /// Data size in bytes
    pub size: u32,
}

impl RecordHeader {
    /// Size of a standard record header in bytes.
    pub const SIZE: usize = 4;
    /// Extended size sentinel value.
    pub const EXTENDED_SIZE_SENTINEL: u32 = 0xFFF;

    /// Packs a header word. Sizes of 0xFFF and above must use the extended form.
    pub fn pack(tag_id: u16, level: u16, size: u32) -> u32 {
        (tag_id as u32 & 0x3FF) | ((level as u32 & 0x3FF) << 10) | ((size & 0xFFF) << 20)
    }

    /// Parses a record header from bytes.
    ///
    /// Returns the header and the number of bytes consumed (4 or 8 for extended).
    pub fn parse(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < Self::SIZE {
            return Err(Error::InvalidData("Record header too small".into()));
        }

        let header_value = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);

        let tag_id = (header_value & 0x3FF) as u16;
        let level = ((header_value >> 10) & 0x3FF) as u16;
        let size_field = (header_value >> 20) & 0xFFF;

        let (size, consumed) = if size_field == Self::EXTENDED_SIZE_SENTINEL {
            if data.len() < 8 {
                return Err(Error::InvalidData("Extended record header too small".into()));
            }
            let extended_size = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
            (extended_size, 8)
        } else {
            (size_field, Self::SIZE)
        };

        Ok((
            Self {
                tag_id,
                level,
                size,
            },
            consumed,
        ))
    }

    /// Returns the tag ID as an enum.
    pub fn tag(&self) -> TagId {
        TagId::from(self.tag_id)
    }
}

/// A parsed record with header and data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Record header
    pub header: RecordHeader,
    /// Record data (payload)
    pub data: Vec<u8>,
    /// Offset in the stream where this record starts
    pub offset: u64,
}

impl Record {
    /// Returns the tag ID.
    pub fn tag(&self) -> TagId {
        self.header.tag()
    }

    /// Returns the raw tag ID value.
    pub fn tag_id(&self) -> u16 {
        self.header.tag_id
    }

    /// Returns the nesting level.
    pub fn level(&self) -> u16 {
        self.header.level
    }

    /// Returns the data size.
    pub fn size(&self) -> u32 {
        self.header.size
    }

    /// Returns the record data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn read_u8(&self, offset: usize) -> Option<u8> {
        read_u8(&self.data, offset)
    }

    pub fn read_u16(&self, offset: usize) -> Option<u16> {
        read_u16(&self.data, offset)
    }

    pub fn read_u32(&self, offset: usize) -> Option<u32> {
        read_u32(&self.data, offset)
    }

    pub fn read_i32(&self, offset: usize) -> Option<i32> {
        read_u32(&self.data, offset).map(|v| v as i32)
    }
}

/// Reads a byte at `offset`.
pub(crate) fn read_u8(data: &[u8], offset: usize) -> Option<u8> {
    data.get(offset).copied()
}

/// Reads a little-endian u16 at `offset`.
pub(crate) fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Reads a little-endian u32 at `offset`.
pub(crate) fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Iterator over records in a stream.
///
/// Yields an error for the first malformed record and then stops.
pub struct RecordIterator<'a> {
    data: &'a [u8],
    position: usize,
    failed: bool,
}

impl<'a> RecordIterator<'a> {
    /// Creates a new record iterator.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            failed: false,
        }
    }

    /// Returns the current position in the stream.
    pub fn position(&self) -> usize {
        self.position
    }

    fn fail(&mut self, offset: usize, message: String) -> Option<Result<Record>> {
        self.failed = true;
        Some(Err(Error::RecordParse {
            offset: offset as u64,
            message,
        }))
    }
}

impl<'a> Iterator for RecordIterator<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.data.len() {
            return None;
        }

        let offset = self.position;

        let (header, header_size) = match RecordHeader::parse(&self.data[offset..]) {
            Ok(h) => h,
            Err(e) => return self.fail(offset, e.to_string()),
        };

        let data_start = offset + header_size;
        let remaining = self.data.len() - data_start;
        if header.size as usize > remaining {
            return self.fail(
                offset,
                format!(
                    "Record data exceeds stream bounds: need {} bytes, have {}",
                    header.size, remaining
                ),
            );
        }

        let data_end = data_start + header.size as usize;
        let data = self.data[data_start..data_end].to_vec();
        self.position = data_end;

        Some(Ok(Record {
            header,
            data,
            offset: offset as u64,
        }))
    }
}

/// Decodes a whole stream into its ordered record list.
pub fn read_records(data: &[u8]) -> Result<Vec<Record>> {
    RecordIterator::new(data).collect()
}

/// Returns true if `data` starts with a valid zlib header.
fn has_zlib_header(data: &[u8]) -> bool {
    data.len() >= 2
        && data[0] & 0x0F == 0x08
        && (u16::from(data[0]) << 8 | u16::from(data[1])) % 31 == 0
}

/// Decompresses a stream.
///
/// Streams are normally raw deflate; zlib-wrapped data is accepted as well.
pub fn decompress_stream(data: &[u8]) -> Result<Vec<u8>> {
    if has_zlib_header(data) {
        let mut output = Vec::new();
        match ZlibDecoder::new(data).read_to_end(&mut output) {
            Ok(_) => return Ok(output),
            Err(e) => log::debug!("zlib decoding failed ({e}), retrying as raw deflate"),
        }
    }

    let mut output = Vec::new();
    DeflateDecoder::new(data)
        .read_to_end(&mut output)
        .map_err(|e| Error::Decompression(format!("tried zlib and deflate: {e}")))?;

    Ok(output)
}
