//! DocInfo stream parsing for HWP 5.0.
//!
//! DocInfo contains document-wide definitions for fonts, styles, and
//! embedded binary data. Section records reference these tables by index.

use super::record::{read_u16, read_u32, read_u8, read_records, Record, TagId};
use super::text::decode_utf16le;
use crate::error::Result;

/// Number of language slots in per-language CHAR_SHAPE arrays.
pub const LANG_COUNT: usize = 7;

/// Parsed DocInfo resource tables.
#[derive(Debug, Clone, Default)]
pub struct DocInfo {
    pub properties: Option<DocumentProperties>,
    pub id_mappings: Option<IdMappings>,
    pub bin_data: Vec<BinDataInfo>,
    pub face_names: Vec<FaceName>,
    pub char_shapes: Vec<CharShape>,
    pub para_shapes: Vec<ParaShape>,
    pub styles: Vec<Style>,
}

impl DocInfo {
    /// Parses a decompressed DocInfo stream.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let records = read_records(data)?;
        log::debug!("DocInfo: {} records", records.len());
        Ok(Self::from_records(&records))
    }

    /// Builds the resource tables from decoded records.
    pub fn from_records(records: &[Record]) -> Self {
        let mut info = Self::default();

        for record in records {
            let tag = record.tag();
            let parsed = match tag {
                TagId::DocumentProperties => DocumentProperties::parse(record.data())
                    .map(|p| info.properties = Some(p)),
                TagId::IdMappings => {
                    IdMappings::parse(record.data()).map(|m| info.id_mappings = Some(m))
                }
                TagId::BinData => BinDataInfo::parse(record.data()).map(|b| info.bin_data.push(b)),
                TagId::FaceName => FaceName::parse(record.data()).map(|f| info.face_names.push(f)),
                TagId::CharShape => {
                    CharShape::parse(record.data()).map(|c| info.char_shapes.push(c))
                }
                TagId::ParaShape => {
                    ParaShape::parse(record.data()).map(|p| info.para_shapes.push(p))
                }
                TagId::Style => Style::parse(record.data()).map(|s| info.styles.push(s)),
                TagId::Unknown(raw) => {
                    log::trace!("DocInfo: skipping unknown tag 0x{raw:04X}");
                    Some(())
                }
                _ => Some(()),
            };

            if parsed.is_none() {
                log::debug!(
                    "DocInfo: skipping short {} record ({} bytes at offset {})",
                    tag.name(),
                    record.size(),
                    record.offset
                );
            }
        }

        info
    }

    /// Returns the character shape with the given id.
    pub fn char_shape(&self, id: u32) -> Option<&CharShape> {
        self.char_shapes.get(id as usize)
    }

    /// Returns the paragraph shape with the given id.
    pub fn para_shape(&self, id: u32) -> Option<&ParaShape> {
        self.para_shapes.get(id as usize)
    }

    /// Returns the named style with the given index.
    pub fn style(&self, id: u32) -> Option<&Style> {
        self.styles.get(id as usize)
    }

    /// Returns the font with the given index.
    pub fn face_name(&self, id: u16) -> Option<&FaceName> {
        self.face_names.get(id as usize)
    }

    /// Looks up a binary resource by its storage id.
    pub fn bin_data(&self, id: u16) -> Option<&BinDataInfo> {
        self.bin_data.iter().find(|b| b.id == id)
    }
}

/// HWPTAG_DOCUMENT_PROPERTIES.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentProperties {
    pub section_count: u16,
    pub page_start: u16,
    pub footnote_start: u16,
    pub endnote_start: u16,
    pub picture_start: u16,
    pub table_start: u16,
    pub equation_start: u16,
    pub list_id_count: u32,
    pub para_id_count: u32,
    pub char_unit_location: u32,
}

impl DocumentProperties {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 26 {
            return None;
        }
        Some(Self {
            section_count: read_u16(data, 0)?,
            page_start: read_u16(data, 2)?,
            footnote_start: read_u16(data, 4)?,
            endnote_start: read_u16(data, 6)?,
            picture_start: read_u16(data, 8)?,
            table_start: read_u16(data, 10)?,
            equation_start: read_u16(data, 12)?,
            list_id_count: read_u32(data, 14)?,
            para_id_count: read_u32(data, 18)?,
            char_unit_location: read_u32(data, 22)?,
        })
    }
}

/// HWPTAG_ID_MAPPINGS: declared counts of each resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IdMappings {
    pub bin_data: i32,
    /// Font counts per language: Korean, English, Hanja, Japanese, other, symbol, user
    pub face_names: [i32; LANG_COUNT],
    pub border_fill: i32,
    pub char_shape: i32,
    pub tab_def: i32,
    pub numbering: i32,
    pub bullet: i32,
    pub para_shape: i32,
    pub style: i32,
    pub memo_shape: i32,
    pub track_change: i32,
    pub track_change_author: i32,
}

impl IdMappings {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 72 {
            return None;
        }
        let at = |index: usize| read_u32(data, index * 4).map(|v| v as i32);
        let mut face_names = [0i32; LANG_COUNT];
        for (slot, value) in face_names.iter_mut().enumerate() {
            *value = at(1 + slot)?;
        }
        Some(Self {
            bin_data: at(0)?,
            face_names,
            border_fill: at(8)?,
            char_shape: at(9)?,
            tab_def: at(10)?,
            numbering: at(11)?,
            bullet: at(12)?,
            para_shape: at(13)?,
            style: at(14)?,
            memo_shape: at(15)?,
            track_change: at(16)?,
            track_change_author: at(17)?,
        })
    }

    /// Total number of fonts across all languages.
    pub fn face_name_total(&self) -> i32 {
        self.face_names.iter().sum()
    }
}

/// Storage kind of a binary resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinDataType {
    /// External file referenced by path
    Link,
    /// Embedded in the BinData storage
    Embedding,
    /// OLE storage
    Storage,
    Unknown(u16),
}

impl From<u16> for BinDataType {
    fn from(value: u16) -> Self {
        match value {
            0 => BinDataType::Link,
            1 => BinDataType::Embedding,
            2 => BinDataType::Storage,
            other => BinDataType::Unknown(other),
        }
    }
}

/// HWPTAG_BIN_DATA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinDataInfo {
    pub properties: u16,
    pub kind: BinDataType,
    pub abs_path: String,
    pub rel_path: String,
    /// Id of the stream in the BinData storage
    pub id: u16,
    pub extension: String,
}

impl BinDataInfo {
    pub fn parse(data: &[u8]) -> Option<Self> {
        let properties = read_u16(data, 0)?;
        let mut info = Self {
            properties,
            kind: BinDataType::from(properties & 0x0F),
            abs_path: String::new(),
            rel_path: String::new(),
            id: 0,
            extension: String::new(),
        };

        let mut offset = 2;
        match info.kind {
            BinDataType::Link => {
                if let Some(path) = read_string(data, &mut offset) {
                    info.abs_path = path;
                    info.rel_path = read_string(data, &mut offset).unwrap_or_default();
                }
            }
            BinDataType::Embedding => {
                if let Some(id) = read_u16(data, offset) {
                    info.id = id;
                    offset += 2;
                    info.extension = read_string(data, &mut offset).unwrap_or_default();
                }
            }
            BinDataType::Storage => {
                info.id = read_u16(data, offset).unwrap_or(0);
            }
            BinDataType::Unknown(_) => {}
        }

        Some(info)
    }

    /// Stream name inside the BinData storage (`BIN0001.png`).
    pub fn storage_name(&self) -> Option<String> {
        if self.id == 0 {
            return None;
        }
        Some(if self.extension.is_empty() {
            format!("BIN{:04X}", self.id)
        } else {
            format!("BIN{:04X}.{}", self.id, self.extension)
        })
    }
}

/// HWPTAG_FACE_NAME.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FaceName {
    pub properties: u8,
    pub name: String,
}

impl FaceName {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 3 {
            return None;
        }
        let mut offset = 1;
        Some(Self {
            properties: data[0],
            name: read_string(data, &mut offset)?,
        })
    }
}

/// HWPTAG_CHAR_SHAPE.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharShape {
    pub face_ids: [u16; LANG_COUNT],
    pub ratios: [u8; LANG_COUNT],
    pub spacings: [i8; LANG_COUNT],
    pub relative_sizes: [u8; LANG_COUNT],
    pub offsets: [i8; LANG_COUNT],
    /// Base size in 1/100 pt
    pub height: i32,
    pub attributes: u32,
    pub shadow_gap: (i8, i8),
    pub text_color: u32,
    pub underline_color: u32,
    pub shade_color: u32,
    pub shadow_color: u32,
    pub border_fill_id: Option<u16>,
    pub strike_color: Option<u32>,
}

impl CharShape {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 72 {
            return None;
        }

        let mut shape = Self::default();
        for slot in 0..LANG_COUNT {
            shape.face_ids[slot] = read_u16(data, slot * 2)?;
            shape.ratios[slot] = data[14 + slot];
            shape.spacings[slot] = data[21 + slot] as i8;
            shape.relative_sizes[slot] = data[28 + slot];
            shape.offsets[slot] = data[35 + slot] as i8;
        }
        shape.height = read_u32(data, 42)? as i32;
        shape.attributes = read_u32(data, 46)?;
        shape.shadow_gap = (data[50] as i8, data[51] as i8);
        shape.text_color = read_u32(data, 52)?;
        shape.underline_color = read_u32(data, 56)?;
        shape.shade_color = read_u32(data, 60)?;
        shape.shadow_color = read_u32(data, 64)?;
        shape.border_fill_id = read_u16(data, 68);
        shape.strike_color = read_u32(data, 70);

        Some(shape)
    }

    /// Base size in points.
    pub fn font_size_pt(&self) -> f64 {
        f64::from(self.height) / 100.0
    }

    pub fn is_italic(&self) -> bool {
        self.attributes & 0x01 != 0
    }

    pub fn is_bold(&self) -> bool {
        self.attributes & 0x02 != 0
    }

    pub fn is_underline(&self) -> bool {
        (self.attributes >> 2) & 0x03 != 0
    }

    pub fn is_superscript(&self) -> bool {
        self.attributes & (1 << 15) != 0
    }

    pub fn is_subscript(&self) -> bool {
        self.attributes & (1 << 16) != 0
    }

    pub fn is_strikethrough(&self) -> bool {
        (self.attributes >> 18) & 0x07 != 0
    }

    /// Text color as `#RRGGBB` (stored as 0x00BBGGRR).
    pub fn text_color_hex(&self) -> String {
        let [r, g, b, _] = self.text_color.to_le_bytes();
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

/// Paragraph alignment from PARA_SHAPE attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParaAlignment {
    Justify,
    Left,
    Right,
    Center,
    Distribute,
    Divide,
}

/// Paragraph head (numbering) kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadKind {
    None,
    Outline,
    Numbering,
    Bullet,
}

/// HWPTAG_PARA_SHAPE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParaShape {
    pub attributes1: u32,
    pub left_margin: i32,
    pub right_margin: i32,
    pub indent: i32,
    pub space_before: i32,
    pub space_after: i32,
    pub line_spacing: i32,
    pub tab_def_id: u16,
    pub numbering_id: u16,
    pub border_fill_id: u16,
    /// Left, right, top, bottom border offsets
    pub border_offsets: [i16; 4],
    pub attributes2: u32,
    pub attributes3: u32,
    pub line_wrap: u32,
    pub auto_spacing: Option<u32>,
}

impl ParaShape {
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 54 {
            return None;
        }
        let i32_at = |offset| read_u32(data, offset).map(|v| v as i32);
        let i16_at = |offset| read_u16(data, offset).map(|v| v as i16);
        Some(Self {
            attributes1: read_u32(data, 0)?,
            left_margin: i32_at(4)?,
            right_margin: i32_at(8)?,
            indent: i32_at(12)?,
            space_before: i32_at(16)?,
            space_after: i32_at(20)?,
            line_spacing: i32_at(24)?,
            tab_def_id: read_u16(data, 28)?,
            numbering_id: read_u16(data, 30)?,
            border_fill_id: read_u16(data, 32)?,
            border_offsets: [i16_at(34)?, i16_at(36)?, i16_at(38)?, i16_at(40)?],
            attributes2: read_u32(data, 42)?,
            attributes3: read_u32(data, 46)?,
            line_wrap: read_u32(data, 50)?,
            auto_spacing: read_u32(data, 54),
        })
    }

    pub fn alignment(&self) -> ParaAlignment {
        match (self.attributes1 >> 2) & 0x07 {
            1 => ParaAlignment::Left,
            2 => ParaAlignment::Right,
            3 => ParaAlignment::Center,
            4 => ParaAlignment::Distribute,
            5 => ParaAlignment::Divide,
            _ => ParaAlignment::Justify,
        }
    }

    pub fn head_kind(&self) -> HeadKind {
        match (self.attributes1 >> 23) & 0x03 {
            1 => HeadKind::Outline,
            2 => HeadKind::Numbering,
            3 => HeadKind::Bullet,
            _ => HeadKind::None,
        }
    }

    /// Outline/numbering level, 0-based.
    pub fn head_level(&self) -> u8 {
        ((self.attributes1 >> 25) & 0x07) as u8
    }
}

/// HWPTAG_STYLE.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    pub name: String,
    pub english_name: String,
    pub kind: u8,
    pub next_style_id: u8,
    pub lang_id: i16,
    pub para_shape_id: u16,
    pub char_shape_id: u16,
}

impl Style {
    /// Parses a STYLE record. Trailing fields missing from short records
    /// keep their defaults.
    pub fn parse(data: &[u8]) -> Option<Self> {
        let mut offset = 0;
        let mut style = Self {
            name: read_string(data, &mut offset)?,
            ..Default::default()
        };

        let Some(english_name) = read_string(data, &mut offset) else {
            return Some(style);
        };
        style.english_name = english_name;

        if let Some(kind) = read_u8(data, offset) {
            style.kind = kind;
            offset += 1;
        }
        if let Some(next) = read_u8(data, offset) {
            style.next_style_id = next;
            offset += 1;
        }
        if let Some(lang) = read_u16(data, offset) {
            style.lang_id = lang as i16;
            offset += 2;
        }
        if let Some(para) = read_u16(data, offset) {
            style.para_shape_id = para;
            offset += 2;
        }
        if let Some(chars) = read_u16(data, offset) {
            style.char_shape_id = chars;
        }

        Some(style)
    }

    /// Returns the outline level N for styles named `개요 N` or `Outline N`.
    pub fn outline_level(&self) -> Option<u8> {
        [self.name.as_str(), self.english_name.as_str()]
            .iter()
            .find_map(|name| {
                let rest = name
                    .strip_prefix("개요")
                    .or_else(|| name.strip_prefix("Outline"))?;
                rest.trim().parse::<u8>().ok()
            })
            .filter(|level| (1..=10).contains(level))
    }
}

/// Reads a WCHAR-length-prefixed UTF-16LE string and advances `offset`.
fn read_string(data: &[u8], offset: &mut usize) -> Option<String> {
    let len = read_u16(data, *offset)? as usize;
    let start = *offset + 2;
    let bytes = data.get(start..start + len * 2)?;
    *offset = start + len * 2;
    Some(decode_utf16le(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwp5::record::RecordHeader;

    fn utf16(s: &str) -> Vec<u8> {
        let units: Vec<u16> = s.encode_utf16().collect();
        let mut out = (units.len() as u16).to_le_bytes().to_vec();
        out.extend(units.iter().flat_map(|u| u.to_le_bytes()));
        out
    }

    fn record(tag: u16, data: Vec<u8>) -> Record {
        Record {
            header: RecordHeader {
                tag_id: tag,
                level: 0,
                size: data.len() as u32,
            },
            data,
            offset: 0,
        }
    }

    fn char_shape_bytes(height: i32, attributes: u32) -> Vec<u8> {
        let mut data = vec![0u8; 72];
        data[0..2].copy_from_slice(&3u16.to_le_bytes());
        data[14] = 100;
        data[21] = (-5i8) as u8;
        data[42..46].copy_from_slice(&height.to_le_bytes());
        data[46..50].copy_from_slice(&attributes.to_le_bytes());
        data[52..56].copy_from_slice(&0x00FF_8000u32.to_le_bytes());
        data
    }

    #[test]
    fn test_document_properties() {
        let mut data = vec![0u8; 26];
        data[0..2].copy_from_slice(&2u16.to_le_bytes());
        data[2..4].copy_from_slice(&1u16.to_le_bytes());
        let props = DocumentProperties::parse(&data).unwrap();
        assert_eq!(props.section_count, 2);
        assert_eq!(props.page_start, 1);
        assert!(DocumentProperties::parse(&data[..25]).is_none());
    }

    #[test]
    fn test_id_mappings() {
        let data: Vec<u8> = (0..18i32).flat_map(|v| v.to_le_bytes()).collect();
        let mappings = IdMappings::parse(&data).unwrap();
        assert_eq!(mappings.bin_data, 0);
        assert_eq!(mappings.face_names, [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(mappings.face_name_total(), 28);
        assert_eq!(mappings.char_shape, 9);
        assert_eq!(mappings.track_change_author, 17);
    }

    #[test]
    fn test_char_shape() {
        let shape = CharShape::parse(&char_shape_bytes(1000, 0b10)).unwrap();
        assert_eq!(shape.face_ids[0], 3);
        assert_eq!(shape.ratios[0], 100);
        assert_eq!(shape.spacings[0], -5);
        assert_eq!(shape.font_size_pt(), 10.0);
        assert!(shape.is_bold());
        assert!(!shape.is_italic());
        assert_eq!(shape.text_color_hex(), "#0080FF");
        assert_eq!(shape.border_fill_id, None);
        assert!(CharShape::parse(&[0u8; 71]).is_none());
    }

    #[test]
    fn test_char_shape_attributes() {
        let attrs = 0x01 | (1 << 2) | (1 << 15) | (2 << 18);
        let shape = CharShape::parse(&char_shape_bytes(1200, attrs)).unwrap();
        assert!(shape.is_italic());
        assert!(shape.is_underline());
        assert!(shape.is_superscript());
        assert!(!shape.is_subscript());
        assert!(shape.is_strikethrough());
    }

    #[test]
    fn test_para_shape() {
        let mut data = vec![0u8; 58];
        let attr1: u32 = (3 << 2) | (1 << 23) | (2 << 25);
        data[0..4].copy_from_slice(&attr1.to_le_bytes());
        data[12..16].copy_from_slice(&(-400i32).to_le_bytes());
        let shape = ParaShape::parse(&data).unwrap();
        assert_eq!(shape.alignment(), ParaAlignment::Center);
        assert_eq!(shape.head_kind(), HeadKind::Outline);
        assert_eq!(shape.head_level(), 2);
        assert_eq!(shape.indent, -400);
        assert_eq!(shape.auto_spacing, Some(0));
        assert!(ParaShape::parse(&data[..53]).is_none());
    }

    #[test]
    fn test_bin_data_embedding() {
        let mut data = 1u16.to_le_bytes().to_vec();
        data.extend_from_slice(&1u16.to_le_bytes());
        data.extend(utf16("png"));
        let info = BinDataInfo::parse(&data).unwrap();
        assert_eq!(info.kind, BinDataType::Embedding);
        assert_eq!(info.id, 1);
        assert_eq!(info.storage_name().as_deref(), Some("BIN0001.png"));
    }

    #[test]
    fn test_bin_data_link_and_storage() {
        let mut data = 0u16.to_le_bytes().to_vec();
        data.extend(utf16("C:\\img\\a.jpg"));
        data.extend(utf16("img\\a.jpg"));
        let link = BinDataInfo::parse(&data).unwrap();
        assert_eq!(link.kind, BinDataType::Link);
        assert_eq!(link.abs_path, "C:\\img\\a.jpg");
        assert_eq!(link.rel_path, "img\\a.jpg");
        assert_eq!(link.storage_name(), None);

        let mut data = 2u16.to_le_bytes().to_vec();
        data.extend_from_slice(&0x1Au16.to_le_bytes());
        let storage = BinDataInfo::parse(&data).unwrap();
        assert_eq!(storage.kind, BinDataType::Storage);
        assert_eq!(storage.storage_name().as_deref(), Some("BIN001A"));
    }

    #[test]
    fn test_face_name() {
        let mut data = vec![0x80];
        data.extend(utf16("함초롬바탕"));
        assert_eq!(FaceName::parse(&data).unwrap().name, "함초롬바탕");
        assert!(FaceName::parse(&[0, 1]).is_none());
    }

    #[test]
    fn test_style() {
        let mut data = utf16("개요 1");
        data.extend(utf16("Outline 1"));
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&0x0412u16.to_le_bytes());
        data.extend_from_slice(&5u16.to_le_bytes());
        data.extend_from_slice(&7u16.to_le_bytes());
        let style = Style::parse(&data).unwrap();
        assert_eq!(style.name, "개요 1");
        assert_eq!(style.para_shape_id, 5);
        assert_eq!(style.char_shape_id, 7);
        assert_eq!(style.outline_level(), Some(1));

        let partial = Style::parse(&utf16("바탕글")).unwrap();
        assert_eq!(partial.name, "바탕글");
        assert_eq!(partial.outline_level(), None);
    }

    #[test]
    fn test_from_records_skips_short_and_unknown() {
        let mut bin = 1u16.to_le_bytes().to_vec();
        bin.extend_from_slice(&2u16.to_le_bytes());
        bin.extend(utf16("jpg"));

        let records = vec![
            record(21, vec![0u8; 10]),
            record(21, char_shape_bytes(1000, 0)),
            record(0x3F0, vec![1, 2, 3]),
            record(18, bin),
            record(25, vec![0u8; 54]),
        ];
        let info = DocInfo::from_records(&records);
        assert_eq!(info.char_shapes.len(), 1);
        assert_eq!(info.para_shapes.len(), 1);
        assert_eq!(info.bin_data(2).unwrap().extension, "jpg");
        assert!(info.bin_data(1).is_none());
        assert!(info.char_shape(0).is_some());
        assert!(info.char_shape(1).is_none());
    }
}
