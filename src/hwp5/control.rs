//! Control records for HWP 5.0 (tables, cells, drawing objects).

use super::record::{read_u16, read_u32, Record};

/// Control types identified by 4-character codes.
///
/// The code is stored as a little-endian u32, so `tbl ` appears in the
/// stream as the bytes ` lbt`.
pub mod ctrl_id {
    /// Section definition
    pub const SECD: u32 = u32::from_le_bytes(*b"dces");
    /// Column definition
    pub const COLD: u32 = u32::from_le_bytes(*b"dloc");
    /// Table
    pub const TBL: u32 = u32::from_le_bytes(*b" lbt");
    /// Generic drawing object
    pub const GSO: u32 = u32::from_le_bytes(*b" osg");
    /// Equation editor
    pub const EQED: u32 = u32::from_le_bytes(*b"deqe");
    /// Header
    pub const HEADER: u32 = u32::from_le_bytes(*b"daeh");
    /// Footer
    pub const FOOTER: u32 = u32::from_le_bytes(*b"toof");
    /// Footnote
    pub const FN: u32 = u32::from_le_bytes(*b"  nf");
    /// Endnote
    pub const EN: u32 = u32::from_le_bytes(*b"  ne");
    /// Auto number
    pub const ATNO: u32 = u32::from_le_bytes(*b"onta");
    /// New number
    pub const NWNO: u32 = u32::from_le_bytes(*b"onwn");
    /// Page number position
    pub const PGNP: u32 = u32::from_le_bytes(*b"pngp");
    /// Bookmark
    pub const BOKM: u32 = u32::from_le_bytes(*b"mkob");
    /// Hyperlink field
    pub const HLK: u32 = u32::from_le_bytes(*b"klh%");
}

/// Returns the 4-byte control id of a CTRL_HEADER record.
pub fn read_ctrl_id(record: &Record) -> Option<u32> {
    record.read_u32(0)
}

/// Returns the readable form of a control id (`tbl `, `gso `, ...).
pub fn ctrl_id_name(id: u32) -> String {
    id.to_be_bytes()
        .iter()
        .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
        .collect()
}

/// Returns true if the record is a CTRL_HEADER for the given control.
///
/// Some writers store the code in reading order, so both byte orders match.
pub fn is_ctrl(record: &Record, id: u32) -> bool {
    read_ctrl_id(record).is_some_and(|found| found == id || found == id.swap_bytes())
}

/// TABLE record properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableProps {
    pub properties: u32,
    pub rows: u16,
    pub cols: u16,
    pub cell_spacing: i16,
    /// Left, right, top, bottom inner margins
    pub margins: [i16; 4],
}

impl TableProps {
    /// Parses a TABLE record payload. Returns `None` below 18 bytes.
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < 18 {
            return None;
        }
        let i16_at = |offset| read_u16(data, offset).map(|v| v as i16);
        Some(Self {
            properties: read_u32(data, 0)?,
            rows: read_u16(data, 4)?,
            cols: read_u16(data, 6)?,
            cell_spacing: i16_at(8)?,
            margins: [i16_at(10)?, i16_at(12)?, i16_at(14)?, i16_at(16)?],
        })
    }
}

/// Cell properties carried by a cell LIST_HEADER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellProps {
    pub col: u16,
    pub row: u16,
    pub col_span: u16,
    pub row_span: u16,
    pub width: u32,
    pub height: u32,
}

impl Default for CellProps {
    fn default() -> Self {
        Self {
            col: 0,
            row: 0,
            col_span: 1,
            row_span: 1,
            width: 0,
            height: 0,
        }
    }
}

impl CellProps {
    /// Parses a cell LIST_HEADER payload. Missing or zero spans become 1.
    pub fn parse(data: &[u8]) -> Self {
        let span = |offset| read_u16(data, offset).filter(|&v| v > 0).unwrap_or(1);
        Self {
            col: read_u16(data, 8).unwrap_or(0),
            row: read_u16(data, 10).unwrap_or(0),
            col_span: span(12),
            row_span: span(14),
            width: read_u32(data, 16).unwrap_or(0),
            height: read_u32(data, 20).unwrap_or(0),
        }
    }
}

/// Size of a drawing object from its CTRL_HEADER common properties,
/// in HWPUNIT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectSize {
    pub width: u32,
    pub height: u32,
}

impl ObjectSize {
    pub fn parse(record: &Record) -> Option<Self> {
        Some(Self {
            width: record.read_u32(16)?,
            height: record.read_u32(20)?,
        })
    }
}

/// Offset of the BinData id inside SHAPE_COMPONENT_PICTURE.
const PICTURE_BIN_DATA_OFFSET: usize = 71;

/// Returns the BinData id referenced by a SHAPE_COMPONENT_PICTURE record.
pub fn picture_bin_data_id(record: &Record) -> Option<u16> {
    record.read_u16(PICTURE_BIN_DATA_OFFSET)
}

/// HWPUNIT per pixel at 96 DPI (7200 HWPUNIT per inch).
pub const HWPUNIT_PER_PIXEL: u32 = 75;

/// Converts HWPUNIT to pixels.
pub fn hwpunit_to_px(value: u32) -> u32 {
    value / HWPUNIT_PER_PIXEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hwp5::record::RecordHeader;

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

    #[test]
    fn test_ctrl_id_byte_order() {
        let ctrl = record(71, b" lbt\0\0\0\0".to_vec());
        assert!(is_ctrl(&ctrl, ctrl_id::TBL));
        assert!(!is_ctrl(&ctrl, ctrl_id::GSO));
        assert!(is_ctrl(&record(71, b"tbl ".to_vec()), ctrl_id::TBL));
        assert_eq!(ctrl_id_name(ctrl_id::TBL), "tbl ");
        assert_eq!(ctrl_id_name(ctrl_id::SECD), "secd");
        assert_eq!(ctrl_id_name(ctrl_id::HLK), "%hlk");
    }

    #[test]
    fn test_table_props() {
        let mut data = vec![0u8; 18];
        data[4..6].copy_from_slice(&3u16.to_le_bytes());
        data[6..8].copy_from_slice(&4u16.to_le_bytes());
        data[10..12].copy_from_slice(&(-2i16).to_le_bytes());
        let props = TableProps::parse(&data).unwrap();
        assert_eq!((props.rows, props.cols), (3, 4));
        assert_eq!(props.margins[0], -2);
        assert!(TableProps::parse(&data[..17]).is_none());
    }

    #[test]
    fn test_cell_props_spans() {
        let mut data = vec![0u8; 24];
        data[8..10].copy_from_slice(&1u16.to_le_bytes());
        data[12..14].copy_from_slice(&2u16.to_le_bytes());
        let props = CellProps::parse(&data);
        assert_eq!(props.col, 1);
        assert_eq!(props.col_span, 2);
        assert_eq!(props.row_span, 1);

        assert_eq!(CellProps::parse(&[]), CellProps::default());
    }

    #[test]
    fn test_picture_and_size() {
        let mut pic = vec![0u8; 73];
        pic[71..73].copy_from_slice(&7u16.to_le_bytes());
        assert_eq!(picture_bin_data_id(&record(85, pic)), Some(7));
        assert_eq!(picture_bin_data_id(&record(85, vec![0u8; 72])), None);

        let mut gso = b" osg".to_vec();
        gso.resize(24, 0);
        gso[16..20].copy_from_slice(&7200u32.to_le_bytes());
        gso[20..24].copy_from_slice(&3600u32.to_le_bytes());
        let size = ObjectSize::parse(&record(71, gso)).unwrap();
        assert_eq!(hwpunit_to_px(size.width), 96);
        assert_eq!(hwpunit_to_px(size.height), 48);
    }
}
