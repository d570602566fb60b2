//! PARA_TEXT decoding.
//!
//! Paragraph text is a sequence of UTF-16LE code units. Units below 0x20 are
//! control characters; most of them carry a 14-byte payload (7 more code
//! units) that has to be skipped exactly.

/// Control characters in HWP text.
pub mod control_char {
    /// Section/column definition anchor
    pub const SECTION_DEF: u16 = 0x0002;
    /// Field start
    pub const FIELD_START: u16 = 0x0003;
    /// Field end
    pub const FIELD_END: u16 = 0x0004;
    /// Bookmark
    pub const BOOKMARK: u16 = 0x0005;
    /// Title mark
    pub const TITLE_MARK: u16 = 0x0006;
    /// Tab
    pub const TAB: u16 = 0x0009;
    /// Line break (soft return)
    pub const LINE_BREAK: u16 = 0x000A;
    /// Drawing object or table anchor
    pub const DRAWING_OBJECT: u16 = 0x000B;
    /// Inline object start
    pub const INLINE_START: u16 = 0x000C;
    /// Paragraph break
    pub const PARA_BREAK: u16 = 0x000D;
    /// Footnote/endnote anchor
    pub const FOOTNOTE: u16 = 0x0011;
    /// Extended character
    pub const EXT_CHAR: u16 = 0x0014;
    /// Hyphen
    pub const HYPHEN: u16 = 0x001E;
    /// Non-breaking space
    pub const NBSP: u16 = 0x0018;
    /// Fixed-width space
    pub const FIXED_SPACE: u16 = 0x001F;

    /// Returns true for controls followed by a 14-byte payload.
    ///
    /// Extended controls are 1-3, 11-18 and 21-23; inline controls are 4-9
    /// and 19-20. Everything else below 0x20 occupies a single unit.
    pub fn has_payload(unit: u16) -> bool {
        matches!(unit, 1..=9 | 11..=23) && unit != 0x000D
    }
}

/// Bytes following a control character that carries a payload.
pub const CONTROL_PAYLOAD_SIZE: usize = 14;

/// An inline object anchored in paragraph text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInfo {
    /// Control character code
    pub kind: u16,
    /// First 4 payload bytes, normally the control id (`tbl `, `gso `, ...)
    pub id: u32,
    /// Character offset in the decoded text
    pub offset: usize,
}

impl ControlInfo {
    /// Returns true if the anchor points at the given control id.
    pub fn is(&self, ctrl_id: u32) -> bool {
        self.id == ctrl_id
    }
}

/// Decodes PARA_TEXT payload into plain text.
pub fn decode_text(data: &[u8]) -> String {
    decode(data, None)
}

/// Decodes PARA_TEXT payload, also collecting inline control anchors.
pub fn decode_text_with_controls(data: &[u8]) -> (String, Vec<ControlInfo>) {
    let mut controls = Vec::new();
    let text = decode(data, Some(&mut controls));
    (text, controls)
}

fn decode(data: &[u8], mut controls: Option<&mut Vec<ControlInfo>>) -> String {
    let mut text = String::with_capacity(data.len() / 2);
    let mut chars = 0usize;
    let mut i = 0;

    while i + 1 < data.len() {
        let unit = u16::from_le_bytes([data[i], data[i + 1]]);
        i += 2;

        if unit >= 0x20 {
            let ch = if (0xD800..0xDC00).contains(&unit) {
                match low_surrogate(data, i) {
                    Some(low) => {
                        i += 2;
                        decode_pair(unit, low)
                    }
                    None => char::REPLACEMENT_CHARACTER,
                }
            } else {
                char::from_u32(unit as u32).unwrap_or(char::REPLACEMENT_CHARACTER)
            };
            text.push(ch);
            chars += 1;
            continue;
        }

        if control_char::has_payload(unit) {
            if i + CONTROL_PAYLOAD_SIZE > data.len() {
                log::debug!("truncated control 0x{unit:04X} payload at byte {}", i - 2);
                break;
            }
            if unit == control_char::TAB {
                text.push('\t');
                chars += 1;
            } else if let Some(controls) = controls.as_deref_mut() {
                controls.push(ControlInfo {
                    kind: unit,
                    id: u32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]),
                    offset: chars,
                });
            }
            i += CONTROL_PAYLOAD_SIZE;
            continue;
        }

        let substitute = match unit {
            control_char::LINE_BREAK => '\n',
            control_char::HYPHEN => '-',
            control_char::NBSP | control_char::FIXED_SPACE => ' ',
            _ => continue,
        };
        text.push(substitute);
        chars += 1;
    }

    text
}

fn low_surrogate(data: &[u8], at: usize) -> Option<u16> {
    let bytes = data.get(at..at + 2)?;
    let unit = u16::from_le_bytes([bytes[0], bytes[1]]);
    (0xDC00..0xE000).contains(&unit).then_some(unit)
}

fn decode_pair(high: u16, low: u16) -> char {
    char::decode_utf16([high, low])
        .next()
        .and_then(|r| r.ok())
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Splits PARA_TEXT payload at character-shape boundaries.
///
/// `shapes` holds (position in code units, char shape id) pairs as stored
/// in PARA_CHAR_SHAPE. Returns the decoded text of each segment with its
/// shape id; empty segments are dropped.
pub fn decode_runs(data: &[u8], shapes: &[(u32, u32)]) -> Vec<(String, u32)> {
    let mut runs = Vec::new();
    let units = data.len() / 2;

    for (index, &(start, shape_id)) in shapes.iter().enumerate() {
        let start = (start as usize).min(units);
        let end = shapes
            .get(index + 1)
            .map_or(units, |&(next, _)| (next as usize).clamp(start, units));
        let text = decode_text(&data[start * 2..end * 2]);
        if !text.is_empty() {
            runs.push((text, shape_id));
        }
    }

    runs
}

/// Decodes a UTF-16LE string, dropping trailing NULs.
pub fn decode_utf16le(data: &[u8]) -> String {
    let units: Vec<u16> = data
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let end = units.iter().rposition(|&u| u != 0).map_or(0, |i| i + 1);
    String::from_utf16_lossy(&units[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn control(code: u16, id: &[u8; 4]) -> Vec<u8> {
        let mut out = code.to_le_bytes().to_vec();
        out.extend_from_slice(id);
        out.extend_from_slice(&[0u8; 8]);
        out.extend_from_slice(&code.to_le_bytes());
        out
    }

    #[test]
    fn test_ascii() {
        assert_eq!(decode_text(&[0x54, 0x00, 0x65, 0x00, 0x73, 0x00, 0x74, 0x00]), "Test");
    }

    #[test]
    fn test_korean() {
        assert_eq!(decode_text(&[0x4C, 0xD1, 0xA4, 0xC2, 0xB8, 0xD2]), "테스트");
    }

    #[test]
    fn test_substitutions() {
        let data = units(&[
            'A' as u16, 0x0A, 'B' as u16, 0x1E, 'C' as u16, 0x18, 'D' as u16, 0x1F, 0x0D,
        ]);
        assert_eq!(decode_text(&data), "A\nB-C D ");
    }

    #[test]
    fn test_tab_consumes_payload() {
        let mut data = units(&['a' as u16]);
        data.extend(control(control_char::TAB, b"\x00\x00\x00\x00"));
        data.extend(units(&['b' as u16]));
        assert_eq!(decode_text(&data), "a\tb");
    }

    #[test]
    fn test_payload_skip_width() {
        for code in [1u16, 2, 3, 4, 5, 6, 7, 8, 11, 12, 15, 17, 19, 20, 21, 23] {
            let mut data = units(&['x' as u16]);
            data.extend(control(code, b"abcd"));
            data.extend(units(&['y' as u16]));
            assert_eq!(decode_text(&data), "xy", "control 0x{code:02X}");
        }
    }

    #[test]
    fn test_single_unit_controls() {
        let data = units(&[0x00, 'a' as u16, 0x0D, 'b' as u16, 0x19]);
        assert_eq!(decode_text(&data), "ab");
    }

    #[test]
    fn test_length_matches_printable_units() {
        let mut data = units(&['가' as u16, '나' as u16]);
        data.extend(control(control_char::DRAWING_OBJECT, b" lbt"));
        data.extend(units(&['다' as u16, 0x0D]));
        data.extend(control(control_char::FIELD_START, b"%hlk"));
        data.extend(units(&['라' as u16]));

        let text = decode_text(&data);
        assert_eq!(text, "가나다라");
        assert_eq!(text.chars().count(), 4);
    }

    #[test]
    fn test_controls_recorded() {
        let mut data = units(&['표' as u16, ':' as u16]);
        data.extend(control(control_char::DRAWING_OBJECT, b" lbt"));
        data.extend(units(&['끝' as u16]));

        let (text, controls) = decode_text_with_controls(&data);
        assert_eq!(text, "표:끝");
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].kind, control_char::DRAWING_OBJECT);
        assert_eq!(controls[0].id, u32::from_le_bytes(*b" lbt"));
        assert_eq!(controls[0].offset, 2);
    }

    #[test]
    fn test_truncated_payload_stops() {
        let mut data = units(&['a' as u16, control_char::DRAWING_OBJECT]);
        data.extend_from_slice(&[b'z', 0, b'z', 0]);
        assert_eq!(decode_text(&data), "a");
    }

    #[test]
    fn test_surrogate_pair() {
        let data = units(&[0xD83D, 0xDE00, '!' as u16]);
        assert_eq!(decode_text(&data), "😀!");
        assert_eq!(decode_text(&units(&[0xD83D, 'a' as u16])), "\u{FFFD}a");
    }

    #[test]
    fn test_odd_trailing_byte_ignored() {
        assert_eq!(decode_text(&[0x41, 0x00, 0x42]), "A");
    }

    #[test]
    fn test_decode_runs() {
        let mut data = units(&['볼' as u16, '드' as u16]);
        data.extend(control(control_char::DRAWING_OBJECT, b"gso "));
        data.extend(units(&['보' as u16, '통' as u16, 0x0D]));

        // Control occupies 8 code units: positions 2..10
        let runs = decode_runs(&data, &[(0, 3), (2, 7), (10, 1)]);
        assert_eq!(runs, vec![("볼드".to_string(), 3), ("보통".to_string(), 1)]);
    }

    #[test]
    fn test_decode_utf16le() {
        assert_eq!(decode_utf16le(&units(&['H' as u16, 'i' as u16, 0, 0])), "Hi");
        assert_eq!(decode_utf16le(&[]), "");
    }
}
