//! Byte-to-text decoding for indexed files.
//!
//! Valid UTF-8 passes through untouched. Anything else is read as Windows-1252,
//! which is a heuristic rather than a detector: a binary file that happens to be
//! valid UTF-8 is treated as text, and a file in some other legacy encoding is
//! still decoded through the Windows-1252 table.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEncoding {
    Utf8,
    Windows1252,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub encoding: TextEncoding,
}

/// Decode raw file bytes into text. Total over every input.
pub fn normalize(bytes: Vec<u8>) -> NormalizedText {
    match String::from_utf8(bytes) {
        Ok(text) => NormalizedText {
            text,
            encoding: TextEncoding::Utf8,
        },
        Err(err) => NormalizedText {
            text: decode_windows1252(err.as_bytes()),
            encoding: TextEncoding::Windows1252,
        },
    }
}

pub fn decode_windows1252(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| windows1252_char(b)).collect()
}

/// Windows-1252 differs from Latin-1 only in 0x80..=0x9F. The five positions
/// the codepage leaves undefined (0x81, 0x8D, 0x8F, 0x90, 0x9D) fall through to
/// the C1 control with the same value.
const fn windows1252_char(b: u8) -> char {
    match b {
        0x80 => '\u{20AC}',
        0x82 => '\u{201A}',
        0x83 => '\u{0192}',
        0x84 => '\u{201E}',
        0x85 => '\u{2026}',
        0x86 => '\u{2020}',
        0x87 => '\u{2021}',
        0x88 => '\u{02C6}',
        0x89 => '\u{2030}',
        0x8A => '\u{0160}',
        0x8B => '\u{2039}',
        0x8C => '\u{0152}',
        0x8E => '\u{017D}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x98 => '\u{02DC}',
        0x99 => '\u{2122}',
        0x9A => '\u{0161}',
        0x9B => '\u{203A}',
        0x9C => '\u{0153}',
        0x9E => '\u{017E}',
        0x9F => '\u{0178}',
        other => other as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn utf8_input_is_returned_unchanged() {
        let samples = [
            "",
            "fn main() {}\n",
            "naïve café — “quotes” €",
            "日本語のコメント\r\n",
        ];
        for sample in samples {
            let out = normalize(sample.as_bytes().to_vec());
            assert_eq!(out.text, sample);
            assert_eq!(out.encoding, TextEncoding::Utf8);
        }
    }

    #[test]
    fn legacy_bytes_use_windows1252_table() {
        let cases: &[(&[u8], &str)] = &[
            (b"\x80", "\u{20AC}"),
            (b"\x93quoted\x94", "\u{201C}quoted\u{201D}"),
            (b"wait\x85", "wait\u{2026}"),
            (b"\xA9 2024", "\u{00A9} 2024"),
            (b"caf\xE9", "caf\u{00E9}"),
        ];
        for (input, expected) in cases {
            let out = normalize(input.to_vec());
            assert_eq!(out.text, *expected);
            assert_eq!(out.encoding, TextEncoding::Windows1252);
        }
    }

    #[test]
    fn bytes_outside_c1_range_map_to_same_code_point() {
        let bytes: Vec<u8> = (0u8..=0xFF).filter(|b| !(0x80..=0x9F).contains(b)).collect();
        let text = decode_windows1252(&bytes);
        let decoded: Vec<u32> = text.chars().map(|c| c as u32).collect();
        let expected: Vec<u32> = bytes.iter().map(|&b| u32::from(b)).collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn undefined_c1_positions_pass_through() {
        let text = decode_windows1252(&[0x81, 0x8D, 0x8F, 0x90, 0x9D]);
        let decoded: Vec<u32> = text.chars().map(|c| c as u32).collect();
        assert_eq!(decoded, vec![0x81, 0x8D, 0x8F, 0x90, 0x9D]);
    }

    #[test]
    fn table_covers_all_27_defined_positions() {
        let remapped = (0x80u8..=0x9F)
            .filter(|&b| windows1252_char(b) as u32 != u32::from(b))
            .count();
        assert_eq!(remapped, 27);
    }
}
