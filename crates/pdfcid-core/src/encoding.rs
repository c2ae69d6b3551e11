//! PDFDocEncoding and the single-byte conversion used by symbolic fonts.
//!
//! Symbolic (font-specific) TrueType programs address their glyphs with
//! single-byte codes, usually published in the `0xF000`–`0xF0FF` private-use
//! block. Text for such fonts is reduced to bytes before glyph lookup.

/// The PDFDocEncoding byte-to-character table.
///
/// Holds one entry per byte value; undefined codes fall back to `'?'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfDocEncoding {
    table: [char; 256],
}

impl PdfDocEncoding {
    /// Build the full 256-entry table.
    pub fn new() -> Self {
        let mut table = ['?'; 256];
        for (byte, slot) in table.iter_mut().enumerate() {
            if let Some(ch) = PDF_DOC_TABLE[byte] {
                *slot = ch;
            }
        }
        Self { table }
    }

    /// Character for a byte code.
    pub fn decode(&self, byte: u8) -> char {
        self.table[byte as usize]
    }

    /// Byte code for a character, if the encoding defines one.
    pub fn encode(&self, ch: char) -> Option<u8> {
        if ch == '?' {
            return Some(b'?');
        }
        self.table
            .iter()
            .position(|&c| c == ch)
            .map(|pos| pos as u8)
    }

    /// Byte for one character under the symbolic conversion rule.
    ///
    /// Characters in `U+0000..=U+00FF` or `U+F000..=U+F0FF` map to their
    /// low byte; anything else goes through the PDFDocEncoding table.
    pub fn symbol_byte(&self, ch: char) -> Option<u8> {
        let c = ch as u32;
        if c & 0xFF00 == 0 || c & 0xFF00 == 0xF000 {
            return Some((c & 0xFF) as u8);
        }
        if c > 0xFFFF {
            return None;
        }
        self.encode(ch)
    }
}

impl Default for PdfDocEncoding {
    fn default() -> Self {
        Self::new()
    }
}

/// PDFDocEncoding (PDF 32000-1 Annex D.2).
///
/// 0x00–0x17 pass through as control characters, 0x18–0x1F are spacing
/// diacritics, 0x80–0xA0 hold typographic punctuation and 0xA1–0xFF follow
/// Latin-1. 0x7F, 0x9F and 0xAD are undefined.
static PDF_DOC_TABLE: [Option<char>; 256] = {
    let mut t = [None; 256];
    let mut i = 0;
    while i < 0x18 {
        t[i] = Some(i as u8 as char);
        i += 1;
    }
    t[0x18] = Some('\u{02D8}');
    t[0x19] = Some('\u{02C7}');
    t[0x1A] = Some('\u{02C6}');
    t[0x1B] = Some('\u{02D9}');
    t[0x1C] = Some('\u{02DD}');
    t[0x1D] = Some('\u{02DB}');
    t[0x1E] = Some('\u{02DA}');
    t[0x1F] = Some('\u{02DC}');
    let mut i = 0x20;
    while i < 0x7F {
        t[i] = Some(i as u8 as char);
        i += 1;
    }
    t[0x80] = Some('\u{2022}');
    t[0x81] = Some('\u{2020}');
    t[0x82] = Some('\u{2021}');
    t[0x83] = Some('\u{2026}');
    t[0x84] = Some('\u{2014}');
    t[0x85] = Some('\u{2013}');
    t[0x86] = Some('\u{0192}');
    t[0x87] = Some('\u{2044}');
    t[0x88] = Some('\u{2039}');
    t[0x89] = Some('\u{203A}');
    t[0x8A] = Some('\u{2212}');
    t[0x8B] = Some('\u{2030}');
    t[0x8C] = Some('\u{201E}');
    t[0x8D] = Some('\u{201C}');
    t[0x8E] = Some('\u{201D}');
    t[0x8F] = Some('\u{2018}');
    t[0x90] = Some('\u{2019}');
    t[0x91] = Some('\u{201A}');
    t[0x92] = Some('\u{2122}');
    t[0x93] = Some('\u{FB01}');
    t[0x94] = Some('\u{FB02}');
    t[0x95] = Some('\u{0141}');
    t[0x96] = Some('\u{0152}');
    t[0x97] = Some('\u{0160}');
    t[0x98] = Some('\u{0178}');
    t[0x99] = Some('\u{017D}');
    t[0x9A] = Some('\u{0131}');
    t[0x9B] = Some('\u{0142}');
    t[0x9C] = Some('\u{0153}');
    t[0x9D] = Some('\u{0161}');
    t[0x9E] = Some('\u{017E}');
    t[0xA0] = Some('\u{20AC}');
    let mut i = 0xA1;
    while i <= 0xFF {
        if i != 0xAD {
            t[i] = Some(i as u8 as char);
        }
        i += 1;
    }
    t
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_identity() {
        let enc = PdfDocEncoding::new();
        assert_eq!(enc.decode(b'A'), 'A');
        assert_eq!(enc.encode('z'), Some(b'z'));
    }

    #[test]
    fn undefined_codes_decode_to_question_mark() {
        let enc = PdfDocEncoding::new();
        assert_eq!(enc.decode(0x7F), '?');
        assert_eq!(enc.decode(0x9F), '?');
        assert_eq!(enc.decode(0xAD), '?');
    }

    #[test]
    fn punctuation_block() {
        let enc = PdfDocEncoding::new();
        assert_eq!(enc.decode(0x80), '\u{2022}');
        assert_eq!(enc.decode(0xA0), '\u{20AC}');
        assert_eq!(enc.encode('\u{20AC}'), Some(0xA0));
    }

    #[test]
    fn symbol_byte_private_use_block() {
        let enc = PdfDocEncoding::new();
        assert_eq!(enc.symbol_byte('\u{F041}'), Some(0x41));
        assert_eq!(enc.symbol_byte('A'), Some(0x41));
        assert_eq!(enc.symbol_byte('\u{2022}'), Some(0x80));
        assert_eq!(enc.symbol_byte('\u{4E2D}'), None);
        assert_eq!(enc.symbol_byte('\u{1F600}'), None);
    }
}
