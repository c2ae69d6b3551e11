//! Text → glyphs → font codes.

use pdfcid_core::{Glyph, GlyphLine};

use super::CompositeFontEncoder;

impl CompositeFontEncoder {
    /// Glyph for a Unicode scalar value.
    ///
    /// Falls back to a `.notdef` substitute that remembers the requested
    /// codepoint; substitutes are cached per codepoint.
    pub fn glyph(&mut self, unicode: u32) -> Glyph {
        if let Some(glyph) = self.program.glyph_by_unicode(unicode) {
            return glyph;
        }
        if let Some(glyph) = self.notdef_cache.get(&unicode) {
            return glyph.clone();
        }
        let glyph = match self.program.glyph_by_code(0) {
            Some(notdef) => Glyph::substitute(&notdef, unicode),
            None => Glyph::new(-1, 0, Some(unicode)),
        };
        self.notdef_cache.insert(unicode, glyph.clone());
        glyph
    }

    /// Whether the font has a real glyph for `unicode`.
    pub fn contains_glyph(&self, unicode: u32) -> bool {
        match &self.symbol_table {
            Some(table) => char::from_u32(unicode)
                .and_then(|ch| table.symbol_byte(ch))
                .is_some_and(|b| self.program.glyph_by_unicode(u32::from(b)).is_some()),
            None => self.program.glyph_by_unicode(unicode).is_some(),
        }
    }

    /// Encode text into font codes, recording every emitted CID.
    ///
    /// Characters without a glyph are written as CID 0. For symbolic fonts
    /// the text is first mapped to single bytes; characters without a byte
    /// or without a glyph are dropped.
    pub fn encode(&mut self, text: &str) -> Vec<u8> {
        self.encode_code_points(text.chars().map(u32::from))
    }

    /// Encode UTF-16 code units; surrogate pairs are combined into one code
    /// point and unpaired surrogates are encoded as themselves.
    pub fn encode_utf16(&mut self, units: &[u16]) -> Vec<u8> {
        let code_points: Vec<u32> = char::decode_utf16(units.iter().copied())
            .map(|r| match r {
                Ok(ch) => u32::from(ch),
                Err(e) => u32::from(e.unpaired_surrogate()),
            })
            .collect();
        self.encode_code_points(code_points.into_iter())
    }

    fn encode_code_points(&mut self, code_points: impl Iterator<Item = u32>) -> Vec<u8> {
        let mut out = Vec::new();
        if let Some(table) = self.symbol_table.clone() {
            for cp in code_points {
                let Some(byte) = char::from_u32(cp).and_then(|ch| table.symbol_byte(ch)) else {
                    continue;
                };
                if let Some(glyph) = self.program.glyph_by_unicode(u32::from(byte)) {
                    let cid = self.mark_used(glyph.code);
                    self.cmap.write_cid(cid, &mut out);
                }
            }
            return out;
        }

        for cp in code_points {
            let glyph = self.glyph(cp);
            let cid = if glyph.code > 0 {
                self.mark_used(glyph.code)
            } else {
                self.mark_used(0)
            };
            self.cmap.write_cid(cid, &mut out);
        }
        out
    }

    /// Encode a single glyph.
    pub fn encode_glyph(&mut self, glyph: &Glyph) -> Vec<u8> {
        let cid = self.mark_used(glyph.code);
        self.cmap.cid_to_bytes(cid)
    }

    /// Encode the window of a glyph line.
    pub fn encode_glyph_line(&mut self, line: &GlyphLine) -> Vec<u8> {
        let mut out = Vec::with_capacity(line.len() * 2);
        for glyph in line.iter() {
            let cid = self.mark_used(glyph.code);
            self.cmap.write_cid(cid, &mut out);
        }
        out
    }

    /// Resolve text into glyphs without encoding it.
    pub fn create_glyph_line(&mut self, text: &str) -> GlyphLine {
        let mut glyphs = Vec::with_capacity(text.len());
        match self.symbol_table.clone() {
            Some(table) => {
                for ch in text.chars() {
                    if let Some(byte) = table.symbol_byte(ch) {
                        glyphs.push(self.glyph(u32::from(byte)));
                    }
                }
            }
            None => {
                for ch in text.chars() {
                    glyphs.push(self.glyph(u32::from(ch)));
                }
            }
        }
        GlyphLine::new(glyphs)
    }

    /// Append glyphs for the longest prefix of `text` the font can render.
    ///
    /// A glyph is appendable when it is real or stands for whitespace or an
    /// invisible character. Returns the number of bytes of `text` consumed.
    pub fn append_glyphs(&mut self, text: &str, glyphs: &mut Vec<Glyph>) -> usize {
        let mut consumed = 0;
        for ch in text.chars() {
            let glyph = match self.symbol_table.clone() {
                Some(table) => match table
                    .symbol_byte(ch)
                    .and_then(|b| self.program.glyph_by_unicode(u32::from(b)))
                {
                    Some(glyph) => glyph,
                    None => break,
                },
                None => self.glyph(u32::from(ch)),
            };
            if !is_appendable(&glyph) {
                break;
            }
            glyphs.push(glyph);
            consumed += ch.len_utf8();
        }
        consumed
    }

    /// Append exactly one glyph for the first character of `text`, real or
    /// substitute. Returns the number of bytes consumed.
    pub fn append_any_glyph(&mut self, text: &str, glyphs: &mut Vec<Glyph>) -> usize {
        let Some(ch) = text.chars().next() else {
            return 0;
        };
        match self.symbol_table.clone() {
            Some(table) => {
                if let Some(byte) = table.symbol_byte(ch) {
                    glyphs.push(self.glyph(u32::from(byte)));
                }
            }
            None => glyphs.push(self.glyph(u32::from(ch))),
        }
        ch.len_utf8()
    }
}

fn is_appendable(glyph: &Glyph) -> bool {
    glyph.code > 0 || glyph.is_whitespace_or_non_printable()
}

#[cfg(test)]
mod tests {
    use crate::encoder::CompositeFontEncoder;
    use crate::program::TrueTypeProgram;
    use crate::test_font::{TestFont, gid, sample_font};
    use pdfcid_core::{FontOptions, GlyphLine};

    fn encoder() -> CompositeFontEncoder {
        let program = TrueTypeProgram::from_bytes(sample_font()).unwrap();
        CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default()).unwrap()
    }

    fn symbolic_encoder() -> CompositeFontEncoder {
        let mut desc = TestFont::sample();
        desc.symbolic = true;
        let program = TrueTypeProgram::from_bytes(desc.build()).unwrap();
        CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default()).unwrap()
    }

    // --- encode ---

    #[test]
    fn encodes_two_byte_cids() {
        let mut enc = encoder();
        assert_eq!(enc.encode("AB"), vec![0x00, 0x02, 0x00, 0x03]);
        assert_eq!(enc.used_cids(), vec![2, 3]);
    }

    #[test]
    fn astral_character_is_one_glyph() {
        let mut enc = encoder();
        assert_eq!(enc.encode("😀"), vec![0x00, 0x09]);
        let units: Vec<u16> = "A😀".encode_utf16().collect();
        assert_eq!(enc.encode_utf16(&units), vec![0x00, 0x02, 0x00, 0x09]);
    }

    #[test]
    fn unmapped_characters_become_cid_zero() {
        let mut enc = encoder();
        assert_eq!(enc.encode("AZ"), vec![0x00, 0x02, 0x00, 0x00]);
        assert_eq!(enc.used_cids(), vec![0, 2]);
        // Lone surrogates are not characters either.
        assert_eq!(enc.encode_utf16(&[0xD800]), vec![0x00, 0x00]);
    }

    #[test]
    fn encoding_is_repeatable_and_monotonic() {
        let mut enc = encoder();
        let first = enc.encode("ABC");
        let used_first = enc.used_cids();
        let second = enc.encode("ABC");
        assert_eq!(first, second);
        assert_eq!(enc.used_cids(), used_first);
        enc.encode("中");
        assert!(enc.used_cids().len() > used_first.len());
    }

    #[test]
    fn symbolic_text_goes_through_byte_table() {
        let mut enc = symbolic_encoder();
        // 'A' maps to byte 0x41, which the symbol cmap maps to glyph A.
        assert_eq!(enc.encode("A"), vec![0x00, 0x02]);
        // '中' has no single-byte form and is dropped.
        assert_eq!(enc.encode("中B"), vec![0x00, 0x03]);
        assert!(enc.contains_glyph('A' as u32));
        assert!(!enc.contains_glyph(0x4E2D));
    }

    // --- glyph resolution ---

    #[test]
    fn notdef_substitute_keeps_codepoint_and_is_cached() {
        let mut enc = encoder();
        let glyph = enc.glyph('Z' as u32);
        assert_eq!(glyph.code, 0);
        assert_eq!(glyph.width, 500);
        assert_eq!(glyph.unicode, Some('Z' as u32));
        assert_eq!(enc.notdef_cache.len(), 1);
        enc.glyph('Z' as u32);
        assert_eq!(enc.notdef_cache.len(), 1);
        assert!(!enc.contains_glyph('Z' as u32));
        assert!(enc.contains_glyph('A' as u32));
    }

    #[test]
    fn encode_glyph_and_line_window() {
        let mut enc = encoder();
        let line = enc.create_glyph_line("ABC");
        assert_eq!(line.len(), 3);
        assert!(enc.used_cids().is_empty());

        let window = line.sub_line(1, 3);
        assert_eq!(enc.encode_glyph_line(&window), vec![0x00, 0x03, 0x00, 0x04]);
        assert_eq!(enc.used_cids(), vec![3, 4]);

        let bytes = enc.encode_glyph(&line[0]);
        assert_eq!(bytes, vec![0x00, 0x02]);
        assert_eq!(enc.used_cids(), vec![2, 3, 4]);
    }

    #[test]
    fn glyph_line_from_text_uses_substitutes() {
        let mut enc = encoder();
        let line: GlyphLine = enc.create_glyph_line("AZ");
        assert_eq!(line[0].code, i32::from(gid::A));
        assert_eq!(line[1].code, 0);
        assert_eq!(line[1].unicode, Some('Z' as u32));
    }

    // --- appending ---

    #[test]
    fn append_glyphs_stops_at_missing_glyph() {
        let mut enc = encoder();
        let mut glyphs = Vec::new();
        let consumed = enc.append_glyphs("A B\u{AD}Z C", &mut glyphs);
        // "A", " ", "B" and the soft hyphen are appendable; 'Z' is not.
        assert_eq!(consumed, "A B\u{AD}".len());
        assert_eq!(glyphs.len(), 4);
        assert_eq!(glyphs[3].code, 0);
    }

    #[test]
    fn append_any_glyph_takes_one_character() {
        let mut enc = encoder();
        let mut glyphs = Vec::new();
        assert_eq!(enc.append_any_glyph("ZA", &mut glyphs), 1);
        assert_eq!(enc.append_any_glyph("中", &mut glyphs), 3);
        assert_eq!(enc.append_any_glyph("", &mut glyphs), 0);
        assert_eq!(glyphs.len(), 2);
        assert_eq!(glyphs[0].unicode, Some('Z' as u32));
        assert_eq!(glyphs[1].code, i32::from(gid::ZHONG));
    }
}
