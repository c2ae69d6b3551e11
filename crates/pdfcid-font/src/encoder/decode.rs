//! Font codes → glyphs → text.

use pdfcid_core::{FontWarning, FontWarningCode, Glyph, GlyphLine};

use super::CompositeFontEncoder;
use crate::cmap::bytes_to_code;

/// Codes are at most four bytes long.
const MAX_CODE_LENGTH: usize = 4;

impl CompositeFontEncoder {
    /// Decode a shown string into glyphs.
    ///
    /// At every position the code lengths 1 through 4 are tried in order and
    /// the first length inside a codespace range is taken, whether or not
    /// its CID has a glyph. Positions without a glyph with text yield a
    /// sentinel glyph; positions without any glyph also record a
    /// [`FontWarningCode::GlyphNotFound`] warning. The cursor always moves
    /// forward by the matched length, or by one byte when nothing matched.
    pub fn decode_into_glyph_line(&mut self, bytes: &[u8]) -> GlyphLine {
        let mut glyphs = Vec::with_capacity(bytes.len() / 2 + 1);
        let mut i = 0;
        while i < bytes.len() {
            let max_len = MAX_CODE_LENGTH.min(bytes.len() - i);
            let mut matched = None;
            for len in 1..=max_len {
                let code = bytes_to_code(&bytes[i..i + len]);
                if self.cmap.codespace_contains(code, len) {
                    matched = Some((code, len));
                    break;
                }
            }

            let glyph = matched.and_then(|(code, _)| {
                self.cmap
                    .code_to_cid(code)
                    .and_then(|cid| self.program.glyph_by_code(cid))
            });
            match glyph {
                Some(glyph) if glyph.has_chars() => glyphs.push(glyph),
                Some(_) => glyphs.push(self.sentinel()),
                None => {
                    let description = match matched {
                        Some((code, len)) => {
                            format!("no glyph for code {code:0width$X}", width = len * 2)
                        }
                        None => format!("byte {:02X} is outside every codespace", bytes[i]),
                    };
                    self.warn(
                        FontWarning::with_code(FontWarningCode::GlyphNotFound, description)
                            .at_offset(i),
                    );
                    glyphs.push(self.sentinel());
                }
            }
            i += matched.map_or(1, |(_, len)| len);
        }
        GlyphLine::new(glyphs)
    }

    /// Decode a shown string into text.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.decode_into_glyph_line(bytes).text()
    }

    /// Total advance of a shown string in glyph space (1/1000 em).
    pub fn content_width(&mut self, bytes: &[u8]) -> i64 {
        self.decode_into_glyph_line(bytes).width()
    }

    fn sentinel(&self) -> Glyph {
        let width = self.program.glyph_by_code(0).map_or(0, |g| g.width);
        Glyph::sentinel(width)
    }
}

#[cfg(test)]
mod tests {
    use crate::encoder::CompositeFontEncoder;
    use crate::program::TrueTypeProgram;
    use crate::registry::FontRegistry;
    use crate::test_font::sample_font;
    use pdfcid_core::{FontOptions, FontWarningCode};

    fn encoder() -> CompositeFontEncoder {
        let program = TrueTypeProgram::from_bytes(sample_font()).unwrap();
        CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default()).unwrap()
    }

    const RKSJ: &[u8] = b"\
        /CIDSystemInfo << /Registry (Adobe) /Ordering (Japan1) /Supplement 4 >> def\n\
        /CMapName /90ms-RKSJ-H def\n\
        2 begincodespacerange\n<00> <80>\n<8140> <9FFC>\nendcodespacerange\n\
        1 begincidrange\n<20> <7e> 231\nendcidrange\n\
        1 begincidchar\n<8140> 633\nendcidchar\n";

    const UNI_JIS: &[u8] = b"\
        /CIDSystemInfo << /Registry (Adobe) /Ordering (Japan1) /Supplement 4 >> def\n\
        /CMapName /UniJIS-UCS2-H def\n\
        1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n\
        1 begincidrange\n<0020> <007e> 231\nendcidrange\n\
        1 begincidchar\n<3000> 633\nendcidchar\n";

    fn rksj_encoder() -> CompositeFontEncoder {
        let mut registry = FontRegistry::new();
        registry.register_cmap("90ms-RKSJ-H", RKSJ);
        registry.register_cmap("UniJIS-UCS2-H", UNI_JIS);
        CompositeFontEncoder::predefined(
            "HeiseiMin-W3",
            "90ms-RKSJ-H",
            &registry,
            FontOptions::default(),
        )
        .unwrap()
    }

    // --- identity ---

    #[test]
    fn decode_reverses_encode() {
        let mut enc = encoder();
        let text = "AB C中😀";
        let bytes = enc.encode(text);
        assert_eq!(enc.decode(&bytes), text);
        assert!(enc.warnings().is_empty());
    }

    #[test]
    fn ligature_decodes_to_its_text() {
        let mut enc = encoder();
        assert_eq!(enc.decode(&[0x00, 0x08]), "ﬁ");
    }

    #[test]
    fn glyph_without_text_becomes_sentinel_silently() {
        let mut enc = encoder();
        // Glyph 6 (the diaeresis) has no Unicode value.
        let line = enc.decode_into_glyph_line(&[0x00, 0x06]);
        assert_eq!(line.len(), 1);
        assert_eq!(line[0].code, 0);
        assert_eq!(line[0].width, 500);
        assert!(line[0].chars.is_none());
        assert!(enc.warnings().is_empty());
    }

    #[test]
    fn trailing_odd_byte_is_skipped_with_warning() {
        let mut enc = encoder();
        let line = enc.decode_into_glyph_line(&[0x00, 0x02, 0x41]);
        assert_eq!(line.len(), 2);
        assert_eq!(line.text(), "A");
        let warnings = enc.warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, FontWarningCode::GlyphNotFound);
        assert_eq!(warnings[0].offset, Some(2));
    }

    #[test]
    fn gid_past_the_font_warns() {
        let mut enc = encoder();
        let line = enc.decode_into_glyph_line(&[0x01, 0x00]);
        assert_eq!(line.len(), 1);
        assert!(line[0].is_notdef());
        assert_eq!(enc.warnings().len(), 1);
        assert!(enc.warnings()[0].description.contains("0100"));
    }

    #[test]
    fn content_width_sums_advances() {
        let mut enc = encoder();
        // A (600) + B (700) + space (250)
        assert_eq!(enc.content_width(&[0x00, 0x02, 0x00, 0x03, 0x00, 0x01]), 1550);
    }

    // --- mixed-length codespace ---

    #[test]
    fn mixed_lengths_take_first_codespace_match() {
        let mut enc = rksj_encoder();
        // 'A' is one byte, the ideographic space two.
        let line = enc.decode_into_glyph_line(&[0x41, 0x81, 0x40, 0x42]);
        assert_eq!(line.len(), 3);
        assert_eq!(line[0].code, 264);
        assert_eq!(line[1].code, 633);
        assert_eq!(line.text(), "A\u{3000}B");
    }

    #[test]
    fn bytes_outside_codespace_advance_one_at_a_time() {
        let mut enc = rksj_encoder();
        let line = enc.decode_into_glyph_line(&[0xFF, 0xFF, 0xFF]);
        assert_eq!(line.len(), 3);
        assert!(line.iter().all(|g| g.code == 0 && g.chars.is_none()));
        let offsets: Vec<_> = enc.warnings().iter().map(|w| w.offset).collect();
        assert_eq!(offsets, vec![Some(0), Some(1), Some(2)]);
    }

    #[test]
    fn encode_through_named_cmap() {
        let mut enc = rksj_encoder();
        assert_eq!(enc.encode("A\u{3000}"), vec![0x41, 0x81, 0x40]);
        assert_eq!(enc.used_cids(), vec![264, 633]);
    }
}
