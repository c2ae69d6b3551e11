use super::CompositeFontEncoder;

/// `/CIDSet` bitmap marking glyphs `0..glyph_count` as present.
///
/// Glyph ids survive TrueType subsetting unchanged, so the retained range is
/// always the full prefix: `glyph_count / 8` bytes of `0xFF` followed by one
/// byte with the remaining `glyph_count % 8` bits set from the most
/// significant bit down.
pub fn cid_set_bytes(glyph_count: u32) -> Vec<u8> {
    let full = (glyph_count / 8) as usize;
    let rest = glyph_count % 8;
    let mut bytes = vec![0xFF; full + 1];
    bytes[full] = !(0xFFu8 >> rest);
    bytes
}

impl CompositeFontEncoder {
    /// `/CIDSet` bitmap of the font program.
    pub fn cid_set(&self) -> Vec<u8> {
        cid_set_bytes(self.program.metrics().glyph_count)
    }
}
