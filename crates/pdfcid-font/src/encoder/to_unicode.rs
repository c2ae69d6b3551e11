//! The `/ToUnicode` CMap written for embedded fonts.

use std::fmt::Write;

use super::CompositeFontEncoder;

/// Entries per `beginbfrange` block.
const BLOCK_SIZE: usize = 100;

const HEADER: &str = "/CIDInit /ProcSet findresource begin\n\
12 dict begin\n\
begincmap\n\
/CIDSystemInfo\n\
<< /Registry (Adobe)\n\
/Ordering (UCS)\n\
/Supplement 0\n\
>> def\n\
/CMapName /Adobe-Identity-UCS def\n\
/CMapType 2 def\n\
1 begincodespacerange\n\
<0000><FFFF>\n\
endcodespacerange\n";

const TRAILER: &str = "endbfrange\n\
endcmap\n\
CMapName currentdict /CMap defineresource pop\n\
end end\n";

impl CompositeFontEncoder {
    /// ToUnicode CMap program over every used CID, `None` when no used
    /// glyph carries text.
    pub fn to_unicode_cmap(&self) -> Option<String> {
        self.to_unicode_for(&self.used_cids())
    }

    /// ToUnicode CMap program over `cids`, which must be sorted ascending.
    pub(crate) fn to_unicode_for(&self, cids: &[u32]) -> Option<String> {
        let entries: Vec<(u32, String)> = cids
            .iter()
            .filter_map(|&cid| {
                let glyph = self.program.glyph_by_code(cid)?;
                glyph.chars.filter(|c| !c.is_empty()).map(|c| (cid, c))
            })
            .collect();
        if entries.is_empty() {
            return None;
        }
        Some(write_to_unicode(&entries))
    }
}

/// Serialize `(cid, text)` pairs as `bfrange` blocks of at most 100 entries.
pub(crate) fn write_to_unicode(entries: &[(u32, String)]) -> String {
    let mut buf = String::with_capacity(HEADER.len() + TRAILER.len() + entries.len() * 20);
    buf.push_str(HEADER);
    for (i, block) in entries.chunks(BLOCK_SIZE).enumerate() {
        if i > 0 {
            buf.push_str("endbfrange\n");
        }
        let _ = writeln!(buf, "{} beginbfrange", block.len());
        for (cid, text) in block {
            let _ = write!(buf, "<{cid:04x}><{cid:04x}><");
            for unit in text.encode_utf16() {
                let _ = write!(buf, "{unit:04x}");
            }
            buf.push_str(">\n");
        }
    }
    buf.push_str(TRAILER);
    buf
}
