//! CMap tables: byte code ↔ CID mappings with codespace ranges.
//!
//! [`IdentityCMap`] covers `Identity-H`/`Identity-V`; [`ParsedCMap`] is read
//! from CMap program text (predefined resources registered by name, or
//! streams embedded as a font's `/Encoding`). [`ToUnicodeCMap`] and
//! [`UnicodeMap`] cover the reverse direction, codes to text.

mod identity;
mod parsed;
mod to_unicode;

use std::fmt;

use pdfcid_core::CidSystemInfo;

use crate::error::FontError;

pub use identity::IdentityCMap;
pub use parsed::ParsedCMap;
pub use to_unicode::{ToUnicodeCMap, UnicodeMap};

/// A `(byte length, low, high)` codespace triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodespaceRange {
    /// Code length in bytes (1–4).
    pub byte_len: u8,
    /// Lowest code of the range.
    pub low: u32,
    /// Highest code of the range.
    pub high: u32,
}

impl CodespaceRange {
    pub fn new(byte_len: u8, low: u32, high: u32) -> Self {
        Self {
            byte_len,
            low,
            high,
        }
    }

    /// Whether a `len`-byte code falls inside this range.
    ///
    /// Each byte must lie between the corresponding bytes of `low` and
    /// `high`, which for the common contiguous ranges is the same as a
    /// plain numeric comparison.
    pub fn contains(&self, code: u32, len: usize) -> bool {
        if len != self.byte_len as usize {
            return false;
        }
        (0..len).all(|i| {
            let shift = 8 * i;
            let b = (code >> shift) & 0xFF;
            b >= (self.low >> shift) & 0xFF && b <= (self.high >> shift) & 0xFF
        })
    }
}

/// Bidirectional mapping between byte codes and CIDs.
///
/// Codespace ranges of different byte lengths never overlap, which is what
/// makes the decode loop's "first length that matches" rule well defined.
pub trait CMapTable: fmt::Debug {
    /// CMap name as written to the font's `/Encoding`.
    fn name(&self) -> &str;

    /// Character collection of the CIDs this CMap produces.
    fn system_info(&self) -> &CidSystemInfo;

    /// Whether codes pass through unchanged as CIDs.
    fn is_direct(&self) -> bool;

    /// Whether this is a vertical (`/WMode 1`) CMap.
    fn is_vertical(&self) -> bool;

    fn codespace_ranges(&self) -> &[CodespaceRange];

    /// Whether a `len`-byte code lies in any codespace range.
    fn codespace_contains(&self, code: u32, len: usize) -> bool {
        self.codespace_ranges().iter().any(|r| r.contains(code, len))
    }

    /// CID for a code, `None` when the code is unmapped.
    fn code_to_cid(&self, code: u32) -> Option<u32>;

    /// Code and byte length that select `cid`, `None` when unmapped.
    fn cid_to_code(&self, cid: u32) -> Option<(u32, usize)>;

    /// Code used for CIDs with no mapping: the lowest code among the
    /// codespace ranges with the most bytes, two bytes wide when there is
    /// no range.
    fn null_code(&self) -> (u32, usize) {
        self.codespace_ranges()
            .iter()
            .min_by_key(|r| (std::cmp::Reverse(r.byte_len), r.low))
            .map(|r| (r.low, r.byte_len as usize))
            .unwrap_or((0, 2))
    }

    /// Append the fixed-width, most-significant-first bytes for `cid`.
    fn write_cid(&self, cid: u32, out: &mut Vec<u8>) {
        let (code, len) = self.cid_to_code(cid).unwrap_or_else(|| self.null_code());
        for i in (0..len).rev() {
            out.push((code >> (8 * i)) as u8);
        }
    }

    /// Bytes selecting `cid`.
    fn cid_to_bytes(&self, cid: u32) -> Vec<u8> {
        let mut out = Vec::with_capacity(4);
        self.write_cid(cid, &mut out);
        out
    }

    /// Number of bytes [`write_cid`](CMapTable::write_cid) emits for `cid`.
    fn byte_length(&self, cid: u32) -> usize {
        self.cid_to_code(cid)
            .map_or_else(|| self.null_code().1, |(_, len)| len)
    }
}

/// Largest number of codes a single range entry may expand to.
pub(crate) const MAX_RANGE_SPAN: u32 = 0x10000;

/// Whether `name` is one of the two Identity CMaps.
pub fn is_identity_name(name: &str) -> bool {
    name == "Identity-H" || name == "Identity-V"
}

/// Concatenate a run of bytes into a big-endian code.
pub(crate) fn bytes_to_code(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b))
}

/// Text between every `begin`...`end` keyword pair, in order.
pub(crate) fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut search_from = 0;
    while let Some(start) = text[search_from..].find(begin) {
        let section_start = search_from + start + begin.len();
        match text[section_start..].find(end) {
            Some(stop) => {
                found.push(&text[section_start..section_start + stop]);
                search_from = section_start + stop + end.len();
            }
            None => break,
        }
    }
    found
}

/// Extract all `<hex>` tokens from a line of text.
pub(crate) fn extract_hex_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        if let Some(end) = rest[start + 1..].find('>') {
            tokens.push(rest[start + 1..start + 1 + end].trim());
            rest = &rest[start + 1 + end + 1..];
        } else {
            break;
        }
    }
    tokens
}

/// Parse a hex token like "0041" into a code and its byte length.
pub(crate) fn parse_hex_code(hex: &str) -> Result<(u32, usize), FontError> {
    if hex.is_empty() || hex.len() > 8 {
        return Err(FontError::Parse(format!("invalid hex code '{hex}'")));
    }
    let code = u32::from_str_radix(hex, 16)
        .map_err(|e| FontError::Parse(format!("invalid hex code '{hex}': {e}")))?;
    Ok((code, hex.len().div_ceil(2)))
}

/// Decimal number following the last `>` of a line.
pub(crate) fn trailing_number(line: &str) -> Option<u32> {
    let after = line.rfind('>').map(|pos| &line[pos + 1..])?;
    after.split_whitespace().next()?.parse().ok()
}

/// Parse `/CMapName /Name` from CMap text.
pub(crate) fn parse_cmap_name(text: &str) -> Option<String> {
    let idx = text.find("/CMapName")?;
    let rest = text[idx + "/CMapName".len()..].trim_start();
    let rest = rest.strip_prefix('/')?;
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(rest.len());
    Some(rest[..end].to_string())
}

/// Parse `/WMode N` from CMap text; anything but 1 is horizontal.
pub(crate) fn parse_writing_mode(text: &str) -> bool {
    text.find("/WMode")
        .map(|idx| text[idx + "/WMode".len()..].trim_start().starts_with('1'))
        .unwrap_or(false)
}

/// Parse all `begincodespacerange` sections.
pub(crate) fn parse_codespace(text: &str) -> Result<Vec<CodespaceRange>, FontError> {
    let mut ranges = Vec::new();
    for section in sections(text, "begincodespacerange", "endcodespacerange") {
        let tokens = extract_hex_tokens(section);
        for pair in tokens.chunks_exact(2) {
            let (low, len) = parse_hex_code(pair[0])?;
            let (high, _) = parse_hex_code(pair[1])?;
            ranges.push(CodespaceRange::new(len as u8, low, high));
        }
    }
    Ok(ranges)
}

/// Decode a UTF-16 code value (one unit, or a surrogate pair packed as
/// `hi << 16 | lo`) into a character.
pub(crate) fn utf16_code_to_char(code: u32) -> Option<char> {
    if code <= 0xFFFF {
        return char::from_u32(code);
    }
    let units = [(code >> 16) as u16, code as u16];
    char::decode_utf16(units).next()?.ok()
}

/// Pack a character into the UTF-16 code value used by Unicode CMaps.
pub(crate) fn char_to_utf16_code(ch: char) -> u32 {
    let mut buf = [0u16; 2];
    match ch.encode_utf16(&mut buf) {
        [unit] => u32::from(*unit),
        [hi, lo] => (u32::from(*hi) << 16) | u32::from(*lo),
        _ => 0,
    }
}
