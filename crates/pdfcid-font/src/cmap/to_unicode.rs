use std::collections::BTreeMap;

use super::{
    MAX_RANGE_SPAN, ParsedCMap, extract_hex_tokens, parse_hex_code, sections, utf16_code_to_char,
};
use crate::error::FontError;

/// A parsed ToUnicode CMap that maps character codes to Unicode strings.
///
/// Supports `beginbfchar`/`endbfchar` (single mappings) and
/// `beginbfrange`/`endbfrange` (range mappings) with UTF-16BE destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToUnicodeCMap {
    mappings: BTreeMap<u32, String>,
}

impl ToUnicodeCMap {
    /// Parse a ToUnicode CMap from its raw byte content.
    ///
    /// Entries with malformed codes or destinations are skipped; the
    /// remaining entries are kept.
    pub fn parse(data: &[u8]) -> Self {
        Self::parse_with_skipped(data).0
    }

    /// Like [`parse`](Self::parse), also returning how many entries were
    /// skipped.
    pub fn parse_with_skipped(data: &[u8]) -> (Self, usize) {
        let text = String::from_utf8_lossy(data);
        let mut mappings = BTreeMap::new();
        let mut skipped = 0;

        for section in sections(&text, "beginbfchar", "endbfchar") {
            skipped += parse_bfchar_section(section, &mut mappings);
        }
        for section in sections(&text, "beginbfrange", "endbfrange") {
            skipped += parse_bfrange_section(section, &mut mappings);
        }

        (ToUnicodeCMap { mappings }, skipped)
    }

    /// Reverse a Unicode CMap (UTF-16 code → CID) into CID → text.
    ///
    /// When several codes reach the same CID the lowest code wins.
    pub fn from_uni_cmap(uni: &ParsedCMap) -> Self {
        let mut mappings = BTreeMap::new();
        for (code, cid) in uni.mappings() {
            if let Some(ch) = utf16_code_to_char(code) {
                mappings.entry(cid).or_insert_with(|| ch.to_string());
            }
        }
        ToUnicodeCMap { mappings }
    }

    /// Build from explicit `(code, text)` pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        ToUnicodeCMap {
            mappings: entries.into_iter().map(|(c, s)| (c, s.into())).collect(),
        }
    }

    /// Look up the Unicode string for a character code.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(|s| s.as_str())
    }

    /// Re-key the mappings through a code → CID function.
    ///
    /// Used when a ToUnicode stream is keyed by byte codes but glyphs are
    /// addressed by CID.
    pub fn rekey(&self, mut code_to_cid: impl FnMut(u32) -> Option<u32>) -> Self {
        let mut mappings = BTreeMap::new();
        for (&code, text) in &self.mappings {
            if let Some(cid) = code_to_cid(code) {
                mappings.entry(cid).or_insert_with(|| text.clone());
            }
        }
        ToUnicodeCMap { mappings }
    }

    /// All `(code, text)` pairs in ascending code order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.mappings.iter().map(|(&c, s)| (c, s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Source of text for glyphs of a font read from a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnicodeMap {
    /// Explicit mapping from a ToUnicode stream or a Unicode CMap.
    Parsed(ToUnicodeCMap),
    /// Identity fallback: each code stands for the scalar value equal to it.
    Identity,
}

impl UnicodeMap {
    /// Text for a code.
    pub fn lookup(&self, code: u32) -> Option<String> {
        match self {
            UnicodeMap::Parsed(cmap) => cmap.lookup(code).map(str::to_string),
            UnicodeMap::Identity => char::from_u32(code).map(String::from),
        }
    }

    /// Whether the map has an entry for `code`.
    pub fn contains(&self, code: u32) -> bool {
        match self {
            UnicodeMap::Parsed(cmap) => cmap.lookup(code).is_some(),
            UnicodeMap::Identity => char::from_u32(code).is_some(),
        }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, UnicodeMap::Identity)
    }
}

/// Decode a hex string as UTF-16BE code units into a Unicode string.
fn decode_utf16be_hex(hex: &str) -> Result<String, FontError> {
    if hex.len() % 4 != 0 {
        // Single-byte destinations like "41" are padded to one code unit.
        if hex.len() == 2 {
            return decode_utf16be_hex(&format!("00{hex}"));
        }
        return Err(FontError::Parse(format!(
            "UTF-16BE hex string must have length divisible by 4, got '{hex}' (len={})",
            hex.len()
        )));
    }

    let mut code_units = Vec::with_capacity(hex.len() / 4);
    for chunk in hex.as_bytes().chunks(4) {
        let chunk_str = std::str::from_utf8(chunk)
            .map_err(|e| FontError::Parse(format!("invalid UTF-8 in hex: {e}")))?;
        let unit = u16::from_str_radix(chunk_str, 16).map_err(|e| {
            FontError::Parse(format!("invalid hex in UTF-16BE '{chunk_str}': {e}"))
        })?;
        code_units.push(unit);
    }

    String::from_utf16(&code_units)
        .map_err(|e| FontError::Parse(format!("invalid UTF-16BE sequence: {e}")))
}

/// Each line has format: `<srcCode> <dstUnicode>`
///
/// Returns the number of skipped entries.
fn parse_bfchar_section(section: &str, mappings: &mut BTreeMap<u32, String>) -> usize {
    let mut skipped = 0;
    for line in section.lines() {
        let tokens = extract_hex_tokens(line);
        for pair in tokens.chunks_exact(2) {
            match (parse_hex_code(pair[0]), decode_utf16be_hex(pair[1])) {
                (Ok((code, _)), Ok(text)) => {
                    mappings.insert(code, text);
                }
                _ => skipped += 1,
            }
        }
    }
    skipped
}

/// Each line has format: `<srcLow> <srcHigh> <dstStart>`
/// or: `<srcLow> <srcHigh> [<str1> <str2> ...]`
///
/// Returns the number of skipped lines and array destinations.
fn parse_bfrange_section(section: &str, mappings: &mut BTreeMap<u32, String>) -> usize {
    let mut skipped = 0;
    for line in section.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || !trimmed.contains('<') {
            continue;
        }

        if let Some(bracket_start) = trimmed.find('[') {
            let src_tokens = extract_hex_tokens(&trimmed[..bracket_start]);
            let Some((src_low, src_high)) = source_range(&src_tokens) else {
                skipped += 1;
                continue;
            };

            let inner = &trimmed[bracket_start + 1..];
            let inner = inner.rfind(']').map_or(inner, |end| &inner[..end]);
            for (code, dst_hex) in (src_low..=src_high).zip(extract_hex_tokens(inner)) {
                match decode_utf16be_hex(dst_hex) {
                    Ok(text) => {
                        mappings.insert(code, text);
                    }
                    Err(_) => skipped += 1,
                }
            }
        } else {
            let tokens = extract_hex_tokens(trimmed);
            let (Some((src_low, src_high)), Some(Ok(dst))) =
                (source_range(&tokens), tokens.get(2).map(|t| decode_utf16be_hex(t)))
            else {
                skipped += 1;
                continue;
            };
            let mut chars: Vec<char> = dst.chars().collect();
            let Some(last) = chars.pop() else {
                skipped += 1;
                continue;
            };
            // The last character of the destination increments across the range.
            for offset in 0..=(src_high - src_low) {
                if let Some(ch) = char::from_u32(last as u32 + offset) {
                    let mut text: String = chars.iter().collect();
                    text.push(ch);
                    mappings.insert(src_low + offset, text);
                }
            }
        }
    }
    skipped
}

/// Low and high source codes of a bfrange line, rejecting reversed ranges
/// and ranges wider than [`MAX_RANGE_SPAN`].
fn source_range(tokens: &[&str]) -> Option<(u32, u32)> {
    let (low, _) = parse_hex_code(tokens.first()?).ok()?;
    let (high, _) = parse_hex_code(tokens.get(1)?).ok()?;
    (high >= low && high - low < MAX_RANGE_SPAN).then_some((low, high))
}
