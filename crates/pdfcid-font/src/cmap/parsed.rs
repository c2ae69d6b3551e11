use std::collections::{HashMap, HashSet};

use pdfcid_core::CidSystemInfo;

use super::{
    CMapTable, CodespaceRange, MAX_RANGE_SPAN, extract_hex_tokens, parse_cmap_name,
    parse_codespace, parse_hex_code, parse_writing_mode, sections, trailing_number,
};
use crate::error::FontError;

/// A contiguous `begincidrange` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CidRange {
    low: u32,
    high: u32,
    byte_len: u8,
    cid: u32,
}

/// A CMap read from CMap program text.
///
/// Holds the codespace ranges, `cidchar`/`cidrange` mappings and the
/// `/CIDSystemInfo` of a predefined or embedded CMap. A parent named by
/// `usecmap` is merged in with [`ParsedCMap::inherit`].
#[derive(Debug, Clone)]
pub struct ParsedCMap {
    name: String,
    system_info: CidSystemInfo,
    vertical: bool,
    codespace: Vec<CodespaceRange>,
    singles: HashMap<u32, u32>,
    single_lengths: HashMap<u32, u8>,
    ranges: Vec<CidRange>,
    /// CID → lowest code selecting it, with the code's byte length.
    reverse: HashMap<u32, (u32, usize)>,
    parent: Option<String>,
}

impl ParsedCMap {
    /// Parse CMap program text.
    ///
    /// `fallback_name` is used when the program has no `/CMapName`.
    pub fn parse(data: &[u8], fallback_name: &str) -> Result<Self, FontError> {
        let text = String::from_utf8_lossy(data);
        let name = parse_cmap_name(&text).unwrap_or_else(|| fallback_name.to_string());
        let vertical = parse_writing_mode(&text);
        let codespace = parse_codespace(&text)?;
        let system_info = parse_system_info(&text).unwrap_or_else(CidSystemInfo::identity);
        let parent = parse_usecmap(&text);

        let mut cmap = ParsedCMap {
            name,
            system_info,
            vertical,
            codespace,
            singles: HashMap::new(),
            single_lengths: HashMap::new(),
            ranges: Vec::new(),
            reverse: HashMap::new(),
            parent,
        };

        for section in sections(&text, "begincidchar", "endcidchar") {
            cmap.parse_cidchar_section(section)?;
        }
        for section in sections(&text, "begincidrange", "endcidrange") {
            cmap.parse_cidrange_section(section)?;
        }

        if cmap.codespace.is_empty() && cmap.parent.is_none() {
            return Err(FontError::Parse(format!(
                "CMap {} declares no codespace ranges",
                cmap.name
            )));
        }
        cmap.rebuild_reverse();
        Ok(cmap)
    }

    /// Name of the parent CMap referenced by `usecmap`, if any.
    pub fn parent_name(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub(crate) fn set_parent(&mut self, name: String) {
        self.parent = Some(name);
    }

    /// Merge a parent CMap: its codespace ranges and mappings apply wherever
    /// this CMap does not define its own.
    pub fn inherit(&mut self, parent: &ParsedCMap) {
        for range in &parent.codespace {
            if !self.codespace.contains(range) {
                self.codespace.push(*range);
            }
        }
        for (&code, &cid) in &parent.singles {
            if self.lookup_own(code).is_none() {
                self.singles.insert(code, cid);
                if let Some(&len) = parent.single_lengths.get(&code) {
                    self.single_lengths.insert(code, len);
                }
            }
        }
        self.ranges.extend(parent.ranges.iter().copied());
        if self.system_info == CidSystemInfo::identity() {
            self.system_info = parent.system_info.clone();
        }
        self.parent = None;
        self.rebuild_reverse();
    }

    /// Every `(code, cid)` pair this CMap defines, in code order.
    pub fn mappings(&self) -> Vec<(u32, u32)> {
        let mut pairs: Vec<(u32, u32)> = self
            .effective_entries()
            .into_iter()
            .map(|(code, cid, _)| (code, cid))
            .collect();
        pairs.sort_unstable();
        pairs
    }

    /// Number of explicit mappings (ranges count once per code).
    pub fn len(&self) -> usize {
        self.singles.len()
            + self
                .ranges
                .iter()
                .map(|r| (r.high.saturating_sub(r.low) + 1) as usize)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.ranges.is_empty()
    }

    fn lookup_own(&self, code: u32) -> Option<u32> {
        if let Some(&cid) = self.singles.get(&code) {
            return Some(cid);
        }
        self.ranges
            .iter()
            .find(|r| code >= r.low && code <= r.high)
            .and_then(|r| r.cid.checked_add(code - r.low))
    }

    /// `(code, cid, byte length)` for every code, resolved the way
    /// [`lookup_own`](Self::lookup_own) resolves it: singles first, then
    /// the first range containing the code.
    fn effective_entries(&self) -> Vec<(u32, u32, usize)> {
        let mut seen = HashSet::with_capacity(self.singles.len());
        let mut entries = Vec::with_capacity(self.len());
        for (&code, &cid) in &self.singles {
            seen.insert(code);
            entries.push((code, cid, self.code_length(code)));
        }
        for range in &self.ranges {
            for offset in 0..=range.high - range.low {
                let code = range.low + offset;
                if !seen.insert(code) {
                    continue;
                }
                if let Some(cid) = range.cid.checked_add(offset) {
                    entries.push((code, cid, range.byte_len as usize));
                }
            }
        }
        entries
    }

    fn rebuild_reverse(&mut self) {
        let mut reverse: HashMap<u32, (u32, usize)> = HashMap::new();
        for (code, cid, len) in self.effective_entries() {
            reverse
                .entry(cid)
                .and_modify(|entry| {
                    if code < entry.0 {
                        *entry = (code, len);
                    }
                })
                .or_insert((code, len));
        }
        self.reverse = reverse;
    }

    /// Each line has format: `<srcCode> CID`
    fn parse_cidchar_section(&mut self, section: &str) -> Result<(), FontError> {
        for line in section.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || !trimmed.contains('<') {
                continue;
            }
            let tokens = extract_hex_tokens(trimmed);
            let Some(first) = tokens.first() else {
                continue;
            };
            let (code, len) = parse_hex_code(first)?;
            if let Some(cid) = trailing_number(trimmed) {
                self.singles.insert(code, cid);
                self.single_lengths.insert(code, len as u8);
            }
        }
        Ok(())
    }

    /// Each line has format: `<srcLow> <srcHigh> CID_start`
    fn parse_cidrange_section(&mut self, section: &str) -> Result<(), FontError> {
        for line in section.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || !trimmed.contains('<') {
                continue;
            }
            let tokens = extract_hex_tokens(trimmed);
            if tokens.len() < 2 {
                continue;
            }
            let (low, len) = parse_hex_code(tokens[0])?;
            let (high, _) = parse_hex_code(tokens[1])?;
            if high < low || high - low >= MAX_RANGE_SPAN {
                continue;
            }
            if let Some(cid) = trailing_number(trimmed) {
                self.ranges.push(CidRange {
                    low,
                    high,
                    byte_len: len as u8,
                    cid,
                });
            }
        }
        Ok(())
    }

    fn code_length(&self, code: u32) -> usize {
        if let Some(&len) = self.single_lengths.get(&code) {
            return len as usize;
        }
        if let Some(range) = self.ranges.iter().find(|r| code >= r.low && code <= r.high) {
            return range.byte_len as usize;
        }
        self.codespace
            .iter()
            .find(|r| code >= r.low && code <= r.high)
            .map(|r| r.byte_len as usize)
            .unwrap_or(2)
    }
}

impl CMapTable for ParsedCMap {
    fn name(&self) -> &str {
        &self.name
    }

    fn system_info(&self) -> &CidSystemInfo {
        &self.system_info
    }

    fn is_direct(&self) -> bool {
        false
    }

    fn is_vertical(&self) -> bool {
        self.vertical
    }

    fn codespace_ranges(&self) -> &[CodespaceRange] {
        &self.codespace
    }

    fn code_to_cid(&self, code: u32) -> Option<u32> {
        self.lookup_own(code)
    }

    /// The lowest code mapping to `cid`.
    fn cid_to_code(&self, cid: u32) -> Option<(u32, usize)> {
        self.reverse.get(&cid).copied()
    }
}

/// Parse `/Registry (..) /Ordering (..) /Supplement N` from CMap text.
fn parse_system_info(text: &str) -> Option<CidSystemInfo> {
    let idx = text.find("/CIDSystemInfo")?;
    let rest = &text[idx..];
    let registry = paren_value(rest, "/Registry")?;
    let ordering = paren_value(rest, "/Ordering")?;
    let supplement = rest
        .find("/Supplement")
        .and_then(|i| {
            rest[i + "/Supplement".len()..]
                .split_whitespace()
                .next()
                .and_then(|s| s.parse::<i64>().ok())
        })
        .unwrap_or(0);
    Some(CidSystemInfo::new(registry, ordering, supplement))
}

/// The `(...)` string following `key`.
fn paren_value(text: &str, key: &str) -> Option<String> {
    let idx = text.find(key)?;
    let rest = &text[idx + key.len()..];
    let open = rest.find('(')?;
    let close = rest[open..].find(')')?;
    Some(rest[open + 1..open + close].to_string())
}

/// Parse `/Parent usecmap`.
fn parse_usecmap(text: &str) -> Option<String> {
    let idx = text.find("usecmap")?;
    let before = text[..idx].trim_end();
    let start = before.rfind('/')?;
    let name = before[start + 1..].trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    Some(name.to_string())
}
