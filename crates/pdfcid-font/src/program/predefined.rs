use pdfcid_core::{CidSystemInfo, Glyph};

use super::{DEFAULT_WIDTH, FontMetrics, FontProgram, flags};
use crate::cmap::{CMapTable, ParsedCMap, ToUnicodeCMap, char_to_utf16_code};
use crate::error::FontError;
use crate::registry::FontRegistry;

/// A non-embedded CJK font known to viewers by name (e.g. `HeiseiMin-W3`).
///
/// Text is mapped to CIDs through a Unicode CMap of the font's character
/// collection. All glyphs use the default width.
#[derive(Debug, Clone)]
pub struct PredefinedCidFont {
    name: String,
    style: Option<String>,
    collection: String,
    system_info: CidSystemInfo,
    uni_map: Option<ParsedCMap>,
    reverse: ToUnicodeCMap,
    metrics: FontMetrics,
}

impl PredefinedCidFont {
    /// Look up a predefined font, optionally with a `,Style` suffix.
    ///
    /// `uni_map_name` selects the Unicode CMap used for text; when it is
    /// not registered the font still works but maps every character to
    /// `.notdef`.
    pub fn new(
        font: &str,
        uni_map_name: &str,
        registry: &FontRegistry,
    ) -> Result<Self, FontError> {
        let (name, style) = FontRegistry::split_style(font);
        let collection = registry
            .font_collection(name)
            .ok_or_else(|| FontError::NotCjkFont {
                font: font.to_string(),
                cmap: uni_map_name.to_string(),
            })?
            .to_string();
        let system_info = registry
            .system_info(&collection)
            .cloned()
            .unwrap_or_else(CidSystemInfo::identity);

        let uni_map = match registry.load_cmap(uni_map_name) {
            Ok(cmap) => Some(cmap),
            Err(FontError::CMapNotFound(_)) => None,
            Err(e) => return Err(e),
        };
        let reverse = uni_map
            .as_ref()
            .map(ToUnicodeCMap::from_uni_cmap)
            .unwrap_or_default();

        Ok(Self {
            name: name.to_string(),
            style: style.map(str::to_string),
            collection,
            system_info,
            uni_map,
            reverse,
            metrics: FontMetrics {
                glyph_count: 0,
                ..FontMetrics::default()
            },
        })
    }

    /// Collection key of the font (e.g. `Adobe_Japan1`).
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn system_info(&self) -> &CidSystemInfo {
        &self.system_info
    }

    /// Whether a Unicode CMap was available to map text.
    pub fn has_uni_map(&self) -> bool {
        self.uni_map.is_some()
    }
}

impl FontProgram for PredefinedCidFont {
    fn font_name(&self) -> &str {
        &self.name
    }

    fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    fn glyph_by_unicode(&self, unicode: u32) -> Option<Glyph> {
        let ch = char::from_u32(unicode)?;
        let cid = self.uni_map.as_ref()?.code_to_cid(char_to_utf16_code(ch))?;
        Some(Glyph::new(cid as i32, DEFAULT_WIDTH, Some(unicode)))
    }

    fn glyph_by_code(&self, code: u32) -> Option<Glyph> {
        if code == 0 {
            return Some(Glyph::new(0, DEFAULT_WIDTH, None));
        }
        let text = self.reverse.lookup(code)?;
        let unicode = text.chars().next().map(u32::from);
        Some(Glyph::with_chars(code as i32, DEFAULT_WIDTH, unicode, text))
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        None
    }

    fn subset(&self, _used: &[u32], _close_composites: bool) -> Result<Vec<u8>, FontError> {
        Err(FontError::Subset(format!(
            "predefined font {} has no program to subset",
            self.name
        )))
    }

    fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    fn pdf_flags(&self) -> i32 {
        flags::SYMBOLIC
    }

    fn registry(&self) -> Option<&CidSystemInfo> {
        Some(&self.system_info)
    }
}
