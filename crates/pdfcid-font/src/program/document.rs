use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document, Object};
use pdfcid_core::{FontWarning, FontWarningCode, Glyph};

use super::{DEFAULT_WIDTH, FontMetrics, FontProgram};
use crate::cmap::{MAX_RANGE_SPAN, UnicodeMap};
use crate::error::FontError;
use crate::log::font_warn;
use crate::objects::{
    name_entry, object_to_f64, object_to_u32, resolve_object, resolved_dict, resolved_entry,
    stream_bytes,
};

/// A font program reconstructed from a descendant CIDFont dictionary of an
/// existing document.
///
/// Widths come from `/W` and `/DW`, text from the resolved [`UnicodeMap`],
/// metrics from the font descriptor. The embedded program, if any, is kept
/// as-is; reconstructed fonts are never rewritten.
#[derive(Debug, Clone)]
pub struct DocumentFontProgram {
    name: String,
    widths: BTreeMap<u32, i32>,
    unicode: UnicodeMap,
    unicode_to_cid: HashMap<u32, u32>,
    metrics: FontMetrics,
    pdf_flags: i32,
    font_file: Option<Vec<u8>>,
    cff: bool,
}

impl DocumentFontProgram {
    /// Read the program from a CIDFont dictionary.
    ///
    /// Malformed entries are skipped and reported in `warnings`.
    pub fn from_cid_font(
        doc: &Document,
        cid_font: &Dictionary,
        unicode: UnicodeMap,
        warnings: &mut Vec<FontWarning>,
    ) -> Self {
        let name = name_entry(doc, cid_font, b"BaseFont").unwrap_or_else(|| "Unnamed".to_string());

        let default_width = resolved_entry(doc, cid_font, b"DW")
            .and_then(object_to_f64)
            .map(|w| w.round() as i32)
            .unwrap_or(DEFAULT_WIDTH);

        let mut skipped = 0;
        let widths = match resolved_entry(doc, cid_font, b"W") {
            Some(obj) => match obj.as_array() {
                Ok(arr) => parse_w_array(arr, doc, &mut skipped),
                Err(_) => {
                    skipped += 1;
                    BTreeMap::new()
                }
            },
            None => BTreeMap::new(),
        };
        if skipped > 0 {
            font_warn!(font = %name, skipped, "ignored malformed /W entries");
            warnings.push(
                FontWarning::with_code(
                    FontWarningCode::MalformedObject,
                    format!("ignored {skipped} malformed /W entries"),
                )
                .for_font(&name),
            );
        }

        let descriptor = resolved_dict(doc, cid_font, b"FontDescriptor");
        let (font_file, cff) = descriptor
            .map(|d| read_font_file(doc, d))
            .unwrap_or((None, false));
        let mut metrics = descriptor
            .map(|d| read_descriptor_metrics(doc, d))
            .unwrap_or_default();
        metrics.default_width = default_width;
        metrics.glyph_count = font_file
            .as_deref()
            .filter(|_| !cff)
            .and_then(|data| ttf_parser::Face::parse(data, 0).ok())
            .map(|face| u32::from(face.number_of_glyphs()))
            .unwrap_or_else(|| widths.keys().next_back().map_or(0, |&cid| cid + 1));
        let pdf_flags = descriptor
            .and_then(|d| resolved_entry(doc, d, b"Flags"))
            .and_then(object_to_u32)
            .map(|f| f as i32)
            .unwrap_or(super::flags::SYMBOLIC);

        let unicode_to_cid = match &unicode {
            UnicodeMap::Parsed(map) => {
                let mut reverse = HashMap::new();
                for (cid, text) in map.iter() {
                    let mut chars = text.chars();
                    if let (Some(ch), None) = (chars.next(), chars.next()) {
                        reverse.entry(u32::from(ch)).or_insert(cid);
                    }
                }
                reverse
            }
            UnicodeMap::Identity => HashMap::new(),
        };

        Self {
            name,
            widths,
            unicode,
            unicode_to_cid,
            metrics,
            pdf_flags,
            font_file,
            cff,
        }
    }

    /// The text mapping this program decodes with.
    pub fn unicode_map(&self) -> &UnicodeMap {
        &self.unicode
    }

    /// Whether the dictionary carried an embedded program.
    pub fn is_embedded(&self) -> bool {
        self.font_file.is_some()
    }

    fn width(&self, cid: u32) -> i32 {
        self.widths
            .get(&cid)
            .copied()
            .unwrap_or(self.metrics.default_width)
    }
}

impl FontProgram for DocumentFontProgram {
    fn font_name(&self) -> &str {
        &self.name
    }

    fn glyph_by_unicode(&self, unicode: u32) -> Option<Glyph> {
        let cid = match self.unicode {
            UnicodeMap::Identity => {
                char::from_u32(unicode)?;
                u32::from(u16::try_from(unicode).ok()?)
            }
            UnicodeMap::Parsed(_) => *self.unicode_to_cid.get(&unicode)?,
        };
        Some(Glyph::new(cid as i32, self.width(cid), Some(unicode)))
    }

    fn glyph_by_code(&self, code: u32) -> Option<Glyph> {
        if code == 0 {
            return Some(Glyph::new(0, self.width(0), None));
        }
        match self.unicode.lookup(code) {
            Some(text) => {
                let unicode = text.chars().next().map(u32::from);
                Some(Glyph::with_chars(code as i32, self.width(code), unicode, text))
            }
            None if self.widths.contains_key(&code) => {
                Some(Glyph::new(code as i32, self.width(code), None))
            }
            None => None,
        }
    }

    fn is_cff(&self) -> bool {
        self.cff
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        self.font_file.as_deref()
    }

    fn subset(&self, _used: &[u32], _close_composites: bool) -> Result<Vec<u8>, FontError> {
        Err(FontError::Subset(format!(
            "document font {} is not re-embedded",
            self.name
        )))
    }

    fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    fn pdf_flags(&self) -> i32 {
        self.pdf_flags
    }
}

/// Parse a /W (width) array for CID fonts.
///
/// The format is:
/// ```text
/// [ c [w1 w2 ...] c_first c_last w ... ]
/// ```
/// `c [w1 w2 ...]` assigns consecutive widths starting at CID `c`;
/// `c_first c_last w` assigns one width to a whole range.
pub(crate) fn parse_w_array(
    objects: &[Object],
    doc: &Document,
    skipped: &mut usize,
) -> BTreeMap<u32, i32> {
    let mut widths = BTreeMap::new();
    let mut i = 0;

    while i < objects.len() {
        let Some(cid_start) = object_to_u32(resolve_object(doc, &objects[i])) else {
            *skipped += 1;
            i += 1;
            continue;
        };
        i += 1;
        let Some(next) = objects.get(i).map(|o| resolve_object(doc, o)) else {
            *skipped += 1;
            break;
        };

        if let Ok(arr) = next.as_array() {
            for (j, obj) in arr.iter().enumerate() {
                let cid = u32::try_from(j).ok().and_then(|j| cid_start.checked_add(j));
                match (cid, object_to_f64(resolve_object(doc, obj))) {
                    (Some(cid), Some(w)) => {
                        widths.insert(cid, w.round() as i32);
                    }
                    _ => *skipped += 1,
                }
            }
            i += 1;
        } else if let Some(cid_end) = object_to_u32(next) {
            let width = objects
                .get(i + 1)
                .and_then(|o| object_to_f64(resolve_object(doc, o)));
            match width {
                Some(w) if cid_end >= cid_start && cid_end - cid_start < MAX_RANGE_SPAN => {
                    for cid in cid_start..=cid_end {
                        widths.insert(cid, w.round() as i32);
                    }
                }
                _ => *skipped += 1,
            }
            i += 2;
        } else {
            *skipped += 1;
            i += 1;
        }
    }

    widths
}

fn read_descriptor_metrics(doc: &Document, descriptor: &Dictionary) -> FontMetrics {
    let number = |key: &[u8]| resolved_entry(doc, descriptor, key).and_then(object_to_f64);
    let defaults = FontMetrics::default();

    let bbox = resolved_entry(doc, descriptor, b"FontBBox")
        .and_then(|o| o.as_array().ok())
        .filter(|arr| arr.len() == 4)
        .and_then(|arr| {
            let vals: Vec<i32> = arr
                .iter()
                .filter_map(|o| object_to_f64(resolve_object(doc, o)))
                .map(|v| v.round() as i32)
                .collect();
            <[i32; 4]>::try_from(vals).ok()
        })
        .unwrap_or(defaults.bbox);

    FontMetrics {
        bbox,
        ascent: number(b"Ascent").map_or(defaults.ascent, |v| v.round() as i32),
        descent: number(b"Descent").map_or(defaults.descent, |v| v.round() as i32),
        cap_height: number(b"CapHeight").map_or(defaults.cap_height, |v| v.round() as i32),
        italic_angle: number(b"ItalicAngle").map_or(0.0, |v| v as f32),
        stem_v: number(b"StemV").map_or(defaults.stem_v, |v| v.round() as i32),
        ..defaults
    }
}

/// Embedded program bytes and whether they are CFF (`FontFile3`).
fn read_font_file(doc: &Document, descriptor: &Dictionary) -> (Option<Vec<u8>>, bool) {
    for (key, cff) in [(&b"FontFile2"[..], false), (&b"FontFile3"[..], true)] {
        if let Some(Ok(stream)) = resolved_entry(doc, descriptor, key).map(Object::as_stream) {
            return (Some(stream_bytes(stream)), cff);
        }
    }
    (None, false)
}
