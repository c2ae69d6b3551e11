//! Reading a Type0 font back from an existing document.

use std::collections::{HashMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfcid_core::{CidFontType, CidSystemInfo, FontOptions, FontWarning, FontWarningCode};

use super::CompositeFontEncoder;
use crate::cmap::{
    CMapTable, IdentityCMap, ParsedCMap, ToUnicodeCMap, UnicodeMap, is_identity_name,
};
use crate::error::FontError;
use crate::log::font_debug;
use crate::objects::{
    name_entry, resolve_object, resolved_dict, resolved_entry, stream_bytes, text_entry,
};
use crate::program::{DocumentFontProgram, FontProgram, PredefinedCidFont};
use crate::registry::FontRegistry;

impl CompositeFontEncoder {
    /// Reconstruct the composite font stored at `font_id`.
    ///
    /// Text mapping is resolved from the `/ToUnicode` stream, then from the
    /// Unicode CMap of the descendant's character collection, then (for
    /// Identity encodings only) from the identity mapping with an
    /// [`FontWarningCode::UnknownCMap`] warning. A non-Identity encoding of
    /// a registered predefined font is read as that predefined font. When
    /// nothing resolves the font is rejected with
    /// [`FontError::UnresolvableFont`].
    ///
    /// The result is never re-embedded: [`flush`](Self::flush) returns
    /// `font_id` unchanged.
    pub fn from_document(
        doc: &Document,
        font_id: ObjectId,
        registry: &FontRegistry,
    ) -> Result<Self, FontError> {
        let font = doc.get_object(font_id)?.as_dict().map_err(|_| {
            FontError::Dictionary(format!("object {} {} is not a dictionary", font_id.0, font_id.1))
        })?;
        if name_entry(doc, font, b"Subtype").as_deref() != Some("Type0") {
            return Err(FontError::Dictionary("font is not a Type0 font".to_string()));
        }
        let base_font = name_entry(doc, font, b"BaseFont").unwrap_or_default();
        let cid_font = descendant_font(doc, font)?;
        let encoding = resolved_entry(doc, font, b"Encoding")
            .ok_or_else(|| FontError::Dictionary("missing /Encoding".to_string()))?;
        let encoding_name = encoding_cmap_name(encoding);
        let system_info = read_system_info(doc, cid_font);
        let unresolvable = || FontError::UnresolvableFont {
            font: base_font.clone(),
            encoding: encoding_name.clone(),
        };

        let mut warnings = Vec::new();
        let mut pending = Vec::new();
        let uni_map = FontRegistry::uni_map_from_ordering(&system_info.ordering);

        let cmap: Box<dyn CMapTable>;
        let program: Box<dyn FontProgram>;
        let embedded;
        if is_identity_name(&encoding_name) {
            let unicode = match read_to_unicode(doc, font, &mut pending) {
                Some(map) => map,
                None => match uni_map.and_then(|n| registry.unicode_map_from_uni_map(n)) {
                    Some(map) => map,
                    None => {
                        pending.push(FontWarning::with_code(
                            FontWarningCode::UnknownCMap,
                            format!(
                                "no Unicode mapping for ordering {}, using Identity",
                                system_info.ordering
                            ),
                        ));
                        UnicodeMap::Identity
                    }
                },
            };
            let doc_program =
                DocumentFontProgram::from_cid_font(doc, cid_font, unicode, &mut warnings);
            embedded = doc_program.is_embedded();
            cmap = Box::new(IdentityCMap::new(encoding_name.ends_with('V')));
            program = Box::new(doc_program);
        } else {
            let cid_font_name = name_entry(doc, cid_font, b"BaseFont").unwrap_or_default();
            let table = create_cmap(doc, encoding, registry).map_err(|_| unresolvable())?;
            match uni_map {
                Some(uni) if uni.starts_with("Uni") && registry.is_cid_font(&cid_font_name, uni) => {
                    let predefined = PredefinedCidFont::new(&cid_font_name, uni, registry)
                        .map_err(|_| unresolvable())?;
                    embedded = false;
                    program = Box::new(predefined);
                }
                _ => {
                    let unicode = match read_to_unicode(doc, font, &mut pending) {
                        Some(UnicodeMap::Parsed(map)) => Some(UnicodeMap::Parsed(
                            map.rekey(|code| table.code_to_cid(code)),
                        )),
                        // Codes are not CIDs here, so an Identity name says nothing.
                        Some(UnicodeMap::Identity) | None => {
                            uni_map.and_then(|n| registry.unicode_map_from_uni_map(n))
                        }
                    };
                    let unicode = unicode.ok_or_else(unresolvable)?;
                    let doc_program =
                        DocumentFontProgram::from_cid_font(doc, cid_font, unicode, &mut warnings);
                    embedded = doc_program.is_embedded();
                    program = Box::new(doc_program);
                }
            }
            cmap = table;
        }

        let subtype = name_entry(doc, cid_font, b"Subtype").unwrap_or_default();
        let cid_font_type = CidFontType::from_subtype(&subtype).unwrap_or_else(|| {
            pending.push(FontWarning::with_code(
                FontWarningCode::UnknownCidFontType,
                format!("unknown CID font subtype /{subtype}"),
            ));
            CidFontType::default()
        });
        font_debug!(
            font = %base_font,
            encoding = %encoding_name,
            subtype = %cid_font_type,
            embedded,
            "reconstructed composite font"
        );

        let mut encoder = Self {
            cid_font_type,
            vertical: cmap.is_vertical() || encoding_name.ends_with('V'),
            cmap,
            program,
            embedded,
            new_font: false,
            options: FontOptions {
                subset: false,
                ..FontOptions::default()
            },
            used: HashSet::new(),
            notdef_cache: HashMap::new(),
            symbol_table: None,
            warnings,
            object_id: Some(font_id),
            flushed: false,
        };
        for warning in pending {
            encoder.warn(warning);
        }
        Ok(encoder)
    }
}

fn descendant_font<'a>(
    doc: &'a Document,
    font: &'a Dictionary,
) -> Result<&'a Dictionary, FontError> {
    resolved_entry(doc, font, b"DescendantFonts")
        .and_then(|o| o.as_array().ok())
        .and_then(|arr| arr.first())
        .and_then(|o| resolve_object(doc, o).as_dict().ok())
        .ok_or_else(|| FontError::Dictionary("missing /DescendantFonts".to_string()))
}

/// Name of an `/Encoding` value: the name itself or a stream's `/CMapName`.
fn encoding_cmap_name(encoding: &Object) -> String {
    match encoding {
        Object::Name(name) => String::from_utf8_lossy(name).into_owned(),
        Object::Stream(stream) => stream
            .dict
            .get(b"CMapName")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn read_system_info(doc: &Document, cid_font: &Dictionary) -> CidSystemInfo {
    let Some(info) = resolved_dict(doc, cid_font, b"CIDSystemInfo") else {
        return CidSystemInfo::identity();
    };
    let supplement = resolved_entry(doc, info, b"Supplement")
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(0);
    CidSystemInfo::new(
        text_entry(doc, info, b"Registry").unwrap_or_else(|| "Adobe".to_string()),
        text_entry(doc, info, b"Ordering").unwrap_or_else(|| "Identity".to_string()),
        supplement,
    )
}

/// Text mapping from `/ToUnicode`: a parsed stream, or Identity for an
/// `/Identity-H` or `/Identity-V` name.
///
/// Malformed stream entries are dropped with a
/// [`FontWarningCode::MalformedObject`] warning.
fn read_to_unicode(
    doc: &Document,
    font: &Dictionary,
    pending: &mut Vec<FontWarning>,
) -> Option<UnicodeMap> {
    match resolved_entry(doc, font, b"ToUnicode")? {
        Object::Stream(stream) => {
            let (map, skipped) = ToUnicodeCMap::parse_with_skipped(&stream_bytes(stream));
            if skipped > 0 {
                pending.push(FontWarning::with_code(
                    FontWarningCode::MalformedObject,
                    format!("skipped {skipped} malformed /ToUnicode entries"),
                ));
            }
            Some(UnicodeMap::Parsed(map))
        }
        Object::Name(name) if is_identity_name(&String::from_utf8_lossy(name)) => {
            Some(UnicodeMap::Identity)
        }
        _ => None,
    }
}

/// CMap named or embedded by `/Encoding`.
///
/// Embedded CMap streams may name a parent through `usecmap` (or
/// `/UseCMap`); the parent must be registered.
fn create_cmap(
    doc: &Document,
    encoding: &Object,
    registry: &FontRegistry,
) -> Result<Box<dyn CMapTable>, FontError> {
    match encoding {
        Object::Name(name) => {
            let name = String::from_utf8_lossy(name);
            if let Some(identity) = IdentityCMap::from_name(&name) {
                return Ok(Box::new(identity));
            }
            Ok(Box::new(registry.load_cmap(&name)?))
        }
        Object::Stream(stream) => {
            let fallback = encoding_cmap_name(encoding);
            let mut cmap = ParsedCMap::parse(&stream_bytes(stream), &fallback)?;
            let use_cmap = match stream.dict.get(b"UseCMap").map(|o| resolve_object(doc, o)) {
                Ok(Object::Name(parent)) => Some(String::from_utf8_lossy(parent).into_owned()),
                _ => None,
            };
            if let Some(parent) = cmap.parent_name().map(str::to_string).or(use_cmap) {
                let parent = registry.load_cmap(&parent)?;
                cmap.inherit(&parent);
            }
            Ok(Box::new(cmap))
        }
        _ => Err(FontError::Dictionary("/Encoding is neither a name nor a stream".to_string())),
    }
}
