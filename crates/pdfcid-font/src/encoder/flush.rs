//! Materializing the font as PDF objects.
//!
//! Flush builds, bottom-up, the font file stream, the font descriptor (with
//! `/CIDSet`), the descendant CIDFont, the `/ToUnicode` stream and finally
//! the Type0 font dictionary under the id handed out by
//! [`CompositeFontEncoder::object_id`].

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use pdfcid_core::{
    CidFontType, CidSystemInfo, FontWarning, FontWarningCode, PdfVersion, compact_ranges,
};

use super::{CompositeFontEncoder, WidthArray};
use crate::error::FontError;
use crate::log::font_debug;
use crate::objects::literal;

impl CompositeFontEncoder {
    /// The indirect reference of the Type0 font dictionary.
    ///
    /// Reserved on first call so content streams can refer to the font
    /// before it is flushed.
    pub fn object_id(&mut self, doc: &mut Document) -> ObjectId {
        *self.object_id.get_or_insert_with(|| doc.new_object_id())
    }

    /// Write the font into `doc` and return the id of its Type0 dictionary.
    ///
    /// Runs once: later calls return the same id without touching `doc`.
    /// Fonts read back from a document are not rewritten. The width array
    /// is built before anything is added, so a vertical font fails with
    /// [`FontError::NotImplemented`] and leaves `doc` unchanged.
    pub fn flush(&mut self, doc: &mut Document) -> Result<ObjectId, FontError> {
        if let Some(id) = self.object_id {
            if self.flushed || !self.new_font {
                return Ok(id);
            }
        }
        let font = if self.embedded {
            self.flush_embedded(doc)?
        } else {
            self.flush_predefined(doc)?
        };
        let id = self.object_id(doc);
        doc.objects.insert(id, Object::Dictionary(font));
        self.flushed = true;
        font_debug!(
            font = self.program.font_name(),
            id = ?id,
            glyphs = self.used.len(),
            "flushed composite font"
        );
        Ok(id)
    }

    fn flush_predefined(&mut self, doc: &mut Document) -> Result<Dictionary, FontError> {
        let widths = self.build_width_array()?;
        let mut name = self.program.font_name().to_string();
        if let Some(style) = self.program.style() {
            name = format!("{name}-{style}");
        }
        let system_info = self
            .program
            .registry()
            .unwrap_or_else(|| self.cmap.system_info())
            .clone();

        let descriptor_id = doc.add_object(self.font_descriptor(&name));
        let cid_font = self.cid_font_dict(&name, descriptor_id, &system_info, &widths);
        let cid_font_id = doc.add_object(cid_font);

        Ok(self.type0_dict(
            &format!("{name}-{}", self.cmap.name()),
            cid_font_id,
            None,
        ))
    }

    fn flush_embedded(&mut self, doc: &mut Document) -> Result<Dictionary, FontError> {
        self.complete_ranges();
        let cids = self.used_cids();
        let widths = self.width_array_for(&cids)?;
        let to_unicode = self.to_unicode_for(&cids);

        let (program, subsetted) = self.program_bytes(&cids)?;
        let mut name = self.program.font_name().to_string();
        if self.options.subset && subsetted {
            name = format!("{}{name}", subset_prefix(&name, &cids));
        }
        let cff = self.cid_font_type == CidFontType::Type0;

        let mut stream_dict = dictionary! {
            "Length1" => Object::Integer(program.len() as i64),
        };
        if cff {
            stream_dict.set("Subtype", "CIDFontType0C");
        }
        let font_file_id = doc.add_object(Stream::new(stream_dict, program));

        let mut descriptor = self.font_descriptor(&name);
        descriptor.set(
            if cff { "FontFile3" } else { "FontFile2" },
            Object::Reference(font_file_id),
        );
        let version = PdfVersion::parse(&doc.version).unwrap_or_default();
        if !version.deprecates_cid_set() {
            let cid_set_id = doc.add_object(Stream::new(Dictionary::new(), self.cid_set()));
            descriptor.set("CIDSet", Object::Reference(cid_set_id));
        }
        let descriptor_id = doc.add_object(descriptor);

        // CFF-backed CIDFonts are named after their CMap as well.
        let base_font = if cff {
            format!("{name}-{}", self.cmap.name())
        } else {
            name
        };
        let system_info = self.cmap.system_info().clone();
        let cid_font = self.cid_font_dict(&base_font, descriptor_id, &system_info, &widths);
        let cid_font_id = doc.add_object(cid_font);

        let to_unicode_id = to_unicode
            .map(|text| doc.add_object(Stream::new(Dictionary::new(), text.into_bytes())));

        Ok(self.type0_dict(&base_font, cid_font_id, to_unicode_id))
    }

    /// Add every glyph whose character falls in the configured ranges when
    /// the font is embedded without whole-document subsetting.
    fn complete_ranges(&mut self) {
        if self.options.subset {
            return;
        }
        let ranges = match &self.options.subset_ranges {
            Some(ranges) => compact_ranges(ranges),
            None if self.program.is_collection_member() => vec![0..=0xFFFF],
            None => return,
        };
        let before = self.used.len();
        for (code, gid) in self.program.active_code_to_glyph_map() {
            if !self.used.contains(&gid) && ranges.iter().any(|r| r.contains(&code)) {
                self.used.insert(gid);
            }
        }
        font_debug!(
            font = self.program.font_name(),
            added = self.used.len() - before,
            "completed used glyphs from ranges"
        );
    }

    /// The program bytes to embed, subset when configured, and whether the
    /// subset was used.
    ///
    /// A failing subset falls back to the complete program with a
    /// [`FontWarningCode::SubsetFallback`] warning. Standalone CFF programs
    /// are always embedded whole.
    fn program_bytes(&mut self, cids: &[u32]) -> Result<(Vec<u8>, bool), FontError> {
        let raw = self.program.raw_bytes().map(<[u8]>::to_vec).ok_or_else(|| {
            FontError::Program(format!(
                "font {} has no program bytes to embed",
                self.program.font_name()
            ))
        })?;
        // Raw bytes of a collection member are the whole collection.
        let wanted = self.program.is_collection_member()
            || (!self.program.is_cff()
                && (self.options.subset || self.options.subset_ranges.is_some()));
        if !wanted {
            return Ok((raw, false));
        }
        match self.program.subset(cids, true) {
            Ok(bytes) => {
                font_debug!(
                    font = self.program.font_name(),
                    full = raw.len(),
                    subset = bytes.len(),
                    "subset font program"
                );
                Ok((bytes, true))
            }
            Err(e) => {
                self.warn(FontWarning::with_code(
                    FontWarningCode::SubsetFallback,
                    format!("embedding the full font program: {e}"),
                ));
                Ok((raw, false))
            }
        }
    }

    fn font_descriptor(&self, name: &str) -> Dictionary {
        let metrics = self.program.metrics();
        let mut descriptor = dictionary! {
            "Type" => "FontDescriptor",
            "FontName" => Object::Name(name.as_bytes().to_vec()),
            "FontBBox" => Object::Array(
                metrics.bbox.iter().map(|&v| Object::Integer(i64::from(v))).collect(),
            ),
            "Ascent" => Object::Integer(i64::from(metrics.ascent)),
            "Descent" => Object::Integer(i64::from(metrics.descent)),
            "CapHeight" => Object::Integer(i64::from(metrics.cap_height)),
            "ItalicAngle" => Object::Real(metrics.italic_angle),
            "StemV" => Object::Integer(i64::from(metrics.stem_v)),
            "Flags" => Object::Integer(i64::from(self.program.pdf_flags())),
        };
        if let Some(panose) = self.program.panose() {
            descriptor.set(
                "Style",
                dictionary! {
                    "Panose" => Object::String(panose.to_vec(), StringFormat::Hexadecimal),
                },
            );
        }
        descriptor
    }

    fn cid_font_dict(
        &self,
        base_font: &str,
        descriptor_id: ObjectId,
        system_info: &CidSystemInfo,
        widths: &WidthArray,
    ) -> Dictionary {
        let mut dict = dictionary! {
            "Type" => "Font",
            "Subtype" => self.cid_font_type.subtype(),
            "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
            "FontDescriptor" => Object::Reference(descriptor_id),
            "CIDSystemInfo" => dictionary! {
                "Registry" => literal(&system_info.registry),
                "Ordering" => literal(&system_info.ordering),
                "Supplement" => Object::Integer(system_info.supplement),
            },
        };
        if self.cid_font_type == CidFontType::Type2 {
            dict.set("CIDToGIDMap", "Identity");
        }
        dict.set(
            "DW",
            Object::Integer(i64::from(self.program.metrics().default_width)),
        );
        if !widths.is_empty() {
            dict.set("W", widths.to_object());
        }
        dict
    }

    fn type0_dict(
        &self,
        base_font: &str,
        cid_font_id: ObjectId,
        to_unicode_id: Option<ObjectId>,
    ) -> Dictionary {
        let mut dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
            "Encoding" => Object::Name(self.cmap.name().as_bytes().to_vec()),
            "DescendantFonts" => vec![Object::Reference(cid_font_id)],
        };
        if let Some(id) = to_unicode_id {
            dict.set("ToUnicode", Object::Reference(id));
        }
        dict
    }
}

/// Six uppercase letters and `+`, derived from the font name and the glyphs
/// kept (FNV-1a).
fn subset_prefix(name: &str, cids: &[u32]) -> String {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes().chain(cids.iter().flat_map(|cid| cid.to_be_bytes())) {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let mut prefix = String::with_capacity(7);
    for _ in 0..6 {
        prefix.push(char::from(b'A' + (hash % 26) as u8));
        hash /= 26;
    }
    prefix.push('+');
    prefix
}
