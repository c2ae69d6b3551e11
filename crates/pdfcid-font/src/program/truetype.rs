use std::collections::{BTreeMap, HashMap};

use pdfcid_core::Glyph;
use ttf_parser::{Face, GlyphId, PlatformId, Tag, name_id};

use super::{DEFAULT_WIDTH, FontMetrics, FontProgram, flags, subset_truetype};
use crate::error::FontError;

/// Microsoft symbol encoding of the Windows platform.
const WINDOWS_SYMBOL_ENCODING: u16 = 0;

/// OS/2 `fsType` bit: restricted license embedding.
const FS_TYPE_RESTRICTED: u16 = 0x0002;

/// A TrueType or OpenType font program loaded for embedding.
///
/// Everything the encoder needs is read once at load time; the binary is
/// kept for embedding and subsetting.
#[derive(Debug, Clone)]
pub struct TrueTypeProgram {
    data: Vec<u8>,
    index: u32,
    collection: bool,
    name: String,
    metrics: FontMetrics,
    widths: Vec<i32>,
    unicode_to_gid: HashMap<u32, u32>,
    gid_to_unicode: HashMap<u32, u32>,
    active_cmap: BTreeMap<u32, u32>,
    symbolic: bool,
    cff: bool,
    embeddable: bool,
    pdf_flags: i32,
    panose: Option<Vec<u8>>,
}

impl TrueTypeProgram {
    /// Load a standalone font file.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        Self::from_collection(data, 0)
    }

    /// Load face `index` of a font file; collections (`ttcf`) are accepted.
    pub fn from_collection(data: Vec<u8>, index: u32) -> Result<Self, FontError> {
        let collection = ttf_parser::fonts_in_collection(&data).is_some();
        let info = {
            let face = Face::parse(&data, index)
                .map_err(|e| FontError::Program(format!("cannot parse font face {index}: {e}")))?;
            FaceInfo::read(&face)
        };

        Ok(Self {
            data,
            index,
            collection,
            name: info.name,
            metrics: info.metrics,
            widths: info.widths,
            unicode_to_gid: info.unicode_to_gid,
            gid_to_unicode: info.gid_to_unicode,
            active_cmap: info.active_cmap,
            symbolic: info.symbolic,
            cff: info.cff,
            embeddable: info.embeddable,
            pdf_flags: info.pdf_flags,
            panose: info.panose,
        })
    }

    /// Read a font file from disk.
    pub fn open(path: impl AsRef<std::path::Path>, index: u32) -> Result<Self, FontError> {
        let data = std::fs::read(path)?;
        Self::from_collection(data, index)
    }

    /// Index of the face inside its file.
    pub fn face_index(&self) -> u32 {
        self.index
    }

    fn glyph(&self, gid: u32, unicode: Option<u32>) -> Option<Glyph> {
        let width = *self.widths.get(gid as usize)?;
        Some(Glyph::new(gid as i32, width, unicode))
    }
}

impl FontProgram for TrueTypeProgram {
    fn font_name(&self) -> &str {
        &self.name
    }

    fn glyph_by_unicode(&self, unicode: u32) -> Option<Glyph> {
        let gid = *self.unicode_to_gid.get(&unicode)?;
        self.glyph(gid, Some(unicode))
    }

    fn glyph_by_code(&self, code: u32) -> Option<Glyph> {
        self.glyph(code, self.gid_to_unicode.get(&code).copied())
    }

    fn is_symbolic(&self) -> bool {
        self.symbolic
    }

    fn is_cff(&self) -> bool {
        self.cff
    }

    fn allows_embedding(&self) -> bool {
        self.embeddable
    }

    fn is_collection_member(&self) -> bool {
        self.collection
    }

    fn active_code_to_glyph_map(&self) -> BTreeMap<u32, u32> {
        self.active_cmap.clone()
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(&self.data)
    }

    fn subset(&self, used: &[u32], close_composites: bool) -> Result<Vec<u8>, FontError> {
        if self.cff {
            return Err(FontError::Subset(
                "CFF outlines are embedded without subsetting".to_string(),
            ));
        }
        subset_truetype(&self.data, self.index, used, close_composites)
    }

    fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    fn pdf_flags(&self) -> i32 {
        self.pdf_flags
    }

    fn panose(&self) -> Option<&[u8]> {
        self.panose.as_deref()
    }
}

/// Everything extracted from a parsed face.
struct FaceInfo {
    name: String,
    metrics: FontMetrics,
    widths: Vec<i32>,
    unicode_to_gid: HashMap<u32, u32>,
    gid_to_unicode: HashMap<u32, u32>,
    active_cmap: BTreeMap<u32, u32>,
    symbolic: bool,
    cff: bool,
    embeddable: bool,
    pdf_flags: i32,
    panose: Option<Vec<u8>>,
}

impl FaceInfo {
    fn read(face: &Face<'_>) -> Self {
        let upem = f64::from(face.units_per_em().max(1));
        let scale = |v: f64| (v * 1000.0 / upem).round() as i32;

        let glyph_count = u32::from(face.number_of_glyphs());
        let widths = (0..face.number_of_glyphs())
            .map(|id| {
                face.glyph_hor_advance(GlyphId(id))
                    .map(|adv| scale(f64::from(adv)))
                    .unwrap_or(0)
            })
            .collect();

        let raw = face.raw_face();
        let os2 = raw.table(Tag::from_bytes(b"OS/2"));
        let post = raw.table(Tag::from_bytes(b"post"));
        let head = raw.table(Tag::from_bytes(b"head"));

        let italic_angle = post
            .and_then(|t| be_i32(t, 4))
            .map(|fixed| fixed as f32 / 65536.0)
            .unwrap_or(0.0);
        let fixed_pitch = post.and_then(|t| be_u32(t, 12)).is_some_and(|v| v != 0);
        let bold = head.and_then(|t| be_u16(t, 44)).is_some_and(|s| s & 1 != 0);
        let fs_type = os2.and_then(|t| be_u16(t, 8)).unwrap_or(0);
        let panose = os2.and_then(|t| t.get(30..42)).map(<[u8]>::to_vec);

        let bbox = face.global_bounding_box();
        let ascent = scale(f64::from(face.ascender()));
        let descent = scale(f64::from(face.descender()));
        let metrics = FontMetrics {
            glyph_count,
            default_width: DEFAULT_WIDTH,
            bbox: [
                scale(f64::from(bbox.x_min)),
                scale(f64::from(bbox.y_min)),
                scale(f64::from(bbox.x_max)),
                scale(f64::from(bbox.y_max)),
            ],
            ascent,
            descent,
            cap_height: face
                .capital_height()
                .map(|h| scale(f64::from(h)))
                .unwrap_or(ascent),
            italic_angle,
            stem_v: 80,
        };

        let (active_cmap, symbolic) = read_cmap(face);
        let mut unicode_to_gid = HashMap::with_capacity(active_cmap.len());
        let mut gid_to_unicode = HashMap::with_capacity(active_cmap.len());
        for (&code, &gid) in &active_cmap {
            unicode_to_gid.insert(code, gid);
            gid_to_unicode.entry(gid).or_insert(code);
        }

        let mut pdf_flags = if symbolic {
            flags::SYMBOLIC
        } else {
            flags::NONSYMBOLIC
        };
        if fixed_pitch {
            pdf_flags |= flags::FIXED_PITCH;
        }
        if italic_angle != 0.0 {
            pdf_flags |= flags::ITALIC;
        }
        if bold {
            pdf_flags |= flags::FORCE_BOLD;
        }

        Self {
            name: read_name(face),
            metrics,
            widths,
            unicode_to_gid,
            gid_to_unicode,
            active_cmap,
            symbolic,
            cff: raw.table(Tag::from_bytes(b"CFF ")).is_some(),
            embeddable: fs_type & FS_TYPE_RESTRICTED == 0,
            pdf_flags,
            panose,
        }
    }
}

/// Build the active code → glyph map.
///
/// Unicode subtables win; a font with only a Windows symbol subtable is
/// symbolic and its `0xF0xx` codes are folded to single bytes.
fn read_cmap(face: &Face<'_>) -> (BTreeMap<u32, u32>, bool) {
    let mut unicode = BTreeMap::new();
    let mut symbol = BTreeMap::new();
    let Some(cmap) = face.tables().cmap else {
        return (unicode, false);
    };

    for subtable in cmap.subtables {
        let is_symbol = subtable.platform_id == PlatformId::Windows
            && subtable.encoding_id == WINDOWS_SYMBOL_ENCODING;
        if !is_symbol && !subtable.is_unicode() {
            continue;
        }
        subtable.codepoints(|code| {
            let Some(gid) = subtable.glyph_index(code) else {
                return;
            };
            if is_symbol {
                let byte = if code & 0xFF00 == 0xF000 { code & 0xFF } else { code };
                symbol.entry(byte).or_insert(u32::from(gid.0));
            } else {
                unicode.entry(code).or_insert(u32::from(gid.0));
            }
        });
    }

    if unicode.is_empty() && !symbol.is_empty() {
        (symbol, true)
    } else {
        (unicode, false)
    }
}

/// PostScript name, falling back to the family name. Spaces are removed
/// so the result is usable as a PDF name.
fn read_name(face: &Face<'_>) -> String {
    let lookup = |id: u16| {
        face.names()
            .into_iter()
            .filter(|n| n.name_id == id)
            .find_map(|n| n.to_string())
    };
    lookup(name_id::POST_SCRIPT_NAME)
        .or_else(|| lookup(name_id::FAMILY))
        .map(|n| n.chars().filter(|c| !c.is_whitespace()).collect())
        .filter(|n: &String| !n.is_empty())
        .unwrap_or_else(|| "Unnamed".to_string())
}

fn be_u16(data: &[u8], offset: usize) -> Option<u16> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
}

fn be_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
}

fn be_i32(data: &[u8], offset: usize) -> Option<i32> {
    be_u32(data, offset).map(|v| v as i32)
}
