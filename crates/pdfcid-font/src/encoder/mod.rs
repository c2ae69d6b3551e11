//! The composite (Type0) font encoder.
//!
//! A [`CompositeFontEncoder`] is created once per font use in a document in
//! one of three ways:
//!
//! - [`CompositeFontEncoder::embedded`]: an embedded TrueType/OpenType
//!   program addressed through `Identity-H`/`Identity-V`;
//! - [`CompositeFontEncoder::predefined`]: a non-embedded CJK font with a
//!   named CMap;
//! - [`CompositeFontEncoder::from_document`]: a Type0 font dictionary read
//!   back from an existing PDF.
//!
//! It accumulates every CID it emits and is sealed by a single
//! [`flush`](CompositeFontEncoder::flush).

mod cid_set;
mod decode;
mod encode;
mod flush;
mod reconstruct;
mod to_unicode;
mod widths;

use std::collections::{HashMap, HashSet};

use lopdf::ObjectId;
use pdfcid_core::{CidFontType, FontOptions, FontWarning, Glyph, PdfDocEncoding};

use crate::cmap::{CMapTable, IdentityCMap};
use crate::error::FontError;
use crate::log::{font_debug, font_warn};
use crate::program::{FontProgram, PredefinedCidFont};
use crate::registry::FontRegistry;

pub use cid_set::cid_set_bytes;
pub use widths::WidthArray;

/// Encoder and serializer for one composite font.
///
/// Not safe for concurrent use: encode and decode mutate the used-CID set
/// and the `.notdef` substitution cache.
#[derive(Debug)]
pub struct CompositeFontEncoder {
    cid_font_type: CidFontType,
    cmap: Box<dyn CMapTable>,
    program: Box<dyn FontProgram>,
    vertical: bool,
    embedded: bool,
    new_font: bool,
    options: FontOptions,
    used: HashSet<u32>,
    notdef_cache: HashMap<u32, Glyph>,
    symbol_table: Option<PdfDocEncoding>,
    warnings: Vec<FontWarning>,
    object_id: Option<ObjectId>,
    flushed: bool,
}

impl CompositeFontEncoder {
    /// Composite font over an embedded program.
    ///
    /// Only `Identity-H` and `Identity-V` are accepted; the program must
    /// allow embedding.
    pub fn embedded<P>(program: P, cmap: &str, options: FontOptions) -> Result<Self, FontError>
    where
        P: FontProgram + 'static,
    {
        let identity = IdentityCMap::from_name(cmap)
            .ok_or_else(|| FontError::UnsupportedCMap(cmap.to_string()))?;
        if !program.allows_embedding() {
            let name = match program.style() {
                Some(style) => format!("{}{style}", program.font_name()),
                None => program.font_name().to_string(),
            };
            return Err(FontError::EmbeddingRestricted(name));
        }

        let cid_font_type = if program.is_cff() {
            CidFontType::Type0
        } else {
            CidFontType::Type2
        };
        let symbol_table = program.is_symbolic().then(PdfDocEncoding::new);
        font_debug!(
            font = program.font_name(),
            cmap,
            subtype = %cid_font_type,
            "created embedded composite font"
        );

        Ok(Self {
            cid_font_type,
            vertical: identity.is_vertical(),
            cmap: Box::new(identity),
            program: Box::new(program),
            embedded: true,
            new_font: true,
            options,
            used: HashSet::new(),
            notdef_cache: HashMap::new(),
            symbol_table,
            warnings: Vec::new(),
            object_id: None,
            flushed: false,
        })
    }

    /// Composite font over a predefined (non-embedded) CJK font.
    ///
    /// `font` may carry a `,Style` suffix. The (font, CMap) pair must be
    /// registered and the CMap program must be loadable from `registry`.
    pub fn predefined(
        font: &str,
        cmap: &str,
        registry: &FontRegistry,
        options: FontOptions,
    ) -> Result<Self, FontError> {
        if !registry.is_cid_font(font, cmap) {
            return Err(FontError::NotCjkFont {
                font: font.to_string(),
                cmap: cmap.to_string(),
            });
        }
        let vertical = cmap.ends_with('V');
        let collection = registry.font_collection(font).unwrap_or_default();
        let uni_map = registry
            .compatible_uni_map(collection, vertical)
            .unwrap_or_default()
            .to_string();
        let program = PredefinedCidFont::new(font, &uni_map, registry)?;
        let table = registry.load_cmap(cmap)?;
        font_debug!(font, cmap, uni_map = %uni_map, "created predefined composite font");

        Ok(Self {
            cid_font_type: CidFontType::Type0,
            cmap: Box::new(table),
            program: Box::new(program),
            vertical,
            embedded: false,
            new_font: true,
            options,
            used: HashSet::new(),
            notdef_cache: HashMap::new(),
            symbol_table: None,
            warnings: Vec::new(),
            object_id: None,
            flushed: false,
        })
    }

    /// CID font subtype fixed at construction.
    pub fn cid_font_type(&self) -> CidFontType {
        self.cid_font_type
    }

    pub fn cmap(&self) -> &dyn CMapTable {
        self.cmap.as_ref()
    }

    pub fn program(&self) -> &dyn FontProgram {
        self.program.as_ref()
    }

    pub fn is_vertical(&self) -> bool {
        self.vertical
    }

    /// Whether the font program is (or will be) embedded in the document.
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// Whether this font is being created, as opposed to read back from a
    /// document.
    pub fn is_new_font(&self) -> bool {
        self.new_font
    }

    /// Whether flushing subsets the embedded program.
    pub fn is_subset(&self) -> bool {
        self.options.subset
    }

    pub fn options(&self) -> &FontOptions {
        &self.options
    }

    /// Every CID emitted so far, ascending.
    pub fn used_cids(&self) -> Vec<u32> {
        let mut cids: Vec<u32> = self.used.iter().copied().collect();
        cids.sort_unstable();
        cids
    }

    /// Whether `flush` has completed.
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// Diagnostics recorded so far.
    pub fn warnings(&self) -> &[FontWarning] {
        &self.warnings
    }

    /// Drain the recorded diagnostics.
    pub fn take_warnings(&mut self) -> Vec<FontWarning> {
        std::mem::take(&mut self.warnings)
    }

    fn warn(&mut self, warning: FontWarning) {
        let warning = warning.for_font(self.program.font_name());
        font_warn!("{warning}");
        if self.options.collect_warnings {
            self.warnings.push(warning);
        }
    }

    fn mark_used(&mut self, code: i32) -> u32 {
        let cid = u32::try_from(code).unwrap_or(0);
        self.used.insert(cid);
        cid
    }
}
