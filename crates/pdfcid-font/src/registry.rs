//! Predefined CID fonts and named CMap resources.
//!
//! A [`FontRegistry`] knows the standard non-embedded CJK fonts and the
//! CMap names of each Adobe character collection. CMap programs themselves
//! are external data and must be registered by name before a CMap other
//! than `Identity-H`/`Identity-V` can be loaded.

use std::collections::HashMap;
use std::path::Path;

use pdfcid_core::CidSystemInfo;

use crate::cmap::{ParsedCMap, ToUnicodeCMap, UnicodeMap, is_identity_name};
use crate::error::FontError;
use crate::log::font_debug;

/// `usecmap` chains longer than this are treated as cycles.
const MAX_USECMAP_DEPTH: usize = 8;

/// A character collection and the CMap names that address it.
#[derive(Debug, Clone)]
struct Collection {
    system_info: CidSystemInfo,
    /// Every CMap usable with fonts of this collection.
    cmaps: Vec<String>,
    /// The Unicode CMaps among them, in preference order.
    uni_maps: Vec<String>,
}

/// Registry of predefined CID fonts and CMap programs.
#[derive(Debug, Clone)]
pub struct FontRegistry {
    /// Font name → collection key (e.g. `Adobe_Japan1`).
    fonts: HashMap<String, String>,
    collections: HashMap<String, Collection>,
    cmap_sources: HashMap<String, Vec<u8>>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FontRegistry {
    /// A registry holding the standard Adobe CJK collections and fonts.
    pub fn new() -> Self {
        let mut registry = Self {
            fonts: HashMap::new(),
            collections: HashMap::new(),
            cmap_sources: HashMap::new(),
        };

        registry.add_collection(
            CidSystemInfo::new("Adobe", "CNS1", 4),
            &[
                "B5pc-H", "B5pc-V", "ETen-B5-H", "ETen-B5-V", "ETenms-B5-H", "ETenms-B5-V",
                "HKscs-B5-H", "HKscs-B5-V",
            ],
            &["UniCNS-UCS2-H", "UniCNS-UCS2-V", "UniCNS-UTF16-H", "UniCNS-UTF16-V"],
        );
        registry.add_collection(
            CidSystemInfo::new("Adobe", "GB1", 4),
            &[
                "GB-EUC-H", "GB-EUC-V", "GBK-EUC-H", "GBK-EUC-V", "GBK2K-H", "GBK2K-V",
                "GBKp-EUC-H", "GBKp-EUC-V", "GBpc-EUC-H", "GBpc-EUC-V",
            ],
            &["UniGB-UCS2-H", "UniGB-UCS2-V", "UniGB-UTF16-H", "UniGB-UTF16-V"],
        );
        registry.add_collection(
            CidSystemInfo::new("Adobe", "Japan1", 4),
            &[
                "83pv-RKSJ-H", "90ms-RKSJ-H", "90ms-RKSJ-V", "90msp-RKSJ-H", "90msp-RKSJ-V",
                "90pv-RKSJ-H", "Add-RKSJ-H", "Add-RKSJ-V", "EUC-H", "EUC-V", "Ext-RKSJ-H",
                "Ext-RKSJ-V", "H", "V",
            ],
            &[
                "UniJIS-UCS2-H", "UniJIS-UCS2-V", "UniJIS-UCS2-HW-H", "UniJIS-UCS2-HW-V",
                "UniJIS-UTF16-H", "UniJIS-UTF16-V",
            ],
        );
        registry.add_collection(
            CidSystemInfo::new("Adobe", "Korea1", 2),
            &[
                "KSC-EUC-H", "KSC-EUC-V", "KSCms-UHC-H", "KSCms-UHC-HW-H", "KSCms-UHC-HW-V",
                "KSCms-UHC-V", "KSCpc-EUC-H",
            ],
            &["UniKS-UCS2-H", "UniKS-UCS2-V", "UniKS-UTF16-H", "UniKS-UTF16-V"],
        );

        for (font, key) in [
            ("HeiseiKakuGo-W5", "Adobe_Japan1"),
            ("HeiseiMin-W3", "Adobe_Japan1"),
            ("KozMinPro-Regular", "Adobe_Japan1"),
            ("HYGoThic-Medium", "Adobe_Korea1"),
            ("HYSMyeongJo-Medium", "Adobe_Korea1"),
            ("HYSMyeongJoStd-Medium", "Adobe_Korea1"),
            ("MHei-Medium", "Adobe_CNS1"),
            ("MSung-Light", "Adobe_CNS1"),
            ("MSungStd-Light", "Adobe_CNS1"),
            ("STSong-Light", "Adobe_GB1"),
            ("STSongStd-Light", "Adobe_GB1"),
        ] {
            registry.fonts.insert(font.to_string(), key.to_string());
        }
        registry
    }

    fn add_collection(&mut self, system_info: CidSystemInfo, cmaps: &[&str], uni_maps: &[&str]) {
        let uni_maps: Vec<String> = uni_maps.iter().map(|s| s.to_string()).collect();
        let mut all: Vec<String> = cmaps.iter().map(|s| s.to_string()).collect();
        all.extend(uni_maps.iter().cloned());
        self.collections.insert(
            system_info.collection_key(),
            Collection {
                system_info,
                cmaps: all,
                uni_maps,
            },
        );
    }

    /// Register a predefined font belonging to an existing collection.
    pub fn register_font(&mut self, name: impl Into<String>, collection_key: &str) -> bool {
        if !self.collections.contains_key(collection_key) {
            return false;
        }
        self.fonts.insert(name.into(), collection_key.to_string());
        true
    }

    /// Register CMap program text under `name`.
    pub fn register_cmap(&mut self, name: impl Into<String>, program: impl Into<Vec<u8>>) {
        self.cmap_sources.insert(name.into(), program.into());
    }

    /// Register every file of a directory as a CMap named after the file.
    ///
    /// Returns the number of CMaps registered.
    pub fn register_cmap_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize, FontError> {
        let mut count = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let name = name.to_string();
            let program = std::fs::read(&path)?;
            font_debug!(cmap = %name, "registered CMap resource");
            self.register_cmap(name, program);
            count += 1;
        }
        Ok(count)
    }

    /// Whether a CMap program is registered under `name`.
    pub fn has_cmap(&self, name: &str) -> bool {
        self.cmap_sources.contains_key(name)
    }

    /// Load and fully resolve (through `usecmap`) a registered CMap.
    pub fn load_cmap(&self, name: &str) -> Result<ParsedCMap, FontError> {
        let mut cmap = self.parse_registered(name)?;
        let mut depth = 0;
        while let Some(parent_name) = cmap.parent_name().map(str::to_string) {
            depth += 1;
            if depth > MAX_USECMAP_DEPTH {
                return Err(FontError::Parse(format!(
                    "usecmap chain of {name} is too deep"
                )));
            }
            let parent = self.parse_registered(&parent_name)?;
            cmap.inherit(&parent);
            if let Some(grand) = parent.parent_name() {
                cmap.set_parent(grand.to_string());
            }
        }
        Ok(cmap)
    }

    fn parse_registered(&self, name: &str) -> Result<ParsedCMap, FontError> {
        let program = self
            .cmap_sources
            .get(name)
            .ok_or_else(|| FontError::CMapNotFound(name.to_string()))?;
        ParsedCMap::parse(program, name)
    }

    /// Split `"Name,Style"` into the font name and its style suffix.
    pub fn split_style(font: &str) -> (&str, Option<&str>) {
        match font.split_once(',') {
            Some((name, style)) if !style.is_empty() => (name, Some(style)),
            Some((name, _)) => (name, None),
            None => (font, None),
        }
    }

    /// Collection key of a predefined font (style suffix ignored).
    pub fn font_collection(&self, font: &str) -> Option<&str> {
        let (name, _) = Self::split_style(font);
        self.fonts.get(name).map(String::as_str)
    }

    /// Whether `font` is a predefined CID font usable with `cmap`.
    pub fn is_cid_font(&self, font: &str, cmap: &str) -> bool {
        self.font_collection(font)
            .and_then(|key| self.collections.get(key))
            .is_some_and(|c| c.cmaps.iter().any(|n| n == cmap))
    }

    /// System info of a collection.
    pub fn system_info(&self, collection_key: &str) -> Option<&CidSystemInfo> {
        self.collections.get(collection_key).map(|c| &c.system_info)
    }

    /// Unicode CMap names of a collection, in preference order.
    pub fn uni_maps(&self, collection_key: &str) -> &[String] {
        self.collections
            .get(collection_key)
            .map(|c| c.uni_maps.as_slice())
            .unwrap_or(&[])
    }

    /// Pick the Unicode CMap used to map text to CIDs for a collection.
    ///
    /// The first name matching the writing direction wins; when none does
    /// the last candidate is returned.
    pub fn compatible_uni_map(&self, collection_key: &str, vertical: bool) -> Option<&str> {
        let names = self.uni_maps(collection_key);
        names
            .iter()
            .find(|n| n.ends_with('V') == vertical)
            .or_else(|| names.last())
            .map(String::as_str)
    }

    /// Unicode CMap conventionally paired with a collection ordering.
    pub fn uni_map_from_ordering(ordering: &str) -> Option<&'static str> {
        match ordering {
            "CNS1" => Some("UniCNS-UTF16-H"),
            "Japan1" => Some("UniJIS-UTF16-H"),
            "Korea1" => Some("UniKS-UTF16-H"),
            "GB1" => Some("UniGB-UTF16-H"),
            "Identity" => Some("Identity-H"),
            _ => None,
        }
    }

    /// Text mapping derived from a Unicode CMap name.
    ///
    /// `Identity-H`/`Identity-V` give the identity mapping; other names
    /// must be registered. Returns `None` when the CMap is unavailable.
    pub fn unicode_map_from_uni_map(&self, name: &str) -> Option<UnicodeMap> {
        if is_identity_name(name) {
            return Some(UnicodeMap::Identity);
        }
        let cmap = self.load_cmap(name).ok()?;
        Some(UnicodeMap::Parsed(ToUnicodeCMap::from_uni_cmap(&cmap)))
    }
}
