//! Behavioural properties of the composite font encoder, checked against
//! the synthetic TrueType font and an in-memory font program.

mod common;

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use lopdf::{Dictionary, Document, ObjectId};
use pdfcid_font::{
    CompositeFontEncoder, FontError, FontMetrics, FontOptions, FontProgram, FontRegistry,
    FontWarningCode, Glyph, TrueTypeProgram,
};

use common::sample_font;

/// A font program held in memory: `cid → (unicode, width)`.
#[derive(Debug)]
struct FakeProgram {
    glyphs: BTreeMap<u32, (u32, i32)>,
    metrics: FontMetrics,
    bytes: Vec<u8>,
    cff: bool,
    fail_subset: bool,
    subset_calls: Rc<Cell<usize>>,
}

impl FakeProgram {
    fn new(glyphs: impl IntoIterator<Item = (u32, u32, i32)>) -> Self {
        let glyphs: BTreeMap<u32, (u32, i32)> =
            glyphs.into_iter().map(|(cid, u, w)| (cid, (u, w))).collect();
        let glyph_count = glyphs.keys().next_back().map_or(1, |&cid| cid + 1);
        Self {
            glyphs,
            metrics: FontMetrics {
                glyph_count,
                ..FontMetrics::default()
            },
            bytes: b"FAKE-FONT-PROGRAM".to_vec(),
            cff: false,
            fail_subset: false,
            subset_calls: Rc::new(Cell::new(0)),
        }
    }
}

impl FontProgram for FakeProgram {
    fn font_name(&self) -> &str {
        "Fake"
    }

    fn glyph_by_unicode(&self, unicode: u32) -> Option<Glyph> {
        self.glyphs
            .iter()
            .find(|(_, (u, _))| *u == unicode)
            .map(|(&cid, &(u, w))| Glyph::new(cid as i32, w, Some(u)))
    }

    fn glyph_by_code(&self, code: u32) -> Option<Glyph> {
        if code == 0 {
            return Some(Glyph::new(0, 250, None));
        }
        self.glyphs
            .get(&code)
            .map(|&(u, w)| Glyph::new(code as i32, w, Some(u)))
    }

    fn is_cff(&self) -> bool {
        self.cff
    }

    fn raw_bytes(&self) -> Option<&[u8]> {
        Some(&self.bytes)
    }

    fn subset(&self, used: &[u32], _close_composites: bool) -> Result<Vec<u8>, FontError> {
        self.subset_calls.set(self.subset_calls.get() + 1);
        if self.fail_subset {
            return Err(FontError::Subset("corrupt glyf table".to_string()));
        }
        Ok(format!("SUBSET{used:?}").into_bytes())
    }

    fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }
}

fn sample_encoder() -> CompositeFontEncoder {
    let program = TrueTypeProgram::from_bytes(sample_font()).unwrap();
    CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default()).unwrap()
}

fn descriptor<'a>(doc: &'a Document, font_id: ObjectId) -> &'a Dictionary {
    let font = doc.get_object(font_id).unwrap().as_dict().unwrap();
    let cid_font_id = font.get(b"DescendantFonts").unwrap().as_array().unwrap()[0]
        .as_reference()
        .unwrap();
    let cid_font = doc.get_object(cid_font_id).unwrap().as_dict().unwrap();
    let id = cid_font.get(b"FontDescriptor").unwrap().as_reference().unwrap();
    doc.get_object(id).unwrap().as_dict().unwrap()
}

fn stream_content(doc: &Document, dict: &Dictionary, key: &[u8]) -> Vec<u8> {
    let id = dict.get(key).unwrap().as_reference().unwrap();
    doc.get_object(id).unwrap().as_stream().unwrap().content.clone()
}

// ==================== encode / decode ====================

#[test]
fn decoding_encoded_text_reproduces_it() {
    for text in ["A", "ABC", "C A B", "中A", "😀 B", "ÄA"] {
        let mut enc = sample_encoder();
        let bytes = enc.encode(text);
        assert_eq!(enc.decode(&bytes), text, "round trip of {text:?}");
    }
}

#[test]
fn encoding_twice_is_stable_and_monotonic() {
    let mut enc = sample_encoder();
    let first = enc.encode("AB中");
    let used = enc.used_cids();
    assert_eq!(enc.encode("AB中"), first);
    assert_eq!(enc.used_cids(), used);

    enc.encode("C");
    let grown = enc.used_cids();
    assert!(used.iter().all(|cid| grown.contains(cid)));
    assert_eq!(grown.len(), used.len() + 1);
}

#[test]
fn missing_glyphs_never_fail_encoding() {
    let mut enc = sample_encoder();
    assert_eq!(enc.encode("ZZ"), vec![0, 0, 0, 0]);
    assert_eq!(enc.used_cids(), vec![0]);
}

const SJIS: &[u8] = b"\
    /CIDSystemInfo << /Registry (Adobe) /Ordering (Japan1) /Supplement 4 >> def\n\
    /CMapName /90ms-RKSJ-H def\n\
    2 begincodespacerange\n<00> <80>\n<8140> <9FFC>\nendcodespacerange\n\
    1 begincidrange\n<20> <7e> 231\nendcidrange\n";

#[test]
fn malformed_bytes_terminate_with_one_sentinel_per_byte() {
    let mut registry = FontRegistry::new();
    registry.register_cmap("90ms-RKSJ-H", SJIS);
    let mut enc = CompositeFontEncoder::predefined(
        "KozMinPro-Regular",
        "90ms-RKSJ-H",
        &registry,
        FontOptions::default(),
    )
    .unwrap();

    let garbage = [0xFF, 0xFE, 0xA0, 0xFF, 0xFD];
    let line = enc.decode_into_glyph_line(&garbage);
    assert_eq!(line.len(), garbage.len());
    assert!(line.iter().all(|g| g.code == 0 && !g.has_chars()));
    assert_eq!(enc.warnings().len(), garbage.len());
    assert!(
        enc.warnings()
            .iter()
            .all(|w| w.code == FontWarningCode::GlyphNotFound)
    );
}

// ==================== widths and ToUnicode ====================

#[test]
fn width_array_groups_runs_and_skips_default_widths() {
    let program = FakeProgram::new([
        (10, 0x61, 500),
        (11, 0x62, 500),
        (12, 0x63, 500),
        (13, 0x64, 1000),
        (14, 0x65, 300),
    ]);
    let mut enc =
        CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default()).unwrap();
    enc.encode("edcba");
    let widths = enc.build_width_array().unwrap();
    assert_eq!(widths.to_string(), "[10[500 500 500]14[300]]");
    assert!(widths.entries().iter().all(|(cid, _)| *cid != 13));
}

#[test]
fn to_unicode_blocks_of_one_hundred() {
    let program = FakeProgram::new((1..=250).map(|cid| (cid, 0x4E00 + cid, 1000)));
    let mut enc =
        CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default()).unwrap();
    let text: String = (1..=250u32)
        .rev()
        .filter_map(|cid| char::from_u32(0x4E00 + cid))
        .collect();
    enc.encode(&text);

    let cmap = enc.to_unicode_cmap().unwrap();
    let blocks: Vec<&str> = cmap
        .lines()
        .filter(|l| l.ends_with(" beginbfrange"))
        .collect();
    assert_eq!(blocks, ["100 beginbfrange", "100 beginbfrange", "50 beginbfrange"]);

    let cids: Vec<u32> = cmap
        .lines()
        .filter(|l| l.starts_with('<'))
        .map(|l| u32::from_str_radix(&l[1..5], 16).unwrap())
        .collect();
    assert_eq!(cids, (1..=250).collect::<Vec<_>>());
}

// ==================== flush ====================

#[test]
fn subset_failure_embeds_full_program() {
    let mut program = FakeProgram::new([(1, 0x41, 600)]);
    program.fail_subset = true;
    let calls = Rc::clone(&program.subset_calls);
    let mut enc =
        CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default()).unwrap();
    enc.encode("A");

    let mut doc = Document::with_version("1.7");
    let id = enc.flush(&mut doc).unwrap();
    let descriptor = descriptor(&doc, id);
    assert_eq!(
        stream_content(&doc, descriptor, b"FontFile2"),
        b"FAKE-FONT-PROGRAM"
    );
    assert_eq!(calls.get(), 1);
    assert_eq!(enc.warnings().len(), 1);
    assert_eq!(enc.warnings()[0].code, FontWarningCode::SubsetFallback);

    // The full program keeps its untagged name.
    let font = doc.get_object(id).unwrap().as_dict().unwrap();
    assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Fake");
    assert_eq!(descriptor.get(b"FontName").unwrap().as_name().unwrap(), b"Fake");

    // A second flush neither subsets again nor adds objects.
    let count = doc.objects.len();
    assert_eq!(enc.flush(&mut doc).unwrap(), id);
    assert_eq!(calls.get(), 1);
    assert_eq!(doc.objects.len(), count);
}

#[test]
fn subset_receives_sorted_used_cids() {
    let program = FakeProgram::new([(3, 0x43, 600), (1, 0x41, 600), (2, 0x42, 600)]);
    let mut enc =
        CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default()).unwrap();
    enc.encode("CA");

    let mut doc = Document::with_version("1.7");
    let id = enc.flush(&mut doc).unwrap();
    assert_eq!(
        stream_content(&doc, descriptor(&doc, id), b"FontFile2"),
        b"SUBSET[1, 3]"
    );
    let font = doc.get_object(id).unwrap().as_dict().unwrap();
    let base_font = font.get(b"BaseFont").unwrap().as_name().unwrap();
    assert_eq!(base_font.len(), "ABCDEF+Fake".len());
    assert_eq!(base_font[6], b'+');
    assert!(base_font.ends_with(b"+Fake"));
}

#[test]
fn cff_program_is_embedded_as_font_file3() {
    let mut program = FakeProgram::new([(1, 0x41, 600)]);
    program.cff = true;
    let mut enc =
        CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::full_embedding())
            .unwrap();
    enc.encode("A");

    let mut doc = Document::with_version("1.7");
    let id = enc.flush(&mut doc).unwrap();
    let font = doc.get_object(id).unwrap().as_dict().unwrap();
    assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Fake-Identity-H");

    let descriptor = descriptor(&doc, id);
    assert!(descriptor.get(b"FontFile2").is_err());
    let file_id = descriptor.get(b"FontFile3").unwrap().as_reference().unwrap();
    let file = doc.get_object(file_id).unwrap().as_stream().unwrap();
    assert_eq!(file.dict.get(b"Subtype").unwrap().as_name().unwrap(), b"CIDFontType0C");
    assert_eq!(file.content, b"FAKE-FONT-PROGRAM");
}

#[test]
fn cff_program_is_embedded_whole_when_subsetting() {
    let mut program = FakeProgram::new([(1, 0x41, 600)]);
    program.cff = true;
    let calls = Rc::clone(&program.subset_calls);
    let mut enc =
        CompositeFontEncoder::embedded(program, "Identity-H", FontOptions::default()).unwrap();
    enc.encode("A");

    let mut doc = Document::with_version("1.7");
    let id = enc.flush(&mut doc).unwrap();
    assert_eq!(calls.get(), 0);
    assert!(enc.warnings().is_empty());

    let font = doc.get_object(id).unwrap().as_dict().unwrap();
    assert_eq!(font.get(b"BaseFont").unwrap().as_name().unwrap(), b"Fake-Identity-H");
    let descriptor = descriptor(&doc, id);
    assert_eq!(descriptor.get(b"FontName").unwrap().as_name().unwrap(), b"Fake");
    assert_eq!(
        stream_content(&doc, descriptor, b"FontFile3"),
        b"FAKE-FONT-PROGRAM"
    );
}

#[test]
fn vertical_width_array_fails_without_touching_document() {
    let program = FakeProgram::new([(1, 0x41, 600)]);
    let mut enc =
        CompositeFontEncoder::embedded(program, "Identity-V", FontOptions::default()).unwrap();
    enc.encode("A");
    assert!(matches!(
        enc.build_width_array(),
        Err(FontError::NotImplemented(_))
    ));

    let mut doc = Document::with_version("1.7");
    let before: Vec<ObjectId> = doc.objects.keys().copied().collect();
    assert!(matches!(
        enc.flush(&mut doc),
        Err(FontError::NotImplemented(_))
    ));
    let after: Vec<ObjectId> = doc.objects.keys().copied().collect();
    assert_eq!(before, after);
    assert_eq!(doc.max_id, 0);
}
