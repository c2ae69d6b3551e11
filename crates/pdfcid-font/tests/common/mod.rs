//! Synthetic TrueType fonts for tests.
//!
//! Builds small but well-formed sfnt binaries (head, hhea, maxp, OS/2, hmtx,
//! cmap format 12, loca, glyf, name, post) so font loading, subsetting and
//! embedding can be exercised without shipping font files.

#![allow(dead_code)]

/// Outline kind of a synthetic glyph.
#[derive(Debug, Clone)]
pub enum Outline {
    /// No contours (like a space).
    Empty,
    /// A single triangle.
    Simple,
    /// References other glyphs by id.
    Composite(Vec<u16>),
}

/// One glyph of a synthetic font.
#[derive(Debug, Clone)]
pub struct TestGlyph {
    pub unicode: Option<u32>,
    pub advance: u16,
    pub outline: Outline,
}

impl TestGlyph {
    pub fn new(unicode: Option<u32>, advance: u16, outline: Outline) -> Self {
        Self {
            unicode,
            advance,
            outline,
        }
    }
}

/// Description of a synthetic font.
#[derive(Debug, Clone)]
pub struct TestFont {
    pub name: String,
    pub glyphs: Vec<TestGlyph>,
    /// OS/2 fsType restricted-license bit.
    pub restricted: bool,
    /// Publish the cmap as a (3,0) symbol subtable with 0xF0xx codes.
    pub symbolic: bool,
    pub italic_angle: i16,
}

/// Glyph ids of [`sample_font`].
pub mod gid {
    pub const NOTDEF: u16 = 0;
    pub const SPACE: u16 = 1;
    pub const A: u16 = 2;
    pub const B: u16 = 3;
    pub const C: u16 = 4;
    pub const A_DIAERESIS: u16 = 5;
    pub const DIAERESIS: u16 = 6;
    pub const ZHONG: u16 = 7;
    pub const FI: u16 = 8;
    pub const GRIN: u16 = 9;
}

/// The glyph set shared by most tests.
///
/// Widths: .notdef 500, space 250, A 600, B 700, C 1000 (the default
/// width), Ä 600 (composite of A + diaeresis), diaeresis 300 (no Unicode),
/// 中 1000, ﬁ 550, 😀 1200.
pub fn sample_glyphs() -> Vec<TestGlyph> {
    vec![
        TestGlyph::new(None, 500, Outline::Simple),
        TestGlyph::new(Some(0x20), 250, Outline::Empty),
        TestGlyph::new(Some(0x41), 600, Outline::Simple),
        TestGlyph::new(Some(0x42), 700, Outline::Simple),
        TestGlyph::new(Some(0x43), 1000, Outline::Simple),
        TestGlyph::new(Some(0xC4), 600, Outline::Composite(vec![2, 6])),
        TestGlyph::new(None, 300, Outline::Simple),
        TestGlyph::new(Some(0x4E2D), 1000, Outline::Simple),
        TestGlyph::new(Some(0xFB01), 550, Outline::Simple),
        TestGlyph::new(Some(0x1F600), 1200, Outline::Simple),
    ]
}

impl TestFont {
    pub fn sample() -> Self {
        Self {
            name: "PdfCidTest-Regular".to_string(),
            glyphs: sample_glyphs(),
            restricted: false,
            symbolic: false,
            italic_angle: 0,
        }
    }

    pub fn build(&self) -> Vec<u8> {
        assemble(&[self.tables()])
    }

    fn tables(&self) -> Vec<([u8; 4], Vec<u8>)> {
        let (glyf, loca) = self.glyf_and_loca();
        vec![
            (*b"OS/2", self.os2()),
            (*b"cmap", self.cmap()),
            (*b"glyf", glyf),
            (*b"head", self.head()),
            (*b"hhea", self.hhea()),
            (*b"hmtx", self.hmtx()),
            (*b"loca", loca),
            (*b"maxp", self.maxp()),
            (*b"name", self.name_table()),
            (*b"post", self.post()),
        ]
    }

    fn head(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(54);
        push_u32(&mut t, 0x0001_0000);
        push_u32(&mut t, 0x0001_0000);
        push_u32(&mut t, 0);
        push_u32(&mut t, 0x5F0F_3CF5);
        push_u16(&mut t, 0x000B);
        push_u16(&mut t, 1000);
        t.extend_from_slice(&[0; 16]);
        push_i16(&mut t, -50);
        push_i16(&mut t, -200);
        push_i16(&mut t, 1100);
        push_i16(&mut t, 900);
        push_u16(&mut t, 0);
        push_u16(&mut t, 8);
        push_i16(&mut t, 2);
        // Short loca so subsetting has to switch formats.
        push_i16(&mut t, 0);
        push_i16(&mut t, 0);
        t
    }

    fn hhea(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(36);
        push_u32(&mut t, 0x0001_0000);
        push_i16(&mut t, 800);
        push_i16(&mut t, -200);
        push_i16(&mut t, 0);
        push_u16(&mut t, self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0));
        push_i16(&mut t, 0);
        push_i16(&mut t, 0);
        push_i16(&mut t, 1000);
        push_i16(&mut t, 1);
        push_i16(&mut t, 0);
        push_i16(&mut t, 0);
        t.extend_from_slice(&[0; 8]);
        push_i16(&mut t, 0);
        push_u16(&mut t, self.glyphs.len() as u16);
        t
    }

    fn maxp(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(6);
        push_u32(&mut t, 0x0000_5000);
        push_u16(&mut t, self.glyphs.len() as u16);
        t
    }

    fn os2(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(96);
        push_u16(&mut t, 2);
        push_i16(&mut t, 600);
        push_u16(&mut t, 400);
        push_u16(&mut t, 5);
        push_u16(&mut t, if self.restricted { 0x0002 } else { 0x0000 });
        t.extend_from_slice(&[0; 20]);
        push_i16(&mut t, 0x0801);
        t.extend_from_slice(&[2, 11, 6, 4, 2, 2, 2, 2, 2, 4]);
        t.extend_from_slice(&[0; 16]);
        t.extend_from_slice(b"TEST");
        push_u16(&mut t, 0x0040);
        push_u16(&mut t, 0x20);
        push_u16(&mut t, 0xFFFF);
        push_i16(&mut t, 800);
        push_i16(&mut t, -200);
        push_i16(&mut t, 0);
        push_u16(&mut t, 900);
        push_u16(&mut t, 200);
        t.extend_from_slice(&[0; 8]);
        push_i16(&mut t, 500);
        push_i16(&mut t, 700);
        push_u16(&mut t, 0);
        push_u16(&mut t, 0x20);
        push_u16(&mut t, 0);
        assert_eq!(t.len(), 96);
        t
    }

    fn hmtx(&self) -> Vec<u8> {
        let mut t = Vec::new();
        for g in &self.glyphs {
            push_u16(&mut t, g.advance);
            push_i16(&mut t, 0);
        }
        t
    }

    fn cmap(&self) -> Vec<u8> {
        let mut groups: Vec<(u32, u32)> = self
            .glyphs
            .iter()
            .enumerate()
            .filter_map(|(id, g)| {
                let cp = g.unicode?;
                let code = if self.symbolic { 0xF000 | (cp & 0xFF) } else { cp };
                Some((code, id as u32))
            })
            .collect();
        groups.sort_unstable();

        let mut sub = Vec::new();
        push_u16(&mut sub, 12);
        push_u16(&mut sub, 0);
        push_u32(&mut sub, (16 + 12 * groups.len()) as u32);
        push_u32(&mut sub, 0);
        push_u32(&mut sub, groups.len() as u32);
        for (code, id) in groups {
            push_u32(&mut sub, code);
            push_u32(&mut sub, code);
            push_u32(&mut sub, id);
        }

        let mut t = Vec::new();
        push_u16(&mut t, 0);
        push_u16(&mut t, 1);
        push_u16(&mut t, 3);
        push_u16(&mut t, if self.symbolic { 0 } else { 10 });
        push_u32(&mut t, 12);
        t.extend_from_slice(&sub);
        t
    }

    fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = Vec::new();
        let mut loca = Vec::new();
        for g in &self.glyphs {
            push_u16(&mut loca, (glyf.len() / 2) as u16);
            match &g.outline {
                Outline::Empty => {}
                Outline::Simple => glyf.extend_from_slice(&simple_triangle(g.advance)),
                Outline::Composite(parts) => glyf.extend_from_slice(&composite(parts)),
            }
            while glyf.len() % 4 != 0 {
                glyf.push(0);
            }
        }
        push_u16(&mut loca, (glyf.len() / 2) as u16);
        (glyf, loca)
    }

    fn name_table(&self) -> Vec<u8> {
        let family = self.name.split('-').next().unwrap_or(&self.name).to_string();
        let strings = [(1u16, family), (6u16, self.name.clone())];
        let encoded: Vec<Vec<u8>> = strings
            .iter()
            .map(|(_, s)| s.encode_utf16().flat_map(|u| u.to_be_bytes()).collect())
            .collect();

        let mut t = Vec::new();
        push_u16(&mut t, 0);
        push_u16(&mut t, strings.len() as u16);
        push_u16(&mut t, (6 + 12 * strings.len()) as u16);
        let mut offset = 0u16;
        for ((id, _), bytes) in strings.iter().zip(&encoded) {
            push_u16(&mut t, 3);
            push_u16(&mut t, 1);
            push_u16(&mut t, 0x0409);
            push_u16(&mut t, *id);
            push_u16(&mut t, bytes.len() as u16);
            push_u16(&mut t, offset);
            offset += bytes.len() as u16;
        }
        for bytes in &encoded {
            t.extend_from_slice(bytes);
        }
        t
    }

    fn post(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(32);
        push_u32(&mut t, 0x0003_0000);
        push_i16(&mut t, self.italic_angle);
        push_u16(&mut t, 0);
        push_i16(&mut t, -100);
        push_i16(&mut t, 50);
        push_u32(&mut t, 0);
        t.extend_from_slice(&[0; 16]);
        t
    }
}

/// The default sample font binary.
pub fn sample_font() -> Vec<u8> {
    TestFont::sample().build()
}

/// A TrueType collection holding `fonts`.
pub fn collection(fonts: &[TestFont]) -> Vec<u8> {
    let tables: Vec<_> = fonts.iter().map(TestFont::tables).collect();
    assemble(&tables)
}

fn simple_triangle(advance: u16) -> Vec<u8> {
    let w = advance.max(10) as i16 - 10;
    let mut g = Vec::new();
    push_i16(&mut g, 1);
    push_i16(&mut g, 0);
    push_i16(&mut g, 0);
    push_i16(&mut g, w);
    push_i16(&mut g, 700);
    push_u16(&mut g, 2);
    push_u16(&mut g, 0);
    g.extend_from_slice(&[1, 1, 1]);
    for dx in [0, w, -(w / 2)] {
        push_i16(&mut g, dx);
    }
    for dy in [0, 0, 700] {
        push_i16(&mut g, dy);
    }
    g
}

fn composite(parts: &[u16]) -> Vec<u8> {
    const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
    const ARGS_ARE_XY_VALUES: u16 = 0x0002;
    const MORE_COMPONENTS: u16 = 0x0020;

    let mut g = Vec::new();
    push_i16(&mut g, -1);
    push_i16(&mut g, 0);
    push_i16(&mut g, 0);
    push_i16(&mut g, 600);
    push_i16(&mut g, 900);
    for (i, &part) in parts.iter().enumerate() {
        let mut flags = ARG_1_AND_2_ARE_WORDS | ARGS_ARE_XY_VALUES;
        if i + 1 < parts.len() {
            flags |= MORE_COMPONENTS;
        }
        push_u16(&mut g, flags);
        push_u16(&mut g, part);
        push_i16(&mut g, 0);
        push_i16(&mut g, 0);
    }
    g
}

/// Lay out one or more fonts; more than one produces a `ttcf` collection.
fn assemble(fonts: &[Vec<([u8; 4], Vec<u8>)>]) -> Vec<u8> {
    let is_collection = fonts.len() > 1;
    let header_len = if is_collection { 12 + 4 * fonts.len() } else { 0 };

    // Offset of each font's table directory and of its table data.
    let mut dir_offsets = Vec::new();
    let mut cursor = header_len;
    for tables in fonts {
        dir_offsets.push(cursor);
        cursor += 12 + 16 * tables.len();
        for (_, data) in tables {
            cursor += data.len().div_ceil(4) * 4;
        }
    }

    let mut out = Vec::with_capacity(cursor);
    if is_collection {
        out.extend_from_slice(b"ttcf");
        push_u32(&mut out, 0x0001_0000);
        push_u32(&mut out, fonts.len() as u32);
        for &off in &dir_offsets {
            push_u32(&mut out, off as u32);
        }
    }

    for (tables, &dir_offset) in fonts.iter().zip(&dir_offsets) {
        let count = tables.len() as u16;
        let entry_selector = 15 - count.leading_zeros() as u16;
        let search_range = 16 * (1u16 << entry_selector);
        push_u32(&mut out, 0x0001_0000);
        push_u16(&mut out, count);
        push_u16(&mut out, search_range);
        push_u16(&mut out, entry_selector);
        push_u16(&mut out, count * 16 - search_range);

        let mut offset = dir_offset + 12 + 16 * tables.len();
        for (tag, data) in tables {
            out.extend_from_slice(tag);
            push_u32(&mut out, checksum(data));
            push_u32(&mut out, offset as u32);
            push_u32(&mut out, data.len() as u32);
            offset += data.len().div_ceil(4) * 4;
        }
        for (_, data) in tables {
            out.extend_from_slice(data);
            while out.len() % 4 != 0 {
                out.push(0);
            }
        }
    }
    out
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut bytes = [0; 4];
        bytes[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(bytes))
    })
}

fn push_u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_i16(out: &mut Vec<u8>, v: i16) {
    out.extend_from_slice(&v.to_be_bytes());
}

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}
