//! TrueType glyph subsetting.
//!
//! Glyph ids are preserved so the subset can still be addressed with
//! `/CIDToGIDMap /Identity`: unused glyphs keep their `loca` slot but lose
//! their outline. Only the tables a CIDFontType2 program needs are kept.

use std::collections::BTreeSet;

use crate::error::FontError;

/// Tables copied into a subset, in tag order.
const KEPT_TABLES: [&[u8; 4]; 9] = [
    b"cvt ", b"fpgm", b"glyf", b"head", b"hhea", b"hmtx", b"loca", b"maxp", b"prep",
];

const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// Reduce face `index` of `data` to the glyph ids in `used`.
///
/// Glyph 0 is always kept. With `close_composites`, glyphs referenced by
/// kept composite glyphs are kept too.
pub fn subset_truetype(
    data: &[u8],
    index: u32,
    used: &[u32],
    close_composites: bool,
) -> Result<Vec<u8>, FontError> {
    let face = RawFace::parse(data, index)?;
    let head = face.required(b"head")?;
    let maxp = face.required(b"maxp")?;
    let glyf = face.required(b"glyf")?;
    let loca = face.required(b"loca")?;

    let num_glyphs = Reader::at(maxp, 4).read_u16()?;
    let long_loca = Reader::at(head, 50).read_u16()? == 1;
    let offsets = read_loca(loca, num_glyphs, long_loca, glyf.len())?;

    let mut keep: BTreeSet<u16> = used
        .iter()
        .filter_map(|&gid| u16::try_from(gid).ok())
        .filter(|&gid| gid < num_glyphs)
        .collect();
    keep.insert(0);
    if close_composites {
        close_over_components(glyf, &offsets, &mut keep)?;
    }

    let mut new_glyf = Vec::new();
    let mut new_loca = Vec::with_capacity(offsets.len() * 4);
    for gid in 0..num_glyphs {
        push_u32(&mut new_loca, new_glyf.len() as u32);
        if keep.contains(&gid) {
            new_glyf.extend_from_slice(glyph_data(glyf, &offsets, gid));
            while new_glyf.len() % 4 != 0 {
                new_glyf.push(0);
            }
        }
    }
    push_u32(&mut new_loca, new_glyf.len() as u32);

    let mut new_head = head.to_vec();
    new_head[8..12].fill(0);
    new_head[50..52].copy_from_slice(&1u16.to_be_bytes());

    let mut tables: Vec<([u8; 4], Vec<u8>)> = Vec::new();
    for tag in KEPT_TABLES {
        let bytes = match tag {
            b"glyf" => std::mem::take(&mut new_glyf),
            b"loca" => std::mem::take(&mut new_loca),
            b"head" => std::mem::take(&mut new_head),
            _ => match face.table(tag) {
                Some(t) => t.to_vec(),
                None => continue,
            },
        };
        tables.push((*tag, bytes));
    }

    Ok(construct(tables))
}

/// Table directory of one face.
struct RawFace<'a> {
    data: &'a [u8],
    records: Vec<([u8; 4], usize, usize)>,
}

impl<'a> RawFace<'a> {
    fn parse(data: &'a [u8], index: u32) -> Result<Self, FontError> {
        let mut r = Reader::at(data, 0);
        let dir = if r.read_bytes(4)? == b"ttcf" {
            r.skip(4);
            let count = r.read_u32()?;
            if index >= count {
                return Err(FontError::Subset(format!(
                    "face index {index} out of range for collection of {count}"
                )));
            }
            Reader::at(data, 12 + 4 * index as usize).read_u32()? as usize
        } else {
            0
        };

        let mut r = Reader::at(data, dir + 4);
        let count = r.read_u16()?;
        r.skip(6);
        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let mut tag = [0; 4];
            tag.copy_from_slice(r.read_bytes(4)?);
            r.skip(4);
            let offset = r.read_u32()? as usize;
            let length = r.read_u32()? as usize;
            if data.get(offset..offset + length).is_none() {
                return Err(FontError::Subset(format!(
                    "table {} extends past the end of the font",
                    String::from_utf8_lossy(&tag)
                )));
            }
            records.push((tag, offset, length));
        }
        Ok(Self { data, records })
    }

    fn table(&self, tag: &[u8; 4]) -> Option<&'a [u8]> {
        self.records
            .iter()
            .find(|(t, _, _)| t == tag)
            .and_then(|&(_, offset, length)| self.data.get(offset..offset + length))
    }

    fn required(&self, tag: &[u8; 4]) -> Result<&'a [u8], FontError> {
        self.table(tag).ok_or_else(|| {
            FontError::Subset(format!(
                "missing {} table",
                String::from_utf8_lossy(tag).trim_end()
            ))
        })
    }
}

fn read_loca(
    loca: &[u8],
    num_glyphs: u16,
    long: bool,
    glyf_len: usize,
) -> Result<Vec<usize>, FontError> {
    let mut r = Reader::at(loca, 0);
    let mut offsets = Vec::with_capacity(usize::from(num_glyphs) + 1);
    for _ in 0..=num_glyphs {
        let offset = if long {
            r.read_u32()? as usize
        } else {
            usize::from(r.read_u16()?) * 2
        };
        offsets.push(offset);
    }
    let monotonic = offsets.windows(2).all(|w| w[0] <= w[1]);
    if !monotonic || offsets.last().is_some_and(|&end| end > glyf_len) {
        return Err(FontError::Subset("malformed loca table".to_string()));
    }
    Ok(offsets)
}

fn glyph_data<'a>(glyf: &'a [u8], offsets: &[usize], gid: u16) -> &'a [u8] {
    let i = usize::from(gid);
    &glyf[offsets[i]..offsets[i + 1]]
}

/// Add every glyph reachable through composite references.
fn close_over_components(
    glyf: &[u8],
    offsets: &[usize],
    keep: &mut BTreeSet<u16>,
) -> Result<(), FontError> {
    let num_glyphs = offsets.len() - 1;
    let mut pending: Vec<u16> = keep.iter().copied().collect();
    while let Some(gid) = pending.pop() {
        for component in components(glyph_data(glyf, offsets, gid))? {
            if usize::from(component) < num_glyphs && keep.insert(component) {
                pending.push(component);
            }
        }
    }
    Ok(())
}

/// Glyph ids referenced by a composite glyph; empty for simple glyphs.
fn components(glyph: &[u8]) -> Result<Vec<u16>, FontError> {
    let mut found = Vec::new();
    if glyph.is_empty() {
        return Ok(found);
    }
    let mut r = Reader::at(glyph, 0);
    if r.read_i16()? >= 0 {
        return Ok(found);
    }
    r.skip(8);
    loop {
        let flags = r.read_u16()?;
        found.push(r.read_u16()?);
        r.skip(if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 });
        if flags & WE_HAVE_A_SCALE != 0 {
            r.skip(2);
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            r.skip(4);
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            r.skip(8);
        }
        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }
    Ok(found)
}

/// Lay out a single-face sfnt from sorted tables.
fn construct(tables: Vec<([u8; 4], Vec<u8>)>) -> Vec<u8> {
    let count = tables.len() as u16;
    let entry_selector = 15 - count.leading_zeros() as u16;
    let search_range = 16 * (1u16 << entry_selector);

    let mut out = Vec::new();
    push_u32(&mut out, 0x0001_0000);
    push_u16(&mut out, count);
    push_u16(&mut out, search_range);
    push_u16(&mut out, entry_selector);
    push_u16(&mut out, count * 16 - search_range);

    let mut checksum_adjustment_offset = None;
    let mut offset = 12 + tables.len() * 16;
    for (tag, data) in &tables {
        if tag == b"head" {
            checksum_adjustment_offset = Some(offset + 8);
        }
        out.extend_from_slice(tag);
        push_u32(&mut out, checksum(data));
        push_u32(&mut out, offset as u32);
        push_u32(&mut out, data.len() as u32);
        offset += data.len().div_ceil(4) * 4;
    }
    for (_, data) in &tables {
        out.extend_from_slice(data);
        while out.len() % 4 != 0 {
            out.push(0);
        }
    }

    if let Some(i) = checksum_adjustment_offset {
        let adjustment = 0xB1B0_AFBA_u32.wrapping_sub(checksum(&out));
        out[i..i + 4].copy_from_slice(&adjustment.to_be_bytes());
    }
    out
}

/// Sum of big-endian u32 words, zero-padded to a multiple of four.
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

fn push_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Bounds-checked big-endian reader.
struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn at(data: &'a [u8], offset: usize) -> Self {
        Self { data, offset }
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], FontError> {
        let bytes = self
            .data
            .get(self.offset..self.offset + len)
            .ok_or_else(|| FontError::Subset("unexpected end of font data".to_string()))?;
        self.offset += len;
        Ok(bytes)
    }

    fn skip(&mut self, len: usize) {
        self.offset += len;
    }

    fn read_u16(&mut self) -> Result<u16, FontError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_i16(&mut self) -> Result<i16, FontError> {
        self.read_u16().map(|v| v as i16)
    }

    fn read_u32(&mut self) -> Result<u32, FontError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }
}
