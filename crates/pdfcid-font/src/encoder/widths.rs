//! The CIDFont `/W` array.

use std::fmt;

use lopdf::Object;

use super::CompositeFontEncoder;
use crate::error::FontError;

/// Sentinel making the first CID always open a new group.
const NO_PREVIOUS_CID: i64 = -10;

/// Per-CID advance widths grouped into `c [w1 w2 ...]` runs.
///
/// CIDs whose width equals the default width are omitted; they are
/// covered by the font's `/DW` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidthArray {
    entries: Vec<(u32, Vec<i32>)>,
}

impl WidthArray {
    /// Group `(cid, width)` pairs, which must be in ascending CID order.
    pub fn from_widths(widths: impl IntoIterator<Item = (u32, i32)>, default_width: i32) -> Self {
        let mut entries: Vec<(u32, Vec<i32>)> = Vec::new();
        let mut last = NO_PREVIOUS_CID;
        for (cid, width) in widths {
            if width == default_width {
                continue;
            }
            let cid_i = i64::from(cid);
            match entries.last_mut() {
                Some((_, group)) if cid_i == last + 1 => group.push(width),
                _ => entries.push((cid, vec![width])),
            }
            last = cid_i;
        }
        Self { entries }
    }

    /// Whether every CID uses the default width.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(first CID, widths)` runs in ascending order.
    pub fn entries(&self) -> &[(u32, Vec<i32>)] {
        &self.entries
    }

    /// The array as a PDF object.
    pub fn to_object(&self) -> Object {
        let mut array = Vec::with_capacity(self.entries.len() * 2);
        for (first, widths) in &self.entries {
            array.push(Object::Integer(i64::from(*first)));
            array.push(Object::Array(
                widths.iter().map(|&w| Object::Integer(i64::from(w))).collect(),
            ));
        }
        Object::Array(array)
    }
}

impl fmt::Display for WidthArray {
    /// The compact array syntax, e.g. `[10[500 500 500]14[300]]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (first, widths) in &self.entries {
            write!(f, "{first}[")?;
            for (i, w) in widths.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{w}")?;
            }
            f.write_str("]")?;
        }
        f.write_str("]")
    }
}

impl CompositeFontEncoder {
    /// Width array over every used CID.
    ///
    /// Fails with [`FontError::NotImplemented`] for vertical fonts.
    pub fn build_width_array(&self) -> Result<WidthArray, FontError> {
        self.width_array_for(&self.used_cids())
    }

    /// Width array over `cids`, which must be sorted ascending.
    pub(crate) fn width_array_for(&self, cids: &[u32]) -> Result<WidthArray, FontError> {
        if self.vertical {
            return Err(FontError::NotImplemented("vertical writing width array"));
        }
        let default_width = self.program.metrics().default_width;
        let widths = cids.iter().filter_map(|&cid| {
            self.program
                .glyph_by_code(cid)
                .map(|glyph| (cid, glyph.width))
        });
        Ok(WidthArray::from_widths(widths, default_width))
    }
}
