//! Options controlling how a composite font is embedded.

use std::ops::RangeInclusive;

/// Options for an embedded composite font.
///
/// Provides sensible defaults for all settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontOptions {
    /// Whether to run binary subsetting over the used glyphs at flush
    /// (default: true).
    pub subset: bool,
    /// Unicode ranges whose glyphs are kept when `subset` is off
    /// (default: None = keep everything).
    pub subset_ranges: Option<Vec<RangeInclusive<u32>>>,
    /// Whether to collect warnings on the encoder (default: true).
    ///
    /// Warnings are always logged through `tracing` when that feature is on.
    pub collect_warnings: bool,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            subset: true,
            subset_ranges: None,
            collect_warnings: true,
        }
    }
}

impl FontOptions {
    /// Options that embed the whole font program.
    pub fn full_embedding() -> Self {
        Self {
            subset: false,
            ..Self::default()
        }
    }

    /// Add a Unicode range to keep when subsetting is off.
    pub fn with_range(mut self, range: RangeInclusive<u32>) -> Self {
        self.subset_ranges.get_or_insert_with(Vec::new).push(range);
        self
    }
}

/// Sort and merge overlapping or adjacent ranges.
///
/// Empty ranges (start > end) are dropped.
pub fn compact_ranges(ranges: &[RangeInclusive<u32>]) -> Vec<RangeInclusive<u32>> {
    let mut sorted: Vec<(u32, u32)> = ranges
        .iter()
        .filter(|r| r.start() <= r.end())
        .map(|r| (*r.start(), *r.end()))
        .collect();
    sorted.sort_unstable();

    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(sorted.len());
    for (lo, hi) in sorted {
        match merged.last_mut() {
            Some(last) if lo <= last.1.saturating_add(1) => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    merged.into_iter().map(|(lo, hi)| lo..=hi).collect()
}
