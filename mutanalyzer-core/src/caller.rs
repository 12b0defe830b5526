//! Column-wise variant calling over a gapped alignment
//!
//! The alignment is decoded into a sequence of [`Segment`]s that partition
//! the columns in order: unchanged columns, single-column substitutions, and
//! maximal insertion or deletion runs. Each segment carries the reference
//! coordinate reached at its last column, so coordinate bookkeeping across
//! indels lives in one place.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::sequence::is_gap;
use crate::types::{AlignedPair, Position, RawVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Both bases present and equal.
    Unchanged,
    /// Both bases present and different.
    Snp,
    /// Run of reference gaps against sample bases.
    Insertion,
    /// Run of reference bases against sample gaps.
    Deletion,
    /// Gap on both sides; never produced by a valid aligner.
    EmptyColumn,
}

/// A contiguous block of alignment columns of a single kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub columns: Range<usize>,
    /// Reference coordinate of the event anchor.
    ///
    /// For deletions this is the first deleted base, for insertions the last
    /// reference base consumed before the run (0 if the run opens the
    /// alignment).
    pub anchor: Position,
    /// Reference coordinate after the last column of the segment.
    pub ref_pos: Position,
}

impl Segment {
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// Iterator over the column segments of an aligned pair.
pub struct Segments<'a> {
    reference: &'a [u8],
    sample: &'a [u8],
    column: usize,
    ref_pos: Position,
}

impl<'a> Segments<'a> {
    pub fn new(pair: &'a AlignedPair) -> Self {
        Self {
            reference: pair.reference(),
            sample: pair.sample(),
            column: 0,
            ref_pos: 0,
        }
    }

    /// Extend a run from `start` while `pred(ref_base, alt_base)` holds.
    fn run_end(&self, start: usize, pred: impl Fn(u8, u8) -> bool) -> usize {
        let mut end = start;
        while end < self.reference.len() && pred(self.reference[end], self.sample[end]) {
            end += 1;
        }
        end
    }
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let start = self.column;
        if start >= self.reference.len() {
            return None;
        }

        let ref_base = self.reference[start];
        let alt_base = self.sample[start];

        let (kind, end, anchor) = match (is_gap(ref_base), is_gap(alt_base)) {
            (false, false) => {
                self.ref_pos += 1;
                let kind = if ref_base == alt_base {
                    SegmentKind::Unchanged
                } else {
                    SegmentKind::Snp
                };
                (kind, start + 1, self.ref_pos)
            }
            (false, true) => {
                let end = self.run_end(start, |r, a| !is_gap(r) && is_gap(a));
                let anchor = self.ref_pos + 1;
                self.ref_pos += end - start;
                (SegmentKind::Deletion, end, anchor)
            }
            (true, false) => {
                let end = self.run_end(start, |r, a| is_gap(r) && !is_gap(a));
                (SegmentKind::Insertion, end, self.ref_pos)
            }
            (true, true) => (SegmentKind::EmptyColumn, start + 1, self.ref_pos),
        };

        self.column = end;
        Some(Segment {
            kind,
            columns: start..end,
            anchor,
            ref_pos: self.ref_pos,
        })
    }
}

/// Decode an aligned pair into ordered column segments.
pub fn segments(pair: &AlignedPair) -> Segments<'_> {
    Segments::new(pair)
}

/// Stateless caller turning segments into raw variant events.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariantCaller;

impl VariantCaller {
    pub fn new() -> Self {
        Self
    }

    /// Call SNPs and indel runs in alignment column order.
    ///
    /// Events sharing a reference coordinate (an insertion next to a
    /// substitution, for example) are all kept.
    pub fn call(&self, pair: &AlignedPair) -> Vec<RawVariant> {
        let reference = pair.reference();
        let sample = pair.sample();

        let variants: Vec<RawVariant> = segments(pair)
            .filter_map(|segment| {
                let cols = segment.columns.clone();
                match segment.kind {
                    SegmentKind::Snp => Some(RawVariant::snp(
                        segment.anchor,
                        reference[cols.start],
                        sample[cols.start],
                    )),
                    SegmentKind::Deletion if !cols.is_empty() => Some(RawVariant::deletion(
                        segment.anchor,
                        String::from_utf8_lossy(&reference[cols]).into_owned(),
                    )),
                    SegmentKind::Insertion if !cols.is_empty() => Some(RawVariant::insertion(
                        segment.anchor,
                        String::from_utf8_lossy(&sample[cols]).into_owned(),
                    )),
                    _ => None,
                }
            })
            .collect();

        log::debug!(
            "Called {} raw variants over {} alignment columns",
            variants.len(),
            pair.len()
        );
        variants
    }
}
