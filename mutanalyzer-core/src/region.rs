//! Exon/intron region index
//!
//! Exons are supplied by the annotation source; introns are derived as the
//! gaps strictly between consecutive sorted exons. Lookups use a sorted
//! start array plus a running maximum of ends, so a query is a pair of
//! binary searches while still returning the first range (in sorted order)
//! that contains the position, even when the caller hands in overlapping
//! exons.

use serde::{Deserialize, Serialize};

use crate::types::{GenomicRange, Position, Region};

/// Sorted range list with first-match lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct RangeSet {
    ranges: Vec<GenomicRange>,
    /// `max_end[i]` = max of `ranges[..=i].end`
    max_end: Vec<Position>,
}

impl RangeSet {
    fn new(mut ranges: Vec<GenomicRange>) -> Self {
        // Stable so that equal starts keep caller order.
        ranges.sort_by_key(|r| r.start);

        let mut max_end = Vec::with_capacity(ranges.len());
        let mut running = 0;
        for range in &ranges {
            running = running.max(range.end);
            max_end.push(running);
        }

        Self { ranges, max_end }
    }

    /// Index of the first range in sorted order containing `position`.
    fn find(&self, position: Position) -> Option<usize> {
        // Ranges that start at or before the position form a prefix.
        let candidates = self.ranges.partition_point(|r| r.start <= position);
        // First index whose running max end reaches the position; that range
        // itself must be the one that raised the maximum past `position`.
        let first = self.max_end.partition_point(|&end| end < position);
        (first < candidates).then_some(first)
    }
}

/// Position in the region index, with its 1-based ordinal for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionHit {
    pub region: Region,
    /// 1-based exon or intron number; `None` for intergenic positions.
    pub ordinal: Option<usize>,
    pub range: Option<GenomicRange>,
}

/// Immutable exon/intron index for one analysis session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionIndex {
    exons: RangeSet,
    introns: RangeSet,
}

impl RegionIndex {
    /// Build from exon coordinates in any order.
    pub fn build(exon_ranges: Vec<GenomicRange>) -> Self {
        let exons = RangeSet::new(exon_ranges);
        let introns = exons
            .ranges
            .windows(2)
            .filter_map(|pair| {
                let start = pair[0].end + 1;
                let end = pair[1].start.checked_sub(1)?;
                (start <= end).then_some(GenomicRange { start, end })
            })
            .collect();

        let index = Self {
            exons,
            introns: RangeSet::new(introns),
        };
        log::debug!(
            "Built region index: {} exons, {} introns",
            index.exon_count(),
            index.intron_count()
        );
        index
    }

    /// Build with explicit intron ranges instead of derived ones.
    ///
    /// Used when the annotation already carries intron features.
    pub fn with_introns(exon_ranges: Vec<GenomicRange>, intron_ranges: Vec<GenomicRange>) -> Self {
        Self {
            exons: RangeSet::new(exon_ranges),
            introns: RangeSet::new(intron_ranges),
        }
    }

    pub fn exons(&self) -> &[GenomicRange] {
        &self.exons.ranges
    }

    pub fn introns(&self) -> &[GenomicRange] {
        &self.introns.ranges
    }

    pub fn exon_count(&self) -> usize {
        self.exons.ranges.len()
    }

    pub fn intron_count(&self) -> usize {
        self.introns.ranges.len()
    }

    /// Exon first, then intron, else intergenic.
    pub fn classify(&self, position: Position) -> Region {
        self.locate(position).region
    }

    /// Classify and report which exon or intron the position falls in.
    pub fn locate(&self, position: Position) -> RegionHit {
        if let Some(i) = self.exons.find(position) {
            return RegionHit {
                region: Region::Exon,
                ordinal: Some(i + 1),
                range: Some(self.exons.ranges[i]),
            };
        }
        if let Some(i) = self.introns.find(position) {
            return RegionHit {
                region: Region::Intron,
                ordinal: Some(i + 1),
                range: Some(self.introns.ranges[i]),
            };
        }
        RegionHit {
            region: Region::Intergenic,
            ordinal: None,
            range: None,
        }
    }

    /// The exon containing `position`, if any.
    pub fn exon_at(&self, position: Position) -> Option<&GenomicRange> {
        self.exons.find(position).map(|i| &self.exons.ranges[i])
    }
}
