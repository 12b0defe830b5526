//! Codon window resolution on a gapped alignment.
//!
//! Two phasing rules are available:
//!
//! - [`CodonPhase::AlignmentIndex`]: locate the `position`-th base of the
//!   chosen side, then cut the codon at the enclosing multiple-of-three
//!   alignment column. This ignores where the exon starts, so it only agrees
//!   with the biological reading frame when the exon begins on a column
//!   divisible by three.
//! - [`CodonPhase::ExonRelative`]: cut the codon in reference coordinates
//!   from the start of the containing exon and read both sides at the same
//!   alignment columns.
//!
//! Gaps inside a window are dropped and the result is padded with `N`.

use serde::{Deserialize, Serialize};

use crate::region::RegionIndex;
use crate::sequence::{is_gap, UNKNOWN_BASE};
use crate::types::{AlignedPair, Position, SequenceSide};

pub type Codon = [u8; 3];

/// Returned when a position cannot be mapped onto the alignment.
pub const UNRESOLVED_CODON: Codon = [UNKNOWN_BASE; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CodonPhase {
    #[default]
    AlignmentIndex,
    ExonRelative,
}

/// Column lookup for one side of the alignment.
fn base_columns(seq: &[u8]) -> Vec<usize> {
    seq.iter()
        .enumerate()
        .filter(|(_, &b)| !is_gap(b))
        .map(|(col, _)| col)
        .collect()
}

/// Collect non-gap bases into a codon, padding with `N`.
fn pack_codon(bases: impl Iterator<Item = u8>) -> Codon {
    let mut codon = UNRESOLVED_CODON;
    for (slot, base) in codon.iter_mut().zip(bases.filter(|&b| !is_gap(b))) {
        *slot = base;
    }
    codon
}

pub struct CodonMapper<'a> {
    pair: &'a AlignedPair,
    ref_columns: Vec<usize>,
    sample_columns: Vec<usize>,
    phase: CodonPhase,
    regions: Option<&'a RegionIndex>,
}

impl<'a> CodonMapper<'a> {
    /// Mapper using alignment-index phasing.
    pub fn new(pair: &'a AlignedPair) -> Self {
        Self {
            pair,
            ref_columns: base_columns(pair.reference()),
            sample_columns: base_columns(pair.sample()),
            phase: CodonPhase::AlignmentIndex,
            regions: None,
        }
    }

    /// Mapper phasing codons from the start of the containing exon.
    pub fn exon_phased(pair: &'a AlignedPair, regions: &'a RegionIndex) -> Self {
        Self {
            phase: CodonPhase::ExonRelative,
            regions: Some(regions),
            ..Self::new(pair)
        }
    }

    pub fn with_phase(pair: &'a AlignedPair, regions: &'a RegionIndex, phase: CodonPhase) -> Self {
        match phase {
            CodonPhase::AlignmentIndex => Self::new(pair),
            CodonPhase::ExonRelative => Self::exon_phased(pair, regions),
        }
    }

    pub fn phase(&self) -> CodonPhase {
        self.phase
    }

    /// Alignment column of the `position`-th (1-based) base on `side`.
    pub fn column_of(&self, position: Position, side: SequenceSide) -> Option<usize> {
        let columns = match side {
            SequenceSide::Reference => &self.ref_columns,
            SequenceSide::Sample => &self.sample_columns,
        };
        position.checked_sub(1).and_then(|i| columns.get(i)).copied()
    }

    /// Codon covering `position` on `side`, or `NNN` if it cannot be located.
    pub fn codon_at(&self, position: Position, side: SequenceSide) -> Codon {
        match (self.phase, self.regions) {
            (CodonPhase::ExonRelative, Some(regions)) => match regions.exon_at(position) {
                Some(exon) => self.exon_codon(position, exon.start, exon.end, side),
                None => self.alignment_codon(position, side),
            },
            _ => self.alignment_codon(position, side),
        }
    }

    fn alignment_codon(&self, position: Position, side: SequenceSide) -> Codon {
        let Some(column) = self.column_of(position, side) else {
            return UNRESOLVED_CODON;
        };
        let seq = self.pair.side(side);
        let start = (column / 3) * 3;
        let end = (start + 3).min(seq.len());
        pack_codon(seq[start..end].iter().copied())
    }

    fn exon_codon(
        &self,
        position: Position,
        exon_start: Position,
        exon_end: Position,
        side: SequenceSide,
    ) -> Codon {
        let seq = self.pair.side(side);
        let codon_start = exon_start + ((position - exon_start) / 3) * 3;
        let codon_end = (codon_start + 2).min(exon_end);

        // Sample bases are read at the reference columns; a deleted base
        // reads as a gap and is dropped like any other.
        let bases = (codon_start..=codon_end)
            .filter_map(|p| self.column_of(p, SequenceSide::Reference))
            .map(|col| seq[col]);
        pack_codon(bases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GenomicRange;

    fn pair(reference: &str, sample: &str) -> AlignedPair {
        AlignedPair::new(reference.as_bytes(), sample.as_bytes()).unwrap()
    }

    #[test]
    fn test_alignment_index_codons() {
        let aligned = pair("ATGCGT", "ATGAGT");
        let mapper = CodonMapper::new(&aligned);
        assert_eq!(mapper.codon_at(4, SequenceSide::Reference), *b"CGT");
        assert_eq!(mapper.codon_at(4, SequenceSide::Sample), *b"AGT");
        assert_eq!(mapper.codon_at(1, SequenceSide::Reference), *b"ATG");
    }

    #[test]
    fn test_unlocatable_position() {
        let aligned = pair("ATGCGT", "ATGAGT");
        let mapper = CodonMapper::new(&aligned);
        assert_eq!(mapper.codon_at(0, SequenceSide::Reference), UNRESOLVED_CODON);
        assert_eq!(mapper.codon_at(7, SequenceSide::Reference), UNRESOLVED_CODON);
    }

    #[test]
    fn test_gaps_are_stripped_and_padded() {
        // Column window 3..6 on the sample is "G-C".
        let aligned = pair("ATGACCTT", "ATGG-CTT");
        let mapper = CodonMapper::new(&aligned);
        assert_eq!(mapper.codon_at(4, SequenceSide::Sample), *b"GCN");
    }

    #[test]
    fn test_trailing_window_is_padded() {
        let aligned = pair("ATGCG", "ATGCA");
        let mapper = CodonMapper::new(&aligned);
        assert_eq!(mapper.codon_at(5, SequenceSide::Reference), *b"CGN");
        assert_eq!(mapper.codon_at(5, SequenceSide::Sample), *b"CAN");
    }

    #[test]
    fn test_exon_relative_phase_follows_exon_start() {
        // Exon starts at base 2, so codons are 2-4 and 5-7.
        let aligned = pair("AATGCGTAA", "AATGAGTAA");
        let regions = RegionIndex::build(vec![GenomicRange::new(2, 9).unwrap()]);

        let phased = CodonMapper::exon_phased(&aligned, &regions);
        assert_eq!(phased.codon_at(5, SequenceSide::Reference), *b"CGT");
        assert_eq!(phased.codon_at(5, SequenceSide::Sample), *b"AGT");

        let raw = CodonMapper::new(&aligned);
        assert_eq!(raw.codon_at(5, SequenceSide::Reference), *b"GCG");
    }

    #[test]
    fn test_exon_relative_reads_sample_at_reference_columns() {
        // Insertion upstream shifts the sample's own base count.
        let aligned = pair("ATG--CGTAAA", "ATGTTAGTAAA");
        let regions = RegionIndex::build(vec![GenomicRange::new(1, 9).unwrap()]);
        let phased = CodonMapper::exon_phased(&aligned, &regions);
        assert_eq!(phased.codon_at(4, SequenceSide::Reference), *b"CGT");
        assert_eq!(phased.codon_at(4, SequenceSide::Sample), *b"AGT");
    }

    #[test]
    fn test_exon_relative_clips_at_exon_end() {
        let aligned = pair("ATGCGTAC", "ATGCGTAC");
        let regions = RegionIndex::build(vec![GenomicRange::new(1, 7).unwrap()]);
        let phased = CodonMapper::exon_phased(&aligned, &regions);
        assert_eq!(phased.codon_at(7, SequenceSide::Reference), *b"ANN");
    }

    #[test]
    fn test_exon_relative_falls_back_outside_exons() {
        let aligned = pair("ATGCGT", "ATGAGT");
        let regions = RegionIndex::build(Vec::new());
        let phased = CodonMapper::exon_phased(&aligned, &regions);
        assert_eq!(phased.codon_at(4, SequenceSide::Reference), *b"CGT");
    }
}
