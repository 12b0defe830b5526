//! Codon translation under NCBI genetic code tables.
//!
//! Only the two tables the analysis offers are carried: the standard code
//! (table 1) and the vertebrate mitochondrial code (table 2). Malformed
//! codons translate to [`Translation::Unresolved`] instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stop symbol in translated sequences.
pub const STOP_SYMBOL: u8 = b'*';

/// Symbol for a codon that could not be resolved.
pub const UNRESOLVED_SYMBOL: u8 = b'X';

// NCBI ordering: first base varies slowest, bases in T, C, A, G order.
const STANDARD_AA: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";
const VERTEBRATE_MITO_AA: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIMMTTTTNNKKSS**VVVVAAAADDEEGGGG";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeneticCodeId {
    #[default]
    Standard,
    VertebrateMitochondrial,
}

impl GeneticCodeId {
    /// NCBI `transl_table` number.
    pub fn ncbi_id(&self) -> u8 {
        match self {
            GeneticCodeId::Standard => 1,
            GeneticCodeId::VertebrateMitochondrial => 2,
        }
    }
}

impl fmt::Display for GeneticCodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeneticCodeId::Standard => f.write_str("Standard"),
            GeneticCodeId::VertebrateMitochondrial => f.write_str("Vertebrate Mitochondrial"),
        }
    }
}

/// Result of translating one codon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Translation {
    /// One-letter amino acid code.
    Residue(u8),
    Stop,
    /// Short codon, ambiguous base, or gap.
    Unresolved,
}

impl Translation {
    pub fn symbol(&self) -> u8 {
        match self {
            Translation::Residue(aa) => *aa,
            Translation::Stop => STOP_SYMBOL,
            Translation::Unresolved => UNRESOLVED_SYMBOL,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Translation::Unresolved)
    }
}

/// Anything that can turn a codon into an amino acid.
pub trait CodonTranslator {
    fn translate(&self, codon: &[u8]) -> Translation;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneticCode {
    id: GeneticCodeId,
    table: &'static [u8; 64],
}

impl GeneticCode {
    pub fn from_id(id: GeneticCodeId) -> Self {
        let table = match id {
            GeneticCodeId::Standard => STANDARD_AA,
            GeneticCodeId::VertebrateMitochondrial => VERTEBRATE_MITO_AA,
        };
        Self { id, table }
    }

    pub fn standard() -> Self {
        Self::from_id(GeneticCodeId::Standard)
    }

    pub fn id(&self) -> GeneticCodeId {
        self.id
    }

    /// Translate an ungapped nucleotide sequence codon by codon in frame 0.
    ///
    /// A trailing partial codon is dropped.
    pub fn translate_sequence(&self, seq: &[u8]) -> Vec<u8> {
        seq.chunks_exact(3)
            .map(|codon| self.translate(codon).symbol())
            .collect()
    }
}

impl Default for GeneticCode {
    fn default() -> Self {
        Self::standard()
    }
}

impl CodonTranslator for GeneticCode {
    fn translate(&self, codon: &[u8]) -> Translation {
        match codon_index(codon) {
            Some(idx) => match self.table[idx] {
                STOP_SYMBOL => Translation::Stop,
                aa => Translation::Residue(aa),
            },
            None => Translation::Unresolved,
        }
    }
}

fn base_index(base: u8) -> Option<usize> {
    match base.to_ascii_uppercase() {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

fn codon_index(codon: &[u8]) -> Option<usize> {
    if codon.len() != 3 {
        return None;
    }
    Some(base_index(codon[0])? * 16 + base_index(codon[1])? * 4 + base_index(codon[2])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_codons() {
        let code = GeneticCode::standard();
        assert_eq!(code.translate(b"ATG"), Translation::Residue(b'M'));
        assert_eq!(code.translate(b"CGT"), Translation::Residue(b'R'));
        assert_eq!(code.translate(b"AGT"), Translation::Residue(b'S'));
        assert_eq!(code.translate(b"TGG"), Translation::Residue(b'W'));
        assert_eq!(code.translate(b"TAA"), Translation::Stop);
        assert_eq!(code.translate(b"TAG"), Translation::Stop);
        assert_eq!(code.translate(b"TGA"), Translation::Stop);
        assert_eq!(code.translate(b"agg"), Translation::Residue(b'R'));
    }

    #[test]
    fn test_vertebrate_mitochondrial_differences() {
        let code = GeneticCode::from_id(GeneticCodeId::VertebrateMitochondrial);
        assert_eq!(code.translate(b"TGA"), Translation::Residue(b'W'));
        assert_eq!(code.translate(b"ATA"), Translation::Residue(b'M'));
        assert_eq!(code.translate(b"AGA"), Translation::Stop);
        assert_eq!(code.translate(b"AGG"), Translation::Stop);
        assert_eq!(code.translate(b"CGT"), Translation::Residue(b'R'));
    }

    #[test]
    fn test_unresolved_codons() {
        let code = GeneticCode::standard();
        assert_eq!(code.translate(b"ANG"), Translation::Unresolved);
        assert_eq!(code.translate(b"NNN"), Translation::Unresolved);
        assert_eq!(code.translate(b"AT"), Translation::Unresolved);
        assert_eq!(code.translate(b"A-G"), Translation::Unresolved);
        assert_eq!(code.translate(b""), Translation::Unresolved);
    }

    #[test]
    fn test_every_codon_resolves() {
        let code = GeneticCode::standard();
        let bases = [b'A', b'C', b'G', b'T'];
        let mut stops = 0;
        for &a in &bases {
            for &b in &bases {
                for &c in &bases {
                    let t = code.translate(&[a, b, c]);
                    assert!(t.is_resolved());
                    if t == Translation::Stop {
                        stops += 1;
                    }
                }
            }
        }
        assert_eq!(stops, 3);
    }

    #[test]
    fn test_translate_sequence_drops_partial_codon() {
        let code = GeneticCode::standard();
        assert_eq!(code.translate_sequence(b"ATGCGTTAANG"), b"MR*");
        assert_eq!(code.translate_sequence(b"ATGNNN"), b"MX");
    }
}
