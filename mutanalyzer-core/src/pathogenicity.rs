//! Heuristic SIFT-like and PolyPhen-like scoring for missense SNPs.
//!
//! Neither score is a clinical prediction. The SIFT-like value comes from a
//! per-residue conservation table; the PolyPhen-like value is the Grantham
//! physicochemical distance between reference and alternate residues.

use crate::classify::CodonChange;
use crate::codon::CodonMapper;
use crate::translate::{CodonTranslator, Translation};
use crate::types::{PolyphenPrediction, PolyphenScore, SiftPrediction, SiftScore, Variant};

/// Conservation assumed for residues missing from the table.
pub const DEFAULT_CONSERVATION: u32 = 50;

/// Distance assumed for pairs missing from the Grantham table.
pub const DEFAULT_DISTANCE: u32 = 100;

pub const SIFT_TOLERATED_ABOVE: f64 = 0.05;
pub const POLYPHEN_BENIGN_BELOW: f64 = 50.0;
pub const POLYPHEN_POSSIBLY_BELOW: f64 = 100.0;

/// Heuristic 0-100 conservation per amino acid.
pub fn conservation(residue: u8) -> u32 {
    match residue.to_ascii_uppercase() {
        b'A' => 80,
        b'C' => 70,
        b'D' | b'E' => 60,
        b'F' => 50,
        b'G' => 90,
        b'H' => 60,
        b'I' => 50,
        b'K' => 60,
        b'L' | b'M' => 50,
        b'N' => 60,
        b'P' => 70,
        b'Q' | b'R' => 60,
        b'S' | b'T' => 70,
        b'V' => 60,
        b'W' => 40,
        b'Y' => 50,
        _ => DEFAULT_CONSERVATION,
    }
}

// Grantham (1974), upper triangle. Row `i` holds distances from
// GRANTHAM_ORDER[i] to every residue after it.
const GRANTHAM_ORDER: &[u8; 20] = b"SRLPTAVGIFYCHQNKDEMW";

#[rustfmt::skip]
const GRANTHAM_ROWS: [&[u16]; 19] = [
    /* S */ &[110, 145, 74, 58, 99, 124, 56, 142, 155, 144, 112, 89, 68, 46, 121, 65, 80, 135, 177],
    /* R */ &[102, 103, 71, 112, 96, 125, 97, 97, 77, 180, 29, 43, 86, 26, 96, 54, 91, 101],
    /* L */ &[98, 92, 96, 32, 138, 5, 22, 36, 198, 99, 113, 153, 107, 172, 138, 15, 61],
    /* P */ &[38, 27, 68, 42, 95, 114, 110, 169, 77, 76, 91, 103, 108, 93, 87, 147],
    /* T */ &[58, 69, 59, 89, 103, 92, 149, 47, 42, 65, 78, 85, 65, 81, 128],
    /* A */ &[64, 60, 94, 113, 112, 195, 86, 91, 111, 106, 126, 107, 84, 148],
    /* V */ &[109, 29, 50, 55, 192, 84, 96, 133, 97, 152, 121, 21, 88],
    /* G */ &[135, 153, 147, 159, 98, 87, 80, 127, 94, 98, 127, 184],
    /* I */ &[21, 33, 198, 94, 109, 149, 102, 168, 134, 10, 61],
    /* F */ &[22, 205, 100, 116, 158, 102, 177, 140, 28, 40],
    /* Y */ &[194, 83, 99, 143, 85, 160, 122, 36, 37],
    /* C */ &[174, 154, 139, 202, 154, 170, 196, 215],
    /* H */ &[24, 68, 32, 81, 40, 87, 115],
    /* Q */ &[46, 53, 61, 29, 101, 130],
    /* N */ &[94, 23, 42, 142, 174],
    /* K */ &[101, 56, 95, 110],
    /* D */ &[45, 160, 181],
    /* E */ &[126, 152],
    /* M */ &[67],
];

fn grantham_index(residue: u8) -> Option<usize> {
    let residue = residue.to_ascii_uppercase();
    GRANTHAM_ORDER.iter().position(|&r| r == residue)
}

/// Symmetric Grantham distance; 0 for identical residues, 100 for
/// anything outside the 20 standard amino acids.
pub fn grantham_distance(a: u8, b: u8) -> u32 {
    match (grantham_index(a), grantham_index(b)) {
        (Some(i), Some(j)) if i == j => 0,
        (Some(i), Some(j)) => {
            let (lo, hi) = if i < j { (i, j) } else { (j, i) };
            u32::from(GRANTHAM_ROWS[lo][hi - lo - 1])
        }
        _ => DEFAULT_DISTANCE,
    }
}

pub fn sift_score(reference: u8) -> SiftScore {
    let score = 1.0 - f64::from(conservation(reference)) / 100.0;
    let prediction = if score > SIFT_TOLERATED_ABOVE {
        SiftPrediction::Tolerated
    } else {
        SiftPrediction::Deleterious
    };
    SiftScore { score, prediction }
}

pub fn polyphen_score(reference: u8, alternate: u8) -> PolyphenScore {
    let score = f64::from(grantham_distance(reference, alternate));
    let prediction = if score < POLYPHEN_BENIGN_BELOW {
        PolyphenPrediction::Benign
    } else if score < POLYPHEN_POSSIBLY_BELOW {
        PolyphenPrediction::PossiblyDamaging
    } else {
        PolyphenPrediction::ProbablyDamaging
    };
    PolyphenScore { score, prediction }
}

pub struct PathogenicityScorer<'a, T: CodonTranslator + ?Sized> {
    mapper: &'a CodonMapper<'a>,
    translator: &'a T,
}

impl<'a, T: CodonTranslator + ?Sized> PathogenicityScorer<'a, T> {
    pub fn new(mapper: &'a CodonMapper<'a>, translator: &'a T) -> Self {
        Self { mapper, translator }
    }

    /// Populate `sift` and `polyphen` on every missense SNP.
    ///
    /// Existing scores are overwritten; other variants are not touched.
    /// Returns the number of variants scored.
    pub fn score(&self, variants: &mut [Variant]) -> usize {
        let mut scored = 0;
        for variant in variants.iter_mut().filter(|v| v.is_missense_snp()) {
            let change = CodonChange::resolve(self.mapper, self.translator, variant.position);
            let (Translation::Residue(ref_aa), alt) = (change.reference, change.alternate) else {
                log::debug!(
                    "Skipping pathogenicity at position {}: reference residue unresolved",
                    variant.position
                );
                continue;
            };

            variant.sift = Some(sift_score(ref_aa));
            variant.polyphen = Some(polyphen_score(ref_aa, alt.symbol()));
            scored += 1;
        }

        log::info!("Scored pathogenicity for {} missense variants", scored);
        scored
    }
}
