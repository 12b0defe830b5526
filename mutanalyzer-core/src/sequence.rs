//! Nucleotide alphabet checks shared by every sequence entry point.

use crate::error::{AnalysisError, AnalysisResult};

/// Gap character used by aligned sequences.
pub const GAP: u8 = b'-';

/// Placeholder base used when a codon window is short.
pub const UNKNOWN_BASE: u8 = b'N';

/// Returns true if `base` belongs to the accepted alphabet `{A,C,G,T,N,-}`.
#[inline]
pub fn is_valid_symbol(base: u8) -> bool {
    matches!(base, b'A' | b'C' | b'G' | b'T' | b'N' | GAP)
}

#[inline]
pub fn is_gap(base: u8) -> bool {
    base == GAP
}

/// Strip whitespace, uppercase, and check the alphabet.
///
/// Returns the cleaned sequence or an `InputValidation` error naming the
/// first offending character and its offset in the cleaned sequence.
pub fn normalize_sequence(raw: &[u8]) -> AnalysisResult<Vec<u8>> {
    let cleaned: Vec<u8> = raw
        .iter()
        .filter(|b| !b.is_ascii_whitespace())
        .map(|b| b.to_ascii_uppercase())
        .collect();

    if cleaned.is_empty() {
        return Err(AnalysisError::validation("sequence is empty"));
    }

    if let Some((offset, &bad)) = cleaned
        .iter()
        .enumerate()
        .find(|(_, &b)| !is_valid_symbol(b))
    {
        return Err(AnalysisError::validation(format!(
            "invalid character '{}' at offset {} (only A, C, G, T, N and - are allowed)",
            bad.escape_ascii(),
            offset
        )));
    }

    Ok(cleaned)
}

/// Remove gap characters.
pub fn ungapped(seq: &[u8]) -> Vec<u8> {
    seq.iter().copied().filter(|&b| !is_gap(b)).collect()
}
