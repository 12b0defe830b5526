use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AnalysisError, AnalysisResult};
use crate::sequence::{is_gap, normalize_sequence};

/// 1-based reference coordinate, counted over non-gap reference bases.
pub type Position = usize;

/// Closed interval `[start, end]` in 1-based reference coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GenomicRange {
    pub start: Position,
    pub end: Position,
}

impl GenomicRange {
    pub fn new(start: Position, end: Position) -> AnalysisResult<Self> {
        if start == 0 || start > end {
            return Err(AnalysisError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        self.start <= position && position <= self.end
    }

    /// Number of bases covered.
    pub fn span(&self) -> usize {
        self.end - self.start + 1
    }
}

impl fmt::Display for GenomicRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Exon,
    Intron,
    Intergenic,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Region::Exon => "Exon",
            Region::Intron => "Intron",
            Region::Intergenic => "Intergenic",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariantType {
    #[serde(rename = "SNP")]
    Snp,
    Insertion,
    Deletion,
}

impl VariantType {
    pub fn is_indel(&self) -> bool {
        matches!(self, VariantType::Insertion | VariantType::Deletion)
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VariantType::Snp => "SNP",
            VariantType::Insertion => "Insertion",
            VariantType::Deletion => "Deletion",
        };
        f.write_str(label)
    }
}

/// Consequence assigned by the coding effect classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    Silent,
    Missense,
    Nonsense,
    Unknown,
    #[serde(rename = "In-frame insertion")]
    InFrameInsertion,
    #[serde(rename = "In-frame deletion")]
    InFrameDeletion,
    #[serde(rename = "Frameshift insertion")]
    FrameshiftInsertion,
    #[serde(rename = "Frameshift deletion")]
    FrameshiftDeletion,
    Intronic,
    Substitution,
    Insertion,
    Deletion,
}

impl Effect {
    pub fn label(&self) -> &'static str {
        match self {
            Effect::Silent => "Silent",
            Effect::Missense => "Missense",
            Effect::Nonsense => "Nonsense",
            Effect::Unknown => "Unknown",
            Effect::InFrameInsertion => "In-frame insertion",
            Effect::InFrameDeletion => "In-frame deletion",
            Effect::FrameshiftInsertion => "Frameshift insertion",
            Effect::FrameshiftDeletion => "Frameshift deletion",
            Effect::Intronic => "Intronic",
            Effect::Substitution => "Substitution",
            Effect::Insertion => "Insertion",
            Effect::Deletion => "Deletion",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordinal severity tier, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Minimal,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Low => "Low",
            Severity::Minimal => "Minimal",
            Severity::Medium => "Medium",
            Severity::High => "High",
        };
        f.write_str(label)
    }
}

/// Which side of an aligned pair to read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceSide {
    Reference,
    Sample,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiftPrediction {
    Tolerated,
    Deleterious,
}

impl fmt::Display for SiftPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiftPrediction::Tolerated => f.write_str("Tolerated"),
            SiftPrediction::Deleterious => f.write_str("Deleterious"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolyphenPrediction {
    Benign,
    #[serde(rename = "Possibly Damaging")]
    PossiblyDamaging,
    #[serde(rename = "Probably Damaging")]
    ProbablyDamaging,
}

impl fmt::Display for PolyphenPrediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolyphenPrediction::Benign => f.write_str("Benign"),
            PolyphenPrediction::PossiblyDamaging => f.write_str("Possibly Damaging"),
            PolyphenPrediction::ProbablyDamaging => f.write_str("Probably Damaging"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SiftScore {
    pub score: f64,
    pub prediction: SiftPrediction,
}

impl fmt::Display for SiftScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.prediction, self.score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolyphenScore {
    pub score: f64,
    pub prediction: PolyphenPrediction,
}

impl fmt::Display for PolyphenScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.prediction, self.score)
    }
}

/// Event emitted by the variant caller before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawVariant {
    pub position: Position,
    pub variant_type: VariantType,
    /// Consumed reference bases, `-` for insertions.
    pub ref_allele: String,
    /// Consumed sample bases, `-` for deletions.
    pub alt_allele: String,
}

impl RawVariant {
    pub fn snp(position: Position, ref_base: u8, alt_base: u8) -> Self {
        Self {
            position,
            variant_type: VariantType::Snp,
            ref_allele: (ref_base as char).to_string(),
            alt_allele: (alt_base as char).to_string(),
        }
    }

    pub fn insertion(position: Position, inserted: String) -> Self {
        Self {
            position,
            variant_type: VariantType::Insertion,
            ref_allele: "-".to_string(),
            alt_allele: inserted,
        }
    }

    pub fn deletion(position: Position, deleted: String) -> Self {
        Self {
            position,
            variant_type: VariantType::Deletion,
            ref_allele: deleted,
            alt_allele: "-".to_string(),
        }
    }

    /// Number of bases affected: 1 for SNPs, run length for indels.
    pub fn len(&self) -> usize {
        match self.variant_type {
            VariantType::Snp => 1,
            VariantType::Insertion => self.alt_allele.len(),
            VariantType::Deletion => self.ref_allele.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A classified variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub position: Position,
    #[serde(rename = "type")]
    pub variant_type: VariantType,
    pub ref_allele: String,
    pub alt_allele: String,
    pub region: Region,
    pub effect: Effect,
    pub frameshift: bool,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sift: Option<SiftScore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polyphen: Option<PolyphenScore>,
}

impl Variant {
    pub fn len(&self) -> usize {
        match self.variant_type {
            VariantType::Snp => 1,
            VariantType::Insertion => self.alt_allele.len(),
            VariantType::Deletion => self.ref_allele.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missense_snp(&self) -> bool {
        self.variant_type == VariantType::Snp && self.effect == Effect::Missense
    }
}

/// Two gapped sequences of equal length over `{A,C,G,T,N,-}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignedPair {
    reference: String,
    sample: String,
}

impl AlignedPair {
    /// Validate and build an aligned pair.
    ///
    /// Fails with `InputValidation` when either side is empty, contains a
    /// symbol outside the alphabet, or the two lengths differ.
    pub fn new(reference: &[u8], sample: &[u8]) -> AnalysisResult<Self> {
        let reference = normalize_sequence(reference)
            .map_err(|e| AnalysisError::validation(format!("aligned reference: {}", e)))?;
        let sample = normalize_sequence(sample)
            .map_err(|e| AnalysisError::validation(format!("aligned sample: {}", e)))?;

        if reference.len() != sample.len() {
            return Err(AnalysisError::validation(format!(
                "aligned sequences differ in length ({} vs {})",
                reference.len(),
                sample.len()
            )));
        }

        // Alphabet is ASCII-only after normalisation.
        Ok(Self {
            reference: String::from_utf8_lossy(&reference).into_owned(),
            sample: String::from_utf8_lossy(&sample).into_owned(),
        })
    }

    /// Wrap rows already known to be uppercase `{A,C,G,T,N,-}` of equal length.
    pub(crate) fn from_validated(reference: Vec<u8>, sample: Vec<u8>) -> Self {
        debug_assert_eq!(reference.len(), sample.len());
        Self {
            reference: String::from_utf8_lossy(&reference).into_owned(),
            sample: String::from_utf8_lossy(&sample).into_owned(),
        }
    }

    pub fn reference(&self) -> &[u8] {
        self.reference.as_bytes()
    }

    pub fn sample(&self) -> &[u8] {
        self.sample.as_bytes()
    }

    pub fn side(&self, side: SequenceSide) -> &[u8] {
        match side {
            SequenceSide::Reference => self.reference(),
            SequenceSide::Sample => self.sample(),
        }
    }

    /// Number of alignment columns.
    pub fn len(&self) -> usize {
        self.reference.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_empty()
    }

    /// Count of non-gap reference characters.
    pub fn reference_length(&self) -> usize {
        self.reference().iter().filter(|&&b| !is_gap(b)).count()
    }

    /// Count of non-gap sample characters.
    pub fn sample_length(&self) -> usize {
        self.sample().iter().filter(|&&b| !is_gap(b)).count()
    }
}
