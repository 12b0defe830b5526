//! MutAnalyzer Core Library
//!
//! Variant calling over gapped reference/sample alignments, exon/intron
//! region lookup, coding-effect classification and heuristic pathogenicity
//! scoring, plus the alignment and file-input collaborators they rely on.

pub mod align;
pub mod caller;
pub mod classify;
pub mod codon;
pub mod error;
pub mod io;
pub mod pathogenicity;
pub mod region;
pub mod sequence;
pub mod session;
pub mod translate;
pub mod types;

// Re-export commonly used types and functions
pub use align::{AlignConfig, AlignMode, PairwiseAligner, PairwiseAlignment, SequenceAligner};
pub use caller::VariantCaller;
pub use classify::{Classification, EffectClassifier};
pub use codon::{CodonMapper, CodonPhase};
pub use error::{AnalysisError, AnalysisResult};
pub use pathogenicity::PathogenicityScorer;
pub use region::{RegionHit, RegionIndex};
pub use session::{
    analyze, spawn_analysis, AnalysisConfig, AnalysisJob, AnalysisOutcome, AnalysisRequest,
    AnalysisSession, ProteinComparison, VariantSummary,
};
pub use translate::{CodonTranslator, GeneticCode, GeneticCodeId, Translation};
pub use types::{
    AlignedPair, Effect, GenomicRange, Position, RawVariant, Region, SequenceSide, Severity,
    Variant, VariantType,
};

/// Version information for the MutAnalyzer core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
